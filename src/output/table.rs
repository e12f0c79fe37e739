use unicode_width::UnicodeWidthStr;

use crate::client::models::{Post, Tag};

/// Clip a string to `max_width` display columns, ellipsizing overflow.
/// Widths are unicode display widths, not byte or char counts.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let clipped: String = s
        .chars()
        .take_while(|ch| {
            used += unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0);
            used <= budget
        })
        .collect();
    clipped + "..."
}

/// Format post search results as a table.
pub fn print_post_results(results: &[Post], description: &str) {
    if results.is_empty() {
        println!("No posts for {description}");
        return;
    }

    println!(
        "{} post{} for {}:\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        description
    );

    println!("  {:<42} {:<20} {:<6}", "TITLE", "AUTHOR", "READ");
    println!("  {}", "-".repeat(70));

    for post in results {
        println!(
            "  {:<42} {:<20} {:<6}",
            truncate(&post.titulo, 40),
            truncate(post.author_name(), 18),
            format_read_time(&post.read_time),
        );

        if !post.summary.is_empty() {
            let summary = post.summary.replace('\n', " ");
            println!("  {}", truncate(&format!("  {summary}"), 70));
        }

        let tags = post.tag_names();
        if !tags.is_empty() {
            println!("    tags: {}", truncate(&tags.join(", "), 62));
        }

        println!("  id: {}\n", post.id);
    }
}

/// Format a single post's details for `blogq show`.
pub fn print_post_detail(post: &Post) {
    println!("Post: {}", post.titulo);
    println!("  ID:        {}", post.id);
    println!("  Author:    {}", post.author_name());
    println!("  Read time: {}", format_read_time(&post.read_time));
    if let Some(ref status) = post.status {
        println!("  Status:    {status}");
    }
    if !post.image.is_empty() {
        println!("  Image:     {}", post.image);
    }

    let tags = post.tag_names();
    if !tags.is_empty() {
        println!("  Tags:      {}", tags.join(", "));
    }

    if !post.summary.is_empty() {
        println!("\nSummary:");
        for line in post.summary.lines() {
            println!("  {line}");
        }
    }

    if !post.content.is_empty() {
        println!("\nContent:");
        for line in post.content.lines() {
            println!("  {line}");
        }
    }
}

/// Format the tag list for `blogq tags`.
pub fn print_tags(tags: &[Tag]) {
    if tags.is_empty() {
        println!("No tags found.");
        return;
    }

    println!("{} tag{}:\n", tags.len(), if tags.len() == 1 { "" } else { "s" });
    println!("  {:<6} {}", "ID", "TAG");
    for tag in tags {
        println!("  {:<6} {}", tag.id, tag.tag.as_deref().unwrap_or("(unnamed)"));
    }
}

fn format_read_time(read_time: &str) -> String {
    if read_time.is_empty() {
        "-".to_string()
    } else {
        format!("{read_time} min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_width_and_appends_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate("a very long post title indeed", 10);
        assert!(long.ends_with("..."));
        assert!(UnicodeWidthStr::width(long.as_str()) <= 10);
    }

    #[test]
    fn read_time_falls_back_to_a_dash() {
        assert_eq!(format_read_time(""), "-");
        assert_eq!(format_read_time("4"), "4 min");
    }
}
