use anyhow::{bail, Result};
use blogq::client::models::PostDraft;
use blogq::client::{CmsClient, DEFAULT_BASE_URL, POSTS_PATH};
use blogq::config::{self, BlogqConfig};
use blogq::debounce::Debouncer;
use blogq::filter::SearchFilter;
use blogq::output::{print_json, table};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "blogq", version, about = "Blog Query — deep-filter search over a Directus-backed blog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL (default: the hosted instance)
    #[arg(long, global = true, env = "BLOGQ_URL")]
    base_url: Option<String>,

    /// Static access token for write operations
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search published posts by tags, authors and free text
    Search {
        /// Free-text query (matches title, summary, content, author name)
        query: Option<String>,

        /// Filter by tag id (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,

        /// Filter by author id (repeatable)
        #[arg(long = "author")]
        authors: Vec<i64>,

        /// Print the request URL instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show one post
    Show {
        /// Post ID
        id: i64,
    },

    /// List featured posts
    Featured,

    /// List available tags
    Tags,

    /// Create a post
    New {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        summary: String,

        /// Post body (inline)
        #[arg(long)]
        content: Option<String>,

        /// Post body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Cover image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Author id
        #[arg(long)]
        author: i64,

        /// Tag id (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,

        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
    },

    /// Update a post
    Update {
        /// Post ID
        id: i64,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        summary: String,

        /// Post body (inline)
        #[arg(long)]
        content: Option<String>,

        /// Post body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Cover image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Author id
        #[arg(long)]
        author: i64,

        /// Tag id (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,

        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
    },

    /// Interactive debounced search (one request per quiet period)
    Live {
        /// Fix tag filters for the session (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,

        /// Fix author filters for the session (repeatable)
        #[arg(long = "author")]
        authors: Vec<i64>,

        /// Quiet period before a query is sent, in milliseconds
        #[arg(long, default_value = "300")]
        wait_ms: u64,
    },

    /// Manage ~/.blogq/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file if none exists
    Init,
    /// Show the current config with secrets redacted
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    let config = BlogqConfig::load()?;
    let base_url = cli
        .base_url
        .or_else(|| config.base_url().map(|s| s.to_string()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let token = config::resolve_token(cli.token.as_deref(), config.api.as_ref())?;

    let client = CmsClient::new(base_url, token);

    match cli.command {
        Commands::Search {
            query,
            tags,
            authors,
            dry_run,
        } => {
            let filter = SearchFilter {
                tag_ids: tags,
                author_ids: authors,
                query: query.unwrap_or_default(),
            };

            if dry_run {
                println!("{}", filter.posts_url(POSTS_PATH));
                return Ok(());
            }

            let description = describe(&filter);
            let results = client.search_posts(&filter)?;
            if json_output {
                print_json(&serde_json::json!({
                    "total": results.len(),
                    "posts": results,
                }))?;
            } else {
                table::print_post_results(&results, &description);
            }
        }

        Commands::Show { id } => {
            let post = client.get_post(id)?;
            if json_output {
                print_json(&post)?;
            } else {
                table::print_post_detail(&post);
            }
        }

        Commands::Featured => {
            let results = client.featured_posts()?;
            if json_output {
                print_json(&results)?;
            } else {
                table::print_post_results(&results, "featured");
            }
        }

        Commands::Tags => {
            let tags = client.tags()?;
            if json_output {
                print_json(&tags)?;
            } else {
                table::print_tags(&tags);
            }
        }

        Commands::New {
            title,
            summary,
            content,
            content_file,
            image,
            author,
            tags,
            publish,
        } => {
            let draft =
                build_draft(title, summary, content, content_file, image, author, tags, publish)?;
            let post = client.create_post(&draft)?;
            if json_output {
                print_json(&post)?;
            } else {
                println!("Created post {} ({})", post.id, post.titulo);
            }
        }

        Commands::Update {
            id,
            title,
            summary,
            content,
            content_file,
            image,
            author,
            tags,
            publish,
        } => {
            let draft =
                build_draft(title, summary, content, content_file, image, author, tags, publish)?;
            let post = client.update_post(id, &draft)?;
            if json_output {
                print_json(&post)?;
            } else {
                println!("Updated post {} ({})", post.id, post.titulo);
            }
        }

        Commands::Live {
            tags,
            authors,
            wait_ms,
        } => {
            run_live(&client, tags, authors, Duration::from_millis(wait_ms))?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => {
                if config::init_config()? {
                    println!("Wrote {}", config::config_path()?.display());
                } else {
                    println!("Config already exists: {}", config::config_path()?.display());
                }
            }
            ConfigAction::Show => {
                println!("{}", config.display_redacted());
            }
        },
    }

    Ok(())
}

fn describe(filter: &SearchFilter) -> String {
    if filter.is_empty() {
        return "all published posts".to_string();
    }
    let mut parts = Vec::new();
    if !filter.query.trim().is_empty() {
        parts.push(format!("\"{}\"", filter.query.trim()));
    }
    if !filter.tag_ids.is_empty() {
        let ids: Vec<String> = filter.tag_ids.iter().map(|id| id.to_string()).collect();
        parts.push(format!("tags {}", ids.join(", ")));
    }
    if !filter.author_ids.is_empty() {
        let ids: Vec<String> = filter.author_ids.iter().map(|id| id.to_string()).collect();
        parts.push(format!("authors {}", ids.join(", ")));
    }
    parts.join(" + ")
}

#[allow(clippy::too_many_arguments)]
fn build_draft(
    title: String,
    summary: String,
    content: Option<String>,
    content_file: Option<PathBuf>,
    image: String,
    author: i64,
    tags: Vec<i64>,
    publish: bool,
) -> Result<PostDraft> {
    let content = match (content, content_file) {
        (Some(inline), None) => inline,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?,
        (Some(_), Some(_)) => bail!("Use either --content or --content-file, not both"),
        (None, None) => bail!("Provide the post body via --content or --content-file"),
    };

    Ok(PostDraft {
        titulo: title,
        summary,
        content,
        image,
        author_id: author,
        tag_ids: tags,
        status: Some(if publish { "published" } else { "draft" }.to_string()),
    })
}

/// Interactive search: a reader thread feeds stdin lines into a channel and
/// the main loop drives the debouncer. Each line supersedes the pending
/// query; the loop blocks until the next line or the pending deadline,
/// whichever comes first, and quit/EOF cancels whatever is still scheduled.
fn run_live(client: &CmsClient, tags: Vec<i64>, authors: Vec<i64>, wait: Duration) -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut debouncer = Debouncer::new(
        |query: String| {
            let filter = SearchFilter {
                tag_ids: tags.clone(),
                author_ids: authors.clone(),
                query,
            };
            let description = describe(&filter);
            match client.search_posts(&filter) {
                Ok(posts) => table::print_post_results(&posts, &description),
                Err(e) => eprintln!("Search failed: {e:#}"),
            }
        },
        wait,
    );

    eprintln!("Type a query and press Enter; a blank line lists everything.");
    eprintln!("Rapid edits coalesce into one request. :quit or Ctrl-D exits.");

    loop {
        let line = match debouncer.deadline() {
            // Nothing scheduled: block until the next line.
            None => match rx.recv() {
                Ok(line) => line,
                Err(_) => break,
            },
            // Something scheduled: wait for a line at most until it is due.
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(line) => line,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        debouncer.poll();
                        continue;
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        debouncer.cancel();
                        break;
                    }
                }
            }
        };

        let line = line.trim().to_string();
        if line == ":quit" {
            debouncer.cancel();
            break;
        }
        debouncer.invoke(line);
    }

    Ok(())
}
