//! Deep-filter query construction for the blog backend.
//!
//! The backend (a hosted Directus instance) filters collections through an
//! array-indexed query grammar: AND-combined groups, each holding OR-combined
//! field predicates, with group and predicate positions encoded as array
//! indices in the parameter path. Group slots are fixed: 0 = tags,
//! 1 = authors, 2 = text search. An empty group is omitted from the output;
//! the other groups keep their indices.

use std::fmt::Display;

/// Fixed group slot for tag membership predicates.
const GROUP_TAGS: usize = 0;
/// Fixed group slot for author equality predicates.
const GROUP_AUTHORS: usize = 1;
/// Fixed group slot for free-text `_contains` predicates.
const GROUP_TEXT: usize = 2;

/// Text-search field paths, in the order the backend expects them.
const TEXT_FIELDS: [&[&str]; 4] = [
    &["titulo"],
    &["summary"],
    &["content"],
    &["author", "name"],
];

/// Structured search criteria for post queries.
///
/// Built fresh per search action and consumed once. Empty collections and a
/// blank query contribute no predicates for their dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub tag_ids: Vec<i64>,
    pub author_ids: Vec<i64>,
    pub query: String,
}

impl SearchFilter {
    /// True when no dimension would contribute a predicate.
    pub fn is_empty(&self) -> bool {
        self.tag_ids.is_empty() && self.author_ids.is_empty() && self.query.trim().is_empty()
    }

    /// Build the posts request URL for this filter over `base_path`.
    ///
    /// Always requests published items with relational fields expanded; the
    /// three filter groups are appended in slot order. Pure string transform:
    /// no I/O, no validation, identical output for identical input. Ids and
    /// the query value are percent-encoded; negative ids pass through as-is.
    pub fn posts_url(&self, base_path: &str) -> String {
        let mut url = format!(
            "{base_path}?fields=*.*,postTags.tags_id.*&filter[status][_eq]=published"
        );

        for (i, id) in self.tag_ids.iter().enumerate() {
            push_predicate(&mut url, GROUP_TAGS, i, &["postTags", "tags_id"], "_in", id);
        }

        for (i, id) in self.author_ids.iter().enumerate() {
            push_predicate(&mut url, GROUP_AUTHORS, i, &["author", "id"], "_eq", id);
        }

        if !self.query.trim().is_empty() {
            let encoded = urlencoding::encode(&self.query);
            for (i, path) in TEXT_FIELDS.iter().enumerate() {
                push_predicate(&mut url, GROUP_TEXT, i, path, "_contains", &encoded);
            }
        }

        url
    }
}

/// Append one `&filter[_and][group][_or][index][..path..][op]=value` clause.
fn push_predicate(
    url: &mut String,
    group: usize,
    index: usize,
    path: &[&str],
    op: &str,
    value: impl Display,
) {
    url.push_str(&format!("&filter[_and][{group}][_or][{index}]"));
    for segment in path {
        url.push_str(&format!("[{segment}]"));
    }
    url.push_str(&format!("[{op}]={value}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/items/posts";
    const PUBLISHED: &str = "/items/posts?fields=*.*,postTags.tags_id.*&filter[status][_eq]=published";

    #[test]
    fn empty_filter_requests_everything_published() {
        let filter = SearchFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.posts_url(BASE), PUBLISHED);
    }

    #[test]
    fn blank_query_is_treated_as_empty() {
        let filter = SearchFilter {
            query: "   ".to_string(),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.posts_url(BASE), PUBLISHED);
    }

    #[test]
    fn tag_ids_become_group_zero_membership_predicates_in_order() {
        let filter = SearchFilter {
            tag_ids: vec![5, 2, 9],
            ..Default::default()
        };
        let url = filter.posts_url(BASE);
        assert_eq!(
            url,
            format!(
                "{PUBLISHED}\
                 &filter[_and][0][_or][0][postTags][tags_id][_in]=5\
                 &filter[_and][0][_or][1][postTags][tags_id][_in]=2\
                 &filter[_and][0][_or][2][postTags][tags_id][_in]=9"
            )
        );
    }

    #[test]
    fn author_ids_become_group_one_equality_predicates_in_order() {
        let filter = SearchFilter {
            author_ids: vec![12, 4],
            ..Default::default()
        };
        let url = filter.posts_url(BASE);
        assert_eq!(
            url,
            format!(
                "{PUBLISHED}\
                 &filter[_and][1][_or][0][author][id][_eq]=12\
                 &filter[_and][1][_or][1][author][id][_eq]=4"
            )
        );
    }

    #[test]
    fn query_becomes_four_contains_predicates_in_fixed_field_order() {
        let filter = SearchFilter {
            query: "hello world".to_string(),
            ..Default::default()
        };
        let url = filter.posts_url(BASE);
        assert_eq!(
            url,
            format!(
                "{PUBLISHED}\
                 &filter[_and][2][_or][0][titulo][_contains]=hello%20world\
                 &filter[_and][2][_or][1][summary][_contains]=hello%20world\
                 &filter[_and][2][_or][2][content][_contains]=hello%20world\
                 &filter[_and][2][_or][3][author][name][_contains]=hello%20world"
            )
        );
    }

    #[test]
    fn query_special_characters_are_percent_encoded() {
        let filter = SearchFilter {
            query: "a&b=c?".to_string(),
            ..Default::default()
        };
        let url = filter.posts_url(BASE);
        assert!(url.contains("[titulo][_contains]=a%26b%3Dc%3F"));
        assert_eq!(url.matches("a%26b%3Dc%3F").count(), 4);
    }

    #[test]
    fn omitted_groups_do_not_shift_the_remaining_indices() {
        // tags + text, no authors: group 2 keeps its slot even though
        // group 1 is absent.
        let filter = SearchFilter {
            tag_ids: vec![3, 7],
            author_ids: vec![],
            query: "rust".to_string(),
        };
        let url = filter.posts_url("/posts");

        let expected = [
            "filter[status][_eq]=published",
            "filter[_and][0][_or][0][postTags][tags_id][_in]=3",
            "filter[_and][0][_or][1][postTags][tags_id][_in]=7",
            "filter[_and][2][_or][0][titulo][_contains]=rust",
            "filter[_and][2][_or][1][summary][_contains]=rust",
            "filter[_and][2][_or][2][content][_contains]=rust",
            "filter[_and][2][_or][3][author][name][_contains]=rust",
        ];
        let mut cursor = 0;
        for clause in expected {
            let at = url[cursor..]
                .find(clause)
                .unwrap_or_else(|| panic!("missing or out of order: {clause}"));
            cursor += at + clause.len();
        }
        assert!(!url.contains("filter[_and][1]"));
    }

    #[test]
    fn negative_ids_are_encoded_as_is() {
        let filter = SearchFilter {
            tag_ids: vec![-1],
            ..Default::default()
        };
        assert!(filter
            .posts_url(BASE)
            .ends_with("&filter[_and][0][_or][0][postTags][tags_id][_in]=-1"));
    }

    #[test]
    fn builder_is_idempotent() {
        let filter = SearchFilter {
            tag_ids: vec![1, 2],
            author_ids: vec![3],
            query: "ownership".to_string(),
        };
        assert_eq!(filter.posts_url(BASE), filter.posts_url(BASE));
    }

    #[test]
    fn no_trailing_separators() {
        let filter = SearchFilter {
            tag_ids: vec![1],
            author_ids: vec![2],
            query: "q".to_string(),
        };
        let url = filter.posts_url(BASE);
        assert!(!url.ends_with('&'));
        assert!(!url.ends_with('='));
        assert!(!url.contains("&&"));
    }
}
