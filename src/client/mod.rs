//! Blocking HTTP client for the hosted CMS backend.
//!
//! Every operation returns `Result` and propagates failures to the caller;
//! nothing is logged-and-swallowed. Request URLs come from the pure builder
//! in [`crate::filter`]; this module only dispatches them and unwraps the
//! `{data: ...}` envelope.

pub mod models;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::filter::SearchFilter;
use models::{Envelope, Post, PostDraft, Tag};

pub const DEFAULT_BASE_URL: &str = "https://directus-10-10-4-p3ab.onrender.com";

pub const POSTS_PATH: &str = "/items/posts";
const TAGS_PATH: &str = "/items/tags";

/// Path for one post with its relations expanded.
fn post_path(id: i64) -> String {
    format!("{POSTS_PATH}/{id}?fields=*.*,postTags.tags_id.*")
}

/// Path for the featured-posts listing. Featured is a flat flag, so no
/// relational field expansion and no published predicate.
fn featured_path() -> String {
    format!("{POSTS_PATH}?fields=*.*&filter[featured][_eq]=true")
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend returned {status} for {path}: {body}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
        body: String,
    },
}

pub struct CmsClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl CmsClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Search published posts with the given filter. An empty filter lists
    /// everything published.
    pub fn search_posts(&self, filter: &SearchFilter) -> Result<Vec<Post>> {
        let path = filter.posts_url(POSTS_PATH);
        let env: Envelope<Vec<Post>> = self.get(&path)?;
        Ok(env.data)
    }

    pub fn get_post(&self, id: i64) -> Result<Post> {
        let env: Envelope<Post> = self.get(&post_path(id))?;
        Ok(env.data)
    }

    pub fn featured_posts(&self) -> Result<Vec<Post>> {
        let env: Envelope<Vec<Post>> = self.get(&featured_path())?;
        Ok(env.data)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        let env: Envelope<Vec<Tag>> = self.get(TAGS_PATH)?;
        Ok(env.data)
    }

    pub fn create_post(&self, draft: &PostDraft) -> Result<Post> {
        let env: Envelope<Post> = self.send_json(POSTS_PATH, &draft.to_payload(), false)?;
        Ok(env.data)
    }

    pub fn update_post(&self, id: i64, draft: &PostDraft) -> Result<Post> {
        let path = format!("{POSTS_PATH}/{id}");
        let env: Envelope<Post> = self.send_json(&path, &draft.to_payload(), true)?;
        Ok(env.data)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let mut req = self.client.get(&url);
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let resp = req
            .send()
            .with_context(|| format!("Failed to GET {url}"))?;

        self.decode(resp, path)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &impl Serialize,
        patch: bool,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, patch, "write");

        let mut req = if patch {
            self.client.patch(&url)
        } else {
            self.client.post(&url)
        };
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let resp = req
            .json(payload)
            .send()
            .with_context(|| format!("Failed to write to {url}"))?;

        self.decode(resp, path)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        resp: reqwest::blocking::Response,
        path: &str,
    ) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                status,
                path: path.to_string(),
                body,
            }
            .into());
        }
        resp.json()
            .with_context(|| format!("Failed to parse backend response for {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let client = CmsClient::new("https://cms.example.com/", None);
        assert_eq!(client.base_url, "https://cms.example.com");
    }

    #[test]
    fn endpoint_paths_are_pinned() {
        // Observed backend contract, like the filter grammar: changes here
        // must be deliberate.
        assert_eq!(
            post_path(42),
            "/items/posts/42?fields=*.*,postTags.tags_id.*"
        );
        assert_eq!(
            featured_path(),
            "/items/posts?fields=*.*&filter[featured][_eq]=true"
        );
        assert_eq!(TAGS_PATH, "/items/tags");
    }

    #[test]
    fn status_error_names_status_and_path() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::FORBIDDEN,
            path: "/items/posts".to_string(),
            body: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("/items/posts"));
    }
}
