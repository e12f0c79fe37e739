use serde::{Deserialize, Serialize};

/// Directus wraps every response body in a `data` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(rename = "postTags", default)]
    pub post_tags: Vec<TagRelation>,
}

impl Post {
    /// Flattened tag labels, skipping unresolved relations.
    pub fn tag_names(&self) -> Vec<&str> {
        self.post_tags
            .iter()
            .filter_map(|r| r.tags_id.as_ref())
            .filter_map(|t| t.tag.as_deref())
            .collect()
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("unknown")
    }
}

/// Junction row between a post and a tag. The nested tag is only present
/// when the query expanded `postTags.tags_id.*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRelation {
    #[serde(default)]
    pub tags_id: Option<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields the caller supplies when creating or updating a post.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub titulo: String,
    pub summary: String,
    pub content: String,
    pub image: String,
    pub author_id: i64,
    pub tag_ids: Vec<i64>,
    pub status: Option<String>,
}

impl PostDraft {
    /// Convert to the wire payload: tags as `[{"id": n}]`, author as
    /// `{"id": n}`, read time derived from the content.
    pub fn to_payload(&self) -> PostPayload {
        PostPayload {
            content: self.content.clone(),
            post_tags: self.tag_ids.iter().map(|&id| IdRef { id }).collect(),
            summary: self.summary.clone(),
            read_time: read_time_minutes(&self.content).to_string(),
            titulo: self.titulo.clone(),
            image: self.image.clone(),
            author: IdRef { id: self.author_id },
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostPayload {
    pub content: String,
    #[serde(rename = "postTags")]
    pub post_tags: Vec<IdRef>,
    pub summary: String,
    pub read_time: String,
    pub titulo: String,
    pub image: String,
    pub author: IdRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdRef {
    pub id: i64,
}

/// Estimated reading time at 200 words per minute, never less than a minute.
pub fn read_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}
