//! Data models for prereg storage.

use serde::{Deserialize, Serialize};

use super::db::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub media_hash: String,
    pub body: String,
    pub title: String,
    pub links: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Raw `posts` row; `links` is still JSON text.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct PostRow {
    pub id: String,
    pub media_hash: String,
    pub body: String,
    pub title: String,
    pub links: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<PostRow> for Post {
    type Error = DatabaseError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let links = serde_json::from_str(&row.links)
            .map_err(|e| DatabaseError::Decode(format!("post {} links: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            media_hash: row.media_hash,
            body: row.body,
            title: row.title,
            links,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Everything the admin listing returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub registrations: Vec<Registration>,
    pub contact_messages: Vec<ContactMessage>,
}
