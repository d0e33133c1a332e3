//! Record store queries.

use prereg_core::db::unix_timestamp;
use tracing::debug;

use super::db::{DatabaseError, RecordStore, StoreError};
use super::models::{AdminData, ContactMessage, Post, PostRow, Registration};

/// Validated fields for a new registration.
#[derive(Debug, Clone, Copy)]
pub struct NewRegistration<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub username: &'a str,
}

/// Validated fields for a new contact message.
#[derive(Debug, Clone, Copy)]
pub struct NewContactMessage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Validated fields for a new post.
#[derive(Debug, Clone, Copy)]
pub struct NewPost<'a> {
    pub media_hash: &'a str,
    pub body: &'a str,
    pub title: &'a str,
    pub links: &'a [String],
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl RecordStore {
    // =========================================================================
    // Registration queries
    // =========================================================================

    /// Insert a registration, returning the stored row from the same statement.
    ///
    /// Fails with [`StoreError::Conflict`] naming `email` or `username` when
    /// either is already taken; nothing is written in that case.
    pub async fn insert_registration(
        &self,
        new: NewRegistration<'_>,
    ) -> Result<Registration, StoreError> {
        let id = new_id();
        let now = unix_timestamp();

        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, email, name, username, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&id)
        .bind(new.email)
        .bind(new.name)
        .bind(new.username)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        debug!(%id, "Registration inserted");
        Ok(registration)
    }

    /// Get a registration by ID.
    pub async fn get_registration(&self, id: &str) -> Result<Registration, DatabaseError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Registration {id}")))
    }

    /// All registrations in insertion order.
    pub async fn list_registrations(&self) -> Result<Vec<Registration>, DatabaseError> {
        let rows = sqlx::query_as::<_, Registration>("SELECT * FROM registrations ORDER BY rowid")
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    // =========================================================================
    // Contact message queries
    // =========================================================================

    /// Insert a contact message. Duplicates are allowed.
    pub async fn insert_contact_message(
        &self,
        new: NewContactMessage<'_>,
    ) -> Result<ContactMessage, StoreError> {
        let id = new_id();
        let now = unix_timestamp();

        let message = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (id, name, email, message, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&id)
        .bind(new.name)
        .bind(new.email)
        .bind(new.message)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        debug!(%id, "Contact message inserted");
        Ok(message)
    }

    /// Get a contact message by ID.
    pub async fn get_contact_message(&self, id: &str) -> Result<ContactMessage, DatabaseError> {
        sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Contact message {id}")))
    }

    /// All contact messages in insertion order.
    pub async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, DatabaseError> {
        let rows =
            sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages ORDER BY rowid")
                .fetch_all(self.pool())
                .await?;
        Ok(rows)
    }

    // =========================================================================
    // Post queries
    // =========================================================================

    /// Insert a post. `links` are stored in the order given.
    pub async fn insert_post(&self, new: NewPost<'_>) -> Result<Post, StoreError> {
        let id = new_id();
        let now = unix_timestamp();
        let links = serde_json::to_string(new.links)
            .map_err(|e| DatabaseError::Decode(format!("post links: {e}")))?;

        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (id, media_hash, body, title, links, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&id)
        .bind(new.media_hash)
        .bind(new.body)
        .bind(new.title)
        .bind(links)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        debug!(%id, "Post inserted");
        Ok(Post::try_from(row)?)
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Post, DatabaseError> {
        sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Post {id}")))?
            .try_into()
    }

    /// All posts in insertion order.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        sqlx::query_as::<_, PostRow>("SELECT * FROM posts ORDER BY rowid")
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(Post::try_from)
            .collect()
    }

    // =========================================================================
    // Admin queries
    // =========================================================================

    /// Every registration and every contact message, unfiltered.
    pub async fn admin_data(&self) -> Result<AdminData, DatabaseError> {
        Ok(AdminData {
            registrations: self.list_registrations().await?,
            contact_messages: self.list_contact_messages().await?,
        })
    }
}
