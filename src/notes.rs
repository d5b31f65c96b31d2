//! Client for the remote notes service.
//!
//! The notes screen lists notes, creates notes and adds comments. Created
//! notes carry the author's push token so the service can notify the author
//! when someone comments.
//!
//! # Example
//!
//! ```ignore
//! let client = NotesClient::new(&config.notes_url, config.request_timeout())?;
//! let draft = NewNote::new("Buy milk", "ada", state.token.as_ref());
//! client.create_note(&draft).await?;
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DraftError;
use crate::notifications::PushToken;

/// A comment on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Server-assigned id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Comment text.
    pub content: String,
    /// Author name.
    pub author: String,
}

/// A note with its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Note text.
    pub content: String,
    /// Author name.
    pub author: String,
    /// Comments, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Payload for creating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    /// Note text.
    pub content: String,
    /// Author name.
    pub author: String,
    /// Author's push token, empty when push is unavailable.
    #[serde(rename = "authorFcmToken")]
    pub author_push_token: String,
}

impl NewNote {
    /// Build a draft, attaching the author's push token if there is one.
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        push_token: Option<&PushToken>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            author_push_token: push_token.map(ToString::to_string).unwrap_or_default(),
        }
    }

    /// Check the draft before sending.
    pub fn validate(&self) -> Result<(), DraftError> {
        validate_draft(&self.content, &self.author)
    }
}

/// Payload for adding a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    /// Comment text.
    pub content: String,
    /// Author name.
    pub author: String,
}

impl NewComment {
    /// Build a comment draft.
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }

    /// Check the draft before sending.
    pub fn validate(&self) -> Result<(), DraftError> {
        validate_draft(&self.content, &self.author)
    }
}

fn validate_draft(content: &str, author: &str) -> Result<(), DraftError> {
    if content.trim().is_empty() {
        return Err(DraftError::EmptyContent);
    }
    if author.trim().is_empty() {
        return Err(DraftError::MissingAuthor);
    }
    Ok(())
}

/// Returns `Ok(false)` for drafts that are skipped silently.
fn check_draft(result: Result<(), DraftError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(DraftError::EmptyContent) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// HTTP client for the notes service.
#[derive(Debug, Clone)]
pub struct NotesClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotesClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all notes with their comments.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let url = format!("{}/notes", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch notes")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch notes: {}", response.status());
        }
        response.json().await.context("Invalid notes response")
    }

    /// Create a note. Returns `Ok(false)` if the draft was empty and nothing
    /// was sent.
    pub async fn create_note(&self, note: &NewNote) -> Result<bool> {
        if !check_draft(note.validate())? {
            return Ok(false);
        }

        let url = format!("{}/notes", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(note)
            .send()
            .await
            .context("Failed to create note")?;

        if response.status().is_success() {
            log::info!(
                "Created note by {} (push token {})",
                note.author,
                if note.author_push_token.is_empty() { "absent" } else { "attached" }
            );
            Ok(true)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to create note: {status} - {body}")
        }
    }

    /// Add a comment to a note. Returns `Ok(false)` if the draft was empty
    /// and nothing was sent.
    pub async fn add_comment(&self, note_id: &str, comment: &NewComment) -> Result<bool> {
        if !check_draft(comment.validate())? {
            return Ok(false);
        }

        let url = format!("{}/notes/{note_id}/comments", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(comment)
            .send()
            .await
            .context("Failed to add comment")?;

        if response.status().is_success() {
            log::info!("Added comment to note {note_id} by {}", comment.author);
            Ok(true)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to add comment: {status} - {body}")
        }
    }
}
