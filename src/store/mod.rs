//! Retrieval backend boundary
//!
//! The content index and course catalog live behind [`VectorStore`]. This
//! crate never embeds or indexes text itself; [`InMemoryStore`] is a
//! term-overlap stand-in for tests and local use.

mod memory;

pub use memory::{ContentChunk, CourseDocument, InMemoryStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CourseQaError, Result};

/// Retrieval backend: content search plus catalog lookups
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Unified search. Course name resolution and filter building happen here.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<i64>,
    ) -> SearchResults;

    /// Resolve a fuzzy course name to its canonical catalog title
    async fn resolve_course_name(&self, fuzzy: &str) -> Result<Option<String>>;

    /// Catalog entry for a canonical title
    async fn get_catalog_entry(&self, title: &str) -> Result<Option<CatalogEntry>>;

    /// All canonical course titles
    async fn course_titles(&self) -> Result<Vec<String>>;
}

/// Metadata stored alongside each content chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: Option<String>,
    pub lesson_number: Option<i64>,
    pub chunk_index: Option<usize>,
}

/// Parallel lists of documents and their metadata, or a retrieval error
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn new(documents: Vec<String>, metadata: Vec<ChunkMetadata>) -> Self {
        Self {
            documents,
            metadata,
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Results carrying only an error message
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A lesson as stored in the catalog's JSON-encoded lesson list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
    #[serde(default)]
    pub lesson_number: Option<i64>,
    #[serde(default)]
    pub lesson_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_link: Option<String>,
}

/// Catalog metadata for one course
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub instructor: Option<String>,
    pub course_link: Option<String>,
    /// JSON array of [`LessonEntry`], in catalog order
    pub lessons_json: Option<String>,
    pub lesson_count: usize,
}

impl CatalogEntry {
    /// Decode the lesson list, keeping stored order
    pub fn lessons(&self) -> Result<Vec<LessonEntry>> {
        let raw = self
            .lessons_json
            .as_deref()
            .ok_or_else(|| {
                CourseQaError::Store(format!("no lesson list stored for '{}'", self.title))
            })?;
        Ok(serde_json::from_str(raw)?)
    }

    /// Link of a specific lesson, if the catalog records one
    pub fn lesson_link(&self, lesson_number: i64) -> Result<Option<String>> {
        Ok(self
            .lessons()?
            .into_iter()
            .find(|l| l.lesson_number == Some(lesson_number))
            .and_then(|l| l.lesson_link))
    }
}
