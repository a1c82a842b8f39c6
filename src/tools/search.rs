//! search_course_content - semantic search over course material

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{
    CitationSlot, ParamType, SourceCitation, Tool, ToolDefinition, ToolError, ToolParameter,
};
use crate::store::{SearchResults, VectorStore};

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<i64>,
}

/// Searches course content with fuzzy course names and lesson filtering
pub struct CourseSearchTool {
    store: Arc<dyn VectorStore>,
    last_sources: CitationSlot,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            last_sources: CitationSlot::default(),
        }
    }

    /// Run a search. Retrieval problems come back as text, never as errors.
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<i64>,
    ) -> String {
        let results = self.store.search(query, course_name, lesson_number).await;

        if let Some(error) = results.error {
            return error;
        }

        if results.is_empty() {
            let mut filter_info = String::new();
            if let Some(name) = course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(n) = lesson_number {
                filter_info.push_str(&format!(" in lesson {}", n));
            }
            return format!("No relevant content found{}.", filter_info);
        }

        self.format_results(results).await
    }

    async fn format_results(&self, results: SearchResults) -> String {
        let mut blocks = Vec::with_capacity(results.documents.len());
        let mut sources = Vec::with_capacity(results.documents.len());

        for (doc, meta) in results.documents.iter().zip(results.metadata.iter()) {
            let course_title = meta.course_title.as_deref().unwrap_or("unknown");

            let label = match meta.lesson_number {
                Some(n) => format!("{} - Lesson {}", course_title, n),
                None => course_title.to_string(),
            };

            let link = match meta.lesson_number {
                Some(n) => self.lesson_link(course_title, n).await,
                None => None,
            };

            blocks.push(format!("[{}]\n{}", label, doc));
            sources.push(SourceCitation::new(label, link));
        }

        self.last_sources.replace(sources);
        blocks.join("\n\n")
    }

    /// Per-lesson link from the catalog. Any lookup failure yields None.
    async fn lesson_link(&self, course_title: &str, lesson_number: i64) -> Option<String> {
        let entry = match self.store.get_catalog_entry(course_title).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("no catalog entry for '{}'", course_title);
                return None;
            }
            Err(e) => {
                warn!("Error retrieving lesson link for '{}': {}", course_title, e);
                return None;
            }
        };

        entry.lesson_link(lesson_number).unwrap_or_else(|e| {
            warn!("Error retrieving lesson link for '{}': {}", course_title, e);
            None
        })
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            SEARCH_TOOL_NAME,
            "Search course materials with smart course name matching and lesson filtering",
        )
        .with_parameter(ToolParameter::required(
            "query",
            ParamType::String,
            "What to search for in the course content",
        ))
        .with_parameter(ToolParameter::optional(
            "course_name",
            ParamType::String,
            "Course title (partial matches work, e.g. 'MCP', 'Introduction')",
        ))
        .with_parameter(ToolParameter::optional(
            "lesson_number",
            ParamType::Integer,
            "Specific lesson number to search within (e.g. 1, 2, 3)",
        ))
    }

    async fn execute(&self, input: Value) -> Result<String, eyre::Error> {
        let args: SearchArgs = serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
            message: e.to_string(),
        })?;

        Ok(self
            .search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await)
    }

    fn citations(&self) -> Vec<SourceCitation> {
        self.last_sources.get()
    }

    fn clear_citations(&self) {
        self.last_sources.clear();
    }
}
