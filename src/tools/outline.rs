//! get_course_outline - course title, link and ordered lesson list

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::{ParamType, Tool, ToolDefinition, ToolError, ToolParameter};
use crate::store::VectorStore;

pub const OUTLINE_TOOL_NAME: &str = "get_course_outline";

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    course_name: String,
}

/// Renders a course outline from the catalog
pub struct CourseOutlineTool {
    store: Arc<dyn VectorStore>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Build the outline text. Every failure is reported as text.
    pub async fn outline(&self, course_name: &str) -> String {
        let course_title = match self.store.resolve_course_name(course_name).await {
            Ok(Some(title)) => title,
            Ok(None) => return format!("No course found matching '{}'", course_name),
            Err(e) => {
                warn!("course name resolution failed for '{}': {}", course_name, e);
                return format!("Error retrieving course outline: {}", e);
            }
        };

        let entry = match self.store.get_catalog_entry(&course_title).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return format!("Course metadata not found for '{}'", course_title),
            Err(e) => return format!("Error retrieving course outline: {}", e),
        };

        if entry.lessons_json.as_deref().is_none_or(str::is_empty) {
            return format!("No lesson information available for '{}'", entry.title);
        }

        let lessons = match entry.lessons() {
            Ok(lessons) => lessons,
            Err(e) => {
                warn!("malformed lesson list for '{}': {}", entry.title, e);
                return format!("Error retrieving course outline: {}", e);
            }
        };

        let mut lines = vec![
            format!("**Course:** {}", entry.title),
            format!(
                "**Course Link:** {}",
                entry.course_link.as_deref().unwrap_or("No link available")
            ),
            "**Lessons:**".to_string(),
        ];

        for lesson in &lessons {
            let number = lesson
                .lesson_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let title = lesson.lesson_title.as_deref().unwrap_or("Untitled");
            lines.push(format!("{}. {}", number, title));
        }

        lines.join("\n")
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            OUTLINE_TOOL_NAME,
            "Get course outline with title, link, and complete lesson list",
        )
        .with_parameter(ToolParameter::required(
            "course_name",
            ParamType::String,
            "Course title (partial matches work, e.g. 'MCP', 'Introduction')",
        ))
    }

    async fn execute(&self, input: Value) -> Result<String, eyre::Error> {
        let args: OutlineArgs = serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
            message: e.to_string(),
        })?;
        Ok(self.outline(&args.course_name).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CourseQaError, Result};
    use crate::store::{CatalogEntry, CourseDocument, InMemoryStore, SearchResults};
    use serde_json::json;

    struct CatalogOnly {
        entry: Option<CatalogEntry>,
    }

    #[async_trait]
    impl VectorStore for CatalogOnly {
        async fn search(&self, _q: &str, _c: Option<&str>, _l: Option<i64>) -> SearchResults {
            SearchResults::empty()
        }

        async fn resolve_course_name(&self, fuzzy: &str) -> Result<Option<String>> {
            if fuzzy == "broken" {
                return Err(CourseQaError::Store("index offline".to_string()));
            }
            Ok(Some("Intro to X".to_string()))
        }

        async fn get_catalog_entry(&self, _title: &str) -> Result<Option<CatalogEntry>> {
            Ok(self.entry.clone())
        }

        async fn course_titles(&self) -> Result<Vec<String>> {
            Ok(vec!["Intro to X".to_string()])
        }
    }

    fn tool_with(entry: Option<CatalogEntry>) -> CourseOutlineTool {
        CourseOutlineTool::new(Arc::new(CatalogOnly { entry }))
    }

    fn entry(lessons_json: Option<&str>, link: Option<&str>) -> Option<CatalogEntry> {
        Some(CatalogEntry {
            title: "Intro to X".to_string(),
            course_link: link.map(str::to_string),
            lessons_json: lessons_json.map(str::to_string),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_outline_renders_in_stored_order() {
        let store = InMemoryStore::default().with_course(
            CourseDocument::new("MCP: Build Rich-Context AI Apps")
                .with_link("https://courses.example/mcp")
                .with_lesson(0, "Introduction", None)
                .with_lesson(2, "Clients", None)
                .with_lesson(1, "Servers", None),
        );
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool.execute(json!({"course_name": "MCP"})).await.unwrap();

        assert_eq!(
            output,
            "**Course:** MCP: Build Rich-Context AI Apps\n\
             **Course Link:** https://courses.example/mcp\n\
             **Lessons:**\n\
             0. Introduction\n\
             2. Clients\n\
             1. Servers"
        );
    }

    #[tokio::test]
    async fn test_outline_without_link_or_titles() {
        let tool = tool_with(entry(
            Some(r#"[{"lesson_number": 1}, {"lesson_title": "Loose"}]"#),
            None,
        ));
        let output = tool.outline("x").await;
        assert!(output.contains("**Course Link:** No link available"));
        assert!(output.contains("1. Untitled"));
        assert!(output.contains("N/A. Loose"));
    }

    #[tokio::test]
    async fn test_outline_unknown_course() {
        let tool = CourseOutlineTool::new(Arc::new(InMemoryStore::default()));
        assert_eq!(tool.outline("Nothing").await, "No course found matching 'Nothing'");
    }

    #[tokio::test]
    async fn test_outline_missing_metadata() {
        assert_eq!(
            tool_with(None).outline("x").await,
            "Course metadata not found for 'Intro to X'"
        );
    }

    #[tokio::test]
    async fn test_outline_missing_lessons() {
        assert_eq!(
            tool_with(entry(None, None)).outline("x").await,
            "No lesson information available for 'Intro to X'"
        );
    }

    #[tokio::test]
    async fn test_outline_malformed_lessons() {
        let output = tool_with(entry(Some("[{oops"), None)).outline("x").await;
        assert!(output.starts_with("Error retrieving course outline:"));
    }

    #[tokio::test]
    async fn test_outline_resolution_failure_is_text() {
        let output = tool_with(None).outline("broken").await;
        assert!(output.starts_with("Error retrieving course outline:"));
    }

    #[tokio::test]
    async fn test_outline_has_no_citations() {
        let tool = tool_with(entry(Some("[]"), None));
        tool.outline("x").await;
        assert!(tool.citations().is_empty());
    }
}
