//! Caller-facing entry point: question in, answer and sources out

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::llm::LlmClient;
use crate::orchestrator::{DEFAULT_MAX_ROUNDS, Orchestrator};
use crate::session::SessionManager;
use crate::store::VectorStore;
use crate::tools::{CourseOutlineTool, CourseSearchTool, SourceCitation, ToolRegistry};

/// An answer with the sources it drew on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<SourceCitation>,
}

/// Answers course questions with the search and outline tools.
///
/// Every query gets its own [`ToolRegistry`] and tool instances, so
/// concurrent queries never see each other's citations.
pub struct CourseAssistant {
    orchestrator: Orchestrator,
    store: Arc<dyn VectorStore>,
    sessions: SessionManager,
    max_rounds: u32,
}

impl CourseAssistant {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            orchestrator: Orchestrator::new(llm),
            store,
            sessions: SessionManager::new(2),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.sessions = SessionManager::new(max_history);
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Fresh search and outline tools over the shared store
    pub fn build_registry(&self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CourseSearchTool::new(self.store.clone())))?;
        registry.register(Box::new(CourseOutlineTool::new(self.store.clone())))?;
        Ok(registry)
    }

    /// Answer one query. Citations are read after the loop, then cleared.
    pub async fn orchestrate(
        &self,
        query: &str,
        history: Option<&str>,
        max_rounds: u32,
    ) -> Result<Answer> {
        let registry = self.build_registry()?;

        let text = self.orchestrator.answer(query, history, &registry, max_rounds).await;

        let citations = registry.last_citations();
        registry.clear_citations();

        info!("answered with {} citations", citations.len());
        Ok(Answer { text, citations })
    }

    /// Answer within a session, feeding prior exchanges as history
    pub async fn ask(&self, query: &str, session_id: Option<&str>) -> Result<(Answer, String)> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };

        let history = self.sessions.history(&session_id);
        let answer = self.orchestrate(query, history.as_deref(), self.max_rounds).await?;
        self.sessions.add_exchange(&session_id, query, &answer.text);

        Ok((answer, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, MockLlmClient, ToolCall};
    use crate::store::{CourseDocument, InMemoryStore};
    use serde_json::json;

    fn store() -> Arc<dyn VectorStore> {
        Arc::new(
            InMemoryStore::default().with_course(
                CourseDocument::new("Intro to X")
                    .with_lesson(2, "Agents", Some("https://x.example/2"))
                    .with_chunk(Some(2), "Agents plan and call tools."),
            ),
        )
    }

    #[test]
    fn test_registry_has_both_tools() {
        let assistant = CourseAssistant::new(Arc::new(MockLlmClient::default()), store());
        let registry = assistant.build_registry().unwrap();
        assert_eq!(registry.tool_names(), vec!["search_course_content", "get_course_outline"]);
    }

    #[tokio::test]
    async fn test_orchestrate_returns_citations() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::tool_use(vec![ToolCall::new(
                "toolu_1",
                "search_course_content",
                json!({"query": "agents", "course_name": "Intro to X", "lesson_number": 2}),
            )]),
            CompletionResponse::text("Agents plan and call tools."),
        ]));
        let assistant = CourseAssistant::new(llm, store());

        let answer = assistant.orchestrate("What is in lesson 2?", None, 2).await.unwrap();

        assert_eq!(answer.text, "Agents plan and call tools.");
        assert_eq!(
            answer.citations,
            vec![SourceCitation::new(
                "Intro to X - Lesson 2",
                Some("https://x.example/2".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_ask_threads_session_history() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::text("First answer"),
            CompletionResponse::text("Second answer"),
        ]));
        let assistant = CourseAssistant::new(llm.clone(), store());

        let (_, session) = assistant.ask("first?", None).await.unwrap();
        let (answer, same) = assistant.ask("second?", Some(&session)).await.unwrap();

        assert_eq!(session, same);
        assert_eq!(answer.text, "Second answer");
        assert!(answer.citations.is_empty());
        assert!(llm.requests()[1]
            .system
            .contains("Previous conversation:\nUser: first?\nAssistant: First answer"));
    }
}
