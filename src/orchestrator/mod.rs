//! Round-bounded, tool-augmented generation.
//!
//! Each query runs:
//! 1. Up to `max_rounds` tool rounds. A round sends the whole conversation
//!    plus tool schemas to the generator. A plain answer ends the query early.
//!    A tool request is dispatched through the registry and the results are
//!    appended as one turn.
//! 2. If the rounds run out, one final call with no tools attached, so the
//!    caller always gets prose back.
//!
//! Tool failures are isolated per call. A round where every call failed ends
//! the query, as does any generator failure. Nothing is retried.

pub mod prompt;

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};
use thiserror::Error;

use crate::error::CourseQaError;
use crate::llm::{CompletionRequest, LlmClient, Message, ToolCall, ToolChoice, ToolResult};
use crate::tools::ToolRegistry;

pub use prompt::{SYSTEM_PROMPT, build_system_prompt};

/// Default number of tool rounds before the forced final answer
pub const DEFAULT_MAX_ROUNDS: u32 = 2;

/// Where the loop is, as far as the instruction context is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// A generator call with tools attached
    ToolRound { round: u32, max_rounds: u32 },
    /// The closing tool-free call after the budget is spent
    Final,
}

/// Round counter; `current` never exceeds `max` and never goes down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundBudget {
    current: u32,
    max: u32,
}

impl RoundBudget {
    pub fn new(max: u32) -> Self {
        Self { current: 0, max }
    }

    /// Start the next round, returning its 1-based number, or None when spent
    pub fn advance(&mut self) -> Option<u32> {
        if self.current < self.max {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.max
    }
}

/// Terminal failures of a query. `Display` is the text handed to the caller.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Error in round {round}: {source}")]
    Generation {
        round: u32,
        #[source]
        source: CourseQaError,
    },

    #[error("Tool execution error in round {round}: All tool executions failed")]
    ToolExecution { round: u32 },

    #[error("Error generating final response: {0}")]
    FinalGeneration(#[source] CourseQaError),
}

/// Drives the generator/tool loop for one query at a time.
///
/// Holds no per-query state, so one instance can serve concurrent queries as
/// long as each query brings its own [`ToolRegistry`].
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Answer a query, flattening any terminal failure into its labeled text
    pub async fn answer(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &ToolRegistry,
        max_rounds: u32,
    ) -> String {
        match self.run(query, history, registry, max_rounds).await {
            Ok(text) => text,
            Err(e) => {
                warn!("query failed: {}", e);
                e.to_string()
            }
        }
    }

    /// Answer a query, keeping terminal failures typed
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &ToolRegistry,
        max_rounds: u32,
    ) -> Result<String, OrchestratorError> {
        let tools = registry.definitions();
        let mut messages = vec![Message::user(query)];
        let mut budget = RoundBudget::new(max_rounds);

        while let Some(round) = budget.advance() {
            let phase = RoundPhase::ToolRound {
                round,
                max_rounds: budget.max(),
            };
            info!("round {}/{}: calling {}", round, budget.max(), self.llm.model());

            let request = CompletionRequest::new(build_system_prompt(history, phase))
                .with_messages(messages.clone())
                .with_tools(tools.clone(), ToolChoice::Auto);

            let response = self
                .llm
                .complete(request)
                .await
                .map_err(|source| OrchestratorError::Generation { round, source })?;

            if !response.stop_reason.needs_continuation() {
                debug!("round {}: answered without tools", round);
                return Ok(response.content);
            }

            messages.push(Message::assistant_tool_use(&response.content, &response.tool_calls));

            let results = dispatch_batch(registry, &response.tool_calls).await;
            let succeeded = results.iter().filter(|r| !r.is_error).count();
            debug!(
                "round {}: {}/{} tool calls succeeded",
                round,
                succeeded,
                results.len()
            );

            if !results.is_empty() {
                messages.push(Message::tool_results(&results));
            }

            if succeeded == 0 {
                return Err(OrchestratorError::ToolExecution { round });
            }
        }

        info!("round budget of {} spent, requesting final answer", budget.max());
        let request = CompletionRequest::new(build_system_prompt(history, RoundPhase::Final))
            .with_messages(messages);

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(OrchestratorError::FinalGeneration)?;

        Ok(response.content)
    }
}

/// Run every call of a batch concurrently. Results keep call order and ids;
/// a failing call becomes an error result without affecting its siblings.
async fn dispatch_batch(registry: &ToolRegistry, calls: &[ToolCall]) -> Vec<ToolResult> {
    let pending = calls.iter().map(|call| async move {
        debug!("dispatching '{}' ({})", call.name, call.id);
        match registry.dispatch(&call.name, call.input.clone()).await {
            Ok(content) => ToolResult::success(&call.id, content),
            Err(e) => {
                warn!("tool '{}' ({}) failed: {}", call.name, call.id, e);
                ToolResult::error(&call.id, format!("Tool execution failed: {}", e))
            }
        }
    });

    join_all(pending).await
}
