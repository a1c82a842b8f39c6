//! Tool registry - registration, schema aggregation and dispatch by name

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use super::{SourceCitation, Tool, ToolDefinition};
use crate::error::CourseQaError;

/// Tools keyed by the name in their definition, kept in registration order.
///
/// Re-registering a name replaces the earlier tool in place (last write wins).
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its definition's name
    pub fn register(&mut self, tool: Box<dyn Tool>) -> crate::error::Result<()> {
        let name = tool.definition().name;
        if name.trim().is_empty() {
            return Err(CourseQaError::Config(
                "Tool must have a 'name' in its definition".to_string(),
            ));
        }

        match self.index.get(&name) {
            Some(&slot) => {
                debug!("replacing tool '{}'", name);
                self.tools[slot] = tool;
            }
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
        Ok(())
    }

    /// Tool definitions for the LLM, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name.
    ///
    /// An unknown name is not an error: the returned text goes back to the
    /// model like any other result. Invalid arguments and failures inside the
    /// tool are errors.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> eyre::Result<String> {
        let Some(tool) = self.get(name) else {
            return Ok(format!("Tool '{}' not found", name));
        };

        tool.definition().validate(&arguments)?;
        tool.execute(arguments).await
    }

    /// Citations of the first tool holding a non-empty set.
    ///
    /// Known limitations:
    /// - When several tools record citations in the same round, only the
    ///   earliest-registered one is reported.
    /// - A search that fails or finds nothing leaves the tool's earlier
    ///   citations in place, so they are still reported for the query.
    /// - Calls within a round run concurrently, so when one tool is called
    ///   twice in a round the set that finished last wins.
    pub fn last_citations(&self) -> Vec<SourceCitation> {
        self.tools
            .iter()
            .map(|t| t.citations())
            .find(|c| !c.is_empty())
            .unwrap_or_default()
    }

    /// Reset every tool's citations
    pub fn clear_citations(&self) {
        for tool in &self.tools {
            tool.clear_citations();
        }
    }

    /// Registered tool names, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.definition().name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }
}
