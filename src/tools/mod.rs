//! Tool system for LLM interactions
//!
//! Tools give the model read access to the course catalog and content index.
//! Each tool publishes a [`ToolDefinition`] and executes against its own
//! backing store; the only state a tool keeps is its most recent citation set.

mod outline;
mod registry;
mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::CourseSearchTool;

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema advertised to the model; the name is the dispatch key
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the model-supplied arguments
    async fn execute(&self, input: Value) -> Result<String, eyre::Error>;

    /// Sources recorded by the most recent execution
    fn citations(&self) -> Vec<SourceCitation> {
        Vec::new()
    }

    /// Forget recorded sources
    fn clear_citations(&self) {}
}

/// A label and optional link identifying where retrieved text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub label: String,
    pub link: Option<String>,
}

impl SourceCitation {
    pub fn new(label: impl Into<String>, link: Option<String>) -> Self {
        Self {
            label: label.into(),
            link,
        }
    }
}

/// Holds a tool's most recent citations. Writes replace, never append.
#[derive(Debug, Default)]
pub struct CitationSlot {
    inner: Mutex<Vec<SourceCitation>>,
}

impl CitationSlot {
    pub fn replace(&self, citations: Vec<SourceCitation>) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = citations;
    }

    pub fn get(&self) -> Vec<SourceCitation> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Check a JSON value against this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
}

impl ToolParameter {
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Tool definition for the LLM API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// JSON Schema for the parameters
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            properties.insert(
                p.name.clone(),
                json!({
                    "type": p.param_type.as_str(),
                    "description": p.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Convert to Anthropic API schema format
    pub fn to_anthropic_schema(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema(),
        })
    }

    /// Check model-supplied arguments against the declared parameters.
    ///
    /// Null counts as absent. Unknown keys are ignored.
    pub fn validate(&self, input: &Value) -> Result<(), ToolError> {
        let Some(args) = input.as_object() else {
            return Err(ToolError::InvalidInput {
                message: format!("arguments for '{}' must be an object", self.name),
            });
        };

        for p in &self.parameters {
            match args.get(&p.name).filter(|v| !v.is_null()) {
                None if p.required => {
                    return Err(ToolError::MissingParameter {
                        tool: self.name.clone(),
                        parameter: p.name.clone(),
                    });
                }
                Some(value) if !p.param_type.accepts(value) => {
                    return Err(ToolError::WrongType {
                        parameter: p.name.clone(),
                        expected: p.param_type.as_str(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Errors raised while interpreting tool arguments
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Missing required parameter '{parameter}' for tool '{tool}'")]
    MissingParameter { tool: String, parameter: String },

    #[error("Parameter '{parameter}' must be of type {expected}")]
    WrongType { parameter: String, expected: &'static str },
}
