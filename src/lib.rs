//! course-qa - answer questions about course materials
//!
//! A language model answers questions with the help of two retrieval tools:
//! content search and course outlines. The orchestrator bounds how many
//! tool rounds a query may use and always finishes with prose.

pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod tools;

pub use assistant::{Answer, CourseAssistant};
pub use error::{CourseQaError, Result};
