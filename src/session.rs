//! In-memory conversation sessions used to build history text

use std::collections::HashMap;
use std::sync::Mutex;

use crate::llm::Role;

#[derive(Debug, Clone)]
struct Turn {
    role: Role,
    content: String,
}

#[derive(Debug, Default)]
struct Sessions {
    next_id: u64,
    turns: HashMap<String, Vec<Turn>>,
}

/// Keeps the last `max_history` exchanges of each session. Nothing is persisted.
#[derive(Debug)]
pub struct SessionManager {
    max_history: usize,
    inner: Mutex<Sessions>,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            inner: Mutex::new(Sessions::default()),
        }
    }

    /// Start a new session and return its id
    pub fn create_session(&self) -> String {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = format!("session_{}", inner.next_id);
        inner.turns.insert(id.clone(), Vec::new());
        id
    }

    /// Record one question/answer exchange
    pub fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let turns = inner.turns.entry(session_id.to_string()).or_default();
        turns.push(Turn {
            role: Role::User,
            content: question.to_string(),
        });
        turns.push(Turn {
            role: Role::Assistant,
            content: answer.to_string(),
        });

        let keep = self.max_history * 2;
        if turns.len() > keep {
            let excess = turns.len() - keep;
            turns.drain(..excess);
        }
    }

    /// History as "User: ..." / "Assistant: ..." lines, or None if empty
    pub fn history(&self, session_id: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let turns = inner.turns.get(session_id).filter(|t| !t.is_empty())?;

        let lines: Vec<String> = turns
            .iter()
            .map(|t| {
                let speaker = match t.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, t.content)
            })
            .collect();
        Some(lines.join("\n"))
    }

    pub fn clear_session(&self, session_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.turns.remove(session_id);
    }
}
