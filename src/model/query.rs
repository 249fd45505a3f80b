//! Persona and task query.

use serde::{Deserialize, Serialize};

/// The user role and goal that sections are ranked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Who is asking (e.g., "Investment Analyst")
    pub persona_description: String,

    /// What they need done (e.g., "assess market risk")
    pub task_description: String,
}

impl Query {
    /// Create a new query.
    pub fn new(persona: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            persona_description: persona.into(),
            task_description: task.into(),
        }
    }

    /// Persona and task concatenated, the text scored against sections.
    pub fn text(&self) -> String {
        format!(
            "{} {}",
            self.persona_description.trim(),
            self.task_description.trim()
        )
    }

    /// Check if both persona and task are blank.
    pub fn is_blank(&self) -> bool {
        self.persona_description.trim().is_empty() && self.task_description.trim().is_empty()
    }
}
