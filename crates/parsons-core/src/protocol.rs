use serde::{Deserialize, Serialize};

use crate::puzzle::Puzzle;

pub const TASK_MIN_LEN: usize = 10;
pub const TASK_MAX_LEN: usize = 500;

/// Client request to the puzzle-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub task: String,
    /// Upstream LLM key supplied by the user; the server falls back to its
    /// own configured key, then to the built-in sample puzzles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// One fragment as the language model emits it, before layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBlock {
    pub code: String,
    pub explanation: String,
    pub indentation: u32,
}

/// The JSON document the language model is instructed to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmPuzzle {
    pub blocks: Vec<LlmBlock>,
}

/// Service reply: a puzzle on success, a user-facing message otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub puzzle: Option<Puzzle>,
}

impl GenerateResponse {
    pub fn ok(puzzle: Puzzle) -> Self {
        Self {
            success: true,
            message: "Puzzle generated".to_string(),
            puzzle: Some(puzzle),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            puzzle: None,
        }
    }
}

/// Trim and bounds-check a task description.
pub fn validate_task(task: &str) -> Result<&str, String> {
    let task = task.trim();
    if task.len() < TASK_MIN_LEN {
        return Err(format!(
            "A minimum of {} characters is required.",
            TASK_MIN_LEN
        ));
    }
    if task.len() > TASK_MAX_LEN {
        return Err(format!("A maximum of {} characters is allowed.", TASK_MAX_LEN));
    }
    Ok(task)
}
