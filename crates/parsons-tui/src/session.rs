use rand::RngExt;
use rand::rng;

use parsons_core::protocol::{GenerateResponse, validate_task};
use parsons_core::{BoardController, Point};

/// Example tasks shown on the input screen.
const TASK_SUGGESTIONS: &[&str] = &[
    "Reverse a string in Python",
    "Count the vowels in a sentence",
    "Compute the factorial of a number",
    "Check whether a word is a palindrome",
    "Sum the even numbers in a list",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    TaskInput,
    ApiKeyInput,
    Generating,
    Playing,
}

/// An in-flight mouse drag, tracked in terminal cells until it is released.
pub struct DragState {
    pub block_id: String,
    pub start_col: u16,
    pub start_row: u16,
    /// Set once the pointer actually moves; a plain click never commits.
    pub active: bool,
    pub preview: Option<Point>,
}

/// All UI-side state around the board controller.
pub struct Session {
    pub screen: Screen,
    pub task_input: String,
    pub key_input: String,
    pub api_key: Option<String>,
    pub suggestion: &'static str,
    pub board: Option<BoardController>,
    pub drag: Option<DragState>,
    /// One-line message in the status bar (cleared on the next action).
    pub status: Option<String>,
    pub show_success: bool,
    pub show_quit_confirm: bool,
    /// Generation requested; executed by the event loop on its next turn.
    pub pending_generate: bool,
}

impl Session {
    pub fn new(api_key: Option<String>) -> Self {
        let suggestion = TASK_SUGGESTIONS[rng().random_range(0..TASK_SUGGESTIONS.len())];
        Self {
            screen: Screen::TaskInput,
            task_input: String::new(),
            key_input: String::new(),
            api_key,
            suggestion,
            board: None,
            drag: None,
            status: None,
            show_success: false,
            show_quit_confirm: false,
            pending_generate: false,
        }
    }

    /// Validate the task and hand generation off to the event loop.
    pub fn start_generation(&mut self) {
        match validate_task(&self.task_input) {
            Ok(task) => {
                self.task_input = task.to_string();
                self.status = None;
                self.screen = Screen::Generating;
                self.pending_generate = true;
            }
            Err(message) => self.status = Some(message),
        }
    }

    /// Install the generation result: a fresh board on success, an error
    /// message and a return to the input screen otherwise.
    pub fn apply_generated(
        &mut self,
        result: Result<GenerateResponse, Box<dyn std::error::Error + Send + Sync>>,
    ) {
        match result {
            Ok(response) => match response.puzzle {
                Some(puzzle) if response.success && !puzzle.blocks.is_empty() => {
                    self.board = Some(BoardController::new(puzzle));
                    self.drag = None;
                    self.show_success = false;
                    self.status = Some("Drag the blocks into the workspace.".to_string());
                    self.screen = Screen::Playing;
                }
                _ => {
                    self.status = Some(response.message);
                    self.screen = Screen::TaskInput;
                }
            },
            Err(e) => {
                self.status = Some(format!("Could not reach the puzzle server: {}", e));
                self.screen = Screen::TaskInput;
            }
        }
    }

    /// Back to the task screen for a new puzzle.
    pub fn start_over(&mut self) {
        self.board = None;
        self.drag = None;
        self.task_input.clear();
        self.status = None;
        self.show_success = false;
        self.screen = Screen::TaskInput;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsons_core::Puzzle;
    use parsons_core::protocol::LlmBlock;

    fn generated() -> GenerateResponse {
        GenerateResponse::ok(Puzzle::from_generated(vec![LlmBlock {
            code: "print(1)".into(),
            explanation: "prints".into(),
            indentation: 0,
        }]))
    }

    #[test]
    fn short_task_never_leaves_the_input_screen() {
        let mut session = Session::new(None);
        session.task_input = "tiny".to_string();
        session.start_generation();
        assert_eq!(session.screen, Screen::TaskInput);
        assert!(!session.pending_generate);
        assert!(session.status.is_some());
    }

    #[test]
    fn valid_task_schedules_generation() {
        let mut session = Session::new(None);
        session.task_input = "  reverse a string in python  ".to_string();
        session.start_generation();
        assert_eq!(session.screen, Screen::Generating);
        assert!(session.pending_generate);
        assert_eq!(session.task_input, "reverse a string in python");
    }

    #[test]
    fn successful_generation_enters_play() {
        let mut session = Session::new(None);
        session.apply_generated(Ok(generated()));
        assert_eq!(session.screen, Screen::Playing);
        assert!(session.board.is_some());
    }

    #[test]
    fn failed_generation_returns_to_input() {
        let mut session = Session::new(None);
        session.apply_generated(Ok(GenerateResponse::error("no quota")));
        assert_eq!(session.screen, Screen::TaskInput);
        assert!(session.board.is_none());
        assert_eq!(session.status.as_deref(), Some("no quota"));
    }
}
