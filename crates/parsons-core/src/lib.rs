pub mod board;
pub mod geometry;
pub mod hint;
pub mod history;
pub mod protocol;
pub mod puzzle;
pub mod validation;

pub use board::{BoardController, CheckOutcome, HintOutcome, Placement, Snapshot};
pub use geometry::{BoardMetrics, Point, snap_to_grid};
pub use hint::Hint;
pub use history::History;
pub use puzzle::{Block, Puzzle};
