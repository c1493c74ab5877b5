use serde::{Deserialize, Serialize};

use crate::geometry::{INDENT_WIDTH, LINE_HEIGHT, Point};
use crate::protocol::LlmBlock;

/// Leftmost column of the assembled solution in the workspace.
const SOLUTION_X: f64 = 700.0;
/// First solution row.
const SOLUTION_TOP: f64 = 50.0;

/// One draggable fragment of the puzzle. Immutable once the puzzle is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub content: String,
    pub explanation: String,
    pub correct_position: Point,
}

impl Block {
    /// Blocks with identical trimmed content are interchangeable: either may
    /// rest at the other's correct position.
    pub fn is_duplicate_of(&self, other: &Block) -> bool {
        self.id != other.id && self.content.trim() == other.content.trim()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Puzzle {
    pub blocks: Vec<Block>,
}

impl Puzzle {
    /// Assemble a puzzle from generated fragments: deterministic ids, one
    /// solution row per fragment, indentation mapped onto the x grid.
    pub fn from_generated(blocks: Vec<LlmBlock>) -> Self {
        let blocks = blocks
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Block {
                id: format!("block-{}", index + 1),
                content: raw.code,
                explanation: raw.explanation,
                correct_position: Point::new(
                    SOLUTION_X + INDENT_WIDTH * raw.indentation as f64,
                    SOLUTION_TOP + LINE_HEIGHT * index as f64,
                ),
            })
            .collect();
        Self { blocks }
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_index(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
