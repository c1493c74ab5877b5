use crate::board::Placement;
use crate::geometry::{Point, TOLERANCE};
use crate::puzzle::Block;

/// Both axes must independently fall within tolerance.
pub fn within_tolerance(pos: Point, target: Point) -> bool {
    (pos.x - target.x).abs() <= TOLERANCE && (pos.y - target.y).abs() <= TOLERANCE
}

/// All positions where `block` counts as correctly placed: its own correct
/// position first, then the correct positions of every duplicate block.
///
/// Single source of duplicate-equivalence for both the validator and the
/// hint engine.
pub fn candidate_targets(block: &Block, blocks: &[Block]) -> Vec<Point> {
    let mut targets = vec![block.correct_position];
    for other in blocks {
        if block.is_duplicate_of(other) {
            targets.push(other.correct_position);
        }
    }
    targets
}

pub fn is_correctly_placed(block: &Block, blocks: &[Block], pos: Point) -> bool {
    candidate_targets(block, blocks)
        .iter()
        .any(|&target| within_tolerance(pos, target))
}

/// Ids of all blocks not resting at any acceptable position.
pub fn incorrect_blocks(blocks: &[Block], placements: &[Placement]) -> Vec<String> {
    let mut incorrect = Vec::new();
    for block in blocks {
        let Some(placement) = placements.iter().find(|p| p.id == block.id) else {
            continue;
        };
        if !is_correctly_placed(block, blocks, placement.pos) {
            incorrect.push(block.id.clone());
        }
    }
    incorrect
}

pub fn is_solved(blocks: &[Block], placements: &[Placement]) -> bool {
    incorrect_blocks(blocks, placements).is_empty()
}
