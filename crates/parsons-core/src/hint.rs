use std::time::Duration;

use rand::RngExt;

use crate::board::Placement;
use crate::geometry::{Point, TOLERANCE};
use crate::puzzle::Block;
use crate::validation::{candidate_targets, incorrect_blocks};

/// How long the hint control stays locked after a hint is issued.
pub const HINT_COOLDOWN: Duration = Duration::from_secs(10);

/// A nudge toward the nearest acceptable position for one misplaced block.
/// Components are -1, 0, or 1; an axis already within tolerance reads 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub block_id: String,
    pub dx: i8,
    pub dy: i8,
}

/// Pick one misplaced block uniformly at random and point it toward its
/// nearest valid target. Returns `None` when every block is correctly placed.
pub fn compute_hint<R: RngExt>(
    blocks: &[Block],
    placements: &[Placement],
    rng: &mut R,
) -> Option<Hint> {
    let incorrect = incorrect_blocks(blocks, placements);
    if incorrect.is_empty() {
        return None;
    }

    let block_id = &incorrect[rng.random_range(0..incorrect.len())];
    let block = blocks.iter().find(|b| &b.id == block_id)?;
    let pos = placements.iter().find(|p| &p.id == block_id)?.pos;

    let target = nearest_target(block, blocks, pos);
    Some(Hint {
        block_id: block_id.clone(),
        dx: axis_direction(target.x - pos.x),
        dy: axis_direction(target.y - pos.y),
    })
}

/// Of all acceptable positions for `block` (duplicates included), the one
/// closest to its current position. Earlier targets win exact-distance ties,
/// so the block's own slot is preferred.
fn nearest_target(block: &Block, blocks: &[Block], pos: Point) -> Point {
    let mut best = block.correct_position;
    let mut best_dist = pos.distance_to(best);
    for target in candidate_targets(block, blocks) {
        let dist = pos.distance_to(target);
        if dist < best_dist {
            best = target;
            best_dist = dist;
        }
    }
    best
}

fn axis_direction(diff: f64) -> i8 {
    if diff.abs() <= TOLERANCE {
        0
    } else {
        diff.signum() as i8
    }
}
