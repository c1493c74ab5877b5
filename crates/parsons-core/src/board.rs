use std::time::{Duration, Instant};

use rand::RngExt;
use rand::rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoardMetrics, Point, snap_to_grid};
use crate::hint::{HINT_COOLDOWN, Hint, compute_hint};
use crate::history::History;
use crate::puzzle::Puzzle;
use crate::validation;

/// Current board position of one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub pos: Point,
}

/// All block positions at one point in time, in puzzle order.
pub type Snapshot = Vec<Placement>;

#[derive(Clone, Debug, PartialEq)]
pub enum CheckOutcome {
    Solved,
    Incorrect(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum HintOutcome {
    Nudge(Hint),
    /// Nothing is misplaced; no hint needed.
    AllCorrect,
    /// A hint was issued less than the cooldown ago.
    CoolingDown,
}

/// Owns all mutable board state and serializes every transition: drag
/// lifecycle, check, hint, undo/redo. The UI layer only forwards events and
/// renders what it reads back.
pub struct BoardController {
    puzzle: Puzzle,
    metrics: BoardMetrics,
    positions: Vec<Placement>,
    history: History,
    active_id: Option<String>,
    incorrect: Vec<String>,
    hint: Option<Hint>,
    cooldown_until: Option<Instant>,
}

impl BoardController {
    pub fn new(puzzle: Puzzle) -> Self {
        Self::with_metrics(puzzle, BoardMetrics::default())
    }

    pub fn with_metrics(puzzle: Puzzle, metrics: BoardMetrics) -> Self {
        let positions = Self::initial_positions(&puzzle, &metrics);
        let history = History::new(positions.clone());
        Self {
            puzzle,
            metrics,
            positions,
            history,
            active_id: None,
            incorrect: Vec::new(),
            hint: None,
            cooldown_until: None,
        }
    }

    /// Replace the puzzle and rebuild placements and history from scratch.
    pub fn load_puzzle(&mut self, puzzle: Puzzle) {
        self.positions = Self::initial_positions(&puzzle, &self.metrics);
        self.history.reset(self.positions.clone());
        self.puzzle = puzzle;
        self.active_id = None;
        self.incorrect.clear();
        self.hint = None;
        self.cooldown_until = None;
    }

    /// One placement per block, stacked top to bottom in the source region.
    fn initial_positions(puzzle: &Puzzle, metrics: &BoardMetrics) -> Vec<Placement> {
        puzzle
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| Placement {
                id: block.id.clone(),
                pos: metrics.source_slot(index),
            })
            .collect()
    }

    // ── Drag lifecycle ──────────────────────────────────────────────────

    /// Mark a block as actively dragged. Presentational only.
    pub fn drag_started(&mut self, id: &str) {
        if self.position_of(id).is_some() {
            self.active_id = Some(id.to_string());
        }
    }

    /// Where the block would land right now. Does not commit anything.
    pub fn drag_moved(&self, id: &str, delta: Point) -> Option<Point> {
        let current = self.position_of(id)?;
        Some(snap_to_grid(current.offset(delta), &self.metrics))
    }

    /// Commit a drag: snap and clamp the drop point, reject drops outside
    /// the workspace or onto an occupied row (reverting to the block's
    /// source slot), record the result in history, and invalidate feedback.
    pub fn drag_ended(&mut self, id: &str, delta: Point) {
        self.active_id = None;

        // Events for ids we don't know are dropped silently.
        let Some(block_index) = self.puzzle.block_index(id) else {
            return;
        };
        let Some(current) = self.position_of(id) else {
            return;
        };

        let candidate = snap_to_grid(current.offset(delta), &self.metrics);
        let landed = if self.is_rejected(id, candidate) {
            self.metrics.source_slot(block_index)
        } else {
            candidate
        };

        if let Some(placement) = self.positions.iter_mut().find(|p| p.id == id) {
            placement.pos = landed;
        }

        self.history.push(self.positions.clone());
        self.clear_feedback();
    }

    fn is_rejected(&self, id: &str, candidate: Point) -> bool {
        if candidate.x < self.metrics.workspace_min_x {
            return true;
        }
        // A workspace row holds at most one block. Committed workspace
        // positions are always snapped, so exact comparison is safe.
        self.positions
            .iter()
            .any(|p| p.id != id && self.metrics.in_workspace(p.pos) && p.pos.y == candidate.y)
    }

    // ── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if let Some(snapshot) = self.history.undo() {
            self.positions = snapshot.clone();
            self.clear_feedback();
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if let Some(snapshot) = self.history.redo() {
            self.positions = snapshot.clone();
            self.clear_feedback();
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Check / hint ────────────────────────────────────────────────────

    pub fn check(&mut self) -> CheckOutcome {
        let incorrect = validation::incorrect_blocks(&self.puzzle.blocks, &self.positions);
        self.incorrect = incorrect.clone();
        if incorrect.is_empty() {
            CheckOutcome::Solved
        } else {
            CheckOutcome::Incorrect(incorrect)
        }
    }

    pub fn hint(&mut self) -> HintOutcome {
        self.hint_at(Instant::now(), &mut rng())
    }

    /// Hint with an explicit clock and randomness source.
    pub fn hint_at<R: RngExt>(&mut self, now: Instant, rng: &mut R) -> HintOutcome {
        if self.cooldown_active(now) {
            return HintOutcome::CoolingDown;
        }
        match compute_hint(&self.puzzle.blocks, &self.positions, rng) {
            Some(hint) => {
                self.hint = Some(hint.clone());
                self.cooldown_until = Some(now + HINT_COOLDOWN);
                HintOutcome::Nudge(hint)
            }
            None => HintOutcome::AllCorrect,
        }
    }

    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn hint_cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        self.cooldown_until
            .and_then(|until| until.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// A committed move outdates any highlighted mistakes and active hint.
    fn clear_feedback(&mut self) {
        self.incorrect.clear();
        self.hint = None;
    }

    // ── Read access for the UI ──────────────────────────────────────────

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn metrics(&self) -> &BoardMetrics {
        &self.metrics
    }

    pub fn placements(&self) -> &[Placement] {
        &self.positions
    }

    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.positions.iter().find(|p| p.id == id).map(|p| p.pos)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn incorrect(&self) -> &[String] {
        &self.incorrect
    }

    pub fn current_hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LlmBlock;
    use crate::puzzle::Block;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three_line_puzzle() -> Puzzle {
        // Correct positions: (700,50), (700,100), (700,150).
        Puzzle::from_generated(vec![
            LlmBlock {
                code: "def greet():".into(),
                explanation: "function header".into(),
                indentation: 0,
            },
            LlmBlock {
                code: "    print(\"hi\")".into(),
                explanation: "body".into(),
                indentation: 0,
            },
            LlmBlock {
                code: "greet()".into(),
                explanation: "call".into(),
                indentation: 0,
            },
        ])
    }

    /// Delta that drops `id` exactly on `target` from wherever it now sits.
    fn delta_to(board: &BoardController, id: &str, target: Point) -> Point {
        let current = board.position_of(id).unwrap();
        Point::new(target.x - current.x, target.y - current.y)
    }

    fn solve(board: &mut BoardController) {
        for (i, y) in [50.0, 100.0, 150.0].iter().enumerate() {
            let id = format!("block-{}", i + 1);
            let delta = delta_to(board, &id, Point::new(700.0, *y));
            board.drag_ended(&id, delta);
        }
    }

    #[test]
    fn initializes_in_the_source_stack() {
        let board = BoardController::new(three_line_puzzle());
        let placements = board.placements();
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0].pos, Point::new(20.0, 20.0));
        assert_eq!(placements[1].pos, Point::new(20.0, 80.0));
        assert_eq!(placements[2].pos, Point::new(20.0, 140.0));
        assert!(!board.can_undo());
        assert!(!board.can_redo());
    }

    #[test]
    fn solving_all_three_blocks_checks_clean() {
        let mut board = BoardController::new(three_line_puzzle());
        solve(&mut board);
        assert_eq!(board.check(), CheckOutcome::Solved);
    }

    #[test]
    fn rough_drop_snaps_onto_the_target() {
        let mut board = BoardController::new(three_line_puzzle());
        // Aim 7 px right and 18 px above the slot; snapping absorbs it.
        let delta = delta_to(&board, "block-1", Point::new(707.0, 32.0));
        board.drag_ended("block-1", delta);
        assert_eq!(board.position_of("block-1"), Some(Point::new(700.0, 50.0)));
    }

    #[test]
    fn far_off_block_is_reported_incorrect() {
        let mut board = BoardController::new(three_line_puzzle());
        solve(&mut board);
        // Move block-3 50 px below its slot.
        board.drag_ended("block-3", Point::new(0.0, 50.0));
        assert_eq!(
            board.check(),
            CheckOutcome::Incorrect(vec!["block-3".to_string()])
        );
    }

    #[test]
    fn drop_left_of_workspace_reverts_to_source_slot() {
        let mut board = BoardController::new(three_line_puzzle());
        solve(&mut board);
        // Drag block-2 back across the boundary.
        board.drag_ended("block-2", Point::new(-400.0, 0.0));
        assert_eq!(board.position_of("block-2"), Some(Point::new(20.0, 80.0)));
    }

    #[test]
    fn drop_on_occupied_row_reverts_to_source_slot() {
        let mut board = BoardController::new(three_line_puzzle());
        let delta = delta_to(&board, "block-1", Point::new(700.0, 50.0));
        board.drag_ended("block-1", delta);

        // block-2 aims at the same row.
        let delta = delta_to(&board, "block-2", Point::new(740.0, 50.0));
        board.drag_ended("block-2", delta);
        assert_eq!(board.position_of("block-2"), Some(Point::new(20.0, 80.0)));
    }

    #[test]
    fn source_stack_does_not_reserve_rows() {
        let mut board = BoardController::new(three_line_puzzle());
        // Only workspace blocks occupy rows; the stacked source blocks at
        // y 80 and 140 never reject a workspace drop.
        let delta = delta_to(&board, "block-1", Point::new(700.0, 100.0));
        board.drag_ended("block-1", delta);
        assert_eq!(board.position_of("block-1"), Some(Point::new(700.0, 100.0)));
    }

    #[test]
    fn unknown_block_id_is_ignored() {
        let mut board = BoardController::new(three_line_puzzle());
        let before = board.placements().to_vec();
        board.drag_started("bogus");
        board.drag_ended("bogus", Point::new(700.0, 100.0));
        assert_eq!(board.placements(), &before[..]);
        assert!(board.active_id().is_none());
        assert!(!board.can_undo());
    }

    #[test]
    fn drag_moved_previews_without_committing() {
        let board = BoardController::new(three_line_puzzle());
        let preview = board.drag_moved("block-1", Point::new(688.0, 37.0));
        assert_eq!(preview, Some(Point::new(700.0, 50.0)));
        assert_eq!(board.position_of("block-1"), Some(Point::new(20.0, 20.0)));
    }

    #[test]
    fn undo_redo_roundtrip() {
        let mut board = BoardController::new(three_line_puzzle());
        let delta = delta_to(&board, "block-1", Point::new(700.0, 50.0));
        board.drag_ended("block-1", delta);

        assert!(board.undo());
        assert_eq!(board.position_of("block-1"), Some(Point::new(20.0, 20.0)));
        assert!(board.redo());
        assert_eq!(board.position_of("block-1"), Some(Point::new(700.0, 50.0)));
        assert!(!board.redo());
    }

    #[test]
    fn drag_after_undo_discards_redo_branch() {
        let mut board = BoardController::new(three_line_puzzle());
        let delta = delta_to(&board, "block-1", Point::new(700.0, 50.0));
        board.drag_ended("block-1", delta);
        let delta = delta_to(&board, "block-2", Point::new(700.0, 100.0));
        board.drag_ended("block-2", delta);

        board.undo();
        let delta = delta_to(&board, "block-3", Point::new(700.0, 150.0));
        board.drag_ended("block-3", delta);

        assert!(!board.can_redo());
        // block-2 stays where the rewound snapshot put it.
        assert_eq!(board.position_of("block-2"), Some(Point::new(20.0, 80.0)));
    }

    #[test]
    fn committed_drag_clears_check_and_hint_feedback() {
        let mut board = BoardController::new(three_line_puzzle());
        board.check();
        assert!(!board.incorrect().is_empty());

        let mut rng = StdRng::seed_from_u64(11);
        board.hint_at(Instant::now(), &mut rng);
        assert!(board.current_hint().is_some());

        let delta = delta_to(&board, "block-1", Point::new(700.0, 50.0));
        board.drag_ended("block-1", delta);
        assert!(board.incorrect().is_empty());
        assert!(board.current_hint().is_none());
    }

    #[test]
    fn undo_clears_hint_state() {
        let mut board = BoardController::new(three_line_puzzle());
        let delta = delta_to(&board, "block-1", Point::new(700.0, 50.0));
        board.drag_ended("block-1", delta);

        let mut rng = StdRng::seed_from_u64(2);
        board.hint_at(Instant::now(), &mut rng);
        assert!(board.current_hint().is_some());

        board.undo();
        assert!(board.current_hint().is_none());
    }

    #[test]
    fn hint_cooldown_rejects_until_expired() {
        let mut board = BoardController::new(three_line_puzzle());
        let mut rng = StdRng::seed_from_u64(5);
        let t0 = Instant::now();

        assert!(matches!(board.hint_at(t0, &mut rng), HintOutcome::Nudge(_)));
        assert_eq!(
            board.hint_at(t0 + Duration::from_secs(5), &mut rng),
            HintOutcome::CoolingDown
        );
        assert!(matches!(
            board.hint_at(t0 + Duration::from_secs(10), &mut rng),
            HintOutcome::Nudge(_)
        ));
    }

    #[test]
    fn hint_on_solved_board_reports_all_correct() {
        let mut board = BoardController::new(three_line_puzzle());
        solve(&mut board);
        let mut rng = StdRng::seed_from_u64(5);
        let t0 = Instant::now();
        assert_eq!(board.hint_at(t0, &mut rng), HintOutcome::AllCorrect);
        // An informational outcome starts no cooldown.
        assert!(!board.cooldown_active(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn duplicate_blocks_validate_in_either_slot() {
        // Two "pass" lines at (700,50) and (700,200) around a middle line.
        let puzzle = Puzzle {
            blocks: vec![
                Block {
                    id: "p1".into(),
                    content: "pass".into(),
                    explanation: String::new(),
                    correct_position: Point::new(700.0, 50.0),
                },
                Block {
                    id: "mid".into(),
                    content: "x = 1".into(),
                    explanation: String::new(),
                    correct_position: Point::new(700.0, 100.0),
                },
                Block {
                    id: "p2".into(),
                    content: "pass".into(),
                    explanation: String::new(),
                    correct_position: Point::new(700.0, 200.0),
                },
            ],
        };
        let mut board = BoardController::new(puzzle);

        // p1 takes p2's slot and vice versa.
        let delta = delta_to(&board, "p1", Point::new(700.0, 200.0));
        board.drag_ended("p1", delta);
        let delta = delta_to(&board, "mid", Point::new(700.0, 100.0));
        board.drag_ended("mid", delta);
        let delta = delta_to(&board, "p2", Point::new(700.0, 50.0));
        board.drag_ended("p2", delta);

        assert_eq!(board.check(), CheckOutcome::Solved);
    }

    #[test]
    fn load_puzzle_rebuilds_everything() {
        let mut board = BoardController::new(three_line_puzzle());
        solve(&mut board);
        let mut rng = StdRng::seed_from_u64(3);
        board.hint_at(Instant::now(), &mut rng);

        board.load_puzzle(three_line_puzzle());
        assert_eq!(board.position_of("block-1"), Some(Point::new(20.0, 20.0)));
        assert!(!board.can_undo());
        assert!(board.current_hint().is_none());
        assert!(!board.cooldown_active(Instant::now()));
    }
}
