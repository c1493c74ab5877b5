use serde::{Deserialize, Serialize};

/// Horizontal grid cell: one level of code indentation, in board pixels.
pub const INDENT_WIDTH: f64 = 20.0;

/// Vertical grid cell: one line of code, in board pixels.
pub const LINE_HEIGHT: f64 = 50.0;

/// Maximum per-axis distance from a correct position that still counts as
/// correctly placed.
pub const TOLERANCE: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta: Point) -> Point {
        Point {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed board rectangle and grid dimensions.
///
/// The board is split by `workspace_min_x`: blocks are assembled to the right
/// of it (the workspace), and unplaced blocks stack to the left of it (the
/// source region).
#[derive(Clone, Copy, Debug)]
pub struct BoardMetrics {
    pub width: f64,
    pub height: f64,
    /// Rendered size of a block; used to clamp drops fully onto the board.
    pub block_width: f64,
    pub block_height: f64,
    pub indent_width: f64,
    pub line_height: f64,
    /// Blocks dropped left of this column are sent back to the source stack.
    pub workspace_min_x: f64,
    /// Top-left of the source-region stack.
    pub source_origin: Point,
    /// Vertical distance between stacked source slots.
    pub source_spacing: f64,
    /// Extra space kept clear below the lowest droppable row.
    pub bottom_padding: f64,
}

impl Default for BoardMetrics {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 500.0,
            block_width: 300.0,
            block_height: 50.0,
            indent_width: INDENT_WIDTH,
            line_height: LINE_HEIGHT,
            workspace_min_x: 700.0,
            source_origin: Point::new(20.0, 20.0),
            source_spacing: 60.0,
            bottom_padding: 39.0,
        }
    }
}

impl BoardMetrics {
    /// Deterministic fallback slot for the block at `index` in puzzle order.
    pub fn source_slot(&self, index: usize) -> Point {
        Point::new(
            self.source_origin.x,
            self.source_origin.y + index as f64 * self.source_spacing,
        )
    }

    pub fn in_workspace(&self, pos: Point) -> bool {
        pos.x >= self.workspace_min_x
    }
}

fn snap_axis(raw: f64, cell: f64) -> f64 {
    // The grid origin sits one cell in from the board edge.
    cell + ((raw - cell) / cell).round() * cell
}

/// Largest grid point at or below `limit`, never below the grid origin.
fn grid_max(limit: f64, cell: f64) -> f64 {
    let aligned = cell + ((limit - cell) / cell).floor() * cell;
    aligned.max(cell)
}

/// Snap a raw position to the indent/line grid and clamp it onto the board.
///
/// Pure and idempotent: the clamp limits are themselves grid-aligned, so any
/// output of this function maps to itself.
pub fn snap_to_grid(raw: Point, metrics: &BoardMetrics) -> Point {
    let snapped_x = snap_axis(raw.x, metrics.indent_width);
    let snapped_y = snap_axis(raw.y, metrics.line_height);

    let max_x = grid_max(metrics.width - metrics.block_width, metrics.indent_width);
    let max_y = grid_max(
        metrics.height - metrics.block_height - metrics.bottom_padding,
        metrics.line_height,
    );

    Point::new(
        snapped_x.clamp(metrics.indent_width, max_x),
        snapped_y.clamp(metrics.line_height, max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_cell() {
        let m = BoardMetrics::default();
        let p = snap_to_grid(Point::new(707.0, 73.0), &m);
        assert_eq!(p, Point::new(700.0, 50.0));

        let p = snap_to_grid(Point::new(711.0, 78.0), &m);
        assert_eq!(p, Point::new(720.0, 100.0));
    }

    #[test]
    fn snap_is_idempotent() {
        let m = BoardMetrics::default();
        for raw in [
            Point::new(3.0, 12.0),
            Point::new(699.9, 250.1),
            Point::new(1390.0, 499.0),
            Point::new(-50.0, -50.0),
        ] {
            let once = snap_to_grid(raw, &m);
            assert_eq!(snap_to_grid(once, &m), once);
        }
    }

    #[test]
    fn clamps_into_board() {
        let m = BoardMetrics::default();
        let max_x = m.width - m.block_width;
        let max_y = m.height - m.block_height - m.bottom_padding;

        for raw in [
            Point::new(-1000.0, -1000.0),
            Point::new(10_000.0, 10_000.0),
            Point::new(0.0, 10_000.0),
            Point::new(10_000.0, 0.0),
        ] {
            let p = snap_to_grid(raw, &m);
            assert!(p.x >= m.indent_width && p.x <= max_x);
            assert!(p.y >= m.line_height && p.y <= max_y);
        }
    }

    #[test]
    fn bottom_padding_limits_lowest_row() {
        let m = BoardMetrics::default();
        let p = snap_to_grid(Point::new(700.0, m.height), &m);
        assert!(p.y <= m.height - m.block_height - m.bottom_padding);
    }

    #[test]
    fn source_slots_stack_downward() {
        let m = BoardMetrics::default();
        assert_eq!(m.source_slot(0), Point::new(20.0, 20.0));
        assert_eq!(m.source_slot(3), Point::new(20.0, 200.0));
    }
}
