use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
};

use parsons_core::{BoardController, Point};

use crate::session::{Screen, Session};

// ── Board scale ──────────────────────────────────────────────────────────────

/// Board pixels represented by one terminal column / row.
pub const PX_PER_COL: f64 = 10.0;
pub const PX_PER_ROW: f64 = 25.0;

/// First cell inside the board frame. The frame is always anchored at the
/// terminal's top-left corner, so these are absolute screen cells too.
pub const BOARD_ORIGIN_COL: u16 = 1;
pub const BOARD_ORIGIN_ROW: u16 = 1;

/// Screen cell → board pixel, relative to the board origin.
pub fn cell_to_board(col: u16, row: u16) -> Point {
    Point::new(
        col.saturating_sub(BOARD_ORIGIN_COL) as f64 * PX_PER_COL,
        row.saturating_sub(BOARD_ORIGIN_ROW) as f64 * PX_PER_ROW,
    )
}

// ── Public entry point ───────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, session: &Session) {
    match session.screen {
        Screen::TaskInput => draw_task_input(f, session),
        Screen::ApiKeyInput => draw_api_key_input(f, session),
        Screen::Generating => draw_generating(f, session),
        Screen::Playing => draw_board(f, session),
    }

    if session.show_success {
        draw_success(f);
    }
    if session.show_quit_confirm {
        draw_quit_confirm(f);
    }
}

// ── Task input screen ────────────────────────────────────────────────────────

fn draw_task_input(f: &mut Frame, session: &Session) {
    let area = f.area();
    let popup = center_rect(64, 14, area);

    let block = Block::bordered()
        .title(" New Puzzle ")
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));

    let key_note = match &session.api_key {
        Some(_) => "API key: saved",
        None => "API key: none (sample puzzles)",
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "PARSONS PUZZLE",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Describe a programming task, then arrange the generated code.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                session.task_input.as_str(),
                Style::default().fg(Color::White),
            ),
            Span::styled("▌", Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            format!("e.g. {}", session.suggestion),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(key_note, Style::default().fg(Color::DarkGray))),
    ];

    if let Some(status) = &session.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter generate   Tab API key   Esc quit",
        Style::default().fg(Color::DarkGray),
    )));

    let text = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    f.render_widget(text, popup);
}

// ── API key screen ───────────────────────────────────────────────────────────

fn draw_api_key_input(f: &mut Frame, session: &Session) {
    let area = f.area();
    let popup = center_rect(64, 10, area);

    let block = Block::bordered()
        .title(" API Key ")
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Yellow));

    let masked = "•".repeat(session.key_input.chars().count());

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Paste the key for the puzzle generator.",
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "Leave empty to play with the built-in sample puzzles.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::DarkGray)),
            Span::styled(masked, Style::default().fg(Color::White)),
            Span::styled("▌", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Saved in your user config directory.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Enter save   Esc back",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(block)
    .alignment(Alignment::Center);

    f.render_widget(text, popup);
}

// ── Generating screen ────────────────────────────────────────────────────────

fn draw_generating(f: &mut Frame, session: &Session) {
    let area = f.area();
    let popup = center_rect(56, 7, area);

    let block = Block::bordered()
        .title(" Working ")
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Generating puzzle…",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            session.task_input.clone(),
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(block)
    .alignment(Alignment::Center);

    f.render_widget(text, popup);
}

// ── Board screen ─────────────────────────────────────────────────────────────

fn draw_board(f: &mut Frame, session: &Session) {
    let area = f.area();
    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).split(area);
    let board_area = chunks[0];

    let Some(board) = session.board.as_ref() else {
        return;
    };

    let frame_block = Block::bordered()
        .title(" PARSONS PUZZLE ")
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(frame_block, board_area);

    let inner = board_area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });

    draw_divider(f, board, inner);

    // The dragged block renders last, at its live preview position.
    let dragged = session
        .drag
        .as_ref()
        .filter(|d| d.active)
        .map(|d| d.block_id.as_str());

    for placement in board.placements() {
        if Some(placement.id.as_str()) == dragged {
            continue;
        }
        draw_puzzle_block(f, session, board, &placement.id, placement.pos, inner);
    }
    if let Some(drag) = session.drag.as_ref().filter(|d| d.active) {
        let pos = drag
            .preview
            .or_else(|| board.position_of(&drag.block_id))
            .unwrap_or(Point::new(0.0, 0.0));
        draw_puzzle_block(f, session, board, &drag.block_id, pos, inner);
    }

    draw_status_bar(f, session, board, chunks[1]);
}

/// Dotted column marking the workspace boundary.
fn draw_divider(f: &mut Frame, board: &BoardController, inner: Rect) {
    let divider_col =
        BOARD_ORIGIN_COL + (board.metrics().workspace_min_x / PX_PER_COL).round() as u16;
    if divider_col >= inner.right() {
        return;
    }

    let lines: Vec<Line> = (0..inner.height).map(|_| Line::from("┊")).collect();
    let rect = Rect {
        x: divider_col,
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(Color::DarkGray)),
        rect,
    );
}

fn draw_puzzle_block(
    f: &mut Frame,
    session: &Session,
    board: &BoardController,
    id: &str,
    pos: Point,
    inner: Rect,
) {
    let Some(block) = board.puzzle().block(id) else {
        return;
    };
    let metrics = board.metrics();

    let rect = Rect {
        x: BOARD_ORIGIN_COL + (pos.x / PX_PER_COL) as u16,
        y: BOARD_ORIGIN_ROW + (pos.y / PX_PER_ROW) as u16,
        width: (metrics.block_width / PX_PER_COL) as u16,
        height: (metrics.block_height / PX_PER_ROW).max(1.0) as u16,
    }
    .intersection(inner);
    if rect.is_empty() {
        return;
    }

    let dragging = session
        .drag
        .as_ref()
        .is_some_and(|d| d.active && d.block_id == id);
    let hinted = board
        .current_hint()
        .is_some_and(|hint| hint.block_id == id);
    let incorrect = board.incorrect().iter().any(|bad| bad == id);

    let style = if dragging {
        Style::default().bg(Color::Cyan).fg(Color::Black)
    } else if incorrect {
        Style::default().bg(Color::Red).fg(Color::White)
    } else if hinted {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };

    let width = rect.width as usize;
    let code = truncate(&block.content, width.saturating_sub(1));

    let second = if hinted {
        let arrow = board
            .current_hint()
            .map(|hint| hint_arrow(hint.dx, hint.dy))
            .unwrap_or("·");
        format!(" {} move this block", arrow)
    } else {
        format!(" {}", truncate(&block.explanation, width.saturating_sub(2)))
    };

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}", code),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(second, style)),
    ])
    .style(style);

    f.render_widget(text, rect);
}

fn draw_status_bar(f: &mut Frame, session: &Session, board: &BoardController, area: Rect) {
    let mut message = session.status.clone().unwrap_or_default();
    if let Some(remaining) = board.hint_cooldown_remaining(Instant::now()) {
        if !message.is_empty() {
            message.push_str("   ");
        }
        message.push_str(&format!("hint ready in {}s", remaining.as_secs() + 1));
    }

    let lines = vec![
        Line::from(Span::styled(
            " c check   h hint   u undo (Ctrl-Z)   r redo (Ctrl-Y)   n new   q quit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

// ── Popups ───────────────────────────────────────────────────────────────────

fn draw_success(f: &mut Frame) {
    let area = f.area();
    let popup = center_rect(48, 10, area);

    f.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(" Solved! ")
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::Green));

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "CONGRATULATIONS!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "You've successfully solved the puzzle!",
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "All code blocks are in their correct positions.",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter close   N new puzzle",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(block)
    .alignment(Alignment::Center);

    f.render_widget(text, popup);
}

fn draw_quit_confirm(f: &mut Frame) {
    let area = f.area();
    let popup = center_rect(36, 7, area);

    f.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(" Quit? ")
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Red));

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Are you sure you want to quit?",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "Y",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("/", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" Yes   ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Any key",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" No", Style::default().fg(Color::Gray)),
        ]),
    ])
    .block(block)
    .alignment(Alignment::Center);

    f.render_widget(text, popup);
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vert = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(area);

    let horiz = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(width),
        Constraint::Min(0),
    ])
    .split(vert[1]);

    horiz[1]
}

fn truncate(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    text.chars().take(max).collect()
}

fn hint_arrow(dx: i8, dy: i8) -> &'static str {
    match (dx, dy) {
        (0, -1) => "↑",
        (0, 1) => "↓",
        (-1, 0) => "←",
        (1, 0) => "→",
        (-1, -1) => "↖",
        (1, -1) => "↗",
        (-1, 1) => "↙",
        (1, 1) => "↘",
        _ => "·",
    }
}
