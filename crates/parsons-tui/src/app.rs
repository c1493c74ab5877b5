use std::io;
use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use parsons_core::protocol::TASK_MAX_LEN;
use parsons_core::{BoardController, CheckOutcome, Hint, HintOutcome, Point};

use crate::net::GenerateClient;
use crate::session::{DragState, Screen, Session};
use crate::ui;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_run())
}

async fn async_run() -> Result<(), Box<dyn std::error::Error>> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut session = Session::new(GenerateClient::load_api_key());
    let client = GenerateClient::new();

    let result = run_loop(&mut terminal, &mut session, &client).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    client: &GenerateClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut event_stream = EventStream::new();
    // Periodic redraw keeps the hint-cooldown countdown moving.
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw(f, session))?;

        // A scheduled generation runs while the "generating" screen shows.
        if session.pending_generate {
            session.pending_generate = false;
            let task = session.task_input.clone();
            let result = client.generate(&task, session.api_key.clone()).await;
            session.apply_generated(result);
            continue;
        }

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if handle_key(session, key) {
                            return Ok(());
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => handle_mouse(session, mouse),
                    _ => {}
                }
            }
            _ = tokio::time::sleep(tick_rate) => {}
        }
    }
}

// ── Keyboard ────────────────────────────────────────────────────────────

fn handle_key(session: &mut Session, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match session.screen {
        Screen::TaskInput => handle_task_input_key(session, key),
        Screen::ApiKeyInput => handle_api_key_key(session, key),
        Screen::Generating => false,
        Screen::Playing => handle_playing_key(session, key),
    }
}

fn handle_task_input_key(session: &mut Session, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => session.start_generation(),
        KeyCode::Tab => {
            session.key_input = session.api_key.clone().unwrap_or_default();
            session.screen = Screen::ApiKeyInput;
        }
        KeyCode::Backspace => {
            session.task_input.pop();
        }
        KeyCode::Esc => return true,
        KeyCode::Char(c) => {
            if session.task_input.len() < TASK_MAX_LEN {
                session.task_input.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_api_key_key(session: &mut Session, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => {
            let entered = session.key_input.trim().to_string();
            if entered.is_empty() {
                session.api_key = None;
                session.status = Some("No API key set; sample puzzles will be used.".to_string());
            } else {
                match GenerateClient::save_api_key(&entered) {
                    Ok(()) => session.status = Some("API key saved.".to_string()),
                    Err(e) => session.status = Some(format!("Could not save key: {}", e)),
                }
                session.api_key = Some(entered);
            }
            session.screen = Screen::TaskInput;
        }
        KeyCode::Esc => session.screen = Screen::TaskInput,
        KeyCode::Backspace => {
            session.key_input.pop();
        }
        KeyCode::Char(c) => session.key_input.push(c),
        _ => {}
    }
    false
}

fn handle_playing_key(session: &mut Session, key: KeyEvent) -> bool {
    if session.show_quit_confirm {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return true,
            _ => session.show_quit_confirm = false,
        }
        return false;
    }

    if session.show_success {
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('N') => session.start_over(),
            KeyCode::Enter | KeyCode::Esc => session.show_success = false,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char(c) => return handle_playing_char(session, c, key.modifiers),
        KeyCode::Esc => session.show_quit_confirm = true,
        _ => {}
    }
    false
}

fn handle_playing_char(session: &mut Session, c: char, modifiers: KeyModifiers) -> bool {
    match c {
        'c' | 'C' => check(session),
        'h' | 'H' => hint(session),
        'z' if modifiers.contains(KeyModifiers::CONTROL) => undo(session),
        'y' if modifiers.contains(KeyModifiers::CONTROL) => redo(session),
        'u' | 'U' => undo(session),
        'r' | 'R' => redo(session),
        'n' | 'N' => session.start_over(),
        'q' | 'Q' => session.show_quit_confirm = true,
        _ => {}
    }
    false
}

fn check(session: &mut Session) {
    let Some(board) = session.board.as_mut() else {
        return;
    };
    match board.check() {
        CheckOutcome::Solved => {
            session.show_success = true;
            session.status = Some("Puzzle solved!".to_string());
        }
        CheckOutcome::Incorrect(ids) => {
            session.status = Some(format!("{} block(s) are misplaced.", ids.len()));
        }
    }
}

fn hint(session: &mut Session) {
    let Some(board) = session.board.as_mut() else {
        return;
    };
    match board.hint() {
        HintOutcome::Nudge(hint) => {
            session.status = Some(format!(
                "Try moving the highlighted block {}.",
                direction_label(&hint)
            ));
        }
        HintOutcome::AllCorrect => {
            session.status = Some("All blocks are correctly placed! No hints needed.".to_string());
        }
        HintOutcome::CoolingDown => {
            session.status = Some("Hint is recharging.".to_string());
        }
    }
}

fn direction_label(hint: &Hint) -> String {
    let vertical = match hint.dy {
        -1 => "up",
        1 => "down",
        _ => "",
    };
    let horizontal = match hint.dx {
        -1 => "left",
        1 => "right",
        _ => "",
    };
    match (vertical, horizontal) {
        (v, "") => v.to_string(),
        ("", h) => h.to_string(),
        (v, h) => format!("{} and {}", v, h),
    }
}

fn undo(session: &mut Session) {
    let Some(board) = session.board.as_mut() else {
        return;
    };
    if board.undo() {
        session.status = None;
    } else {
        session.status = Some("Nothing to undo.".to_string());
    }
}

fn redo(session: &mut Session) {
    let Some(board) = session.board.as_mut() else {
        return;
    };
    if board.redo() {
        session.status = None;
    } else {
        session.status = Some("Nothing to redo.".to_string());
    }
}

// ── Mouse ───────────────────────────────────────────────────────────────

fn handle_mouse(session: &mut Session, mouse: MouseEvent) {
    if session.screen != Screen::Playing || session.show_success || session.show_quit_confirm {
        return;
    }
    let Some(board) = session.board.as_mut() else {
        return;
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let px = ui::cell_to_board(mouse.column, mouse.row);
            if let Some(id) = block_at(board, px) {
                session.status = board.puzzle().block(&id).map(|b| b.explanation.clone());
                session.drag = Some(DragState {
                    block_id: id,
                    start_col: mouse.column,
                    start_row: mouse.row,
                    active: false,
                    preview: None,
                });
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(drag) = session.drag.as_mut() {
                if !drag.active {
                    drag.active = true;
                    board.drag_started(&drag.block_id);
                }
                let delta = drag_delta(drag, mouse.column, mouse.row);
                drag.preview = board.drag_moved(&drag.block_id, delta);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(drag) = session.drag.take() {
                if drag.active {
                    let delta = drag_delta(&drag, mouse.column, mouse.row);
                    board.drag_ended(&drag.block_id, delta);
                    session.status = None;
                }
            }
        }
        _ => {}
    }
}

/// Topmost block under a board-pixel position. Later placements draw on
/// top, so search in reverse.
fn block_at(board: &BoardController, px: Point) -> Option<String> {
    let metrics = board.metrics();
    board
        .placements()
        .iter()
        .rev()
        .find(|p| {
            px.x >= p.pos.x
                && px.x < p.pos.x + metrics.block_width
                && px.y >= p.pos.y
                && px.y < p.pos.y + metrics.block_height
        })
        .map(|p| p.id.clone())
}

/// Pointer travel since mouse-down, converted to board pixels.
fn drag_delta(drag: &DragState, col: u16, row: u16) -> Point {
    Point::new(
        (col as f64 - drag.start_col as f64) * ui::PX_PER_COL,
        (row as f64 - drag.start_row as f64) * ui::PX_PER_ROW,
    )
}
