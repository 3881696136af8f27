// src/ui/mod.rs
//! Terminal forms: the candidate picklist and the provider settings wizard.
//!
//! Each form is a plain state object driven by [`Form::update`]; rendering
//! and event translation live here so the transitions stay testable
//! without a terminal.

pub mod picklist;
pub mod wizard;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::Rect,
    prelude::*,
    style::{Color, Modifier, Style},
};
use std::io::{self, Stdout};
use tracing::debug;

pub use picklist::Picklist;
pub use wizard::SettingsWizard;

// =============================================================================
// EVENTS
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Up,
    Down,
    Tab,
    BackTab,
    Confirm,
    Cancel,
    Backspace,
    Char(char),
    /// Pointer activation of the form's n-th clickable slot.
    Click(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus<T> {
    Active,
    Submitted(T),
    Cancelled,
}

pub trait Form {
    type Output;

    fn update(&mut self, event: FormEvent) -> FormStatus<Self::Output>;

    fn render(&self, frame: &mut Frame);

    /// Maps a left click at an absolute cell to a [`FormEvent::Click`].
    fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<FormEvent>;
}

/// Keyboard mapping shared by both forms.
pub fn translate_key(key: KeyEvent) -> Option<FormEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(FormEvent::Cancel),
        KeyCode::Esc => Some(FormEvent::Cancel),
        KeyCode::Enter => Some(FormEvent::Confirm),
        KeyCode::Tab => Some(FormEvent::Tab),
        KeyCode::BackTab => Some(FormEvent::BackTab),
        KeyCode::Up => Some(FormEvent::Up),
        KeyCode::Down => Some(FormEvent::Down),
        KeyCode::Backspace => Some(FormEvent::Backspace),
        KeyCode::Char(c) if !ctrl => Some(FormEvent::Char(c)),
        _ => None,
    }
}

// =============================================================================
// TERMINAL SESSION
// =============================================================================
/// Raw mode + alternate screen for the lifetime of the value.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub fn start() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Draws and feeds events to `form` until it submits (`Some`) or is
/// cancelled (`None`). The screen is torn down before returning.
pub fn run_form<F: Form>(form: &mut F) -> Result<Option<F::Output>> {
    let mut session = TerminalSession::start()?;
    let mut area = Rect::default();

    loop {
        session.terminal.draw(|f| {
            area = f.area();
            form.render(f);
        })?;

        let form_event = match event::read()? {
            Event::Key(key) => translate_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    form.hit_test(area, mouse.column, mouse.row)
                }
                _ => None,
            },
            _ => None,
        };

        let Some(form_event) = form_event else {
            continue;
        };
        debug!(?form_event, "form event");

        match form.update(form_event) {
            FormStatus::Active => {}
            FormStatus::Submitted(output) => return Ok(Some(output)),
            FormStatus::Cancelled => return Ok(None),
        }
    }
}

// =============================================================================
// THEME
// =============================================================================
pub(crate) struct Theme;

impl Theme {
    pub const HEADER: Style = Style::new().fg(Color::White).bg(Color::Blue);
    pub const FOCUS: Style = Style::new().fg(Color::White).bg(Color::Blue);
    pub const CHECKED: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
    pub const HINT: Style = Style::new().fg(Color::DarkGray);
    pub const ERROR: Style = Style::new().fg(Color::Red);
}

/// `(*)`/`( )` prefix used by both forms.
pub(crate) fn radio_mark(checked: bool) -> &'static str {
    if checked {
        "(*) "
    } else {
        "( ) "
    }
}

/// Single-row rect inside `area`, clipped to it; `None` when off-screen.
pub(crate) fn row_rect(area: Rect, x_offset: u16, y_offset: u16) -> Option<Rect> {
    if y_offset >= area.height || x_offset >= area.width {
        return None;
    }
    Some(Rect {
        x: area.x + x_offset,
        y: area.y + y_offset,
        width: area.width - x_offset,
        height: 1,
    })
}
