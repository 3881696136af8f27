// src/spinner.rs
//! Progress spinner for the slow steps (provider request, `git commit`).

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::task::JoinHandle;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

pub fn frame(tick: usize) -> &'static str {
    FRAMES[tick % FRAMES.len()]
}

/// Final line printed when a step ends.
pub fn status_line(ok: bool, message: &str) -> String {
    format!("{} {}", if ok { "✔" } else { "✖" }, message)
}

/// Animates on stderr while a step runs. Without a terminal it prints the
/// message once and the final status line.
pub struct Spinner {
    task: Option<JoinHandle<()>>,
    interactive: bool,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let interactive = io::stderr().is_terminal();
        if !interactive {
            eprintln!("{}", message);
            return Self {
                task: None,
                interactive,
            };
        }

        let _ = execute!(io::stderr(), Hide);
        let message = message.to_string();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_DURATION);
            for tick in 0usize.. {
                interval.tick().await;
                let _ = execute!(
                    io::stderr(),
                    MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    SetForegroundColor(Color::Cyan),
                    Print(frame(tick)),
                    ResetColor,
                    Print(format!(" {}", message))
                );
            }
        });

        Self {
            task: Some(task),
            interactive,
        }
    }

    pub async fn succeed(self, message: &str) {
        self.finish(true, message).await;
    }

    pub async fn fail(self, message: &str) {
        self.finish(false, message).await;
    }

    async fn finish(mut self, ok: bool, message: &str) {
        // Wait for the frame in flight so the status line is not overdrawn.
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        if self.interactive {
            let _ = execute!(
                io::stderr(),
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                SetForegroundColor(if ok { Color::Green } else { Color::Red }),
                Print(status_line(ok, message)),
                ResetColor,
                Print("\n"),
                Show
            );
        } else {
            eprintln!("{}", status_line(ok, message));
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = execute!(
                io::stderr(),
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Show
            );
        }
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cycle() {
        assert_eq!(frame(0), "⠋");
        assert_eq!(frame(FRAMES.len()), frame(0));
        assert_ne!(frame(1), frame(0));
    }

    #[test]
    fn status_line_marks_outcome() {
        assert_eq!(status_line(true, "Committed"), "✔ Committed");
        assert_eq!(status_line(false, "Commit failed"), "✖ Commit failed");
    }

    #[tokio::test]
    async fn finishing_stops_the_animation() {
        let spinner = Spinner::start("Working...");
        tokio::time::sleep(Duration::from_millis(10)).await;
        spinner.succeed("Done").await;
    }
}
