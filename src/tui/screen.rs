use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};

/// Switching a backend in and out of managed display mode.
///
/// Managed mode is what the dashboard draws into: raw input, alternate
/// screen, hidden cursor. Leaving it must put the terminal back the way the
/// shell had it.
pub trait ScreenMode: Backend {
    fn enter_managed(&mut self) -> io::Result<()>;
    fn leave_managed(&mut self) -> io::Result<()>;
}

impl<W: Write> ScreenMode for CrosstermBackend<W> {
    fn enter_managed(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        if let Err(err) = crossterm::execute!(self, EnterAlternateScreen, Hide) {
            // Half-entered is worse than not entered.
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(())
    }

    fn leave_managed(&mut self) -> io::Result<()> {
        let restored = crossterm::execute!(self, Show, LeaveAlternateScreen);
        // Raw mode goes even if the escape sequences could not be written.
        disable_raw_mode()?;
        restored
    }
}

/// In-memory backend has no terminal state to switch.
impl ScreenMode for TestBackend {
    fn enter_managed(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn leave_managed(&mut self) -> io::Result<()> {
        Ok(())
    }
}
