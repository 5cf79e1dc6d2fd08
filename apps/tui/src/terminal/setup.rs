use color_eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout, Write};

/// Set up the terminal: raw mode, alternate screen, hidden cursor.
/// Partially-applied state is rolled back on failure.
pub fn setup() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    if let Err(e) = enable_raw_mode() {
        return Err(color_eyre::eyre::eyre!("Failed to enable raw mode: {e}"));
    }

    let mut out = stdout();
    if let Err(e) = execute!(out, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(color_eyre::eyre::eyre!(
            "Failed to enter alternate screen: {e}"
        ));
    }

    let backend = CrosstermBackend::new(out);
    let mut terminal = match Terminal::new(backend) {
        Ok(term) => term,
        Err(e) => {
            let _ = execute!(stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(color_eyre::eyre::eyre!("Failed to create terminal: {e}"));
        }
    };

    if terminal.clear().is_err() {
        // Not fatal, continue
    }
    if execute!(stdout(), cursor::Hide).is_err() {
        // Not fatal, continue
    }

    Ok(terminal)
}

/// Restore the terminal, tolerating partial failures so the shell prompt
/// comes back usable even after a crash.
pub fn cleanup(raw_mode: bool, alternate_screen: bool) {
    let mut out = stdout();

    let _ = execute!(out, cursor::Show);

    if alternate_screen {
        let _ = execute!(out, LeaveAlternateScreen);
    }

    if raw_mode {
        let _ = disable_raw_mode();
    }

    let _ = execute!(out, cursor::MoveToNextLine(1));
    let _ = out.flush();
}
