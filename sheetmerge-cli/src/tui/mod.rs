//! Interactive terminal shell around the merge engine

mod app;
mod picker;
mod view;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub use app::Options;
pub use picker::is_workbook;

use app::{App, Flow};

/// Run the shell until the user quits
pub fn run(options: Options) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter the alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to initialize the terminal")?;

    let result = event_loop(&mut terminal, App::new(options));

    // restore the terminal even when the loop failed
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| view::draw(frame, &app))
            .context("failed to draw the interface")?;

        // blocking read: the shell has no background work to interleave
        if let Event::Key(key) = event::read().context("failed to read a terminal event")? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) == Flow::Exit {
                return Ok(());
            }
        }
    }
}
