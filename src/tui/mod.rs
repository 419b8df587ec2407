//! Terminal UI: plays against the simulated turtle and renders its canvas.

mod app;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::actuator::SimTurtle;
use crate::config::GameConfig;
use crate::controller::GameController;
use crate::input::{RawModeGuard, spawn_key_reader};
use app::App;

/// Keys buffered between the key reader and the controller.
const INPUT_BUFFER: usize = 32;

/// Runs an interactive game in the terminal until the player quits.
///
/// Logging must already be directed away from stdout.
pub async fn run_tui(config: GameConfig) -> Result<()> {
    info!("Starting Strictly Turtle TUI");

    let raw_mode = RawModeGuard::enable().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game(&mut terminal, config).await;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    drop(raw_mode);

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Wires the key reader, controller and renderer together.
#[instrument(skip_all)]
async fn run_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: GameConfig,
) -> Result<()> {
    let turtle = SimTurtle::new(*config.home(), *config.move_speed());
    let sim = turtle.handle();
    let layout = config.layout().clone();
    let tick = config.tick_interval();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);

    let mut controller = GameController::new(turtle, config).with_observer(event_tx);
    let controller_task = tokio::spawn(async move { controller.run(input_rx).await });
    let reader = spawn_key_reader(input_tx, tick);

    let mut app = App::new(sim.snapshot().pose.point());
    let mut redraw = tokio::time::interval(tick);

    info!("Entering render loop");
    while !app.stopped() {
        let snapshot = sim.snapshot();
        terminal.draw(|f| ui::draw(f, &app, &snapshot, &layout))?;

        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    warn!("Controller dropped its event channel");
                    break;
                };
                app.handle_event(event);
                while let Ok(event) = event_rx.try_recv() {
                    app.handle_event(event);
                }
            }
            _ = redraw.tick() => {}
        }
    }

    let final_state = controller_task.await.context("Controller task failed")?;
    info!(phase = %final_state.phase(), "Controller finished");

    match reader.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Key reader stopped with an I/O error"),
        Err(e) => warn!(error = %e, "Key reader task failed"),
    }
    Ok(())
}
