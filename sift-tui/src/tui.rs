use crate::app::{Action, App};
use crate::feeders::spawn_tui_feeders;
use crate::view;
use anyhow::Result;
use crossterm::{
    event::Event as CtEvent,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use sift_pipeline::{Pipeline, PipelineError, Presenter, Report, Stage};
use sift_runtime::SiftHandle;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const MAILBOX: usize = 256;

pub enum TuiMsg {
    Input(CtEvent),
    InputError(String),
    Tick,
    Progress(Stage),
    RunDone(Result<Report, PipelineError>),
}

/// Restores the terminal even when the loop bails out with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, Terminal<CrosstermBackend<Stdout>>)> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut term = Terminal::new(CrosstermBackend::new(stdout))?;
        term.clear()?;
        Ok((Self, term))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the interactive UI until the user quits. Cancels the runtime's shared
/// token on the way out so feeder tasks stop.
pub async fn run_tui(pipeline: Arc<Pipeline>, handle: SiftHandle) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<TuiMsg>(MAILBOX);
    let (_guard, mut term) = TerminalGuard::enter()?;
    spawn_tui_feeders(tx.clone(), &handle);

    let model = pipeline.model_name().to_string();
    let mut app = App::new();
    let tick_rate = Duration::from_millis(80);
    let mut last_draw = Instant::now();
    view::draw(&mut term, &app, &model)?;

    while let Some(msg) = rx.recv().await {
        match msg {
            TuiMsg::Input(CtEvent::Key(key)) => match app.handle_key(key) {
                Some(Action::Quit) => break,
                Some(Action::Ask(question)) => {
                    spawn_run(&handle, pipeline.clone(), question, tx.clone());
                }
                None => {}
            },
            TuiMsg::Input(CtEvent::Resize(..)) => app.dirty = true,
            TuiMsg::Input(_) => {}
            TuiMsg::InputError(e) => {
                tracing::warn!(error = %e, "tui.input.error");
                app.push_error_line(format!("input: {e}"));
            }
            TuiMsg::Progress(stage) => app.on_stage(stage),
            TuiMsg::RunDone(result) => {
                app.finish_run();
                match result {
                    Ok(report) => app.render(&report)?,
                    Err(err) => {
                        tracing::warn!(error = %err, "tui.run.failed");
                        app.render_error(&err)?;
                    }
                }
            }
            TuiMsg::Tick => app.step_spinner(),
        }

        if app.dirty || last_draw.elapsed() >= tick_rate {
            view::draw(&mut term, &app, &model)?;
            last_draw = Instant::now();
            app.dirty = false;
        }
    }

    handle.cancellation().cancel();
    tracing::info!("tui.exit");
    Ok(())
}

fn spawn_run(handle: &SiftHandle, pipeline: Arc<Pipeline>, question: String, tx: mpsc::Sender<TuiMsg>) {
    handle.spawn(async move {
        let progress_tx = tx.clone();
        let progress = move |stage: Stage| {
            let _ = progress_tx.try_send(TuiMsg::Progress(stage));
        };
        let result = pipeline.run(&question, &progress).await;
        let _ = tx.send(TuiMsg::RunDone(result)).await;
    });
}
