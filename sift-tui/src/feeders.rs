use crate::tui::TuiMsg;
use sift_runtime::SiftHandle;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time;

const INPUT_POLL: Duration = Duration::from_millis(100);
const TICK: Duration = Duration::from_millis(80);

/// Terminal input reader and redraw tick. Both stop on runtime cancellation.
pub fn spawn_tui_feeders(tx: Sender<TuiMsg>, handle: &SiftHandle) {
    // One blocking thread polls the terminal; the poll timeout bounds how long
    // it takes to notice cancellation.
    let cancel = handle.cancellation();
    let tx_in = tx.clone();
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match crossterm::event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    let _ = tx_in.blocking_send(TuiMsg::InputError(e.to_string()));
                    break;
                }
            }
            let msg = match crossterm::event::read() {
                Ok(ev) => TuiMsg::Input(ev),
                Err(e) => TuiMsg::InputError(e.to_string()),
            };
            if tx_in.blocking_send(msg).is_err() {
                break;
            }
        }
        tracing::debug!("tui.feeder.input.stopped");
    });

    handle.spawn_until_cancelled(async move {
        let mut interval = time::interval(TICK);
        loop {
            interval.tick().await;
            if tx.try_send(TuiMsg::Tick).is_err() && tx.is_closed() {
                break;
            }
        }
    });
}
