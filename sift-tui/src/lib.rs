//! Interactive terminal front end for the `sift` pipeline.
mod app;
mod command;
mod feeders;
mod input;
mod styles;
mod transcript;
mod tui;
mod view;

pub use app::{Action, App};
pub use tui::{TuiMsg, run_tui};
