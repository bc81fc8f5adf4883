//! Terminal front end: input, rendering, effect execution and ambient setup.
mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
