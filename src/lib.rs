// Library surface for the terminal binary and the headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod observable;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;
pub mod word_queue;

pub use session::{GameSession, SessionState};
