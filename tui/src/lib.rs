pub mod app;
pub mod config;
pub mod event;
pub mod ui;

pub use crate::app::{App, Mode};
pub use crate::config::{load_config, read_config, Config, Keymap};
pub use crate::event::{Event, EventHandler};
