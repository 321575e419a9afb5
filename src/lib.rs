pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod schema;
pub mod source;
pub mod ui;
pub mod verify;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Result, SetupError};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
pub use writer::{rebuild, rebuild_with, LoadOptions};
