pub mod config;
pub mod input;
pub mod logging;
pub mod presenter;
pub mod product_loader;
pub mod render;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use presenter::{Frame, Screen};
pub use session::{SessionOutcome, run_session};
