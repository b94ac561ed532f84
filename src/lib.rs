pub mod application;
pub mod config;
pub mod infrastructure;

pub use application::bootstrap;
pub use application::settings;
pub use config::AppConfig;
pub use infrastructure::{model, server, store};
