pub mod bootstrap;
pub mod settings;
