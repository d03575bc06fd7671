pub mod config;
pub mod error;
pub mod hardware;

pub use config::Config;
pub use error::*;
pub use hardware::*;
