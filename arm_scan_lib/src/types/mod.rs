pub mod angle;
pub mod command;
pub mod config;
pub mod error;
pub mod pose;

pub use angle::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use pose::*;
