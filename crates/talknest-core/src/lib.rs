pub mod config;
pub mod prompts;
pub mod roleplay;
pub mod session;

pub use config::*;
pub use roleplay::*;
pub use session::*;
