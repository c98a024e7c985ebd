pub mod config;
pub mod context;
pub mod prompt;
pub mod proposal;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use context::*;
pub use prompt::*;
pub use proposal::*;
pub use text::*;
pub use types::*;
