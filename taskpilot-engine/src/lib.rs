pub mod engine;
pub mod session;
pub mod state;
pub mod traits;
