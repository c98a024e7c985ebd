pub mod background;
pub mod config_store;
pub mod defaults;
pub mod fs_util;
pub mod image;
pub mod relay;
pub mod runtime_engine;
pub mod secrets;
pub mod settings_store;
