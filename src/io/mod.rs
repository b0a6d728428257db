pub mod autosave;
pub mod config_io;
pub mod kv_store;
pub mod persist;
pub mod state;
