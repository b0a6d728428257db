pub mod export;
pub mod filter;
pub mod pin_lock;
pub mod prompts;
pub mod section_ops;
pub mod share;
pub mod tag_ops;
pub mod text_stats;
pub mod timestamp;
