pub mod tag;
pub mod section;
pub mod settings;
pub mod config;

pub use tag::*;
pub use section::*;
pub use settings::*;
pub use config::*;
