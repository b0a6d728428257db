pub mod binder;
pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;

pub use binder::{Binder, BinderError, ExportFile};
