pub mod build;
pub mod context;
pub mod error;

pub use build::{build_feed, BuildReport, BuildSpec, SkippedRow};
pub use context::AppContext;
pub use error::{Result, SheetfeedError};
