pub mod context;
pub mod error;
pub mod builder;

pub use context::{AuthState, RunContext, Tiding};
pub use error::RunError;
pub use builder::{clamp_post_text, RunSummary, ThreadBuilder, ThreadSettings, MAX_POST_CHARS};
