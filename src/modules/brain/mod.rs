pub mod llm;

pub use llm::{ChatTransformer, TextTransformer};
