pub mod structs;
pub mod news;

pub use structs::Headline;
pub use news::{HeadlineSource, RssHeadlineSource};
