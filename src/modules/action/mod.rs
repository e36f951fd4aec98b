pub mod post;
pub mod bluesky;

pub use post::{PostRef, PostRequest, ReplyLink};
pub use bluesky::{BlueskyPublisher, Publisher, Session};
