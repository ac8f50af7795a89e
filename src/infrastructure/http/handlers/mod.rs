//! HTTP Handlers

mod genre;
mod ping;
mod story;

pub use genre::*;
pub use ping::*;
pub use story::*;
