//! Helper functions for pages
//!
//! Date formatting, reading time, HTML snippets and URL generation used by
//! the generator and the preview server.

mod date;
mod html;
mod reading_time;
mod url;

pub use date::*;
pub use html::*;
pub use reading_time::*;
pub use url::*;
