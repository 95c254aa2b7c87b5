//! Shared utility functions.
//!
//! - `html`: HTML escaping for safe rendering
//! - `format`: display helpers for the result page

mod format;
mod html;

pub use format::truncate_name;
pub use html::html_escape;
