//! Text helpers for printing feed-supplied strings to a terminal.

mod text;

pub use text::{display_width, single_line, truncate_to_width};
