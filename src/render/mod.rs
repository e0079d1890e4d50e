//! HTML rendering for the panel. Pure functions over records and view state.

pub mod escape;
pub mod page;
pub mod rows;

pub use escape::{escape_attr, escape_html};
pub use page::{render_page, ControlView, PageView, TableBody, Tone};
pub use rows::{placeholder_row, render_row, render_rows};
