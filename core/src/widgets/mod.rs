// Built-in components
//
// Controls (Dropdown) feed values into callbacks, visuals (Markdown, Plotly)
// receive data pushed by callbacks.

mod dropdown;
mod markdown;
mod plotly;
mod relayout;

pub use dropdown::Dropdown;
pub use markdown::Markdown;
pub use plotly::Plotly;
pub use relayout::{parse_timestamp, ViewRange};
