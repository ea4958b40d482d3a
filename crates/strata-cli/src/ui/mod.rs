//! UI primitives for the Strata CLI.
//!
//! - **Context**: environment detection (TTY, color, unicode, quiet)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges and owo-colors styles
//! - **Render**: headers, tables, receipts, hints, errors

mod context;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use theme::Badge;

pub use render::{badge, header, hint, kv, print, print_error, receipt, table};
