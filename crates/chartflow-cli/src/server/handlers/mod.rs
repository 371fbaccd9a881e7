//! API request handlers.

mod analytics;
mod charts;
mod cleaning;
mod data;
mod view;

pub use analytics::*;
pub use charts::*;
pub use cleaning::*;
pub use data::*;
pub use view::*;
