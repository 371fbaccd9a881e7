//! Cleaning operations over the canonical dataset.

mod engine;
mod operations;

pub use engine::CleaningEngine;
pub use operations::{
    CleaningOperation, MissingValueMethod, RowAudit, TransformChange, TransformResult,
};
