//! Core value types shared across the engine

mod element;
mod stats;
mod status;

pub use element::{ElementType, TYPE_CHART, effectiveness};
pub use stats::{StatKind, Stats};
pub use status::StatusCode;
