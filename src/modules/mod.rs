pub mod perception;
pub mod extraction;
pub mod action;
pub mod pipeline;

pub use pipeline::{CycleReport, Pipeline};
