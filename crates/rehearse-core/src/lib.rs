//! rehearse-core: question extraction, concept tagging, and mastery tracking.
//!
//! This crate turns free-form generated text into typed questions, tracks
//! how well a candidate answers them, and derives weak areas and focus
//! recommendations. The generation service itself sits behind the
//! [`traits::GenerationProvider`] trait.

pub mod concepts;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod mastery;
pub mod model;
pub mod prompt;
pub mod report;
pub mod traits;
