//! Annotation reading and joining.
//!
//! This crate provides:
//! - Line-oriented annotation table parsing
//! - Per-kind validation of the four annotation files of a subset
//! - The joiner that correlates them into an ordered list of video jobs

pub mod error;
pub mod joiner;
pub mod subset_annotations;
pub mod table;

pub use error::{AnnotationError, AnnotationResult};
pub use joiner::{join_subset, AnnotationJoiner, JoinStats};
pub use subset_annotations::SubsetAnnotations;
pub use table::{AnnotationTable, Record};
