//! qiraa grades a learner's reproduction of a reference passage. It aligns
//! the reference tokens against what the learner said with a deterministic
//! Levenshtein backtrace, groups the differences into extra / missing /
//! substitution errors attributed to reference chunks (ACUs), and scores the
//! attempt.

// Module declarations
pub mod error;
pub mod alignment;
pub mod utils;
pub mod config;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use alignment::{
    perform_alignment,
    similarity_score,
    Aligner,
    AlignmentCache,
    BatchGrader,
    ReferenceContext,
};
pub use types::{
    AlignmentError,
    AlignmentOperation,
    AlignmentResult,
    ErrorKind,
    OperationKind,
    ReferenceUnit,
};
pub use utils::string::join_tokens;

// Re-export the config from config module
pub use config::GraderConfig;
