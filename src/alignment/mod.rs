pub mod edit_distance;
pub mod backtrace;
pub mod grouping;
pub mod units;
pub mod report;
pub mod scoring;
pub mod aligner;
pub mod cache;
pub mod batch;
// Re-export the main types
pub use self::aligner::{perform_alignment, Aligner};
pub use self::backtrace::{backtrace, edit_script};
pub use self::batch::{AlignmentRequest, BatchGrader, GradedAttempt};
pub use self::cache::AlignmentCache;
pub use self::edit_distance::{token_distance, DistanceTable};
pub use self::grouping::group_operations;
pub use self::scoring::{score_breakdown, similarity_score, ScoreBreakdown};
pub use self::units::{
    ContainmentMapper,
    OffsetMapper,
    ReferenceContext,
    UnitMapper,
    UnitMapperFactory,
};
