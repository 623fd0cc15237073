pub mod aligner;
pub mod processor;

pub use aligner::{AlignerConfig, UnitMatchStrategy};
pub use processor::ProcessorConfig;
