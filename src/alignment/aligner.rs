use std::hash::BuildHasher;

use log::{debug, info};

use crate::config::subsystems::AlignerConfig;
use crate::types::{AlignmentOperation, AlignmentResult, EditScript, ErrorLists, ReferenceUnit};
use super::backtrace::edit_script;
use super::cache::AlignmentCache;
use super::report::ErrorReporter;
use super::units::{ReferenceContext, UnitMapper, UnitMapperFactory};

/// Aligns a learner's attempt against the reference and classifies the
/// differences.
pub struct Aligner {
    config: AlignerConfig,
    mapper: Box<dyn UnitMapper>,
}

impl Aligner {
    pub fn new(config: AlignerConfig) -> Self {
        debug!("Creating aligner with '{}' unit matching", config.unit_match.as_str());
        let mapper = UnitMapperFactory::create(config.unit_match);
        Self { config, mapper }
    }

    pub fn get_config(&self) -> &AlignerConfig {
        &self.config
    }

    pub fn align<S: AsRef<str>>(
        &self,
        target: &[S],
        said: &[S],
        reference: &ReferenceContext<'_>,
    ) -> AlignmentResult {
        let script = edit_script(target, said);
        self.finish(target, said, script, reference)
    }

    /// Same as [`Aligner::align`] but reuses edit scripts from `cache`.
    pub fn align_cached<S: AsRef<str>, H: BuildHasher>(
        &self,
        cache: &AlignmentCache<H>,
        target: &[S],
        said: &[S],
        reference: &ReferenceContext<'_>,
    ) -> AlignmentResult {
        let script = cache.get_or_compute(target, said);
        self.finish(target, said, script, reference)
    }

    /// Classifies an existing edit script into the three error lists.
    pub fn analyze<S: AsRef<str>>(
        &self,
        target: &[S],
        said: &[S],
        operations: &[AlignmentOperation],
        reference: &ReferenceContext<'_>,
    ) -> ErrorLists {
        let target: Vec<&str> = target.iter().map(AsRef::as_ref).collect();
        let said: Vec<&str> = said.iter().map(AsRef::as_ref).collect();
        let reporter = ErrorReporter::new(
            &target,
            &said,
            self.mapper.as_ref(),
            *reference,
            &self.config.not_read_marker,
        );
        reporter.report(operations)
    }

    fn finish<S: AsRef<str>>(
        &self,
        target: &[S],
        said: &[S],
        script: EditScript,
        reference: &ReferenceContext<'_>,
    ) -> AlignmentResult {
        let errors = self.analyze(target, said, &script.operations, reference);

        if self.is_traced(target) {
            info!(
                "TRACE [align]: traced token '{}' in target; distance={} extra={} missing={} substitution={}",
                self.config.traced_token,
                script.distance,
                errors.extra.len(),
                errors.missing.len(),
                errors.substitution.len()
            );
        }

        let result = AlignmentResult::from_parts(script, errors);
        debug!(
            "Aligned {} target / {} said tokens: distance {}, {} errors",
            target.len(),
            said.len(),
            result.distance,
            result.error_count()
        );
        result
    }

    fn is_traced<S: AsRef<str>>(&self, target: &[S]) -> bool {
        if !log::log_enabled!(log::Level::Info) || self.config.traced_token.is_empty() {
            return false;
        }
        target.iter().any(|t| t.as_ref() == self.config.traced_token)
    }
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}

/// One-shot alignment with the default configuration.
///
/// `units` and `sentence` are optional; without them errors carry the joined
/// raw tokens instead of ACU spans.
pub fn perform_alignment<S: AsRef<str>>(
    target: &[S],
    said: &[S],
    units: Option<&[ReferenceUnit]>,
    sentence: Option<&str>,
) -> AlignmentResult {
    let reference = ReferenceContext::new(units.unwrap_or(&[]), sentence.unwrap_or(""));
    Aligner::default().align(target, said, &reference)
}
