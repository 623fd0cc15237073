use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{info, debug, warn};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::config::subsystems::{AlignerConfig, ProcessorConfig};
use crate::error::{Error, Result};
use crate::types::{AlignmentResult, ReferenceUnit};
use super::aligner::Aligner;
use super::cache::AlignmentCache;
use super::scoring::{score_breakdown, ScoreBreakdown};
use super::units::ReferenceContext;

/// One attempt to grade: already tokenized target and said sequences plus the
/// optional ACU material for the sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub target: Vec<String>,
    pub said: Vec<String>,
    #[serde(default)]
    pub units: Vec<ReferenceUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    #[serde(default)]
    pub sentence_start: usize,
}

impl AlignmentRequest {
    pub fn new(target: Vec<String>, said: Vec<String>) -> Self {
        Self {
            id: None,
            target,
            said,
            units: Vec::new(),
            sentence: None,
            sentence_start: 0,
        }
    }

    pub fn reference(&self) -> ReferenceContext<'_> {
        ReferenceContext::new(&self.units, self.sentence.as_deref().unwrap_or(""))
            .with_sentence_start(self.sentence_start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAttempt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub score: ScoreBreakdown,
    /// Expected text of each missing error.
    pub missing_summary: Vec<String>,
    /// Actual text of each extra error.
    pub extra_summary: Vec<String>,
    pub result: AlignmentResult,
}

/// Grades independent attempts, in parallel when asked to.
pub struct BatchGrader {
    aligner: Aligner,
    cache: Option<AlignmentCache>,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
}

impl BatchGrader {
    pub fn new(aligner_config: AlignerConfig, processor_config: &ProcessorConfig) -> Result<Self> {
        aligner_config.validate()?;
        processor_config.validate()?;

        // Dedicated pool only when a thread count is configured
        let thread_pool = if processor_config.parallel_thread_count > 0 {
            Some(Arc::new(rayon::ThreadPoolBuilder::new()
                .num_threads(processor_config.thread_count())
                .build()?))
        } else {
            None
        };

        let cache = if processor_config.use_cache {
            Some(AlignmentCache::new(processor_config.cache_capacity))
        } else {
            None
        };

        Ok(Self {
            aligner: Aligner::new(aligner_config),
            cache,
            thread_pool,
        })
    }

    pub fn cache(&self) -> Option<&AlignmentCache> {
        self.cache.as_ref()
    }

    pub fn grade(&self, request: &AlignmentRequest) -> Result<GradedAttempt> {
        self.check_limits(request)?;

        let reference = request.reference();
        let result = match &self.cache {
            Some(cache) => self.aligner.align_cached(cache, &request.target, &request.said, &reference),
            None => self.aligner.align(&request.target, &request.said, &reference),
        };
        let score = score_breakdown(request.target.len(), request.said.len(), result.distance);

        Ok(GradedAttempt {
            id: request.id.clone(),
            score,
            missing_summary: result.missing_texts(),
            extra_summary: result.extra_texts(),
            result,
        })
    }

    /// Grades every request. Output order equals input order; a rejected
    /// request yields an `Err` in its slot without affecting the others.
    pub fn grade_all(&self, requests: &[AlignmentRequest]) -> Vec<Result<GradedAttempt>> {
        let start_time = Instant::now();
        let rejected = AtomicUsize::new(0);

        let run = || -> Vec<Result<GradedAttempt>> {
            requests
                .par_iter()
                .map(|request| {
                    let graded = self.grade(request);
                    if let Err(e) = &graded {
                        rejected.fetch_add(1, Ordering::Relaxed);
                        warn!("Skipping attempt {}: {}", request.id.as_deref().unwrap_or("<unnamed>"), e);
                    }
                    graded
                })
                .collect()
        };

        let results = match &self.thread_pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        info!(
            "Graded {} attempts ({} rejected) in {:.2?}",
            requests.len(),
            rejected.load(Ordering::Relaxed),
            start_time.elapsed()
        );
        if let Some(cache) = &self.cache {
            debug!("Alignment cache: {} hits, {} misses, {} entries", cache.hits(), cache.misses(), cache.len());
        }
        results
    }

    fn check_limits(&self, request: &AlignmentRequest) -> Result<()> {
        let max_tokens = self.aligner.get_config().max_tokens;
        let longest = request.target.len().max(request.said.len());
        if longest > max_tokens {
            return Err(Error::invalid_input(format!(
                "sequence of {} tokens exceeds max_tokens {}",
                longest, max_tokens
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, target: &str, said: &str) -> AlignmentRequest {
        let mut req = AlignmentRequest::new(
            target.split_whitespace().map(String::from).collect(),
            said.split_whitespace().map(String::from).collect(),
        );
        req.id = Some(id.to_string());
        req
    }

    #[test]
    fn test_grade_single() {
        let grader = BatchGrader::new(AlignerConfig::default(), &ProcessorConfig::default()).unwrap();
        let graded = grader.grade(&request("1", "a b c", "a b")).unwrap();
        assert_eq!(graded.id.as_deref(), Some("1"));
        assert_eq!(graded.result.distance, 1);
        assert_eq!(graded.missing_summary, vec!["c".to_string()]);
        assert!(graded.extra_summary.is_empty());
        assert!((graded.score.score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_grade_all_preserves_order() {
        let processor = ProcessorConfig {
            parallel_thread_count: 2,
            ..ProcessorConfig::default()
        };
        let grader = BatchGrader::new(AlignerConfig::default(), &processor).unwrap();
        let requests: Vec<_> = (0..50)
            .map(|i| request(&i.to_string(), "one two three", if i % 2 == 0 { "one two three" } else { "one three" }))
            .collect();

        let results = grader.grade_all(&requests);
        assert_eq!(results.len(), 50);
        for (i, graded) in results.iter().enumerate() {
            let graded = graded.as_ref().unwrap();
            assert_eq!(graded.id, Some(i.to_string()));
            assert_eq!(graded.result.distance, if i % 2 == 0 { 0 } else { 1 });
        }
        let cache = grader.cache().unwrap();
        assert_eq!(cache.hits() + cache.misses(), 50);
    }

    #[test]
    fn test_rejects_oversized_request() {
        let aligner = AlignerConfig {
            max_tokens: 2,
            ..AlignerConfig::default()
        };
        let grader = BatchGrader::new(aligner, &ProcessorConfig::default()).unwrap();
        let results = grader.grade_all(&[request("ok", "a b", "a"), request("big", "a b c", "a")]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_without_cache() {
        let processor = ProcessorConfig {
            use_cache: false,
            ..ProcessorConfig::default()
        };
        let grader = BatchGrader::new(AlignerConfig::default(), &processor).unwrap();
        assert!(grader.cache().is_none());
        assert!(grader.grade(&request("x", "a", "a")).unwrap().result.is_perfect());
    }

    #[test]
    fn test_request_json_defaults() {
        let req: AlignmentRequest = serde_json::from_str(r#"{"target":["a"],"said":[]}"#).unwrap();
        assert!(req.units.is_empty());
        assert!(req.sentence.is_none());
        assert_eq!(req.sentence_start, 0);
    }
}
