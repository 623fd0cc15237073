use log::trace;

use crate::types::ReferenceUnit;
use crate::utils::string::{char_len, find_char_offset};
pub use crate::config::subsystems::aligner::UnitMatchStrategy;

/// Reference material available for attributing errors to ACUs.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceContext<'a> {
    pub units: &'a [ReferenceUnit],
    /// Text of the sentence being graded, exactly as it appears in the passage.
    pub sentence: &'a str,
    /// Character offset of `sentence` within the passage.
    pub sentence_start: usize,
}

impl<'a> ReferenceContext<'a> {
    pub fn new(units: &'a [ReferenceUnit], sentence: &'a str) -> Self {
        Self {
            units,
            sentence,
            sentence_start: 0,
        }
    }

    pub fn with_sentence_start(mut self, sentence_start: usize) -> Self {
        self.sentence_start = sentence_start;
        self
    }

    pub fn empty() -> Self {
        Self {
            units: &[],
            sentence: "",
            sentence_start: 0,
        }
    }

    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }
}

impl Default for ReferenceContext<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Finds the ACU an error at a target-token index should be attributed to.
pub trait UnitMapper: Send + Sync {
    fn strategy(&self) -> UnitMatchStrategy;

    /// Returns `None` when no unit qualifies; callers then fall back to the
    /// joined raw tokens.
    fn find_unit<'u>(
        &self,
        token_index: usize,
        tokens: &[&str],
        reference: &ReferenceContext<'u>,
    ) -> Option<&'u ReferenceUnit>;
}

/// Substring heuristic: among the units that occur in the current sentence
/// and contain the token text, pick the longest (the first one on ties).
///
/// When the same token text recurs in several units of one sentence this can
/// attribute the error to the wrong unit.
pub struct ContainmentMapper;

impl ContainmentMapper {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ContainmentMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitMapper for ContainmentMapper {
    fn strategy(&self) -> UnitMatchStrategy {
        UnitMatchStrategy::Containment
    }

    fn find_unit<'u>(
        &self,
        token_index: usize,
        tokens: &[&str],
        reference: &ReferenceContext<'u>,
    ) -> Option<&'u ReferenceUnit> {
        let token = *tokens.get(token_index)?;
        longest_unit(reference.units.iter().filter(|unit| {
            reference.sentence.contains(unit.span.as_str()) && unit.span.contains(token)
        }))
    }
}

/// Positional matching on the units' `start`/`end` offsets.
///
/// Target tokens are located in the sentence left to right with a running
/// character cursor; the unit covering the absolute position of the token is
/// chosen. Falls back to [`ContainmentMapper`] when the token cannot be
/// located or no unit covers it.
pub struct OffsetMapper {
    fallback: ContainmentMapper,
}

impl OffsetMapper {
    pub fn new() -> Self {
        Self {
            fallback: ContainmentMapper::new(),
        }
    }

    fn token_position(token_index: usize, tokens: &[&str], reference: &ReferenceContext<'_>) -> Option<usize> {
        let mut cursor = 0;
        for (idx, token) in tokens.iter().enumerate().take(token_index + 1) {
            if token.is_empty() {
                continue;
            }
            match find_char_offset(reference.sentence, token, cursor) {
                Some(offset) => {
                    if idx == token_index {
                        return Some(reference.sentence_start + offset);
                    }
                    cursor = offset + char_len(token);
                }
                None if idx == token_index => return None,
                None => {}
            }
        }
        None
    }
}

impl Default for OffsetMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitMapper for OffsetMapper {
    fn strategy(&self) -> UnitMatchStrategy {
        UnitMatchStrategy::Offset
    }

    fn find_unit<'u>(
        &self,
        token_index: usize,
        tokens: &[&str],
        reference: &ReferenceContext<'u>,
    ) -> Option<&'u ReferenceUnit> {
        if !reference.has_units() {
            return None;
        }

        let positional = Self::token_position(token_index, tokens, reference).and_then(|pos| {
            longest_unit(reference.units.iter().filter(|unit| unit.start <= pos && pos < unit.end))
        });

        match positional {
            Some(unit) => Some(unit),
            None => {
                trace!("No unit covers target token {}, using containment fallback", token_index);
                self.fallback.find_unit(token_index, tokens, reference)
            }
        }
    }
}

fn longest_unit<'u, I>(candidates: I) -> Option<&'u ReferenceUnit>
where
    I: Iterator<Item = &'u ReferenceUnit>,
{
    let mut best: Option<(&ReferenceUnit, usize)> = None;
    for unit in candidates {
        let len = unit.char_len();
        match best {
            Some((_, best_len)) if len <= best_len => {}
            _ => best = Some((unit, len)),
        }
    }
    best.map(|(unit, _)| unit)
}

pub struct UnitMapperFactory;

impl UnitMapperFactory {
    pub fn create(strategy: UnitMatchStrategy) -> Box<dyn UnitMapper> {
        match strategy {
            UnitMatchStrategy::Containment => Box::new(ContainmentMapper::new()),
            UnitMatchStrategy::Offset => Box::new(OffsetMapper::new()),
        }
    }
}
