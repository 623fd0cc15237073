use log::trace;

use crate::types::{AlignmentError, AlignmentOperation, ErrorKind, ErrorLists, OperationKind, ReferenceUnit};
use crate::utils::string::{char_len, join_optional_tokens, join_tokens, longest_contained_prefix};
use super::grouping::error_groups;
use super::units::{ReferenceContext, UnitMapper};

/// Turns grouped edit operations into extra / missing / substitution errors.
pub struct ErrorReporter<'a> {
    target: &'a [&'a str],
    said: &'a [&'a str],
    said_text: String,
    mapper: &'a dyn UnitMapper,
    reference: ReferenceContext<'a>,
    not_read_marker: &'a str,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(
        target: &'a [&'a str],
        said: &'a [&'a str],
        mapper: &'a dyn UnitMapper,
        reference: ReferenceContext<'a>,
        not_read_marker: &'a str,
    ) -> Self {
        Self {
            target,
            said,
            said_text: join_tokens(said),
            mapper,
            reference,
            not_read_marker,
        }
    }

    pub fn report(&self, operations: &[AlignmentOperation]) -> ErrorLists {
        let mut errors = ErrorLists::default();
        for group in error_groups(operations) {
            errors.push(self.report_group(group));
        }
        errors
    }

    /// One error for one non-match group.
    pub fn report_group(&self, group: &[AlignmentOperation]) -> AlignmentError {
        let first = &group[0];
        match first.kind {
            OperationKind::Insert => self.extra(group),
            OperationKind::Delete => self.missing(group),
            OperationKind::Substitute | OperationKind::Match => self.substitution(group),
        }
    }

    fn extra(&self, group: &[AlignmentOperation]) -> AlignmentError {
        AlignmentError {
            kind: ErrorKind::Extra,
            position: group[0].said_index.unwrap_or(0),
            expected: None,
            actual: said_tokens(group),
            unit: None,
            unit_context: None,
        }
    }

    fn missing(&self, group: &[AlignmentOperation]) -> AlignmentError {
        let position = group[0].target_index.unwrap_or(0);
        let unit = self.find_unit(position);

        let actual = unit
            .and_then(|unit| longest_contained_prefix(&unit.span, &self.said_text))
            .unwrap_or(self.not_read_marker)
            .to_string();

        self.with_unit(ErrorKind::Missing, position, target_tokens(group), actual, unit)
    }

    fn substitution(&self, group: &[AlignmentOperation]) -> AlignmentError {
        let position = group[0].target_index.unwrap_or(0);
        let unit = self.find_unit(position);
        let mut actual = said_tokens(group);

        if let Some(unit) = unit {
            let span_len = unit.char_len();
            if char_len(&actual) < span_len {
                // The unit is wider than the substituted run; widen what the
                // learner said to the same number of tokens.
                let start = group[0].said_index.unwrap_or(0).min(self.said.len());
                let end = (start + span_len).min(self.said.len());
                actual = join_tokens(&self.said[start..end]);
            }
        }

        self.with_unit(ErrorKind::Substitution, position, target_tokens(group), actual, unit)
    }

    fn find_unit(&self, target_index: usize) -> Option<&'a ReferenceUnit> {
        let unit = self.mapper.find_unit(target_index, self.target, &self.reference);
        if let Some(unit) = unit {
            trace!("Target token {} attributed to unit '{}' (sid {})", target_index, unit.span, unit.sid);
        }
        unit
    }

    fn with_unit(
        &self,
        kind: ErrorKind,
        position: usize,
        joined_target: String,
        actual: String,
        unit: Option<&ReferenceUnit>,
    ) -> AlignmentError {
        AlignmentError {
            kind,
            position,
            expected: Some(unit.map_or(joined_target, |u| u.span.clone())),
            actual,
            unit: unit.cloned(),
            unit_context: unit.map(|u| u.span.clone()),
        }
    }
}

fn target_tokens(group: &[AlignmentOperation]) -> String {
    join_optional_tokens(group.iter().map(|op| op.target_token.as_deref()))
}

fn said_tokens(group: &[AlignmentOperation]) -> String {
    join_optional_tokens(group.iter().map(|op| op.said_token.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::backtrace::edit_script;
    use crate::alignment::units::ContainmentMapper;

    const NOT_READ: &str = "未读";

    fn report(target: &[&str], said: &[&str], units: &[ReferenceUnit], sentence: &str) -> ErrorLists {
        let script = edit_script(target, said);
        let mapper = ContainmentMapper::new();
        let reporter = ErrorReporter::new(target, said, &mapper, ReferenceContext::new(units, sentence), NOT_READ);
        reporter.report(&script.operations)
    }

    #[test]
    fn test_extra_run_is_joined() {
        let errors = report(&["a", "b"], &["a", "b", "c", "d"], &[], "");
        assert_eq!(errors.extra.len(), 1);
        assert_eq!(errors.extra[0].position, 2);
        assert_eq!(errors.extra[0].actual, "c d");
        assert!(errors.extra[0].expected.is_none());
        assert!(errors.missing.is_empty() && errors.substitution.is_empty());
    }

    #[test]
    fn test_missing_without_unit_is_not_read() {
        let errors = report(&["a", "b", "c"], &["a", "b"], &[], "");
        assert_eq!(errors.missing.len(), 1);
        let missing = &errors.missing[0];
        assert_eq!(missing.position, 2);
        assert_eq!(missing.expected.as_deref(), Some("c"));
        assert_eq!(missing.actual, NOT_READ);
        assert!(missing.unit.is_none());
    }

    #[test]
    fn test_missing_recovers_partial_unit() {
        // 这个商品的价格是多少 read as 这个商品的价是多少: 格 missing.
        let sentence = "这个商品的价格是多少";
        let units = vec![
            ReferenceUnit::new("这个商品的价格", 0, 7, 1),
            ReferenceUnit::new("是多少", 7, 10, 1),
        ];
        let target: Vec<String> = sentence.chars().map(String::from).collect();
        let said: Vec<String> = "这个商品的价是多少".chars().map(String::from).collect();
        let target: Vec<&str> = target.iter().map(String::as_str).collect();
        let said: Vec<&str> = said.iter().map(String::as_str).collect();

        let errors = report(&target, &said, &units, sentence);
        assert_eq!(errors.missing.len(), 1);
        let missing = &errors.missing[0];
        assert_eq!(missing.position, 6);
        assert_eq!(missing.expected.as_deref(), Some("这个商品的价格"));
        assert_eq!(missing.actual, "这个商品的价");
        assert_eq!(missing.unit_context.as_deref(), Some("这个商品的价格"));
    }

    #[test]
    fn test_missing_unit_with_nothing_read() {
        let sentence = "hello world";
        let units = vec![ReferenceUnit::new("world", 6, 11, 1)];
        let errors = report(&["hello", "world"], &["hello"], &units, sentence);
        let missing = &errors.missing[0];
        assert_eq!(missing.expected.as_deref(), Some("world"));
        assert_eq!(missing.actual, NOT_READ);
        assert!(missing.unit.is_some());
    }

    #[test]
    fn test_substitution_without_unit() {
        let errors = report(&["a", "b", "c"], &["a", "x", "c"], &[], "");
        assert_eq!(errors.substitution.len(), 1);
        let sub = &errors.substitution[0];
        assert_eq!(sub.position, 1);
        assert_eq!(sub.expected.as_deref(), Some("b"));
        assert_eq!(sub.actual, "x");
    }

    #[test]
    fn test_substitution_widens_to_unit_length() {
        let sentence = "I like green tea";
        let units = vec![ReferenceUnit::new("green tea", 7, 16, 1)];
        let errors = report(
            &["I", "like", "green", "tea"],
            &["I", "like", "red", "tea"],
            &units,
            sentence,
        );
        let sub = &errors.substitution[0];
        assert_eq!(sub.expected.as_deref(), Some("green tea"));
        // "red" is shorter than the unit: re-join from said index 2 on.
        assert_eq!(sub.actual, "red tea");
        assert_eq!(sub.unit.as_ref().map(|u| u.sid), Some(1));
    }

    #[test]
    fn test_substitution_not_widened_when_long_enough() {
        let sentence = "I like tea";
        let units = vec![ReferenceUnit::new("tea", 7, 10, 1)];
        let errors = report(&["I", "like", "tea"], &["I", "like", "coffee"], &units, sentence);
        let sub = &errors.substitution[0];
        assert_eq!(sub.expected.as_deref(), Some("tea"));
        assert_eq!(sub.actual, "coffee");
    }

    #[test]
    fn test_identical_input_reports_nothing() {
        let errors = report(&["a", "b"], &["a", "b"], &[], "");
        assert!(errors.is_empty());
    }
}
