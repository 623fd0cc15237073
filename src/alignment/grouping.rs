use crate::types::{AlignmentOperation, OperationKind};

/// Splits an edit script into contiguous runs.
///
/// A run continues while consecutive operations share a non-match kind.
/// Every `Match` operation forms a run of its own.
pub fn group_operations(operations: &[AlignmentOperation]) -> Vec<&[AlignmentOperation]> {
    let mut groups = Vec::new();
    if operations.is_empty() {
        return groups;
    }

    let mut start = 0;
    for idx in 1..operations.len() {
        let previous = operations[idx - 1].kind;
        let current = operations[idx].kind;
        let merge = current == previous && current != OperationKind::Match;
        if !merge {
            groups.push(&operations[start..idx]);
            start = idx;
        }
    }
    groups.push(&operations[start..]);
    groups
}

/// Only the runs that will be reported as errors.
pub fn error_groups(operations: &[AlignmentOperation]) -> impl Iterator<Item = &[AlignmentOperation]> {
    group_operations(operations)
        .into_iter()
        .filter(|group| group.first().map_or(false, |op| !op.is_match()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: OperationKind) -> AlignmentOperation {
        AlignmentOperation {
            kind,
            target_index: None,
            said_index: None,
            target_token: None,
            said_token: None,
        }
    }

    fn shape(groups: &[&[AlignmentOperation]]) -> Vec<(OperationKind, usize)> {
        groups.iter().map(|g| (g[0].kind, g.len())).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(group_operations(&[]).is_empty());
    }

    #[test]
    fn test_same_kind_runs_merge() {
        use OperationKind::*;
        let ops: Vec<_> = [Match, Delete, Delete, Substitute, Insert, Insert, Insert, Match]
            .into_iter()
            .map(op)
            .collect();
        let groups = group_operations(&ops);
        assert_eq!(
            shape(&groups),
            vec![(Match, 1), (Delete, 2), (Substitute, 1), (Insert, 3), (Match, 1)]
        );
    }

    #[test]
    fn test_matches_never_merge() {
        use OperationKind::*;
        let ops: Vec<_> = [Match, Match, Match].into_iter().map(op).collect();
        let groups = group_operations(&ops);
        assert_eq!(shape(&groups), vec![(Match, 1), (Match, 1), (Match, 1)]);
        assert_eq!(error_groups(&ops).count(), 0);
    }

    #[test]
    fn test_error_groups_skip_matches() {
        use OperationKind::*;
        let ops: Vec<_> = [Substitute, Match, Substitute, Substitute].into_iter().map(op).collect();
        let groups: Vec<_> = error_groups(&ops).collect();
        assert_eq!(shape(&groups), vec![(Substitute, 1), (Substitute, 2)]);
    }
}
