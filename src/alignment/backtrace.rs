use log::warn;

use crate::types::{AlignmentOperation, EditScript};
use super::edit_distance::{substitution_cost, DistanceTable};

/// Walks `table` back from `(m, n)` and returns one minimum-cost edit script
/// in forward index order.
///
/// When several optimal paths exist the step is chosen in the fixed order
/// diagonal, then delete, then insert. Feedback stability across runs
/// depends on this order; do not reorder the branches.
pub fn backtrace<S: AsRef<str>>(table: &DistanceTable, target: &[S], said: &[S]) -> Vec<AlignmentOperation> {
    debug_assert_eq!(table.target_len(), target.len());
    debug_assert_eq!(table.said_len(), said.len());

    let mut i = target.len();
    let mut j = said.len();
    let mut reversed = Vec::with_capacity(i.max(j));

    while i > 0 || j > 0 {
        let current = table.cell(i, j);

        if i > 0 && j > 0
            && table.cell(i - 1, j - 1) + substitution_cost(target[i - 1].as_ref(), said[j - 1].as_ref()) == current
        {
            reversed.push(AlignmentOperation::diagonal(
                i - 1,
                j - 1,
                target[i - 1].as_ref(),
                said[j - 1].as_ref(),
            ));
            i -= 1;
            j -= 1;
        } else if i > 0 && table.cell(i - 1, j) + 1 == current {
            reversed.push(AlignmentOperation::delete(i - 1, target[i - 1].as_ref()));
            i -= 1;
        } else if j > 0 && table.cell(i, j - 1) + 1 == current {
            reversed.push(AlignmentOperation::insert(j - 1, said[j - 1].as_ref()));
            j -= 1;
        } else if i > 0 {
            // Not reachable for a table built by DistanceTable::build.
            warn!("Inconsistent distance table at ({}, {}), falling back to delete", i, j);
            reversed.push(AlignmentOperation::delete(i - 1, target[i - 1].as_ref()));
            i -= 1;
        } else {
            warn!("Inconsistent distance table at ({}, {}), falling back to insert", i, j);
            reversed.push(AlignmentOperation::insert(j - 1, said[j - 1].as_ref()));
            j -= 1;
        }
    }

    reversed.reverse();
    reversed
}

/// Builds the distance table and backtraces it in one go.
pub fn edit_script<S: AsRef<str>>(target: &[S], said: &[S]) -> EditScript {
    let table = DistanceTable::build(target, said);
    let operations = backtrace(&table, target, said);
    EditScript {
        distance: table.distance(),
        operations,
    }
}
