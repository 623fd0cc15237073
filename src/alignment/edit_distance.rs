/// Full Levenshtein table over two token sequences.
///
/// `cell(i, j)` is the edit distance between the first `i` target tokens and
/// the first `j` said tokens. Insertion, deletion and substitution all cost 1
/// and tokens compare by exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    rows: usize,
    cols: usize,
    cells: Vec<usize>,
}

impl DistanceTable {
    pub fn build<S: AsRef<str>>(target: &[S], said: &[S]) -> Self {
        let rows = target.len() + 1;
        let cols = said.len() + 1;
        let mut cells = vec![0usize; rows * cols];

        for i in 0..rows {
            cells[i * cols] = i;
        }
        for j in 0..cols {
            cells[j] = j;
        }

        for i in 1..rows {
            for j in 1..cols {
                let cost = substitution_cost(target[i - 1].as_ref(), said[j - 1].as_ref());
                let deletion = cells[(i - 1) * cols + j] + 1;
                let insertion = cells[i * cols + j - 1] + 1;
                let diagonal = cells[(i - 1) * cols + j - 1] + cost;
                cells[i * cols + j] = deletion.min(insertion).min(diagonal);
            }
        }

        Self { rows, cols, cells }
    }

    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    /// Number of target tokens (`m`).
    pub fn target_len(&self) -> usize {
        self.rows - 1
    }

    /// Number of said tokens (`n`).
    pub fn said_len(&self) -> usize {
        self.cols - 1
    }

    pub fn distance(&self) -> usize {
        self.cell(self.rows - 1, self.cols - 1)
    }
}

#[inline]
pub(crate) fn substitution_cost(target: &str, said: &str) -> usize {
    if target == said { 0 } else { 1 }
}

/// Edit distance between two token sequences.
pub fn token_distance<S: AsRef<str>>(target: &[S], said: &[S]) -> usize {
    DistanceTable::build(target, said).distance()
}
