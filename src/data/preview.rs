use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use super::model::Table;

// ---------------------------------------------------------------------------
// Row preview controls
// ---------------------------------------------------------------------------

/// Which rows a preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    #[default]
    Head,
    Tail,
    RandomSample,
}

impl PreviewMode {
    pub const ALL: [PreviewMode; 3] = [PreviewMode::Head, PreviewMode::Tail, PreviewMode::RandomSample];

    pub fn label(self) -> &'static str {
        match self {
            PreviewMode::Head => "First rows",
            PreviewMode::Tail => "Last rows",
            PreviewMode::RandomSample => "Random sample",
        }
    }
}

/// Slider range for "rows to show".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl RowBounds {
    pub fn clamp(&self, rows: usize) -> usize {
        rows.clamp(self.min, self.max)
    }
}

/// `[5, min(50, row_count)]`, defaulting to 10. Tables with fewer than five
/// rows collapse the range to the row count.
pub fn preview_bounds(row_count: usize) -> RowBounds {
    let max = row_count.min(50);
    let min = max.min(5);
    RowBounds {
        min,
        max,
        default: row_count.min(10).clamp(min, max),
    }
}

/// Derive the preview table. `rows` is clamped to [`preview_bounds`];
/// `seed` makes random samples reproducible across repaints.
pub fn preview(table: &Table, rows: usize, mode: PreviewMode, seed: u64) -> Table {
    let rows = preview_bounds(table.n_rows()).clamp(rows);
    match mode {
        PreviewMode::Head => table.head(rows),
        PreviewMode::Tail => table.tail(rows),
        PreviewMode::RandomSample => {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = index::sample(&mut rng, table.n_rows(), rows).into_vec();
            table.take_rows(&picked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};
    use std::collections::HashSet;

    fn table(n: i64) -> Table {
        let values = (0..n).map(Value::Integer).collect();
        Table::new(vec![Column::infer("id", values)]).unwrap()
    }

    #[test]
    fn bounds_follow_row_count() {
        assert_eq!(preview_bounds(200), RowBounds { min: 5, max: 50, default: 10 });
        assert_eq!(preview_bounds(30), RowBounds { min: 5, max: 30, default: 10 });
        assert_eq!(preview_bounds(7), RowBounds { min: 5, max: 7, default: 7 });
        assert_eq!(preview_bounds(3), RowBounds { min: 3, max: 3, default: 3 });
        assert_eq!(preview_bounds(0), RowBounds { min: 0, max: 0, default: 0 });
    }

    #[test]
    fn head_and_tail_respect_clamp() {
        let t = table(100);
        assert_eq!(preview(&t, 2, PreviewMode::Head, 0).n_rows(), 5);
        assert_eq!(preview(&t, 500, PreviewMode::Tail, 0).n_rows(), 50);
        let tail = preview(&t, 5, PreviewMode::Tail, 0);
        assert_eq!(tail.column("id").unwrap().values[0], Value::Integer(95));
    }

    #[test]
    fn random_sample_is_distinct_and_seeded() {
        let t = table(100);
        let a = preview(&t, 20, PreviewMode::RandomSample, 7);
        let b = preview(&t, 20, PreviewMode::RandomSample, 7);
        let ids: HashSet<_> = a.column("id").unwrap().values.iter().cloned().collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(a.column("id").unwrap().values, b.column("id").unwrap().values);
    }
}
