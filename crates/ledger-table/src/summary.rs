//! Numeric reductions used for totals rows and dashboard percentages.

use ledger_model::FieldAccess;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericSummary {
    /// Number of numeric cells seen; other cells are skipped.
    pub count: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }
}

/// Summarize the numeric cells under `key`.
pub fn summarize<'a, R, A, I>(rows: I, key: &str, accessor: &A) -> NumericSummary
where
    R: 'a,
    I: IntoIterator<Item = &'a R>,
    A: FieldAccess<R> + ?Sized,
{
    let mut summary = NumericSummary::default();
    for row in rows {
        if let Some(value) = accessor.field(row, key).as_number().filter(|n| n.is_finite()) {
            summary.push(value);
        }
    }
    summary
}

/// `part` as a percentage of `total`; zero when `total` is zero.
pub fn share_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}
