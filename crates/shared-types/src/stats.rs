use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::models::ResultRecord;

/// Aggregate view over a set of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub count: usize,
    /// Mean mark rounded to one decimal, `None` when there are no results.
    pub average: Option<f64>,
    /// Subject and mark of the highest result; first wins on ties.
    pub best: Option<(String, u8)>,
    /// Count per grade, best grade first, every grade present.
    pub distribution: Vec<(Grade, usize)>,
    pub passing: usize,
}

impl ResultSummary {
    pub fn average_label(&self) -> String {
        self.average
            .map(|a| format!("{a:.1}"))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn average_grade(&self) -> Option<Grade> {
        let avg = self.average?;
        crate::grade::Marks::new(avg.floor() as i64)
            .ok()
            .map(|m| m.grade())
    }
}

pub fn summarize(results: &[ResultRecord]) -> ResultSummary {
    let count = results.len();
    let total: u32 = results.iter().map(|r| u32::from(r.marks.value())).sum();
    let average = (count > 0).then(|| (total as f64 / count as f64 * 10.0).round() / 10.0);

    let best = results
        .iter()
        .fold(None::<&ResultRecord>, |best, r| match best {
            Some(b) if b.marks >= r.marks => Some(b),
            _ => Some(r),
        })
        .map(|r| (r.subject.clone(), r.marks.value()));

    let distribution = Grade::ALL
        .into_iter()
        .map(|g| (g, results.iter().filter(|r| r.grade() == g).count()))
        .collect();

    ResultSummary {
        count,
        average,
        best,
        distribution,
        passing: results.iter().filter(|r| r.grade().is_passing()).count(),
    }
}
