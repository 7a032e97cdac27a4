use crate::dataset::CorrectedDataset;
use crate::driving::Interval;
use crate::events::Events;
use crate::Error;

use serde::Serialize;

/// distinct corrected timestamps
///
/// Duplicates collapse, `-0.0` and `0.0` are the same time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimestampSet(std::collections::HashSet<ordered_float::OrderedFloat<f64>>);

impl TimestampSet {
    /// all timestamps of a table
    pub fn of(table: &CorrectedDataset) -> Self {
        table.corrected_ts().iter().copied().collect()
    }

    /// the timestamps of a table that fall into any of the closed intervals
    pub fn within(table: &CorrectedDataset, intervals: &[Interval]) -> Self {
        let ts = table.corrected_ts();
        crate::driving::rows_within(table, intervals)
            .into_iter()
            .map(|row| ts[row])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn intersection_len(&self, other: &Self) -> usize {
        self.0.intersection(&other.0).count()
    }
}

impl FromIterator<f64> for TimestampSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().map(ordered_float::OrderedFloat).collect())
    }
}

/// share of the speed-based driving samples the detector also reports as driving
///
/// Only detector samples inside the reference driving intervals count.
pub fn true_positive_rate(
    truth: &CorrectedDataset,
    detected: &CorrectedDataset,
    events: &Events,
) -> Result<f64, Error> {
    let proxy = TimestampSet::within(detected, events.driving_intervals());
    let truth = TimestampSet::of(truth);
    if truth.is_empty() {
        return Err(Error::EmptyDenominator("no driving samples in the speed signal"));
    }

    Ok(truth.intersection_len(&proxy) as f64 / truth.len() as f64)
}

/// share of the parked samples the detector reports as driving
///
/// This is the number of detector samples inside the parked intervals divided
/// by the number of all corrected samples inside them. Both sides are distinct
/// timestamps, not a classical FP / (FP + TN).
pub fn false_positive_rate(
    all: &CorrectedDataset,
    detected: &CorrectedDataset,
    events: &Events,
) -> Result<f64, Error> {
    let parked = events.parked_intervals();
    let proxy = TimestampSet::within(detected, &parked);
    let truth = TimestampSet::within(all, &parked);
    if truth.is_empty() {
        return Err(Error::EmptyDenominator("no samples in the parked intervals"));
    }

    Ok(proxy.len() as f64 / truth.len() as f64)
}

/// validation result of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub tpr: f64,
    pub fpr: f64,
}

impl Metrics {
    pub fn compute(
        all: &CorrectedDataset,
        truth: &CorrectedDataset,
        detected: &CorrectedDataset,
        events: &Events,
    ) -> Result<Self, Error> {
        Ok(Self {
            tpr: true_positive_rate(truth, detected, events)?,
            fpr: false_positive_rate(all, detected, events)?,
        })
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TPR is {:.1}", self.tpr * 100.0)?;
        write!(f, "FPR is {:.2}", self.fpr * 100.0)
    }
}
