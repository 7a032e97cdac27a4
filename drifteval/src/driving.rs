use crate::config;
use crate::dataset::CorrectedDataset;
use crate::trace::Trace;
use crate::Error;

use serde::{Deserialize, Serialize};

/// closed time interval, unit: epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// check if `ts` lies within the interval, both ends included
    pub fn contains(&self, ts: f64) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// vehicle speed reading, the ground truth for driving
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SpeedSample {
    pub timestamp: f64,
    /// unit: m/s
    #[serde(default)]
    pub speed: Option<f64>,
}

/// start and end times of the driving phases of a binary signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edges {
    /// times of rows where the signal switched to driving
    pub starts: Vec<f64>,
    /// times of rows where the signal switched back
    pub ends: Vec<f64>,
}

impl Edges {
    /// find the transitions of `(time, driving)` rows
    ///
    /// The first row is never an edge, a signal that starts out driving has an
    /// end without a matching start.
    pub fn detect<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (f64, bool)>,
    {
        let mut edges = Self::default();
        let mut prev: Option<bool> = None;

        for (time, driving) in rows {
            match (prev, driving) {
                (Some(false), true) => edges.starts.push(time),
                (Some(true), false) => edges.ends.push(time),
                _ => (),
            }
            prev = Some(driving);
        }

        edges
    }

    /// pair the n-th start with the n-th end
    ///
    /// Pairing goes by position only. Trailing edges without a partner are
    /// dropped.
    pub fn pairs(&self) -> Vec<Interval> {
        if self.starts.len() != self.ends.len() {
            log::warn!(
                "unbalanced edges: {} starts, {} ends, dropping {} trailing",
                self.starts.len(),
                self.ends.len(),
                self.starts.len().abs_diff(self.ends.len())
            );
        }

        self.starts
            .iter()
            .zip(&self.ends)
            .map(|(&start, &end)| Interval::new(start, end))
            .collect()
    }
}

/// driving intervals of the speed signal
///
/// Rows without a speed value are ignored. Intervals not longer than the
/// noise window are dropped.
pub fn speed_intervals(
    speed: &[SpeedSample],
    cfg: &config::Driving,
) -> Result<Vec<Interval>, Error> {
    let rows: Vec<(f64, bool)> = speed
        .iter()
        .filter_map(|s| {
            let v = s.speed.filter(|v| !v.is_nan())?;
            Some((s.timestamp, v.abs() > cfg.stationary_speed))
        })
        .collect();
    if rows.is_empty() {
        return Err(Error::MissingData("speed signal is empty"));
    }

    let pairs = Edges::detect(rows).pairs();
    let npairs = pairs.len();
    let intervals: Vec<Interval> = pairs
        .into_iter()
        .filter(|iv| iv.duration() > cfg.speed_noise_window)
        .collect();

    log::debug!(
        "{} speed intervals, {} dropped as noise",
        intervals.len(),
        npairs - intervals.len()
    );
    Ok(intervals)
}

/// return the rows of `table` inside any of the closed intervals, in row order
pub fn rows_within(table: &CorrectedDataset, intervals: &[Interval]) -> Vec<usize> {
    let index = table.time_index();
    let mut inside = vec![false; table.len()];
    for iv in intervals {
        for &row in index.range(iv.start, iv.end, true) {
            inside[row] = true;
        }
    }

    inside
        .iter()
        .enumerate()
        .filter_map(|(row, &hit)| hit.then_some(row))
        .collect()
}

/// corrected samples recorded while the speed signal says driving
///
/// The samples of each interval are appended in interval order.
pub fn driving_by_speed(
    speed: &[SpeedSample],
    corrected: &CorrectedDataset,
    cfg: &config::Driving,
) -> Result<CorrectedDataset, Error> {
    let index = corrected.time_index();
    let parts: Vec<CorrectedDataset> = speed_intervals(speed, cfg)?
        .iter()
        .map(|iv| {
            let mut rows = index.range(iv.start, iv.end, true).to_vec();
            rows.sort_unstable();
            corrected.select(&rows)
        })
        .collect();

    let ret = CorrectedDataset::concat(&parts)?;
    log::info!("{} samples driving by speed", ret.len());
    Ok(ret)
}

/// driving intervals of the onboard motion labels, on the system clock
///
/// Every label other than the stationary one counts as driving, a missing
/// label too.
pub fn motion_intervals(trace: &Trace, cfg: &config::Driving) -> Vec<Interval> {
    let rows = trace
        .system_clock()
        .iter()
        .zip(trace.motion_state())
        .map(|(&time, state)| (time, state.as_deref() != Some(cfg.stationary_label.as_str())));

    let intervals = Edges::detect(rows).pairs();
    log::debug!("{} motion intervals", intervals.len());
    intervals
}

/// corrected samples the onboard detector labels as driving
///
/// Each interval is extended by the buffer time before it's start to make up
/// for the detector latency. The end is not extended.
pub fn driving_by_motion(
    trace: &Trace,
    corrected: &CorrectedDataset,
    cfg: &config::Driving,
) -> CorrectedDataset {
    let intervals: Vec<Interval> = motion_intervals(trace, cfg)
        .into_iter()
        .map(|iv| Interval::new(iv.start - cfg.buffer_time, iv.end))
        .collect();

    let ret = corrected.select(&rows_within(corrected, &intervals));
    log::info!("{} samples driving by motion state", ret.len());
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::trace::SyncPoint;

    fn speed(rows: &[(f64, Option<f64>)]) -> Vec<SpeedSample> {
        rows.iter()
            .map(|&(timestamp, speed)| SpeedSample { timestamp, speed })
            .collect()
    }

    fn corrected(ts: &[f64]) -> CorrectedDataset {
        let raw = ndarray::Array1::from(ts.to_vec());
        CorrectedDataset::new(raw.clone(), Dataset::new(raw)).unwrap()
    }

    fn motion_trace(rows: &[(f64, Option<&str>)]) -> Trace {
        Trace::from_points(
            rows.iter()
                .map(|&(time, state)| SyncPoint {
                    system_clock: time,
                    imu_clock: time,
                    drift: 0.0,
                    motion_state: state.map(String::from),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn edges() {
        let flags = [false, true, true, false, true, false];
        let edges = Edges::detect(flags.iter().enumerate().map(|(i, &f)| (i as f64, f)));
        assert_eq!(edges.starts, vec![1.0, 4.0]);
        assert_eq!(edges.ends, vec![3.0, 5.0]);
        assert_eq!(
            edges.pairs(),
            vec![Interval::new(1.0, 3.0), Interval::new(4.0, 5.0)]
        );
    }

    #[test]
    fn edges_unbalanced() {
        // starts driving: the first end has no start and pairing shifts
        let flags = [true, false, true, false, true];
        let edges = Edges::detect(flags.iter().enumerate().map(|(i, &f)| (i as f64, f)));
        assert_eq!(edges.starts, vec![2.0, 4.0]);
        assert_eq!(edges.ends, vec![1.0, 3.0]);
        assert_eq!(
            edges.pairs(),
            vec![Interval::new(2.0, 1.0), Interval::new(4.0, 3.0)]
        );

        let edges = Edges::detect(vec![(0.0, false), (1.0, true)]);
        assert!(edges.pairs().is_empty());
    }

    #[test]
    fn noise_window_is_strict() {
        let cfg = config::Driving::default();
        let rows = speed(&[
            (0.0, Some(0.0)),
            (1.0, Some(1.0)),
            (1.5, Some(0.0)),
            (2.0, Some(0.0)),
            (3.0, Some(1.0)),
            (3.50001, Some(0.0)),
            (4.0, Some(0.0)),
        ]);

        let intervals = speed_intervals(&rows, &cfg).unwrap();
        assert_eq!(intervals, vec![Interval::new(3.0, 3.50001)]);
    }

    #[test]
    fn speed_cleaning() {
        let cfg = config::Driving::default();
        let rows = speed(&[
            (0.0, Some(0.2)),
            (1.0, None),
            (2.0, Some(-3.0)),
            (3.0, Some(f64::NAN)),
            (4.0, Some(4.0)),
            (5.0, Some(0.5)),
        ]);

        // reverse speed counts, exactly the stationary speed does not
        let intervals = speed_intervals(&rows, &cfg).unwrap();
        assert_eq!(intervals, vec![Interval::new(2.0, 5.0)]);

        assert!(matches!(
            speed_intervals(&speed(&[(0.0, None)]), &cfg),
            Err(Error::MissingData(_))
        ));
    }

    #[test]
    fn speed_selects_closed_intervals() {
        let cfg = config::Driving::default();
        let rows = speed(&[
            (10.0, Some(0.0)),
            (11.0, Some(5.0)),
            (13.0, Some(0.0)),
            (20.0, Some(5.0)),
            (22.0, Some(0.0)),
        ]);
        let samples = corrected(&[10.5, 11.0, 12.0, 13.0, 13.5, 20.0, 21.0, 22.5]);

        let driving = driving_by_speed(&rows, &samples, &cfg).unwrap();
        testlib::assert_times_eq(driving.corrected_ts(), &[11.0, 12.0, 13.0, 20.0, 21.0]);
    }

    #[test]
    fn rows_within_overlapping() {
        let samples = corrected(&[5.0, 1.0, 3.0, 9.0, 2.0]);
        let intervals = [
            Interval::new(2.0, 4.0),
            Interval::new(3.0, 5.0),
            Interval::new(8.0, 7.0),
        ];
        assert_eq!(rows_within(&samples, &intervals), vec![0, 2, 4]);
        assert!(rows_within(&samples, &[]).is_empty());
    }

    #[test]
    fn speed_without_intervals() {
        let cfg = config::Driving::default();
        let rows = speed(&[(10.0, Some(0.0)), (11.0, Some(0.0))]);
        let driving = driving_by_speed(&rows, &corrected(&[10.0, 11.0]), &cfg).unwrap();
        assert!(driving.is_empty());
    }

    #[test]
    fn motion_buffer_is_asymmetric() {
        let cfg = config::Driving::default();
        let trace = motion_trace(&[
            (0.0, Some("stationary")),
            (100.0, Some("driving")),
            (200.0, Some("turning")),
            (300.0, Some("stationary")),
        ]);
        assert_eq!(
            motion_intervals(&trace, &cfg),
            vec![Interval::new(100.0, 300.0)]
        );

        let samples = corrected(&[100.0 - 30.001, 100.0 - 30.0, 100.0 - 29.999, 300.0, 300.001]);
        let driving = driving_by_motion(&trace, &samples, &cfg);
        testlib::assert_times_eq(driving.corrected_ts(), &[70.0, 100.0 - 29.999, 300.0]);
    }

    #[test]
    fn motion_labels() {
        let trace = motion_trace(&[
            (0.0, Some("stationary")),
            (10.0, None),
            (20.0, Some("stationary")),
            (30.0, Some("parked")),
            (40.0, Some("driving")),
        ]);

        // a missing label is not the stationary label
        let cfg = config::Driving::default();
        assert_eq!(motion_intervals(&trace, &cfg), vec![Interval::new(10.0, 20.0)]);

        let cfg = config::Driving {
            stationary_label: "parked".to_string(),
            ..config::Driving::default()
        };
        // the rows before the first parked one already count as driving, so the
        // only end comes before the only start
        assert_eq!(motion_intervals(&trace, &cfg), vec![Interval::new(40.0, 30.0)]);
    }
}
