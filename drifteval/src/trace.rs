use crate::Error;
use serde::{Deserialize, Serialize};

/// one clock comparison between the IMU and the system clock, as stored
///
/// All clock values are epoch seconds. Any numeric field may be missing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TimeSyncSample {
    #[serde(default, alias = "system_clock(epoch)")]
    pub system_clock_epoch: Option<f64>,
    #[serde(default, alias = "imu_sw_clock(epoch)")]
    pub imu_clock_epoch: Option<f64>,
    /// IMU clock minus system clock
    #[serde(default, alias = "diff_sw_sys(second)")]
    pub drift_seconds: Option<f64>,
    /// classified motion label at this instant
    #[serde(default)]
    pub motion_state: Option<String>,
}

/// a complete time-sync row
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPoint {
    pub system_clock: f64,
    pub imu_clock: f64,
    pub drift: f64,
    pub motion_state: Option<String>,
}

/// cleaned time-sync trace in collection order
///
/// Only contains rows where all clock fields are present, never empty.
#[derive(Debug, Clone)]
pub struct Trace {
    system_clock: ndarray::Array1<f64>,
    imu_clock: ndarray::Array1<f64>,
    drift: ndarray::Array1<f64>,
    motion_state: Vec<Option<String>>,
}

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|v| !v.is_nan())
}

impl Trace {
    /// drop incomplete rows and re-index densely
    pub fn from_samples(samples: &[TimeSyncSample]) -> Result<Self, Error> {
        let mut points = Vec::with_capacity(samples.len());
        for sample in samples {
            let drift = crate::unwrap_opt_or!(present(sample.drift_seconds), continue);
            let imu_clock = crate::unwrap_opt_or!(present(sample.imu_clock_epoch), continue);
            let system_clock = crate::unwrap_opt_or!(present(sample.system_clock_epoch), continue);

            points.push(SyncPoint {
                system_clock,
                imu_clock,
                drift,
                motion_state: sample.motion_state.clone(),
            });
        }

        if points.len() != samples.len() {
            log::debug!(
                "dropped {} incomplete time-sync rows",
                samples.len() - points.len()
            );
        }

        Self::from_points(points)
    }

    pub fn from_points(points: Vec<SyncPoint>) -> Result<Self, Error> {
        if points.is_empty() {
            return Err(Error::MissingData("time-sync trace is empty"));
        }

        let mut trace = Self {
            system_clock: points.iter().map(|p| p.system_clock).collect(),
            imu_clock: points.iter().map(|p| p.imu_clock).collect(),
            drift: points.iter().map(|p| p.drift).collect(),
            motion_state: Vec::with_capacity(points.len()),
        };
        trace
            .motion_state
            .extend(points.into_iter().map(|p| p.motion_state));

        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.drift.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drift.is_empty()
    }

    pub fn system_clock(&self) -> &ndarray::Array1<f64> {
        &self.system_clock
    }

    pub fn imu_clock(&self) -> &ndarray::Array1<f64> {
        &self.imu_clock
    }

    pub fn drift(&self) -> &ndarray::Array1<f64> {
        &self.drift
    }

    pub fn motion_state(&self) -> &[Option<String>] {
        &self.motion_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sys: Option<f64>, imu: Option<f64>, drift: Option<f64>) -> TimeSyncSample {
        TimeSyncSample {
            system_clock_epoch: sys,
            imu_clock_epoch: imu,
            drift_seconds: drift,
            motion_state: None,
        }
    }

    #[test]
    fn drops_incomplete_rows() {
        let trace = Trace::from_samples(&[
            sample(Some(1.0), Some(1.5), Some(0.5)),
            sample(Some(2.0), Some(2.5), None),
            sample(None, Some(3.5), Some(0.5)),
            sample(Some(4.0), None, Some(0.5)),
            sample(Some(5.0), Some(5.5), Some(f64::NAN)),
            sample(Some(6.0), Some(6.5), Some(0.5)),
        ])
        .unwrap();

        assert_eq!(trace.len(), 2);
        testlib::assert_times_eq(trace.system_clock(), &[1.0, 6.0]);
        testlib::assert_times_eq(trace.imu_clock(), &[1.5, 6.5]);
    }

    #[test]
    fn empty_is_missing_data() {
        assert!(matches!(
            Trace::from_samples(&[sample(Some(1.0), None, Some(0.1))]),
            Err(Error::MissingData(_))
        ));
        assert!(matches!(Trace::from_samples(&[]), Err(Error::MissingData(_))));
    }

    #[test]
    fn upstream_column_names() {
        let json = r#"[
            {"system_clock(epoch)": 10.0, "imu_sw_clock(epoch)": 10.2,
             "diff_sw_sys(second)": 0.2, "motion_state": "driving"},
            {"system_clock_epoch": 11.0, "imu_clock_epoch": 11.2,
             "drift_seconds": null, "motion_state": null}
        ]"#;
        let samples: Vec<TimeSyncSample> = serde_json::from_str(json).unwrap();
        assert_eq!(samples[0].drift_seconds, Some(0.2));
        assert_eq!(samples[0].motion_state.as_deref(), Some("driving"));
        assert_eq!(samples[1].drift_seconds, None);

        let trace = Trace::from_samples(&samples).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.motion_state()[0].as_deref(), Some("driving"));
    }
}
