use crate::config::Config;
use crate::correct::correct_timestamps;
use crate::dataset::CorrectedDataset;
use crate::driving;
use crate::score::Metrics;
use crate::segment::{self, Segment};
use crate::source::{DataSource, DateRange};
use crate::trace::Trace;
use crate::Error;

use serde::Serialize;

/// IMU samples moved onto the system clock
#[derive(Debug, Clone)]
pub struct Correction {
    pub trace: Trace,
    pub segments: Vec<Segment>,
    /// number of raw samples before correction
    pub raw_rows: usize,
    pub corrected: CorrectedDataset,
}

/// fetch trace and samples and correct the sample timestamps
pub fn correct_clock<S>(source: &S, range: &DateRange, cfg: &Config) -> Result<Correction, Error>
where
    S: DataSource + ?Sized,
{
    let trace = Trace::from_samples(&source.fetch_trace(range)?)?;
    let samples = source.fetch_samples(range)?;
    if samples.is_empty() {
        return Err(Error::MissingData("no IMU samples"));
    }

    let segments = segment::build_segments(&trace, &cfg.drift)?;
    if segments.is_empty() {
        return Err(Error::MissingData("no usable drift segments"));
    }

    let corrected = correct_timestamps(&segments, &samples)?;
    if corrected.is_empty() {
        return Err(Error::MissingData("no sample inside any drift segment"));
    }

    Ok(Correction {
        trace,
        segments,
        raw_rows: samples.len(),
        corrected: corrected.with_accel_norm()?,
    })
}

/// result of a full validation run
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub correction: Correction,
    /// samples driving according to the speed signal
    pub by_speed: CorrectedDataset,
    /// samples driving according to the onboard motion labels
    pub by_motion: CorrectedDataset,
    pub metrics: Metrics,
}

/// correct the clock and score the motion detector against the speed signal
pub fn evaluate<S>(source: &S, range: &DateRange, cfg: &Config) -> Result<Evaluation, Error>
where
    S: DataSource + ?Sized,
{
    let correction = correct_clock(source, range, cfg)?;

    let speed = source.fetch_speed(range)?;
    let by_speed = driving::driving_by_speed(&speed, &correction.corrected, &cfg.driving)?;
    let by_motion =
        driving::driving_by_motion(&correction.trace, &correction.corrected, &cfg.driving);

    let events = source.fetch_events(range)?;
    let metrics = Metrics::compute(&correction.corrected, &by_speed, &by_motion, &events)?;
    log::info!("tpr={} fpr={}", metrics.tpr, metrics.fpr);

    Ok(Evaluation {
        correction,
        by_speed,
        by_motion,
        metrics,
    })
}

/// serializable summary of an [`Evaluation`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub segments: Vec<Segment>,
    pub trace_rows: usize,
    pub raw_rows: usize,
    pub corrected_rows: usize,
    pub driving_by_speed_rows: usize,
    pub driving_by_motion_rows: usize,
    pub metrics: Metrics,
}

impl From<&Evaluation> for Report {
    fn from(e: &Evaluation) -> Self {
        Self {
            segments: e.correction.segments.clone(),
            trace_rows: e.correction.trace.len(),
            raw_rows: e.correction.raw_rows,
            corrected_rows: e.correction.corrected.len(),
            driving_by_speed_rows: e.by_speed.len(),
            driving_by_motion_rows: e.by_motion.len(),
            metrics: e.metrics,
        }
    }
}
