use crate::config;
use crate::trace::Trace;
use crate::Error;

use serde::Serialize;

/// linear drift model valid for `[start_ts, end_ts)` on the IMU clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// unit: IMU clock epoch seconds
    pub start_ts: f64,
    /// unit: IMU clock epoch seconds, exclusive
    pub end_ts: f64,
    /// drift growth per second of system clock
    pub slope: f64,
    pub intercept: f64,
    /// drift at `start_ts`, unit: seconds
    pub offset: f64,
}

impl Segment {
    /// check if a raw IMU timestamp falls into this segment's window
    pub fn contains(&self, raw_ts: f64) -> bool {
        self.start_ts <= raw_ts && raw_ts < self.end_ts
    }

    /// map a raw IMU timestamp onto the system clock
    ///
    /// Removes the drift at the segment start and it's linear growth since then.
    pub fn correct(&self, raw_ts: f64) -> f64 {
        raw_ts - (raw_ts - self.start_ts) * self.slope - self.offset
    }
}

/// return the trace rows that end a segment
///
/// A row is a boundary if the drift changed by more than `jump_limit` since the
/// previous row. The last row always terminates the final segment.
pub fn boundaries(trace: &Trace, jump_limit: f64) -> Vec<usize> {
    let mut ret: Vec<usize> = math::diff(trace.drift())
        .iter()
        .enumerate()
        .filter(|(_, d)| d.abs() > jump_limit)
        .map(|(i, _)| i + 1)
        .collect();

    let last = trace.len() - 1;
    if ret.last() != Some(&last) {
        ret.push(last);
    }

    ret
}

/// split a trace at it's clock jumps and fit one drift line per segment
///
/// The rows `[prev_boundary, boundary)` are used for the fit of a segment while
/// it's window spans the IMU clock values of both boundary rows, so consecutive
/// windows share their boundary.
pub fn build_segments(trace: &Trace, cfg: &config::Drift) -> Result<Vec<Segment>, Error> {
    let system_clock = trace.system_clock();
    let imu_clock = trace.imu_clock();
    let drift = trace.drift();

    let mut segments = Vec::new();
    let mut start = 0;
    for end in boundaries(trace, cfg.jump_limit) {
        let x = system_clock.slice(ndarray::s![start..end]);
        let y = drift.slice(ndarray::s![start..end]);
        match math::polyfit1(&x, &y) {
            Ok(fit) => {
                let start_ts = imu_clock[start];
                let segment = Segment {
                    start_ts,
                    end_ts: imu_clock[end],
                    slope: fit.slope,
                    intercept: fit.intercept,
                    offset: fit.eval(start_ts),
                };
                log::debug!("segment {}..{}: {:?}", start, end, segment);
                segments.push(segment);
            }
            Err(e) => match cfg.degenerate {
                config::DegeneratePolicy::Skip => {
                    log::warn!("skipping segment for trace rows {}..{}: {}", start, end, e);
                }
                config::DegeneratePolicy::Fail => {
                    return Err(Error::DegenerateSegment {
                        start,
                        end,
                        source: e,
                    });
                }
            },
        }

        start = end;
    }

    log::info!("{} drift segments from {} trace rows", segments.len(), trace.len());
    Ok(segments)
}
