use crate::dataset::{CorrectedDataset, Dataset, TimeIndex};
use crate::segment::Segment;
use crate::Error;

/// move raw IMU samples onto the system clock
///
/// Every sample inside a segment window gets that segment's correction, a
/// sample covered by multiple windows keeps the one of the last segment.
/// Samples outside all windows are dropped, including the ones sitting exactly
/// on the end of the last window. The remaining rows keep their order.
pub fn correct_timestamps(
    segments: &[Segment],
    samples: &Dataset,
) -> Result<CorrectedDataset, Error> {
    let times = samples.times();
    let index = TimeIndex::new(times);
    let mut corrected: Vec<Option<f64>> = vec![None; samples.len()];

    for segment in segments {
        for &row in index.range(segment.start_ts, segment.end_ts, false) {
            corrected[row] = Some(segment.correct(times[row]));
        }
    }

    let (indices, values): (Vec<usize>, Vec<f64>) = corrected
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| ts.map(|ts| (i, ts)))
        .unzip();

    log::info!(
        "corrected {} of {} samples, dropped {}",
        indices.len(),
        samples.len(),
        samples.len() - indices.len()
    );

    CorrectedDataset::new(ndarray::Array1::from(values), samples.select(&indices))
}
