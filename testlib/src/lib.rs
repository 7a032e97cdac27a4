use approx::assert_abs_diff_eq;
use ndarray::azip;

pub const EPSILON: f64 = 1.0e-6;

pub fn assert_arr1_eq<Sa, Sb>(
    a: &ndarray::ArrayBase<Sa, ndarray::Ix1>,
    b: &ndarray::ArrayBase<Sb, ndarray::Ix1>,
) where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(a.dim(), b.dim());

    azip!((a in a, b in b) assert_abs_diff_eq!(a, b, epsilon = EPSILON));
}

/// compare timestamp lists, e.g. a table column against hand-written values
pub fn assert_times_eq<S>(a: &ndarray::ArrayBase<S, ndarray::Ix1>, expected: &[f64])
where
    S: ndarray::Data<Elem = f64>,
{
    assert_eq!(
        a.len(),
        expected.len(),
        "got {:?}, expected {:?}",
        a.to_vec(),
        expected
    );

    for (a, b) in a.iter().zip(expected) {
        assert_abs_diff_eq!(a, b, epsilon = EPSILON);
    }
}

/// evenly spaced timestamps `start, start + dt, ...` with `n` elements
pub fn time_grid(start: f64, dt: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * dt).collect()
}
