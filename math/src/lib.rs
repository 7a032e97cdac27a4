mod error;
pub use error::Error;

use num_traits::Float;

/// first difference of a series: `out[i] = a[i + 1] - a[i]`
///
/// The result is one element shorter than the input, an input with less than
/// two elements yields an empty array.
pub fn diff<S, A>(a: &ndarray::ArrayBase<S, ndarray::Ix1>) -> ndarray::Array1<A>
where
    S: ndarray::Data<Elem = A>,
    A: Float,
{
    if a.len() < 2 {
        return ndarray::Array1::from(Vec::new());
    }

    &a.slice(ndarray::s![1..]) - &a.slice(ndarray::s![..-1])
}

/// straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit<A> {
    pub slope: A,
    pub intercept: A,
}

impl<A: Float> LineFit<A> {
    pub fn eval(&self, x: A) -> A {
        self.slope * x + self.intercept
    }
}

/// ordinary least-squares fit of a first degree polynomial
///
/// The x values get centered on their mean before accumulating the sums.
/// Epoch seconds squared are around 1e18 which would otherwise eat most of
/// the mantissa.
pub fn polyfit1<Sx, Sy, A>(
    x: &ndarray::ArrayBase<Sx, ndarray::Ix1>,
    y: &ndarray::ArrayBase<Sy, ndarray::Ix1>,
) -> Result<LineFit<A>, Error>
where
    Sx: ndarray::Data<Elem = A>,
    Sy: ndarray::Data<Elem = A>,
    A: Float,
{
    if x.len() != y.len() {
        return Err(Error::LengthMismatch(x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(Error::NotEnoughPoints(x.len()));
    }

    let n = A::from(x.len()).ok_or(Error::NotEnoughPoints(x.len()))?;
    let x_mean = x.fold(A::zero(), |acc, &v| acc + v) / n;
    let y_mean = y.fold(A::zero(), |acc, &v| acc + v) / n;

    let (sxx, sxy) = ndarray::Zip::from(x)
        .and(y)
        .fold((A::zero(), A::zero()), |(sxx, sxy), &xv, &yv| {
            let dx = xv - x_mean;
            (sxx + dx * dx, sxy + dx * (yv - y_mean))
        });

    if sxx.is_zero() {
        return Err(Error::SingularFit);
    }

    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn diff() {
        let res = super::diff(&array![0.1, 0.1, 5.2, 5.0]);
        testlib::assert_arr1_eq(&res, &array![0.0, 5.1, -0.2]);

        assert!(super::diff(&array![1.0f64]).is_empty());
        assert!(super::diff(&ndarray::Array1::<f64>::zeros(0)).is_empty());
    }

    #[test]
    fn polyfit1_exact_line() {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let y = x.mapv(|v| 0.5 * v - 2.0);
        let fit = super::polyfit1(&x, &y).unwrap();
        assert_abs_diff_eq!(fit.slope, 0.5, epsilon = 1.0e-12);
        assert_abs_diff_eq!(fit.intercept, -2.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(fit.eval(10.0), 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn polyfit1_noisy() {
        // noisy samples of y = 2x + 1
        let x = array![0.0, 1.0, 2.0, 3.0];
        let y = array![1.1, 2.9, 5.1, 6.9];
        let fit = super::polyfit1(&x, &y).unwrap();
        assert_abs_diff_eq!(fit.slope, 1.96, epsilon = 1.0e-9);
        assert_abs_diff_eq!(fit.intercept, 1.06, epsilon = 1.0e-9);
    }

    #[test]
    fn polyfit1_epoch_scale() {
        let x = ndarray::Array1::linspace(1.689e9, 1.689e9 + 3600.0, 61);
        let y = x.mapv(|v| 1.0e-5 * (v - 1.689e9) + 0.25);
        let fit = super::polyfit1(&x, &y).unwrap();
        assert_abs_diff_eq!(fit.slope, 1.0e-5, epsilon = 1.0e-12);
        assert_abs_diff_eq!(fit.eval(1.689e9), 0.25, epsilon = 1.0e-6);
    }

    #[test]
    fn polyfit1_degenerate() {
        assert_eq!(
            super::polyfit1(&array![1.0], &array![2.0]),
            Err(super::Error::NotEnoughPoints(1))
        );
        assert_eq!(
            super::polyfit1(&array![3.0, 3.0], &array![1.0, 2.0]),
            Err(super::Error::SingularFit)
        );
        assert_eq!(
            super::polyfit1(&array![1.0, 2.0], &array![1.0]),
            Err(super::Error::LengthMismatch(2, 1))
        );
    }
}
