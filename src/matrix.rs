//! Dense matrices.

use crate::error::{Error, Result};

use itertools::multizip;
use rand::Rng;
use std::ops::{Add, Mul, Sub};

/// A dense, row-major matrix of `f64`.
///
/// Every binary operator returns a freshly allocated matrix and leaves its
/// operands untouched. Operators require exact shape agreement: the `try_*`
/// methods report a mismatch as `Error::DimensionMismatch`, while the
/// operator traits and `elementwise_mul` panic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatData")]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major array
}

#[derive(Deserialize)]
struct MatData {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<MatData> for Mat {
    type Error = Error;

    fn try_from(raw: MatData) -> Result<Self> {
        Mat::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl Mat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix whose entries are drawn independently and uniformly
    /// from `[0, 1)`.
    pub fn random<R>(rows: usize, cols: usize, rng: &mut R) -> Self
    where
        R: Rng,
    {
        let data = (0..rows * cols).map(|_| rng.random::<f64>()).collect();
        Mat { rows, cols, data }
    }

    /// Wraps row-major `data` as a `rows` x `cols` matrix.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(Error::DimensionMismatch {
                op: "from_vec",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Mat { rows, cols, data })
    }

    /// Creates a column vector holding `values`.
    pub fn column(values: &[f64]) -> Self {
        Mat {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    /// Returns the entry at (`row`, `col`). Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.offset(row, col)]
    }

    /// Overwrites the entry at (`row`, `col`). Panics when out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let i = self.offset(row, col);
        self.data[i] = value;
    }

    pub fn transpose(&self) -> Mat {
        let mut out = Mat::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }

    fn check_same_shape(&self, other: &Mat, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    fn zip_with<F>(&self, other: &Mat, f: F) -> Mat
    where
        F: Fn(f64, f64) -> f64,
    {
        let data = multizip((self.data.iter(), other.data.iter()))
            .map(|(&l, &r)| f(l, r))
            .collect();
        Mat {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    pub fn try_add(&self, other: &Mat) -> Result<Mat> {
        self.check_same_shape(other, "add")?;
        Ok(self.zip_with(other, |l, r| l + r))
    }

    pub fn try_sub(&self, other: &Mat) -> Result<Mat> {
        self.check_same_shape(other, "subtract")?;
        Ok(self.zip_with(other, |l, r| l - r))
    }

    /// Matrix product `self * other`.
    pub fn try_mul(&self, other: &Mat) -> Result<Mat> {
        if self.cols != other.rows {
            return Err(Error::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let mut out = Mat::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..other.cols {
                let mut sum = 0.0;
                for l in 0..self.cols {
                    sum += self.data[i * self.cols + l] * other.data[l * other.cols + k];
                }
                out.data[i * other.cols + k] = sum;
            }
        }
        Ok(out)
    }

    /// Hadamard product.
    pub fn try_elementwise_mul(&self, other: &Mat) -> Result<Mat> {
        self.check_same_shape(other, "elementwise multiply")?;
        Ok(self.zip_with(other, |l, r| l * r))
    }

    pub fn elementwise_mul(&self, other: &Mat) -> Mat {
        fatal(self.try_elementwise_mul(other))
    }

    /// Scales every entry by `scalar` in place.
    pub fn scalar_mul(&mut self, scalar: f64) {
        for x in &mut self.data {
            *x *= scalar;
        }
    }

    /// Returns the entries in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }
}

/// Unwraps the result of a shape-checked operation whose shapes are a
/// precondition of the caller.
fn fatal<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

impl<'a> Add<&'a Mat> for &'a Mat {
    type Output = Mat;

    fn add(self, other: &Mat) -> Mat {
        fatal(self.try_add(other))
    }
}

impl<'a> Sub<&'a Mat> for &'a Mat {
    type Output = Mat;

    fn sub(self, other: &Mat) -> Mat {
        fatal(self.try_sub(other))
    }
}

impl<'a> Mul<&'a Mat> for &'a Mat {
    type Output = Mat;

    fn mul(self, other: &Mat) -> Mat {
        fatal(self.try_mul(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mat(rows: usize, cols: usize, data: &[f64]) -> Mat {
        Mat::from_vec(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn zeros_and_random() {
        let z = Mat::zeros(2, 3);
        assert_eq!(z.shape(), (2, 3));
        assert!(z.as_slice().iter().all(|&x| x == 0.0));

        let mut rng = StdRng::seed_from_u64(7);
        let r = Mat::random(4, 5, &mut rng);
        assert_eq!(r.as_slice().len(), 20);
        assert!(r.as_slice().iter().all(|&x| (0.0..1.0).contains(&x)));

        let mut again = StdRng::seed_from_u64(7);
        assert_eq!(Mat::random(4, 5, &mut again), r);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Mat::from_vec(2, 2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(Mat::from_vec(usize::MAX, 2, Vec::new()).is_err());
    }

    #[test]
    fn get_set_row_major() {
        let mut m = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        m.set(1, 2, -1.0);
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, -1.0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range() {
        Mat::zeros(2, 2).get(2, 0);
    }

    #[test]
    fn transpose_twice_is_identity() {
        let m = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn add_then_subtract() {
        let a = mat(2, 2, &[0.1, 0.2, 0.3, 0.4]);
        let b = mat(2, 2, &[1.5, -2.5, 3.25, 100.0]);
        let back = &(&a + &b) - &b;
        for (x, y) in back.as_slice().iter().zip(a.as_slice()) {
            assert!((x - y).abs() < 1e-12);
        }
        // Operands are left untouched.
        assert_eq!(b.to_vec(), vec![1.5, -2.5, 3.25, 100.0]);
    }

    #[test]
    fn multiply() {
        let a = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = mat(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = &a * &b;
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn multiply_mismatch_is_reported() {
        let a = Mat::zeros(2, 3);
        let b = Mat::zeros(2, 3);
        match a.try_mul(&b) {
            Err(Error::DimensionMismatch { left, right, .. }) => {
                assert_eq!(left, (2, 3));
                assert_eq!(right, (2, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn multiply_mismatch_panics() {
        let _ = &Mat::zeros(2, 3) * &Mat::zeros(2, 3);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn add_mismatch_panics() {
        let _ = &Mat::zeros(2, 1) + &Mat::zeros(1, 2);
    }

    #[test]
    fn elementwise_and_scalar() {
        let a = mat(1, 3, &[1.0, 2.0, 3.0]);
        let b = mat(1, 3, &[2.0, 0.5, -1.0]);
        assert_eq!(a.elementwise_mul(&b).to_vec(), vec![2.0, 1.0, -3.0]);
        assert!(a.try_elementwise_mul(&Mat::zeros(3, 1)).is_err());

        let mut c = a.clone();
        c.scalar_mul(0.5);
        assert_eq!(c.to_vec(), vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn serde_rejects_inconsistent_shape() {
        let json = r#"{"rows":2,"cols":2,"data":[1.0]}"#;
        assert!(serde_json::from_str::<Mat>(json).is_err());
        let json = r#"{"rows":4294967296,"cols":4294967296,"data":[]}"#;
        assert!(serde_json::from_str::<Mat>(json).is_err());

        let m = mat(1, 2, &[0.25, -4.0]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<Mat>(&json).unwrap(), m);
    }
}
