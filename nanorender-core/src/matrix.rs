/// Fixed-size row-major matrices
use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use num_traits::Float;

use crate::vector::Vector;

/// An `R`×`C` matrix stored as an array of rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<T, const R: usize, const C: usize> {
    rows: [[T; C]; R],
}

pub type Mat2 = Matrix<f32, 2, 2>;
pub type Mat3 = Matrix<f32, 3, 3>;
pub type Mat4 = Matrix<f32, 4, 4>;
pub type Mat2d = Matrix<f64, 2, 2>;
pub type Mat3d = Matrix<f64, 3, 3>;
pub type Mat4d = Matrix<f64, 4, 4>;

impl<T: Float, const R: usize, const C: usize> Matrix<T, R, C> {
    pub fn from_rows(rows: [[T; C]; R]) -> Self {
        Self { rows }
    }

    pub fn zeros() -> Self {
        Self {
            rows: [[T::zero(); C]; R],
        }
    }

    pub fn rows(&self) -> &[[T; C]; R] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Vector<T, C> {
        Vector::from_array(self.rows[index])
    }

    pub fn column(&self, index: usize) -> Vector<T, R> {
        Vector::from_array(self.rows.map(|row| row[index]))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn transpose(&self) -> Matrix<T, C, R> {
        let mut out = Matrix::<T, C, R>::zeros();
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                out.rows[j][i] = value;
            }
        }
        out
    }

    fn map(self, f: impl Fn(T) -> T) -> Self {
        Self {
            rows: self.rows.map(|row| row.map(&f)),
        }
    }

    fn zip_map(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        let mut rows = self.rows;
        for (row, other_row) in rows.iter_mut().zip(other.rows.iter()) {
            for (value, &rhs) in row.iter_mut().zip(other_row.iter()) {
                *value = f(*value, rhs);
            }
        }
        Self { rows }
    }

    pub fn add_scalar(self, scalar: T) -> Self {
        self.map(|v| v + scalar)
    }

    pub fn sub_scalar(self, scalar: T) -> Self {
        self.map(|v| v - scalar)
    }
}

impl<T: Float, const N: usize> Matrix<T, N, N> {
    pub fn identity() -> Self {
        let mut out = Self::zeros();
        for i in 0..N {
            out.rows[i][i] = T::one();
        }
        out
    }

    /// Determinant by Gaussian elimination.
    ///
    /// Each row swap flips the sign once. A column whose pivot and every
    /// candidate below it are zero makes the matrix singular and yields 0.
    pub fn determinant(&self) -> T {
        let mut m = self.rows;
        let mut sign = T::one();

        for i in 0..N {
            let Some(p) = pivot_row(&m, i) else {
                return T::zero();
            };
            if p != i {
                m.swap(i, p);
                sign = -sign;
            }

            let pivot = m[i];
            for row in m.iter_mut().skip(i + 1) {
                let coef = row[i] / pivot[i];
                for k in i..N {
                    row[k] = row[k] - pivot[k] * coef;
                }
            }
        }

        (0..N).fold(sign, |acc, i| acc * m[i][i])
    }

    /// Inverse by Gauss-Jordan elimination, `None` when singular
    pub fn inverse(&self) -> Option<Self> {
        let mut m = self.rows;
        let mut inv = Self::identity().rows;

        for i in 0..N {
            let p = pivot_row(&m, i)?;
            if p != i {
                m.swap(i, p);
                inv.swap(i, p);
            }

            let pivot = m[i][i];
            for k in 0..N {
                m[i][k] = m[i][k] / pivot;
                inv[i][k] = inv[i][k] / pivot;
            }

            let (pivot_m, pivot_inv) = (m[i], inv[i]);
            for j in (0..N).filter(|&j| j != i) {
                let coef = m[j][i];
                if coef == T::zero() {
                    continue;
                }
                for k in 0..N {
                    m[j][k] = m[j][k] - pivot_m[k] * coef;
                    inv[j][k] = inv[j][k] - pivot_inv[k] * coef;
                }
            }
        }

        Some(Self { rows: inv })
    }
}

/// Row at or below `col` with the largest magnitude in that column, or
/// `None` when all of them are zero.
fn pivot_row<T: Float, const N: usize>(m: &[[T; N]; N], col: usize) -> Option<usize> {
    let (best, magnitude) = (col..N)
        .map(|r| (r, m[r][col].abs()))
        .fold((col, T::zero()), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    (magnitude > T::zero()).then_some(best)
}

impl<T: Float, const N: usize> Default for Matrix<T, N, N> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T, const R: usize, const C: usize> Index<(usize, usize)> for Matrix<T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.rows[row][col]
    }
}

impl<T, const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<T, R, C> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.rows[row][col]
    }
}

impl<T: Float, const R: usize, const C: usize> Add for Matrix<T, R, C> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl<T: Float, const R: usize, const C: usize> Sub for Matrix<T, R, C> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl<T: Float, const R: usize, const C: usize> Mul<T> for Matrix<T, R, C> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|v| v * rhs)
    }
}

impl<T: Float, const R: usize, const C: usize> Div<T> for Matrix<T, R, C> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|v| v / rhs)
    }
}

impl<T: Float, const R: usize, const C: usize, const K: usize> Mul<Matrix<T, C, K>>
    for Matrix<T, R, C>
{
    type Output = Matrix<T, R, K>;

    fn mul(self, rhs: Matrix<T, C, K>) -> Matrix<T, R, K> {
        let mut out = Matrix::<T, R, K>::zeros();
        for i in 0..R {
            for j in 0..K {
                out.rows[i][j] =
                    (0..C).fold(T::zero(), |acc, k| acc + self.rows[i][k] * rhs.rows[k][j]);
            }
        }
        out
    }
}

impl<T: Float, const R: usize, const C: usize> Mul<Vector<T, C>> for Matrix<T, R, C> {
    type Output = Vector<T, R>;

    fn mul(self, rhs: Vector<T, C>) -> Vector<T, R> {
        Vector::from_array(self.rows.map(|row| Vector::from_array(row).dot(&rhs)))
    }
}

impl<T: fmt::Display, const R: usize, const C: usize> fmt::Display for Matrix<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec4d;
    use approx::assert_abs_diff_eq;

    fn assert_matrix_eq<const N: usize>(a: &Matrix<f64, N, N>, b: &Matrix<f64, N, N>, eps: f64) {
        for i in 0..N {
            for j in 0..N {
                assert_abs_diff_eq!(a[(i, j)], b[(i, j)], epsilon = eps);
            }
        }
    }

    #[test]
    fn test_identity_determinant_is_one() {
        assert_eq!(Matrix::<f64, 1, 1>::identity().determinant(), 1.0);
        assert_eq!(Mat2d::identity().determinant(), 1.0);
        assert_eq!(Mat3d::identity().determinant(), 1.0);
        assert_eq!(Mat4d::identity().determinant(), 1.0);
        assert_eq!(Matrix::<f64, 6, 6>::identity().determinant(), 1.0);
    }

    #[test]
    fn test_row_swap_flips_determinant_sign() {
        let a = Mat3d::from_rows([[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]]);
        let swapped = Mat3d::from_rows([[0.0, 1.0, 4.0], [1.0, 2.0, 3.0], [5.0, 6.0, 0.0]]);
        assert_abs_diff_eq!(a.determinant(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(swapped.determinant(), -a.determinant(), epsilon = 1e-9);

        // a zero pivot forces exactly one swap during elimination
        let permutation = Mat2d::from_rows([[0.0, 1.0], [1.0, 0.0]]);
        assert_eq!(permutation.determinant(), -1.0);
    }

    #[test]
    fn test_singular_determinant_is_zero() {
        assert_eq!(Mat3d::zeros().determinant(), 0.0);
        let rank_one = Mat2d::from_rows([[1.0, 2.0], [2.0, 4.0]]);
        assert_eq!(rank_one.determinant(), 0.0);
        let m4 = Mat4d::from_rows([
            [0.0, 1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0, 7.0],
            [8.0, 9.0, 10.0, 11.0],
            [12.0, 13.0, 14.0, 15.0],
        ]);
        assert_abs_diff_eq!(m4.determinant(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let a = Mat3d::from_rows([[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]]);
        let inv = a.inverse().expect("matrix is invertible");
        assert_matrix_eq(&(inv * a), &Mat3d::identity(), 1e-9);
        assert_matrix_eq(&(a * inv), &Mat3d::identity(), 1e-9);

        let b = Mat4d::from_rows([
            [0.0, 2.0, 0.0, 1.0],
            [3.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 4.0, 0.0],
            [1.0, 0.0, 0.0, 5.0],
        ]);
        let inv = b.inverse().expect("matrix is invertible");
        assert_matrix_eq(&(inv * b), &Mat4d::identity(), 1e-9);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert!(Mat4d::zeros().inverse().is_none());
        assert!(Mat2d::from_rows([[1.0, 2.0], [2.0, 4.0]]).inverse().is_none());
    }

    #[test]
    fn test_agrees_with_nalgebra() {
        let rows = [
            [2.0, -1.0, 0.5, 3.0],
            [1.0, 4.0, -2.0, 0.0],
            [0.0, 3.0, 1.0, -1.0],
            [5.0, 0.0, 2.0, 1.0],
        ];
        let ours = Mat4d::from_rows(rows);
        let theirs = nalgebra::Matrix4::from_fn(|i, j| rows[i][j]);

        assert_abs_diff_eq!(ours.determinant(), theirs.determinant(), epsilon = 1e-9);

        let inv = ours.inverse().unwrap();
        let reference = theirs.try_inverse().unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(inv[(i, j)], reference[(i, j)], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_products() {
        let a = Mat2d::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let b = Mat2d::from_rows([[5.0, 6.0], [7.0, 8.0]]);
        assert_eq!(a * b, Mat2d::from_rows([[19.0, 22.0], [43.0, 50.0]]));

        let wide = Matrix::<f64, 2, 3>::from_rows([[1.0, 0.0, 2.0], [0.0, 1.0, 3.0]]);
        let tall = wide.transpose();
        let square: Mat2d = wide * tall;
        assert_eq!(square, Mat2d::from_rows([[5.0, 6.0], [6.0, 10.0]]));

        let m4 = Mat4d::from_rows([
            [0.0, 1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0, 7.0],
            [8.0, 9.0, 10.0, 11.0],
            [12.0, 13.0, 14.0, 15.0],
        ]);
        let v = m4 * Vec4d::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(v, Vec4d::new(20.0, 60.0, 100.0, 140.0));
    }

    #[test]
    fn test_scalar_and_elementwise_ops() {
        let a = Mat2d::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let b = Mat2d::from_rows([[5.0, 6.0], [7.0, 8.0]]);
        assert_eq!(a + b, Mat2d::from_rows([[6.0, 8.0], [10.0, 12.0]]));
        assert_eq!(a - b, Mat2d::from_rows([[-4.0, -4.0], [-4.0, -4.0]]));
        assert_eq!(a * 2.0, Mat2d::from_rows([[2.0, 4.0], [6.0, 8.0]]));
        assert_eq!(b / 2.0, Mat2d::from_rows([[2.5, 3.0], [3.5, 4.0]]));
        assert_eq!(a.add_scalar(1.0), Mat2d::from_rows([[2.0, 3.0], [4.0, 5.0]]));
        assert_eq!(a.sub_scalar(1.0), Mat2d::from_rows([[0.0, 1.0], [2.0, 3.0]]));
        assert_eq!(a.transpose(), Mat2d::from_rows([[1.0, 3.0], [2.0, 4.0]]));
        assert_eq!(a.row(1).y(), 4.0);
        assert_eq!(a.column(0).y(), 3.0);
        assert_eq!(a.get(2, 0), None);
    }
}
