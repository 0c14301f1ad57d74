/// Fixed-size numeric vectors used throughout the pipeline
///
/// A single backing array holds the components; the `x/y/z/w`, `r/g/b/a` and
/// `u/v` accessors are views over the same slots rather than separate fields.
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use num_traits::Float;
use thiserror::Error;

/// Numeric faults raised by the algebra kernel
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("division by zero: cannot normalize a zero-length vector")]
    DivisionByZero,
}

/// An `N`-component vector stored on the stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<T, const N: usize> {
    data: [T; N],
}

pub type Vec2f = Vector<f32, 2>;
pub type Vec3f = Vector<f32, 3>;
pub type Vec4f = Vector<f32, 4>;
pub type Vec2d = Vector<f64, 2>;
pub type Vec3d = Vector<f64, 3>;
pub type Vec4d = Vector<f64, 4>;

impl<T: Float, const N: usize> Vector<T, N> {
    pub fn from_array(data: [T; N]) -> Self {
        Self { data }
    }

    pub fn zeros() -> Self {
        Self {
            data: [T::zero(); N],
        }
    }

    pub fn splat(value: T) -> Self {
        Self { data: [value; N] }
    }

    pub fn as_array(&self) -> &[T; N] {
        &self.data
    }

    pub fn into_array(self) -> [T; N] {
        self.data
    }

    pub fn dot(&self, other: &Self) -> T {
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    /// Euclidean length
    pub fn norm(&self) -> T {
        self.dot(self).sqrt()
    }

    /// Rescale in place so the vector has the given length.
    ///
    /// Fails with [`MathError::DivisionByZero`] when the current norm is
    /// exactly zero; the vector is left untouched in that case.
    pub fn normalize_to(&mut self, length: T) -> Result<&mut Self, MathError> {
        let norm = self.norm();
        if norm == T::zero() {
            return Err(MathError::DivisionByZero);
        }
        *self = *self * (length / norm);
        Ok(self)
    }

    /// Rescale in place to unit length
    pub fn normalize(&mut self) -> Result<&mut Self, MathError> {
        self.normalize_to(T::one())
    }

    /// Unit-length copy of this vector
    pub fn normalized(mut self) -> Result<Self, MathError> {
        self.normalize()?;
        Ok(self)
    }

    pub fn map(self, f: impl FnMut(T) -> T) -> Self {
        Self {
            data: self.data.map(f),
        }
    }

    pub fn zip_map(self, other: Self, mut f: impl FnMut(T, T) -> T) -> Self {
        let mut data = self.data;
        for (slot, &rhs) in data.iter_mut().zip(other.data.iter()) {
            *slot = f(*slot, rhs);
        }
        Self { data }
    }

    /// Linear interpolation, `t = 0` yields `self` and `t = 1` yields `other`
    pub fn lerp(&self, other: &Self, t: T) -> Self {
        *self + (*other - *self) * t
    }

    pub fn component_min(self, other: Self) -> Self {
        self.zip_map(other, T::min)
    }

    pub fn component_max(self, other: Self) -> Self {
        self.zip_map(other, T::max)
    }

    /// Largest absolute component
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, v| acc.max(v.abs()))
    }
}

impl<T: Float> Vector<T, 2> {
    pub fn new(x: T, y: T) -> Self {
        Self { data: [x, y] }
    }

    pub fn x(&self) -> T {
        self.data[0]
    }

    pub fn y(&self) -> T {
        self.data[1]
    }

    pub fn u(&self) -> T {
        self.data[0]
    }

    pub fn v(&self) -> T {
        self.data[1]
    }

    /// Pseudo-cross product `x1*y2 - y1*x2`: the signed area of the
    /// parallelogram spanned by the two vectors.
    pub fn cross(&self, other: &Self) -> T {
        self.x() * other.y() - self.y() * other.x()
    }

    pub fn extend(self, z: T) -> Vector<T, 3> {
        Vector::<T, 3>::new(self.x(), self.y(), z)
    }
}

impl<T: Float> Vector<T, 3> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { data: [x, y, z] }
    }

    pub fn x(&self) -> T {
        self.data[0]
    }

    pub fn y(&self) -> T {
        self.data[1]
    }

    pub fn z(&self) -> T {
        self.data[2]
    }

    pub fn r(&self) -> T {
        self.data[0]
    }

    pub fn g(&self) -> T {
        self.data[1]
    }

    pub fn b(&self) -> T {
        self.data[2]
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y() * other.z() - self.z() * other.y(),
            self.z() * other.x() - self.x() * other.z(),
            self.x() * other.y() - self.y() * other.x(),
        )
    }

    /// Homogeneous form with the given `w`
    pub fn extend(self, w: T) -> Vector<T, 4> {
        Vector::<T, 4>::new(self.x(), self.y(), self.z(), w)
    }

    pub fn truncate(self) -> Vector<T, 2> {
        Vector::<T, 2>::new(self.x(), self.y())
    }
}

impl<T: Float> Vector<T, 4> {
    pub fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { data: [x, y, z, w] }
    }

    pub fn x(&self) -> T {
        self.data[0]
    }

    pub fn y(&self) -> T {
        self.data[1]
    }

    pub fn z(&self) -> T {
        self.data[2]
    }

    pub fn w(&self) -> T {
        self.data[3]
    }

    pub fn r(&self) -> T {
        self.data[0]
    }

    pub fn g(&self) -> T {
        self.data[1]
    }

    pub fn b(&self) -> T {
        self.data[2]
    }

    pub fn a(&self) -> T {
        self.data[3]
    }

    /// Drops `w` without dividing by it
    pub fn truncate(self) -> Vector<T, 3> {
        Vector::<T, 3>::new(self.x(), self.y(), self.z())
    }
}

impl<T: Float, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Float, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<T: Float, const N: usize> From<Vector<T, N>> for [T; N] {
    fn from(vector: Vector<T, N>) -> Self {
        vector.data
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T: Float, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl<T: Float, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl<T: Float, const N: usize> AddAssign for Vector<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Float, const N: usize> SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Float, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

impl<T: Float, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|v| v * rhs)
    }
}

impl<T: Float, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|v| v / rhs)
    }
}

impl<const N: usize> Mul<Vector<f32, N>> for f32 {
    type Output = Vector<f32, N>;

    fn mul(self, rhs: Vector<f32, N>) -> Vector<f32, N> {
        rhs * self
    }
}

impl<const N: usize> Mul<Vector<f64, N>> for f64 {
    type Output = Vector<f64, N>;

    fn mul(self, rhs: Vector<f64, N>) -> Vector<f64, N> {
        rhs * self
    }
}

impl<T: fmt::Display, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}
