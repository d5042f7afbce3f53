// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use float_cmp::ApproxEq;
use ndarray::{ArrayBase, Data, Dimension};

/// Asserts that two floats or containers of floats are approximately equal.
///
/// # Examples
///
/// Floats:
///
/// ```
/// use xayn_test_utils::assert_approx_eq;
/// assert_approx_eq!(f32, 0.150_391_55, 0.150_391_6, ulps = 3);
/// assert_approx_eq!(f32, 0.1 + 0.2, 0.3, epsilon = 1e-6);
/// ```
///
/// Slices, arrays, vectors and ndarray arrays, which are compared in logical order:
///
/// ```
/// use ndarray::arr1;
/// use xayn_test_utils::assert_approx_eq;
/// assert_approx_eq!(f32, arr1(&[0.5, 1.5]), [0.5, 1.5]);
/// assert_approx_eq!(f32, vec![[1., 2.], [3., 4.]], &[[1., 2.], [3., 4.]]);
/// ```
///
/// The number of `ulps` defaults to `2` and the `epsilon` to `0`. Two NaN values are treated as
/// approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let epsilon = $epsilon;
        let ulps = $ulps;
        let left = $crate::Leaves::<$t>::leaves(&$left);
        let right = $crate::Leaves::<$t>::leaves(&$right);
        std::assert_eq!(
            left.len(),
            right.len(),
            "Approximated equal assertion failed for inputs of different lengths",
        );
        for (index, (lv, rv)) in left.into_iter().zip(right).enumerate() {
            if !(lv.is_nan() && rv.is_nan()) {
                std::assert!(
                    $crate::approx_eq!($t, lv, rv, epsilon = epsilon, ulps = ulps),
                    "Approximated equal assertion failed (ulps={:?}, epsilon={:?}) at leaf {}: {:?} != {:?}",
                    ulps, epsilon, index, lv, rv,
                );
            }
        }
    }};
}

/// Flattens floats and containers of floats for the [`assert_approx_eq!`] macro.
pub trait Leaves<L>
where
    L: ApproxEq + Copy,
{
    /// Collects all leaf values in logical order.
    fn leaves(&self) -> Vec<L>;
}

impl Leaves<f32> for f32 {
    fn leaves(&self) -> Vec<f32> {
        vec![*self]
    }
}

impl Leaves<f64> for f64 {
    fn leaves(&self) -> Vec<f64> {
        vec![*self]
    }
}

impl<L, T> Leaves<L> for &T
where
    L: ApproxEq + Copy,
    T: Leaves<L> + ?Sized,
{
    fn leaves(&self) -> Vec<L> {
        (**self).leaves()
    }
}

impl<L, T> Leaves<L> for [T]
where
    L: ApproxEq + Copy,
    T: Leaves<L>,
{
    fn leaves(&self) -> Vec<L> {
        self.iter().flat_map(Leaves::leaves).collect()
    }
}

impl<L, T, const N: usize> Leaves<L> for [T; N]
where
    L: ApproxEq + Copy,
    T: Leaves<L>,
{
    fn leaves(&self) -> Vec<L> {
        self.as_slice().leaves()
    }
}

impl<L, T> Leaves<L> for Vec<T>
where
    L: ApproxEq + Copy,
    T: Leaves<L>,
{
    fn leaves(&self) -> Vec<L> {
        self.as_slice().leaves()
    }
}

impl<L, S, D> Leaves<L> for ArrayBase<S, D>
where
    L: ApproxEq + Copy,
    S: Data,
    S::Elem: Leaves<L>,
    D: Dimension,
{
    fn leaves(&self) -> Vec<L> {
        self.iter().flat_map(Leaves::leaves).collect()
    }
}
