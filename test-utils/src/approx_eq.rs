/// Compares two "things" with approximate equality.
///
/// # Examples
///
/// This can be used to compare two floating point numbers:
///
/// ```
/// use test_utils::assert_approx_eq;
/// assert_approx_eq!(f64, 0.15039155, 0.15039155);
/// assert_approx_eq!(f32, 0.15039155, 0.1503916, ulps = 3);
/// ```
///
/// Or containers of such:
///
/// ```
/// use test_utils::assert_approx_eq;
/// assert_approx_eq!(f64, &[1.0, 2.], vec![1.0, 2.])
/// ```
///
/// The number of `ulps` defaults to `2` if not specified.
///
/// # NaN Handling
///
/// The assertion treats two NaN values to be "approximately" equal.
///
/// While there are good reasons for two NaN values not to compare as equal in
/// general, they don't really apply for this assertion which tries to check if
/// something has "an expected outcome" instead of "two values being semantically
/// the same".
///
/// # Missing Implementations
///
/// Implementations for other primitives, smart pointer types or other sequential containers
/// can easily be added on demand.
///
/// Non sequential containers are not supported.
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
        let left = $crate::PinLeaf::<$t>::pin_leaf($left);
        let right = $crate::PinLeaf::<$t>::pin_leaf($right);
        let mut left_iter: std::boxed::Box<dyn std::iter::Iterator<Item = (std::vec::Vec<usize>, $t)> + '_> =
            $crate::ApproxEqIter::indexed_iter_logical_order(&left, Vec::new());
        let mut right_iter: std::boxed::Box<dyn std::iter::Iterator<Item = (std::vec::Vec<usize>, $t)> + '_> =
            $crate::ApproxEqIter::indexed_iter_logical_order(&right, Vec::new());
        loop {
            match (left_iter.next(), right_iter.next()) {
                (Some((lidx, lv)), Some((ridx, rv))) => {
                    std::assert_eq!(
                        lidx, ridx,
                        "Dimensionality mismatch when iterating in logical order: {:?} != {:?}",
                        lidx, ridx
                    );
                    if !(lv.is_nan() && rv.is_nan()) {
                        std::assert!(
                            $crate::approx_eq!($t, lv, rv, ulps = ulps, epsilon = epsilon),
                            "approximated equal assertion failed (ulps={ulps:?}, epsilon={epsilon:?}) at index {idx:?}: {lv:?} == {rv:?}",
                            ulps=ulps,
                            epsilon=epsilon,
                            lv=lv,
                            rv=rv,
                            idx=lidx,
                        );
                    }
                }
                (Some(pair), None) => {
                    std::panic!("Left input is longer starting with from index {:?}", pair);
                }
                (None, Some(pair)) => {
                    std::panic!("Right input is longer starting with from index {:?}", pair);
                }
                (None, None) => break,
            }
        }
    }};
}

/// Helper trait for the [`assert_approx_eq!`] macro.
///
/// Until we have GAT in rust this is meant to be implemented
/// on a `&`-reference to the thing you want to implement it for.
///
/// This can be implemented for both containers and leaf values (e.g. &f64).
///
/// This trait is tuned for testing, and uses trait objects to reduce the
/// amount of code overhead.
///
/// Only use it for [`assert_approx_eq!`].
pub trait ApproxEqIter<'a>: Copy {
    /// The leaf element, e.g. f64.
    type LeafElement;

    /// Flattened iterates over all leaf elements in this instance.
    ///
    /// The passed in `index_prefix` is the "index" at which
    /// this instance is placed.
    ///
    /// Leaf values implementing this should just return a iterator
    /// which yields a single tuple of their value and the
    /// passed in index prefix.
    ///
    /// Sequential containers are supposed to yield a tuple for each
    /// element in them in which the index is created by pushing
    /// the elements index in this container onto the `index_prefix`.
    fn indexed_iter_logical_order(
        self,
        index_prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a>;
}

macro_rules! impl_leaf {
    ($($t:ty),*) => {
        $(
            impl<'a> ApproxEqIter<'a> for &'a $t {
                type LeafElement = $t;

                fn indexed_iter_logical_order(
                    self,
                    prefix: Vec<usize>,
                ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
                    let iter = std::iter::once((prefix, *self));
                    Box::new(iter)
                }
            }
        )*
    };
}

impl_leaf!(f32, f64);

/// Inference helper for [`assert_approx_eq!`].
///
/// There are leaf [`ApproxEqIter`] impls for both `f32` and `f64`, so a bare
/// float literal passed to the macro (e.g. `0.15039155`) is ambiguous and
/// defaults to `f64` before the macro's explicit `$t` can constrain it. This
/// trait is parameterized by the leaf type `T` in *input* position, so a
/// turbofish `PinLeaf::<$t>::pin_leaf(value)` drives impl selection and pins a
/// bare scalar literal to `$t`. Container inputs go through the blanket impls
/// unchanged — their leaves are resolved by `ApproxEqIter` as before.
#[doc(hidden)]
pub trait PinLeaf<T> {
    fn pin_leaf(self) -> Self;
}

macro_rules! impl_pin_scalar {
    ($($t:ty),*) => {
        $(
            impl PinLeaf<$t> for $t {
                fn pin_leaf(self) -> Self {
                    self
                }
            }
        )*
    };
}

impl_pin_scalar!(f32, f64);

impl<T, X: ?Sized> PinLeaf<T> for &X {
    fn pin_leaf(self) -> Self {
        self
    }
}

impl<T, U> PinLeaf<T> for Vec<U> {
    fn pin_leaf(self) -> Self {
        self
    }
}

impl<T, U, const N: usize> PinLeaf<T> for [U; N] {
    fn pin_leaf(self) -> Self {
        self
    }
}

impl<'a, T> ApproxEqIter<'a> for &'a &'a T
where
    &'a T: ApproxEqIter<'a>,
    T: 'a + ?Sized,
{
    type LeafElement = <&'a T as ApproxEqIter<'a>>::LeafElement;

    fn indexed_iter_logical_order(
        self,
        prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
        (*self).indexed_iter_logical_order(prefix)
    }
}

impl<'a, T: 'a> ApproxEqIter<'a> for &'a Option<T>
where
    &'a T: ApproxEqIter<'a>,
{
    type LeafElement = <&'a T as ApproxEqIter<'a>>::LeafElement;

    fn indexed_iter_logical_order(
        self,
        prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
        let iter = self.iter().flat_map(move |el| {
            let mut new_prefix = prefix.clone();
            new_prefix.push(0);
            el.indexed_iter_logical_order(new_prefix)
        });

        Box::new(iter)
    }
}

impl<'a, T: 'a> ApproxEqIter<'a> for &'a Vec<T>
where
    &'a T: ApproxEqIter<'a>,
{
    type LeafElement = <&'a T as ApproxEqIter<'a>>::LeafElement;

    fn indexed_iter_logical_order(
        self,
        prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
        self.as_slice().indexed_iter_logical_order(prefix)
    }
}

impl<'a, T, const N: usize> ApproxEqIter<'a> for &'a [T; N]
where
    &'a T: ApproxEqIter<'a>,
{
    type LeafElement = <&'a T as ApproxEqIter<'a>>::LeafElement;

    fn indexed_iter_logical_order(
        self,
        prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
        self.as_ref().indexed_iter_logical_order(prefix)
    }
}

impl<'a, T: 'a> ApproxEqIter<'a> for &'a [T]
where
    &'a T: ApproxEqIter<'a>,
{
    type LeafElement = <&'a T as ApproxEqIter<'a>>::LeafElement;

    fn indexed_iter_logical_order(
        self,
        prefix: Vec<usize>,
    ) -> Box<dyn Iterator<Item = (Vec<usize>, Self::LeafElement)> + 'a> {
        let iter = self.iter().enumerate().flat_map(move |(idx, el)| {
            let mut new_prefix = prefix.clone();
            new_prefix.push(idx);
            el.indexed_iter_logical_order(new_prefix)
        });

        Box::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    #[test]
    fn test_assert_approx_eq_float() {
        assert_approx_eq!(f32, 0.15039155, 0.1503916, ulps = 3);
        catch_unwind(|| assert_approx_eq!(f32, 0.15039155, 0.1503916, ulps = 2)).unwrap_err();
    }

    #[test]
    fn test_assert_approx_eq_f64() {
        assert_approx_eq!(f64, 13.864412483585935, 13.864412483585935);
        catch_unwind(|| assert_approx_eq!(f64, 13.864412483585935, 13.864412483585934, ulps = 0))
            .unwrap_err();
    }

    #[test]
    fn test_assert_approx_eq_iterable_1d() {
        assert_approx_eq!(f64, &[0.25, 1.25], &[0.25, 1.25]);
        assert_approx_eq!(f64, &[0.25, 1.25], vec![0.25, 1.25]);
    }

    #[test]
    #[should_panic(expected = "at index [1]")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(f64, &[0.35, 4.35], &[0.35, 4.45]);
    }

    #[test]
    fn test_compares_nan_values() {
        assert_approx_eq!(f64, [3.1, f64::NAN, 1.0], [3.1, f64::NAN, 1.0]);
    }

    #[test]
    #[should_panic(expected = "[1]")]
    fn test_compares_nan_with_panic() {
        assert_approx_eq!(f64, [3.1, f64::NAN, 1.0], [3.1, 3.0, 1.0]);
    }

    #[test]
    fn test_equality_using_epsilon() {
        assert_approx_eq!(f64, 0.125, 0.625, epsilon = 0.5)
    }

    #[test]
    #[should_panic(expected = "[]")]
    fn test_equality_using_epsilon_with_panic() {
        assert_approx_eq!(f64, 0.125, 0.625, epsilon = 0.49)
    }
}
