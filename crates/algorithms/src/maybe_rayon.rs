//! rayon or sequential iteration, chosen by the `parallel` feature.
//!
//! Code imports `crate::maybe_rayon::*` and calls `into_par_iter()`. Without
//! the feature that resolves to a plain `into_iter()`, so the rest of the
//! chain uses the standard `Iterator` adapters and order is unchanged.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
