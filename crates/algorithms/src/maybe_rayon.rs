//! Parallel or sequential iteration, chosen by the `parallel` feature.
//!
//! With the feature on this is rayon's prelude. Without it, `into_par_iter()`
//! falls back to `into_iter()` so per-row and per-cell walks run in order.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// `into_par_iter()` on anything iterable, yielding a plain `Iterator`
    pub trait IntoParallelIterator {
        type Iter;
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
