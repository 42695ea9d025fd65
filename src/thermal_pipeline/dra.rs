//! Dynamic range adjustment
//!
//! Derives the per-frame intensity window from the frame's histogram by clipping a
//! fraction of pixels at each end.

pub mod histogram;
pub mod window;

#[cfg(test)]
mod tests;

pub use histogram::Histogram;
pub use window::{clip_fractions, compute_window, window_from_histogram};
