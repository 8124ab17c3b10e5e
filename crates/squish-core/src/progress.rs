//! Fractional progress reporting at real stage boundaries.
//!
//! The overall run is split into fixed sub-ranges:
//!
//! | Stage             | Range          |
//! |-------------------|----------------|
//! | Decode            | `0.00 - 0.15`  |
//! | Resample          | `0.15 - 0.45`  |
//! | Encode / search   | `0.45 - 0.95`  |
//! | Done              | `1.00`         |
//!
//! Reported values never decrease, and a successful run always ends with
//! exactly `1.0`.

/// End of the decode sub-range.
pub const DECODE_END: f32 = 0.15;
/// End of the resample sub-range.
pub const RESAMPLE_END: f32 = 0.45;
/// End of the encode/search sub-range; the final `1.0` is reported on success.
pub const ENCODE_END: f32 = 0.95;

/// Wraps an optional caller callback and enforces monotonic output.
pub(crate) struct Progress<'a> {
    callback: Option<&'a mut dyn FnMut(f32)>,
    last: f32,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(callback: Option<&'a mut dyn FnMut(f32)>) -> Self {
        Self {
            callback,
            last: 0.0,
        }
    }

    /// Report an absolute fraction, clamped to `[last, 1]`.
    pub(crate) fn report(&mut self, fraction: f32) {
        let fraction = if fraction.is_nan() {
            self.last
        } else {
            fraction.clamp(0.0, 1.0).max(self.last)
        };
        self.last = fraction;
        if let Some(callback) = self.callback.as_mut() {
            callback(fraction);
        }
    }

    /// Report `done / total` of the way through `start..end`.
    pub(crate) fn report_within(&mut self, start: f32, end: f32, done: u32, total: u32) {
        let ratio = if total == 0 {
            1.0
        } else {
            (done.min(total) as f32) / (total as f32)
        };
        self.report(start + (end - start) * ratio);
    }

    /// Report completion.
    pub(crate) fn finish(&mut self) {
        self.report(1.0);
    }

    pub(crate) fn last(&self) -> f32 {
        self.last
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: whatever is reported, the callback sees a non-decreasing
        /// sequence inside [0, 1].
        #[test]
        fn prop_monotonic_and_bounded(values in prop::collection::vec(-1.0f32..2.0, 0..50)) {
            let mut seen = Vec::new();
            let mut record = |f: f32| seen.push(f);
            let mut progress = Progress::new(Some(&mut record));
            for v in &values {
                progress.report(*v);
            }
            drop(progress);

            prop_assert!(seen.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(seen.iter().all(|f| (0.0..=1.0).contains(f)));
        }
    }
}
