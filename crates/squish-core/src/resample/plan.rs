//! Step planning for progressive resampling.
//!
//! A single-pass resize at an extreme ratio either rings (large upscale) or
//! aliases (large downscale). Splitting the resize into steps that at most
//! double or halve each axis keeps every pass inside the range the filter
//! kernels are designed for.
//!
//! # Algorithm
//!
//! Each axis advances independently toward its target:
//!
//! ```text
//! next = clamp(target, ceil(current / 2), current * 2)
//! ```
//!
//! so the final step may be smaller than the bound in order to land exactly
//! on the target. An axis that has arrived stays put while the other
//! finishes.

use super::ResampleError;

/// Smallest per-step scale factor.
pub const MIN_STEP_FACTOR: f64 = 0.5;
/// Largest per-step scale factor.
pub const MAX_STEP_FACTOR: f64 = 2.0;

/// Ordered intermediate sizes connecting a source to a destination size.
///
/// The source is not part of [`ScalePlan::steps`]; the last step is always
/// the destination. An identity plan has no steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalePlan {
    source: (u32, u32),
    steps: Vec<(u32, u32)>,
}

impl ScalePlan {
    /// Plan the steps from `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns `ResampleError::InvalidDimensions` if either size has a zero axis.
    pub fn new(source: (u32, u32), destination: (u32, u32)) -> Result<Self, ResampleError> {
        for (width, height) in [source, destination] {
            if width == 0 || height == 0 {
                return Err(ResampleError::InvalidDimensions { width, height });
            }
        }

        let mut steps = Vec::new();
        let mut current = source;
        while current != destination {
            current = (
                next_size(current.0, destination.0),
                next_size(current.1, destination.1),
            );
            steps.push(current);
        }

        Ok(Self { source, steps })
    }

    /// Starting size.
    pub fn source(&self) -> (u32, u32) {
        self.source
    }

    /// Final size.
    pub fn destination(&self) -> (u32, u32) {
        self.steps.last().copied().unwrap_or(self.source)
    }

    /// Intermediate sizes, ending with the destination.
    pub fn steps(&self) -> &[(u32, u32)] {
        &self.steps
    }

    /// Number of resampling passes.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when source and destination are equal.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Per-axis scale factor of every step, in order.
    pub fn step_factors(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        std::iter::once(self.source)
            .chain(self.steps.iter().copied())
            .zip(self.steps.iter().copied())
            .map(|((w0, h0), (w1, h1))| (w1 as f64 / w0 as f64, h1 as f64 / h0 as f64))
    }
}

/// Advance one axis by at most a factor of two in either direction.
fn next_size(current: u32, target: u32) -> u32 {
    if target > current {
        current.saturating_mul(2).min(target)
    } else {
        current.div_ceil(2).max(target)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=8000, 1u32..=8000)
    }

    proptest! {
        /// Property: every step scales each axis by a factor in [0.5, 2.0].
        #[test]
        fn prop_step_factors_bounded(src in size_strategy(), dst in size_strategy()) {
            let plan = ScalePlan::new(src, dst).unwrap();
            for (fx, fy) in plan.step_factors() {
                prop_assert!((MIN_STEP_FACTOR..=MAX_STEP_FACTOR).contains(&fx), "x factor {}", fx);
                prop_assert!((MIN_STEP_FACTOR..=MAX_STEP_FACTOR).contains(&fy), "y factor {}", fy);
            }
        }

        /// Property: the plan ends exactly on the destination.
        #[test]
        fn prop_plan_lands_on_destination(src in size_strategy(), dst in size_strategy()) {
            let plan = ScalePlan::new(src, dst).unwrap();
            prop_assert_eq!(plan.destination(), dst);
            prop_assert_eq!(plan.is_empty(), src == dst);
        }

        /// Property: each axis moves monotonically toward its target, never past it.
        #[test]
        fn prop_steps_monotonic(src in size_strategy(), dst in size_strategy()) {
            let plan = ScalePlan::new(src, dst).unwrap();
            let mut prev = src;
            for &step in plan.steps() {
                for (p, s, d) in [(prev.0, step.0, dst.0), (prev.1, step.1, dst.1)] {
                    if d >= p {
                        prop_assert!(p <= s && s <= d);
                    } else {
                        prop_assert!(d <= s && s <= p);
                    }
                }
                prev = step;
            }
        }

        /// Property: plans stay short; at most one step per doubling plus one.
        #[test]
        fn prop_plan_length_logarithmic(src in size_strategy(), dst in size_strategy()) {
            let plan = ScalePlan::new(src, dst).unwrap();
            prop_assert!(plan.len() <= 15, "{} steps", plan.len());
        }
    }
}
