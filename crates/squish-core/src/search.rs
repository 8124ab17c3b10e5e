//! Target-size quality search.
//!
//! Binary search over the encoder's quality parameter, relying on encoded
//! size being monotone non-decreasing in quality for a fixed raster. Each
//! iteration depends on the previous result, so the probes run strictly in
//! sequence.
//!
//! # Algorithm
//!
//! ```text
//! low = min_quality; high = max_quality; best = None
//! repeat up to max_iterations times:
//!     mid = (low + high) / 2
//!     diff = |len(encode(mid)) - target| / target
//!     keep (bytes, diff, mid) if diff < best.diff
//!     diff <= tolerance  => done
//!     too big            => high = mid
//!     too small          => low = mid
//! ```
//!
//! Ties keep the earlier candidate (strict `<`). Callers depend on which
//! quality wins in symmetric cases, so the comparison must stay strict.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte-size goal for [`search_quality`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeTarget {
    /// Desired encoded size in bytes.
    pub target_bytes: u64,
    /// Accepted relative deviation from `target_bytes`.
    pub tolerance_ratio: f32,
    /// Lower bound of the quality search domain.
    pub min_quality: f32,
    /// Upper bound of the quality search domain.
    pub max_quality: f32,
    /// Maximum number of encode calls.
    pub max_iterations: u32,
}

impl Default for SizeTarget {
    fn default() -> Self {
        Self {
            target_bytes: 0,
            tolerance_ratio: 0.05,
            min_quality: 0.05,
            max_quality: 0.95,
            max_iterations: 12,
        }
    }
}

impl SizeTarget {
    /// A target with default tolerance, quality range and iteration budget.
    pub fn new(target_bytes: u64) -> Self {
        Self {
            target_bytes,
            ..Default::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance_ratio: f32) -> Self {
        self.tolerance_ratio = tolerance_ratio;
        self
    }

    pub fn with_quality_range(mut self, min_quality: f32, max_quality: f32) -> Self {
        self.min_quality = min_quality;
        self.max_quality = max_quality;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check that the target describes a searchable domain.
    pub fn validate(&self) -> Result<(), SizeTargetError> {
        if self.target_bytes == 0 {
            return Err(SizeTargetError::ZeroTarget);
        }
        if !self.tolerance_ratio.is_finite() || !(0.0..1.0).contains(&self.tolerance_ratio) {
            return Err(SizeTargetError::InvalidTolerance(self.tolerance_ratio));
        }
        let in_unit = |q: f32| (0.0..=1.0).contains(&q);
        if !in_unit(self.min_quality) || !in_unit(self.max_quality) || self.min_quality > self.max_quality {
            return Err(SizeTargetError::InvalidQualityRange {
                min: self.min_quality,
                max: self.max_quality,
            });
        }
        if self.max_iterations == 0 {
            return Err(SizeTargetError::ZeroIterations);
        }
        Ok(())
    }

    /// Relative distance of `len` from the target.
    pub fn relative_diff(&self, len: u64) -> f64 {
        len.abs_diff(self.target_bytes) as f64 / self.target_bytes as f64
    }

    /// Whether `len` is inside the tolerance band.
    pub fn accepts(&self, len: u64) -> bool {
        self.relative_diff(len) <= self.tolerance_ratio as f64
    }
}

/// Reasons a [`SizeTarget`] cannot be searched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizeTargetError {
    #[error("Target size must be greater than zero bytes")]
    ZeroTarget,

    #[error("Tolerance ratio must be in [0, 1), got {0}")]
    InvalidTolerance(f32),

    #[error("Quality range must satisfy 0 <= min <= max <= 1, got [{min}, {max}]")]
    InvalidQualityRange { min: f32, max: f32 },

    #[error("Iteration budget must be at least 1")]
    ZeroIterations,
}

/// Soft warning: the output is usable but outside the requested tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeTargetMissed {
    pub achieved_bytes: u64,
    pub target_bytes: u64,
}

impl SizeTargetMissed {
    /// True when the best result was still larger than requested.
    pub fn oversized(&self) -> bool {
        self.achieved_bytes > self.target_bytes
    }
}

impl fmt::Display for SizeTargetMissed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.oversized() { "above" } else { "below" };
        write!(
            f,
            "Closest achievable size is {} bytes, {} the {} byte target",
            self.achieved_bytes, direction, self.target_bytes
        )
    }
}

/// The candidate chosen by [`search_quality`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Encoded bytes of the chosen candidate.
    pub bytes: Vec<u8>,
    /// Quality that produced `bytes`.
    pub quality: f32,
    /// Relative distance of `bytes.len()` from the target.
    pub diff: f64,
    /// Encode calls made.
    pub iterations: u32,
    /// Whether `diff` is within the tolerance.
    pub within_tolerance: bool,
}

impl SearchOutcome {
    /// Encoded size in bytes.
    pub fn achieved_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The soft warning for this outcome, if the target was missed.
    pub fn missed(&self, target: &SizeTarget) -> Option<SizeTargetMissed> {
        (!self.within_tolerance).then(|| SizeTargetMissed {
            achieved_bytes: self.achieved_bytes(),
            target_bytes: target.target_bytes,
        })
    }
}

/// Binary-search the quality that brings `encode(quality).len()` closest to
/// `target.target_bytes`.
///
/// `encode` is called at most `target.max_iterations` times. Its errors abort
/// the search immediately; this is also how callers cancel or report
/// per-iteration progress.
///
/// The target must already be [validated](SizeTarget::validate); an empty
/// iteration budget returns the single probe at the midpoint.
pub fn search_quality<E, F>(target: &SizeTarget, mut encode: F) -> Result<SearchOutcome, E>
where
    F: FnMut(f32) -> Result<Vec<u8>, E>,
{
    let mut low = target.min_quality;
    let mut high = target.max_quality;
    let mut best: Option<SearchOutcome> = None;
    let mut calls = 0;
    let budget = target.max_iterations.max(1);

    while calls < budget {
        calls += 1;
        let mid = (low + high) / 2.0;
        let bytes = encode(mid)?;
        let len = bytes.len() as u64;
        let diff = target.relative_diff(len);
        let within_tolerance = diff <= target.tolerance_ratio as f64;

        debug!(
            "search iteration {calls}/{budget}: q={mid:.4} -> {len} bytes (target {}, diff {diff:.4})",
            target.target_bytes
        );

        let oversized = len > target.target_bytes;
        if best.as_ref().map_or(true, |b| diff < b.diff) {
            best = Some(SearchOutcome {
                bytes,
                quality: mid,
                diff,
                iterations: 0,
                within_tolerance,
            });
        }

        if within_tolerance {
            break;
        }
        if oversized {
            high = mid;
        } else {
            low = mid;
        }
    }

    // The loop runs at least once, so `best` is always populated.
    let mut outcome = best.unwrap_or_else(|| SearchOutcome {
        bytes: Vec::new(),
        quality: low,
        diff: f64::INFINITY,
        iterations: 0,
        within_tolerance: false,
    });
    outcome.iterations = calls;
    Ok(outcome)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::convert::Infallible;

    proptest! {
        /// Property: for a monotone codec and a reachable target, the search
        /// lands in tolerance within the iteration budget.
        #[test]
        fn prop_reachable_targets_converge(
            base in 100usize..5_000,
            slope in 10_000usize..1_000_000,
            t in 0.1f32..0.9,
        ) {
            let codec = |q: f32| Ok::<_, Infallible>(vec![0u8; base + (q * slope as f32) as usize]);
            let target = SizeTarget::new((base + (t * slope as f32) as usize) as u64);

            let mut calls = 0u32;
            let outcome = search_quality(&target, |q| { calls += 1; codec(q) }).unwrap();

            prop_assert!(outcome.within_tolerance, "diff {}", outcome.diff);
            prop_assert!(calls <= target.max_iterations);
        }

        /// Property: probes always stay inside [min_quality, max_quality].
        #[test]
        fn prop_probes_within_range(
            min in 0.0f32..0.5,
            span in 0.0f32..0.5,
            target_bytes in 1u64..200_000,
        ) {
            let target = SizeTarget::new(target_bytes).with_quality_range(min, min + span);
            let mut probes = Vec::new();
            search_quality(&target, |q| {
                probes.push(q);
                Ok::<_, Infallible>(vec![0u8; (q * 100_000.0) as usize])
            }).unwrap();

            for q in probes {
                prop_assert!(q >= target.min_quality && q <= target.max_quality);
            }
        }

        /// Property: the returned candidate is never worse than any probe.
        #[test]
        fn prop_best_candidate_is_closest(target_bytes in 1u64..150_000) {
            let target = SizeTarget::new(target_bytes);
            let mut diffs = Vec::new();
            let outcome = search_quality(&target, |q| {
                let bytes = vec![0u8; 500 + (q * q * 120_000.0) as usize];
                diffs.push(target.relative_diff(bytes.len() as u64));
                Ok::<_, Infallible>(bytes)
            }).unwrap();

            for d in diffs {
                prop_assert!(outcome.diff <= d);
            }
        }
    }
}
