/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
//! Empirical check of the timing contract.
//!
//! Three groups of candidates are compared against the same random secret: an identical copy,
//! a copy differing only in its first byte, and a copy differing only in its last byte.
//! An early-exit comparison would make the first-byte group measurably faster than the other
//! two. The groups are measured in a random interleaved order so drift in clock speed or load
//! spreads evenly over all of them.
//!
//! A run passes only if the groups agree on both counts: the group means must not be
//! statistically distinguishable (every pairwise Welch's t within `Settings::max_abs_t`), and the
//! group medians must lie within `Settings::max_relative_spread` of each other. The mean test
//! catches a leak confined to part of the samples, the median test a shift of the whole group.
use std::hint::black_box;
use std::time::Instant;

use rand_core::RngCore;

use crate::application::{Application, Settings};
use crate::comparator::log;
use crate::result::CompareError;
use crate::tscmp::secure_eq;
#[cfg(feature = "logging")]
use crate::LogEvent::*;

/// The kind of candidate a timing sample was taken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingGroup {
    Identical,
    FirstByteDiffers,
    LastByteDiffers,
}
impl TimingGroup {
    pub const ALL: [TimingGroup; 3] = [Self::Identical, Self::FirstByteDiffers, Self::LastByteDiffers];

    /// Build a candidate of this group for `secret`, which must not be empty.
    fn candidate(self, secret: &[u8]) -> Vec<u8> {
        let mut c = secret.to_vec();
        match self {
            Self::Identical => {}
            Self::FirstByteDiffers => c[0] ^= 0xff,
            Self::LastByteDiffers => c[secret.len() - 1] ^= 0xff,
        }
        c
    }
}

/// Summary statistics for one timing group, in nanoseconds per comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group: TimingGroup,
    pub samples: usize,
    pub median_ns: f64,
    pub mean_ns: f64,
    pub std_dev_ns: f64,
}
impl GroupStats {
    fn new(group: TimingGroup, mut samples: Vec<f64>) -> Self {
        samples.sort_by(f64::total_cmp);
        let n = samples.len();
        let median_ns = if n == 0 {
            0.0
        } else if n % 2 == 1 {
            samples[n / 2]
        } else {
            (samples[n / 2 - 1] + samples[n / 2]) / 2.0
        };
        let mean_ns = if n == 0 { 0.0 } else { samples.iter().sum::<f64>() / n as f64 };
        let variance = if n < 2 {
            0.0
        } else {
            samples.iter().map(|x| (x - mean_ns) * (x - mean_ns)).sum::<f64>() / (n - 1) as f64
        };
        Self { group, samples: n, median_ns, mean_ns, std_dev_ns: variance.sqrt() }
    }
}

/// Welch's t statistic for the difference of two group means.
pub fn welch_t(x: &GroupStats, y: &GroupStats) -> f64 {
    let se2 = x.std_dev_ns * x.std_dev_ns / x.samples.max(1) as f64
        + y.std_dev_ns * y.std_dev_ns / y.samples.max(1) as f64;
    let diff = x.mean_ns - y.mean_ns;
    if se2 > 0.0 {
        diff / se2.sqrt()
    } else if diff == 0.0 {
        0.0
    } else {
        diff.signum() * f64::INFINITY
    }
}

/// The outcome of one run of the timing harness.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    /// Statistics in the order of `TimingGroup::ALL`.
    pub groups: [GroupStats; 3],
    /// `(max_median - min_median) / min_median` over all groups.
    pub relative_spread: f64,
    /// True if `max_abs_t()` is within `Settings::max_abs_t` and `relative_spread` is within
    /// `Settings::max_relative_spread`.
    pub passed: bool,
}
impl TimingReport {
    fn new(groups: [GroupStats; 3], settings: &Settings) -> Self {
        let relative_spread = relative_spread(&groups);
        let mut report = Self { groups, relative_spread, passed: false };
        report.passed = report.max_abs_t() <= settings.max_abs_t && relative_spread <= settings.max_relative_spread;
        report
    }

    pub fn group(&self, group: TimingGroup) -> &GroupStats {
        match group {
            TimingGroup::Identical => &self.groups[0],
            TimingGroup::FirstByteDiffers => &self.groups[1],
            TimingGroup::LastByteDiffers => &self.groups[2],
        }
    }

    /// Welch's t statistic for every pair of groups.
    pub fn welch_t(&self) -> [(TimingGroup, TimingGroup, f64); 3] {
        let [a, b, c] = &self.groups;
        [(a.group, b.group, welch_t(a, b)), (a.group, c.group, welch_t(a, c)), (b.group, c.group, welch_t(b, c))]
    }

    /// The largest absolute Welch's t statistic over all pairs of groups.
    /// This is very sensitive, values of a few units are expected on a noisy machine.
    pub fn max_abs_t(&self) -> f64 {
        self.welch_t().iter().map(|(_, _, t)| t.abs()).fold(0.0, f64::max)
    }
}

/// Measure the comparison with the given settings. See the module documentation.
pub fn measure<R: RngCore>(settings: &Settings, rng: &mut R) -> Result<TimingReport, CompareError> {
    measure_with(settings, rng, &())
}

/// Same as `measure`, reporting progress to `app`.
pub fn measure_with<R: RngCore, App: Application + ?Sized>(
    settings: &Settings,
    rng: &mut R,
    app: &App,
) -> Result<TimingReport, CompareError> {
    measure_fn(settings, rng, app, |a, b| secure_eq(a, b))
}

/// Measure an arbitrary comparison function `compare(candidate, secret)` the same way.
///
/// This is how a comparison other than the one in this crate can be checked, and how the
/// harness itself is checked against a comparison known to exit early.
#[allow(unused_variables)]
pub fn measure_fn<R: RngCore, App: Application + ?Sized, F: Fn(&[u8], &[u8]) -> bool>(
    settings: &Settings,
    rng: &mut R,
    app: &App,
    compare: F,
) -> Result<TimingReport, CompareError> {
    if !settings.is_valid() {
        return Err(CompareError::InvalidSettings);
    }
    let mut secret = vec![0u8; settings.buffer_len];
    rng.fill_bytes(&mut secret);
    let candidates = TimingGroup::ALL.map(|g| g.candidate(&secret));

    let mut samples: [Vec<f64>; 3] = Default::default();
    for s in samples.iter_mut() {
        s.reserve_exact(settings.samples);
    }
    let mut order = [0usize, 1, 2];
    for round in 0..settings.warmup + settings.samples {
        shuffle(&mut order, rng);
        for &g in order.iter() {
            let candidate = candidates[g].as_slice();
            let start = Instant::now();
            for _ in 0..settings.batch_size {
                black_box(compare(black_box(candidate), black_box(secret.as_slice())));
            }
            let elapsed = start.elapsed();
            if round >= settings.warmup {
                samples[g].push(elapsed.as_nanos() as f64 / settings.batch_size as f64);
            }
        }
    }

    let mut i = 0;
    let groups = samples.map(|s| {
        let stats = GroupStats::new(TimingGroup::ALL[i], s);
        i += 1;
        log!(app, TimingGroupMeasured(stats.group, stats.samples));
        stats
    });
    let report = TimingReport::new(groups, settings);
    log!(app, TimingReportReady(&report));
    Ok(report)
}

fn relative_spread(groups: &[GroupStats; 3]) -> f64 {
    let min = groups.iter().map(|g| g.median_ns).fold(f64::INFINITY, f64::min);
    let max = groups.iter().map(|g| g.median_ns).fold(0.0, f64::max);
    if min > 0.0 {
        (max - min) / min
    } else if max == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Fisher-Yates shuffle.
fn shuffle<R: RngCore>(order: &mut [usize; 3], rng: &mut R) {
    for i in (1..order.len()).rev() {
        let j = rng.next_u32() as usize % (i + 1);
        order.swap(i, j);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn invalid_settings_are_rejected() {
        let zero_samples = Settings { samples: 0, ..Settings::new() };
        assert_eq!(measure(&zero_samples, &mut OsRng), Err(CompareError::InvalidSettings));
        let zero_len = Settings { buffer_len: 0, ..Settings::new() };
        assert_eq!(measure(&zero_len, &mut OsRng), Err(CompareError::InvalidSettings));
        let nan = Settings { max_relative_spread: f64::NAN, ..Settings::new() };
        assert_eq!(measure(&nan, &mut OsRng), Err(CompareError::InvalidSettings));
        let zero_t = Settings { max_abs_t: 0.0, ..Settings::new() };
        assert_eq!(measure(&zero_t, &mut OsRng), Err(CompareError::InvalidSettings));
    }

    #[test]
    fn candidates() {
        let secret = [1u8, 2, 3, 4];
        assert_eq!(TimingGroup::Identical.candidate(&secret), vec![1, 2, 3, 4]);
        assert_eq!(TimingGroup::FirstByteDiffers.candidate(&secret), vec![0xfe, 2, 3, 4]);
        assert_eq!(TimingGroup::LastByteDiffers.candidate(&secret), vec![1, 2, 3, 0xfb]);
    }

    #[test]
    fn group_stats() {
        let s = GroupStats::new(TimingGroup::Identical, vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.samples, 4);
        assert_eq!(s.median_ns, 2.5);
        assert_eq!(s.mean_ns, 2.5);
        assert!((s.std_dev_ns - (5.0f64 / 3.0).sqrt()).abs() < 1e-9);

        let flat = GroupStats::new(TimingGroup::FirstByteDiffers, vec![2.0; 5]);
        assert_eq!(welch_t(&flat, &flat), 0.0);
    }

    #[test]
    fn spread() {
        let g = |m: f64| GroupStats { group: TimingGroup::Identical, samples: 1, median_ns: m, mean_ns: m, std_dev_ns: 0.0 };
        assert_eq!(relative_spread(&[g(100.0), g(110.0), g(105.0)]), 0.1);
        assert_eq!(relative_spread(&[g(0.0), g(0.0), g(0.0)]), 0.0);
        assert_eq!(relative_spread(&[g(0.0), g(1.0), g(0.0)]), f64::INFINITY);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut order = [0usize, 1, 2];
        for _ in 0..100 {
            shuffle(&mut order, &mut OsRng);
            let mut sorted = order;
            sorted.sort();
            assert_eq!(sorted, [0, 1, 2]);
        }
    }

    #[test]
    fn slow_tail_in_one_group_fails() {
        // Same median everywhere, but 40% of the first-byte samples are much slower.
        let base = |i: usize| 100.0 + (i % 3) as f64;
        let flat: Vec<f64> = (0..1000).map(base).collect();
        let tail: Vec<f64> = (0..1000).map(|i| if i % 5 < 2 { 500.0 } else { base(i) }).collect();
        let groups = [
            GroupStats::new(TimingGroup::Identical, flat.clone()),
            GroupStats::new(TimingGroup::FirstByteDiffers, tail),
            GroupStats::new(TimingGroup::LastByteDiffers, flat.clone()),
        ];
        let report = TimingReport::new(groups, &Settings::new());
        assert!(report.relative_spread <= Settings::MAX_RELATIVE_SPREAD);
        assert!(report.max_abs_t() > Settings::MAX_ABS_T);
        assert!(!report.passed);

        let same = [
            GroupStats::new(TimingGroup::Identical, flat.clone()),
            GroupStats::new(TimingGroup::FirstByteDiffers, flat.clone()),
            GroupStats::new(TimingGroup::LastByteDiffers, flat),
        ];
        let report = TimingReport::new(same, &Settings::new());
        assert_eq!(report.max_abs_t(), 0.0);
        assert!(report.passed);
    }

    #[test]
    fn mismatch_position_does_not_change_timing() {
        let settings = Settings {
            samples: 400,
            batch_size: 16,
            buffer_len: 4096,
            warmup: 50,
            max_relative_spread: 0.2,
            ..Settings::new()
        };
        let report = measure(&settings, &mut OsRng).unwrap();
        for (i, g) in TimingGroup::ALL.iter().enumerate() {
            assert_eq!(report.groups[i].group, *g);
            assert_eq!(report.group(*g).samples, 400);
            assert!(report.group(*g).median_ns > 0.0);
        }
        assert!(report.passed, "timing groups are distinguishable: {:?}", report);
    }

    #[test]
    fn early_exit_comparison_is_caught() {
        let settings = Settings { samples: 200, batch_size: 64, buffer_len: 1 << 16, warmup: 20, ..Settings::new() };
        let report = measure_fn(&settings, &mut OsRng, &(), |a, b| a == b).unwrap();
        assert!(
            report.group(TimingGroup::FirstByteDiffers).median_ns < report.group(TimingGroup::Identical).median_ns,
            "{:?}",
            report
        );
        assert!(!report.passed, "early exit not detected: {:?}", report);
    }
}
