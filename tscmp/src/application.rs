/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
#[cfg(feature = "logging")]
use crate::log_event::LogEvent;

/// A container for the dynamic settings of the timing harness.
///
/// The defaults are tuned to produce a stable verdict on a desktop class machine within a
/// second or two. Lower `samples` for quick smoke checks, raise it when chasing a small leak.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// How many samples to take for each timing group.
    pub samples: usize,
    /// How many back to back comparisons each sample times.
    /// Batching amortizes the resolution of `Instant` over many calls.
    pub batch_size: usize,
    /// The length of the secret and of every candidate buffer, in bytes.
    pub buffer_len: usize,
    /// How many untimed rounds to run before measuring, so caches and frequency scaling settle.
    pub warmup: usize,
    /// The largest tolerated difference between the fastest and slowest group median,
    /// relative to the fastest median.
    pub max_relative_spread: f64,
    /// The largest tolerated absolute Welch's t statistic between the means of any two groups.
    pub max_abs_t: f64,
}
impl Settings {
    /// Default value for `samples`.
    pub const SAMPLES: usize = 2000;
    /// Default value for `batch_size`.
    pub const BATCH_SIZE: usize = 32;
    /// Default value for `buffer_len`.
    /// The default is long enough that the loop dominates the call overhead.
    pub const BUFFER_LEN: usize = 1024;
    /// Default value for `warmup`.
    pub const WARMUP: usize = 200;
    /// Default value for `max_relative_spread`.
    /// The default is 10%.
    pub const MAX_RELATIVE_SPREAD: f64 = 0.10;
    /// Default value for `max_abs_t`.
    /// Constant-time code on a quiet machine stays well below this, an early exit lands far above.
    pub const MAX_ABS_T: f64 = 10.0;
    /// Create an instance of Settings with all default values.
    pub const fn new() -> Self {
        Self {
            samples: Self::SAMPLES,
            batch_size: Self::BATCH_SIZE,
            buffer_len: Self::BUFFER_LEN,
            warmup: Self::WARMUP,
            max_relative_spread: Self::MAX_RELATIVE_SPREAD,
            max_abs_t: Self::MAX_ABS_T,
        }
    }
    /// True if every count is non-zero and both bounds are usable numbers.
    pub fn is_valid(&self) -> bool {
        self.samples > 0
            && self.batch_size > 0
            && self.buffer_len > 0
            && self.max_relative_spread.is_finite()
            && self.max_relative_spread >= 0.0
            && self.max_abs_t.is_finite()
            && self.max_abs_t > 0.0
    }
}
impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait to implement to receive events from this crate.
///
/// Every method has a default so an application only overrides what it cares about.
/// `()` implements this trait and discards everything.
pub trait Application {
    /// Receives a stream of events that occur while comparing or measuring.
    /// These are provided for debugging, logging or metrics purposes, and must be used for
    /// nothing else. Never base an authentication decision upon the events passed to this function.
    #[cfg(feature = "logging")]
    #[allow(unused)]
    fn event_log(&self, event: LogEvent<'_>) {}
}

impl Application for () {}

impl<App: Application + ?Sized> Application for &App {
    #[cfg(feature = "logging")]
    fn event_log(&self, event: LogEvent<'_>) {
        (**self).event_log(event)
    }
}
