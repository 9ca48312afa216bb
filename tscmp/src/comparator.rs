/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use rand_core::RngCore;

use crate::application::{Application, Settings};
use crate::digest::{self, DigestInput};
use crate::mac::{self, SHA512_HASH_SIZE};
use crate::result::CompareError;
use crate::timing::{self, TimingReport};
use crate::tscmp;
#[cfg(feature = "logging")]
use crate::LogEvent::*;

/// Macro to turn off logging at compile time.
macro_rules! log {
    ($app:expr, $event:expr) => {
        #[cfg(feature = "logging")]
        $app.event_log($event);
    };
}
pub(crate) use log;

/// The comparison operations of this crate bound to an application that receives their events.
///
/// Events are only ever emitted before a comparison starts or after it has finished.
/// With the `logging` feature disabled this compiles down to the free functions.
pub struct Comparator<App: Application = ()> {
    app: App,
}

impl Default for Comparator<()> {
    fn default() -> Self {
        Self { app: () }
    }
}

impl<App: Application> Comparator<App> {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// See `tscmp::tscmp`.
    pub fn tscmp(&self, a: &[u8], len_a: isize, b: &[u8], len_b: isize) -> Result<bool, CompareError> {
        self.finish(tscmp::tscmp(a, len_a, b, len_b), len_b)
    }

    /// See `digest::compare_digest`.
    pub fn compare_digest<'a, 'b>(
        &self,
        a: impl Into<DigestInput<'a>>,
        b: impl Into<DigestInput<'b>>,
    ) -> Result<bool, CompareError> {
        match digest::check_inputs(a.into(), b.into()) {
            Ok((a, b)) => self.tscmp(a, a.len() as isize, b, b.len() as isize),
            Err(e) => self.finish(Err(e), 0),
        }
    }

    /// See `mac::verify_hmac_sha512`.
    pub fn verify_hmac_sha512(&self, key: &[u8], data: &[u8], tag: &[u8]) -> bool {
        if tag.len() != SHA512_HASH_SIZE {
            log!(self.app, MacTagLengthMismatch(tag.len(), SHA512_HASH_SIZE));
        }
        let matched = mac::verify_hmac_sha512(key, data, tag);
        log!(self.app, Compared(SHA512_HASH_SIZE, matched));
        matched
    }

    /// See `timing::measure`.
    pub fn measure_timing<R: RngCore>(&self, settings: &Settings, rng: &mut R) -> Result<TimingReport, CompareError> {
        timing::measure_with(settings, rng, &self.app)
    }

    #[allow(unused_variables)]
    fn finish(&self, result: Result<bool, CompareError>, len_b: isize) -> Result<bool, CompareError> {
        match &result {
            Ok(matched) => {
                log!(self.app, Compared(len_b as usize, *matched));
            }
            Err(e) => {
                log!(self.app, Rejected(e));
            }
        }
        result
    }
}
