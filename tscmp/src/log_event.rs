/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use crate::result::CompareError;
use crate::timing::{TimingGroup, TimingReport};

/// Events that might be interesting to log or aggregate into metrics.
///
/// None of these are ever emitted from inside the constant-time loop. Rejections are
/// reported at the entry gate, before any secret dependent work has started.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum LogEvent<'a> {
    /// A comparison was refused before it started.
    Rejected(&'a CompareError),
    /// A comparison ran to completion, `(len_b, matched)`.
    Compared(usize, bool),
    /// A received MAC tag had a different length from the expected tag, `(received, expected)`.
    MacTagLengthMismatch(usize, usize),
    /// `(group, samples_taken)`
    TimingGroupMeasured(TimingGroup, usize),
    TimingReportReady(&'a TimingReport),
}
