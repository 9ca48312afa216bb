/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
//! Timing-safe comparison of secrets.
//!
//! `tscmp` compares two byte buffers in time that depends only on the length of the second one.
//! Pass the secret or expected value second and the untrusted value first. Everything else in
//! this crate is a call site built on that rule.
mod comparator;
mod log_event;

pub mod application;
pub mod digest;
pub mod mac;
pub mod prof_stack;
pub mod result;
pub mod secret;
pub mod timing;
pub mod tscmp;

pub use crate::comparator::Comparator;
pub use crate::digest::{compare_digest, DigestInput};
pub use crate::log_event::*;
pub use crate::result::{CompareError, Operand};
pub use crate::secret::{Secret, SecretBytes};
pub use crate::tscmp::{secure_eq, tscmp};
