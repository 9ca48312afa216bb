/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::secret::{Secret, SecretBytes};
use crate::tscmp::secure_eq;

/// The size of a SHA512 hash, which is always 64 bytes
pub const SHA512_HASH_SIZE: usize = 64;

/// Pure function for computing a single HMAC-SHA-512 tag.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Secret<SHA512_HASH_SIZE> {
    let mut hm = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts keys of any length");
    hm.update(data);
    Secret(hm.finalize().into_bytes().into())
}

/// Check a received tag against the HMAC-SHA-512 of `data` under `key`.
///
/// The locally computed tag is the timing reference, so the time taken does not depend on the
/// received tag. Truncated or oversized tags are rejected after the same full-length walk.
pub fn verify_hmac_sha512(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let expected = hmac_sha512(key, data);
    secure_eq(tag, &expected)
}

/// A keyed HMAC-SHA-512 verifier for checking many messages under the same key.
/// The key is wiped when the verifier is dropped.
pub struct HmacSha512Verifier {
    key: SecretBytes,
}

impl HmacSha512Verifier {
    pub fn new(key: &[u8]) -> Self {
        Self { key: SecretBytes::from(key) }
    }

    pub fn tag(&self, data: &[u8]) -> Secret<SHA512_HASH_SIZE> {
        hmac_sha512(self.key.as_ref(), data)
    }

    /// See `verify_hmac_sha512`.
    pub fn verify(&self, data: &[u8], tag: &[u8]) -> bool {
        self.tag(data).verify(tag)
    }

    /// Check a tag truncated to its first `N` bytes, such as the 32 byte HMAC-SHA-512/256.
    /// A tag of any other length is rejected.
    pub fn verify_truncated<const N: usize>(&self, data: &[u8], tag: &[u8]) -> bool {
        let expected = self.tag(data);
        secure_eq(tag, expected.first_n::<N>())
    }
}
