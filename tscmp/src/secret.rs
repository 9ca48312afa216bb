/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use zeroize::{Zeroize, Zeroizing};

use crate::tscmp::secure_eq;

/// Container for fixed size secrets that clears them on drop.
///
/// Every comparison made through this type passes the secret as the timing reference,
/// so the time taken only ever depends on the length of the secret.
#[derive(Clone)]
#[repr(transparent)]
pub struct Secret<const L: usize>(pub [u8; L]);

impl<const L: usize> Secret<L> {
    /// Create a new all-zero secret.
    #[inline(always)]
    pub fn new() -> Self {
        Self([0_u8; L])
    }

    /// Copy bytes into a secret, then wipe the source.
    /// Returns `None` and leaves the source untouched if the slice is not exactly `L` bytes long.
    pub fn from_bytes_then_delete(b: &mut [u8]) -> Option<Self> {
        let ret = Self(b.try_into().ok()?);
        b.zeroize();
        Some(ret)
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8; L] {
        &self.0
    }

    /// Get the first N bytes of this secret as a fixed length array.
    /// Asking for more than `L` bytes fails to compile.
    #[inline(always)]
    pub fn first_n<const N: usize>(&self) -> &[u8; N] {
        const { assert!(N <= L) };
        unsafe { &*self.0.as_ptr().cast() }
    }

    /// Check an untrusted candidate against this secret in constant time.
    pub fn verify(&self, candidate: &[u8]) -> bool {
        secure_eq(candidate, &self.0)
    }
}

impl<const L: usize> Drop for Secret<L> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<const L: usize> Default for Secret<L> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<const L: usize> AsRef<[u8]> for Secret<L> {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const L: usize> PartialEq for Secret<L> {
    fn eq(&self, other: &Self) -> bool {
        secure_eq(&self.0, &other.0)
    }
}
impl<const L: usize> Eq for Secret<L> {}

impl<const L: usize> std::fmt::Debug for Secret<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret<{}>(..)", L)
    }
}

/// Variable length secret, such as an API key or session token, that is cleared on drop.
#[derive(Clone)]
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check an untrusted candidate against this secret.
    /// A candidate of the wrong length is rejected in the same time as a wrong candidate of the
    /// right length.
    pub fn verify(&self, candidate: &[u8]) -> bool {
        secure_eq(candidate, self.0.as_slice())
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(b: &[u8]) -> Self {
        Self::new(b.to_vec())
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        secure_eq(self.0.as_slice(), other.0.as_slice())
    }
}
impl Eq for SecretBytes {}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes({} bytes)", self.0.len())
    }
}
