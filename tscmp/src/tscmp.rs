/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
//! The constant-time comparison core.
//!
//! The time taken by a comparison depends only on the length of the second operand, `b`,
//! and weakly on whether the two lengths match. It never depends on the content of either
//! buffer or on the position of the first differing byte. Callers should therefore always pass
//! the secret or expected value as `b` and the untrusted value as `a`.
//!
//! # Checking the generated code
//!
//! Unit tests only see results, so the loop should also be read in the compiled output:
//!
//! ```text
//! cargo rustc -p tscmp --release --lib -- --emit asm -C "llvm-args=-x86-asm-syntax=intel"
//! grep -n -A60 'tscmp_raw' target/release/deps/tscmp-*.s
//! ```
//!
//! In `tscmp_raw` expect one byte load per operand per iteration (no vector loads), the
//! accumulator combined with `xor`/`or`, and exactly one conditional branch inside the loop,
//! the one testing the counter against `length` reloaded from its stack slot. A branch taken on
//! the accumulator, or a call to `memcmp`/`bcmp`, means the guarantee has been lost.
use std::hint::black_box;
use std::ptr::{read_volatile, write_volatile};

use crate::result::{invalid_length, CompareError, Operand};

/// Compare the first `len_a` bytes of `a` with the first `len_b` bytes of `b` in constant time.
///
/// Returns `Ok(true)` only if `len_a == len_b` and every one of those bytes is equal.
///
/// Declared lengths are validated against the slices before the timing sensitive part starts.
/// A negative length, or one larger than the slice backing it, is reported as
/// `CompareError::InvalidLength`.
pub fn tscmp(a: &[u8], len_a: isize, b: &[u8], len_b: isize) -> Result<bool, CompareError> {
    let len_a = check_length(Operand::A, a, len_a)?;
    let len_b = check_length(Operand::B, b, len_b)?;
    // Safety: both lengths were checked to be within their slices above.
    Ok(unsafe { tscmp_raw(a.as_ptr(), b.as_ptr(), len_a, len_b) })
}

/// Constant time byte slice equality.
///
/// The slice lengths are used as the declared lengths, so this cannot fail.
/// `b` is the timing reference, just as with `tscmp`.
#[inline]
pub fn secure_eq<A: AsRef<[u8]> + ?Sized, B: AsRef<[u8]> + ?Sized>(a: &A, b: &B) -> bool {
    let (a, b) = (a.as_ref(), b.as_ref());
    // Safety: the lengths are the slices' own lengths.
    unsafe { tscmp_raw(a.as_ptr(), b.as_ptr(), a.len(), b.len()) }
}

/// Validate a declared length against the buffer backing it.
pub(crate) fn check_length(operand: Operand, buf: &[u8], declared: isize) -> Result<usize, CompareError> {
    match usize::try_from(declared) {
        Ok(len) if len <= buf.len() => Ok(len),
        _ => Err(invalid_length!(operand, declared, buf.len())),
    }
}

/// The comparison loop itself.
///
/// Every read and write of `length`, `left` and of the compared bytes goes through a volatile
/// access so the optimizer cannot fold, hoist or shortcut any of it. This function is never
/// inlined so it cannot be specialized on the content of its caller's buffers.
///
/// # Safety
/// `a` must be valid for `len_a` reads and `b` must be valid for `len_b` reads.
#[inline(never)]
unsafe fn tscmp_raw(a: *const u8, b: *const u8, len_a: usize, len_b: usize) -> bool {
    let mut length: usize = 0;
    let mut left: *const u8 = std::ptr::null();
    let mut right: *const u8 = std::ptr::null();
    let mut result: u8 = 1;

    // Loop count depends on the length of b only.
    write_volatile(&mut length, len_b);
    write_volatile(&mut right, b);

    // No `else` here, so the same two tests execute on every call.
    if len_a == read_volatile(&length) {
        write_volatile(&mut left, read_volatile(&a));
        result = 0;
    }
    if len_a != read_volatile(&length) {
        // Walk b against itself so a length mismatch still costs len_b iterations.
        write_volatile(&mut left, b);
        result = 1;
    }

    let mut i = 0;
    while i < read_volatile(&length) {
        let l = read_volatile(read_volatile(&left));
        let r = read_volatile(read_volatile(&right));
        result |= l ^ r;
        write_volatile(&mut left, read_volatile(&left).add(1));
        write_volatile(&mut right, read_volatile(&right).add(1));
        i += 1;
    }

    black_box(result) == 0
}
