/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use crate::result::CompareError;
use crate::tscmp::tscmp;

/// One operand of `compare_digest`.
///
/// Text and byte buffers are both accepted, but never mixed within one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestInput<'a> {
    /// A text string. Only ASCII text may be compared.
    Text(&'a str),
    /// An arbitrary byte buffer.
    Bytes(&'a [u8]),
}

impl<'a> DigestInput<'a> {
    fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Self::Text(s) => s.as_bytes(),
            Self::Bytes(b) => b,
        }
    }
}

impl<'a> From<&'a str> for DigestInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}
impl<'a> From<&'a String> for DigestInput<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}
impl<'a> From<&'a [u8]> for DigestInput<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}
impl<'a, const N: usize> From<&'a [u8; N]> for DigestInput<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Bytes(b)
    }
}
impl<'a> From<&'a Vec<u8>> for DigestInput<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// Return whether `a` and `b` are equal, taking time independent of where they differ.
///
/// Both operands must be text or both must be bytes; text must be pure ASCII.
/// These checks happen before the comparison starts and reject the call with
/// `CompareError::TypeMismatch` or `CompareError::NonAsciiText`.
///
/// `b` should be the expected digest and `a` the one received from outside.
pub fn compare_digest<'a, 'b>(
    a: impl Into<DigestInput<'a>>,
    b: impl Into<DigestInput<'b>>,
) -> Result<bool, CompareError> {
    let (a, b) = check_inputs(a.into(), b.into())?;
    tscmp(a, a.len() as isize, b, b.len() as isize)
}

pub(crate) fn check_inputs<'a, 'b>(
    a: DigestInput<'a>,
    b: DigestInput<'b>,
) -> Result<(&'a [u8], &'b [u8]), CompareError> {
    match (a, b) {
        (DigestInput::Text(x), DigestInput::Text(y)) => {
            if !x.is_ascii() || !y.is_ascii() {
                return Err(CompareError::NonAsciiText);
            }
        }
        (DigestInput::Bytes(_), DigestInput::Bytes(_)) => {}
        _ => return Err(CompareError::TypeMismatch),
    }
    Ok((a.as_bytes(), b.as_bytes()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_digests() {
        assert_eq!(compare_digest("secret123", "secret123"), Ok(true));
        assert_eq!(compare_digest("secret124", "secret123"), Ok(false));
        assert_eq!(compare_digest("short", "shorter"), Ok(false));
        assert_eq!(compare_digest("", ""), Ok(true));
        let owned = String::from("abc");
        assert_eq!(compare_digest(&owned, "abc"), Ok(true));
    }

    #[test]
    fn byte_digests() {
        assert_eq!(compare_digest(b"\x00\xff\x10", b"\x00\xff\x10"), Ok(true));
        assert_eq!(compare_digest(&b"\x00\xff\x10"[..], &vec![0u8, 0xff, 0x11]), Ok(false));
        // Bytes are not restricted to ASCII.
        assert_eq!(compare_digest("é".as_bytes(), "é".as_bytes()), Ok(true));
    }

    #[test]
    fn non_ascii_text_is_rejected() {
        assert_eq!(compare_digest("é", "é"), Err(CompareError::NonAsciiText));
        assert_eq!(compare_digest("abc", "abé"), Err(CompareError::NonAsciiText));
        assert_eq!(compare_digest("ab\u{80}", "abc"), Err(CompareError::NonAsciiText));
    }

    #[test]
    fn mixed_types_are_rejected() {
        assert_eq!(compare_digest("abc", b"abc"), Err(CompareError::TypeMismatch));
        assert_eq!(compare_digest(b"abc", "abc"), Err(CompareError::TypeMismatch));
        // Mixing is checked before ASCII.
        assert_eq!(compare_digest("é", b"abc"), Err(CompareError::TypeMismatch));
    }
}
