/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use std::fmt;

/// Which argument of a comparison an error refers to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operand {
    /// The first, caller or attacker supplied operand.
    A,
    /// The second operand, which the comparison loop is bounded by.
    B,
}

/// An error that can occur before a comparison is started.
///
/// A caller must treat every one of these exactly like a `false` comparison result:
/// the inputs did not match and nothing should proceed as authenticated.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum CompareError {
    /// A declared length was negative or larger than the buffer backing it.
    InvalidLength {
        /// The operand whose declared length was rejected.
        operand: Operand,
        /// The length the caller declared.
        declared: isize,
        /// The number of bytes actually available in the backing buffer.
        capacity: usize,
        /// The file of this crate from which this error was generated.
        #[cfg(feature = "debug")]
        file: &'static str,
        /// The line from which this error was generated.
        #[cfg(feature = "debug")]
        line: u32,
    },

    /// A text string was compared against a byte buffer.
    TypeMismatch,

    /// A text operand contained characters outside of ASCII.
    NonAsciiText,

    /// The timing harness was configured with a zero sample count, batch size or buffer length.
    InvalidSettings,
}

macro_rules! invalid_length {
    ($operand:expr, $declared:expr, $capacity:expr) => {
        CompareError::InvalidLength {
            operand: $operand,
            declared: $declared,
            capacity: $capacity,
            #[cfg(feature = "debug")]
            file: file!(),
            #[cfg(feature = "debug")]
            line: line!(),
        }
    };
}
pub(crate) use invalid_length;

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { operand, declared, capacity, .. } => write!(
                f,
                "invalid length {} for operand {:?} backed by {} bytes",
                declared, operand, capacity
            ),
            Self::TypeMismatch => f.write_str("unsupported operand types or combination of types"),
            Self::NonAsciiText => f.write_str("comparing strings with non-ASCII characters is not supported"),
            Self::InvalidSettings => f.write_str("timing settings must be non-zero"),
        }
    }
}

impl std::error::Error for CompareError {}
