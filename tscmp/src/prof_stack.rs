/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
//! The record shape shared with a native sampling profiler.
//!
//! A profiler reads these nodes straight out of memory, so the layout is fixed at exactly three
//! machine words and the tag values never change. Nodes form a singly linked chain owned by the
//! caller; linking a node on top of another transfers no ownership.
//! Nothing in the comparison code reads or writes these.
use std::ptr::NonNull;

/// The kind of frame a stack node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(isize)]
pub enum StackTag {
    Code = 1,
    Blackhole = 2,
    Jitted = 3,
    Jitting = 4,
    Gc = 5,
    Assembler = 6,
}

impl TryFrom<isize> for StackTag {
    type Error = isize;

    fn try_from(kind: isize) -> Result<Self, Self::Error> {
        match kind {
            1 => Ok(Self::Code),
            2 => Ok(Self::Blackhole),
            3 => Ok(Self::Jitted),
            4 => Ok(Self::Jitting),
            5 => Ok(Self::Gc),
            6 => Ok(Self::Assembler),
            _ => Err(kind),
        }
    }
}

/// One node of a profiler call stack.
///
/// `kind` is a full word rather than a `StackTag` so that a node written by foreign code with an
/// unknown kind can still be read.
#[derive(Debug)]
#[repr(C)]
pub struct ProfStackNode {
    /// The node below this one, or `None` at the bottom of the stack.
    pub next: Option<NonNull<ProfStackNode>>,
    pub value: isize,
    pub kind: isize,
}

impl ProfStackNode {
    /// A node at the bottom of a stack.
    pub const fn new(value: isize, tag: StackTag) -> Self {
        Self { next: None, value, kind: tag as isize }
    }

    /// A node linked on top of `prev`.
    /// The caller must keep `prev` alive and in place for as long as this node may be read.
    pub fn on_top_of(prev: &ProfStackNode, value: isize, tag: StackTag) -> Self {
        Self { next: Some(NonNull::from(prev)), value, kind: tag as isize }
    }

    /// The tag of this node, or `None` if `kind` holds an unknown value.
    pub fn tag(&self) -> Option<StackTag> {
        StackTag::try_from(self.kind).ok()
    }

    pub fn is_bottom(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod test {
    use std::mem::{align_of, size_of};

    use super::*;

    #[test]
    fn layout_is_three_words() {
        assert_eq!(size_of::<ProfStackNode>(), 3 * size_of::<usize>());
        assert_eq!(align_of::<ProfStackNode>(), align_of::<usize>());
        assert_eq!(size_of::<Option<NonNull<ProfStackNode>>>(), size_of::<*mut ProfStackNode>());
    }

    #[test]
    fn tag_values_are_stable() {
        assert_eq!(StackTag::Code as isize, 1);
        assert_eq!(StackTag::Blackhole as isize, 2);
        assert_eq!(StackTag::Jitted as isize, 3);
        assert_eq!(StackTag::Jitting as isize, 4);
        assert_eq!(StackTag::Gc as isize, 5);
        assert_eq!(StackTag::Assembler as isize, 6);
        assert_eq!(StackTag::try_from(0), Err(0));
        assert_eq!(StackTag::try_from(7), Err(7));
    }

    #[test]
    fn chain() {
        let bottom = ProfStackNode::new(0x1000, StackTag::Code);
        let top = ProfStackNode::on_top_of(&bottom, 0x2000, StackTag::Jitted);
        assert!(bottom.is_bottom());
        assert!(!top.is_bottom());
        assert_eq!(top.next, Some(NonNull::from(&bottom)));
        assert_eq!(top.tag(), Some(StackTag::Jitted));

        let foreign = ProfStackNode { next: None, value: 0, kind: 42 };
        assert_eq!(foreign.tag(), None);
    }
}
