//! Content-defined segmentation of child runs.
//!
//! Node boundaries are not chosen by fill factor; they are a pure function
//! of the child ids themselves. Each child contributes the trailing four
//! bytes of its CID — already uniformly random, courtesy of the hash — to a
//! gear-style rolling fingerprint, and a boundary lands wherever the
//! fingerprint clears the mask test. Identical child subsequences therefore
//! produce identical boundaries no matter what surrounds them, which is what
//! lets two trees built from equal content converge on byte-identical nodes.
//!
//! The fingerprint is a 64-bit value kept as two 32-bit limbs, shifted left
//! one bit per child with the child's token added into the low limb and the
//! carry propagated into the high one. The first [`MIN_CHILDREN`] children
//! of every chunk are consumed without a boundary test (warm-up), so chunks
//! are never shorter than `MIN_CHILDREN + 1` except for a final tail; a
//! chunk is force-cut at [`MAX_CHILDREN`] regardless of the fingerprint.
//!
//! Two entry points share the scan:
//! - [`next_boundary`] is total: a tail with no boundary is taken whole.
//!   This is the builder's contract, where the input never grows.
//! - [`find_boundary`] distinguishes a definite cut from a
//!   [`Boundary::Pending`] tail whose segmentation could still change if
//!   more children were appended. Mutation rebuilds use this to decide when
//!   to pull right-hand siblings into the working copy before cutting.

use crate::content_id::ContentId;

/// Fewest children consumed before any boundary test fires.
pub const MIN_CHILDREN: usize = 64;

/// Hard upper bound on children per chunk.
pub const MAX_CHILDREN: usize = 1024;

/// Mask applied to the high fingerprint limb.
const MASK_HI: u32 = 0x8800_0000;

/// Mask applied to the low fingerprint limb.
const MASK_LO: u32 = 0x0300_0000;

/// Outcome of scanning for the next chunk boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Definite boundary: the chunk is `[from, hi)` and no amount of
    /// appended data can change it.
    Cut(usize),
    /// The scan ran out of children before the decision was forced; with
    /// more children appended the outcome could differ.
    Pending,
}

/// Scan for the next boundary after `from`, reporting whether it is final.
///
/// A cut is definite when the mask test fired or the chunk reached
/// [`MAX_CHILDREN`]. Anything else — fewer than [`MIN_CHILDREN`] children
/// remaining, or a mask that never fired before the data ran out — is
/// [`Boundary::Pending`].
pub fn find_boundary(children: &[ContentId], from: usize) -> Boundary {
    let len = children.len();
    debug_assert!(from < len, "scan must start inside the run");
    let available = (len - from).min(MAX_CHILDREN);
    if available < MIN_CHILDREN {
        return Boundary::Pending;
    }

    let mut fhi: u32 = 0;
    let mut flo: u32 = 0;
    for i in 0..available {
        let g = children[from + i].suffix_u32();
        let sum = ((flo as u64) << 1) + g as u64;
        let carry: u32 = if sum > u32::MAX as u64 { 1 } else { 0 };
        flo = sum as u32;
        fhi = fhi.wrapping_shl(1).wrapping_add(carry);
        if i >= MIN_CHILDREN && (fhi & MASK_HI) == 0 && (flo & MASK_LO) == 0 {
            return Boundary::Cut(from + i + 1);
        }
    }

    if available == MAX_CHILDREN {
        Boundary::Cut(from + MAX_CHILDREN)
    } else {
        Boundary::Pending
    }
}

/// Total form of [`find_boundary`]: a pending tail is taken whole.
pub fn next_boundary(children: &[ContentId], from: usize) -> usize {
    match find_boundary(children, from) {
        Boundary::Cut(hi) => hi,
        Boundary::Pending => children.len(),
    }
}
