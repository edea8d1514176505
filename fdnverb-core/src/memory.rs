//! Reservation table: one ring buffer carved into named delay lines.
//!
//! A [`Layout`] is computed once (usually in a `const` item) from a list of
//! segment lengths. Segments are placed in table order; each one starts one
//! guard sample after the previous segment ends, so reading a line at its
//! oldest tap never aliases the neighbour's newest write.
//!
//! ```
//! use fdnverb_core::memory::Layout;
//!
//! const LAYOUT: Layout<3> = match Layout::try_new([16, 32, 64], 256) {
//!     Ok(layout) => layout,
//!     Err(_) => panic!("delay lines do not fit"),
//! };
//! assert_eq!(LAYOUT.line(1).base(), 17);
//! assert_eq!(LAYOUT.footprint(), 115);
//! ```

use thiserror::Error;

/// Handle to one segment of the ring buffer. Holds no storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DelayLine {
    base: usize,
    length: usize,
}

impl DelayLine {
    /// Build a handle by hand. Prefer [`Layout`], which guarantees segments
    /// do not overlap.
    #[inline]
    pub const fn new(base: usize, length: usize) -> Self {
        Self { base, length }
    }

    #[inline]
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Offset of the oldest sample held by the line (`length - 1`, or 0 for
    /// an empty hand-built handle).
    #[inline]
    pub const fn tail(&self) -> usize {
        self.length.saturating_sub(1)
    }

    /// One past the last slot of the segment.
    #[inline]
    pub const fn end(&self) -> usize {
        self.base + self.length
    }
}

/// Why a set of delay lengths cannot be laid out in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("delay line {index} has zero length")]
    EmptySegment { index: usize },

    #[error("delay lines need {required} samples (guards included) but the buffer holds {capacity}")]
    Overflow { required: usize, capacity: usize },

    #[error("buffer capacity {capacity} is not a power of two")]
    CapacityNotPowerOfTwo { capacity: usize },
}

/// `K` delay lines packed into a buffer, with one guard sample after each.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout<const K: usize> {
    lines: [DelayLine; K],
    footprint: usize,
}

impl<const K: usize> Layout<K> {
    /// Place `lengths` in order inside a buffer of `capacity` samples.
    pub const fn try_new(lengths: [usize; K], capacity: usize) -> Result<Self, LayoutError> {
        if !capacity.is_power_of_two() {
            return Err(LayoutError::CapacityNotPowerOfTwo { capacity });
        }

        let mut lines = [DelayLine::new(0, 0); K];
        let mut base = 0;
        let mut i = 0;
        while i < K {
            if lengths[i] == 0 {
                return Err(LayoutError::EmptySegment { index: i });
            }
            lines[i] = DelayLine::new(base, lengths[i]);
            base += lengths[i] + 1;
            i += 1;
        }

        if base > capacity {
            return Err(LayoutError::Overflow { required: base, capacity });
        }
        Ok(Self { lines, footprint: base })
    }

    #[inline]
    pub const fn line(&self, index: usize) -> DelayLine {
        self.lines[index]
    }

    #[inline]
    pub const fn lines(&self) -> &[DelayLine; K] {
        &self.lines
    }

    /// Samples used by all segments plus their guards.
    #[inline]
    pub const fn footprint(&self) -> usize {
        self.footprint
    }

    #[inline]
    pub const fn len(&self) -> usize {
        K
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        K == 0
    }
}
