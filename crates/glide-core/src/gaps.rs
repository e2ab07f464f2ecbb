//! Horizontal gaps: intervals of the vertical scroll axis replayed as
//! horizontal motion of one embedded track

use crate::child::{Bounding, ChildKey, HorizontalRange};
use crate::platform::{ElementHandle, Size};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct GapRange {
    pub owner: ChildKey,
    pub id: Option<String>,
    /// The horizontally translated track
    pub track: ElementHandle,
    pub from: f64,
    pub to: f64,
}

impl GapRange {
    #[inline]
    pub fn width(&self) -> f64 {
        self.to - self.from
    }

    #[inline]
    pub fn contains(&self, pos: f64) -> bool {
        pos >= self.from && pos <= self.to
    }

    pub fn range(&self) -> HorizontalRange {
        HorizontalRange {
            from: self.from,
            to: self.to,
        }
    }
}

/// Ordered, non-overlapping gap ranges
#[derive(Debug, Clone, Default)]
pub struct GapMap {
    ranges: Vec<GapRange>,
}

impl GapMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[GapRange] {
        &self.ranges
    }

    /// Sum of the widths of every registered range
    pub fn total_width(&self) -> f64 {
        self.ranges.iter().map(GapRange::width).sum()
    }

    /// Register the range for a horizontal-scroll child
    ///
    /// The range is centred on the child (`from` is where the child's middle
    /// meets the viewport's middle), shifted by every earlier range, and spans
    /// the track's overflow width. Ranges must arrive in ascending order and
    /// must not overlap; empty or overlapping ranges are rejected.
    pub fn register(
        &mut self,
        owner: ChildKey,
        id: Option<String>,
        track: ElementHandle,
        bounding: Bounding,
        track_width: f64,
        window: Size,
    ) -> Result<HorizontalRange> {
        let previous = self.total_width();
        let from = previous + bounding.top + bounding.height * 0.5 - window.height * 0.5;
        let to = from + track_width - window.width;

        if to <= from {
            return Err(Error::DegenerateGap { from, to });
        }
        if let Some(last) = self.ranges.last() {
            if from <= last.to {
                return Err(Error::GapOverlap {
                    from,
                    to,
                    previous_to: last.to,
                });
            }
        }

        let gap = GapRange {
            owner,
            id,
            track,
            from,
            to,
        };
        let range = gap.range();
        tracing::debug!(from, to, "Registered horizontal gap");
        self.ranges.push(gap);
        Ok(range)
    }

    /// Total width of the gaps fully behind `pos`
    pub fn horizontal_offset(&self, pos: f64) -> f64 {
        self.ranges
            .iter()
            .filter(|gap| gap.to < pos)
            .map(GapRange::width)
            .sum()
    }

    /// First gap containing `pos`
    pub fn lookup(&self, pos: f64) -> Option<&GapRange> {
        self.ranges.iter().find(|gap| gap.contains(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<ChildKey> {
        let mut arena: SlotMap<ChildKey, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    const WINDOW: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    fn bounding(top: f64, height: f64) -> Bounding {
        Bounding { top, height }
    }

    #[test]
    fn test_register_centres_range_on_child() {
        let k = keys(1);
        let mut gaps = GapMap::new();
        let range = gaps
            .register(k[0], None, ElementHandle::new(1), bounding(2000.0, 800.0), 3000.0, WINDOW)
            .unwrap();
        // 2000 + 400 - 400
        assert_eq!(range.from, 2000.0);
        assert_eq!(range.to, 4000.0);
    }

    #[test]
    fn test_later_ranges_shift_by_previous_widths() {
        let k = keys(2);
        let mut gaps = GapMap::new();
        gaps.register(k[0], None, ElementHandle::new(1), bounding(1000.0, 800.0), 2000.0, WINDOW)
            .unwrap();
        let second = gaps
            .register(k[1], None, ElementHandle::new(2), bounding(3000.0, 800.0), 1500.0, WINDOW)
            .unwrap();
        // first width 1000, so 1000 + 3000 + 400 - 400
        assert_eq!(second.from, 4000.0);
        assert_eq!(second.to, 4500.0);
        assert_eq!(gaps.total_width(), 1500.0);
    }

    #[test]
    fn test_rejects_degenerate_range() {
        let k = keys(1);
        let mut gaps = GapMap::new();
        let err = gaps
            .register(k[0], None, ElementHandle::new(1), bounding(0.0, 800.0), 900.0, WINDOW)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateGap { .. }));
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_rejects_out_of_order_range() {
        let k = keys(2);
        let mut gaps = GapMap::new();
        gaps.register(k[0], None, ElementHandle::new(1), bounding(3000.0, 800.0), 3000.0, WINDOW)
            .unwrap();
        let err = gaps
            .register(k[1], None, ElementHandle::new(2), bounding(100.0, 800.0), 3000.0, WINDOW)
            .unwrap_err();
        assert!(matches!(err, Error::GapOverlap { .. }));
        assert_eq!(gaps.len(), 1);
    }

    #[test]
    fn test_lookup_first_match() {
        let k = keys(2);
        let mut gaps = GapMap::new();
        gaps.register(k[0], None, ElementHandle::new(1), bounding(1000.0, 800.0), 2000.0, WINDOW)
            .unwrap();
        gaps.register(k[1], None, ElementHandle::new(2), bounding(3000.0, 800.0), 1500.0, WINDOW)
            .unwrap();

        assert!(gaps.lookup(999.0).is_none());
        assert_eq!(gaps.lookup(1000.0).map(|g| g.owner), Some(k[0]));
        assert_eq!(gaps.lookup(2000.0).map(|g| g.owner), Some(k[0]));
        assert!(gaps.lookup(3000.0).is_none());
        assert_eq!(gaps.lookup(4200.0).map(|g| g.owner), Some(k[1]));
    }

    #[test]
    fn test_horizontal_offset_monotonic_and_exact() {
        let k = keys(2);
        let mut gaps = GapMap::new();
        gaps.register(k[0], None, ElementHandle::new(1), bounding(1000.0, 800.0), 2000.0, WINDOW)
            .unwrap();
        gaps.register(k[1], None, ElementHandle::new(2), bounding(3000.0, 800.0), 1500.0, WINDOW)
            .unwrap();

        let mut last = 0.0;
        let mut pos = 0.0;
        while pos < 6000.0 {
            if gaps.lookup(pos).is_none() {
                let offset = gaps.horizontal_offset(pos);
                assert!(offset >= last, "offset decreased at {}", pos);
                let expected: f64 = gaps
                    .ranges()
                    .iter()
                    .filter(|g| g.to < pos)
                    .map(|g| g.width())
                    .sum();
                assert_eq!(offset, expected);
                last = offset;
            }
            pos += 37.0;
        }
        assert_eq!(gaps.horizontal_offset(5000.0), 1500.0);
        assert_eq!(gaps.horizontal_offset(2500.0), 1000.0);
        assert_eq!(gaps.horizontal_offset(500.0), 0.0);
    }
}
