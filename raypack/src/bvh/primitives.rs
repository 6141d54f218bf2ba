use std::ops::Range;

/// Contiguous range `start..end` within a BVH's primitive permutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitivesRef {
    start: u32,
    end: u32,
}

impl PrimitivesRef {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);

        Self { start, end }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn split_at(&self, pivot: u32) -> (Self, Self) {
        debug_assert!(pivot >= self.start && pivot <= self.end);

        (Self::new(self.start, pivot), Self::new(pivot, self.end))
    }

    pub fn as_range(&self) -> Range<usize> {
        let start = self.start as usize;
        let end = self.end as usize;

        start..end
    }
}
