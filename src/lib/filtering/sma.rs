use num_traits::{Num, NumAssignOps, NumCast, Signed};

/// Simple moving average over the last `SIZE` samples, kept as a ring
/// buffer with a running sum.
///
/// [`SmaFilter::filtered`] stays `None` until the window has been filled
/// once; [`SmaFilter::mean`] averages whatever has been seen so far.
pub struct SmaFilter<ItemT, const SIZE: usize> {
    window: [ItemT; SIZE],
    next: usize,
    seen: usize,
    sum: ItemT,
}
impl<ItemT, const SIZE: usize> SmaFilter<ItemT, SIZE>
where
    ItemT: Num + NumAssignOps + NumCast + Signed + core::marker::Copy,
{
    pub fn new() -> SmaFilter<ItemT, SIZE> {
        SmaFilter::default()
    }

    pub fn reset(&mut self) {
        *self = SmaFilter::default();
    }

    pub fn insert(&mut self, sample: ItemT) {
        if SIZE == 0 {
            return;
        }
        let evicted = core::mem::replace(&mut self.window[self.next], sample);
        self.sum += sample - evicted;
        self.next = (self.next + 1) % SIZE;
        self.seen = (self.seen + 1).min(SIZE);
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.seen
    }

    pub fn is_empty(&self) -> bool {
        self.seen == 0
    }

    pub fn is_full(&self) -> bool {
        SIZE > 0 && self.seen == SIZE
    }

    /// Average of the full window.
    pub fn filtered(&self) -> Option<ItemT> {
        if self.is_full() {
            self.mean()
        } else {
            None
        }
    }

    /// Average of the samples seen so far, `None` before the first one.
    pub fn mean(&self) -> Option<ItemT> {
        if self.is_empty() {
            return None;
        }
        ItemT::from(self.seen).map(|n| self.sum / n)
    }
}

impl<ItemT, const SIZE: usize> Default for SmaFilter<ItemT, SIZE>
where
    ItemT: Num + NumAssignOps + NumCast + core::marker::Copy,
{
    fn default() -> SmaFilter<ItemT, SIZE> {
        SmaFilter {
            window: [ItemT::zero(); SIZE],
            next: 0,
            seen: 0,
            sum: ItemT::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_window_filled() {
        let mut sma = SmaFilter::<f32, 4>::new();
        assert_eq!(sma.mean(), None);
        for v in [1.0, 2.0, 3.0] {
            sma.insert(v);
            assert!(sma.filtered().is_none());
        }
        assert_eq!(sma.mean(), Some(2.0));
        sma.insert(6.0);
        assert_eq!(sma.filtered(), Some(3.0));
    }

    #[test]
    fn oldest_sample_drops_out() {
        let mut sma = SmaFilter::<i32, 2>::new();
        sma.insert(2);
        sma.insert(4);
        sma.insert(10);
        assert_eq!(sma.len(), 2);
        assert_eq!(sma.filtered(), Some(7));
        sma.reset();
        assert!(sma.is_empty());
        assert!(!sma.is_full());
    }
}
