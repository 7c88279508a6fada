use num_traits::{Num, NumAssignOps, NumCast, Signed};

/// First-order low-pass: `prev = alpha * data + (1 - alpha) * prev`.
///
/// The weight may also be supplied per update, which is how the speed ramp
/// applies a caller-chosen percentage of the remaining gap each tick.
pub struct ExponentialFilter<ItemT> {
    alpha: ItemT,
    prev: ItemT,
}
impl<ItemT> ExponentialFilter<ItemT>
where
    ItemT: Num + NumAssignOps + NumCast + Signed + core::marker::Copy,
{
    pub fn new(alpha: ItemT) -> ExponentialFilter<ItemT> {
        ExponentialFilter {
            alpha: alpha,
            prev: ItemT::zero(),
        }
    }

    pub fn reset(&mut self) {
        self.prev = ItemT::zero();
    }

    pub fn update(&mut self, data: ItemT) -> ItemT {
        let alpha = self.alpha;
        self.update_weighted(alpha, data)
    }

    pub fn update_weighted(&mut self, alpha: ItemT, data: ItemT) -> ItemT {
        self.prev = alpha * data + (ItemT::one() - alpha) * self.prev;
        self.prev
    }

    /// Next output without committing it.
    pub fn peek_weighted(&self, alpha: ItemT, data: ItemT) -> ItemT {
        alpha * data + (ItemT::one() - alpha) * self.prev
    }

    pub fn value(&self) -> ItemT {
        self.prev
    }

    // overrides the filter state, e.g. after clamping the output
    pub fn set(&mut self, value: ItemT) {
        self.prev = value;
    }
}
