/// Decides when the upgrade interstitial interrupts a review.
///
/// Every keep or delete counts, across sessions. Undo does not rewind the
/// counter.
#[derive(Debug, Clone)]
pub struct PaywallGate {
    interval: u32,
    swipes: u64,
}

impl PaywallGate {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            swipes: 0,
        }
    }

    /// Count one decision. Returns true when the paywall should show now.
    pub fn record_swipe(&mut self, is_premium: bool) -> bool {
        self.swipes += 1;
        if is_premium || self.interval == 0 {
            return false;
        }
        let show = self.swipes % u64::from(self.interval) == 0;
        if show {
            tracing::debug!(swipes = self.swipes, "paywall due");
        }
        show
    }
}
