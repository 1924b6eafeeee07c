//! Counters screens publish for the portal header and the report screen.
//! Everything else is local to a screen.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// Counters derived from list screens, readable from anywhere
#[derive(Debug, Clone)]
pub struct Counters {
    plant_count: Arc<AtomicUsize>,
    admin_count: Arc<AtomicUsize>,
    report_number: Arc<AtomicU32>,
}

impl Counters {
    pub fn new() -> Self {
        Self {
            plant_count: Arc::new(AtomicUsize::new(0)),
            admin_count: Arc::new(AtomicUsize::new(0)),
            report_number: Arc::new(AtomicU32::new(1)),
        }
    }

    pub fn set_plant_count(&self, count: usize) {
        self.plant_count.store(count, Ordering::Relaxed);
    }

    pub fn plant_count(&self) -> usize {
        self.plant_count.load(Ordering::Relaxed)
    }

    pub fn set_admin_count(&self, count: usize) {
        self.admin_count.store(count, Ordering::Relaxed);
    }

    pub fn admin_count(&self) -> usize {
        self.admin_count.load(Ordering::Relaxed)
    }

    /// Sequence number the next generated report will carry (starts at 1)
    pub fn report_number(&self) -> u32 {
        self.report_number.load(Ordering::Relaxed)
    }

    /// Returns the number that was current before the increment
    pub fn next_report_number(&self) -> u32 {
        self.report_number.fetch_add(1, Ordering::Relaxed)
    }

    pub fn reset_report_number(&self) {
        self.report_number.store(1, Ordering::Relaxed);
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_number_starts_at_one_and_resets() {
        let counters = Counters::new();
        assert_eq!(counters.next_report_number(), 1);
        assert_eq!(counters.next_report_number(), 2);
        assert_eq!(counters.report_number(), 3);
        counters.reset_report_number();
        assert_eq!(counters.report_number(), 1);
    }

    #[test]
    fn clones_share_the_same_slots() {
        let counters = Counters::new();
        let view = counters.clone();
        counters.set_admin_count(4);
        counters.set_plant_count(2);
        assert_eq!(view.admin_count(), 4);
        assert_eq!(view.plant_count(), 2);
    }
}
