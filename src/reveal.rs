//! One-shot reveal sequencing for lists and counters.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Scheduling,
    Settled,
    Cancelled,
}

/// Per-item reveal flags for a list whose container becomes visible once.
///
/// Items reveal in index order at `index * stagger` after the trigger.
/// Nothing ever flips back to hidden.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealSchedule {
    stagger: Duration,
    revealed: Vec<bool>,
    phase: RevealPhase,
}

impl RevealSchedule {
    pub fn new(item_count: usize, stagger: Duration) -> Self {
        Self {
            stagger,
            revealed: vec![false; item_count],
            phase: RevealPhase::Idle,
        }
    }

    pub fn item_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn stagger(&self) -> Duration {
        self.stagger
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Starts the cascade. Returns each index with its delay from now, or
    /// `None` when the schedule already started.
    pub fn trigger(&mut self) -> Option<Vec<(usize, Duration)>> {
        if self.phase != RevealPhase::Idle {
            return None;
        }

        if self.revealed.is_empty() {
            self.phase = RevealPhase::Settled;
            return Some(Vec::new());
        }

        self.phase = RevealPhase::Scheduling;
        Some((0..self.revealed.len()).map(|index| (index, self.delay_for(index))).collect())
    }

    pub fn delay_for(&self, index: usize) -> Duration {
        self.stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Marks `index` revealed, along with any earlier item still hidden, so a
    /// late timer cannot leave gaps. Ignored before the trigger fires.
    pub fn reveal(&mut self, index: usize) {
        if self.phase != RevealPhase::Scheduling {
            return;
        }

        let last = index.min(self.revealed.len().saturating_sub(1));
        for flag in &mut self.revealed[..=last] {
            *flag = true;
        }

        if self.revealed.iter().all(|flag| *flag) {
            self.phase = RevealPhase::Settled;
        }
    }

    /// Reveals every item whose delay has elapsed since the trigger.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.phase != RevealPhase::Scheduling {
            return;
        }

        let due = (0..self.revealed.len())
            .take_while(|index| self.delay_for(*index) <= elapsed)
            .last();

        if let Some(index) = due {
            self.reveal(index);
        }
    }

    /// Stops a cascade whose owner went away. Pending reveals are dropped and
    /// the schedule never triggers again.
    pub fn cancel(&mut self) {
        if self.phase != RevealPhase::Settled {
            self.phase = RevealPhase::Cancelled;
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn item_animation(&self, index: usize) -> ItemAnimation {
        if self.is_revealed(index) {
            ItemAnimation::SHOWN
        } else {
            ItemAnimation::HIDDEN
        }
    }
}

/// Target pose for one list item; the CSS transition animates between poses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemAnimation {
    pub opacity: f64,
    pub translate_y_px: f64,
    pub scale: f64,
}

impl ItemAnimation {
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        translate_y_px: 30.0,
        scale: 0.9,
    };

    pub const SHOWN: Self = Self {
        opacity: 1.0,
        translate_y_px: 0.0,
        scale: 1.0,
    };

    pub fn style(&self) -> String {
        format!(
            "opacity: {:.2}; transform: translateY({:.1}px) scale({:.2});",
            self.opacity, self.translate_y_px, self.scale
        )
    }
}

pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

/// Count-up animation driven by frame timestamps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterAnimation {
    start_value: f64,
    target_value: f64,
    duration_ms: f64,
    started_at_ms: Option<f64>,
}

impl CounterAnimation {
    pub fn new(start_value: f64, target_value: f64, duration: Duration) -> Self {
        Self {
            start_value,
            target_value,
            duration_ms: duration.as_secs_f64() * 1_000.0,
            started_at_ms: None,
        }
    }

    /// Value to display at `now_ms` and whether the count is finished.
    pub fn step(&mut self, now_ms: f64) -> (f64, bool) {
        let started_at = *self.started_at_ms.get_or_insert(now_ms);

        if self.duration_ms <= 0.0 {
            return (self.target_value, true);
        }

        let progress = ((now_ms - started_at) / self.duration_ms).clamp(0.0, 1.0);
        let value = self.start_value + (self.target_value - self.start_value) * ease_out_quart(progress);

        (value, progress >= 1.0)
    }
}

pub fn format_counter(value: f64, decimals: usize, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{value:.decimals$}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAGGER: Duration = Duration::from_millis(100);

    #[test]
    fn all_items_start_hidden() {
        let schedule = RevealSchedule::new(4, STAGGER);

        assert_eq!(schedule.phase(), RevealPhase::Idle);
        assert!((0..4).all(|index| !schedule.is_revealed(index)));
    }

    #[test]
    fn trigger_returns_index_times_stagger_delays() {
        let mut schedule = RevealSchedule::new(5, STAGGER);
        let delays = schedule.trigger().expect("first trigger schedules");

        assert_eq!(
            delays,
            (0..5)
                .map(|index| (index, Duration::from_millis(100 * index as u64)))
                .collect::<Vec<_>>()
        );
        assert_eq!(schedule.phase(), RevealPhase::Scheduling);
    }

    #[test]
    fn repeated_trigger_is_ignored() {
        let mut schedule = RevealSchedule::new(3, STAGGER);

        assert!(schedule.trigger().is_some());
        assert!(schedule.trigger().is_none());
        schedule.reveal(2);
        assert!(schedule.trigger().is_none());
    }

    #[test]
    fn items_reveal_in_order_over_time() {
        let mut schedule = RevealSchedule::new(5, STAGGER);
        schedule.trigger();

        for elapsed_ms in (0..=500).step_by(10) {
            schedule.advance(Duration::from_millis(elapsed_ms));

            for index in 0..5 {
                let due = elapsed_ms >= 100 * index as u64;
                assert_eq!(schedule.is_revealed(index), due, "item {index} at {elapsed_ms}ms");
            }
            for index in 1..5 {
                if schedule.is_revealed(index) {
                    assert!(schedule.is_revealed(index - 1));
                }
            }
        }

        assert_eq!(schedule.phase(), RevealPhase::Settled);
    }

    #[test]
    fn item_just_before_its_slot_stays_hidden() {
        let mut schedule = RevealSchedule::new(5, STAGGER);
        schedule.trigger();

        schedule.advance(Duration::from_millis(299));
        assert!(schedule.is_revealed(2));
        assert!(!schedule.is_revealed(3));
    }

    #[test]
    fn late_timer_fills_earlier_gaps() {
        let mut schedule = RevealSchedule::new(4, STAGGER);
        schedule.trigger();

        schedule.reveal(2);
        assert!(schedule.is_revealed(0));
        assert!(schedule.is_revealed(1));
        assert!(schedule.is_revealed(2));
        assert!(!schedule.is_revealed(3));
        assert_eq!(schedule.phase(), RevealPhase::Scheduling);
    }

    #[test]
    fn reveal_before_trigger_is_ignored() {
        let mut schedule = RevealSchedule::new(2, STAGGER);

        schedule.reveal(1);
        schedule.advance(Duration::from_secs(5));
        assert!(!schedule.is_revealed(0));
    }

    #[test]
    fn cancelled_cascade_ignores_late_timers() {
        let mut schedule = RevealSchedule::new(4, STAGGER);
        schedule.trigger();
        schedule.advance(Duration::from_millis(100));
        schedule.cancel();

        schedule.reveal(3);
        schedule.advance(Duration::from_secs(5));
        assert!(schedule.is_revealed(1));
        assert!(!schedule.is_revealed(2));
        assert!(!schedule.is_revealed(3));
        assert_eq!(schedule.phase(), RevealPhase::Cancelled);
        assert!(schedule.trigger().is_none());
    }

    #[test]
    fn cancel_before_trigger_prevents_scheduling() {
        let mut schedule = RevealSchedule::new(3, STAGGER);
        schedule.cancel();

        assert!(schedule.trigger().is_none());
        assert!((0..3).all(|index| !schedule.is_revealed(index)));
    }

    #[test]
    fn cancel_after_settling_keeps_items_shown() {
        let mut schedule = RevealSchedule::new(2, STAGGER);
        schedule.trigger();
        schedule.reveal(1);
        schedule.cancel();

        assert_eq!(schedule.phase(), RevealPhase::Settled);
        assert!(schedule.is_revealed(0) && schedule.is_revealed(1));
    }

    #[test]
    fn out_of_range_index_reads_as_hidden() {
        let mut schedule = RevealSchedule::new(2, STAGGER);
        schedule.trigger();
        schedule.reveal(10);

        assert!(schedule.is_revealed(1));
        assert!(!schedule.is_revealed(2));
        assert_eq!(schedule.item_animation(99), ItemAnimation::HIDDEN);
        assert_eq!(schedule.item_animation(0), ItemAnimation::SHOWN);
    }

    #[test]
    fn empty_schedule_settles_immediately() {
        let mut schedule = RevealSchedule::new(0, STAGGER);

        assert_eq!(schedule.trigger(), Some(Vec::new()));
        assert_eq!(schedule.phase(), RevealPhase::Settled);
        assert!(!schedule.is_revealed(0));
    }

    #[test]
    fn counter_eases_to_target() {
        let mut counter = CounterAnimation::new(0.0, 150.0, Duration::from_secs(2));

        assert_eq!(counter.step(10.0), (0.0, false));
        let (midway, done) = counter.step(1_010.0);
        assert!(!done);
        assert!(midway > 75.0 && midway < 150.0);
        assert_eq!(counter.step(2_010.0), (150.0, true));
    }

    #[test]
    fn zero_duration_counter_jumps_to_target() {
        let mut counter = CounterAnimation::new(0.0, 25.0, Duration::ZERO);
        assert_eq!(counter.step(0.0), (25.0, true));
    }

    #[test]
    fn counter_formatting_respects_decimals() {
        assert_eq!(format_counter(1_199.6, 0, "", "+"), "1200+");
        assert_eq!(format_counter(3.14159, 2, "~", ""), "~3.14");
    }

    #[test]
    fn item_style_renders_pose() {
        assert_eq!(
            ItemAnimation::HIDDEN.style(),
            "opacity: 0.00; transform: translateY(30.0px) scale(0.90);"
        );
    }
}
