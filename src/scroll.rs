//! Frame-coalesced scroll sampling and programmatic scroll animation.

/// Raw measurements taken from the window when a scroll or resize event fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    pub scroll_offset_px: f64,
    pub document_height_px: f64,
    pub viewport_height_px: f64,
    pub viewport_width_px: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_offset_px: f64,
    pub progress_fraction: f64,
    pub is_past_threshold: bool,
}

impl ScrollSnapshot {
    pub fn from_sample(sample: &ScrollSample) -> Self {
        let scroll_offset_px = sample.scroll_offset_px.max(0.0);

        Self {
            scroll_offset_px,
            progress_fraction: progress_fraction(
                scroll_offset_px,
                sample.document_height_px,
                sample.viewport_height_px,
            ),
            is_past_threshold: scroll_offset_px > past_threshold_for_width(sample.viewport_width_px),
        }
    }

    pub fn progress_percent(&self) -> u32 {
        (self.progress_fraction * 100.0).round() as u32
    }
}

/// Fraction of the scrollable range covered, clamped to `[0, 1]`.
///
/// A document that fits in the viewport has no scrollable range and reports 0.
pub fn progress_fraction(scroll_offset_px: f64, document_height_px: f64, viewport_height_px: f64) -> f64 {
    let max_scroll = (document_height_px - viewport_height_px).max(0.0);

    if max_scroll <= 0.0 || !max_scroll.is_finite() || !scroll_offset_px.is_finite() {
        return 0.0;
    }

    (scroll_offset_px / max_scroll).clamp(0.0, 1.0)
}

/// Offset past which the page counts as scrolled; narrower screens trip sooner.
pub fn past_threshold_for_width(viewport_width_px: f64) -> f64 {
    if viewport_width_px < 640.0 {
        30.0
    } else if viewport_width_px < 1024.0 {
        40.0
    } else {
        50.0
    }
}

/// Coalesces any number of scroll events into at most one commit per frame.
///
/// `record` keeps only the latest sample and reports whether a frame needs
/// to be requested; `commit_frame` publishes that sample as one snapshot.
#[derive(Debug, Default)]
pub struct ScrollTracker {
    pending: Option<ScrollSample>,
    frame_requested: bool,
    snapshot: ScrollSnapshot,
    commits: u64,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the caller must schedule a frame callback.
    pub fn record(&mut self, sample: ScrollSample) -> bool {
        self.pending = Some(sample);

        if self.frame_requested {
            return false;
        }

        self.frame_requested = true;
        true
    }

    pub fn commit_frame(&mut self) -> Option<ScrollSnapshot> {
        self.frame_requested = false;
        let sample = self.pending.take()?;
        self.snapshot = ScrollSnapshot::from_sample(&sample);
        self.commits += 1;
        Some(self.snapshot)
    }

    /// Drops a pending sample when the frame was cancelled.
    pub fn cancel_frame(&mut self) {
        self.frame_requested = false;
        self.pending = None;
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.snapshot
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}

pub const FALLBACK_SCROLL_DURATION_MS: f64 = 500.0;

pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

/// Time-stepped scroll used when the browser has no native smooth scrolling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAnimation {
    start_px: f64,
    target_px: f64,
    duration_ms: f64,
    started_at_ms: Option<f64>,
}

impl ScrollAnimation {
    pub fn new(start_px: f64, target_px: f64) -> Self {
        Self {
            start_px,
            target_px,
            duration_ms: FALLBACK_SCROLL_DURATION_MS,
            started_at_ms: None,
        }
    }

    /// Position for the frame at `now_ms`, and whether the animation is done.
    /// The first frame fixes the start time.
    pub fn step(&mut self, now_ms: f64) -> (f64, bool) {
        let started_at = *self.started_at_ms.get_or_insert(now_ms);
        let progress = ((now_ms - started_at) / self.duration_ms).clamp(0.0, 1.0);
        let position = self.start_px + (self.target_px - self.start_px) * ease_in_out_cubic(progress);

        (position, progress >= 1.0)
    }

    pub fn target_px(&self) -> f64 {
        self.target_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(offset: f64) -> ScrollSample {
        ScrollSample {
            scroll_offset_px: offset,
            document_height_px: 5_000.0,
            viewport_height_px: 1_000.0,
            viewport_width_px: 1_280.0,
        }
    }

    #[test]
    fn a_thousand_events_in_one_frame_commit_once() {
        let mut tracker = ScrollTracker::new();
        let mut frame_requests = 0;

        for offset in 0..1_000 {
            if tracker.record(sample(f64::from(offset))) {
                frame_requests += 1;
            }
        }

        assert_eq!(frame_requests, 1);
        let snapshot = tracker.commit_frame().expect("pending sample");
        assert_eq!(tracker.commits(), 1);
        assert_eq!(snapshot.scroll_offset_px, 999.0);
        assert_eq!(tracker.commit_frame(), None);
        assert_eq!(tracker.commits(), 1);
    }

    #[test]
    fn next_frame_is_requested_after_commit() {
        let mut tracker = ScrollTracker::new();

        assert!(tracker.record(sample(10.0)));
        tracker.commit_frame();
        assert!(tracker.record(sample(20.0)));
        assert_eq!(tracker.commit_frame().map(|s| s.scroll_offset_px), Some(20.0));
        assert_eq!(tracker.snapshot().scroll_offset_px, 20.0);
    }

    #[test]
    fn cancelled_frame_discards_pending_sample() {
        let mut tracker = ScrollTracker::new();

        tracker.record(sample(300.0));
        tracker.cancel_frame();
        assert_eq!(tracker.commit_frame(), None);
        assert!(tracker.record(sample(400.0)));
    }

    #[test]
    fn progress_is_clamped_for_any_offset() {
        for offset in [0.0, 1.0, 250.0, 4_000.0, 9_999.0, 1e12] {
            for height in [0.0, 500.0, 1_000.0, 1_001.0, 20_000.0] {
                let progress = progress_fraction(offset, height, 1_000.0);
                assert!((0.0..=1.0).contains(&progress), "{offset} / {height} -> {progress}");
            }
        }
    }

    #[test]
    fn non_scrollable_document_reports_zero() {
        assert_eq!(progress_fraction(0.0, 0.0, 0.0), 0.0);
        assert_eq!(progress_fraction(120.0, 800.0, 900.0), 0.0);
        assert_eq!(progress_fraction(120.0, 900.0, 900.0), 0.0);
    }

    #[test]
    fn progress_divides_by_scrollable_range() {
        assert_eq!(progress_fraction(1_000.0, 5_000.0, 1_000.0), 0.25);
        assert_eq!(ScrollSnapshot::from_sample(&sample(2_000.0)).progress_percent(), 50);
    }

    #[test]
    fn threshold_shrinks_on_narrow_viewports() {
        assert_eq!(past_threshold_for_width(375.0), 30.0);
        assert_eq!(past_threshold_for_width(800.0), 40.0);
        assert_eq!(past_threshold_for_width(1_440.0), 50.0);

        let narrow = ScrollSample { viewport_width_px: 375.0, ..sample(35.0) };
        assert!(ScrollSnapshot::from_sample(&narrow).is_past_threshold);
        assert!(!ScrollSnapshot::from_sample(&sample(35.0)).is_past_threshold);
    }

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!(ease_in_out_cubic(0.25) < 0.25);
        assert!(ease_in_out_cubic(0.75) > 0.75);
    }

    #[test]
    fn fallback_animation_finishes_at_target_after_duration() {
        let mut animation = ScrollAnimation::new(100.0, 600.0);

        assert_eq!(animation.step(1_000.0), (100.0, false));
        let (midway, done) = animation.step(1_250.0);
        assert!(!done);
        assert_eq!(midway, 350.0);
        assert_eq!(animation.step(1_500.0), (600.0, true));
        assert_eq!(animation.step(9_000.0), (600.0, true));
    }
}
