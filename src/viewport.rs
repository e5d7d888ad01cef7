//! Visibility state machine shared by every viewport-driven component.
//!
//! The browser side feeds raw intersection entries into [`VisibilityState`];
//! the state machine decides what the public "is visible" signal is and
//! whether the underlying observer should stop delivering entries.

const DEFAULT_THRESHOLD: f64 = 0.1;
const DEFAULT_ROOT_MARGIN: &str = "0px";

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    threshold: f64,
    root_margin: String,
    trigger_once: bool,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            trigger_once: false,
        }
    }
}

impl ObserverOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_THRESHOLD
        };
        self
    }

    pub fn with_root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = root_margin.into();
        self
    }

    pub fn trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> &str {
        &self.root_margin
    }

    pub fn is_trigger_once(&self) -> bool {
        self.trigger_once
    }
}

/// What the caller should do with the underlying observer after an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverAction {
    Keep,
    Disconnect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityState {
    threshold: f64,
    trigger_once: bool,
    is_visible: bool,
    has_triggered_once: bool,
}

impl VisibilityState {
    pub fn new(options: &ObserverOptions) -> Self {
        Self {
            threshold: options.threshold(),
            trigger_once: options.is_trigger_once(),
            is_visible: false,
            has_triggered_once: false,
        }
    }

    /// Applies one intersection entry.
    ///
    /// Once a trigger-once attachment has fired, further entries are ignored
    /// and the signal stays `true`.
    pub fn apply(&mut self, is_intersecting: bool, intersection_ratio: f64) -> ObserverAction {
        if self.is_frozen() {
            return ObserverAction::Disconnect;
        }

        let meets_threshold = is_intersecting && intersection_ratio >= self.threshold;

        if meets_threshold {
            self.is_visible = true;
            if self.trigger_once {
                self.has_triggered_once = true;
                return ObserverAction::Disconnect;
            }
        } else {
            self.is_visible = false;
        }

        ObserverAction::Keep
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn has_triggered_once(&self) -> bool {
        self.has_triggered_once
    }

    pub fn is_frozen(&self) -> bool {
        self.trigger_once && self.has_triggered_once
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = ObserverOptions::default();
        assert_eq!(options.threshold(), 0.1);
        assert_eq!(options.root_margin(), "0px");
        assert!(!options.is_trigger_once());
    }

    #[test]
    fn threshold_is_clamped_to_unit_range() {
        assert_eq!(ObserverOptions::default().with_threshold(1.7).threshold(), 1.0);
        assert_eq!(ObserverOptions::default().with_threshold(-0.3).threshold(), 0.0);
        assert_eq!(ObserverOptions::default().with_threshold(f64::NAN).threshold(), 0.1);
    }

    #[test]
    fn continuous_mode_follows_intersection() {
        let mut state = VisibilityState::new(&ObserverOptions::default());

        assert_eq!(state.apply(true, 0.5), ObserverAction::Keep);
        assert!(state.is_visible());
        assert_eq!(state.apply(false, 0.0), ObserverAction::Keep);
        assert!(!state.is_visible());
        assert_eq!(state.apply(true, 0.2), ObserverAction::Keep);
        assert!(state.is_visible());
    }

    #[test]
    fn entries_below_threshold_do_not_count() {
        let mut state = VisibilityState::new(&ObserverOptions::default().with_threshold(0.5));

        state.apply(true, 0.3);
        assert!(!state.is_visible());
        state.apply(true, 0.5);
        assert!(state.is_visible());
    }

    #[test]
    fn trigger_once_signal_never_falls_back() {
        let options = ObserverOptions::default().trigger_once(true);
        let sequences: [&[(bool, f64)]; 3] = [
            &[(true, 0.4), (false, 0.0), (false, 0.0)],
            &[(false, 0.0), (true, 1.0), (true, 0.05), (false, 0.0)],
            &[(true, 0.1), (true, 0.9), (false, 0.0), (true, 0.0)],
        ];

        for sequence in sequences {
            let mut state = VisibilityState::new(&options);
            let mut seen_visible = false;

            for (is_intersecting, ratio) in sequence {
                state.apply(*is_intersecting, *ratio);
                if seen_visible {
                    assert!(state.is_visible(), "signal regressed in {sequence:?}");
                }
                seen_visible |= state.is_visible();
            }

            assert!(seen_visible);
            assert!(state.has_triggered_once());
        }
    }

    #[test]
    fn trigger_once_asks_for_disconnect_after_firing() {
        let mut state = VisibilityState::new(&ObserverOptions::default().trigger_once(true));

        assert_eq!(state.apply(false, 0.0), ObserverAction::Keep);
        assert_eq!(state.apply(true, 0.8), ObserverAction::Disconnect);
        assert!(state.is_frozen());
        assert_eq!(state.apply(false, 0.0), ObserverAction::Disconnect);
        assert!(state.is_visible());
    }

    #[test]
    fn fresh_state_reports_not_visible() {
        let state = VisibilityState::new(&ObserverOptions::default().trigger_once(true));
        assert!(!state.is_visible());
        assert!(!state.has_triggered_once());
    }
}
