//! Active-section selection for the navigation bar.

use std::collections::HashMap;

/// Ratio a candidate must beat to displace the current section.
const CONFIDENT_RATIO: f64 = 0.1;

/// Intersection thresholds the spy observers report at.
pub const SPY_THRESHOLDS: [f64; 6] = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];

#[derive(Clone, Debug, PartialEq)]
pub struct SpyConfig {
    pub base_offset_px: f64,
    pub root_margin: String,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            base_offset_px: 100.0,
            root_margin: "-20% 0px -80% 0px".to_string(),
        }
    }
}

/// Ordered section ids plus the intersection ratio of each one currently
/// intersecting.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionRegistry {
    ids: Vec<String>,
    ratios: HashMap<String, f64>,
    active: String,
}

impl SectionRegistry {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let active = ids.first().cloned().unwrap_or_default();

        Self {
            ids,
            ratios: HashMap::new(),
            active,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn ratio(&self, id: &str) -> f64 {
        self.ratios.get(id).copied().unwrap_or(0.0)
    }

    /// Records one intersection entry and re-runs selection. Returns the new
    /// active id when it changed.
    pub fn observe(&mut self, id: &str, is_intersecting: bool, ratio: f64) -> Option<&str> {
        if !self.ids.iter().any(|known| known == id) {
            return None;
        }

        if is_intersecting {
            let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
            self.ratios.insert(id.to_string(), ratio);
        } else {
            self.ratios.remove(id);
        }

        let next = self.select()?;
        if next == self.active {
            return None;
        }

        self.active = next;
        Some(self.active.as_str())
    }

    /// Most-visible wins. Low-confidence candidates other than the first
    /// section keep the previous selection.
    fn select(&self) -> Option<String> {
        let first = self.ids.first()?;
        let mut best: Option<(&String, f64)> = None;

        for id in &self.ids {
            let Some(&ratio) = self.ratios.get(id) else {
                continue;
            };

            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((id, ratio));
            }
        }

        let (candidate, ratio) = best?;
        if ratio > CONFIDENT_RATIO || candidate == first {
            Some(candidate.clone())
        } else {
            None
        }
    }
}

/// Navigation offset for the current viewport width.
pub fn responsive_offset(base_offset_px: f64, viewport_width_px: f64) -> f64 {
    if viewport_width_px < 640.0 {
        base_offset_px - 25.0
    } else if viewport_width_px < 768.0 {
        base_offset_px - 15.0
    } else if viewport_width_px < 1024.0 {
        base_offset_px - 10.0
    } else {
        base_offset_px
    }
}

/// Base navigation offset used by the page layout itself.
pub fn layout_base_offset(viewport_width_px: f64) -> f64 {
    if viewport_width_px < 640.0 {
        60.0
    } else if viewport_width_px < 1024.0 {
        70.0
    } else {
        80.0
    }
}

/// Absolute scroll target that puts a section's top just under the nav bar.
pub fn scroll_target(element_top_px: f64, current_scroll_px: f64, offset_px: f64) -> f64 {
    (element_top_px + current_scroll_px - offset_px).max(0.0)
}

pub fn fragment_for(section_id: &str) -> String {
    format!("#{section_id}")
}

/// A nav-triggered scroll: start and end offsets plus the fragment to record.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollPlan {
    pub from_px: f64,
    pub to_px: f64,
    pub fragment: String,
}

/// `None` when the section is not on the page; the click is then ignored
/// and the URL keeps its current fragment.
pub fn plan_scroll(
    section_id: &str,
    element_top_px: Option<f64>,
    current_scroll_px: f64,
    offset_px: f64,
) -> Option<ScrollPlan> {
    if section_id.trim().is_empty() {
        return None;
    }
    let element_top_px = element_top_px?;

    Some(ScrollPlan {
        from_px: current_scroll_px,
        to_px: scroll_target(element_top_px, current_scroll_px, offset_px),
        fragment: fragment_for(section_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SectionRegistry {
        SectionRegistry::new(["home", "about", "skills"])
    }

    #[test]
    fn first_section_is_active_before_any_entry() {
        assert_eq!(registry().active(), "home");
        assert_eq!(SectionRegistry::new(Vec::<String>::new()).active(), "");
    }

    #[test]
    fn single_confident_section_becomes_active() {
        let mut spy = registry();

        assert_eq!(spy.observe("about", true, 0.6), Some("about"));
        assert_eq!(spy.active(), "about");
    }

    #[test]
    fn most_visible_section_wins() {
        let mut spy = registry();

        spy.observe("about", true, 0.3);
        spy.observe("skills", true, 0.75);
        assert_eq!(spy.active(), "skills");

        spy.observe("skills", false, 0.0);
        assert_eq!(spy.active(), "about");
    }

    #[test]
    fn low_confidence_candidates_keep_previous_section() {
        let mut spy = registry();

        spy.observe("skills", true, 0.8);
        assert_eq!(spy.active(), "skills");

        spy.observe("skills", false, 0.0);
        assert_eq!(spy.observe("about", true, 0.05), None);
        assert_eq!(spy.active(), "skills");
    }

    #[test]
    fn empty_intersection_set_keeps_previous_section() {
        let mut spy = registry();

        spy.observe("skills", true, 0.5);
        assert_eq!(spy.observe("skills", false, 0.0), None);
        assert_eq!(spy.active(), "skills");
    }

    #[test]
    fn first_section_wins_even_at_low_ratio() {
        let mut spy = registry();

        spy.observe("skills", true, 0.5);
        spy.observe("skills", false, 0.0);
        assert_eq!(spy.observe("home", true, 0.02), Some("home"));
    }

    #[test]
    fn ties_go_to_the_earlier_section() {
        let mut spy = registry();

        spy.observe("skills", true, 0.4);
        spy.observe("about", true, 0.4);
        assert_eq!(spy.active(), "about");
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut spy = registry();

        assert_eq!(spy.observe("missing", true, 1.0), None);
        assert_eq!(spy.ratio("missing"), 0.0);
        assert_eq!(spy.active(), "home");
    }

    #[test]
    fn offset_shrinks_with_viewport() {
        assert_eq!(responsive_offset(100.0, 375.0), 75.0);
        assert_eq!(responsive_offset(100.0, 700.0), 85.0);
        assert_eq!(responsive_offset(100.0, 900.0), 90.0);
        assert_eq!(responsive_offset(100.0, 1_400.0), 100.0);

        assert_eq!(layout_base_offset(375.0), 60.0);
        assert_eq!(layout_base_offset(900.0), 70.0);
        assert_eq!(layout_base_offset(1_400.0), 80.0);
    }

    #[test]
    fn missing_section_plans_no_scroll() {
        assert_eq!(plan_scroll("contact", None, 640.0, 80.0), None);
        assert_eq!(plan_scroll("", Some(200.0), 640.0, 80.0), None);
    }

    #[test]
    fn present_section_plans_offset_scroll_and_fragment() {
        let plan = plan_scroll("skills", Some(400.0), 1_000.0, 80.0).expect("section exists");

        assert_eq!(
            plan,
            ScrollPlan {
                from_px: 1_000.0,
                to_px: 1_320.0,
                fragment: "#skills".to_string(),
            }
        );
    }

    #[test]
    fn scroll_target_never_goes_negative() {
        assert_eq!(scroll_target(400.0, 1_000.0, 80.0), 1_320.0);
        assert_eq!(scroll_target(-500.0, 100.0, 80.0), 0.0);
        assert_eq!(fragment_for("skills"), "#skills");
    }
}
