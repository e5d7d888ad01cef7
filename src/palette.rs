pub const DEFAULT_LANGUAGE_COLOR: &str = "#64748b";

pub fn language_color(language: &str) -> &'static str {
    match language {
        "TypeScript" => "#3b82f6",
        "JavaScript" => "#eab308",
        "Python" => "#22c55e",
        "Java" => "#ef4444",
        "CSS" => "#a855f7",
        "HTML" => "#f97316",
        "Shell" => "#6b7280",
        "Go" => "#06b6d4",
        "Rust" => "#ea580c",
        "C++" => "#ec4899",
        _ => DEFAULT_LANGUAGE_COLOR,
    }
}

/// Fill for a contribution-graph cell; unknown levels render as empty.
pub fn contribution_color(bucket_level: u8) -> &'static str {
    match bucket_level {
        1 => "#bbf7d0",
        2 => "#86efac",
        3 => "#4ade80",
        4 => "#22c55e",
        _ => "#e2e8f0",
    }
}

/// Share of `part` in `total` as a percentage, 0 when `total` is 0.
pub fn share_percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages_have_distinct_colors() {
        let known = ["TypeScript", "JavaScript", "Python", "Java", "CSS", "HTML", "Shell", "Go", "Rust", "C++"];
        let mut colors: Vec<&str> = known.iter().map(|language| language_color(language)).collect();
        colors.sort_unstable();
        colors.dedup();

        assert_eq!(colors.len(), known.len());
        assert!(!colors.contains(&DEFAULT_LANGUAGE_COLOR));
    }

    #[test]
    fn unknown_language_uses_default() {
        assert_eq!(language_color("COBOL"), DEFAULT_LANGUAGE_COLOR);
        assert_eq!(language_color("typescript"), DEFAULT_LANGUAGE_COLOR);
    }

    #[test]
    fn out_of_range_level_renders_as_empty() {
        assert_eq!(contribution_color(0), contribution_color(9));
        assert_ne!(contribution_color(1), contribution_color(4));
    }

    #[test]
    fn share_handles_empty_totals() {
        assert_eq!(share_percent(5, 0), 0.0);
        assert_eq!(share_percent(35, 100), 35.0);
    }
}
