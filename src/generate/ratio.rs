use regex::Regex;
use std::sync::LazyLock;

/// Cost multiplier embedded in a node's display name. Two forms are accepted,
/// tried in this order: a label prefix ("倍率: 2.5") and a bare number
/// followed by a multiplier glyph ("2.5x", "3X", "1.5倍"). When both forms
/// are textually possible the label form wins because the alternation is
/// matched leftmost-first.
static MULTIPLIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)倍率[:\s]*([0-9.]+)|([0-9.]+)[xX✕✖⨉倍]").expect("multiplier regex")
});

/// Extracts the declared multiplier, if any. A token that is not a valid
/// number (e.g. "1.2.3") counts as no declaration.
pub fn extract_ratio(name: &str) -> Option<f64> {
    let caps = MULTIPLIER_RE.captures(name)?;
    let token = caps.get(1).or_else(|| caps.get(2))?.as_str();
    token.parse::<f64>().ok()
}

/// Decides inclusion of a node. Unrated nodes are always included; rated
/// nodes are excluded only when filtering is enabled and the multiplier
/// exceeds the limit. Pure function of its arguments.
pub fn include_proxy(name: &str, enabled: bool, limit: f64) -> bool {
    if !enabled {
        return true;
    }
    match extract_ratio(name) {
        Some(ratio) => ratio <= limit,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_forms() {
        assert_eq!(extract_ratio("HK premium 3x"), Some(3.0));
        assert_eq!(extract_ratio("JP [1.5倍]"), Some(1.5));
        assert_eq!(extract_ratio("SG 2.5X"), Some(2.5));
        assert_eq!(extract_ratio("US 0.8✕"), Some(0.8));
    }

    #[test]
    fn label_form_takes_precedence() {
        assert_eq!(extract_ratio("倍率:2 备用 5x"), Some(2.0));
        assert_eq!(extract_ratio("倍率 2.5"), Some(2.5));
    }

    #[test]
    fn unrated_names() {
        assert_eq!(extract_ratio("HK-IPLC-01"), None);
        assert_eq!(extract_ratio("express lane"), None);
    }

    #[test]
    fn malformed_token_counts_as_unrated() {
        assert_eq!(extract_ratio("倍率:1.2.3"), None);
        assert!(include_proxy("倍率:1.2.3", true, 2.0));
    }

    #[test]
    fn exclusion_threshold() {
        assert!(!include_proxy("HK 3x", true, 2.0));
        assert!(include_proxy("HK 1.5倍", true, 2.0));
        // boundary: equal to the limit is kept
        assert!(include_proxy("HK 2x", true, 2.0));
        // filter disabled: everything passes
        assert!(include_proxy("HK 9x", false, 2.0));
    }
}
