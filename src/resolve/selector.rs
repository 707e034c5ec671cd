//! Highest-version selection under a ceiling

use super::CompatibleVersion;
use crate::domain::Version;

/// Picks the highest candidate not above `ceiling`.
///
/// With no ceiling every candidate is eligible. Returns `None` when nothing
/// remains after the ceiling is applied.
pub fn select_highest<'a>(
    candidates: &'a [CompatibleVersion],
    ceiling: Option<&Version>,
) -> Option<&'a CompatibleVersion> {
    candidates
        .iter()
        .filter(|candidate| ceiling.is_none_or(|limit| candidate.version <= *limit))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(versions: &[&str]) -> Vec<CompatibleVersion> {
        versions
            .iter()
            .map(|v| CompatibleVersion::new(*v, Version::parse(v).unwrap()))
            .collect()
    }

    fn pick(versions: &[&str], ceiling: Option<&str>) -> Option<String> {
        let all = candidates(versions);
        let ceiling = ceiling.map(|c| Version::parse(c).unwrap());
        select_highest(&all, ceiling.as_ref()).map(|c| c.text.clone())
    }

    #[test]
    fn test_select_without_ceiling() {
        assert_eq!(pick(&["1.0.0", "2.0.0", "1.1.0"], None), Some("2.0.0".into()));
    }

    #[test]
    fn test_select_caps_at_ceiling() {
        assert_eq!(
            pick(&["1.0.0", "1.1.0", "2.0.0"], Some("1.1.0")),
            Some("1.1.0".into())
        );
    }

    #[test]
    fn test_select_ceiling_is_inclusive_across_spellings() {
        assert_eq!(pick(&["1.0", "1.1"], Some("1.1.0")), Some("1.1".into()));
    }

    #[test]
    fn test_select_nothing_below_ceiling() {
        assert_eq!(pick(&["2.0.0", "3.0.0"], Some("1.5")), None);
    }

    #[test]
    fn test_select_empty() {
        assert_eq!(pick(&[], None), None);
    }

    #[test]
    fn test_select_orders_numerically() {
        assert_eq!(
            pick(&["1.9.0", "1.10.0", "1.2.0"], None),
            Some("1.10.0".into())
        );
    }

    #[test]
    fn test_select_prefers_final_over_prerelease() {
        assert_eq!(pick(&["2.0.0rc1", "2.0.0"], None), Some("2.0.0".into()));
        assert_eq!(
            pick(&["1.0.0", "2.0.0rc1"], Some("1.9")),
            Some("1.0.0".into())
        );
    }
}
