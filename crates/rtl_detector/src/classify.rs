//! Language code classification.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Primary subtags written right-to-left. `iw` and `ji` are the legacy codes
/// for Hebrew and Yiddish that some translation widgets still emit.
pub const RTL_LANGUAGES: [&str; 10] = ["ar", "he", "ur", "fa", "yi", "ji", "iw", "ku", "ps", "sd"];

/// Text direction of the page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    #[inline]
    pub const fn from_rtl(is_rtl: bool) -> Self {
        if is_rtl { Self::Rtl } else { Self::Ltr }
    }

    /// Classify a language code.
    #[inline]
    pub fn of_language(code: &str) -> Self {
        Self::from_rtl(is_rtl_language(code))
    }

    #[inline]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }

    /// The value of the `dir` attribute.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Return the primary subtag of a language tag (`"ar"` for `"ar-SA"`), lowercased.
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Whether a language code is written right-to-left.
///
/// Only the primary subtag matters and the comparison ignores case, so
/// `"AR-eg"`, `"ar"` and `"ar-Arab-EG"` all classify the same way.
pub fn is_rtl_language(code: &str) -> bool {
    let primary = primary_subtag(code);
    RTL_LANGUAGES.contains(&primary.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_subtag_is_rtl_in_any_case_and_region() {
        for code in RTL_LANGUAGES {
            assert!(is_rtl_language(code), "{code}");
            assert!(is_rtl_language(&code.to_ascii_uppercase()), "{code}");
            assert!(is_rtl_language(&format!("{code}-XX")), "{code}-XX");
        }
    }

    #[test]
    fn other_languages_are_ltr() {
        for code in ["en", "en-US", "fr", "de-CH", "zh-Hans-CN", "ja", "arn", "her", "a", "-ar", "ar_SA"] {
            assert!(!is_rtl_language(code), "{code}");
        }
    }

    #[test]
    fn empty_code_is_ltr() {
        assert!(!is_rtl_language(""));
        assert_eq!(Direction::of_language(""), Direction::Ltr);
    }

    #[test]
    fn only_the_first_segment_is_considered() {
        assert!(is_rtl_language("fa-Arab-IR"));
        assert!(!is_rtl_language("en-ar"));
        assert_eq!(primary_subtag(" He-IL "), "he");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(is_rtl_language(" ar"));
        assert!(is_rtl_language("he-IL\n"));
        assert!(!is_rtl_language("   "));
        assert!(!is_rtl_language(" en "));
    }

    #[test]
    fn region_variation_does_not_change_classification() {
        assert_eq!(Direction::of_language("ar"), Direction::of_language("ar-EG"));
        assert_eq!(Direction::of_language("en"), Direction::of_language("en-GB"));
        assert_eq!(Direction::of_language("ar-EG"), Direction::of_language("ar-EG"));
    }

    #[test]
    fn direction_attribute_values() {
        assert_eq!(Direction::from_rtl(true).as_str(), "rtl");
        assert_eq!(Direction::from_rtl(false).to_string(), "ltr");
        assert!(Direction::Rtl.is_rtl());
    }
}
