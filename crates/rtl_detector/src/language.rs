//! Reads the page's current language.

use crate::config::DetectorConfig;
use crate::document::DocumentHandle;

/// Where the current language code came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LanguageSource {
    /// The translation widget's selected option.
    Widget,
    /// The `lang` attribute of the root element.
    RootAttribute,
    /// Neither was set.
    Default,
}

/// Best-effort current language code and its source.
///
/// The translation widget wins when it exists and has a selection, then the
/// root element's `lang`, then the configured default. Blank values fall through.
pub fn current_language<D: DocumentHandle + ?Sized>(
    document: &D,
    config: &DetectorConfig,
) -> (String, LanguageSource) {
    if let Some(selected) = document
        .control_value(&config.widget_selector)
        .filter(|val| !val.trim().is_empty())
    {
        return (selected, LanguageSource::Widget);
    }
    if let Some(lang) = document
        .root_attribute("lang")
        .filter(|val| !val.trim().is_empty())
    {
        return (lang, LanguageSource::RootAttribute);
    }
    (config.default_language.clone(), LanguageSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectionError;

    struct Page {
        widget: Option<&'static str>,
        lang: Option<&'static str>,
    }

    impl DocumentHandle for Page {
        fn control_value(&self, selector: &str) -> Option<String> {
            assert_eq!(selector, ".goog-te-combo");
            self.widget.map(str::to_owned)
        }

        fn root_attribute(&self, name: &str) -> Option<String> {
            assert_eq!(name, "lang");
            self.lang.map(str::to_owned)
        }

        fn set_root_attribute(&mut self, _: &str, _: &str) -> Result<(), DirectionError> {
            Err(DirectionError::Host(String::from("read-only page")))
        }

        fn set_link_href(&mut self, _: &str, _: &str) -> Result<(), DirectionError> {
            Err(DirectionError::Host(String::from("read-only page")))
        }

        fn swap_body_class(&mut self, _: &str, _: &str) -> Result<(), DirectionError> {
            Err(DirectionError::Host(String::from("read-only page")))
        }
    }

    fn read(widget: Option<&'static str>, lang: Option<&'static str>) -> (String, LanguageSource) {
        current_language(&Page { widget, lang }, &DetectorConfig::default())
    }

    #[test]
    fn widget_selection_takes_precedence() {
        assert_eq!(
            read(Some("he-IL"), Some("en")),
            (String::from("he-IL"), LanguageSource::Widget)
        );
    }

    #[test]
    fn empty_widget_falls_back_to_root_lang() {
        assert_eq!(
            read(Some(""), Some("fa")),
            (String::from("fa"), LanguageSource::RootAttribute)
        );
    }

    #[test]
    fn blank_widget_falls_back_to_root_lang() {
        assert_eq!(
            read(Some("  "), Some("ar")),
            (String::from("ar"), LanguageSource::RootAttribute)
        );
    }

    #[test]
    fn nothing_set_yields_default() {
        assert_eq!(read(None, None), (String::from("en"), LanguageSource::Default));
        assert_eq!(read(Some("  "), Some("")), (String::from("en"), LanguageSource::Default));
    }
}
