//! Configuration for the direction detector.
//!
//! Every DOM hook the detector touches (the translation widget, the RTL
//! stylesheet link and the body marker classes) is named here, together with
//! the polling and settle timings. Defaults match the Google Translate widget
//! and the Bootstrap 5.3 RTL build. Configuration can be deserialized from
//! JSON, loaded from environment variables, or constructed programmatically.

use core::time::Duration;
use std::env;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DirectionError;

/// Selector of the `<select>` injected by the Google Translate widget.
pub const DEFAULT_WIDGET_SELECTOR: &str = ".goog-te-combo";
/// Id of the `<link>` element whose `href` carries the RTL stylesheet.
pub const DEFAULT_STYLESHEET_LINK_ID: &str = "bootstrap-rtl";
/// Bootstrap RTL override served from jsDelivr.
pub const DEFAULT_RTL_STYLESHEET_URL: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.rtl.min.css";

/// Runtime configuration for the direction detector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Selector of the translation widget's language control.
    pub widget_selector: String,
    /// Id of the stylesheet link toggled between the RTL URL and empty.
    pub stylesheet_link_id: String,
    /// Stylesheet loaded while the page is right-to-left.
    pub rtl_stylesheet_url: String,
    /// Body class present while the page is right-to-left.
    pub rtl_class: String,
    /// Body class present while the page is left-to-right.
    pub ltr_class: String,
    /// Language assumed when neither the widget nor the root element names one.
    pub default_language: String,
    /// Interval between checks for the widget, in milliseconds
    pub widget_poll_interval_ms: u64,
    /// Delay between a widget `change` event and the recomputation, in milliseconds
    pub widget_settle_delay_ms: u64,
    /// Give up looking for the widget after this many checks. `None` polls forever.
    pub widget_poll_max_attempts: Option<u32>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            widget_selector: DEFAULT_WIDGET_SELECTOR.to_owned(),
            stylesheet_link_id: DEFAULT_STYLESHEET_LINK_ID.to_owned(),
            rtl_stylesheet_url: DEFAULT_RTL_STYLESHEET_URL.to_owned(),
            rtl_class: String::from("is-rtl"),
            ltr_class: String::from("is-ltr"),
            default_language: String::from("en"),
            widget_poll_interval_ms: 100,
            widget_settle_delay_ms: 500,
            widget_poll_max_attempts: None,
        }
    }
}

impl DetectorConfig {
    /// Parse a (possibly partial) JSON object; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`DirectionError::Config`] if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, DirectionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| DirectionError::Config(format!("invalid JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables, falling back to the defaults:
    /// - `RTL_DETECTOR_WIDGET_SELECTOR`
    /// - `RTL_DETECTOR_STYLESHEET_LINK_ID`
    /// - `RTL_DETECTOR_STYLESHEET_URL`
    /// - `RTL_DETECTOR_DEFAULT_LANGUAGE`
    /// - `RTL_DETECTOR_POLL_INTERVAL_MS`
    /// - `RTL_DETECTOR_SETTLE_DELAY_MS`
    /// - `RTL_DETECTOR_POLL_MAX_ATTEMPTS`: `0` or unset polls forever
    ///
    /// Numbers go through [`validate`](Self::validate) unchanged, the same as
    /// JSON: a zero settle delay applies on the next tick, a zero poll interval
    /// is rejected.
    ///
    /// # Errors
    /// Returns [`DirectionError::Config`] if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, DirectionError> {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| env::var(key).ok().filter(|val| !val.is_empty()).unwrap_or(fallback);
        let millis = |key: &str, fallback: u64| {
            env::var(key)
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(fallback)
        };
        let config = Self {
            widget_selector: text("RTL_DETECTOR_WIDGET_SELECTOR", defaults.widget_selector),
            stylesheet_link_id: text("RTL_DETECTOR_STYLESHEET_LINK_ID", defaults.stylesheet_link_id),
            rtl_stylesheet_url: text("RTL_DETECTOR_STYLESHEET_URL", defaults.rtl_stylesheet_url),
            rtl_class: defaults.rtl_class,
            ltr_class: defaults.ltr_class,
            default_language: text("RTL_DETECTOR_DEFAULT_LANGUAGE", defaults.default_language),
            widget_poll_interval_ms: millis("RTL_DETECTOR_POLL_INTERVAL_MS", defaults.widget_poll_interval_ms),
            widget_settle_delay_ms: millis("RTL_DETECTOR_SETTLE_DELAY_MS", defaults.widget_settle_delay_ms),
            widget_poll_max_attempts: env::var("RTL_DETECTOR_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|val| val.parse::<u32>().ok())
                .and_then(|attempts| (attempts > 0).then_some(attempts)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every hook is named and the stylesheet URL is absolute.
    ///
    /// # Errors
    /// Returns [`DirectionError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), DirectionError> {
        let required = [
            ("widget_selector", &self.widget_selector),
            ("stylesheet_link_id", &self.stylesheet_link_id),
            ("rtl_class", &self.rtl_class),
            ("ltr_class", &self.ltr_class),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DirectionError::Config(format!("{field} must not be empty")));
            }
        }
        if self.rtl_class == self.ltr_class {
            return Err(DirectionError::Config(String::from(
                "rtl_class and ltr_class must differ",
            )));
        }
        if self.widget_poll_interval_ms == 0 {
            return Err(DirectionError::Config(String::from(
                "widget_poll_interval_ms must be at least 1",
            )));
        }
        Url::parse(&self.rtl_stylesheet_url).map_err(|err| {
            DirectionError::Config(format!(
                "rtl_stylesheet_url {:?} is not a valid URL: {err}",
                self.rtl_stylesheet_url
            ))
        })?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn widget_poll_interval(&self) -> Duration {
        Duration::from_millis(self.widget_poll_interval_ms)
    }

    #[inline]
    #[must_use]
    pub const fn widget_settle_delay(&self) -> Duration {
        Duration::from_millis(self.widget_settle_delay_ms)
    }
}
