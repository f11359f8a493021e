//! Text direction synchronization for translated pages.
//!
//! When a translation widget (Google Translate by default) or the root
//! element's `lang` attribute switches the page to a right-to-left language,
//! the detector sets `dir="rtl"` on the root element, loads the RTL stylesheet
//! override and marks the body with the RTL class; switching back reverses all
//! three. The same logic runs against the browser document on wasm32 and
//! against the in-memory `dom` runtime elsewhere.

#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod apply;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod language;
/// Read, classify, apply.
pub mod update;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(not(target_arch = "wasm32"))]
pub use native::{DetectorHandle, RtlDetector};

#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(target_arch = "wasm32")]
pub use web::{WebDocument, start_rtl_detection};

pub use apply::apply_text_direction;
pub use classify::{Direction, RTL_LANGUAGES, is_rtl_language};
pub use config::DetectorConfig;
pub use document::DocumentHandle;
pub use error::DirectionError;
pub use language::{LanguageSource, current_language};
pub use update::update_text_direction;
