//! The document handle every read and write of the detector goes through.

use crate::error::DirectionError;

/// Access to the host document.
///
/// Implemented over the browser's `window.document` on wasm32 and over the
/// in-memory `dom::Dom` elsewhere.
pub trait DocumentHandle {
    /// Current value of the first form control matching `selector`.
    ///
    /// `None` when no element matches; `Some("")` when it matches but nothing is selected.
    fn control_value(&self, selector: &str) -> Option<String>;

    /// Attribute of the root (`<html>`) element, `None` when absent.
    fn root_attribute(&self, name: &str) -> Option<String>;

    /// # Errors
    /// [`DirectionError::MissingElement`] when the document has no root element.
    fn set_root_attribute(&mut self, name: &str, value: &str) -> Result<(), DirectionError>;

    /// Set the `href` of the `<link>` element with id `link_id`. An empty `href` unloads it.
    ///
    /// # Errors
    /// [`DirectionError::MissingElement`] when no element has the id.
    fn set_link_href(&mut self, link_id: &str, href: &str) -> Result<(), DirectionError>;

    /// Add `add` to the body's class list and remove `remove` from it.
    ///
    /// # Errors
    /// [`DirectionError::MissingElement`] when the document has no body.
    fn swap_body_class(&mut self, add: &str, remove: &str) -> Result<(), DirectionError>;
}
