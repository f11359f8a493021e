//! Native host: the in-memory [`dom::Dom`] driven by tokio tasks.

mod detector;
pub use detector::{DetectorHandle, RtlDetector};

use dom::Dom;

use crate::document::DocumentHandle;
use crate::error::{DirectionError, HOOK_BODY, HOOK_ROOT_ELEMENT, HOOK_STYLESHEET_LINK};

fn host_error(err: &anyhow::Error) -> DirectionError {
    DirectionError::Host(format!("{err:#}"))
}

impl DocumentHandle for Dom {
    fn control_value(&self, selector: &str) -> Option<String> {
        let index = self.index();
        let control = index.query_selector(selector)?;
        Some(index.value(control).unwrap_or_default().to_owned())
    }

    fn root_attribute(&self, name: &str) -> Option<String> {
        let index = self.index();
        index
            .attribute(index.document_element()?, name)
            .map(str::to_owned)
    }

    fn set_root_attribute(&mut self, name: &str, value: &str) -> Result<(), DirectionError> {
        let root = self
            .index()
            .document_element()
            .ok_or_else(|| DirectionError::MissingElement(HOOK_ROOT_ELEMENT, String::from("<html>")))?;
        self.set_attribute(root, name, value).map_err(|err| host_error(&err))
    }

    fn set_link_href(&mut self, link_id: &str, href: &str) -> Result<(), DirectionError> {
        let link = self
            .index()
            .get_element_by_id(link_id)
            .ok_or_else(|| DirectionError::MissingElement(HOOK_STYLESHEET_LINK, format!("#{link_id}")))?;
        self.set_attribute(link, "href", href).map_err(|err| host_error(&err))
    }

    fn swap_body_class(&mut self, add: &str, remove: &str) -> Result<(), DirectionError> {
        let body = self
            .index()
            .body()
            .ok_or_else(|| DirectionError::MissingElement(HOOK_BODY, String::new()))?;
        self.add_class(body, add).map_err(|err| host_error(&err))?;
        self.remove_class(body, remove).map_err(|err| host_error(&err))
    }
}
