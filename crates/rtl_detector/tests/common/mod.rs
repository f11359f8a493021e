//! Page fixtures shared by the integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use dom::{Dom, NodeKey};

pub const RTL_URL: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.rtl.min.css";

/// Keys of the elements the detector writes to.
#[derive(Clone, Copy, Debug)]
pub struct Keys {
    pub html: NodeKey,
    pub link: NodeKey,
    pub body: NodeKey,
}

/// A parsed page: `<html><head><link id="bootstrap-rtl"></head><body></body></html>`.
pub struct Page {
    pub dom: Dom,
    pub html: NodeKey,
    pub link: NodeKey,
    pub body: NodeKey,
}

impl Page {
    /// A page that is still being parsed.
    pub fn loading(lang: Option<&str>) -> Self {
        let mut dom = Dom::new();
        let html = dom.create_element(NodeKey::ROOT, "html").unwrap();
        if let Some(lang) = lang {
            dom.set_attribute(html, "lang", lang).unwrap();
        }
        let head = dom.create_element(html, "head").unwrap();
        let link = dom.create_element(head, "link").unwrap();
        dom.set_attribute(link, "rel", "stylesheet").unwrap();
        dom.set_attribute(link, "id", "bootstrap-rtl").unwrap();
        let body = dom.create_element(html, "body").unwrap();
        Self { dom, html, link, body }
    }

    /// A page whose parsing has finished.
    pub fn ready(lang: Option<&str>) -> Self {
        let mut page = Self::loading(lang);
        page.dom.finish_loading().unwrap();
        page
    }

    pub fn keys(&self) -> Keys {
        Keys {
            html: self.html,
            link: self.link,
            body: self.body,
        }
    }

    pub fn dir(&self) -> Option<&str> {
        self.dom.index().attribute(self.html, "dir")
    }

    pub fn href(&self) -> Option<&str> {
        self.dom.index().attribute(self.link, "href")
    }

    pub fn body_has(&self, class: &str) -> bool {
        self.dom.index().has_class(self.body, class)
    }
}

/// Insert the translation widget's `<select class="goog-te-combo">` into `parent`.
pub fn insert_widget(dom: &mut Dom, parent: NodeKey, value: &str) -> NodeKey {
    let select = dom.create_element(parent, "select").unwrap();
    dom.set_attribute(select, "class", "goog-te-combo").unwrap();
    dom.set_value(select, value).unwrap();
    select
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
