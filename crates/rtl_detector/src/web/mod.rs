//! Browser host: `window.document` through `web-sys`.
//!
//! Callbacks are `wasm-bindgen` closures leaked for the lifetime of the page,
//! the same lifetime the listeners they back have.

mod console;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function};
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlSelectElement, MutationObserver, MutationObserverInit, MutationRecord};

use crate::config::DetectorConfig;
use crate::document::DocumentHandle;
use crate::error::{DirectionError, HOOK_BODY, HOOK_ROOT_ELEMENT, HOOK_STYLESHEET_LINK};
use crate::update::update_text_direction;

thread_local! {
    /// Configuration passed to the last successful `startRtlDetection`.
    static STARTED_CONFIG: RefCell<Option<Rc<DetectorConfig>>> = const { RefCell::new(None) };
}

/// The started configuration, or the default when detection never started.
fn active_config() -> Rc<DetectorConfig> {
    STARTED_CONFIG
        .with_borrow(Option::clone)
        .unwrap_or_else(|| Rc::new(DetectorConfig::default()))
}

fn host_error(err: &JsValue) -> DirectionError {
    DirectionError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// The live page document.
#[derive(Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    /// # Errors
    /// Fails outside a window context (for example inside a worker).
    pub fn current() -> Result<Self, DirectionError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| DirectionError::Host(String::from("no window.document")))?;
        Ok(Self { document })
    }
}

impl DocumentHandle for WebDocument {
    fn control_value(&self, selector: &str) -> Option<String> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        element
            .dyn_ref::<HtmlSelectElement>()
            .map(HtmlSelectElement::value)
            .or_else(|| element.get_attribute("value"))
            .or_else(|| Some(String::new()))
    }

    fn root_attribute(&self, name: &str) -> Option<String> {
        self.document.document_element()?.get_attribute(name)
    }

    fn set_root_attribute(&mut self, name: &str, value: &str) -> Result<(), DirectionError> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| DirectionError::MissingElement(HOOK_ROOT_ELEMENT, String::from("<html>")))?;
        root.set_attribute(name, value).map_err(|err| host_error(&err))
    }

    fn set_link_href(&mut self, link_id: &str, href: &str) -> Result<(), DirectionError> {
        let link = self
            .document
            .get_element_by_id(link_id)
            .ok_or_else(|| DirectionError::MissingElement(HOOK_STYLESHEET_LINK, format!("#{link_id}")))?;
        link.set_attribute("href", href).map_err(|err| host_error(&err))
    }

    fn swap_body_class(&mut self, add: &str, remove: &str) -> Result<(), DirectionError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| DirectionError::MissingElement(HOOK_BODY, String::new()))?;
        let classes = body.class_list();
        classes.add_1(add).map_err(|err| host_error(&err))?;
        classes.remove_1(remove).map_err(|err| host_error(&err))
    }
}

fn run_update(config: &DetectorConfig) {
    let result = WebDocument::current().and_then(|mut document| update_text_direction(&mut document, config));
    if let Err(err) = result {
        warn!("direction update incomplete: {err}");
    }
}

fn observe_lang(document: &Document, config: &Rc<DetectorConfig>) -> Result<(), JsValue> {
    let Some(root) = document.document_element() else {
        warn!("document has no root element; lang changes will not be observed");
        return Ok(());
    };
    let config = Rc::clone(config);
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(move |records: Array, _: MutationObserver| {
        for record in records.iter() {
            let Ok(record) = record.dyn_into::<MutationRecord>() else {
                continue;
            };
            if record.type_() == "attributes" && record.attribute_name().as_deref() == Some("lang") {
                run_update(&config);
            }
        }
    });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_attribute_filter(&Array::of1(&JsValue::from_str("lang")));
    observer.observe_with_options(&root, &init)?;
    callback.forget();
    Ok(())
}

fn poll_widget(document: Document, config: &Rc<DetectorConfig>) -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let period = i32::try_from(config.widget_poll_interval_ms).unwrap_or(i32::MAX);
    let timer_id = Rc::new(Cell::new(None::<i32>));
    let attempts = Cell::new(0_u32);
    let config = Rc::clone(config);

    let tick = {
        let window = window.clone();
        let timer_id = Rc::clone(&timer_id);
        Closure::<dyn FnMut()>::new(move || {
            attempts.set(attempts.get().saturating_add(1));
            let widget = document.query_selector(&config.widget_selector).ok().flatten();
            let exhausted = config
                .widget_poll_max_attempts
                .is_some_and(|max| attempts.get() >= max);
            if widget.is_none() && !exhausted {
                return;
            }
            if let Some(id) = timer_id.take() {
                window.clear_interval_with_handle(id);
            }
            match widget {
                Some(widget) => {
                    info!("translation widget found after {} checks", attempts.get());
                    if let Err(err) = listen_widget(&window, &widget, &config) {
                        warn!("could not listen to the translation widget: {err:?}");
                    }
                }
                None => debug!("translation widget not found after {} checks; giving up", attempts.get()),
            }
        })
    };
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), period)?;
    timer_id.set(Some(id));
    tick.forget();
    Ok(())
}

fn listen_widget(window: &web_sys::Window, widget: &web_sys::Element, config: &Rc<DetectorConfig>) -> Result<(), JsValue> {
    let delay = i32::try_from(config.widget_settle_delay_ms).unwrap_or(i32::MAX);
    let on_change = {
        let window = window.clone();
        let config = Rc::clone(config);
        Closure::<dyn FnMut()>::new(move || {
            let config = Rc::clone(&config);
            let settled = Closure::once_into_js(move || run_update(&config));
            let scheduled = settled
                .dyn_ref::<Function>()
                .map(|callback| window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay));
            if let Some(Err(err)) = scheduled {
                warn!("could not schedule direction update: {err:?}");
            }
        })
    };
    widget.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}

fn initialize(config: &Rc<DetectorConfig>) -> Result<(), JsValue> {
    let document = WebDocument::current().map_err(|err| JsValue::from_str(&err.to_string()))?;
    run_update(config);
    observe_lang(&document.document, config)?;
    poll_widget(document.document, config)?;
    info!("direction detection started");
    Ok(())
}

/// Start following the page language.
///
/// `config_json` is an optional, possibly partial, JSON [`DetectorConfig`].
/// While the document is still loading, setup waits for `DOMContentLoaded`.
///
/// # Errors
/// Throws when the configuration is invalid or there is no window document.
#[wasm_bindgen(js_name = startRtlDetection)]
pub fn start_rtl_detection(config_json: Option<String>) -> Result<(), JsValue> {
    console::install();
    let config = match config_json.as_deref() {
        Some(json) => DetectorConfig::from_json(json),
        None => Ok(DetectorConfig::default()),
    }
    .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let config = Rc::new(config);
    let document = WebDocument::current().map_err(|err| JsValue::from_str(&err.to_string()))?;
    STARTED_CONFIG.with_borrow_mut(|started| *started = Some(Rc::clone(&config)));

    if document.document.ready_state() == "loading" {
        debug!("document still loading; deferring direction detection");
        let on_ready = Closure::once_into_js(move || {
            if let Err(err) = initialize(&config) {
                warn!("direction detection failed to start: {err:?}");
            }
        });
        document
            .document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
        return Ok(());
    }
    initialize(&config)
}

/// Recompute and apply the direction once.
///
/// Uses the configuration `startRtlDetection` was given, or the defaults when
/// detection was never started.
#[wasm_bindgen(js_name = updateTextDirection)]
pub fn update_text_direction_now() {
    run_update(&active_config());
}
