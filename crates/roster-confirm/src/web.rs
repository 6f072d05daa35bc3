//! Browser bindings: the DOM behind the host traits, and the
//! `initialize` export.
//!
//! Only compiled for `wasm32`. The page bootstraps the module and calls
//! `initialize()` exactly once; nothing runs at module instantiation.

#![allow(unsafe_code)] // wasm-bindgen import/export glue

use std::rc::Rc;

use js_sys::{Array, Function};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

use crate::binder::initialize_on_ready;
use crate::host::{
    ClickEvent, ClickListener, ConfirmPrompt, DomHost, PromptUnavailable, ReadyCallback,
};

/// `document.readyState` while the parser is still running.
const READY_STATE_LOADING: &str = "loading";

#[wasm_bindgen]
extern "C" {
    type Window;

    #[wasm_bindgen(method, getter)]
    fn document(this: &Window) -> Option<Document>;

    #[wasm_bindgen(method, catch)]
    fn confirm(this: &Window, message: &str) -> Result<bool, JsValue>;

    type Document;

    #[wasm_bindgen(method, getter, js_name = readyState)]
    fn ready_state(this: &Document) -> String;

    #[wasm_bindgen(method, catch, js_name = querySelectorAll)]
    fn query_selector_all(this: &Document, selectors: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addEventListener)]
    fn add_document_listener(
        this: &Document,
        kind: &str,
        listener: &Function,
    ) -> Result<(), JsValue>;

    type Element;

    #[wasm_bindgen(method, js_name = getAttribute)]
    fn get_attribute(this: &Element, name: &str) -> Option<String>;

    #[wasm_bindgen(method, catch, js_name = setAttribute)]
    fn set_attribute(this: &Element, name: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addEventListener)]
    fn add_event_listener(this: &Element, kind: &str, listener: &Function) -> Result<(), JsValue>;

    type Event;

    #[wasm_bindgen(method, js_name = preventDefault)]
    fn prevent_default(this: &Event);

    #[wasm_bindgen(method, getter, js_name = defaultPrevented)]
    fn default_prevented(this: &Event) -> bool;
}

/// The live `document`.
struct BrowserDocument {
    document: Document,
}

struct BrowserEvent(Event);

impl ClickEvent for BrowserEvent {
    fn prevent_default(&mut self) {
        self.0.prevent_default();
    }

    fn default_prevented(&self) -> bool {
        self.0.default_prevented()
    }
}

impl DomHost for BrowserDocument {
    type Element = Element;

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(selector, error = ?e, "querySelectorAll failed");
                return Vec::new();
            }
        };
        // Array.from snapshots the NodeList in document order.
        Array::from(&list)
            .iter()
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(e) = element.set_attribute(name, value) {
            tracing::warn!(name, error = ?e, "setAttribute failed");
        }
    }

    fn add_click_listener(&self, element: &Element, mut listener: ClickListener) {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let mut event = BrowserEvent(event);
            listener(&mut event);
        });
        if let Err(e) = element.add_event_listener("click", closure.as_ref().unchecked_ref()) {
            tracing::warn!(error = ?e, "addEventListener failed");
            return;
        }
        // The listener lives as long as the page.
        closure.forget();
    }

    fn when_ready(&self, callback: ReadyCallback) {
        if self.document.ready_state() != READY_STATE_LOADING {
            callback();
            return;
        }
        let once = Closure::once_into_js(move || callback());
        if let Err(e) = self
            .document
            .add_document_listener("DOMContentLoaded", once.unchecked_ref())
        {
            tracing::warn!(error = ?e, "Could not wait for DOMContentLoaded");
        }
    }
}

/// `window.confirm`.
struct WindowPrompt {
    window: Window,
}

impl ConfirmPrompt for WindowPrompt {
    fn confirm(&self, message: &str) -> Result<bool, PromptUnavailable> {
        self.window
            .confirm(message)
            .map_err(|e| PromptUnavailable(format!("{e:?}")))
    }
}

/// Bind delete confirmations on the current page.
///
/// Runs the binding pass once the document structure has loaded, or
/// straight away if it already has. Does nothing outside a window
/// context.
#[wasm_bindgen]
pub fn initialize() {
    let Ok(window) = js_sys::global().dyn_into::<Window>() else {
        tracing::warn!("No window; delete confirmations not bound");
        return;
    };
    let Some(document) = window.document() else {
        tracing::warn!("No document; delete confirmations not bound");
        return;
    };
    initialize_on_ready(
        Rc::new(BrowserDocument { document }),
        Rc::new(WindowPrompt { window }),
    );
}
