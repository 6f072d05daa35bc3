//! The seams between the binder and whatever document it runs against.
//!
//! The binder never touches a concrete DOM. It talks to a [`DomHost`]
//! for element lookup and listener registration, to a [`ConfirmPrompt`]
//! for the yes/no dialog, and sees each activation only as a
//! [`ClickEvent`]. The browser implementation lives in `web` (wasm32
//! only); the in-memory [`Page`](crate::page::Page) implements the same
//! traits for tests.

/// An activation event delivered to a click listener.
pub trait ClickEvent {
    /// Cancel the host's default action for this event (form submission,
    /// link navigation).
    fn prevent_default(&mut self);

    /// Whether [`prevent_default`](Self::prevent_default) has been called.
    fn default_prevented(&self) -> bool;
}

/// A click listener registered on an element.
///
/// Listeners receive the event they are dispatched with and must act on
/// that event only.
pub type ClickListener = Box<dyn FnMut(&mut dyn ClickEvent)>;

/// A callback deferred until the document has finished loading.
pub type ReadyCallback = Box<dyn FnOnce()>;

/// The confirmation API could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("confirmation prompt unavailable: {0}")]
pub struct PromptUnavailable(pub String);

/// A blocking yes/no dialog.
pub trait ConfirmPrompt {
    /// Show `message` and return `true` if the user accepted.
    fn confirm(&self, message: &str) -> Result<bool, PromptUnavailable>;
}

/// A document the binder can query and attach listeners to.
pub trait DomHost {
    /// Handle to one element of the document.
    type Element;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Read an attribute, `None` if absent.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Set an attribute, replacing any previous value.
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    /// Register `listener` for `click` events on `element`.
    fn add_click_listener(&self, element: &Self::Element, listener: ClickListener);

    /// Run `callback` once the document structure has loaded.
    ///
    /// If loading has already finished the callback runs immediately.
    fn when_ready(&self, callback: ReadyCallback);
}
