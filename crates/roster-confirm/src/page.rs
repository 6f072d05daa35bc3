//! In-memory document used to exercise the binder without a browser.
//!
//! A [`Page`] holds a flat list of elements (tag, classes, attributes,
//! optional owning form or link target), the click listeners registered
//! on them, and a loading/ready lifecycle. [`Page::click`] dispatches a
//! cancelable click to the element's listeners and, unless one of them
//! prevented it, performs the default action and records it.
//!
//! [`ScriptedPrompt`] answers confirmation dialogs from a queue, falling
//! back to a default answer once the queue is empty.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use crate::host::{
    ClickEvent, ClickListener, ConfirmPrompt, DomHost, PromptUnavailable, ReadyCallback,
};

/// Handle to an element of a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

/// Handle to a form of a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormId(usize);

/// Document lifecycle, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; ready callbacks are queued.
    Loading,
    /// Structure loaded; ready callbacks run immediately.
    Interactive,
}

/// Description of an element to append to a [`Page`].
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    form: Option<FormId>,
    href: Option<String>,
}

impl ElementSpec {
    /// An element with the given tag name.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// A `<button>` element.
    pub fn button() -> Self {
        Self::new("button")
    }

    /// An `<a href>` link. Clicking it navigates to `href`.
    pub fn link(href: &str) -> Self {
        let mut link = Self::new("a");
        link.href = Some(href.to_owned());
        link
    }

    /// Add a CSS class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Place the element inside `form`. Clicking it submits the form.
    #[must_use]
    pub const fn in_form(mut self, form: FormId) -> Self {
        self.form = Some(form);
        self
    }
}

/// The default action a click performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultAction {
    /// The owning form was submitted to `action`.
    Submit {
        /// Which form.
        form: FormId,
        /// Form `action` URL.
        action: String,
    },
    /// A link was followed.
    Navigate {
        /// Link target.
        href: String,
    },
}

/// Result of [`Page::click`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Listeners invoked for this click.
    pub listeners_run: usize,
    /// Whether any listener cancelled the default action.
    pub default_prevented: bool,
    /// The default action that ran, if any.
    pub action: Option<DefaultAction>,
}

#[derive(Debug)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    form: Option<FormId>,
    href: Option<String>,
}

#[derive(Debug, Default)]
struct PageEvent {
    default_prevented: bool,
}

impl ClickEvent for PageEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Selector grammar understood by [`Page`]: `tag`, `.class`, `tag.class`.
#[derive(Debug, PartialEq, Eq)]
struct Selector<'s> {
    tag: Option<&'s str>,
    class: Option<&'s str>,
}

impl<'s> Selector<'s> {
    fn parse(raw: &'s str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains(|c: char| c.is_whitespace() || "#[]>,:".contains(c)) {
            return None;
        }
        let (tag, class) = match raw.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (raw, None),
        };
        if class.is_some_and(|c| c.is_empty() || c.contains('.')) {
            return None;
        }
        Some(Self {
            tag: (!tag.is_empty()).then_some(tag),
            class,
        })
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.is_none_or(|t| element.tag.eq_ignore_ascii_case(t))
            && self
                .class
                .is_none_or(|c| element.classes.iter().any(|have| have == c))
    }
}

/// An in-memory document.
///
/// All methods take `&self`; state lives behind [`RefCell`]s so the page
/// can be shared with the binder while a test keeps mutating it.
pub struct Page {
    elements: RefCell<Vec<Element>>,
    forms: RefCell<Vec<String>>,
    listeners: RefCell<BTreeMap<ElementId, Vec<ClickListener>>>,
    ready_state: Cell<ReadyState>,
    ready_callbacks: RefCell<Vec<ReadyCallback>>,
    history: RefCell<Vec<DefaultAction>>,
}

impl Page {
    /// A page whose structure has already loaded.
    pub fn new() -> Self {
        Self::with_state(ReadyState::Interactive)
    }

    /// A page still loading. Call [`Page::finish_loading`] to fire the
    /// ready callbacks.
    pub fn loading() -> Self {
        Self::with_state(ReadyState::Loading)
    }

    fn with_state(state: ReadyState) -> Self {
        Self {
            elements: RefCell::new(Vec::new()),
            forms: RefCell::new(Vec::new()),
            listeners: RefCell::new(BTreeMap::new()),
            ready_state: Cell::new(state),
            ready_callbacks: RefCell::new(Vec::new()),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Current lifecycle state.
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state.get()
    }

    /// Add a form submitting to `action`.
    pub fn add_form(&self, action: &str) -> FormId {
        let mut forms = self.forms.borrow_mut();
        forms.push(action.to_owned());
        FormId(forms.len().saturating_sub(1))
    }

    /// Append an element at the end of the document.
    pub fn append(&self, element: ElementSpec) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        elements.push(Element {
            tag: element.tag,
            classes: element.classes,
            attributes: element.attributes,
            form: element.form,
            href: element.href,
        });
        ElementId(elements.len().saturating_sub(1))
    }

    /// Mark the structure loaded and run every queued ready callback once.
    pub fn finish_loading(&self) {
        if self.ready_state.replace(ReadyState::Interactive) == ReadyState::Interactive {
            return;
        }
        let callbacks = std::mem::take(&mut *self.ready_callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    /// Number of click listeners registered on `element`.
    pub fn listener_count(&self, element: ElementId) -> usize {
        self.listeners.borrow().get(&element).map_or(0, Vec::len)
    }

    /// Every default action performed so far, oldest first.
    pub fn history(&self) -> Vec<DefaultAction> {
        self.history.borrow().clone()
    }

    /// Read an attribute of `element`.
    pub fn get_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.elements
            .borrow()
            .get(element.0)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    /// Dispatch a click on `element`.
    ///
    /// Listeners run in registration order with one shared event. If none
    /// prevented it, the element's default action runs: submitting its
    /// form, or following its link.
    pub fn click(&self, element: ElementId) -> ClickOutcome {
        // Listeners are taken out for the dispatch so they may call back
        // into the page without a double borrow.
        let mut listeners = self
            .listeners
            .borrow_mut()
            .remove(&element)
            .unwrap_or_default();

        let mut event = PageEvent::default();
        for listener in &mut listeners {
            listener(&mut event);
        }
        let listeners_run = listeners.len();

        {
            let mut registry = self.listeners.borrow_mut();
            let slot = registry.entry(element).or_default();
            listeners.append(slot);
            *slot = listeners;
        }

        let action = if event.default_prevented {
            None
        } else {
            self.default_action(element)
        };
        if let Some(action) = &action {
            self.history.borrow_mut().push(action.clone());
        }

        ClickOutcome {
            listeners_run,
            default_prevented: event.default_prevented,
            action,
        }
    }

    fn default_action(&self, element: ElementId) -> Option<DefaultAction> {
        let elements = self.elements.borrow();
        let el = elements.get(element.0)?;
        if let Some(href) = &el.href {
            return Some(DefaultAction::Navigate { href: href.clone() });
        }
        let form = el.form?;
        let action = self.forms.borrow().get(form.0)?.clone();
        Some(DefaultAction::Submit { form, action })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl DomHost for Page {
    type Element = ElementId;

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let Some(selector) = Selector::parse(selector) else {
            tracing::warn!(selector, "Unsupported selector");
            return Vec::new();
        };
        self.elements
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, el)| selector.matches(el))
            .map(|(idx, _)| ElementId(idx))
            .collect()
    }

    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.get_attribute(*element, name)
    }

    fn set_attribute(&self, element: &ElementId, name: &str, value: &str) {
        if let Some(el) = self.elements.borrow_mut().get_mut(element.0) {
            el.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn add_click_listener(&self, element: &ElementId, listener: ClickListener) {
        self.listeners
            .borrow_mut()
            .entry(*element)
            .or_default()
            .push(listener);
    }

    fn when_ready(&self, callback: ReadyCallback) {
        match self.ready_state.get() {
            ReadyState::Interactive => callback(),
            ReadyState::Loading => self.ready_callbacks.borrow_mut().push(callback),
        }
    }
}

/// A confirmation prompt that answers from a script.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    default_answer: Cell<bool>,
    unavailable: Cell<bool>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    /// A prompt that declines unless told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next unanswered dialog.
    pub fn enqueue(&self, accept: bool) {
        self.answers.borrow_mut().push_back(accept);
    }

    /// Answer used once the queue is empty.
    pub fn set_default_answer(&self, accept: bool) {
        self.default_answer.set(accept);
    }

    /// Make every subsequent dialog fail as if the API were missing.
    pub fn make_unavailable(&self) {
        self.unavailable.set(true);
    }

    /// Messages shown so far, oldest first.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> Result<bool, PromptUnavailable> {
        if self.unavailable.get() {
            return Err(PromptUnavailable("confirm is not defined".to_owned()));
        }
        self.asked.borrow_mut().push(message.to_owned());
        Ok(self
            .answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.default_answer.get()))
    }
}
