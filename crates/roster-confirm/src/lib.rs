//! Delete-confirmation binder for the Roster dashboard.
//!
//! Every element with the `delete-btn` class gets a click listener that
//! asks "Are you sure you want to delete this student?" and cancels the
//! click's default action (submitting the delete form) when the user
//! says no.
//!
//! # Modules
//!
//! - [`host`] -- Traits the binder runs against (document, prompt, event)
//! - [`binder`] -- The binding pass and the listener body
//! - [`page`] -- In-memory document and scripted prompt
//! - `web` -- Browser implementation and the exported `initialize()`
//!   (wasm32 only)
//!
//! # Usage
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use roster_confirm::page::{ElementSpec, Page, ScriptedPrompt};
//! use roster_confirm::bind_delete_confirmations;
//!
//! let page = Page::new();
//! let form = page.add_form("/delete_student/1");
//! let button = page.append(ElementSpec::button().class("delete-btn").in_form(form));
//!
//! let prompt = Rc::new(ScriptedPrompt::new());
//! let report = bind_delete_confirmations(&page, &prompt);
//! assert_eq!(report.bound, 1);
//!
//! prompt.enqueue(false);
//! assert!(page.click(button).default_prevented);
//! ```

pub mod binder;
pub mod host;
pub mod page;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export primary types for convenience.
pub use binder::{
    BOUND_ATTRIBUTE, BindReport, CONFIRM_MESSAGE, DELETE_SELECTOR, bind_delete_confirmations,
    confirm_delete, initialize_on_ready,
};
pub use host::{ClickEvent, ClickListener, ConfirmPrompt, DomHost, PromptUnavailable};
