//! The delete-confirmation binding pass.
//!
//! One pass queries every element carrying the delete marker and attaches
//! a click listener that asks for confirmation. A declined confirmation
//! cancels the default action of the event the listener was handed.
//!
//! Bound elements are tagged with [`BOUND_ATTRIBUTE`] so a repeated pass
//! leaves them alone. Elements added after a pass are never bound; there
//! is no delegation and no mutation observation.

use std::rc::Rc;

use crate::host::{ClickEvent, ConfirmPrompt, DomHost};

/// Selector for elements that trigger a deletion.
pub const DELETE_SELECTOR: &str = ".delete-btn";

/// Text shown in the confirmation dialog.
pub const CONFIRM_MESSAGE: &str = "Are you sure you want to delete this student?";

/// Attribute marking an element whose listener is already attached.
pub const BOUND_ATTRIBUTE: &str = "data-delete-confirm";

/// Value written to [`BOUND_ATTRIBUTE`].
const BOUND_VALUE: &str = "bound";

/// What a binding pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Elements matching [`DELETE_SELECTOR`].
    pub matched: usize,
    /// Elements that received a listener in this pass.
    pub bound: usize,
    /// Matching elements skipped because an earlier pass bound them.
    pub already_bound: usize,
}

/// Attach a confirmation listener to every delete element in `host`.
///
/// Each element present now gets exactly one listener, across any number
/// of calls.
pub fn bind_delete_confirmations<H, P>(host: &H, prompt: &Rc<P>) -> BindReport
where
    H: DomHost,
    P: ConfirmPrompt + 'static,
{
    let mut report = BindReport::default();

    for element in host.query_selector_all(DELETE_SELECTOR) {
        report.matched = report.matched.saturating_add(1);

        if host.attribute(&element, BOUND_ATTRIBUTE).is_some() {
            report.already_bound = report.already_bound.saturating_add(1);
            continue;
        }

        let prompt = Rc::clone(prompt);
        host.add_click_listener(
            &element,
            Box::new(move |event: &mut dyn ClickEvent| {
                confirm_delete(prompt.as_ref(), event);
            }),
        );
        host.set_attribute(&element, BOUND_ATTRIBUTE, BOUND_VALUE);
        report.bound = report.bound.saturating_add(1);
    }

    tracing::debug!(
        matched = report.matched,
        bound = report.bound,
        already_bound = report.already_bound,
        "Delete confirmations bound"
    );

    report
}

/// Defer [`bind_delete_confirmations`] until `host` reports its document
/// ready.
pub fn initialize_on_ready<H, P>(host: Rc<H>, prompt: Rc<P>)
where
    H: DomHost + 'static,
    P: ConfirmPrompt + 'static,
{
    let target = Rc::clone(&host);
    host.when_ready(Box::new(move || {
        bind_delete_confirmations(target.as_ref(), &prompt);
    }));
}

/// Listener body: ask, and cancel `event` when the answer is no.
///
/// An unusable prompt leaves the default action alone.
pub fn confirm_delete(prompt: &dyn ConfirmPrompt, event: &mut dyn ClickEvent) {
    match prompt.confirm(CONFIRM_MESSAGE) {
        Ok(true) => {}
        Ok(false) => {
            event.prevent_default();
            tracing::debug!("Deletion declined, default action cancelled");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Leaving default action in place");
        }
    }
}
