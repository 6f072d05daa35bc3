//! Page template loading and rendering via `minijinja`.
//!
//! Templates are read from the configured directory once at startup, so
//! a missing or broken template fails the boot rather than the first
//! request that needs it. Names ending in `.html` are auto-escaped.

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use crate::error::WebError;

/// Every template the application renders.
pub const TEMPLATE_NAMES: &[&str] = &[
    "base.html",
    "home.html",
    "register.html",
    "login.html",
    "dashboard.html",
    "student_form.html",
    "student.html",
    "courses.html",
];

/// The loaded template set.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Load all of [`TEMPLATE_NAMES`] from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] if a file is missing or does not
    /// parse.
    pub fn from_dir(dir: &Path) -> Result<Self, WebError> {
        let mut env = Environment::new();
        for name in TEMPLATE_NAMES {
            let path = dir.join(name);
            let source = std::fs::read_to_string(&path).map_err(|e| {
                WebError::Template(format!("failed to read {}: {e}", path.display()))
            })?;
            env.add_template_owned(*name, source)
                .map_err(|e| WebError::Template(format!("failed to add {name}: {e}")))?;
        }
        tracing::info!(dir = %dir.display(), count = TEMPLATE_NAMES.len(), "Templates loaded");
        Ok(Self { env })
    }

    /// Render `name` with `context`.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, WebError> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}
