//! Diagnostics for the lumen engine.
//!
//! Two channels report problems with a program:
//! - static conflicts, found by analysis (`E2xxx`, plus `W2xxx` warnings)
//! - runtime exceptions, produced when evaluation halts (`E6xxx`)
//!
//! Both are converted to a [`Diagnostic`] whose labels point at syntax
//! nodes. The engine attaches no language-specific text of its own: every
//! message starts life as a [`Template`] (a key plus arguments) and is
//! rendered by a caller-supplied [`TemplateFormatter`].

mod diagnostic;
mod error_code;
mod template;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use template::{KeyFormatter, Template, TemplateArg, TemplateFormatter};
