//! Message templates.
//!
//! Conflicts, exceptions and step explanations describe themselves as a
//! template key plus arguments. Turning that into prose (and into which
//! language) is the caller's business, through [`TemplateFormatter`].

use std::fmt;
use std::sync::Arc;

use lumen_ir::{Name, NodeId};

/// One template argument.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateArg {
    /// A syntax node the message refers to.
    Node(NodeId),
    /// A rendered type, e.g. `#m` or `[""]`.
    Type(String),
    Name(Name),
    Text(Arc<str>),
    Number(f64),
}

impl fmt::Display for TemplateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateArg::Node(id) => write!(f, "{id}"),
            TemplateArg::Type(ty) => f.write_str(ty),
            TemplateArg::Name(name) => write!(f, "{name}"),
            TemplateArg::Text(text) => write!(f, "{text:?}"),
            TemplateArg::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<NodeId> for TemplateArg {
    fn from(id: NodeId) -> Self {
        TemplateArg::Node(id)
    }
}

impl From<Name> for TemplateArg {
    fn from(name: Name) -> Self {
        TemplateArg::Name(name)
    }
}

impl From<f64> for TemplateArg {
    fn from(n: f64) -> Self {
        TemplateArg::Number(n)
    }
}

/// A message key with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub key: &'static str,
    pub args: Vec<TemplateArg>,
}

impl Template {
    pub fn new(key: &'static str) -> Self {
        Template {
            key,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<TemplateArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a rendered type argument.
    #[must_use]
    pub fn ty(mut self, ty: impl fmt::Display) -> Self {
        self.args.push(TemplateArg::Type(ty.to_string()));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.args.push(TemplateArg::Text(text.into()));
        self
    }

    /// Render with `formatter`.
    pub fn render(&self, formatter: &dyn TemplateFormatter) -> String {
        formatter.format(self)
    }
}

/// The opaque `(template, args...) -> text` collaborator.
pub trait TemplateFormatter {
    fn format(&self, template: &Template) -> String;
}

impl<F> TemplateFormatter for F
where
    F: Fn(&Template) -> String,
{
    fn format(&self, template: &Template) -> String {
        self(template)
    }
}

/// Language-neutral fallback: renders `key(arg, arg)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeyFormatter;

impl TemplateFormatter for KeyFormatter {
    fn format(&self, template: &Template) -> String {
        if template.args.is_empty() {
            return template.key.to_owned();
        }
        let args = template
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({args})", template.key)
    }
}

#[cfg(test)]
mod tests;
