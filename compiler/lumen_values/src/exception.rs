//! Runtime exceptions.
//!
//! A halted evaluation produces an [`Exception`] as its value. It carries
//! enough context for a host to render a message without re-running
//! analysis.

use std::fmt;

use lumen_diagnostic::{Diagnostic, ErrorCode, Template, TemplateFormatter};
use lumen_ir::{Name, NodeId};
use lumen_types::Type;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    NameUnbound,
    TypeMismatch,
    StepLimit,
    FunctionLimit,
    Cycle,
    Placeholder,
    Unparsable,
    ValueExpected,
}

impl ExceptionKind {
    pub fn error_code(self) -> ErrorCode {
        match self {
            ExceptionKind::NameUnbound => ErrorCode::E6001,
            ExceptionKind::TypeMismatch => ErrorCode::E6002,
            ExceptionKind::StepLimit => ErrorCode::E6003,
            ExceptionKind::FunctionLimit => ErrorCode::E6004,
            ExceptionKind::Cycle => ErrorCode::E6005,
            ExceptionKind::Placeholder => ErrorCode::E6006,
            ExceptionKind::Unparsable => ErrorCode::E6007,
            ExceptionKind::ValueExpected => ErrorCode::E6008,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ExceptionKind::NameUnbound => "exception.name-unbound",
            ExceptionKind::TypeMismatch => "exception.type-mismatch",
            ExceptionKind::StepLimit => "exception.step-limit",
            ExceptionKind::FunctionLimit => "exception.function-limit",
            ExceptionKind::Cycle => "exception.cycle",
            ExceptionKind::Placeholder => "exception.placeholder",
            ExceptionKind::Unparsable => "exception.unparsable",
            ExceptionKind::ValueExpected => "exception.value-expected",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Exception {
    pub kind: ExceptionKind,
    /// The node that was being evaluated.
    pub node: NodeId,
    pub name: Option<Name>,
    pub expected: Option<Type>,
    pub given: Option<Type>,
    pub limit: Option<usize>,
}

impl Exception {
    fn new(kind: ExceptionKind, node: NodeId) -> Self {
        Exception {
            kind,
            node,
            name: None,
            expected: None,
            given: None,
            limit: None,
        }
    }

    #[cold]
    pub fn name_unbound(node: NodeId, name: Name) -> Self {
        Exception {
            name: Some(name),
            ..Exception::new(ExceptionKind::NameUnbound, node)
        }
    }

    #[cold]
    pub fn type_mismatch(node: NodeId, expected: Type, given: Type) -> Self {
        Exception {
            expected: Some(expected),
            given: Some(given),
            ..Exception::new(ExceptionKind::TypeMismatch, node)
        }
    }

    #[cold]
    pub fn step_limit(node: NodeId, limit: usize) -> Self {
        Exception {
            limit: Some(limit),
            ..Exception::new(ExceptionKind::StepLimit, node)
        }
    }

    #[cold]
    pub fn function_limit(node: NodeId, limit: usize) -> Self {
        Exception {
            limit: Some(limit),
            ..Exception::new(ExceptionKind::FunctionLimit, node)
        }
    }

    #[cold]
    pub fn cycle(node: NodeId, name: Option<Name>) -> Self {
        Exception {
            name,
            ..Exception::new(ExceptionKind::Cycle, node)
        }
    }

    #[cold]
    pub fn placeholder(node: NodeId) -> Self {
        Exception::new(ExceptionKind::Placeholder, node)
    }

    #[cold]
    pub fn unparsable(node: NodeId) -> Self {
        Exception::new(ExceptionKind::Unparsable, node)
    }

    #[cold]
    pub fn value_expected(node: NodeId) -> Self {
        Exception::new(ExceptionKind::ValueExpected, node)
    }

    pub fn error_code(&self) -> ErrorCode {
        self.kind.error_code()
    }

    /// Message template: the kind's key, the node, then whichever of name,
    /// expected type, given type and limit are present.
    pub fn template(&self) -> Template {
        let mut template = Template::new(self.kind.key()).arg(self.node);
        if let Some(name) = self.name {
            template = template.arg(name);
        }
        if let Some(expected) = &self.expected {
            template = template.ty(expected);
        }
        if let Some(given) = &self.given {
            template = template.ty(given);
        }
        if let Some(limit) = self.limit {
            template = template.arg(limit as f64);
        }
        template
    }

    pub fn to_diagnostic(&self, formatter: &dyn TemplateFormatter) -> Diagnostic {
        let message = formatter.format(&self.template());
        Diagnostic::error(self.error_code())
            .with_message(message.clone())
            .with_label(self.node, message)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.kind)
    }
}

#[cfg(test)]
mod tests;
