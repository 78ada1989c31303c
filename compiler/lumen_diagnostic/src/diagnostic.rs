//! Core diagnostic types.
//!
//! Defines [`Diagnostic`], [`Label`] and [`Severity`]. Labels point at syntax
//! nodes rather than text spans, since the engine never sees source text.

use std::fmt;

use lumen_ir::NodeId;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A node with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub node: NodeId,
    pub message: String,
    /// Whether this is the node the problem is at, as opposed to a
    /// contributing cause.
    pub is_primary: bool,
}

impl Label {
    pub fn primary(node: NodeId, message: impl Into<String>) -> Self {
        Label {
            node,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(node: NodeId, message: impl Into<String>) -> Self {
        Label {
            node,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rendered diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main message.
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the node the problem is at.
    pub fn with_label(mut self, node: NodeId, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(node, message));
        self
    }

    /// Add a secondary label for a contributing node.
    pub fn with_secondary_label(mut self, node: NodeId, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(node, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The first primary label's node.
    pub fn primary_node(&self) -> Option<NodeId> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.node)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {marker} {}: {}", label.node, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}
