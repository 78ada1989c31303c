//! Static conflicts.
//!
//! A conflict names the node where a problem is, optionally a second node
//! that contributes to it, and a message template for each. Conflicts never
//! stop analysis; they accumulate in a [`ConflictSet`].

use rustc_hash::FxHashMap;

use lumen_diagnostic::{Diagnostic, ErrorCode, Template, TemplateFormatter};
use lumen_ir::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A bind's value does not match its declared type.
    IncompatibleBind,
    DuplicateName,
    /// A bind's value refers to the name being bound.
    ReferenceCycle,
    BorrowCycle,
    UnknownBorrow,
    UnknownName,
    NotAMap,
    NotAList,
    NotAListIndex,
    NotAFunction,
    NotAStream,
    NotAStreamIndex,
    IncompatibleInput,
    MissingInput,
    UnexpectedInput,
    ExpectedBooleanCondition,
    ExpectedEndingExpression,
    NoExpression,
    /// Operators of different precedence mixed without grouping.
    OrderOfOperations,
    Placeholder,
    UnparsableConflict,
}

impl ConflictKind {
    pub fn error_code(self) -> ErrorCode {
        match self {
            ConflictKind::IncompatibleBind => ErrorCode::E2001,
            ConflictKind::DuplicateName => ErrorCode::E2002,
            ConflictKind::ReferenceCycle => ErrorCode::E2003,
            ConflictKind::BorrowCycle => ErrorCode::E2004,
            ConflictKind::UnknownBorrow => ErrorCode::E2005,
            ConflictKind::UnknownName => ErrorCode::E2006,
            ConflictKind::NotAMap => ErrorCode::E2007,
            ConflictKind::NotAList => ErrorCode::E2008,
            ConflictKind::NotAListIndex => ErrorCode::E2009,
            ConflictKind::NotAFunction => ErrorCode::E2010,
            ConflictKind::NotAStream => ErrorCode::E2011,
            ConflictKind::NotAStreamIndex => ErrorCode::E2012,
            ConflictKind::IncompatibleInput => ErrorCode::E2013,
            ConflictKind::MissingInput => ErrorCode::E2014,
            ConflictKind::UnexpectedInput => ErrorCode::E2015,
            ConflictKind::ExpectedBooleanCondition => ErrorCode::E2016,
            ConflictKind::ExpectedEndingExpression => ErrorCode::E2017,
            ConflictKind::NoExpression => ErrorCode::E2018,
            ConflictKind::Placeholder => ErrorCode::E2019,
            ConflictKind::UnparsableConflict => ErrorCode::E2020,
            ConflictKind::OrderOfOperations => ErrorCode::W2001,
        }
    }

    /// Minor conflicts are warnings; the program means what it says.
    pub fn is_minor(self) -> bool {
        matches!(self, ConflictKind::OrderOfOperations)
    }

    /// Template key prefix, e.g. `conflict.incompatible-bind`.
    pub fn key(self) -> &'static str {
        match self {
            ConflictKind::IncompatibleBind => "conflict.incompatible-bind",
            ConflictKind::DuplicateName => "conflict.duplicate-name",
            ConflictKind::ReferenceCycle => "conflict.reference-cycle",
            ConflictKind::BorrowCycle => "conflict.borrow-cycle",
            ConflictKind::UnknownBorrow => "conflict.unknown-borrow",
            ConflictKind::UnknownName => "conflict.unknown-name",
            ConflictKind::NotAMap => "conflict.not-a-map",
            ConflictKind::NotAList => "conflict.not-a-list",
            ConflictKind::NotAListIndex => "conflict.not-a-list-index",
            ConflictKind::NotAFunction => "conflict.not-a-function",
            ConflictKind::NotAStream => "conflict.not-a-stream",
            ConflictKind::NotAStreamIndex => "conflict.not-a-stream-index",
            ConflictKind::IncompatibleInput => "conflict.incompatible-input",
            ConflictKind::MissingInput => "conflict.missing-input",
            ConflictKind::UnexpectedInput => "conflict.unexpected-input",
            ConflictKind::ExpectedBooleanCondition => "conflict.expected-boolean-condition",
            ConflictKind::ExpectedEndingExpression => "conflict.expected-ending-expression",
            ConflictKind::NoExpression => "conflict.no-expression",
            ConflictKind::OrderOfOperations => "conflict.order-of-operations",
            ConflictKind::Placeholder => "conflict.placeholder",
            ConflictKind::UnparsableConflict => "conflict.unparsable",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub primary: NodeId,
    pub primary_message: Template,
    pub secondary: Option<(NodeId, Template)>,
}

impl Conflict {
    pub fn new(kind: ConflictKind, primary: NodeId, primary_message: Template) -> Self {
        Conflict {
            kind,
            primary,
            primary_message,
            secondary: None,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, node: NodeId, message: Template) -> Self {
        self.secondary = Some((node, message));
        self
    }

    pub fn is_minor(&self) -> bool {
        self.kind.is_minor()
    }

    /// Render through `formatter`.
    pub fn to_diagnostic(&self, formatter: &dyn TemplateFormatter) -> Diagnostic {
        let code = self.kind.error_code();
        let diagnostic = if self.is_minor() {
            Diagnostic::warning(code)
        } else {
            Diagnostic::error(code)
        };
        let primary = formatter.format(&self.primary_message);
        let mut diagnostic = diagnostic
            .with_message(primary.clone())
            .with_label(self.primary, primary);
        if let Some((node, message)) = &self.secondary {
            diagnostic = diagnostic.with_secondary_label(*node, formatter.format(message));
        }
        diagnostic
    }
}

/// Conflicts of one analysis, in tree pre-order, indexed by node.
///
/// A conflict is indexed under both its primary and its secondary node.
#[derive(Clone, Debug, Default)]
pub struct ConflictSet {
    conflicts: Vec<Conflict>,
    by_node: FxHashMap<NodeId, Vec<usize>>,
}

impl ConflictSet {
    pub fn new() -> Self {
        ConflictSet::default()
    }

    pub fn push(&mut self, conflict: Conflict) {
        let index = self.conflicts.len();
        self.by_node.entry(conflict.primary).or_default().push(index);
        if let Some((secondary, _)) = &conflict.secondary {
            if *secondary != conflict.primary {
                self.by_node.entry(*secondary).or_default().push(index);
            }
        }
        self.conflicts.push(conflict);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts involving `node`, as primary or secondary.
    pub fn for_node(&self, node: NodeId) -> impl Iterator<Item = &Conflict> {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&index| &self.conflicts[index])
    }

    pub fn count(&self, kind: ConflictKind) -> usize {
        self.conflicts.iter().filter(|c| c.kind == kind).count()
    }

    /// Whether any conflict is more than a warning.
    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(|c| !c.is_minor())
    }

    pub fn kinds(&self) -> Vec<ConflictKind> {
        self.conflicts.iter().map(|c| c.kind).collect()
    }

    pub fn to_diagnostics(&self, formatter: &dyn TemplateFormatter) -> Vec<Diagnostic> {
        self.conflicts
            .iter()
            .map(|c| c.to_diagnostic(formatter))
            .collect()
    }
}

impl Extend<Conflict> for ConflictSet {
    fn extend<I: IntoIterator<Item = Conflict>>(&mut self, iter: I) {
        for conflict in iter {
            self.push(conflict);
        }
    }
}

impl<'a> IntoIterator for &'a ConflictSet {
    type Item = &'a Conflict;
    type IntoIter = std::slice::Iter<'a, Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.conflicts.iter()
    }
}
