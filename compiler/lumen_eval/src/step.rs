//! Steps: the atomic units of execution.
//!
//! A node compiles to a flat run of steps. Composite nodes are bracketed by
//! `Start` and `Finish`; single-step nodes compile to `StartFinish` or
//! `Literal`. Jumps are relative: a jump with offset `n` at index `i`
//! continues at `i + 1 + n`.

use std::fmt;

use lumen_diagnostic::Template;
use lumen_ir::{NodeId, NodeRef};
use lumen_values::{Exception, Value};

#[derive(Clone, Debug)]
pub enum Step {
    /// Enter a composite node. `skip` is the number of steps that follow up
    /// to and including the node's `Finish`, so a reused node continues at
    /// `pc + 1 + skip`.
    Start { node: NodeRef, skip: usize },
    /// Pop the node's operands and push its value.
    Finish { node: NodeRef },
    /// A node evaluated in one step: references, definitions and borrows.
    StartFinish { node: NodeRef },
    Literal { node: NodeRef, value: Value },
    Jump { node: NodeRef, offset: usize },
    /// Pop a condition and jump if it is false.
    JumpIfFalse { node: NodeRef, offset: usize },
    /// Jump if the reaction `node` already has a value.
    JumpIfPrimed { node: NodeRef, offset: usize },
    /// Push the latest value of `reaction`.
    Latest { node: NodeRef, reaction: NodeId },
    /// Push the stream `node` names, rather than its latest value.
    Stream { node: NodeRef },
    /// Build a structure from the inputs bound in the current frame.
    Construct { node: NodeRef },
    Halt { node: NodeRef, exception: Exception },
}

impl Step {
    /// The node this step belongs to.
    pub fn node(&self) -> &NodeRef {
        match self {
            Step::Start { node, .. }
            | Step::Finish { node }
            | Step::StartFinish { node }
            | Step::Literal { node, .. }
            | Step::Jump { node, .. }
            | Step::JumpIfFalse { node, .. }
            | Step::JumpIfPrimed { node, .. }
            | Step::Latest { node, .. }
            | Step::Stream { node }
            | Step::Construct { node }
            | Step::Halt { node, .. } => node,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Step::Start { .. } => "step.start",
            Step::Finish { .. } => "step.finish",
            Step::StartFinish { .. } => "step.evaluate",
            Step::Literal { .. } => "step.literal",
            Step::Jump { .. } => "step.jump",
            Step::JumpIfFalse { .. } => "step.jump-if-false",
            Step::JumpIfPrimed { .. } => "step.jump-if-primed",
            Step::Latest { .. } => "step.latest",
            Step::Stream { .. } => "step.stream",
            Step::Construct { .. } => "step.construct",
            Step::Halt { .. } => "step.halt",
        }
    }

    /// What this step does, for a stepping UI. The first argument is always
    /// the node.
    pub fn explanation(&self) -> Template {
        let template = Template::new(self.key()).arg(self.node().id());
        match self {
            Step::Literal { value, .. } => template.text(value.to_string()),
            Step::Jump { offset, .. }
            | Step::JumpIfFalse { offset, .. }
            | Step::JumpIfPrimed { offset, .. } => template.arg(*offset as f64),
            Step::Latest { reaction, .. } => template.arg(*reaction),
            Step::Halt { exception, .. } => template.text(exception.kind.key()),
            _ => template.text(self.node().label()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        match self {
            Step::Start { skip, .. } => write!(f, "start {} {} skip {skip}", node.id(), node.label()),
            Step::Finish { .. } => write!(f, "finish {} {}", node.id(), node.label()),
            Step::StartFinish { .. } => write!(f, "evaluate {} {}", node.id(), node.label()),
            Step::Literal { value, .. } => write!(f, "literal {} {value}", node.id()),
            Step::Jump { offset, .. } => write!(f, "jump +{offset}"),
            Step::JumpIfFalse { offset, .. } => write!(f, "jump if false +{offset}"),
            Step::JumpIfPrimed { offset, .. } => write!(f, "jump if primed +{offset}"),
            Step::Latest { reaction, .. } => write!(f, "latest {reaction}"),
            Step::Stream { .. } => write!(f, "stream {}", node.id()),
            Step::Construct { .. } => write!(f, "construct {}", node.id()),
            Step::Halt { exception, .. } => write!(f, "halt {exception}"),
        }
    }
}

#[cfg(test)]
mod tests;
