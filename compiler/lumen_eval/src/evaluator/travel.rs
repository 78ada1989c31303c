//! Time travel.
//!
//! Evaluation is deterministic given the notifications applied before each
//! pass, so any earlier state is reached by resetting and replaying the
//! recorded passes rather than by keeping snapshots.

use std::mem;

use rustc_hash::FxHashSet;

use super::Evaluator;
use crate::{EngineError, EngineResult};

impl Evaluator {
    /// The pass currently shown, if it is not the present.
    pub fn viewing(&self) -> Option<usize> {
        self.viewing
    }

    /// Re-run up to the end of `pass`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn replay(&mut self, pass: usize) -> EngineResult<()> {
        let available = self.passes.len();
        if pass >= available {
            return Err(EngineError::NoSuchPass {
                requested: pass,
                available,
            });
        }
        self.rerun(pass, None);
        if available.checked_sub(1) == Some(pass) {
            self.viewing = None;
            let pending = mem::take(&mut self.pending_record);
            for drain in &pending {
                self.apply(drain);
            }
            self.pending_record = pending;
        } else {
            self.viewing = Some(pass);
        }
        Ok(())
    }

    /// Undo the last step, crossing back into the previous pass from the
    /// start of a pass.
    pub fn step_back(&mut self) -> EngineResult<()> {
        let pass = self.viewing.unwrap_or(self.current_pass);
        let Some(target) = self.step_count.checked_sub(1) else {
            let previous = pass.checked_sub(1).ok_or(EngineError::AtBeginning)?;
            self.rerun(previous, None);
            self.viewing = Some(previous);
            return Ok(());
        };
        self.rerun(pass, Some(target));
        self.viewing = Some(pass);
        Ok(())
    }

    /// Replay the last pass and resume reacting to streams.
    pub fn return_to_present(&mut self) -> EngineResult<()> {
        let last = self.passes.len().saturating_sub(1);
        self.replay(last)
    }

    /// Reset, then replay every pass through `pass`, stopping that pass
    /// after `steps` steps if given.
    fn rerun(&mut self, pass: usize, steps: Option<usize>) {
        tracing::debug!(pass, ?steps, "rerun");
        self.reset_state();
        for index in 0..=pass {
            let drains = self
                .passes
                .get(index)
                .map(|record| record.drains.clone())
                .unwrap_or_default();
            // Only the drain that began the pass counts as this pass's
            // change, as it did live.
            let mut changed = FxHashSet::default();
            for drain in &drains {
                changed = self.apply(drain);
            }
            self.current_pass = index;
            self.begin_pass(changed);
            match steps {
                Some(limit) if index == pass => {
                    while self.step_count < limit && self.step() {}
                }
                _ => self.run_to_end(),
            }
        }
    }

    /// Forget everything computed so far; streams go back to their initial
    /// values.
    fn reset_state(&mut self) {
        self.memo.clear();
        self.values.clear();
        self.reactions.clear();
        self.result = None;
        for state in self.streams.values_mut() {
            state.reset();
        }
    }
}
