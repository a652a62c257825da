//! Definitional equality of universe levels
//!
//! The entry point is [MetaCtx::is_level_def_eq], which decides whether two levels are equal
//! and solves level metavariables on the way. Constraints which cannot be decided yet because
//! they still contain unassigned metavariables are postponed and retried once more
//! metavariables have been assigned, e.g. `?u =?= imax v ?u`.
//!
//! The answer `true` is therefore optimistic: it means that the constraint holds, or that it has been
//! postponed. [MetaCtx::synthesize_level_constraints] reports postponed constraints which can never be solved.

mod dec;
mod lbool;
mod solve;

#[cfg(test)]
mod test;

use lumen_lang_ast::{Level, Print};

use crate::meta::{MetaCtx, PostponedLevelEq};
use crate::result::{ElabError, ElabResult};
use crate::trace::classes;

pub use lbool::LBool;
pub use solve::{mk_max_args_diff, strict_occurs_max};

impl MetaCtx {
    /// Decide `lhs =?= rhs`, assigning metavariables as needed.
    ///
    /// The check is transactional: if it fails, all assignments made during the check are undone
    /// and the postponed constraints are restored.
    pub fn is_level_def_eq(&mut self, lhs: &Level, rhs: &Level) -> ElabResult<bool> {
        let res = self.checkpoint_def_eq(true, |ctx| ctx.is_level_def_eq_aux(lhs, rhs))?;
        self.add_trace(classes::IS_LEVEL_DEF_EQ, || {
            format!(
                "{} =?= {} ... {}",
                lhs.print_trace(),
                rhs.print_trace(),
                if res { "success" } else { "failure" }
            )
        });
        Ok(res)
    }

    /// Pointwise definitional equality of two lists of levels, as a single transaction.
    pub fn is_level_def_eq_list(&mut self, lhs: &[Level], rhs: &[Level]) -> ElabResult<bool> {
        if lhs.len() != rhs.len() {
            return Ok(false);
        }
        self.checkpoint_def_eq(true, |ctx| {
            for (l, r) in lhs.iter().zip(rhs) {
                if !ctx.is_level_def_eq_aux(l, r)? {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }

    /// Run `f` and process the constraints it postponed. If `f` fails, the state is restored.
    /// Constraints postponed before the checkpoint are not retried.
    fn checkpoint_def_eq<F>(&mut self, may_postpone: bool, f: F) -> ElabResult<bool>
    where
        F: FnOnce(&mut Self) -> ElabResult<bool>,
    {
        let saved = self.save_state();
        let postponed = self.take_postponed();
        let res = match f(self) {
            Ok(true) => self.process_postponed(may_postpone),
            other => other,
        };
        match res {
            Ok(true) => {
                let mut all = postponed;
                all.extend(self.take_postponed());
                self.set_postponed(all);
                Ok(true)
            }
            Ok(false) => {
                self.restore_state(saved);
                Ok(false)
            }
            Err(err) => {
                self.restore_state(saved);
                Err(err)
            }
        }
    }

    /// The core of [MetaCtx::is_level_def_eq], without the transaction.
    pub fn is_level_def_eq_aux(&mut self, lhs: &Level, rhs: &Level) -> ElabResult<bool> {
        if let (Level::Succ(lhs), Level::Succ(rhs)) = (lhs, rhs) {
            return self.is_level_def_eq_aux(lhs, rhs);
        }
        self.add_trace(classes::STEP, || format!("{} =?= {}", lhs.print_trace(), rhs.print_trace()));

        if lhs.get_level_offset() == rhs.get_level_offset() {
            return Ok(lhs.get_offset() == rhs.get_offset());
        }

        let lhs_norm = self.instantiate_level_mvars(lhs).normalize();
        let rhs_norm = self.instantiate_level_mvars(rhs).normalize();
        if &lhs_norm != lhs || &rhs_norm != rhs {
            return self.is_level_def_eq_aux(&lhs_norm, &rhs_norm);
        }

        let res = self.solve(lhs, rhs)?;
        if !res.is_undef() {
            return Ok(res.to_bool());
        }
        let res = self.solve(rhs, lhs)?;
        if !res.is_undef() {
            return Ok(res.to_bool());
        }

        if !self.has_assignable_level_mvar(lhs)? && !self.has_assignable_level_mvar(rhs)? {
            if self.config().is_def_eq_stuck_ex && (lhs.is_mvar() || rhs.is_mvar()) {
                self.add_trace(classes::STUCK, || {
                    format!("{} =?= {}", lhs.print_trace(), rhs.print_trace())
                });
                return Err(ElabError::def_eq_stuck(lhs, rhs));
            }
            return Ok(false);
        }

        // Only constraints with a metavariable on one side are postponed
        if self.config().allow_postponement && (lhs.is_mvar() || rhs.is_mvar()) {
            self.postpone_is_level_def_eq(lhs, rhs);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Add `lhs =?= rhs` to the postponed constraints.
    pub fn postpone_is_level_def_eq(&mut self, lhs: &Level, rhs: &Level) {
        self.add_trace(classes::STUCK, || format!("{} =?= {}", lhs.print_trace(), rhs.print_trace()));
        let mvar_counter = self.mctx.mvar_counter();
        self.push_postponed(PostponedLevelEq { lhs: lhs.clone(), rhs: rhs.clone(), mvar_counter });
    }

    /// Retry all postponed constraints once. Constraints which are still stuck are postponed again.
    ///
    /// Returns `false` as soon as one of the constraints is refuted. If `exception_on_failure` is set,
    /// a refuted constraint is reported as an error instead.
    fn process_postponed_step(&mut self, exception_on_failure: bool) -> ElabResult<bool> {
        for PostponedLevelEq { lhs, rhs, .. } in self.take_postponed() {
            self.add_trace(classes::POSTPONED, || {
                format!("{} =?= {}", lhs.print_trace(), rhs.print_trace())
            });
            if !self.is_level_def_eq_aux(&lhs, &rhs)? {
                if exception_on_failure {
                    return Err(ElabError::unresolved(&lhs, &rhs));
                }
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn process_postponed_impl(
        &mut self,
        may_postpone: bool,
        exception_on_failure: bool,
    ) -> ElabResult<bool> {
        if self.num_postponed() == 0 {
            return Ok(true);
        }
        let num_postponed_begin = self.num_postponed();
        self.add_trace(classes::POSTPONED, || {
            format!("processing #{num_postponed_begin} postponed is-def-eq level constraints")
        });
        for _ in 0..self.config().max_postponed_rounds {
            let num_postponed = self.num_postponed();
            if num_postponed == 0 {
                return Ok(true);
            }
            if !self.process_postponed_step(exception_on_failure)? {
                return Ok(false);
            }
            let num_postponed_after = self.num_postponed();
            if num_postponed_after == 0 {
                return Ok(true);
            }
            if num_postponed_after >= num_postponed {
                self.add_trace(classes::POSTPONED, || {
                    "no progress solving pending is-def-eq level constraints".to_owned()
                });
                return Ok(may_postpone);
            }
        }
        log::debug!(
            "giving up on {} postponed level constraints after {} rounds",
            self.num_postponed(),
            self.config().max_postponed_rounds
        );
        Ok(may_postpone)
    }

    /// Retry the postponed constraints until all of them are solved or no more progress is made.
    ///
    /// If no progress is made, the result is `may_postpone` and the remaining constraints stay postponed.
    pub fn process_postponed(&mut self, may_postpone: bool) -> ElabResult<bool> {
        self.process_postponed_impl(may_postpone, false)
    }

    /// Solve all postponed constraints. Constraints which cannot be solved are reported as errors.
    pub fn synthesize_level_constraints(&mut self) -> ElabResult {
        if self.process_postponed_impl(false, true)? {
            return Ok(());
        }
        match self.postponed().first() {
            Some(PostponedLevelEq { lhs, rhs, .. }) => Err(ElabError::unresolved(lhs, rhs)),
            None => Ok(()),
        }
    }
}
