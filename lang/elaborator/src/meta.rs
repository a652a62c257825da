use lumen_lang_ast::{LMVarId, Level, MetavarContext, Print};

use crate::config::ElabConfig;
use crate::result::ElabResult;
use crate::trace::TraceRegistry;

/// A level constraint `lhs =?= rhs` which could not be decided yet and is retried later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostponedLevelEq {
    pub lhs: Level,
    pub rhs: Level,
    /// The metavariable counter at the time the constraint was postponed.
    pub mvar_counter: u64,
}

/// A snapshot of the backtrackable part of the elaboration state.
#[derive(Debug, Clone)]
pub struct SavedState {
    mctx: MetavarContext,
    postponed: Vec<PostponedLevelEq>,
}

/// The elaboration state: the metavariable context, the configuration,
/// the worklist of postponed level constraints and the recorded traces.
#[derive(Debug, Clone, Default)]
pub struct MetaCtx {
    pub mctx: MetavarContext,
    config: ElabConfig,
    postponed: Vec<PostponedLevelEq>,
    pub traces: TraceRegistry,
}

impl MetaCtx {
    pub fn new(config: ElabConfig) -> Self {
        Self { config, ..Default::default() }
    }

    pub fn config(&self) -> &ElabConfig {
        &self.config
    }

    pub fn add_trace<F: FnOnce() -> String>(&mut self, class: &str, message: F) {
        self.traces.add(class, message)
    }

    // Level metavariables
    //
    //

    pub fn mk_fresh_level_mvar(&mut self) -> Level {
        Level::mvar(self.mctx.mk_level_mvar())
    }

    pub fn get_level_mvar_depth(&self, mvar: LMVarId) -> ElabResult<u32> {
        Ok(self.mctx.get_level_depth(mvar)?)
    }

    /// A level metavariable is read-only if it was created outside of the current assignable scope,
    /// unless the depth of metavariables is ignored altogether.
    pub fn is_read_only_level_mvar(&self, mvar: LMVarId) -> ElabResult<bool> {
        if self.config.ignore_level_mvar_depth {
            return Ok(false);
        }
        Ok(!self.mctx.is_level_mvar_assignable(mvar)?)
    }

    pub fn has_assignable_level_mvar(&self, level: &Level) -> ElabResult<bool> {
        if self.config.ignore_level_mvar_depth {
            return Ok(level.has_mvar());
        }
        Ok(self.mctx.has_assignable_level_mvar(level)?)
    }

    pub fn instantiate_level_mvars(&mut self, level: &Level) -> Level {
        self.mctx.instantiate_level_mvars(level)
    }

    pub fn is_level_mvar_assigned(&self, mvar: LMVarId) -> bool {
        self.mctx.is_level_mvar_assigned(mvar)
    }

    pub fn get_level_mvar_assignment(&self, mvar: LMVarId) -> Option<&Level> {
        self.mctx.get_level_assignment(mvar)
    }

    pub fn assign_level_mvar(&mut self, mvar: LMVarId, level: Level) -> ElabResult {
        log::trace!("Assigning {} := {}", mvar, level.print_trace());
        Ok(self.mctx.assign_level(mvar, level)?)
    }

    /// Run `f` in a nested scope one depth deeper.
    ///
    /// Unless `allow_level_assignments` is set, level metavariables created outside of the scope
    /// are read-only inside of it. Postponed constraints of the outer scope are not visible inside.
    /// Assignments made inside of the scope are kept, including those of outer metavariables.
    pub fn with_new_mctx_depth<T, F>(&mut self, allow_level_assignments: bool, f: F) -> ElabResult<T>
    where
        F: FnOnce(&mut Self) -> ElabResult<T>,
    {
        let depth = self.mctx.depth;
        let level_assign_depth = self.mctx.level_assign_depth;
        let postponed = self.take_postponed();
        self.mctx.inc_depth(allow_level_assignments);
        let res = f(self);
        self.mctx.depth = depth;
        self.mctx.level_assign_depth = level_assign_depth;
        self.postponed = postponed;
        res
    }

    // Backtracking
    //
    //

    pub fn save_state(&self) -> SavedState {
        SavedState { mctx: self.mctx.clone(), postponed: self.postponed.clone() }
    }

    pub fn restore_state(&mut self, state: SavedState) {
        let SavedState { mctx, postponed } = state;
        self.mctx = mctx;
        self.postponed = postponed;
    }

    // Postponed constraints
    //
    //

    pub fn num_postponed(&self) -> usize {
        self.postponed.len()
    }

    pub fn postponed(&self) -> &[PostponedLevelEq] {
        &self.postponed
    }

    pub fn take_postponed(&mut self) -> Vec<PostponedLevelEq> {
        std::mem::take(&mut self.postponed)
    }

    pub fn set_postponed(&mut self, postponed: Vec<PostponedLevelEq>) {
        self.postponed = postponed;
    }

    pub(crate) fn push_postponed(&mut self, constraint: PostponedLevelEq) {
        self.postponed.push(constraint);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_depth_makes_outer_mvars_read_only() {
        let mut ctx = MetaCtx::default();
        let outer = ctx.mk_fresh_level_mvar();
        let outer_id = outer.mvar_id().unwrap();
        let inner_id = ctx
            .with_new_mctx_depth(false, |ctx| {
                assert!(ctx.is_read_only_level_mvar(outer_id)?);
                let inner = ctx.mk_fresh_level_mvar().mvar_id().unwrap();
                assert!(!ctx.is_read_only_level_mvar(inner)?);
                Ok(inner)
            })
            .unwrap();
        assert!(!ctx.is_read_only_level_mvar(outer_id).unwrap());
        assert_eq!(ctx.get_level_mvar_depth(inner_id).unwrap(), 1);
    }

    #[test]
    fn ignoring_depth_makes_everything_assignable() {
        let mut ctx = MetaCtx::new(ElabConfig { ignore_level_mvar_depth: true, ..Default::default() });
        let outer = ctx.mk_fresh_level_mvar().mvar_id().unwrap();
        ctx.with_new_mctx_depth(false, |ctx| {
            assert!(!ctx.is_read_only_level_mvar(outer)?);
            assert!(ctx.has_assignable_level_mvar(&Level::mvar(outer))?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn nested_assignments_of_outer_mvars_are_kept() {
        let mut ctx = MetaCtx::default();
        let outer = ctx.mk_fresh_level_mvar();
        let outer_id = outer.mvar_id().unwrap();
        let res = ctx
            .with_new_mctx_depth(true, |ctx| {
                assert!(!ctx.is_read_only_level_mvar(outer_id)?);
                ctx.is_level_def_eq(&outer, &Level::one())
            })
            .unwrap();
        assert!(res);
        assert_eq!(ctx.get_level_mvar_assignment(outer_id), Some(&Level::one()));
        assert_eq!(ctx.mctx.depth, 0);
        assert_eq!(ctx.mctx.level_assign_depth, 0);
    }

    #[test]
    fn restore_discards_assignments() {
        let mut ctx = MetaCtx::default();
        let m = ctx.mk_fresh_level_mvar().mvar_id().unwrap();
        let saved = ctx.save_state();
        ctx.assign_level_mvar(m, Level::one()).unwrap();
        assert!(ctx.is_level_mvar_assigned(m));
        ctx.restore_state(saved);
        assert!(!ctx.is_level_mvar_assigned(m));
    }

    #[test]
    fn unknown_mvar_is_an_error() {
        let ctx = MetaCtx::default();
        assert!(ctx.is_read_only_level_mvar(LMVarId(7)).is_err());
    }
}
