//! One-directional solving of level constraints `lhs =?= rhs`
//!
//! [MetaCtx::solve] only ever assigns metavariables occurring on the left-hand side
//! (or, when the depth of metavariables is ignored, a deeper metavariable on the right).
//! Callers try both directions.

use lumen_lang_ast::{LMVarId, Level, Print};

use crate::meta::MetaCtx;
use crate::result::ElabResult;

use super::LBool;

/// Whether `lvl` occurs in an argument of the `max` spine `v`, other than as the argument itself.
///
/// For `?m =?= max ?m u` this is false, and the constraint is solved by `?m := u`.
/// For `?m =?= max (?m+1) u` it is true, and the constraint cannot be solved by an assignment.
pub fn strict_occurs_max(lvl: &Level, v: &Level) -> bool {
    fn visit(lvl: &Level, v: &Level) -> bool {
        match v {
            Level::Max(l, r) => visit(lvl, l) || visit(lvl, r),
            _ => v != lvl && lvl.occurs(v),
        }
    }

    match v {
        Level::Max(l, r) => visit(lvl, l) || visit(lvl, r),
        _ => false,
    }
}

/// The maximum of `acc` and all arguments of the `max` spine `l` other than the metavariable `mvar`.
pub fn mk_max_args_diff(mvar: LMVarId, l: &Level, acc: Level) -> Level {
    match l {
        Level::Max(l1, l2) => {
            let acc = mk_max_args_diff(mvar, l1, acc);
            mk_max_args_diff(mvar, l2, acc)
        }
        Level::MVar(id) if *id == mvar => acc,
        _ => Level::mk_max_simp(acc, l.clone()),
    }
}

impl MetaCtx {
    /// Solve `?m =?= max ... ?m ...` by assigning `?m` the maximum of the other arguments.
    ///
    /// Panics if `v` is not a `max`.
    pub fn solve_self_max(&mut self, mvar: LMVarId, v: &Level) -> ElabResult<Level> {
        assert!(v.is_max(), "solve_self_max: expected a `max` level, got {}", v.print_trace());
        let solution = mk_max_args_diff(mvar, v, Level::Zero);
        self.assign_level_mvar(mvar, solution.clone())?;
        Ok(solution)
    }

    /// Whether `v` is a metavariable created at a greater depth than `mvar`.
    pub fn is_mvar_with_greater_depth(&self, v: &Level, mvar: LMVarId) -> ElabResult<bool> {
        match v {
            Level::MVar(other) => {
                Ok(self.get_level_mvar_depth(*other)? > self.get_level_mvar_depth(mvar)?)
            }
            _ => Ok(false),
        }
    }

    pub(super) fn solve(&mut self, lhs: &Level, rhs: &Level) -> ElabResult<LBool> {
        match (lhs, rhs) {
            (Level::MVar(mvar), _) => {
                if self.is_read_only_level_mvar(*mvar)? {
                    return Ok(LBool::Undef);
                }
                if self.config().ignore_level_mvar_depth
                    && self.is_mvar_with_greater_depth(rhs, *mvar)?
                {
                    if let Level::MVar(deeper) = rhs {
                        self.assign_level_mvar(*deeper, lhs.clone())?;
                        return Ok(LBool::True);
                    }
                }
                if !lhs.occurs(rhs) {
                    self.assign_level_mvar(*mvar, rhs.clone())?;
                    Ok(LBool::True)
                } else if rhs.is_max() && !strict_occurs_max(lhs, rhs) {
                    self.solve_self_max(*mvar, rhs)?;
                    Ok(LBool::True)
                } else {
                    Ok(LBool::Undef)
                }
            }
            // Left to `solve(rhs, lhs)`
            (_, Level::MVar(_)) => Ok(LBool::Undef),
            (Level::Zero, Level::Max(l, r)) => {
                if self.is_level_def_eq_aux(&Level::Zero, l)? {
                    Ok(LBool::from_bool(self.is_level_def_eq_aux(&Level::Zero, r)?))
                } else {
                    Ok(LBool::Undef)
                }
            }
            (Level::Zero, Level::IMax(_, r)) => {
                Ok(LBool::from_bool(self.is_level_def_eq_aux(&Level::Zero, r)?))
            }
            (Level::Zero, Level::Succ(_)) => Ok(LBool::False),
            (Level::Succ(pred), _) => {
                if rhs.is_imax() {
                    return Ok(LBool::Undef);
                }
                if rhs.is_param() {
                    return Ok(LBool::False);
                }
                if pred.is_mvar() && pred.occurs(rhs) {
                    return Ok(LBool::Undef);
                }
                match self.dec_level_opt(rhs)? {
                    Some(rhs_pred) => Ok(LBool::from_bool(self.is_level_def_eq_aux(pred, &rhs_pred)?)),
                    None => Ok(LBool::Undef),
                }
            }
            _ => Ok(LBool::Undef),
        }
    }
}
