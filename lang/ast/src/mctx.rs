//! The metavariable context
//!
//! Stores the declarations and assignments of universe level metavariables and expression metavariables.
//!
//! Every metavariable is created at a *depth*. Entering a nested problem increases the depth of the context
//! (see [MetavarContext::inc_depth]); metavariables created at a smaller depth than the current
//! `level_assign_depth` are then treated as read-only by the unifier.
//!
//! The context is a plain value: cloning it takes a snapshot which can be restored for backtracking.

use thiserror::Error;

use crate::{Expr, HashMap, LMVarId, Level, LocalContext, MVarId, Name};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetavarError {
    #[error("Unknown universe level metavariable {0}")]
    UnknownLevelMVar(LMVarId),
    #[error("Unknown metavariable {0}")]
    UnknownExprMVar(MVarId),
    #[error("Universe level metavariable {0} has already been assigned")]
    LevelAlreadyAssigned(LMVarId),
}

/// The declaration of an expression metavariable, i.e. a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprMVarDecl {
    pub user_name: Name,
    /// The hypotheses which may occur in the solution.
    pub lctx: LocalContext,
    pub typ: Expr,
    pub depth: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetavarContext {
    /// The depth at which new metavariables are created.
    pub depth: u32,
    /// Level metavariables created at a smaller depth may not be assigned.
    pub level_assign_depth: u32,
    /// Counter for fresh metavariable ids, shared between level and expression metavariables.
    mvar_counter: u64,
    level_depths: HashMap<LMVarId, u32>,
    level_assignments: HashMap<LMVarId, Level>,
    expr_decls: HashMap<MVarId, ExprMVarDecl>,
    expr_assignments: HashMap<MVarId, Expr>,
}

impl MetavarContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of metavariables created so far.
    pub fn mvar_counter(&self) -> u64 {
        self.mvar_counter
    }

    fn next_id(&mut self) -> u64 {
        let id = self.mvar_counter;
        self.mvar_counter += 1;
        id
    }

    /// Enter a nested problem.
    ///
    /// If `allow_level_assignments` is not set, all level metavariables created so far become read-only.
    pub fn inc_depth(&mut self, allow_level_assignments: bool) {
        self.depth += 1;
        if !allow_level_assignments {
            self.level_assign_depth = self.depth;
        }
    }

    // Universe level metavariables
    //
    //

    pub fn mk_level_mvar(&mut self) -> LMVarId {
        let id = LMVarId(self.next_id());
        self.level_depths.insert(id, self.depth);
        id
    }

    /// Declare a level metavariable with a given id and depth.
    pub fn add_level_mvar_decl(&mut self, id: LMVarId, depth: u32) {
        self.mvar_counter = self.mvar_counter.max(id.0 + 1);
        self.level_depths.insert(id, depth);
    }

    pub fn is_level_mvar_declared(&self, id: LMVarId) -> bool {
        self.level_depths.contains_key(&id)
    }

    pub fn get_level_depth(&self, id: LMVarId) -> Result<u32, MetavarError> {
        self.level_depths.get(&id).copied().ok_or(MetavarError::UnknownLevelMVar(id))
    }

    pub fn get_level_assignment(&self, id: LMVarId) -> Option<&Level> {
        self.level_assignments.get(&id)
    }

    pub fn is_level_mvar_assigned(&self, id: LMVarId) -> bool {
        self.level_assignments.contains_key(&id)
    }

    pub fn assign_level(&mut self, id: LMVarId, level: Level) -> Result<(), MetavarError> {
        if !self.is_level_mvar_declared(id) {
            return Err(MetavarError::UnknownLevelMVar(id));
        }
        if self.is_level_mvar_assigned(id) {
            return Err(MetavarError::LevelAlreadyAssigned(id));
        }
        self.level_assignments.insert(id, level);
        Ok(())
    }

    /// Whether the metavariable was created at or below the current `level_assign_depth`.
    pub fn is_level_mvar_assignable(&self, id: LMVarId) -> Result<bool, MetavarError> {
        Ok(self.get_level_depth(id)? >= self.level_assign_depth)
    }

    /// Whether the level contains a metavariable which may be assigned.
    /// Assignments are not taken into account, so the level should be instantiated first.
    pub fn has_assignable_level_mvar(&self, level: &Level) -> Result<bool, MetavarError> {
        match level {
            Level::Zero | Level::Param(_) => Ok(false),
            Level::MVar(id) => self.is_level_mvar_assignable(*id),
            Level::Succ(l) => Ok(l.has_mvar() && self.has_assignable_level_mvar(l)?),
            Level::Max(l, r) | Level::IMax(l, r) => Ok((l.has_mvar()
                && self.has_assignable_level_mvar(l)?)
                || (r.has_mvar() && self.has_assignable_level_mvar(r)?)),
        }
    }

    /// Replace all assigned level metavariables by their assignments.
    ///
    /// Stored assignments that themselves contain assigned metavariables are updated with their
    /// instantiation, so that later lookups do not have to follow the same chain again.
    pub fn instantiate_level_mvars(&mut self, level: &Level) -> Level {
        if !level.has_mvar() {
            return level.clone();
        }
        level.replace(&mut |sub| match sub {
            Level::MVar(id) => {
                let assignment = self.level_assignments.get(id)?.clone();
                if !assignment.has_mvar() {
                    return Some(assignment);
                }
                let instantiated = self.instantiate_level_mvars(&assignment);
                if instantiated != assignment {
                    self.level_assignments.insert(*id, instantiated.clone());
                }
                Some(instantiated)
            }
            _ if !sub.has_mvar() => Some(sub.clone()),
            _ => None,
        })
    }

    // Expression metavariables
    //
    //

    pub fn mk_expr_mvar(&mut self, lctx: LocalContext, typ: Expr, user_name: Name) -> MVarId {
        let id = MVarId(self.next_id());
        self.expr_decls.insert(id, ExprMVarDecl { user_name, lctx, typ, depth: self.depth });
        id
    }

    pub fn get_expr_decl(&self, id: MVarId) -> Result<&ExprMVarDecl, MetavarError> {
        self.expr_decls.get(&id).ok_or(MetavarError::UnknownExprMVar(id))
    }

    pub fn assign_expr(&mut self, id: MVarId, value: Expr) -> Result<(), MetavarError> {
        if !self.expr_decls.contains_key(&id) {
            return Err(MetavarError::UnknownExprMVar(id));
        }
        self.expr_assignments.insert(id, value);
        Ok(())
    }

    pub fn get_expr_assignment(&self, id: MVarId) -> Option<&Expr> {
        self.expr_assignments.get(&id)
    }

    pub fn is_expr_mvar_assigned(&self, id: MVarId) -> bool {
        self.expr_assignments.contains_key(&id)
    }

    /// Replace all assigned metavariables of the expression, including the level metavariables
    /// of its universe levels.
    pub fn instantiate_mvars(&mut self, expr: &Expr) -> Expr {
        if !expr.has_mvar() {
            return expr.clone();
        }
        expr.replace(&mut |sub| match sub {
            Expr::MVar(id) => {
                let assignment = self.expr_assignments.get(id)?.clone();
                let instantiated = self.instantiate_mvars(&assignment);
                if instantiated != assignment {
                    self.expr_assignments.insert(*id, instantiated.clone());
                }
                Some(instantiated)
            }
            Expr::Sort(l) => Some(Expr::Sort(self.instantiate_level_mvars(l))),
            Expr::Const(name, ls) => Some(Expr::Const(
                name.clone(),
                ls.iter().map(|l| self.instantiate_level_mvars(l)).collect(),
            )),
            _ if !sub.has_mvar() => Some(sub.clone()),
            _ => None,
        })
    }
}
