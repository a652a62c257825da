//! Universe levels
//!
//! A universe level describes the "size" of a type universe `Sort u`.
//! Levels are built from `0`, successors, `max`, `imax`, universe parameters
//! and universe metavariables.
//!
//! `imax u v` is the impredicative maximum: it is `0` if `v` is `0` and `max u v` otherwise.
//! This is what makes `Prop` impredicative: `Sort (imax u 0) = Sort 0`.
//!
//! Levels are immutable values. Equality (`==`) is purely structural and does not look through
//! metavariable assignments; use [crate::MetavarContext::instantiate_level_mvars] first when
//! assignments should be visible.

use std::cmp::Ordering;

use crate::{LMVarId, Name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    Zero,
    Succ(Box<Level>),
    Max(Box<Level>, Box<Level>),
    IMax(Box<Level>, Box<Level>),
    Param(Name),
    MVar(LMVarId),
}

// Constructors
//
//

impl Level {
    pub fn zero() -> Level {
        Level::Zero
    }

    pub fn one() -> Level {
        Level::succ(Level::Zero)
    }

    pub fn succ(l: Level) -> Level {
        Level::Succ(Box::new(l))
    }

    pub fn max(l: Level, r: Level) -> Level {
        Level::Max(Box::new(l), Box::new(r))
    }

    pub fn imax(l: Level, r: Level) -> Level {
        Level::IMax(Box::new(l), Box::new(r))
    }

    pub fn param<N: Into<Name>>(name: N) -> Level {
        Level::Param(name.into())
    }

    pub fn mvar(id: LMVarId) -> Level {
        Level::MVar(id)
    }

    pub fn of_nat(n: u32) -> Level {
        Level::Zero.add_offset(n)
    }
}

// Inspection
//
//

impl Level {
    pub fn is_zero(&self) -> bool {
        matches!(self, Level::Zero)
    }

    pub fn is_succ(&self) -> bool {
        matches!(self, Level::Succ(_))
    }

    pub fn is_max(&self) -> bool {
        matches!(self, Level::Max(..))
    }

    pub fn is_imax(&self) -> bool {
        matches!(self, Level::IMax(..))
    }

    pub fn is_max_or_imax(&self) -> bool {
        self.is_max() || self.is_imax()
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Level::Param(_))
    }

    pub fn is_mvar(&self) -> bool {
        matches!(self, Level::MVar(_))
    }

    pub fn mvar_id(&self) -> Option<LMVarId> {
        match self {
            Level::MVar(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the level is a numeral `succ^n 0`.
    pub fn is_explicit(&self) -> bool {
        self.get_level_offset().is_zero()
    }

    pub fn to_nat(&self) -> Option<u32> {
        self.is_explicit().then(|| self.get_offset())
    }

    /// The number of successors applied to the base of the level.
    ///
    /// `get_offset(u+3) = 3`
    pub fn get_offset(&self) -> u32 {
        let mut offset = 0;
        let mut l = self;
        while let Level::Succ(pred) = l {
            offset += 1;
            l = pred;
        }
        offset
    }

    /// The base of the level, i.e. the level with all outer successors stripped.
    ///
    /// `get_level_offset(u+3) = u`
    pub fn get_level_offset(&self) -> &Level {
        let mut l = self;
        while let Level::Succ(pred) = l {
            l = pred;
        }
        l
    }

    pub fn add_offset(self, k: u32) -> Level {
        (0..k).fold(self, |acc, _| Level::succ(acc))
    }

    /// A conservative check that the level can never be instantiated to `0`.
    pub fn is_never_zero(&self) -> bool {
        match self {
            Level::Zero | Level::Param(_) | Level::MVar(_) => false,
            Level::Succ(_) => true,
            Level::Max(l, r) => l.is_never_zero() || r.is_never_zero(),
            Level::IMax(_, r) => r.is_never_zero(),
        }
    }

    /// Whether some subterm satisfies the predicate `f`.
    pub fn any<F: Fn(&Level) -> bool>(&self, f: &F) -> bool {
        if f(self) {
            return true;
        }
        match self {
            Level::Succ(l) => l.any(f),
            Level::Max(l, r) | Level::IMax(l, r) => l.any(f) || r.any(f),
            Level::Zero | Level::Param(_) | Level::MVar(_) => false,
        }
    }

    pub fn has_mvar(&self) -> bool {
        self.any(&Level::is_mvar)
    }

    pub fn has_param(&self) -> bool {
        self.any(&Level::is_param)
    }

    /// Whether `self` is equal to `other` or occurs as a subterm of it.
    pub fn occurs(&self, other: &Level) -> bool {
        other.any(&|sub| sub == self)
    }

    /// Whether the metavariable `mvar` occurs anywhere in `self`.
    pub fn occurs_mvar(&self, mvar: LMVarId) -> bool {
        self.any(&|sub| sub.mvar_id() == Some(mvar))
    }

    /// All metavariables of the level, in left-to-right order and without duplicates.
    pub fn collect_mvars(&self) -> Vec<LMVarId> {
        fn go(l: &Level, acc: &mut Vec<LMVarId>) {
            match l {
                Level::MVar(id) => {
                    if !acc.contains(id) {
                        acc.push(*id)
                    }
                }
                Level::Succ(l) => go(l, acc),
                Level::Max(l, r) | Level::IMax(l, r) => {
                    go(l, acc);
                    go(r, acc)
                }
                Level::Zero | Level::Param(_) => {}
            }
        }
        let mut acc = Vec::new();
        go(self, &mut acc);
        acc
    }
}

// Transformation
//
//

impl Level {
    /// Rebuild the level bottom-up. If `f` returns `Some(l)` for a subterm, that subterm is replaced by `l`
    /// and not visited further. Rebuilt `max` and `imax` nodes are simplified with [Level::mk_max_simp]
    /// and [Level::mk_imax_simp]; untouched subterms are returned unchanged.
    pub fn replace<F: FnMut(&Level) -> Option<Level>>(&self, f: &mut F) -> Level {
        if let Some(l) = f(self) {
            return l;
        }
        match self {
            Level::Succ(l) => Level::succ(l.replace(f)),
            Level::Max(l, r) => {
                let l_new = l.replace(f);
                let r_new = r.replace(f);
                if &l_new == l.as_ref() && &r_new == r.as_ref() {
                    self.clone()
                } else {
                    Level::mk_max_simp(l_new, r_new)
                }
            }
            Level::IMax(l, r) => {
                let l_new = l.replace(f);
                let r_new = r.replace(f);
                if &l_new == l.as_ref() && &r_new == r.as_ref() {
                    self.clone()
                } else {
                    Level::mk_imax_simp(l_new, r_new)
                }
            }
            Level::Zero | Level::Param(_) | Level::MVar(_) => self.clone(),
        }
    }

    /// Substitute universe parameters: `self[params[i] := levels[i]]`.
    pub fn instantiate_params(&self, params: &[Name], levels: &[Level]) -> Level {
        if !self.has_param() {
            return self.clone();
        }
        self.replace(&mut |l| match l {
            Level::Param(name) => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| levels.get(i))
                .cloned()
                .or_else(|| Some(l.clone())),
            _ => None,
        })
    }
}

// Smart constructors
//
//

impl Level {
    /// Build `max u v`, applying the cheap simplifications
    ///
    /// * `max u u = u`
    /// * `max 0 u = max u 0 = u`
    /// * `max u v = u` if `v` is explicit and `u` has at least the same offset
    /// * `max (max u₁ u₂) v = max u₁ u₂` if `v` is `u₁` or `u₂`
    /// * `max (u+n) (u+m) = u+max(n,m)`
    pub fn mk_max_simp(u: Level, v: Level) -> Level {
        fn subsumes(u: &Level, v: &Level) -> bool {
            if v.is_explicit() && u.get_offset() >= v.get_offset() {
                return true;
            }
            match u {
                Level::Max(u1, u2) => v == u1.as_ref() || v == u2.as_ref(),
                _ => false,
            }
        }

        if u == v || v.is_zero() || subsumes(&u, &v) {
            u
        } else if u.is_zero() || subsumes(&v, &u) {
            v
        } else if u.get_level_offset() == v.get_level_offset() {
            if u.get_offset() >= v.get_offset() { u } else { v }
        } else {
            Level::max(u, v)
        }
    }

    /// Build `imax u v`, applying the cheap simplifications
    ///
    /// * `imax u v = max u v` if `v` is never zero
    /// * `imax u 0 = 0`
    /// * `imax 0 v = v`
    /// * `imax u u = u`
    pub fn mk_imax_simp(u: Level, v: Level) -> Level {
        if v.is_never_zero() {
            Level::mk_max_simp(u, v)
        } else if v.is_zero() || u.is_zero() {
            v
        } else if u == v {
            u
        } else {
            Level::imax(u, v)
        }
    }
}

// Normalization
//
//

/// Rank of the outermost constructor, used as the last resort when ordering levels.
fn ctor_rank(l: &Level) -> u8 {
    match l {
        Level::Zero => 0,
        Level::Param(_) => 1,
        Level::MVar(_) => 2,
        Level::Succ(_) => 3,
        Level::Max(..) => 4,
        Level::IMax(..) => 5,
    }
}

fn norm_lt_aux(l1: &Level, k1: u32, l2: &Level, k2: u32) -> bool {
    match (l1, l2) {
        (Level::Succ(l1), _) => norm_lt_aux(l1, k1 + 1, l2, k2),
        (_, Level::Succ(l2)) => norm_lt_aux(l1, k1, l2, k2 + 1),
        (Level::Max(l11, l12), Level::Max(l21, l22))
        | (Level::IMax(l11, l12), Level::IMax(l21, l22)) => {
            if l1 == l2 {
                k1 < k2
            } else if l11 == l21 {
                norm_lt_aux(l12, 0, l22, 0)
            } else {
                norm_lt_aux(l11, 0, l21, 0)
            }
        }
        (Level::Param(n1), Level::Param(n2)) => {
            if n1 == n2 {
                k1 < k2
            } else {
                n1 < n2
            }
        }
        (Level::MVar(m1), Level::MVar(m2)) => {
            if m1 == m2 {
                k1 < k2
            } else {
                m1 < m2
            }
        }
        _ => {
            if l1 == l2 {
                k1 < k2
            } else {
                ctor_rank(l1) < ctor_rank(l2)
            }
        }
    }
}

/// Push the normalized arguments of a `max` spine onto `lvls`.
/// Normalizing an argument may itself produce a `max`, which is flattened as well.
fn push_max_args(l: &Level, already_normalized: bool, lvls: &mut Vec<Level>) {
    match l {
        Level::Max(l1, l2) => {
            push_max_args(l1, already_normalized, lvls);
            push_max_args(l2, already_normalized, lvls);
        }
        _ if !already_normalized => push_max_args(&l.normalize(), true, lvls),
        _ => lvls.push(l.clone()),
    }
}

/// Index of the first argument which is not a numeral. `lvls` must be sorted.
fn skip_explicit(lvls: &[Level]) -> usize {
    lvls.iter().position(|l| !l.get_level_offset().is_zero()).unwrap_or(lvls.len())
}

/// Whether the largest numeral is subsumed by some non-numeral argument, e.g. `max 1 (u+1)`.
fn is_explicit_subsumed(lvls: &[Level], first_non_explicit: usize) -> bool {
    if first_non_explicit == 0 {
        return false;
    }
    let max_explicit = lvls[first_non_explicit - 1].get_offset();
    lvls[first_non_explicit..].iter().any(|l| l.get_offset() >= max_explicit)
}

fn acc_max(result: Level, prev: &Level, offset: u32) -> Level {
    if result.is_zero() {
        prev.clone().add_offset(offset)
    } else {
        Level::max(result, prev.clone().add_offset(offset))
    }
}

fn mk_imax_aux(l1: Level, l2: Level) -> Level {
    if l2.is_zero() || l1.is_zero() {
        l2
    } else if l1 == l2 {
        l1
    } else {
        Level::imax(l1, l2)
    }
}

impl Level {
    /// The total order on levels used to sort the arguments of a normalized `max`.
    ///
    /// Levels with the same base are ordered by their offsets, so that after sorting
    /// equal bases are adjacent and the largest offset comes last.
    pub fn norm_lt(&self, other: &Level) -> bool {
        norm_lt_aux(self, 0, other, 0)
    }

    fn norm_cmp(&self, other: &Level) -> Ordering {
        if self.norm_lt(other) {
            Ordering::Less
        } else if other.norm_lt(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    fn is_already_normalized_cheap(&self) -> bool {
        match self {
            Level::Zero | Level::Param(_) | Level::MVar(_) => true,
            Level::Succ(l) => l.is_already_normalized_cheap(),
            Level::Max(..) | Level::IMax(..) => false,
        }
    }

    /// Bring the level into a canonical form.
    ///
    /// * `max` spines are flattened, their arguments normalized and sorted with [Level::norm_lt]
    /// * numerals subsumed by a larger offset are dropped, e.g. `max 1 (u+1) = u+1`
    /// * arguments with the same base keep only the largest offset, e.g. `max u (u+2) = u+2`
    /// * outer successors are distributed over `max`, e.g. `(max u v)+1 = max (u+1) (v+1)`
    /// * `imax u v = max u v` if `v` is never zero, `imax u 0 = 0`, `imax 0 v = v`, `imax u u = u`
    ///
    /// Normalization is idempotent.
    pub fn normalize(&self) -> Level {
        if self.is_already_normalized_cheap() {
            return self.clone();
        }
        let k = self.get_offset();
        match self.get_level_offset() {
            Level::Max(l1, l2) => {
                let mut lvls = Vec::new();
                push_max_args(l1, false, &mut lvls);
                push_max_args(l2, false, &mut lvls);
                lvls.sort_by(Level::norm_cmp);
                let first_non_explicit = skip_explicit(&lvls);
                let mut i = if is_explicit_subsumed(&lvls, first_non_explicit) {
                    first_non_explicit
                } else {
                    first_non_explicit.saturating_sub(1)
                };
                let mut prev = lvls[i].get_level_offset();
                let mut prev_k = lvls[i].get_offset();
                let mut result = Level::Zero;
                i += 1;
                while i < lvls.len() {
                    let curr = lvls[i].get_level_offset();
                    let curr_k = lvls[i].get_offset();
                    if curr != prev {
                        result = acc_max(result, prev, k + prev_k);
                    }
                    prev = curr;
                    prev_k = curr_k;
                    i += 1;
                }
                acc_max(result, prev, k + prev_k)
            }
            Level::IMax(l1, l2) => {
                if l2.is_never_zero() {
                    Level::max(l1.as_ref().clone(), l2.as_ref().clone()).normalize().add_offset(k)
                } else {
                    mk_imax_aux(l1.normalize(), l2.normalize()).add_offset(k)
                }
            }
            // A level whose base is not `max` or `imax` is already normalized.
            _ => unreachable!("level {self:?} should have been recognized as normalized"),
        }
    }

    /// Whether the two levels are equal after normalization.
    pub fn is_equiv(&self, other: &Level) -> bool {
        self == other || self.normalize() == other.normalize()
    }
}
