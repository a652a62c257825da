use lumen_lang_ast::{LMVarId, Level};

use crate::config::ElabConfig;
use crate::meta::MetaCtx;
use crate::result::ElabError;
use crate::trace::classes;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn u() -> Level {
    Level::param("u")
}

fn v() -> Level {
    Level::param("v")
}

fn mvar_id(l: &Level) -> LMVarId {
    l.mvar_id().unwrap()
}

fn check_eq(ctx: &mut MetaCtx, lhs: Level, rhs: Level) {
    assert!(
        ctx.is_level_def_eq(&lhs, &rhs).unwrap(),
        "expected {lhs:?} and {rhs:?} to be definitionally equal"
    )
}

fn check_neq(ctx: &mut MetaCtx, lhs: Level, rhs: Level) {
    assert!(
        !ctx.is_level_def_eq(&lhs, &rhs).unwrap(),
        "expected {lhs:?} and {rhs:?} not to be definitionally equal"
    )
}

#[test]
fn closed_levels() {
    init();
    let mut ctx = MetaCtx::default();
    check_eq(&mut ctx, u(), u());
    check_eq(&mut ctx, Level::succ(u()), Level::succ(u()));
    check_eq(&mut ctx, Level::max(u(), v()), Level::max(v(), u()));
    check_eq(&mut ctx, Level::max(Level::one(), u().add_offset(1)), u().add_offset(1));
    check_eq(&mut ctx, Level::imax(u(), Level::zero()), Level::zero());
    check_neq(&mut ctx, Level::zero(), Level::one());
    check_neq(&mut ctx, u().add_offset(1), u());
    check_neq(&mut ctx, u(), v());
    check_neq(&mut ctx, Level::succ(u()), v());
    assert_eq!(ctx.num_postponed(), 0);
}

#[test]
fn assign_mvar() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, m.clone(), u().add_offset(1));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&m)), Some(&u().add_offset(1)));
}

#[test]
fn assign_mvar_under_successors() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, Level::succ(m.clone()), Level::max(Level::one(), u().add_offset(1)));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&m)), Some(&u()));
}

#[test]
fn decrement_rhs() {
    init();
    let mut ctx = MetaCtx::default();
    let n = ctx.mk_fresh_level_mvar();
    let rhs = Level::max(u().add_offset(1), v().add_offset(1));
    check_eq(&mut ctx, n.clone().add_offset(1), rhs);
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&n)), Some(&Level::max(u(), v())));
    assert_eq!(ctx.num_postponed(), 0);
}

#[test]
fn stuck_without_bare_mvar_is_not_postponed() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    // Decrementing leaves `u =?= max (v+1) ?m`
    check_neq(&mut ctx, u().add_offset(1), Level::max(v().add_offset(2), m.clone().add_offset(1)));
    assert_eq!(ctx.num_postponed(), 0);
    let a = ctx.mk_fresh_level_mvar();
    let b = ctx.mk_fresh_level_mvar();
    assert!(!ctx.is_level_def_eq_aux(&Level::max(a, u()), &Level::max(b, u())).unwrap());
    assert_eq!(ctx.num_postponed(), 0);
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&m)));
}

#[test]
fn self_max() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, m.clone(), Level::max(m.clone(), u()));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&m)), Some(&u()));
}

#[test]
fn occurs_check() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    check_neq(&mut ctx, m.clone(), Level::succ(m.clone()));
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&m)));
}

#[test]
fn zero_against_max() {
    init();
    let mut ctx = MetaCtx::default();
    let a = ctx.mk_fresh_level_mvar();
    let b = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, Level::zero(), Level::max(a.clone(), b.clone()));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&a)), Some(&Level::zero()));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&b)), Some(&Level::zero()));
}

#[test]
fn zero_against_imax() {
    init();
    let mut ctx = MetaCtx::default();
    let b = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, Level::zero(), Level::imax(u(), b.clone()));
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&b)), Some(&Level::zero()));
    check_neq(&mut ctx, Level::zero(), Level::imax(u(), Level::one()));
}

#[test]
fn prefer_outer_mvar_by_default() {
    init();
    let mut ctx = MetaCtx::default();
    let outer = ctx.mk_fresh_level_mvar();
    ctx.mctx.inc_depth(true);
    let inner = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, outer.clone(), inner.clone());
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&outer)), Some(&inner));
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&inner)));
}

#[test]
fn prefer_deeper_mvar_when_ignoring_depth() {
    init();
    let mut ctx = MetaCtx::new(ElabConfig { ignore_level_mvar_depth: true, ..Default::default() });
    let outer = ctx.mk_fresh_level_mvar();
    ctx.mctx.inc_depth(false);
    let inner = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, outer.clone(), inner.clone());
    assert_eq!(ctx.get_level_mvar_assignment(mvar_id(&inner)), Some(&outer));
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&outer)));
}

#[test]
fn read_only_mvar() {
    init();
    let mut ctx = MetaCtx::default();
    let outer = ctx.mk_fresh_level_mvar();
    let res = ctx.with_new_mctx_depth(false, |ctx| ctx.is_level_def_eq(&outer, &u())).unwrap();
    assert!(!res);
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&outer)));
}

#[test]
fn stuck_constraint_is_an_error_on_request() {
    init();
    let mut ctx = MetaCtx::new(ElabConfig { is_def_eq_stuck_ex: true, ..Default::default() });
    let outer = ctx.mk_fresh_level_mvar();
    let err = ctx
        .with_new_mctx_depth(false, |ctx| ctx.is_level_def_eq(&outer, &u()))
        .unwrap_err();
    assert!(matches!(*err, ElabError::DefEqStuck { .. }));
}

#[test]
fn postpone_and_resolve() {
    init();
    let mut ctx = MetaCtx::default();
    ctx.traces.enable(classes::IS_LEVEL_DEF_EQ);
    let a = ctx.mk_fresh_level_mvar();

    check_eq(&mut ctx, a.clone(), Level::imax(u(), a.clone()));
    assert_eq!(ctx.num_postponed(), 1);
    assert_eq!(ctx.postponed()[0].lhs, a.clone());
    assert_eq!(ctx.postponed()[0].mvar_counter, 1);
    assert_eq!(ctx.traces.messages(classes::STUCK)[0], "?u.0 =?= imax u ?u.0");

    // Constraints postponed before a check are kept, not retried.
    check_eq(&mut ctx, a.clone(), Level::zero());
    assert_eq!(ctx.num_postponed(), 1);

    ctx.synthesize_level_constraints().unwrap();
    assert_eq!(ctx.num_postponed(), 0);
}

#[test]
fn postponement_can_be_disabled() {
    init();
    let mut ctx = MetaCtx::new(ElabConfig { allow_postponement: false, ..Default::default() });
    let a = ctx.mk_fresh_level_mvar();
    check_neq(&mut ctx, a.clone(), Level::imax(u(), a));
    assert_eq!(ctx.num_postponed(), 0);
}

#[test]
fn unsolvable_postponed_constraint() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, m.clone(), Level::max(u(), Level::succ(m.clone())));
    assert_eq!(ctx.num_postponed(), 1);
    let err = ctx.synthesize_level_constraints().unwrap_err();
    assert!(matches!(*err, ElabError::UnresolvedLevelConstraint { .. }));
}

#[test]
fn failure_rolls_back_assignments() {
    init();
    let mut ctx = MetaCtx::default();
    let m = ctx.mk_fresh_level_mvar();
    let res = ctx.is_level_def_eq_list(&[m.clone(), m.clone()], &[u(), v()]).unwrap();
    assert!(!res);
    assert!(!ctx.is_level_mvar_assigned(mvar_id(&m)));

    assert!(ctx.is_level_def_eq_list(&[m.clone(), Level::zero()], &[u(), Level::zero()]).unwrap());
    assert!(ctx.is_level_mvar_assigned(mvar_id(&m)));
    assert!(!ctx.is_level_def_eq_list(&[u()], &[]).unwrap());
}

#[test]
fn failure_keeps_earlier_postponed_constraints() {
    init();
    let mut ctx = MetaCtx::default();
    let a = ctx.mk_fresh_level_mvar();
    check_eq(&mut ctx, a.clone(), Level::imax(u(), a));
    check_neq(&mut ctx, u(), v());
    assert_eq!(ctx.num_postponed(), 1);
}

#[test]
fn process_postponed_without_progress() {
    init();
    let mut ctx = MetaCtx::default();
    let a = ctx.mk_fresh_level_mvar();
    ctx.postpone_is_level_def_eq(&a, &Level::imax(u(), a.clone()));
    assert!(ctx.process_postponed(true).unwrap());
    assert!(!ctx.process_postponed(false).unwrap());
    assert_eq!(ctx.num_postponed(), 1);
}
