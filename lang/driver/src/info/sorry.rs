use lumen_lang_ast::Expr;

use super::data::{ContextInfo, Info};
use super::tree::InfoTree;
use crate::result::DriverResult;

/// Instantiates the metavariables of the terms inspected by [has_sorry_with].
pub trait SorryProbe {
    fn instantiate(&mut self, ctx: &ContextInfo, expr: &Expr) -> DriverResult<Expr>;
}

/// Instantiates against the metavariable context of the node.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaProbe;

impl SorryProbe for MetaProbe {
    fn instantiate(&mut self, ctx: &ContextInfo, expr: &Expr) -> DriverResult<Expr> {
        ctx.run_meta(|meta| Ok(meta.mctx.instantiate_mvars(expr)))
    }
}

/// Whether any term elaborated in the tree contains `sorry`.
pub fn has_sorry(tree: &InfoTree) -> DriverResult<bool> {
    has_sorry_with(&mut MetaProbe, tree)
}

/// Like [has_sorry], instantiating terms with `probe`.
///
/// The children of a term node are subterms of its expression and are not inspected.
/// Siblings are not inspected once `sorry` has been found.
pub fn has_sorry_with<P: SorryProbe>(probe: &mut P, tree: &InfoTree) -> DriverResult<bool> {
    has_sorry_go(probe, None, tree)
}

fn has_sorry_go<P: SorryProbe>(
    probe: &mut P,
    ctx: Option<&ContextInfo>,
    tree: &InfoTree,
) -> DriverResult<bool> {
    match tree {
        InfoTree::Context(partial, tree) => match partial.try_merge_into_outer(ctx) {
            Some(ctx) => has_sorry_go(probe, Some(&ctx), tree),
            None => has_sorry_go(probe, ctx, tree),
        },
        InfoTree::Node(info, children) => match (ctx, info) {
            (Some(ctx), Info::Term(term)) => Ok(probe.instantiate(ctx, &term.expr)?.has_sorry()),
            _ => {
                for child in children {
                    if has_sorry_go(probe, ctx, child)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        },
        InfoTree::Hole(_) => Ok(false),
    }
}

#[cfg(test)]
mod test {
    use lumen_lang_ast::{Level, LocalContext, MVarId, Name, SourceInfo, Syntax};

    use super::*;
    use crate::info::data::{CommandInfo, ElabInfo, PartialContextInfo, TermInfo};

    fn term(expr: Expr) -> TermInfo {
        TermInfo {
            elab: ElabInfo::new("term", Syntax::atom(SourceInfo::original(0, 1), "x")),
            lctx: LocalContext::empty(),
            expected_type: None,
            expr,
            is_binder: false,
        }
    }

    fn command<I: IntoIterator<Item = InfoTree>>(children: I) -> InfoTree {
        let cmd = CommandInfo { elab: ElabInfo::new("command", Syntax::Missing) };
        InfoTree::node(cmd, children)
    }

    #[test]
    fn sorry_in_assigned_mvar() {
        let mut ctx = ContextInfo::default();
        let goal = ctx.mctx.mk_expr_mvar(
            LocalContext::empty(),
            Expr::sort(Level::zero()),
            Name::anonymous(),
        );
        let tree = |ctx: &ContextInfo| {
            InfoTree::context(
                PartialContextInfo::CommandCtx(ctx.clone()),
                command(vec![InfoTree::leaf(term(Expr::MVar(goal)))]),
            )
        };
        assert!(!has_sorry(&tree(&ctx)).unwrap());
        ctx.mctx.assign_expr(goal, Expr::sorry(Expr::sort(Level::zero()), false)).unwrap();
        assert!(has_sorry(&tree(&ctx)).unwrap());
    }

    #[test]
    fn children_of_terms_are_not_inspected() {
        let sorry = Expr::sorry(Expr::sort(Level::zero()), true);
        let tree = InfoTree::context(
            PartialContextInfo::CommandCtx(ContextInfo::default()),
            InfoTree::node(
                term(Expr::cnst("Nat", vec![])),
                vec![InfoTree::leaf(term(sorry.clone()))],
            ),
        );
        assert!(!has_sorry(&tree).unwrap());
        assert!(has_sorry(&InfoTree::context(
            PartialContextInfo::CommandCtx(ContextInfo::default()),
            command(vec![InfoTree::Hole(MVarId(0)), InfoTree::leaf(term(sorry))]),
        ))
        .unwrap());
    }

    #[test]
    fn terms_without_context_are_skipped() {
        let sorry = Expr::sorry(Expr::sort(Level::zero()), false);
        let tree = command(vec![InfoTree::leaf(term(sorry))]);
        assert!(!has_sorry(&tree).unwrap());
    }
}
