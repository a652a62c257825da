use lumen_lang_ast::syntax::kinds;
use lumen_lang_ast::{ByteIndex, Expr};

use super::data::{ContextInfo, Info, TermInfo};
use super::tree::InfoTree;
use super::visit::{infallible, visit_m};

struct Candidate {
    priority: u8,
    end: ByteIndex,
    ctx: ContextInfo,
    info: Info,
}

/// Which nodes [hoverable_info_at] considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverOptions {
    /// Whether a node ending at the position contains it.
    pub include_stop: bool,
    /// For an application `f a` where `f` is an identifier, report the application instead of `f`.
    pub omit_app_fns: bool,
    /// For an application `f a`, report only the function `f` and nothing inside the arguments.
    pub omit_app_args: bool,
    /// Skip identifiers which stand for applications, e.g. projections of instances.
    pub omit_ident_apps: bool,
}

/// The node which is shown on hover at `hover`.
///
/// Of the innermost hoverable nodes whose range contains `hover`, nodes ending at `hover` and
/// free variables are only considered if there is nothing else. The remaining node which ends
/// last is reported, the first one if there are several. A synthetic `sorry` is never reported.
pub fn hoverable_info_at(
    tree: &InfoTree,
    hover: ByteIndex,
    opts: HoverOptions,
) -> Option<(ContextInfo, Info)> {
    let candidates = infallible(visit_m(
        &mut |_, _, _| Ok(true),
        &mut |ctx, info, _, results: Vec<Option<Vec<Candidate>>>| {
            let mut results: Vec<Candidate> = results.into_iter().flatten().flatten().collect();
            let stx = info.stx();
            if stx.is_of_kind(kinds::APP) {
                if opts.omit_app_fns && stx.get_arg(0).is_ident() {
                    results.retain(|candidate| candidate.info.stx() != stx.get_arg(0));
                }
                if opts.omit_app_args {
                    results.retain(|candidate| candidate.info.stx() == stx.get_arg(0));
                }
            }
            if opts.omit_ident_apps
                && stx.is_ident()
                && info.as_term().is_some_and(|t| t.expr.is_app())
            {
                return Ok(results);
            }
            // Innermost results win
            if !results.is_empty() {
                return Ok(results);
            }
            let hoverable =
                matches!(info, Info::Term(_) | Info::Tactic(_) | Info::Command(_) | Info::Field(_));
            match info.range() {
                Some(range) if hoverable && range.contains(hover, opts.include_stop) => {
                    let priority = if range.end == hover
                        || matches!(info, Info::Term(TermInfo { expr: Expr::FVar(_), .. }))
                    {
                        0
                    } else {
                        1
                    };
                    Ok(vec![Candidate {
                        priority,
                        end: range.end,
                        ctx: ctx.clone(),
                        info: info.clone(),
                    }])
                }
                _ => Ok(results),
            }
        },
        None,
        tree,
    ))
    .unwrap_or_default();

    let max_priority = candidates.iter().map(|candidate| candidate.priority).max()?;
    let best = candidates
        .into_iter()
        .filter(|candidate| candidate.priority == max_priority)
        .reduce(|best, candidate| if candidate.end > best.end { candidate } else { best })?;
    if best.info.as_term().is_some_and(|term| term.expr.is_synthetic_sorry()) {
        log::trace!("not hovering over a synthetic sorry at {hover}");
        return None;
    }
    Some((best.ctx, best.info))
}

/// The term whose expected type is shown at `hover`.
///
/// For an application `f a` where `f` is an identifier, this is the application even if `hover` is on `f`.
pub fn term_goal_at(tree: &InfoTree, hover: ByteIndex) -> Option<(ContextInfo, Info)> {
    let opts = HoverOptions { include_stop: true, omit_app_fns: true, ..Default::default() };
    hoverable_info_at(tree, hover, opts)
        .filter(|(_, info)| info.as_term().is_some_and(|term| term.expected_type.is_some()))
}
