use lumen_lang_ast::syntax::kinds;
use lumen_lang_ast::{ByteIndex, MVarId, Syntax};

use super::data::{ContextInfo, Info, TacticInfo};
use super::tree::InfoTree;
use super::visit::collect_nodes_bottom_up_m;
use crate::codespan::FileMap;
use crate::result::{DriverError, DriverResult};

/// A tactic whose goals are shown for a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalsAtResult {
    pub ctx: ContextInfo,
    pub tactic_info: TacticInfo,
    /// Whether the goals after the tactic are the relevant ones, rather than the goals before it.
    pub use_after: bool,
    /// Whether the tactic starts in a column to the right of the position.
    pub indented: bool,
    /// Whether a child tactic extends past the position.
    pub has_nested_tactic: bool,
}

impl GoalsAtResult {
    pub fn goals(&self) -> &[MVarId] {
        if self.use_after {
            &self.tactic_info.goals_after
        } else {
            &self.tactic_info.goals_before
        }
    }

    /// Render the relevant goals in the metavariable context in which they are relevant.
    pub fn pp_goals(&self) -> DriverResult<String> {
        let mctx = if self.use_after {
            &self.tactic_info.mctx_after
        } else {
            &self.tactic_info.mctx_before
        };
        let ctx = ContextInfo { mctx: mctx.clone(), ..self.ctx.clone() };
        ctx.pp_goals(self.goals())
    }
}

/// The tactics whose goals should be shown at position `hover`.
///
/// A tactic matches if `hover` lies between its start and the end of its trailing whitespace,
/// or if the tactic ends the file. Inner tactics are preferred over the tactics containing them,
/// unless the position is past the end of the inner tactics and they are all indented further than
/// the position. Of the remaining tactics, only those starting on the last line are kept.
pub fn goals_at(
    file_map: &FileMap,
    tree: &InfoTree,
    hover: ByteIndex,
) -> DriverResult<Vec<GoalsAtResult>> {
    let candidates = collect_nodes_bottom_up_m(
        &mut |ctx, info, children, gs: Vec<(u32, GoalsAtResult)>| {
            let Info::Tactic(tactic_info) = info else {
                return Ok(gs);
            };
            let (Some(pos), Some(tail_pos)) = (info.pos(), info.tail_pos()) else {
                return Ok(gs);
            };
            let trailing_end = tail_pos + info.stx().get_trailing_size();
            let at_eof = trailing_end == file_map.end_pos();
            if !(pos <= hover && (hover < trailing_end || at_eof)) {
                return Ok(gs);
            }
            if !(gs.is_empty() || (hover >= tail_pos && gs.iter().all(|(_, g)| g.indented))) {
                return Ok(gs);
            }
            let has_nested_tactic =
                children.iter().any(|child| nested_tactic(hover, pos, tail_pos, child));
            let start = file_map.to_position(pos)?;
            let cursor = file_map.to_position(hover)?;
            log::trace!("tactic at {start:?} matches {cursor:?}");
            let result = GoalsAtResult {
                ctx: ctx.clone(),
                tactic_info: tactic_info.clone(),
                use_after: hover > pos && !has_nested_tactic,
                indented: start.character > cursor.character && !is_empty_by(info.stx()),
                has_nested_tactic,
            };
            Ok::<_, DriverError>(vec![(start.line, result)])
        },
        tree,
    )?;

    let Some(max_line) = candidates.iter().map(|(line, _)| *line).max() else {
        return Ok(vec![]);
    };
    Ok(candidates
        .into_iter()
        .filter(|(line, _)| *line == max_line)
        .map(|(_, result)| result)
        .collect())
}

/// Whether `tree` contains a tactic other than the one at `pos..tail_pos` which ends after `hover`.
///
/// Tactic blocks nested in terms, such as `show p by ...`, are not considered.
fn nested_tactic(hover: ByteIndex, pos: ByteIndex, tail_pos: ByteIndex, tree: &InfoTree) -> bool {
    match tree {
        InfoTree::Node(info @ Info::Tactic(_), children) => {
            if info.stx().is_of_kind(kinds::BY_TACTIC) {
                return false;
            }
            if let (Some(inner_pos), Some(inner_tail)) = (info.pos(), info.tail_pos()) {
                // Nested infos of the same tactic, e.g. from its expansion, do not count
                if inner_tail > hover && (inner_pos, inner_tail) != (pos, tail_pos) {
                    return true;
                }
            }
            children.iter().any(|child| nested_tactic(hover, pos, tail_pos, child))
        }
        InfoTree::Node(Info::MacroExpansion(_), children) => {
            children.iter().any(|child| nested_tactic(hover, pos, tail_pos, child))
        }
        _ => false,
    }
}

/// A `by` without any tactics.
fn is_empty_by(stx: &Syntax) -> bool {
    stx.get_num_args() == 2
        && matches!(stx.get_arg(0), Syntax::Atom { val, .. } if val == "by")
        && stx.get_arg(1).get_num_args() == 1
        && stx.get_arg(1).get_arg(0).is_missing()
}

#[cfg(test)]
mod test {
    use lumen_lang_ast::{MetavarContext, SourceInfo};

    use super::*;
    use crate::info::data::{ElabInfo, PartialContextInfo};

    fn tactic(stx: Syntax) -> TacticInfo {
        TacticInfo {
            elab: ElabInfo::new("tactic", stx),
            mctx_before: MetavarContext::new(),
            mctx_after: MetavarContext::new(),
            goals_before: vec![MVarId(0)],
            goals_after: vec![],
        }
    }

    fn atom(pos: u32, end: u32, val: &str) -> Syntax {
        Syntax::atom(SourceInfo::original(pos, end), val)
    }

    fn with_ctx(tree: InfoTree) -> InfoTree {
        InfoTree::context(PartialContextInfo::CommandCtx(ContextInfo::default()), tree)
    }

    #[test]
    fn empty_by() {
        let by = Syntax::node(
            SourceInfo::None,
            kinds::BY_TACTIC,
            vec![
                atom(0, 2, "by"),
                Syntax::node(SourceInfo::None, kinds::TACTIC_SEQ, vec![Syntax::Missing]),
            ],
        );
        assert!(is_empty_by(&by));
        let by = Syntax::node(
            SourceInfo::None,
            kinds::BY_TACTIC,
            vec![
                atom(0, 2, "by"),
                Syntax::node(SourceInfo::None, kinds::TACTIC_SEQ, vec![atom(3, 7, "simp")]),
            ],
        );
        assert!(!is_empty_by(&by));
    }

    #[test]
    fn nested_by_blocks_are_ignored() {
        let by = Syntax::node(
            SourceInfo::original(7, 12),
            kinds::BY_TACTIC,
            vec![atom(7, 9, "by"), atom(10, 12, "rfl")],
        );
        let child = InfoTree::leaf(tactic(by));
        assert!(!nested_tactic(ByteIndex(8), ByteIndex(0), ByteIndex(20), &child));
        let child = InfoTree::leaf(tactic(atom(7, 12, "simp")));
        assert!(nested_tactic(ByteIndex(8), ByteIndex(0), ByteIndex(20), &child));
        assert!(!nested_tactic(ByteIndex(12), ByteIndex(0), ByteIndex(20), &child));
        let same = InfoTree::leaf(tactic(atom(0, 20, "simp")));
        assert!(!nested_tactic(ByteIndex(8), ByteIndex(0), ByteIndex(20), &same));
    }

    #[test]
    fn last_line_wins() {
        // The trailing whitespace of `simp` reaches into the next line
        let file = FileMap::new("  simp\n  rfl\n\n");
        let first = InfoTree::leaf(tactic(Syntax::atom(
            SourceInfo::original_with_trailing(2, 6, 4),
            "simp",
        )));
        let second = InfoTree::leaf(tactic(Syntax::atom(
            SourceInfo::original_with_trailing(9, 12, 2),
            "rfl",
        )));
        let seq = Syntax::node(SourceInfo::None, kinds::TACTIC_SEQ, vec![]);
        let tree = with_ctx(InfoTree::node(
            tactic(Syntax::node(SourceInfo::None, kinds::BY_TACTIC, vec![seq])),
            vec![first, second],
        ));
        let res = goals_at(&file, &tree, ByteIndex(9)).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].tactic_info.elab.stx.get_pos(true), Some(ByteIndex(9)));
    }

    #[test]
    fn goals_before_and_after() {
        let mut ctx = ContextInfo::default();
        let goal = ctx.mctx.mk_expr_mvar(
            Default::default(),
            lumen_lang_ast::Expr::cnst("True", vec![]),
            Default::default(),
        );
        let mut info = tactic(atom(0, 7, "trivial"));
        info.mctx_before = ctx.mctx.clone();
        info.goals_before = vec![goal];
        let result = GoalsAtResult {
            ctx,
            tactic_info: info,
            use_after: false,
            indented: false,
            has_nested_tactic: false,
        };
        assert_eq!(result.pp_goals().unwrap(), "⊢ True");
        let result = GoalsAtResult { use_after: true, ..result };
        assert_eq!(result.pp_goals().unwrap(), "no goals");
    }
}
