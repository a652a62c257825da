use std::borrow::Cow;

use lumen_lang_ast::{
    ByteIndex, Expr, LocalContext, MVarId, MetavarContext, Name, Print, Span, Syntax,
};
use lumen_lang_elaborator::{ElabResult, MetaCtx};

use crate::result::{DriverError, DriverResult};

// Context info
//
// The ambient information in effect at a point of an info tree.

/// The context in which the nodes below a [crate::InfoTree::Context] node were elaborated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextInfo {
    pub env_name: Name,
    pub mctx: MetavarContext,
    pub options: Vec<(Name, String)>,
    pub curr_namespace: Name,
    pub open_decls: Vec<Name>,
    /// The declaration being elaborated, if any.
    pub parent_decl: Option<Name>,
}

impl ContextInfo {
    /// Run `f` against a fresh elaboration state holding this context's metavariables.
    pub fn run_meta<T, F>(&self, f: F) -> DriverResult<T>
    where
        F: FnOnce(&mut MetaCtx) -> ElabResult<T>,
    {
        let mut meta = MetaCtx::default();
        meta.mctx = self.mctx.clone();
        Ok(f(&mut meta)?)
    }

    pub fn instantiate_mvars(&self, expr: &Expr) -> Expr {
        self.mctx.clone().instantiate_mvars(expr)
    }

    /// Render a goal as its hypotheses followed by `⊢` and its target.
    pub fn pp_goal(&self, goal: MVarId) -> DriverResult<String> {
        let decl = self.mctx.get_expr_decl(goal).map_err(DriverError::from)?;
        let mut out = String::new();
        if !decl.user_name.is_anonymous() {
            out.push_str(&format!("case {}\n", decl.user_name));
        }
        for hyp in decl.lctx.iter() {
            let typ = self.instantiate_mvars(&hyp.typ);
            out.push_str(&format!("{} : {}\n", hyp.user_name, typ.print_to_string(None)));
        }
        let target = self.instantiate_mvars(&decl.typ);
        out.push_str(&format!("⊢ {}", target.print_to_string(None)));
        Ok(out)
    }

    pub fn pp_goals(&self, goals: &[MVarId]) -> DriverResult<String> {
        if goals.is_empty() {
            return Ok("no goals".to_owned());
        }
        let goals = goals.iter().map(|goal| self.pp_goal(*goal)).collect::<Result<Vec<_>, _>>()?;
        Ok(goals.join("\n\n"))
    }
}

/// Context information which is only complete once merged into the context of the enclosing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialContextInfo {
    /// A complete command context, which takes the parent declaration of the outer context.
    CommandCtx(ContextInfo),
    /// Sets the parent declaration of the outer context.
    ParentDeclCtx(Name),
}

impl PartialContextInfo {
    /// Like [PartialContextInfo::merge_into_outer], but `None` where that would panic.
    pub fn try_merge_into_outer(&self, outer: Option<&ContextInfo>) -> Option<ContextInfo> {
        match (self, outer) {
            (PartialContextInfo::CommandCtx(inner), None) => Some(inner.clone()),
            (PartialContextInfo::ParentDeclCtx(_), None) => None,
            (PartialContextInfo::CommandCtx(inner), Some(outer)) => {
                Some(ContextInfo { parent_decl: outer.parent_decl.clone(), ..inner.clone() })
            }
            (PartialContextInfo::ParentDeclCtx(decl), Some(outer)) => {
                Some(ContextInfo { parent_decl: Some(decl.clone()), ..outer.clone() })
            }
        }
    }

    /// Panics for a parent declaration without an outer context.
    pub fn merge_into_outer(&self, outer: Option<&ContextInfo>) -> ContextInfo {
        match self.try_merge_into_outer(outer) {
            Some(ctx) => ctx,
            None => panic!("unexpected incomplete info tree context info"),
        }
    }
}

// Info
//
// One record per elaboration step, attached to the syntax it elaborated.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Info {
    Tactic(TacticInfo),
    Term(TermInfo),
    Command(CommandInfo),
    MacroExpansion(MacroExpansionInfo),
    FieldRedecl(FieldRedeclInfo),
    Completion(CompletionInfo),
    Field(FieldInfo),
    Option(OptionInfo),
    UserWidget(UserWidgetInfo),
    Custom(CustomInfo),
}

/// The elaborator that ran and the syntax it ran on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElabInfo {
    pub elaborator: Name,
    pub stx: Syntax,
}

impl ElabInfo {
    pub fn new<N: Into<Name>>(elaborator: N, stx: Syntax) -> Self {
        ElabInfo { elaborator: elaborator.into(), stx }
    }
}

/// A tactic step together with the goals and metavariables before and after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacticInfo {
    pub elab: ElabInfo,
    pub mctx_before: MetavarContext,
    pub mctx_after: MetavarContext,
    pub goals_before: Vec<MVarId>,
    pub goals_after: Vec<MVarId>,
}

impl From<TacticInfo> for Info {
    fn from(value: TacticInfo) -> Self {
        Info::Tactic(value)
    }
}

/// A term and the local context and expected type it was elaborated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermInfo {
    pub elab: ElabInfo,
    pub lctx: LocalContext,
    pub expected_type: Option<Expr>,
    pub expr: Expr,
    /// Whether the term introduces a local variable.
    pub is_binder: bool,
}

impl From<TermInfo> for Info {
    fn from(value: TermInfo) -> Self {
        Info::Term(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub elab: ElabInfo,
}

impl From<CommandInfo> for Info {
    fn from(value: CommandInfo) -> Self {
        Info::Command(value)
    }
}

/// The expansion of a macro; `output` is the syntax it expanded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroExpansionInfo {
    pub lctx: LocalContext,
    pub stx: Syntax,
    pub output: Syntax,
}

impl From<MacroExpansionInfo> for Info {
    fn from(value: MacroExpansionInfo) -> Self {
        Info::MacroExpansion(value)
    }
}

/// A field of a structure instance which redeclares a field of a parent structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRedeclInfo {
    pub stx: Syntax,
}

impl From<FieldRedeclInfo> for Info {
    fn from(value: FieldRedeclInfo) -> Self {
        Info::FieldRedecl(value)
    }
}

/// A position at which the language server offers completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionInfo {
    /// After `e.`, where `e` is described by the term info.
    Dot { term: TermInfo, expected_type: Option<Expr> },
    Id { stx: Syntax, id: Name, dangling_dot: bool, lctx: LocalContext, expected_type: Option<Expr> },
    Namespace { stx: Syntax },
    Option { stx: Syntax },
    Tactic { stx: Syntax },
    FieldId { stx: Syntax, id: Option<Name>, lctx: LocalContext, struct_name: Name },
}

impl CompletionInfo {
    pub fn stx(&self) -> &Syntax {
        match self {
            CompletionInfo::Dot { term, .. } => &term.elab.stx,
            CompletionInfo::Id { stx, .. }
            | CompletionInfo::Namespace { stx }
            | CompletionInfo::Option { stx }
            | CompletionInfo::Tactic { stx }
            | CompletionInfo::FieldId { stx, .. } => stx,
        }
    }

    pub fn lctx(&self) -> Option<&LocalContext> {
        match self {
            CompletionInfo::Dot { term, .. } => Some(&term.lctx),
            CompletionInfo::Id { lctx, .. } | CompletionInfo::FieldId { lctx, .. } => Some(lctx),
            _ => None,
        }
    }
}

impl From<CompletionInfo> for Info {
    fn from(value: CompletionInfo) -> Self {
        Info::Completion(value)
    }
}

/// A field of a structure instance, e.g. `x := 1` in `{ x := 1 }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub proj_name: Name,
    pub field_name: Name,
    pub lctx: LocalContext,
    pub val: Expr,
    pub stx: Syntax,
}

impl From<FieldInfo> for Info {
    fn from(value: FieldInfo) -> Self {
        Info::Field(value)
    }
}

/// A reference to an option, e.g. in `set_option pp.all true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInfo {
    pub stx: Syntax,
    pub option_name: Name,
    pub decl_name: Name,
}

impl From<OptionInfo> for Info {
    fn from(value: OptionInfo) -> Self {
        Info::Option(value)
    }
}

/// A widget to be displayed by the editor; `props` is its JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWidgetInfo {
    pub stx: Syntax,
    pub widget_id: Name,
    pub props: String,
}

impl From<UserWidgetInfo> for Info {
    fn from(value: UserWidgetInfo) -> Self {
        Info::UserWidget(value)
    }
}

/// Information attached by an extension; `value` is opaque to the queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomInfo {
    pub stx: Syntax,
    pub value: String,
}

impl From<CustomInfo> for Info {
    fn from(value: CustomInfo) -> Self {
        Info::Custom(value)
    }
}

impl Info {
    pub fn stx(&self) -> &Syntax {
        match self {
            Info::Tactic(i) => &i.elab.stx,
            Info::Term(i) => &i.elab.stx,
            Info::Command(i) => &i.elab.stx,
            Info::MacroExpansion(i) => &i.stx,
            Info::FieldRedecl(i) => &i.stx,
            Info::Completion(i) => i.stx(),
            Info::Field(i) => &i.stx,
            Info::Option(i) => &i.stx,
            Info::UserWidget(i) => &i.stx,
            Info::Custom(i) => &i.stx,
        }
    }

    /// The local context of the node, for the variants that carry one.
    pub fn lctx(&self) -> Option<&LocalContext> {
        match self {
            Info::Term(i) => Some(&i.lctx),
            Info::Field(i) => Some(&i.lctx),
            Info::MacroExpansion(i) => Some(&i.lctx),
            Info::Completion(i) => i.lctx(),
            _ => None,
        }
    }

    pub fn pos(&self) -> Option<ByteIndex> {
        self.stx().get_pos(true)
    }

    pub fn tail_pos(&self) -> Option<ByteIndex> {
        self.stx().get_tail_pos(true)
    }

    pub fn range(&self) -> Option<Span> {
        self.stx().get_range(true)
    }

    pub fn contains(&self, pos: ByteIndex, include_stop: bool) -> bool {
        self.range().is_some_and(|range| range.contains(pos, include_stop))
    }

    /// The length of the range of the node.
    pub fn size(&self) -> Option<u32> {
        self.range().map(|range| range.len())
    }

    /// Nodes with a range are smaller than nodes without one.
    pub fn is_smaller(&self, other: &Info) -> bool {
        match (self.size(), other.size()) {
            (Some(size), Some(other_size)) => size < other_size,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// The offset of `pos` relative to the start of the node, if the node contains it.
    pub fn occurs_inside(&self, pos: ByteIndex) -> Option<u32> {
        let head = self.pos()?;
        let tail = self.tail_pos()?;
        (head <= pos && pos < tail).then(|| pos - head)
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Info::Term(_))
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, Info::Completion(_))
    }

    pub fn as_term(&self) -> Option<&TermInfo> {
        match self {
            Info::Term(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_tactic(&self) -> Option<&TacticInfo> {
        match self {
            Info::Tactic(i) => Some(i),
            _ => None,
        }
    }

    /// The context in which the children of this node were elaborated.
    ///
    /// The children of a tactic see the metavariables as they are after the tactic ran.
    pub fn update_context<'a>(&self, ctx: &'a ContextInfo) -> Cow<'a, ContextInfo> {
        match self {
            Info::Tactic(i) => {
                Cow::Owned(ContextInfo { mctx: i.mctx_after.clone(), ..ctx.clone() })
            }
            _ => Cow::Borrowed(ctx),
        }
    }

    /// The type shown on hover, with metavariables instantiated.
    pub fn type_of_hover(&self, ctx: &ContextInfo) -> Option<Expr> {
        match self {
            Info::Term(i) => i.expected_type.as_ref().map(|typ| ctx.instantiate_mvars(typ)),
            _ => None,
        }
    }

    /// The text shown on hover.
    pub fn fmt_hover(&self, ctx: &ContextInfo) -> Option<String> {
        match self {
            Info::Term(i) => {
                let expr = ctx.instantiate_mvars(&i.expr).print_to_string(None);
                match self.type_of_hover(ctx) {
                    Some(typ) => Some(format!("{expr} : {}", typ.print_to_string(None))),
                    None => Some(expr),
                }
            }
            Info::Field(i) => {
                let val = ctx.instantiate_mvars(&i.val).print_to_string(None);
                Some(format!("{}.{} := {val}", i.proj_name, i.field_name))
            }
            Info::Option(i) => Some(format!("option {}", i.option_name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use lumen_lang_ast::{Level, LocalDecl, SourceInfo};

    use super::*;

    fn term(pos: u32, end: u32, expr: Expr) -> Info {
        TermInfo {
            elab: ElabInfo::new("term", Syntax::atom(SourceInfo::original(pos, end), "x")),
            lctx: LocalContext::empty(),
            expected_type: None,
            expr,
            is_binder: false,
        }
        .into()
    }

    #[test]
    fn merge_command_ctx_keeps_outer_parent_decl() {
        let outer = ContextInfo { parent_decl: Some(Name::from("foo")), ..Default::default() };
        let inner = ContextInfo { env_name: Name::from("Env"), ..Default::default() };
        let merged = PartialContextInfo::CommandCtx(inner).merge_into_outer(Some(&outer));
        assert_eq!(merged.env_name, Name::from("Env"));
        assert_eq!(merged.parent_decl, Some(Name::from("foo")));
    }

    #[test]
    fn merge_parent_decl_ctx() {
        let outer = ContextInfo { env_name: Name::from("Env"), ..Default::default() };
        let merged =
            PartialContextInfo::ParentDeclCtx(Name::from("bar")).merge_into_outer(Some(&outer));
        assert_eq!(merged.env_name, Name::from("Env"));
        assert_eq!(merged.parent_decl, Some(Name::from("bar")));
        assert_eq!(
            PartialContextInfo::ParentDeclCtx(Name::from("bar")).try_merge_into_outer(None),
            None
        );
    }

    #[test]
    #[should_panic(expected = "unexpected incomplete info tree context info")]
    fn merge_parent_decl_ctx_without_outer() {
        PartialContextInfo::ParentDeclCtx(Name::from("bar")).merge_into_outer(None);
    }

    #[test]
    fn ranges() {
        let info = term(10, 20, Expr::sort(Level::zero()));
        assert_eq!(info.range(), Some(Span::new(10, 20)));
        assert_eq!(info.size(), Some(10));
        assert!(info.contains(ByteIndex(10), false));
        assert!(!info.contains(ByteIndex(20), false));
        assert!(info.contains(ByteIndex(20), true));
        assert_eq!(info.occurs_inside(ByteIndex(12)), Some(2));
        assert_eq!(info.occurs_inside(ByteIndex(20)), None);
    }

    #[test]
    fn smaller() {
        let small = term(12, 14, Expr::sort(Level::zero()));
        let large = term(10, 20, Expr::sort(Level::zero()));
        let none: Info = FieldRedeclInfo { stx: Syntax::Missing }.into();
        assert!(small.is_smaller(&large));
        assert!(!large.is_smaller(&small));
        assert!(small.is_smaller(&none));
        assert!(!none.is_smaller(&small));
    }

    #[test]
    fn tactic_updates_context() {
        let mut mctx_after = MetavarContext::new();
        mctx_after.inc_depth(true);
        let tactic: Info = TacticInfo {
            elab: ElabInfo::new("tactic", Syntax::Missing),
            mctx_before: MetavarContext::new(),
            mctx_after: mctx_after.clone(),
            goals_before: vec![],
            goals_after: vec![],
        }
        .into();
        let ctx = ContextInfo::default();
        assert_eq!(tactic.update_context(&ctx).mctx, mctx_after);
        let term = term(0, 1, Expr::sort(Level::zero()));
        assert!(matches!(term.update_context(&ctx), Cow::Borrowed(_)));
    }

    #[test]
    fn hover_instantiates_mvars() {
        let mut ctx = ContextInfo::default();
        let goal = ctx.mctx.mk_expr_mvar(
            LocalContext::empty(),
            Expr::sort(Level::one()),
            Name::anonymous(),
        );
        ctx.mctx.assign_expr(goal, Expr::cnst("Nat", vec![])).unwrap();
        let mut info = term(0, 3, Expr::MVar(goal));
        if let Info::Term(term) = &mut info {
            term.expected_type = Some(Expr::sort(Level::one()));
        }
        assert_eq!(info.fmt_hover(&ctx).unwrap(), "Nat : Type");
    }

    #[test]
    fn goals_are_printed_with_hypotheses() {
        let mut ctx = ContextInfo::default();
        let mut lctx = LocalContext::empty();
        lctx.push(LocalDecl {
            fvar_id: lumen_lang_ast::FVarId(0),
            user_name: Name::from("h"),
            typ: Expr::cnst("True", vec![]),
            value: None,
        });
        let goal = ctx.mctx.mk_expr_mvar(lctx, Expr::cnst("False", vec![]), Name::anonymous());
        assert_eq!(ctx.pp_goals(&[goal]).unwrap(), "h : True\n⊢ False");
        assert_eq!(ctx.pp_goals(&[]).unwrap(), "no goals");
        assert!(ctx.pp_goal(MVarId(42)).is_err());
    }
}
