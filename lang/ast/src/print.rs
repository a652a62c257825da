//! Pretty printing of levels and expressions using the `pretty` crate

use std::io;

use pretty::DocAllocator;

use crate::{Binder, BinderInfo, Expr, Level, Literal, Name, Syntax};

pub const DEFAULT_WIDTH: usize = 100;
const TRACE_WIDTH: usize = 100_000;

#[derive(Debug, Clone, Copy)]
pub enum Anno {
    Keyword,
    MetaVar,
    Error,
}

pub type Alloc<'a> = pretty::Arena<'a, Anno>;
pub type Builder<'a> = pretty::DocBuilder<'a, Alloc<'a>, Anno>;

/// Operator precedences
pub type Precedence = u32;

/// Precedence of arguments, which have to be parenthesized unless they are atomic.
const PREC_ARG: Precedence = 1024;

pub struct PrintCfg {
    /// The width of the output terminal/device. Width is used for
    /// the insertion of linebreaks.
    pub width: usize,
    /// How many spaces of indentation are used
    pub indent: isize,
    /// Whether to print universe levels of constants, e.g. `List.{u} α`.
    pub print_universes: bool,
}

impl Default for PrintCfg {
    fn default() -> Self {
        Self { width: DEFAULT_WIDTH, indent: 2, print_universes: false }
    }
}

pub trait Print {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        self.print_prec(cfg, alloc, 0)
    }

    /// Print with precedence information about the enclosing context.
    ///
    /// * `_prec` The precedence of the surrounding context.
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        self.print(cfg, alloc)
    }

    fn print_io<W: io::Write>(&self, cfg: &PrintCfg, out: &mut W) -> io::Result<()> {
        let alloc = Alloc::new();
        let doc_builder = self.print(cfg, &alloc);
        doc_builder.1.render(cfg.width, out)
    }

    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String {
        let mut buf = Vec::new();
        let def = PrintCfg::default();
        let cfg = cfg.unwrap_or(&def);
        // Rendering into a `Vec` cannot fail.
        let _ = self.print_io(cfg, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Print on a single line, for trace messages.
    fn print_trace(&self) -> String {
        let cfg = PrintCfg { width: TRACE_WIDTH, ..Default::default() };
        self.print_to_string(Some(&cfg))
    }
}

impl<T: Print> Print for Box<T> {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        T::print_prec(self, cfg, alloc, prec)
    }
}

impl<T: Print> Print for Vec<T> {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        let items = self.iter().map(|item| item.print(cfg, alloc));
        alloc.text("[").append(alloc.intersperse(items, alloc.text(", "))).append("]")
    }
}

fn parens_if<'a>(cond: bool, doc: Builder<'a>) -> Builder<'a> {
    if cond { doc.parens() } else { doc }
}

impl Print for Name {
    fn print<'a>(&'a self, _cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        alloc.text(self.to_string())
    }
}

impl Print for Level {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        if let Some(n) = self.to_nat() {
            return alloc.text(n.to_string());
        }
        match self {
            Level::Succ(_) => {
                let k = self.get_offset();
                let base = self.get_level_offset().print_prec(cfg, alloc, PREC_ARG);
                parens_if(prec >= PREC_ARG, base.append(alloc.text(format!("+{k}"))))
            }
            Level::Max(l, r) => {
                let doc = alloc
                    .keyword("max")
                    .append(alloc.space())
                    .append(l.print_prec(cfg, alloc, PREC_ARG))
                    .append(alloc.space())
                    .append(r.print_prec(cfg, alloc, PREC_ARG));
                parens_if(prec >= PREC_ARG, doc)
            }
            Level::IMax(l, r) => {
                let doc = alloc
                    .keyword("imax")
                    .append(alloc.space())
                    .append(l.print_prec(cfg, alloc, PREC_ARG))
                    .append(alloc.space())
                    .append(r.print_prec(cfg, alloc, PREC_ARG));
                parens_if(prec >= PREC_ARG, doc)
            }
            Level::Param(name) => name.print(cfg, alloc),
            Level::MVar(id) => alloc.text(id.to_string()).annotate(Anno::MetaVar),
            Level::Zero => alloc.text("0"),
        }
    }
}

fn print_binder<'a>(binder: &'a Binder, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let inner = binder
        .name
        .print(cfg, alloc)
        .append(alloc.text(" : "))
        .append(binder.typ.print(cfg, alloc));
    match binder.info {
        BinderInfo::Default => inner.parens(),
        BinderInfo::Implicit => inner.braces(),
        BinderInfo::StrictImplicit => alloc.text("⦃").append(inner).append(alloc.text("⦄")),
        BinderInfo::InstImplicit => inner.brackets(),
    }
}

impl Print for Expr {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        match self {
            Expr::BVar(idx) => alloc.text(format!("#{idx}")),
            Expr::FVar(id) => alloc.text(id.to_string()),
            Expr::MVar(id) => alloc.text(id.to_string()).annotate(Anno::MetaVar),
            Expr::Sort(Level::Zero) => alloc.keyword("Prop"),
            // `Sort (u+1)` is printed as `Type u`
            Expr::Sort(Level::Succ(pred)) if pred.is_zero() => alloc.keyword("Type"),
            Expr::Sort(Level::Succ(pred)) => parens_if(
                prec >= PREC_ARG,
                alloc.keyword("Type").append(alloc.space()).append(pred.print_prec(
                    cfg,
                    alloc,
                    PREC_ARG,
                )),
            ),
            Expr::Sort(l) => parens_if(
                prec >= PREC_ARG,
                alloc.keyword("Sort").append(alloc.space()).append(l.print_prec(cfg, alloc, PREC_ARG)),
            ),
            Expr::Const(name, levels) => {
                let doc = name.print(cfg, alloc);
                if cfg.print_universes && !levels.is_empty() {
                    let levels = levels.iter().map(|l| l.print(cfg, alloc));
                    doc.append(".").append(alloc.intersperse(levels, ", ").braces())
                } else {
                    doc
                }
            }
            Expr::App(..) => {
                let args = self.get_app_args();
                let mut doc = self.get_app_fn().print_prec(cfg, alloc, PREC_ARG);
                for arg in args {
                    doc = doc.append(alloc.line()).append(arg.print_prec(cfg, alloc, PREC_ARG));
                }
                parens_if(prec >= PREC_ARG, doc.nest(cfg.indent).group())
            }
            Expr::Lam(binder, body) => {
                let doc = alloc
                    .keyword("fun")
                    .append(alloc.space())
                    .append(print_binder(binder, cfg, alloc))
                    .append(alloc.text(" =>"))
                    .append(alloc.line().append(body.print(cfg, alloc)).nest(cfg.indent))
                    .group();
                parens_if(prec > 0, doc)
            }
            Expr::ForallE(binder, body) => {
                let doc = print_binder(binder, cfg, alloc)
                    .append(alloc.text(" →"))
                    .append(alloc.line())
                    .append(body.print(cfg, alloc))
                    .group();
                parens_if(prec > 0, doc)
            }
            Expr::Lit(Literal::Nat(n)) => alloc.text(n.to_string()),
            Expr::Lit(Literal::Str(s)) => alloc.text(format!("{s:?}")),
            Expr::Sorry { .. } => alloc.keyword("sorry"),
        }
    }
}

impl Print for Syntax {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        match self {
            Syntax::Missing => alloc.text("<missing>").annotate(Anno::Error),
            Syntax::Atom { val, .. } => alloc.text(val.as_str()),
            Syntax::Ident { raw_val, .. } => alloc.text(raw_val.as_str()),
            Syntax::Node { args, .. } => {
                let args = args.iter().filter(|arg| !arg.is_missing()).map(|arg| arg.print(cfg, alloc));
                alloc.intersperse(args, alloc.space())
            }
        }
    }
}

trait AllocExt<'a> {
    fn keyword(&'a self, text: &'a str) -> Builder<'a>;
}

impl<'a> AllocExt<'a> for Alloc<'a> {
    fn keyword(&'a self, text: &'a str) -> Builder<'a> {
        self.text(text).annotate(Anno::Keyword)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{LMVarId, MVarId};

    #[test]
    fn print_levels() {
        assert_eq!(Level::of_nat(3).print_trace(), "3");
        assert_eq!(Level::param("u").add_offset(1).print_trace(), "u+1");
        assert_eq!(Level::mvar(LMVarId(3)).print_trace(), "?u.3");
        let l = Level::max(Level::param("u"), Level::imax(Level::param("v"), Level::one()));
        assert_eq!(l.print_trace(), "max u (imax v 1)");
        let l = Level::succ(Level::max(Level::param("u"), Level::param("v")));
        assert_eq!(l.print_trace(), "(max u v)+1");
    }

    #[test]
    fn print_exprs() {
        assert_eq!(Expr::sort(Level::zero()).print_trace(), "Prop");
        assert_eq!(Expr::sort(Level::one()).print_trace(), "Type");
        assert_eq!(Expr::sort(Level::param("u")).print_trace(), "Sort u");
        assert_eq!(Expr::sort(Level::param("u").add_offset(2)).print_trace(), "Type (u+1)");
        assert_eq!(Expr::MVar(MVarId(2)).print_trace(), "?m.2");
        let e = Expr::mk_app(
            Expr::cnst("f", vec![]),
            [Expr::sorry(Expr::sort(Level::zero()), false), Expr::app(Expr::cnst("g", vec![]), Expr::Lit(Literal::Nat(1)))],
        );
        assert_eq!(e.print_trace(), "f sorry (g 1)");
    }
}
