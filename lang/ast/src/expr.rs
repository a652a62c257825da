use derivative::Derivative;

use crate::{FVarId, Level, MVarId, Name};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BinderInfo {
    #[default]
    Default,
    Implicit,
    StrictImplicit,
    InstImplicit,
}

/// The binder of a `fun` or a `∀`.
///
/// The name and the binder annotation are only used for printing and
/// are ignored when comparing expressions.
#[derive(Debug, Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash)]
pub struct Binder {
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub name: Name,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub info: BinderInfo,
    pub typ: Box<Expr>,
}

impl Binder {
    pub fn new<N: Into<Name>>(name: N, typ: Expr) -> Self {
        Binder { name: name.into(), info: BinderInfo::Default, typ: Box::new(typ) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Nat(u64),
    Str(String),
}

/// Elaborated terms, in a locally nameless representation with De Bruijn indices for bound variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    BVar(usize),
    FVar(FVarId),
    MVar(MVarId),
    Sort(Level),
    Const(Name, Vec<Level>),
    App(Box<Expr>, Box<Expr>),
    Lam(Binder, Box<Expr>),
    ForallE(Binder, Box<Expr>),
    Lit(Literal),
    /// A placeholder proof or term of type `typ`.
    /// Synthetic sorries are inserted by the elaborator after an error has been reported.
    Sorry {
        synthetic: bool,
        typ: Box<Expr>,
    },
}

impl Expr {
    pub fn sort(level: Level) -> Expr {
        Expr::Sort(level)
    }

    pub fn cnst<N: Into<Name>>(name: N, levels: Vec<Level>) -> Expr {
        Expr::Const(name.into(), levels)
    }

    pub fn app(f: Expr, a: Expr) -> Expr {
        Expr::App(Box::new(f), Box::new(a))
    }

    /// `f a₁ ... aₙ`
    pub fn mk_app<I: IntoIterator<Item = Expr>>(f: Expr, args: I) -> Expr {
        args.into_iter().fold(f, Expr::app)
    }

    pub fn lam(binder: Binder, body: Expr) -> Expr {
        Expr::Lam(binder, Box::new(body))
    }

    pub fn forall(binder: Binder, body: Expr) -> Expr {
        Expr::ForallE(binder, Box::new(body))
    }

    pub fn sorry(typ: Expr, synthetic: bool) -> Expr {
        Expr::Sorry { synthetic, typ: Box::new(typ) }
    }

    pub fn is_app(&self) -> bool {
        matches!(self, Expr::App(..))
    }

    pub fn is_mvar(&self) -> bool {
        matches!(self, Expr::MVar(_))
    }

    pub fn is_sort(&self) -> bool {
        matches!(self, Expr::Sort(_))
    }

    /// The function of an application `f a`.
    pub fn app_fn(&self) -> Option<&Expr> {
        match self {
            Expr::App(f, _) => Some(f),
            _ => None,
        }
    }

    /// The head of an application spine: `get_app_fn(f a₁ ... aₙ) = f`.
    pub fn get_app_fn(&self) -> &Expr {
        let mut e = self;
        while let Expr::App(f, _) = e {
            e = f;
        }
        e
    }

    pub fn get_app_args(&self) -> Vec<&Expr> {
        let mut args = Vec::new();
        let mut e = self;
        while let Expr::App(f, a) = e {
            args.push(a.as_ref());
            e = f;
        }
        args.reverse();
        args
    }

    /// Whether some subexpression satisfies `f`.
    pub fn any<F: Fn(&Expr) -> bool>(&self, f: &F) -> bool {
        if f(self) {
            return true;
        }
        match self {
            Expr::App(l, r) => l.any(f) || r.any(f),
            Expr::Lam(binder, body) | Expr::ForallE(binder, body) => {
                binder.typ.any(f) || body.any(f)
            }
            Expr::Sorry { typ, .. } => typ.any(f),
            Expr::BVar(_)
            | Expr::FVar(_)
            | Expr::MVar(_)
            | Expr::Sort(_)
            | Expr::Const(..)
            | Expr::Lit(_) => false,
        }
    }

    /// Rebuild the expression bottom-up. If `f` returns `Some(e)` for a subexpression,
    /// that subexpression is replaced by `e` and not visited further.
    pub fn replace<F: FnMut(&Expr) -> Option<Expr>>(&self, f: &mut F) -> Expr {
        if let Some(e) = f(self) {
            return e;
        }
        match self {
            Expr::App(l, r) => Expr::app(l.replace(f), r.replace(f)),
            Expr::Lam(binder, body) => {
                let binder = Binder { typ: Box::new(binder.typ.replace(f)), ..binder.clone() };
                Expr::lam(binder, body.replace(f))
            }
            Expr::ForallE(binder, body) => {
                let binder = Binder { typ: Box::new(binder.typ.replace(f)), ..binder.clone() };
                Expr::forall(binder, body.replace(f))
            }
            Expr::Sorry { synthetic, typ } => Expr::sorry(typ.replace(f), *synthetic),
            Expr::BVar(_)
            | Expr::FVar(_)
            | Expr::MVar(_)
            | Expr::Sort(_)
            | Expr::Const(..)
            | Expr::Lit(_) => self.clone(),
        }
    }

    pub fn is_synthetic_sorry(&self) -> bool {
        matches!(self, Expr::Sorry { synthetic: true, .. })
    }

    pub fn has_sorry(&self) -> bool {
        self.any(&|e| matches!(e, Expr::Sorry { .. }))
    }

    pub fn has_synthetic_sorry(&self) -> bool {
        self.any(&Expr::is_synthetic_sorry)
    }

    /// Whether the expression contains expression metavariables.
    pub fn has_expr_mvar(&self) -> bool {
        self.any(&Expr::is_mvar)
    }

    /// Whether some universe level of the expression contains a level metavariable.
    pub fn has_level_mvar(&self) -> bool {
        self.any(&|e| match e {
            Expr::Sort(l) => l.has_mvar(),
            Expr::Const(_, ls) => ls.iter().any(Level::has_mvar),
            _ => false,
        })
    }

    pub fn has_mvar(&self) -> bool {
        self.has_expr_mvar() || self.has_level_mvar()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nat() -> Expr {
        Expr::cnst("Nat", vec![])
    }

    #[test]
    fn app_spine() {
        let f = Expr::cnst("f", vec![]);
        let e = Expr::mk_app(f.clone(), [Expr::Lit(Literal::Nat(1)), Expr::Lit(Literal::Nat(2))]);
        assert_eq!(e.get_app_fn(), &f);
        assert_eq!(e.get_app_args().len(), 2);
        assert_eq!(e.app_fn().map(Expr::is_app), Some(true));
    }

    #[test]
    fn sorry_detection() {
        let e = Expr::app(Expr::cnst("f", vec![]), Expr::sorry(nat(), false));
        assert!(e.has_sorry());
        assert!(!e.has_synthetic_sorry());
        let e = Expr::lam(Binder::new("x", nat()), Expr::sorry(nat(), true));
        assert!(e.has_synthetic_sorry());
        assert!(!nat().has_sorry());
    }

    #[test]
    fn mvar_detection() {
        assert!(Expr::app(nat(), Expr::MVar(MVarId(0))).has_expr_mvar());
        let e = Expr::sort(Level::succ(Level::mvar(crate::LMVarId(2))));
        assert!(e.has_level_mvar());
        assert!(!e.has_expr_mvar());
        assert!(e.has_mvar());
    }

    #[test]
    fn binder_names_are_ignored_by_equality() {
        let l = Expr::lam(Binder::new("x", nat()), Expr::BVar(0));
        let r = Expr::lam(Binder::new("y", nat()), Expr::BVar(0));
        assert_eq!(l, r);
    }
}
