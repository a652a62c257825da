use crate::{Expr, FVarId, Name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDecl {
    pub fvar_id: FVarId,
    pub user_name: Name,
    pub typ: Expr,
    /// The value of a `let`-bound variable.
    pub value: Option<Expr>,
}

/// The local hypotheses in scope, in the order in which they were introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalContext {
    decls: Vec<LocalDecl>,
}

impl LocalContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: LocalDecl) {
        self.decls.push(decl);
    }

    pub fn find(&self, fvar_id: FVarId) -> Option<&LocalDecl> {
        self.decls.iter().find(|decl| decl.fvar_id == fvar_id)
    }

    /// The most recently introduced declaration with the given user-facing name.
    pub fn find_from_user_name(&self, name: &Name) -> Option<&LocalDecl> {
        self.decls.iter().rev().find(|decl| &decl.user_name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shadowed_names_resolve_to_latest() {
        let mut lctx = LocalContext::empty();
        let nat = Expr::cnst("Nat", vec![]);
        lctx.push(LocalDecl { fvar_id: FVarId(0), user_name: "x".into(), typ: nat.clone(), value: None });
        lctx.push(LocalDecl { fvar_id: FVarId(1), user_name: "x".into(), typ: nat, value: None });
        assert_eq!(lctx.find_from_user_name(&"x".into()).map(|d| d.fvar_id), Some(FVarId(1)));
        assert!(lctx.find(FVarId(0)).is_some());
        assert!(lctx.find(FVarId(2)).is_none());
        assert_eq!(lctx.len(), 2);
    }
}
