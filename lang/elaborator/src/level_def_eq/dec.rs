use lumen_lang_ast::Level;

use crate::meta::MetaCtx;
use crate::result::{ElabError, ElabResult};

impl MetaCtx {
    /// Compute a level `v` such that `v+1` is equal to `level`, if there obviously is one.
    ///
    /// Assigned metavariables are looked through; unassigned metavariables and parameters
    /// cannot be decremented. A `max` or `imax` can be decremented if both of its arguments can,
    /// since `imax u v` equals `max u v` whenever `v` is not zero.
    pub fn dec_level_opt(&self, level: &Level) -> ElabResult<Option<Level>> {
        match level {
            Level::Zero | Level::Param(_) => Ok(None),
            Level::MVar(mvar) => match self.get_level_mvar_assignment(*mvar) {
                Some(assignment) => self.dec_level_opt(assignment),
                None => Ok(None),
            },
            Level::Succ(pred) => Ok(Some(pred.as_ref().clone())),
            Level::Max(l, r) | Level::IMax(l, r) => {
                let Some(l) = self.dec_level_opt(l)? else {
                    return Ok(None);
                };
                let Some(r) = self.dec_level_opt(r)? else {
                    return Ok(None);
                };
                Ok(Some(Level::mk_max_simp(l, r)))
            }
        }
    }

    pub fn dec_level(&self, level: &Level) -> ElabResult<Level> {
        self.dec_level_opt(level)?.ok_or_else(|| ElabError::cannot_decrement(level))
    }
}
