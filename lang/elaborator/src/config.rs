use serde_derive::Deserialize;

use crate::result::{ElabError, ElabResult};

/// Options which influence how universe level constraints are solved.
///
/// The configuration can be read from a TOML document, e.g.
///
/// ```toml
/// ignore_level_mvar_depth = true
/// max_postponed_rounds = 16
/// ```
///
/// Keys which are not present take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElabConfig {
    /// Treat every level metavariable as assignable, regardless of the depth at which it was created.
    /// When two metavariables are unified, the one created at the greater depth is assigned.
    pub ignore_level_mvar_depth: bool,
    /// Whether stuck level constraints which still contain assignable metavariables are postponed
    /// instead of failing.
    pub allow_postponement: bool,
    /// Report constraints stuck on a read-only metavariable as an error instead of answering `false`.
    pub is_def_eq_stuck_ex: bool,
    /// Upper bound on the number of rounds spent retrying postponed constraints.
    pub max_postponed_rounds: usize,
}

impl Default for ElabConfig {
    fn default() -> Self {
        Self {
            ignore_level_mvar_depth: false,
            allow_postponement: true,
            is_def_eq_stuck_ex: false,
            max_postponed_rounds: 64,
        }
    }
}

impl ElabConfig {
    pub fn from_toml_str(text: &str) -> ElabResult<Self> {
        toml::from_str(text).map_err(|err| ElabError::Config { message: err.to_string() }.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(ElabConfig::from_toml_str("").unwrap(), ElabConfig::default());
    }

    #[test]
    fn partial_document() {
        let cfg = ElabConfig::from_toml_str("ignore_level_mvar_depth = true\nmax_postponed_rounds = 3\n")
            .unwrap();
        assert!(cfg.ignore_level_mvar_depth);
        assert!(cfg.allow_postponement);
        assert_eq!(cfg.max_postponed_rounds, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ElabConfig::from_toml_str("postpone = false").unwrap_err();
        assert!(matches!(*err, ElabError::Config { .. }));
    }
}
