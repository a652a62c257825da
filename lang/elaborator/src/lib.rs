pub mod config;
pub mod level_def_eq;
pub mod meta;
pub mod result;
pub mod trace;

pub use config::ElabConfig;
pub use level_def_eq::LBool;
pub use meta::{MetaCtx, PostponedLevelEq, SavedState};
pub use result::{ElabError, ElabResult};
pub use trace::{TraceEntry, TraceRegistry};
