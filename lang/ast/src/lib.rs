mod expr;
mod ident;
mod level;
mod local_ctx;
mod mctx;
pub mod print;
mod span;
pub mod syntax;

pub use expr::*;
pub use ident::*;
pub use level::*;
pub use local_ctx::*;
pub use mctx::*;
pub use print::Print;
pub use span::*;
pub use syntax::{SourceInfo, Syntax};

pub type HashMap<K, V> = fxhash::FxHashMap<K, V>;
