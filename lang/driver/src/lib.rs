mod codespan;
mod info;
mod result;

pub use codespan::*;
pub use info::*;
pub use result::*;
