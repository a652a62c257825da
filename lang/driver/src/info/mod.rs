//! Info trees and the queries the language server answers with them:
//! goals and hover information at a position, completions and the presence of `sorry`.

mod data;
mod goals;
mod hover;
mod index;
mod sorry;
mod tree;
pub mod visit;

pub use data::*;
pub use goals::*;
pub use hover::*;
pub use index::*;
pub use sorry::*;
pub use tree::*;
pub use visit::{
    collect_nodes_bottom_up, collect_nodes_bottom_up_m, deepest_nodes, deepest_nodes_m,
    find_info, fold_info, fold_info_tree, get_completion_infos, infallible, smallest_info,
    visit_m, visit_m_unit,
};
