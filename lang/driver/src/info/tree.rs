use im::Vector;

use lumen_lang_ast::MVarId;

use super::data::{Info, PartialContextInfo};

/// The tree of [Info] nodes recorded while elaborating a command.
///
/// Children are kept in a persistent vector so that snapshots of a tree under
/// construction share their structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoTree {
    /// The context for the nodes of the subtree.
    Context(PartialContextInfo, Box<InfoTree>),
    Node(Info, Vector<InfoTree>),
    /// A subtree which has not been elaborated yet, standing for the goal `MVarId`.
    Hole(MVarId),
}

impl InfoTree {
    pub fn node<I, C>(info: I, children: C) -> InfoTree
    where
        I: Into<Info>,
        C: IntoIterator<Item = InfoTree>,
    {
        InfoTree::Node(info.into(), children.into_iter().collect())
    }

    pub fn leaf<I: Into<Info>>(info: I) -> InfoTree {
        InfoTree::Node(info.into(), Vector::new())
    }

    pub fn context(ctx: PartialContextInfo, tree: InfoTree) -> InfoTree {
        InfoTree::Context(ctx, Box::new(tree))
    }

    pub fn children(&self) -> Option<&Vector<InfoTree>> {
        match self {
            InfoTree::Node(_, children) => Some(children),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&Info> {
        match self {
            InfoTree::Node(info, _) => Some(info),
            _ => None,
        }
    }
}
