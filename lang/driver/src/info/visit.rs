//! Generic traversals of info trees
//!
//! All traversals visit children from left to right. Context nodes are merged into the
//! context of the enclosing nodes, and the children of a tactic node see the metavariable
//! context after the tactic ran (see [Info::update_context]).

use std::convert::Infallible;

use im::Vector;

use super::data::{CompletionInfo, ContextInfo, Info};
use super::tree::InfoTree;

/// Unwrap the result of a traversal whose callbacks cannot fail.
pub fn infallible<T>(res: Result<T, Infallible>) -> T {
    match res {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Visit the nodes of `tree`.
///
/// `pre` is called before the children of a node are visited and decides whether they are;
/// `post` combines the results of the children into the result of the node.
/// Holes have no result.
///
/// Panics if a node is reached without a context, i.e. if the tree does not start with a
/// [InfoTree::Context] node and no `ctx` is given.
pub fn visit_m<A, E, Pre, Post>(
    pre: &mut Pre,
    post: &mut Post,
    ctx: Option<&ContextInfo>,
    tree: &InfoTree,
) -> Result<Option<A>, E>
where
    Pre: FnMut(&ContextInfo, &Info, &Vector<InfoTree>) -> Result<bool, E>,
    Post: FnMut(&ContextInfo, &Info, &Vector<InfoTree>, Vec<Option<A>>) -> Result<A, E>,
{
    match tree {
        InfoTree::Context(partial, tree) => {
            let ctx = partial.merge_into_outer(ctx);
            visit_m(pre, post, Some(&ctx), tree)
        }
        InfoTree::Node(info, children) => {
            let Some(ctx) = ctx else {
                panic!("unexpected context-free info tree node");
            };
            let mut results = Vec::new();
            if pre(ctx, info, children)? {
                let child_ctx = info.update_context(ctx);
                results.reserve(children.len());
                for child in children {
                    results.push(visit_m(pre, post, Some(&*child_ctx), child)?);
                }
            }
            post(ctx, info, children, results).map(Some)
        }
        InfoTree::Hole(_) => Ok(None),
    }
}

/// [visit_m] for callbacks which only have effects.
pub fn visit_m_unit<E, Pre, Post>(
    pre: &mut Pre,
    post: &mut Post,
    ctx: Option<&ContextInfo>,
    tree: &InfoTree,
) -> Result<(), E>
where
    Pre: FnMut(&ContextInfo, &Info, &Vector<InfoTree>) -> Result<bool, E>,
    Post: FnMut(&ContextInfo, &Info, &Vector<InfoTree>) -> Result<(), E>,
{
    visit_m(pre, &mut |ctx, info, children, _| post(ctx, info, children), ctx, tree)?;
    Ok(())
}

/// Fold over all nodes in post-order: the children of a node are folded before the node itself.
///
/// Unlike [visit_m] this never panics; nodes without a context are passed `None`.
pub fn fold_info<A, F>(step: &mut F, init: A, tree: &InfoTree) -> A
where
    F: FnMut(Option<&ContextInfo>, &Info, A) -> A,
{
    fn go<A, F>(step: &mut F, ctx: Option<&ContextInfo>, acc: A, tree: &InfoTree) -> A
    where
        F: FnMut(Option<&ContextInfo>, &Info, A) -> A,
    {
        match tree {
            InfoTree::Context(partial, tree) => match partial.try_merge_into_outer(ctx) {
                Some(ctx) => go(step, Some(&ctx), acc, tree),
                None => go(step, ctx, acc, tree),
            },
            InfoTree::Node(info, children) => {
                let child_ctx = ctx.map(|ctx| info.update_context(ctx));
                let mut acc = acc;
                for child in children {
                    acc = go(step, child_ctx.as_deref(), acc, child);
                }
                step(ctx, info, acc)
            }
            InfoTree::Hole(_) => acc,
        }
    }

    go(step, None, init, tree)
}

/// Fold over every subtree in pre-order, including context nodes and holes.
pub fn fold_info_tree<A, F>(step: &mut F, init: A, tree: &InfoTree) -> A
where
    F: FnMut(Option<&ContextInfo>, &InfoTree, A) -> A,
{
    fn go<A, F>(step: &mut F, ctx: Option<&ContextInfo>, acc: A, tree: &InfoTree) -> A
    where
        F: FnMut(Option<&ContextInfo>, &InfoTree, A) -> A,
    {
        let acc = step(ctx, tree, acc);
        match tree {
            InfoTree::Context(partial, inner) => match partial.try_merge_into_outer(ctx) {
                Some(ctx) => go(step, Some(&ctx), acc, inner),
                None => go(step, ctx, acc, inner),
            },
            InfoTree::Node(info, children) => {
                let child_ctx = ctx.map(|ctx| info.update_context(ctx));
                let mut acc = acc;
                for child in children {
                    acc = go(step, child_ctx.as_deref(), acc, child);
                }
                acc
            }
            InfoTree::Hole(_) => acc,
        }
    }

    go(step, None, init, tree)
}

/// Collect values from all nodes bottom-up.
///
/// `p` receives the values collected from the children of a node, flattened in order, and
/// returns the values of the node.
pub fn collect_nodes_bottom_up_m<A, E, P>(p: &mut P, tree: &InfoTree) -> Result<Vec<A>, E>
where
    P: FnMut(&ContextInfo, &Info, &Vector<InfoTree>, Vec<A>) -> Result<Vec<A>, E>,
{
    let res = visit_m(
        &mut |_, _, _| Ok(true),
        &mut |ctx, info, children, results: Vec<Option<Vec<A>>>| {
            let results = results.into_iter().flatten().flatten().collect();
            p(ctx, info, children, results)
        },
        None,
        tree,
    )?;
    Ok(res.unwrap_or_default())
}

pub fn collect_nodes_bottom_up<A, P>(p: &mut P, tree: &InfoTree) -> Vec<A>
where
    P: FnMut(&ContextInfo, &Info, &Vector<InfoTree>, Vec<A>) -> Vec<A>,
{
    infallible(collect_nodes_bottom_up_m(
        &mut |ctx, info, children, rs| Ok(p(ctx, info, children, rs)),
        tree,
    ))
}

/// The deepest nodes for which `p` returns a value.
///
/// A node is only considered if none of its descendants yielded a value.
pub fn deepest_nodes_m<A, E, P>(p: &mut P, tree: &InfoTree) -> Result<Vec<A>, E>
where
    P: FnMut(&ContextInfo, &Info, &Vector<InfoTree>) -> Result<Option<A>, E>,
{
    collect_nodes_bottom_up_m(
        &mut |ctx, info, children, rs: Vec<A>| {
            if rs.is_empty() {
                Ok(p(ctx, info, children)?.into_iter().collect())
            } else {
                Ok(rs)
            }
        },
        tree,
    )
}

pub fn deepest_nodes<A, P>(p: &mut P, tree: &InfoTree) -> Vec<A>
where
    P: FnMut(&ContextInfo, &Info, &Vector<InfoTree>) -> Option<A>,
{
    infallible(deepest_nodes_m(&mut |ctx, info, children| Ok(p(ctx, info, children)), tree))
}

/// All completion infos of the tree, together with their context.
pub fn get_completion_infos(tree: &InfoTree) -> Vec<(ContextInfo, CompletionInfo)> {
    fold_info(
        &mut |ctx, info, mut acc: Vec<_>| {
            if let (Some(ctx), Info::Completion(completion)) = (ctx, info) {
                acc.push((ctx.clone(), completion.clone()));
            }
            acc
        },
        Vec::new(),
        tree,
    )
}

/// Among the deepest nodes satisfying `p`, the one with the smallest range.
pub fn smallest_info<P>(p: &mut P, tree: &InfoTree) -> Option<(ContextInfo, Info)>
where
    P: FnMut(&Info) -> bool,
{
    let candidates =
        deepest_nodes(&mut |ctx, info, _| p(info).then(|| (ctx.clone(), info.clone())), tree);
    // `min_by_key` keeps the first of several minimal elements
    candidates.into_iter().min_by_key(|(_, info)| info.size().unwrap_or(u32::MAX))
}

/// The first node satisfying `p`, in pre-order.
pub fn find_info<'a, P>(p: &mut P, tree: &'a InfoTree) -> Option<&'a Info>
where
    P: FnMut(&Info) -> bool,
{
    match tree {
        InfoTree::Context(_, tree) => find_info(p, tree),
        InfoTree::Node(info, children) => {
            if p(info) {
                return Some(info);
            }
            children.iter().find_map(|child| find_info(p, child))
        }
        InfoTree::Hole(_) => None,
    }
}
