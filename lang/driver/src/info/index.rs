use rust_lapper::{Interval, Lapper};

use lumen_lang_ast::ByteIndex;

use super::data::{ContextInfo, Info};
use super::tree::InfoTree;
use super::visit::fold_info;

/// An interval index over the ranges of all nodes of an info tree.
pub struct InfoIndex {
    infos: Vec<(ContextInfo, Info)>,
    lapper: Lapper<u32, usize>,
}

impl InfoIndex {
    /// Index every node which has a context and a non-empty range.
    pub fn new(tree: &InfoTree) -> Self {
        let (infos, spans) = fold_info(
            &mut |ctx, info, (mut infos, mut spans): (Vec<_>, Vec<_>)| {
                if let (Some(ctx), Some(range)) = (ctx, info.range()) {
                    if !range.is_empty() {
                        spans.push(Interval {
                            start: range.start.0,
                            stop: range.end.0,
                            val: infos.len(),
                        });
                        infos.push((ctx.clone(), info.clone()));
                    }
                }
                (infos, spans)
            },
            (Vec::new(), Vec::new()),
            tree,
        );
        log::trace!("indexed {} info nodes", infos.len());
        InfoIndex { infos, lapper: Lapper::new(spans) }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// The node with the smallest range containing `pos`.
    pub fn smallest_at(&self, pos: ByteIndex) -> Option<&(ContextInfo, Info)> {
        let intervals = self.lapper.find(pos.0, pos.0 + 1);
        let smallest_interval =
            intervals.min_by(|i1, i2| (i1.stop - i1.start).cmp(&(i2.stop - i2.start)));
        smallest_interval.map(|interval| &self.infos[interval.val])
    }

    /// All nodes whose range contains `pos`, ordered by their start.
    pub fn all_at(&self, pos: ByteIndex) -> Vec<&(ContextInfo, Info)> {
        self.lapper.find(pos.0, pos.0 + 1).map(|interval| &self.infos[interval.val]).collect()
    }
}
