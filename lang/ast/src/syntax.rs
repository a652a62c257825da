//! Concrete syntax trees with source positions
//!
//! Syntax trees are produced by the parser and by macro expansion.
//! Every node carries a [SourceInfo] which records where in the file it came from,
//! if anywhere. Comparing syntax trees with `==` ignores the source info.

use derivative::Derivative;

use crate::{ByteIndex, Name, Span};

/// Well-known syntax node kinds.
pub mod kinds {
    pub const APP: &str = "Lean.Parser.Term.app";
    pub const BY_TACTIC: &str = "Lean.Parser.Term.byTactic";
    pub const TACTIC_SEQ: &str = "Lean.Parser.Tactic.tacticSeq";
    pub const IDENT: &str = "ident";
    pub const MISSING: &str = "missing";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SourceInfo {
    /// The syntax was parsed from the file.
    /// `leading` and `trailing` are the whitespace and comments before and after the token.
    Original { leading: Span, pos: ByteIndex, trailing: Span, end_pos: ByteIndex },
    /// The syntax was produced by a macro or elaborator, but is associated with a range of the file.
    /// Only canonical synthetic syntax is considered when looking for the canonical position of a node.
    Synthetic { pos: ByteIndex, end_pos: ByteIndex, canonical: bool },
    #[default]
    None,
}

impl SourceInfo {
    /// Source info of a token spanning `[pos, end_pos)` without surrounding whitespace.
    pub fn original(pos: u32, end_pos: u32) -> Self {
        SourceInfo::Original {
            leading: Span::new(pos, pos),
            pos: ByteIndex(pos),
            trailing: Span::new(end_pos, end_pos),
            end_pos: ByteIndex(end_pos),
        }
    }

    /// Source info of a token spanning `[pos, end_pos)` followed by `trailing` bytes of whitespace.
    pub fn original_with_trailing(pos: u32, end_pos: u32, trailing: u32) -> Self {
        SourceInfo::Original {
            leading: Span::new(pos, pos),
            pos: ByteIndex(pos),
            trailing: Span::new(end_pos, end_pos + trailing),
            end_pos: ByteIndex(end_pos),
        }
    }

    pub fn synthetic(pos: u32, end_pos: u32, canonical: bool) -> Self {
        SourceInfo::Synthetic { pos: ByteIndex(pos), end_pos: ByteIndex(end_pos), canonical }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SourceInfo::None)
    }

    pub fn get_pos(&self, canonical_only: bool) -> Option<ByteIndex> {
        match self {
            SourceInfo::Original { pos, .. } => Some(*pos),
            SourceInfo::Synthetic { pos, canonical, .. } if *canonical || !canonical_only => {
                Some(*pos)
            }
            _ => None,
        }
    }

    pub fn get_tail_pos(&self, canonical_only: bool) -> Option<ByteIndex> {
        match self {
            SourceInfo::Original { end_pos, .. } => Some(*end_pos),
            SourceInfo::Synthetic { end_pos, canonical, .. } if *canonical || !canonical_only => {
                Some(*end_pos)
            }
            _ => None,
        }
    }

    /// Size of the trailing whitespace in bytes. Zero for non-original source info.
    pub fn trailing_size(&self) -> u32 {
        match self {
            SourceInfo::Original { trailing, .. } => trailing.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, Derivative)]
#[derivative(PartialEq, Eq, Hash)]
pub enum Syntax {
    #[default]
    Missing,
    Node {
        #[derivative(PartialEq = "ignore", Hash = "ignore")]
        info: SourceInfo,
        kind: Name,
        args: Vec<Syntax>,
    },
    Atom {
        #[derivative(PartialEq = "ignore", Hash = "ignore")]
        info: SourceInfo,
        val: String,
    },
    Ident {
        #[derivative(PartialEq = "ignore", Hash = "ignore")]
        info: SourceInfo,
        raw_val: String,
        val: Name,
    },
}

static MISSING: Syntax = Syntax::Missing;

impl Syntax {
    pub fn node<N: Into<Name>>(info: SourceInfo, kind: N, args: Vec<Syntax>) -> Syntax {
        Syntax::Node { info, kind: kind.into(), args }
    }

    pub fn atom(info: SourceInfo, val: &str) -> Syntax {
        Syntax::Atom { info, val: val.to_owned() }
    }

    pub fn ident(info: SourceInfo, val: &str) -> Syntax {
        Syntax::Ident { info, raw_val: val.to_owned(), val: Name::from(val) }
    }

    pub fn kind(&self) -> Name {
        match self {
            Syntax::Missing => Name::from(kinds::MISSING),
            Syntax::Node { kind, .. } => kind.clone(),
            Syntax::Atom { val, .. } => Name { components: vec![val.clone()] },
            Syntax::Ident { .. } => Name::from(kinds::IDENT),
        }
    }

    pub fn is_of_kind(&self, kind: &str) -> bool {
        match self {
            Syntax::Node { kind: k, .. } => *k == Name::from(kind),
            _ => self.kind() == Name::from(kind),
        }
    }

    pub fn is_ident(&self) -> bool {
        matches!(self, Syntax::Ident { .. })
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Syntax::Missing)
    }

    pub fn args(&self) -> &[Syntax] {
        match self {
            Syntax::Node { args, .. } => args,
            _ => &[],
        }
    }

    /// The `i`-th argument of a node, or [Syntax::Missing] if there is none.
    pub fn get_arg(&self, i: usize) -> &Syntax {
        self.args().get(i).unwrap_or(&MISSING)
    }

    pub fn get_num_args(&self) -> usize {
        self.args().len()
    }

    pub fn info(&self) -> Option<&SourceInfo> {
        match self {
            Syntax::Missing => None,
            Syntax::Node { info, .. } | Syntax::Atom { info, .. } | Syntax::Ident { info, .. } => {
                Some(info)
            }
        }
    }

    /// The source info of the first token that has one.
    fn head_info(&self) -> Option<&SourceInfo> {
        match self {
            Syntax::Missing => None,
            Syntax::Atom { info, .. } | Syntax::Ident { info, .. } => Some(info),
            Syntax::Node { info: SourceInfo::None, args, .. } => args.iter().find_map(Syntax::head_info),
            Syntax::Node { info, .. } => Some(info),
        }
    }

    /// The source info of the last token that has one.
    fn tail_info(&self) -> Option<&SourceInfo> {
        match self {
            Syntax::Missing => None,
            Syntax::Atom { info, .. } | Syntax::Ident { info, .. } => Some(info),
            Syntax::Node { info: SourceInfo::None, args, .. } => {
                args.iter().rev().find_map(Syntax::tail_info)
            }
            Syntax::Node { info, .. } => Some(info),
        }
    }

    /// Start position of the syntax.
    ///
    /// If `canonical_only` is set, non-canonical synthetic positions are not considered.
    pub fn get_pos(&self, canonical_only: bool) -> Option<ByteIndex> {
        self.head_info().and_then(|info| info.get_pos(canonical_only))
    }

    /// End position of the syntax, excluding trailing whitespace.
    ///
    /// Nodes without a usable end position of their own take the one of their last argument that has one.
    pub fn get_tail_pos(&self, canonical_only: bool) -> Option<ByteIndex> {
        match self {
            Syntax::Missing => None,
            Syntax::Atom { info, .. } | Syntax::Ident { info, .. } => {
                info.get_tail_pos(canonical_only)
            }
            Syntax::Node { info, args, .. } => info
                .get_tail_pos(canonical_only)
                .or_else(|| args.iter().rev().find_map(|arg| arg.get_tail_pos(canonical_only))),
        }
    }

    pub fn get_range(&self, canonical_only: bool) -> Option<Span> {
        let start = self.get_pos(canonical_only)?;
        let end = self.get_tail_pos(canonical_only)?;
        Some(Span::from_indices(start, end.max(start)))
    }

    /// Size of the whitespace following the last token of the syntax.
    pub fn get_trailing_size(&self) -> u32 {
        self.tail_info().map(SourceInfo::trailing_size).unwrap_or(0)
    }
}
