use lsp_types::Position;

use lumen_lang_ast::{ByteIndex, Span};

use crate::result::DriverError;

/// The source text of a file together with the start positions of its lines.
#[derive(Debug, Clone)]
pub struct FileMap {
    /// The source code of the file.
    pub source: String,
    /// The starting byte indices in the source code.
    pub line_starts: Vec<ByteIndex>,
}

impl FileMap {
    pub fn new<S: Into<String>>(source: S) -> Self {
        let source = source.into();
        let line_starts: Vec<ByteIndex> = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .map(|i| ByteIndex(i as u32))
            .collect();

        FileMap { source, line_starts }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The position just past the last byte of the file.
    pub fn end_pos(&self) -> ByteIndex {
        ByteIndex(self.source.len() as u32)
    }

    fn max_index(&self) -> usize {
        self.source.len().saturating_sub(1)
    }

    fn line_start(&self, line: u32) -> Result<ByteIndex, DriverError> {
        use std::cmp::Ordering;

        match line.cmp(&self.last_line_index()) {
            Ordering::Less => Ok(self.line_starts[line as usize]),
            Ordering::Equal => Ok(self.end_pos()),
            Ordering::Greater => Err(DriverError::LineTooLarge {
                given: line as usize,
                max: self.last_line_index() as usize,
            }),
        }
    }

    fn last_line_index(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// The span of a line, including its terminating newline.
    pub fn line_span(&self, line: u32) -> Result<Span, DriverError> {
        let line_start = self.line_start(line)?;
        let next_line_start = self.line_start(line + 1)?;

        Ok(Span::from_indices(line_start, next_line_start))
    }

    fn line_index(&self, byte_index: ByteIndex) -> u32 {
        match self.line_starts.binary_search(&byte_index) {
            // Found the start of a line
            Ok(line) => line as u32,
            Err(next_line) => next_line as u32 - 1,
        }
    }

    /// Convert a byte index into a zero-based line and a character offset within that line.
    pub fn to_position(&self, byte_index: ByteIndex) -> Result<Position, DriverError> {
        let line = self.line_index(byte_index);
        let line_start = self.line_start(line).map_err(|_| DriverError::IndexTooLarge {
            given: byte_index.to_usize(),
            max: self.max_index(),
        })?;
        let line_src =
            self.source.get(line_start.to_usize()..byte_index.to_usize()).ok_or_else(|| {
                let given = byte_index.to_usize();
                if given > self.source.len() {
                    DriverError::IndexTooLarge { given, max: self.max_index() }
                } else {
                    DriverError::InvalidCharBoundary { given }
                }
            })?;

        Ok(Position { line, character: line_src.chars().count() as u32 })
    }

    /// Convert a line and character offset back into a byte index.
    ///
    /// Characters past the end of the line are clamped to the end of the line.
    pub fn of_position(&self, pos: Position) -> Option<ByteIndex> {
        let span = self.line_span(pos.line).ok()?;
        let line_src = &self.source[span.start.to_usize()..span.end.to_usize()];
        let line_src = line_src.strip_suffix('\n').unwrap_or(line_src);
        let offset = line_src
            .char_indices()
            .nth(pos.character as usize)
            .map(|(i, _)| i)
            .unwrap_or(line_src.len());
        Some(span.start + offset as u32)
    }
}
