/// Translates positions in corrected text back to the text the user wrote.
///
/// Replacements never cross a newline, so both texts have the same lines;
/// only byte offsets within a line move. Columns here are byte columns,
/// which match character columns on ASCII lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    edits: Vec<Edit>,
    original_lines: Vec<usize>,
    corrected_lines: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    original: usize,
    original_len: usize,
    corrected: usize,
    corrected_len: usize,
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

impl SourceMap {
    pub(crate) fn new(original: &str) -> Self {
        Self {
            edits: Vec::new(),
            original_lines: line_starts(original),
            corrected_lines: Vec::new(),
        }
    }

    /// Edits must be recorded in text order.
    pub(crate) fn record(&mut self, original: (usize, usize), corrected: (usize, usize)) {
        self.edits.push(Edit {
            original: original.0,
            original_len: original.1,
            corrected: corrected.0,
            corrected_len: corrected.1,
        });
    }

    pub(crate) fn finish(&mut self, corrected: &str) {
        self.corrected_lines = line_starts(corrected);
    }

    pub fn is_identity(&self) -> bool {
        self.edits.is_empty()
    }

    /// Byte offset in the original text for a byte offset in the corrected
    /// text. Offsets inside a replaced word clamp to that word.
    pub fn to_original(&self, corrected_offset: usize) -> usize {
        let idx = self.edits.partition_point(|e| e.corrected <= corrected_offset);
        let Some(edit) = idx.checked_sub(1).map(|i| self.edits[i]) else {
            return corrected_offset;
        };

        let within = corrected_offset - edit.corrected;
        if within < edit.corrected_len {
            return edit.original + within.min(edit.original_len.saturating_sub(1));
        }
        edit.original + edit.original_len + (within - edit.corrected_len)
    }

    /// 1-based column in the original text for a 1-based column on `line`
    /// of the corrected text.
    pub fn original_column(&self, line: usize, column: usize) -> Option<usize> {
        let row = line.checked_sub(1)?;
        let corrected_start = *self.corrected_lines.get(row)?;
        let original_start = *self.original_lines.get(row)?;

        let original = self.to_original(corrected_start + column.checked_sub(1)?);
        original.checked_sub(original_start).map(|c| c + 1)
    }
}
