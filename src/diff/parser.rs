//! Unified diff interpretation: hunk positions to after-file line numbers.

use crate::error::{DiffParseError, Result};
use serde::Serialize;
use std::collections::BTreeSet;

use super::line::{classify, LineError, LineKind};

/// 1-indexed line numbers in the after-file that were added or modified.
///
/// Ordered for deterministic output; duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineModifications(BTreeSet<usize>);

impl LineModifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.0.contains(&line)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Line numbers in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    fn insert(&mut self, line: usize) {
        self.0.insert(line);
    }
}

impl FromIterator<usize> for LineModifications {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

type StepResult<T> = std::result::Result<T, LineError>;

/// Interpreter state for one call; never shared between calls.
#[derive(Debug, Default)]
struct Cursor {
    /// After-file line the next context or addition line occupies.
    /// `None` until the first hunk header.
    position: Option<usize>,
    in_header_block: bool,
}

impl Cursor {
    fn step(&mut self, kind: LineKind, modified: &mut LineModifications) -> StepResult<()> {
        match kind {
            LineKind::Blank | LineKind::Removal | LineKind::NoNewline => {}
            LineKind::FileHeader => self.in_header_block = true,
            LineKind::Header { ends_block } => self.in_header_block = !ends_block,
            LineKind::Hunk(header) => self.position = Some(header.new_start),
            LineKind::Context => {
                self.advance()?;
            }
            LineKind::Addition => {
                let line = self.advance()?;
                modified.insert(line);
            }
        }
        Ok(())
    }

    /// Returns the current position, moving the cursor past it.
    fn advance(&mut self) -> StepResult<usize> {
        let current = self.position.ok_or(LineError::OutsideHunk)?;
        let next = current.checked_add(1).ok_or(LineError::PositionOverflow)?;
        self.position = Some(next);
        Ok(current)
    }
}

/// Interpret unified diff text into the set of added or modified after-file lines.
///
/// Several concatenated per-file diffs are accepted, but the result is one
/// flat set: call once per file to get per-file answers.
///
/// # Returns
///
/// * `Ok(LineModifications)` - Lines recorded by `+` lines (empty for empty input)
/// * `Err(ChangewiseError::ParseFailed)` - A line could not be classified; the
///   error carries the line, its 0-based index, and the parsed/unparsed lines
pub fn interpret(diff_text: &str) -> Result<LineModifications> {
    let lines: Vec<&str> = diff_text.split('\n').collect();
    let mut cursor = Cursor::default();
    let mut modified = LineModifications::new();

    for (index, line) in lines.iter().enumerate() {
        let outcome = classify(line, cursor.in_header_block)
            .and_then(|kind| cursor.step(kind, &mut modified));

        if let Err(reason) = outcome {
            return Err(DiffParseError {
                reason: reason.to_string(),
                line: line.to_string(),
                index,
                parsed: lines[..index].iter().map(|l| l.to_string()).collect(),
                unparsed: lines[index..].iter().map(|l| l.to_string()).collect(),
            }
            .into());
        }
    }

    Ok(modified)
}
