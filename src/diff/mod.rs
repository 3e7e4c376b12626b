//! Unified diff interpretation for changewise.
//!
//! Turns the text of `git diff` into the 1-indexed line numbers of the
//! after-file that were added or modified. The module is split in two:
//! - `line` classifies a single line by its prefix (pure, no state)
//! - `parser` drives the classifier with a per-call cursor
//!
//! Supported input:
//! - Per-file header blocks (`diff --git`, `index`, `new file`, `deleted file`,
//!   `---`/`+++`, rename and mode lines) are skipped
//! - Hunk headers with or without line counts
//! - `\ No newline at end of file` markers
//! - Several concatenated per-file diffs

mod line;
mod parser;


pub use line::{classify, HunkHeader, LineError, LineKind, NO_NEWLINE_MARKER};
pub use parser::{interpret, LineModifications};
