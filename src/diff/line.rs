//! Line-prefix classification for unified diff text.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Hunk header pattern; only the after-file start is captured.
static HUNK_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)?").expect("Invalid hunk header regex")
});

/// The only content a line starting with a backslash may have.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Parsed `@@ -a,b +c,d @@` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    /// 1-indexed first line of the hunk in the after-file.
    pub new_start: usize,
}

impl HunkHeader {
    /// Parse a hunk header line.
    ///
    /// Accepts both `@@ -10,5 +20,7 @@` and the count-less `@@ -1 +1 @@`
    /// forms; anything after the new range (trailing `@@`, function context)
    /// is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let captures = HUNK_HEADER_REGEX.captures(line)?;
        let new_start = captures[1].parse().ok()?;
        Some(Self { new_start })
    }
}

/// The role of one line of unified diff text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty line; carries no information.
    Blank,
    /// `diff --...` line that opens a per-file header block.
    FileHeader,
    /// A line inside the header block. `ends_block` is set for the `+++ `
    /// line, the last line of a file header.
    Header { ends_block: bool },
    /// ` ` unchanged line present in both versions.
    Context,
    /// `+` line present only in the after-file.
    Addition,
    /// `-` line present only in the before-file.
    Removal,
    /// `@@` hunk marker.
    Hunk(HunkHeader),
    /// `\ No newline at end of file`.
    NoNewline,
}

/// Why a line could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("illegal prefix '{0}'")]
    IllegalPrefix(char),

    #[error("malformed hunk header")]
    MalformedHunkHeader,

    #[error("only expecting '{NO_NEWLINE_MARKER}' after a backslash")]
    UnexpectedMarker,

    #[error("line appears before the first hunk header")]
    OutsideHunk,

    #[error("line number past the end of the hunk overflows")]
    PositionOverflow,
}

/// Classify a single line of unified diff output.
///
/// `in_header_block` is the interpreter's state after the previous line. In
/// header mode only the `+++ ` prefix is significant: it closes the block.
/// The `new `, `dele`, `inde` and `--- ` continuations and any other content
/// (`similarity index`, `rename from`, `Binary files ...`) leave the block
/// open.
pub fn classify(line: &str, in_header_block: bool) -> Result<LineKind, LineError> {
    if line.is_empty() {
        return Ok(LineKind::Blank);
    }

    if in_header_block {
        return Ok(LineKind::Header {
            ends_block: line.starts_with("+++ "),
        });
    }

    if line.starts_with("diff --") {
        return Ok(LineKind::FileHeader);
    }

    // non-empty, so there is a first char
    let prefix = line.chars().next().unwrap_or_default();
    match prefix {
        ' ' => Ok(LineKind::Context),
        '+' => Ok(LineKind::Addition),
        '-' => Ok(LineKind::Removal),
        '@' => HunkHeader::parse(line)
            .map(LineKind::Hunk)
            .ok_or(LineError::MalformedHunkHeader),
        '\\' if line == NO_NEWLINE_MARKER => Ok(LineKind::NoNewline),
        '\\' => Err(LineError::UnexpectedMarker),
        other => Err(LineError::IllegalPrefix(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hunk_header_with_counts() {
        let header = HunkHeader::parse("@@ -10,5 +20,7 @@").unwrap();
        assert_eq!(header.new_start, 20);
    }

    #[test]
    fn hunk_header_without_counts() {
        assert_eq!(HunkHeader::parse("@@ -1 +1 @@").unwrap().new_start, 1);
        assert_eq!(HunkHeader::parse("@@ -3,2 +4 @@").unwrap().new_start, 4);
    }

    #[test]
    fn hunk_header_with_function_context() {
        let header = HunkHeader::parse("@@ -10,0 +11,2 @@ fn existing_function() {").unwrap();
        assert_eq!(header.new_start, 11);
    }

    #[test]
    fn hunk_header_rejects_garbage() {
        assert!(HunkHeader::parse("@@ garbage @@").is_none());
        assert!(HunkHeader::parse("@@ +1,2 -1,2 @@").is_none());
        assert!(HunkHeader::parse("@@@ -1,2 -1,2 +1,3 @@@").is_none());
    }

    #[test]
    fn classify_body_lines_by_first_char() {
        assert_eq!(classify(" ctx", false), Ok(LineKind::Context));
        assert_eq!(classify("+new", false), Ok(LineKind::Addition));
        assert_eq!(classify("-old", false), Ok(LineKind::Removal));
        assert_eq!(classify("", false), Ok(LineKind::Blank));
        assert_eq!(
            classify("@@ -1,3 +1,4 @@", false),
            Ok(LineKind::Hunk(HunkHeader { new_start: 1 }))
        );
    }

    #[test]
    fn classify_file_header_opens_block() {
        assert_eq!(
            classify("diff --git a/f.js b/f.js", false),
            Ok(LineKind::FileHeader)
        );
        assert_eq!(classify("diff --cc f.js", false), Ok(LineKind::FileHeader));
    }

    #[test]
    fn header_block_only_closes_on_new_file_marker() {
        for line in [
            "index 123..456 100644",
            "new file mode 100644",
            "deleted file mode 100644",
            "--- a/f.js",
            "similarity index 90%",
            "rename from a.js",
            "Binary files a/x.png and b/x.png differ",
            "diff --git a/g.js b/g.js",
        ] {
            assert_eq!(
                classify(line, true),
                Ok(LineKind::Header { ends_block: false }),
                "{line}"
            );
        }

        assert_eq!(
            classify("+++ b/f.js", true),
            Ok(LineKind::Header { ends_block: true })
        );
    }

    #[test]
    fn new_file_marker_outside_header_is_an_addition() {
        assert_eq!(classify("+++ b/f.js", false), Ok(LineKind::Addition));
    }

    #[test]
    fn no_newline_marker_is_strict() {
        assert_eq!(
            classify("\\ No newline at end of file", false),
            Ok(LineKind::NoNewline)
        );
        assert_eq!(
            classify("\\ no newline at end of file", false),
            Err(LineError::UnexpectedMarker)
        );
        assert_eq!(
            classify("\\ No newline at end of file ", false),
            Err(LineError::UnexpectedMarker)
        );
    }

    #[test]
    fn illegal_prefix_is_reported() {
        assert_eq!(
            classify("index 123..456", false),
            Err(LineError::IllegalPrefix('i'))
        );
        assert_eq!(
            classify("@@ not a header", false),
            Err(LineError::MalformedHunkHeader)
        );
    }
}
