/*!
 * Text-preservation checks.
 *
 * The rejoined English sentences must reproduce the source passage once both
 * sides are normalized. A violation is reported with its character offset and
 * a context window on each side so an operator can see what the model changed.
 */

use log::error;

use crate::errors::SplitError;

use super::normalize::{join_pieces, normalize};

/// Characters of context shown on each side of a mismatch
pub const CONTEXT_WINDOW: usize = 20;

/// Location of the first difference between two normalized texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Character offset into the normalized texts
    pub offset: usize,
    /// Context around the offset in the expected text
    pub expected_context: String,
    /// Context around the offset in the actual text
    pub actual_context: String,
}

fn context_window(chars: &[char], offset: usize) -> String {
    let start = offset.saturating_sub(CONTEXT_WINDOW);
    let end = (offset + CONTEXT_WINDOW).min(chars.len());
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

/// Find the first character where two already-normalized strings differ
pub fn find_mismatch(expected: &str, actual: &str) -> Option<Mismatch> {
    if expected == actual {
        return None;
    }

    let expected_chars: Vec<char> = expected.chars().collect();
    let actual_chars: Vec<char> = actual.chars().collect();

    let offset = expected_chars
        .iter()
        .zip(actual_chars.iter())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected_chars.len().min(actual_chars.len()));

    Some(Mismatch {
        offset,
        expected_context: context_window(&expected_chars, offset),
        actual_context: context_window(&actual_chars, offset),
    })
}

/// Compare a source text with a reconstruction, both normalized first
pub fn compare_texts(source: &str, reconstructed: &str) -> Option<Mismatch> {
    find_mismatch(&normalize(source), &normalize(reconstructed))
}

/// Verify that `pieces` joined with single spaces reproduce `source`.
///
/// Any mismatch is fatal; there is no repair path.
pub fn verify_preserved<S: AsRef<str>>(source: &str, pieces: &[S]) -> Result<(), SplitError> {
    let reconstructed = join_pieces(pieces);
    match compare_texts(source, &reconstructed) {
        None => Ok(()),
        Some(mismatch) => {
            error!(
                "English text was modified at character {}: expected \"{}\", got \"{}\"",
                mismatch.offset, mismatch.expected_context, mismatch.actual_context
            );
            Err(SplitError::EnglishModified {
                offset: mismatch.offset,
                expected_context: mismatch.expected_context,
                actual_context: mismatch.actual_context,
            })
        }
    }
}
