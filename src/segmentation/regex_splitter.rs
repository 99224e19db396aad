/*!
 * Deterministic baseline sentence splitter.
 *
 * Scans for `.`, `!` and `?` (optionally followed by closing quotes) that are
 * followed by whitespace or the end of the text. Known abbreviations and
 * decimal points never split. Every sentence is an exact, trimmed slice of the
 * input, so rejoining the sentences always reproduces the source.
 *
 * Confidence is tracked in hundredths so that thresholds such as 0.9 compare
 * exactly.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Sentence, SplitMode, SplitResult};

/// Abbreviations whose trailing period never ends a sentence
pub const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "u.s.", "u.k.", "e.g.", "i.e.", "etc.", "vs.",
];

const BASE_SCORE: i32 = 95;
const ABBREVIATION_PENALTY: i32 = 5;
const QUOTATION_PENALTY: i32 = 5;
const NO_TERMINAL_PENALTY: i32 = 25;
const UNTERMINATED_TAIL_PENALTY: i32 = 10;
const KOREAN_MISMATCH_PENALTY: i32 = 15;

/// Korean boundary candidates followed by whitespace: terminal punctuation
/// (with closing quotes), or a Hangul word that may carry a final ending
static KOREAN_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:(?P<punct>[.!?。？！]+["'”’」』)]*)|(?P<word>[가-힣]{2,}))\s+"#)
        .expect("Invalid Korean boundary regex")
});

const JONGSEONG_NIEUN: u32 = 4;
const JONGSEONG_RIEUL: u32 = 8;
const JONGSEONG_SSANGSIOT: u32 = 20;

/// Syllables that open a polite `-요` ending (먹어요, 했어요, 가세요, 그렇지요)
const POLITE_STEMS: &[char] = &[
    '어', '아', '에', '예', '해', '세', '네', '지', '봐', '워', '줘', '래', '데', '까', '게', '야', '져',
    '셔', '가', '나', '서', '와',
];

/// Final consonant index of a precomposed Hangul syllable, 0 when open
fn jongseong(syllable: char) -> Option<u32> {
    let code = syllable as u32;
    (0xAC00..=0xD7A3).contains(&code).then(|| (code - 0xAC00) % 28)
}

/// Whether a Hangul word ends in a sentence-final verb ending.
///
/// Accepts -ㄴ다/-는다, past and future -다 (했다, 있다, 겠다), -니다, -니까,
/// -ㄹ까, polite -요 and -죠. Words such as 보다, 마다, 바다 and 필요 do not
/// qualify.
fn has_final_ending(word: &str) -> bool {
    let mut syllables = word.chars().rev();
    let (Some(last), Some(prev)) = (syllables.next(), syllables.next()) else {
        return false;
    };
    let coda = jongseong(prev);
    match last {
        '다' => prev == '니' || matches!(coda, Some(JONGSEONG_NIEUN | JONGSEONG_SSANGSIOT)),
        '요' => POLITE_STEMS.contains(&prev),
        '죠' => true,
        '까' => prev == '니' || coda == Some(JONGSEONG_RIEUL),
        _ => false,
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201D}' | '\u{2019}' | '\u{00BB}' | ')')
}

fn is_opening_punctuation(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201C}' | '\u{2018}' | '\u{00AB}' | '(' | '[')
}

/// The abbreviation ending `segment`, if its last token is one
fn trailing_abbreviation(segment: &str) -> Option<&'static str> {
    let token = segment
        .split_whitespace()
        .next_back()?
        .trim_start_matches(is_opening_punctuation)
        .to_lowercase();
    ABBREVIATIONS.iter().copied().find(|abbr| *abbr == token)
}

/// Unbalanced or nested quotation inside one sentence
fn has_quotation_ambiguity(sentence: &str) -> bool {
    let straight = sentence.matches('"').count();
    let open = sentence.matches('\u{201C}').count();
    let close = sentence.matches('\u{201D}').count();
    let nested_single = sentence.contains('\u{2018}') && (open + straight) > 0;
    straight % 2 == 1 || open != close || nested_single
}

/// One sentence found by the English scan
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedSentence<'a> {
    /// Trimmed slice of the source
    pub text: &'a str,
    /// Abbreviations that suppressed a split inside this sentence
    pub abbreviations: Vec<&'static str>,
}

/// Raw output of the English scan
#[derive(Debug, Clone, PartialEq)]
pub struct EnglishSegmentation<'a> {
    pub sentences: Vec<SegmentedSentence<'a>>,
    /// Whether any terminal punctuation split point was found
    pub found_terminal: bool,
    /// Whether text remained after the last terminal
    pub unterminated_tail: bool,
}

impl<'a> EnglishSegmentation<'a> {
    /// Sentence texts in order
    pub fn texts(&self) -> Vec<&'a str> {
        self.sentences.iter().map(|s| s.text).collect()
    }
}

/// Scan English text for sentence boundaries
pub fn segment_english(text: &str) -> EnglishSegmentation<'_> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut abbreviations = Vec::new();
    let mut found_terminal = false;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i].1;
        if !is_terminal(c) {
            i += 1;
            continue;
        }

        let decimal = c == '.'
            && i > 0
            && chars[i - 1].1.is_ascii_digit()
            && chars.get(i + 1).is_some_and(|(_, next)| next.is_ascii_digit());
        if decimal {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && is_terminal(chars[j].1) {
            j += 1;
        }
        while j < chars.len() && is_closing_quote(chars[j].1) {
            j += 1;
        }

        if j < chars.len() && !chars[j].1.is_whitespace() {
            i = j;
            continue;
        }

        let end = chars.get(j).map_or(text.len(), |(pos, _)| *pos);
        let candidate = &text[start..end];

        if j == i + 1 && c == '.' {
            if let Some(abbr) = trailing_abbreviation(candidate) {
                abbreviations.push(abbr);
                i = j;
                continue;
            }
        }

        found_terminal = true;
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            sentences.push(SegmentedSentence {
                text: trimmed,
                abbreviations: std::mem::take(&mut abbreviations),
            });
        }
        start = end;
        i = j;
    }

    let tail = text[start..].trim();
    let unterminated_tail = !tail.is_empty();
    if unterminated_tail {
        sentences.push(SegmentedSentence {
            text: tail,
            abbreviations,
        });
    }

    EnglishSegmentation {
        sentences,
        found_terminal,
        unterminated_tail,
    }
}

/// Split Korean text with the Korean terminal heuristic
pub fn segment_korean(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0usize;

    for caps in KOREAN_BOUNDARY_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let end = match (caps.name("punct"), caps.name("word")) {
            (Some(punct), _) => punct.end(),
            (None, Some(word)) if has_final_ending(word.as_str()) => word.end(),
            _ => continue,
        };
        let piece = text[start..end].trim();
        if !piece.is_empty() {
            pieces.push(piece);
        }
        start = whole.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        pieces.push(tail);
    }
    pieces
}

/// Split a passage with the regex strategy.
///
/// Never fails. A Korean translation is paired positionally only when both
/// sides produce the same number of sentences.
pub fn split(english: &str, korean: Option<&str>) -> SplitResult {
    if english.trim().is_empty() {
        return SplitResult::empty(SplitMode::Regex);
    }

    let segmentation = segment_english(english);
    let mut warnings = Vec::new();
    let mut score = BASE_SCORE;

    for sentence in &segmentation.sentences {
        score -= ABBREVIATION_PENALTY * sentence.abbreviations.len() as i32;
        if has_quotation_ambiguity(sentence.text) {
            score -= QUOTATION_PENALTY;
        }
    }

    if !segmentation.found_terminal {
        score -= NO_TERMINAL_PENALTY;
        warnings.push("No sentence-ending punctuation found; the passage was kept as one sentence".to_string());
    } else if segmentation.unterminated_tail {
        score -= UNTERMINATED_TAIL_PENALTY;
    }

    let korean_pieces = korean
        .filter(|k| !k.trim().is_empty())
        .map(segment_korean);

    let translations = match korean_pieces {
        Some(pieces) if pieces.len() == segmentation.sentences.len() => Some(pieces),
        Some(pieces) => {
            score -= KOREAN_MISMATCH_PENALTY;
            warnings.push(format!(
                "Sentence count mismatch: {} English vs {} Korean; translations were not paired",
                segmentation.sentences.len(),
                pieces.len()
            ));
            None
        }
        None => None,
    };

    let confidence = score.clamp(0, 100) as f64 / 100.0;

    let sentences = segmentation
        .sentences
        .iter()
        .enumerate()
        .map(|(idx, segment)| {
            let own_score = BASE_SCORE - ABBREVIATION_PENALTY * segment.abbreviations.len() as i32;
            let mut sentence = Sentence::new(idx + 1, segment.text, own_score.min(score).max(0) as f64 / 100.0)
                .with_korean(translations.as_ref().map(|t| t[idx].to_string()));
            for abbr in &segment.abbreviations {
                sentence
                    .issues
                    .push(format!("Abbreviation \"{}\" treated as non-terminal", abbr));
            }
            if has_quotation_ambiguity(segment.text) {
                sentence.issues.push("Unbalanced or nested quotation".to_string());
            }
            sentence
        })
        .collect();

    SplitResult {
        sentences,
        confidence,
        method: SplitMode::Regex,
        model: None,
        warnings,
        korean_issues: Vec::new(),
    }
}
