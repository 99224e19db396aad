/*!
 * Tests for the deterministic regex splitter
 */

use kobisplit::segmentation::normalize::{join_pieces, normalize};
use kobisplit::segmentation::regex_splitter::{segment_english, segment_korean, split};
use kobisplit::segmentation::SplitMode;

#[test]
fn test_split_abbreviation_shouldNotSplitAfterTitle() {
    let result = split("Dr. Smith arrived. He left.", None);
    assert_eq!(result.len(), 2);
    assert_eq!(result.sentences[0].content, "Dr. Smith arrived.");
    assert_eq!(result.sentences[1].content, "He left.");
    assert_eq!(result.method, SplitMode::Regex);
    assert!(result.model.is_none());
}

#[test]
fn test_split_abbreviation_shouldLowerConfidenceOnlySlightly() {
    let plain = split("Smith arrived. He left.", None);
    let abbreviated = split("Dr. Smith arrived. He left.", None);
    assert_eq!(plain.confidence, 0.95);
    assert_eq!(abbreviated.confidence, 0.9);
    assert!(abbreviated.sentences[0].issues[0].contains("dr."));
}

#[test]
fn test_split_decimalNumber_shouldNotSplit() {
    let result = split("The ticket cost 3.50 dollars. It was cheap.", None);
    assert_eq!(result.contents(), vec!["The ticket cost 3.50 dollars.", "It was cheap."]);
}

#[test]
fn test_split_multipleAbbreviations_shouldKeepSentenceWhole() {
    let result = split("Mrs. Kim moved to the U.S. in May. She likes it.", None);
    assert_eq!(result.len(), 2);
    assert_eq!(result.sentences[0].content, "Mrs. Kim moved to the U.S. in May.");
}

#[test]
fn test_split_closingQuote_shouldStayWithSentence() {
    let result = split("She said \"Go home.\" Then she left!", None);
    assert_eq!(result.contents(), vec!["She said \"Go home.\"", "Then she left!"]);
}

#[test]
fn test_split_noTerminal_shouldWarnAndKeepOneSentence() {
    let result = split("a fragment without an ending", None);
    assert_eq!(result.len(), 1);
    assert_eq!(result.confidence, 0.7);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_split_unterminatedTail_shouldKeepTail() {
    let result = split("First one. and then", None);
    assert_eq!(result.contents(), vec!["First one.", "and then"]);
    assert!(result.confidence < 0.9);
}

#[test]
fn test_split_roundTrip_shouldReproduceSource() {
    let sources = [
        "Dr. Smith arrived.\nHe left at 3.30 p.m. today!  Why?",
        "\"Wait,\" he said. \"Really?\" She nodded.",
        "One... two... three. Done.",
    ];
    for source in sources {
        let result = split(source, None);
        assert_eq!(normalize(&join_pieces(&result.contents())), normalize(source), "source: {}", source);
    }
}

#[test]
fn test_split_matchingKorean_shouldPairTranslations() {
    let result = split("I came. I saw.", Some("나는 왔다. 나는 보았다."));
    assert_eq!(result.sentences[0].korean_translation.as_deref(), Some("나는 왔다."));
    assert_eq!(result.sentences[1].korean_translation.as_deref(), Some("나는 보았다."));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_split_mismatchedKorean_shouldWarnAndNotPair() {
    let result = split("I came. I saw. I won.", Some("나는 왔다."));
    assert!(result.sentences.iter().all(|s| s.korean_translation.is_none()));
    assert!(result.warnings[0].contains("3 English vs 1 Korean"));
    assert_eq!(result.confidence, 0.8);
}

#[test]
fn test_segmentEnglish_shouldRecordTerminalFlags() {
    let segmentation = segment_english("Hi there. Bye");
    assert!(segmentation.found_terminal);
    assert!(segmentation.unterminated_tail);
    assert_eq!(segmentation.texts(), vec!["Hi there.", "Bye"]);
}

#[test]
fn test_segmentKorean_finalEnding_shouldSplitWithoutPunctuation() {
    assert_eq!(segment_korean("밥을 먹었어요 그리고 잤다."), vec!["밥을 먹었어요", "그리고 잤다."]);
    assert_eq!(segment_korean("  "), Vec::<&str>::new());
}

#[test]
fn test_segmentKorean_comparativeAndNounEndings_shouldKeepSentencesWhole() {
    assert_eq!(
        segment_korean("나는 너보다 키가 크다. 그는 날마다 운동한다."),
        vec!["나는 너보다 키가 크다.", "그는 날마다 운동한다."]
    );
    assert_eq!(segment_korean("이 일은 필요 없다. 바다 위에 배가 떠 있다.").len(), 2);
}

#[test]
fn test_split_koreanWithComparative_shouldPairPositionally() {
    let result = split(
        "I am taller than you. He exercises every day.",
        Some("나는 너보다 키가 크다. 그는 날마다 운동한다."),
    );
    assert!(result.warnings.is_empty());
    assert_eq!(result.confidence, 0.95);
    assert_eq!(result.sentences[0].korean_translation.as_deref(), Some("나는 너보다 키가 크다."));
    assert_eq!(result.sentences[1].korean_translation.as_deref(), Some("그는 날마다 운동한다."));
}
