/*!
 * Prompt templates for model-backed segmentation.
 *
 * Every prompt starts with a task line and carries the passages verbatim
 * between section markers, so a reply can always be traced back to exactly
 * the text that was sent.
 */

const TASK_PREFIX: &str = "TASK: ";

/// Kind of model task a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTask {
    /// Segment from scratch
    Split,
    /// Review a regex segmentation
    Verify,
    /// Extract aligned English/Korean pairs
    Parallel,
}

impl PromptTask {
    fn tag(&self) -> &'static str {
        match self {
            Self::Split => "sentence-split",
            Self::Verify => "sentence-verify",
            Self::Parallel => "parallel-extract",
        }
    }
}

/// Named passage sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    English,
    Korean,
    Sentences,
}

impl Section {
    fn name(&self) -> &'static str {
        match self {
            Self::English => "ENGLISH",
            Self::Korean => "KOREAN",
            Self::Sentences => "SENTENCES",
        }
    }

    fn open(&self) -> String {
        format!("<<<{}>>>", self.name())
    }

    fn close(&self) -> String {
        format!("<<<END_{}>>>", self.name())
    }

    fn wrap(&self, body: &str) -> String {
        format!("{}\n{}\n{}", self.open(), body, self.close())
    }
}

const SPLIT_RULES: &str = r#"You are a sentence splitter for English study materials.

## Rules
- Split the ENGLISH passage into sentences.
- Copy every character exactly as it appears. Do not fix spelling, grammar, spacing or punctuation.
- Do not drop, add, merge or reorder any text.
- Abbreviations such as Mr., Mrs., Ms., Dr., U.S., U.K., e.g., i.e., etc., vs. do not end a sentence.
- Decimal numbers such as 3.5 do not end a sentence.
- A closing quotation mark after . ! or ? belongs to the sentence it closes."#;

const SPLIT_OUTPUT: &str = r#"## Output
Return ONLY a JSON object, no prose and no code fences:
{"sentences": [{"text": "<sentence>", "korean": "<matching Korean text or null>"}], "confidence": <0.0-1.0>}"#;

const VERIFY_RULES: &str = r#"You are reviewing an automatic sentence split of an English passage.

## Rules
- SENTENCES is a numbered JSON list produced by a rule-based splitter.
- Only move sentence boundaries where the split is clearly wrong (for example a split after an abbreviation, or two sentences left joined).
- You must never change any character of the text itself. If a correction would require altering any character, return the SENTENCES list unchanged.
- When a KOREAN translation is given, also return the Korean text divided to match your English sentences, copied exactly."#;

const VERIFY_OUTPUT: &str = r#"## Output
Return ONLY a JSON object, no prose and no code fences:
{"sentences": ["<sentence>", ...], "korean": ["<Korean for sentence 1>", ...], "corrections": ["<short note per boundary you moved>"], "confidence": <0.0-1.0>}"#;

const PARALLEL_RULES: &str = r#"You are a splitter, not an editor, for both languages.

## Rules
- Split the ENGLISH passage into sentences and pair each with the part of the KOREAN translation that translates it.
- Copy English text exactly: no spelling, grammar, spacing or punctuation changes, nothing dropped or added.
- Copy Korean text exactly as well. Never improve, complete or retranslate it.
- If a sentence has no Korean counterpart, set "korean" to null.
- Report problems you notice in the Korean translation (missing, incomplete, mistranslated or modified parts) in "korean_issues" instead of fixing them."#;

const PARALLEL_OUTPUT: &str = r#"## Output
Return ONLY a JSON object, no prose and no code fences:
{"pairs": [{"no": 1, "english": "<sentence>", "korean": "<Korean or null>"}],
 "korean_issues": [{"no": <pair number or 0>, "type": "missing|incomplete|quality|modified", "severity": "low|medium|high", "description": "<what is wrong>"}]}"#;

fn header(task: PromptTask) -> String {
    format!("{}{}", TASK_PREFIX, task.tag())
}

/// Prompt for `ai` mode
pub fn split_prompt(english: &str, korean: Option<&str>) -> String {
    let mut prompt = vec![header(PromptTask::Split), SPLIT_RULES.to_string()];
    prompt.push(Section::English.wrap(english));
    if let Some(korean) = korean {
        prompt.push("Pair each sentence with its Korean counterpart from KOREAN, copied exactly.".to_string());
        prompt.push(Section::Korean.wrap(korean));
    }
    prompt.push(SPLIT_OUTPUT.to_string());
    prompt.join("\n\n")
}

/// Prompt for `ai-verify` mode
pub fn verify_prompt(english: &str, sentences: &[&str], korean: Option<&str>) -> String {
    let numbered: Vec<String> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            format!(
                "{}. {}",
                idx + 1,
                serde_json::to_string(sentence).unwrap_or_else(|_| format!("\"{}\"", sentence))
            )
        })
        .collect();

    let mut prompt = vec![header(PromptTask::Verify), VERIFY_RULES.to_string()];
    prompt.push(Section::English.wrap(english));
    prompt.push(Section::Sentences.wrap(&numbered.join("\n")));
    if let Some(korean) = korean {
        prompt.push(Section::Korean.wrap(korean));
    }
    prompt.push(VERIFY_OUTPUT.to_string());
    prompt.join("\n\n")
}

/// Prompt for `parallel` mode
pub fn parallel_prompt(english: &str, korean: &str) -> String {
    [
        header(PromptTask::Parallel),
        PARALLEL_RULES.to_string(),
        Section::English.wrap(english),
        Section::Korean.wrap(korean),
        PARALLEL_OUTPUT.to_string(),
    ]
    .join("\n\n")
}

/// Task a prompt was built for
pub fn task_of(prompt: &str) -> Option<PromptTask> {
    let first = prompt.lines().next()?.strip_prefix(TASK_PREFIX)?;
    [PromptTask::Split, PromptTask::Verify, PromptTask::Parallel]
        .into_iter()
        .find(|task| task.tag() == first.trim())
}

/// Text between a section's markers, exactly as it was inserted
pub fn section(prompt: &str, section: Section) -> Option<&str> {
    let open = section.open();
    let close = section.close();
    let start = prompt.find(&open)? + open.len() + 1;
    let end = start + prompt.get(start..)?.find(&format!("\n{}", close))?;
    prompt.get(start..end)
}
