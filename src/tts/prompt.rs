//! Prompt construction for the generative TTS model.
//!
//! The model follows natural-language instructions, so the prompt itself is
//! the contract: how many items, the exact text of each, a fixed pause between
//! them, and nothing else spoken. Extra utterances (acknowledgements, numbers)
//! would add segments and break the clip count.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::pipeline::{Batch, SpeechItem};

/// Pause requested between items in a batch prompt.
pub const SILENCE_GAP_SECONDS: u32 = 3;

/// Spoken language of a batch; selects the prompt wording and the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ja,
    En,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Ja => write!(f, "ja"),
            Language::En => write!(f, "en"),
        }
    }
}

/// Build the multi-item prompt for a batch.
///
/// Items are numbered in the list so the model can follow the order, while the
/// instructions forbid speaking the numbers.
pub fn build_batch_prompt(batch: &Batch) -> String {
    let count = batch.len();
    let list = batch
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| match batch.language() {
            Language::Ja => format!("{}. 「{}」{}", i + 1, item.speech_text, ja_context(item)),
            Language::En => format!("{}. \"{}\"{}", i + 1, item.speech_text, en_context(item)),
        })
        .collect::<Vec<_>>()
        .join("\n");

    match batch.language() {
        Language::Ja => format!(
            "子供に語りかけるように、以下の{count}個のフレーズを1つずつ順番に、はっきりと日本語で読んでください。\n\
             各フレーズの間には{SILENCE_GAP_SECONDS}秒の沈黙を入れてください。\n\
             番号や余計な言葉は加えず、指定されたフレーズのみ読んでください。\n\n\
             {list}"
        ),
        Language::En => format!(
            "Speak clearly and cheerfully for a child learning English.\n\
             Say each of the following {count} words one at a time, in order.\n\
             Put {SILENCE_GAP_SECONDS} seconds of silence between each word.\n\
             Do not add numbers, explanations, or any extra words.\n\n\
             {list}"
        ),
    }
}

/// Build the prompt used when a batch has to be generated one item at a time.
pub fn build_single_prompt(item: &SpeechItem, language: Language) -> String {
    match language {
        Language::Ja => format!(
            "子供に語りかけるように、はっきりと日本語で読んでください。余計な言葉は加えないでください{}：「{}」",
            ja_context(item),
            item.speech_text
        ),
        Language::En => format!(
            "Speak clearly and cheerfully for a child. Say only this word{}: \"{}\"",
            en_context(item),
            item.speech_text
        ),
    }
}

fn ja_context(item: &SpeechItem) -> String {
    if item.context.is_empty() { String::new() } else { format!("（{}）", item.context) }
}

fn en_context(item: &SpeechItem) -> String {
    if item.context.is_empty() { String::new() } else { format!(" ({})", item.context) }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn item(text: &str, context: &str) -> SpeechItem {
        SpeechItem::new(format!("{}.mp3", text), text, context, PathBuf::from(format!("out/{}.mp3", text)))
    }

    #[test]
    fn test_japanese_batch_prompt() {
        let batch = Batch::new("hiragana", Language::Ja, vec![item("あり", "蟻🐜"), item("いぬ", "")]).unwrap();
        let prompt = build_batch_prompt(&batch);

        assert!(prompt.contains("以下の2個のフレーズ"));
        assert!(prompt.contains("3秒の沈黙"));
        assert!(prompt.contains("番号や余計な言葉は加えず"));
        assert!(prompt.ends_with("1. 「あり」（蟻🐜）\n2. 「いぬ」"));
    }

    #[test]
    fn test_english_batch_prompt() {
        let batch = Batch::new("english", Language::En, vec![item("dog", ""), item("cat", ""), item("ice cream", "")]).unwrap();
        let prompt = build_batch_prompt(&batch);

        assert!(prompt.contains("following 3 words"));
        assert!(prompt.contains("3 seconds of silence"));
        assert!(prompt.contains("Do not add numbers"));
        assert!(prompt.ends_with("1. \"dog\"\n2. \"cat\"\n3. \"ice cream\""));
    }

    #[test]
    fn test_english_context_is_attached() {
        let batch = Batch::new("english", Language::En, vec![item("orange", "the color")]).unwrap();
        assert!(build_batch_prompt(&batch).ends_with("1. \"orange\" (the color)"));
    }

    #[test]
    fn test_one_line_per_item() {
        let items = (1..=12).map(|i| item(&format!("w{}", i), "")).collect();
        let batch = Batch::new("english", Language::En, items).unwrap();
        let prompt = build_batch_prompt(&batch);

        let numbered: Vec<&str> = prompt.lines().filter(|line| line.starts_with(|c: char| c.is_ascii_digit())).collect();
        assert_eq!(numbered.len(), 12);
        assert_eq!(numbered[11], "12. \"w12\"");
        assert!(!prompt.ends_with('\n'));
    }

    #[test]
    fn test_single_prompts() {
        let ja = build_single_prompt(&item("たす", "足し算の「たす」"), Language::Ja);
        assert!(ja.ends_with("余計な言葉は加えないでください（足し算の「たす」）：「たす」"));

        let en = build_single_prompt(&item("dog", ""), Language::En);
        assert_eq!(en, "Speak clearly and cheerfully for a child. Say only this word: \"dog\"");
    }
}
