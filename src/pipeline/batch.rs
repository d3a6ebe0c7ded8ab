//! Work items, batches and run planning.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::tts::Language;

use super::sink;

/// One word or phrase to synthesize into one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechItem {
    pub filename: String,      // Output file name, unique within a batch
    pub speech_text: String,   // Text spoken verbatim
    pub context: String,       // Disambiguation hint, empty for none
    pub output_path: PathBuf,  // Final destination of the MP3
}

impl SpeechItem {
    pub fn new(filename: impl Into<String>, speech_text: impl Into<String>, context: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self { filename: filename.into(), speech_text: speech_text.into(), context: context.into(), output_path: output_path.into() }
    }
}

/// An ordered, non-empty, single-language group of items sent as one request.
#[derive(Debug, Clone)]
pub struct Batch {
    label: String,
    language: Language,
    items: Vec<SpeechItem>,
}

impl Batch {
    /// Returns `None` for an empty item list.
    pub fn new(label: impl Into<String>, language: Language, items: Vec<SpeechItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { label: label.into(), language, items })
    }

    pub fn items(&self) -> &[SpeechItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// App label shown in progress output.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A pending item together with the group it belongs to.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub group: String,
    pub language: Language,
    pub item: SpeechItem,
}

/// Batches for this run plus what planning left out.
#[derive(Debug, Default)]
pub struct Plan {
    pub batches: Vec<Batch>,
    pub total: usize,      // Distinct outputs considered
    pub skipped: usize,    // Already present on disk
    pub duplicates: usize, // Repeated output paths dropped
}

impl Plan {
    /// Items that still need synthesis.
    pub fn pending(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }
}

/// Group pending work into batches.
///
/// Items whose output already exists are skipped unless `force` is set. A
/// repeated output path keeps its first occurrence only. A new batch starts
/// whenever the group or language changes or the current batch is full.
pub fn plan_batches(work: Vec<WorkItem>, batch_size: usize, force: bool) -> Plan {
    let batch_size = batch_size.max(1);
    let mut plan = Plan::default();
    let mut seen = HashSet::new();
    let mut current: Option<(String, Language, Vec<SpeechItem>)> = None;

    for WorkItem { group, language, item } in work {
        if !seen.insert(item.output_path.clone()) {
            plan.duplicates += 1;
            continue;
        }
        plan.total += 1;

        if !force && sink::is_complete(&item.output_path) {
            plan.skipped += 1;
            continue;
        }

        if let Some((g, l, items)) = current.take() {
            if g == group && l == language && items.len() < batch_size {
                current = Some((g, l, items));
            } else {
                plan.batches.extend(Batch::new(g, l, items));
            }
        }
        current.get_or_insert_with(|| (group, language, Vec::with_capacity(batch_size))).2.push(item);
    }

    if let Some((g, l, items)) = current {
        plan.batches.extend(Batch::new(g, l, items));
    }
    plan
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn work(dir: &Path, group: &str, language: Language, words: &[&str]) -> Vec<WorkItem> {
        words
            .iter()
            .map(|w| WorkItem {
                group: group.to_string(),
                language,
                item: SpeechItem::new(format!("{}.mp3", w), *w, "", dir.join(format!("{}.mp3", w))),
            })
            .collect()
    }

    fn filenames(batch: &Batch) -> Vec<&str> {
        batch.items().iter().map(|i| i.filename.as_str()).collect()
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert!(Batch::new("dots", Language::Ja, Vec::new()).is_none());
    }

    #[test]
    fn test_batches_respect_size_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_batches(work(dir.path(), "english", Language::En, &["a", "b", "c", "d", "e"]), 2, false);

        assert_eq!(plan.batches.len(), 3);
        assert_eq!(filenames(&plan.batches[0]), ["a.mp3", "b.mp3"]);
        assert_eq!(filenames(&plan.batches[2]), ["e.mp3"]);
        assert_eq!(plan.total, 5);
        assert_eq!(plan.pending(), 5);
    }

    #[test]
    fn test_group_and_language_changes_split_batches() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = work(dir.path(), "dots", Language::Ja, &["1", "2"]);
        items.extend(work(&dir.path().join("math"), "dots-math", Language::Ja, &["plus"]));
        items.extend(work(&dir.path().join("en"), "english", Language::En, &["dog"]));

        let plan = plan_batches(items, 50, false);
        let shape: Vec<_> = plan.batches.iter().map(|b| (b.label(), b.language(), b.len())).collect();
        assert_eq!(shape, [("dots", Language::Ja, 2), ("dots-math", Language::Ja, 1), ("english", Language::En, 1)]);
    }

    #[test]
    fn test_existing_outputs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"done").unwrap();

        let plan = plan_batches(work(dir.path(), "english", Language::En, &["a", "b", "c"]), 50, false);
        assert_eq!(plan.skipped, 1);
        assert_eq!(filenames(&plan.batches[0]), ["a.mp3", "c.mp3"]);

        let forced = plan_batches(work(dir.path(), "english", Language::En, &["a", "b", "c"]), 50, true);
        assert_eq!(forced.skipped, 0);
        assert_eq!(forced.pending(), 3);
    }

    #[test]
    fn test_everything_present_plans_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for w in ["a", "b"] {
            std::fs::write(dir.path().join(format!("{}.mp3", w)), b"done").unwrap();
        }

        let plan = plan_batches(work(dir.path(), "english", Language::En, &["a", "b"]), 50, false);
        assert!(plan.batches.is_empty());
        assert_eq!((plan.total, plan.skipped), (2, 2));
    }

    #[test]
    fn test_duplicate_outputs_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_batches(work(dir.path(), "english", Language::En, &["orange", "red", "orange"]), 50, false);

        assert_eq!(plan.duplicates, 1);
        assert_eq!(plan.total, 2);
        assert_eq!(filenames(&plan.batches[0]), ["orange.mp3", "red.mp3"]);
    }
}
