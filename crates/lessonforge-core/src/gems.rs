//! The prompt library ("gems").
//!
//! Each generator is steered by a named system prompt. Gems live in a flat
//! JSON file `{ name: prompt_text }`; the built-in defaults are merged in on
//! load so an old file picks up newly shipped gems, and every mutation is
//! persisted immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ToolkitError;

/// Gem name used by the `.docx` test generator.
pub const GEM_TEST: &str = "Test Generator (.docx)";
/// Gem name used by the `.pptx` deck generator.
pub const GEM_SLIDES: &str = "Slide Generator (.pptx)";
/// Gem name used by the quiz CSV generator.
pub const GEM_QUIZ: &str = "Quiz Generator (.csv)";
/// Gem name used by the rubric comment generator.
pub const GEM_COMMENT: &str = "Rubric Comment Generator";

const DEFAULT_TEST_PROMPT: &str = "\
You are an experienced secondary-school test writer. Using the topic, rubric \
and counts supplied by the user, write original assessment questions that \
cover every rubric criterion.

Respond with a single JSON object and nothing else, in exactly this shape:
{
  \"mcqs\": [ { \"question\": \"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"] } ],
  \"saqs\": [ { \"question\": \"...\", \"marks\": 2 } ]
}

Rules: produce exactly the requested number of MCQs and SAQs; give every MCQ \
four plausible options with only one correct; make SAQ mark values sum to the \
requested SAQ mark total; do not number the questions yourself.";

const DEFAULT_SLIDES_PROMPT: &str = "\
You are a teacher preparing a lesson presentation from textbook source text. \
Summarise the supplied text into a sequence of slides.

Respond with a single JSON object and nothing else, in exactly this shape:
{
  \"slides\": [ { \"title\": \"...\", \"body\": [\"bullet one\", \"bullet two\"] } ]
}

Rules: 6 to 12 slides; at most 5 bullets per slide; bullets are short \
phrases, not sentences copied from the source.";

const DEFAULT_QUIZ_PROMPT: &str = "\
You are writing a quiz for a classroom game that imports CSV. Using the topic \
and question count supplied by the user, respond with CSV only, no \
commentary, with this exact header row:

Question,Correct Answer,Incorrect Answer 1,Incorrect Answer 2,Incorrect Answer 3

One row per question. Keep answers short enough to read on a game screen. \
Quote any field containing a comma.";

const DEFAULT_COMMENT_PROMPT: &str = "\
You are a teacher writing report feedback. Given test questions, rubric \
criteria and a description of a student's performance, write a constructive \
comment of 3 to 5 sentences: name what the student did well against the \
rubric, identify the main gap, and give one concrete next step. Address the \
student as 'you'. Respond with the comment text only.";

/// The built-in gems shipped with the toolkit.
pub fn default_gems() -> BTreeMap<String, String> {
    BTreeMap::from([
        (GEM_TEST.to_string(), DEFAULT_TEST_PROMPT.to_string()),
        (GEM_SLIDES.to_string(), DEFAULT_SLIDES_PROMPT.to_string()),
        (GEM_QUIZ.to_string(), DEFAULT_QUIZ_PROMPT.to_string()),
        (GEM_COMMENT.to_string(), DEFAULT_COMMENT_PROMPT.to_string()),
    ])
}

/// Persistent store of named system prompts.
#[derive(Debug)]
pub struct GemStore {
    path: PathBuf,
    gems: BTreeMap<String, String>,
}

impl GemStore {
    /// Load the store, merging in any missing built-in defaults.
    ///
    /// An absent or corrupt file starts from the defaults. If the merge
    /// added anything, the merged set is persisted straight away.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ToolkitError> {
        let path = path.into();

        let stored: Option<BTreeMap<String, String>> = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok());

        let (mut gems, fresh) = match stored {
            Some(gems) => (gems, false),
            None => (BTreeMap::new(), true),
        };

        let mut migrated = fresh;
        for (name, prompt) in default_gems() {
            if !gems.contains_key(&name) {
                if !fresh {
                    tracing::info!(gem = %name, "adding missing default gem");
                }
                gems.insert(name, prompt);
                migrated = true;
            }
        }

        let store = Self { path, gems };
        if migrated {
            store.persist()?;
        }
        Ok(store)
    }

    /// Look up a gem's prompt text.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.gems.get(name).map(String::as_str)
    }

    /// Prompt for one of the built-in generator gems, falling back to the
    /// shipped default if the store somehow lost it.
    pub fn generator_prompt(&self, name: &str) -> String {
        self.gems
            .get(name)
            .cloned()
            .or_else(|| default_gems().remove(name))
            .unwrap_or_default()
    }

    /// Gem names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gems.keys().map(String::as_str)
    }

    /// Create or overwrite a gem and persist.
    pub fn set(&mut self, name: &str, prompt: &str) -> Result<(), ToolkitError> {
        self.gems.insert(name.to_string(), prompt.to_string());
        self.persist()
    }

    /// Rename a gem, keeping its prompt. Fails if the target name exists.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), String> {
        if from == to {
            return Ok(());
        }
        if self.gems.contains_key(to) {
            return Err(format!("a gem named '{to}' already exists"));
        }
        let Some(prompt) = self.gems.remove(from) else {
            return Err(format!("no gem named '{from}'"));
        };
        self.gems.insert(to.to_string(), prompt);
        self.persist().map_err(|e| e.to_string())
    }

    /// Delete a gem. Built-in defaults are refused: the load-time merge
    /// would only resurrect them on the next run.
    pub fn delete(&mut self, name: &str) -> Result<(), String> {
        if default_gems().contains_key(name) {
            return Err(format!("'{name}' is a built-in gem and cannot be deleted"));
        }
        if self.gems.remove(name).is_none() {
            return Err(format!("no gem named '{name}'"));
        }
        self.persist().map_err(|e| e.to_string())
    }

    /// Where this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), ToolkitError> {
        let text =
            serde_json::to_string_pretty(&self.gems).expect("gem serialization is infallible");
        std::fs::write(&self.path, text).map_err(|source| ToolkitError::PersistFailed {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_gets_defaults_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gems.json");

        let store = GemStore::load(&path).unwrap();
        assert!(store.get(GEM_TEST).unwrap().contains("mcqs"));
        assert!(path.exists());
    }

    #[test]
    fn missing_defaults_merged_into_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gems.json");
        std::fs::write(&path, r#"{"My Custom Gem": "do the thing"}"#).unwrap();

        let store = GemStore::load(&path).unwrap();
        assert_eq!(store.get("My Custom Gem"), Some("do the thing"));
        assert!(store.get(GEM_QUIZ).is_some(), "default should be merged in");

        // The merge is persisted, not just in-memory.
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(GEM_QUIZ));
    }

    #[test]
    fn user_edits_to_default_gems_survive_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gems.json");

        let mut store = GemStore::load(&path).unwrap();
        store.set(GEM_TEST, "my edited prompt").unwrap();

        let reloaded = GemStore::load(&path).unwrap();
        assert_eq!(reloaded.get(GEM_TEST), Some("my edited prompt"));
    }

    #[test]
    fn rename_refuses_collision() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GemStore::load(dir.path().join("gems.json")).unwrap();
        store.set("One", "a").unwrap();
        store.set("Two", "b").unwrap();

        let err = store.rename("One", "Two").unwrap_err();
        assert!(err.contains("already exists"));
        assert_eq!(store.get("One"), Some("a"));
    }

    #[test]
    fn delete_refuses_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GemStore::load(dir.path().join("gems.json")).unwrap();

        assert!(store.delete(GEM_COMMENT).is_err());
        assert!(store.get(GEM_COMMENT).is_some());
    }

    #[test]
    fn delete_removes_custom_gem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gems.json");
        let mut store = GemStore::load(&path).unwrap();
        store.set("Scratch", "temp").unwrap();

        store.delete("Scratch").unwrap();
        assert!(store.get("Scratch").is_none());

        let reloaded = GemStore::load(&path).unwrap();
        assert!(reloaded.get("Scratch").is_none());
    }
}
