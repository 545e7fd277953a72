//! Request orchestration: load, apply a submission, preserve, save.
//!
//! # Save cycle
//!
//! ```text
//! load document ──► check revision ──► lists ──► BUNKERS ──► CATAclySMS
//!                                                                │
//!                          write (atomic) ◄── ensure ABILITIES ◄─┘
//! ```
//!
//! The document loaded at the start of the request is the "original" for
//! the preservation guard; regeneration only ever sees the in-memory copy.

pub mod form;
pub mod render;

pub use form::{FormData, Submission};

use crate::{
    codec::{
        LIST_KEYS,
        bunker::{self, Bunker},
        cataclysm::{self, Cataclysm},
        list, preserve,
        record::Record,
    },
    config::EditorConfig,
    document::{self, DataFile, DocumentError},
    log,
    sync::{self, SyncError, SyncReport},
};

/// One simple list as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub key: &'static str,
    pub label: &'static str,
    pub items: Vec<String>,
}

/// Parsed content of a document, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub lists: Vec<ListView>,
    pub bunkers: Vec<Bunker>,
    pub cataclysms: Vec<Cataclysm>,
    /// Revision of the document the view was built from.
    pub revision: String,
    /// Whether the `ABILITIES` block is present.
    pub preserved: bool,
}

impl View {
    pub fn from_document(text: &str) -> Self {
        Self {
            lists: LIST_KEYS
                .iter()
                .map(|&(key, label)| ListView {
                    key,
                    label,
                    items: list::parse(text, key),
                })
                .collect(),
            bunkers: bunker::parse(text),
            cataclysms: cataclysm::parse(text),
            revision: document::revision(text),
            preserved: preserve::is_present(text),
        }
    }

    /// Plain-text overview, one line per section.
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = self
            .lists
            .iter()
            .map(|list| format!("{:<12} {:>4}  {}", list.key, list.items.len(), list.label))
            .collect();
        lines.push(format!("{:<12} {:>4}", Bunker::NAME, self.bunkers.len()));
        lines.push(format!("{:<12} {:>4}", Cataclysm::NAME, self.cataclysms.len()));
        lines.push(format!(
            "{:<12} {}",
            preserve::PRESERVED,
            if self.preserved { "present" } else { "missing" }
        ));
        lines.push(format!("revision     {}", self.revision));
        lines.join("\n")
    }
}

/// Result of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Submission applied; `changed` is false when the file already had this content.
    Saved { changed: bool },
    /// The file changed after the form was rendered; nothing was written.
    Stale,
}

/// Apply a submission to a document. Pure: no I/O.
pub fn apply(original: &str, submission: &Submission) -> String {
    let mut text = original.to_owned();

    for (key, items) in &submission.lists {
        text = list::regenerate(&text, key, items.as_slice());
    }
    text = bunker::regenerate(&text, submission.bunkers.clone());
    text = cataclysm::regenerate(&text, submission.cataclysms.clone());

    preserve::ensure_preserved(original, &text)
}

/// The editor bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Editor<'a> {
    config: &'a EditorConfig,
    file: DataFile<'a>,
}

impl<'a> Editor<'a> {
    pub const fn new(config: &'a EditorConfig) -> Self {
        Self {
            config,
            file: DataFile::new(config),
        }
    }

    pub const fn config(&self) -> &'a EditorConfig {
        self.config
    }

    pub fn view(&self) -> Result<View, DocumentError> {
        Ok(View::from_document(&self.file.load()?))
    }

    /// Render the edit page for the current file.
    pub fn page(&self, flash: Option<&str>) -> Result<String, DocumentError> {
        Ok(render::page(&self.view()?, self.config, flash))
    }

    /// Apply a submission to the file on disk.
    ///
    /// A submission carrying a revision is refused when the file no longer
    /// has that revision.
    pub fn save(&self, submission: &Submission) -> Result<SaveOutcome, DocumentError> {
        let original = self.file.load()?;

        if let Some(expected) = &submission.revision
            && *expected != document::revision(&original)
        {
            log!("save"; "rejected stale form for {}", self.file.path().display());
            return Ok(SaveOutcome::Stale);
        }

        let text = apply(&original, submission);
        if text == original {
            log!("save"; "no changes");
            return Ok(SaveOutcome::Saved { changed: false });
        }

        self.file.save(&text)?;
        Ok(SaveOutcome::Saved { changed: true })
    }

    /// Repository and branch for a sync request.
    ///
    /// Missing or blank overrides fall back to the configured defaults.
    pub fn sync_target<'s>(
        &'s self,
        repo: Option<&'s str>,
        branch: Option<&'s str>,
    ) -> (&'s str, &'s str) {
        let defaults = &self.config.sync;
        let pick = |value: Option<&'s str>, default: &'s str| {
            value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default)
        };
        (pick(repo, defaults.repo.as_str()), pick(branch, defaults.branch.as_str()))
    }

    /// Run remote sync for [`Editor::sync_target`].
    pub fn sync(&self, repo: Option<&str>, branch: Option<&str>) -> Result<SyncReport, SyncError> {
        let (repo, branch) = self.sync_target(repo, branch);
        sync::sync(self.config, repo, branch)
    }
}
