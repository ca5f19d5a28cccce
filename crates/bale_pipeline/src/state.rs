//! Processing states and the content item that moves through them.

use std::fmt;

use bale_common::SourceFile;

use crate::error::TransformError;

/// How far a piece of content has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Raw file content.
    Unprocessed,
    /// Converted, but another processor continues from here.
    Intermediate,
    /// Terminal form, ready to be wrapped.
    Processed,
}

/// A stage paired with the extension the content currently has.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentState {
    stage: Stage,
    extension: String,
}

impl ContentState {
    /// Creates a state.
    pub fn new(stage: Stage, extension: impl Into<String>) -> Self {
        Self {
            stage,
            extension: extension.into(),
        }
    }

    /// Raw content with the given extension.
    pub fn unprocessed(extension: impl Into<String>) -> Self {
        Self::new(Stage::Unprocessed, extension)
    }

    /// Intermediate content with the given extension.
    pub fn intermediate(extension: impl Into<String>) -> Self {
        Self::new(Stage::Intermediate, extension)
    }

    /// Terminal content with the given extension.
    pub fn processed(extension: impl Into<String>) -> Self {
        Self::new(Stage::Processed, extension)
    }

    /// The stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The extension, without a dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns `true` for the processed stage.
    pub fn is_terminal(&self) -> bool {
        self.stage == Stage::Processed
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            Stage::Unprocessed => "unprocessed",
            Stage::Intermediate => "intermediate",
            Stage::Processed => "processed",
        };
        write!(f, "{stage} .{}", self.extension)
    }
}

/// One file's content on its way through the pipeline.
///
/// Transitions are monotonic: once processed the item cannot move again, and
/// it never returns to a state it already held.
#[derive(Debug, Clone)]
pub struct ContentItem {
    file: SourceFile,
    content: String,
    state: ContentState,
    visited: Vec<ContentState>,
}

impl ContentItem {
    /// Starts an item in the unprocessed state of the file's extension.
    pub fn new(file: SourceFile, content: impl Into<String>) -> Self {
        let state = ContentState::unprocessed(file.extension());
        Self {
            file,
            content: content.into(),
            state,
            visited: Vec::new(),
        }
    }

    /// The file the content was read from.
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// The current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The current state.
    pub fn state(&self) -> &ContentState {
        &self.state
    }

    /// Consumes the item, returning its content.
    pub fn into_content(self) -> String {
        self.content
    }

    /// Moves to `next`, replacing the content.
    pub fn transition(&mut self, next: ContentState, content: String) -> Result<(), TransformError> {
        self.declare(next)?;
        self.content = content;
        Ok(())
    }

    /// Moves to `next` without touching the content.
    ///
    /// Used when predicting the terminal extension.
    pub fn declare(&mut self, next: ContentState) -> Result<(), TransformError> {
        if self.state.is_terminal() {
            return Err(TransformError::AlreadyProcessed);
        }
        if next == self.state || self.visited.contains(&next) {
            return Err(TransformError::Cycle { state: next });
        }
        let previous = std::mem::replace(&mut self.state, next);
        self.visited.push(previous);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_starts_unprocessed_with_file_extension() {
        let item = ContentItem::new(SourceFile::new("src/data.json"), "{}");
        assert_eq!(item.state(), &ContentState::unprocessed("json"));
        assert_eq!(item.content(), "{}");
    }

    #[test]
    fn transition_replaces_content() {
        let mut item = ContentItem::new(SourceFile::new("a.ts"), "let a: number;");
        item.transition(ContentState::intermediate("js"), "var a;".to_string())
            .unwrap();
        item.transition(ContentState::processed("js"), "var a;\n".to_string())
            .unwrap();
        assert!(item.state().is_terminal());
        assert_eq!(item.into_content(), "var a;\n");
    }

    #[test]
    fn processed_is_terminal() {
        let mut item = ContentItem::new(SourceFile::new("a.js"), "");
        item.declare(ContentState::processed("js")).unwrap();
        let err = item.declare(ContentState::processed("min.js")).unwrap_err();
        assert!(matches!(err, TransformError::AlreadyProcessed));
    }

    #[test]
    fn revisiting_a_state_is_a_cycle() {
        let mut item = ContentItem::new(SourceFile::new("a.coffee"), "");
        item.declare(ContentState::intermediate("js")).unwrap();
        item.declare(ContentState::intermediate("ts")).unwrap();
        let err = item.declare(ContentState::intermediate("js")).unwrap_err();
        assert!(matches!(err, TransformError::Cycle { .. }));
    }

    #[test]
    fn self_transition_is_a_cycle() {
        let mut item = ContentItem::new(SourceFile::new("a.js"), "");
        item.declare(ContentState::intermediate("js")).unwrap();
        assert!(item.declare(ContentState::intermediate("js")).is_err());
    }

    #[test]
    fn state_display() {
        assert_eq!(ContentState::intermediate("js").to_string(), "intermediate .js");
    }
}
