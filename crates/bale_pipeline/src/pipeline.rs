//! The processor dispatch table and the driver loop.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use bale_common::SourceFile;
use bale_config::ProcessorConfig;

use crate::error::{PipelineError, TransformError};
use crate::processor::{CommandProcessor, Processor};
use crate::state::{ContentItem, ContentState};

/// Processors available without configuration.
fn builtin_processors() -> Vec<Processor> {
    vec![
        Processor::Json,
        Processor::passthrough("js"),
        Processor::passthrough("css"),
    ]
}

/// A validated set of processors indexed by the state they accept.
///
/// Construction fails if two processors accept the same state or if any
/// processor produces a non-terminal state nothing accepts, so a pipeline
/// that exists can always finish what it starts.
#[derive(Debug, Clone)]
pub struct Pipeline {
    table: BTreeMap<ContentState, Processor>,
}

impl Pipeline {
    /// Builds the dispatch table for `processors`.
    pub fn new(processors: impl IntoIterator<Item = Processor>) -> Result<Self, PipelineError> {
        let mut table: BTreeMap<ContentState, Processor> = BTreeMap::new();
        for processor in processors {
            match table.entry(processor.accepts()) {
                Entry::Occupied(existing) => {
                    return Err(PipelineError::Ambiguous {
                        state: existing.key().clone(),
                        first: existing.get().name(),
                        second: processor.name(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(processor);
                }
            }
        }

        for processor in table.values() {
            let next = processor.produces();
            if !next.is_terminal() && !table.contains_key(&next) {
                return Err(PipelineError::Uncovered {
                    processor: processor.name(),
                    state: next,
                });
            }
        }

        Ok(Self { table })
    }

    /// The JSON, JavaScript and CSS processors.
    pub fn builtin() -> Self {
        Self {
            table: builtin_processors()
                .into_iter()
                .map(|p| (p.accepts(), p))
                .collect(),
        }
    }

    /// Builds a pipeline from `[[processors]]` tables plus the built-ins.
    ///
    /// A configured processor replaces the built-in that accepts the same
    /// state. Commands run inside `working_dir` when one is given.
    pub fn from_config(
        configs: &[ProcessorConfig],
        working_dir: Option<&Path>,
    ) -> Result<Self, PipelineError> {
        let commands: Vec<Processor> = configs
            .iter()
            .map(|config| {
                let command = CommandProcessor::from_config(config);
                Processor::Command(match working_dir {
                    Some(dir) => command.in_dir(dir),
                    None => command,
                })
            })
            .collect();
        let claimed: BTreeSet<ContentState> = commands.iter().map(Processor::accepts).collect();
        let builtins = builtin_processors()
            .into_iter()
            .filter(|p| !claimed.contains(&p.accepts()));
        Self::new(builtins.chain(commands))
    }

    /// The processor for `state`, if any.
    pub fn processor_for(&self, state: &ContentState) -> Option<&Processor> {
        self.table.get(state)
    }

    /// Returns `true` if some processor accepts `state`.
    pub fn supports(&self, state: &ContentState) -> bool {
        self.table.contains_key(state)
    }

    fn dispatch(&self, state: &ContentState) -> Result<&Processor, TransformError> {
        self.table
            .get(state)
            .ok_or_else(|| TransformError::Unsupported {
                state: state.clone(),
            })
    }

    /// Advances the item's declared state to the terminal one without
    /// running any transform. The content is left untouched.
    pub fn peek_item(&self, item: &mut ContentItem) -> Result<(), TransformError> {
        while !item.state().is_terminal() {
            let processor = self.dispatch(item.state())?;
            item.declare(processor.produces())?;
        }
        Ok(())
    }

    /// Predicts the terminal state of `file` without reading it.
    pub fn peek(&self, file: &SourceFile) -> Result<ContentState, TransformError> {
        let mut item = ContentItem::new(file.clone(), String::new());
        self.peek_item(&mut item)?;
        Ok(item.state().clone())
    }

    /// Drives `item` to the processed state.
    pub fn run(&self, item: &mut ContentItem) -> Result<(), TransformError> {
        while !item.state().is_terminal() {
            let processor = self.dispatch(item.state())?;
            tracing::trace!(file = %item.file(), state = %item.state(), processor = %processor.name(), "transforming");
            processor.transform(item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(from: &str, to: &str, intermediate: bool, chained: bool, command: &str) -> ProcessorConfig {
        ProcessorConfig {
            from: from.to_string(),
            to: to.to_string(),
            intermediate,
            chained,
            command: command.to_string(),
            args: vec![],
        }
    }

    #[test]
    fn builtin_peeks_json_to_js() {
        let pipeline = Pipeline::builtin();
        let state = pipeline.peek(&SourceFile::new("data/config.json")).unwrap();
        assert_eq!(state, ContentState::processed("js"));
    }

    #[test]
    fn builtin_runs_json() {
        let pipeline = Pipeline::builtin();
        let mut item = ContentItem::new(SourceFile::new("a.json"), "[1, 2]");
        pipeline.run(&mut item).unwrap();
        assert_eq!(item.content(), "return [1, 2];\n");
    }

    #[test]
    fn unsupported_extension() {
        let pipeline = Pipeline::builtin();
        let err = pipeline.peek(&SourceFile::new("logo.png")).unwrap_err();
        assert!(matches!(err, TransformError::Unsupported { .. }));
    }

    #[test]
    fn ambiguous_processors_rejected() {
        let err = Pipeline::new(vec![Processor::passthrough("js"), Processor::passthrough("js")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Ambiguous { .. }));
    }

    #[test]
    fn uncovered_intermediate_rejected() {
        let ts = CommandProcessor::from_config(&config("ts", "js", true, false, "tsc"));
        let err = Pipeline::new(vec![Processor::Command(ts)]).unwrap_err();
        match err {
            PipelineError::Uncovered { processor, state } => {
                assert_eq!(processor, "tsc");
                assert_eq!(state, ContentState::intermediate("js"));
            }
            other => panic!("expected Uncovered, got {other:?}"),
        }
    }

    #[test]
    fn chained_intermediate_peeks_through() {
        let pipeline = Pipeline::from_config(
            &[
                config("ts", "js", true, false, "tsc"),
                config("js", "js", false, true, "terser"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            pipeline.peek(&SourceFile::new("src/app.ts")).unwrap(),
            ContentState::processed("js")
        );
        assert!(pipeline.supports(&ContentState::unprocessed("json")));
    }

    #[test]
    fn configured_processor_replaces_builtin() {
        let pipeline =
            Pipeline::from_config(&[config("css", "css", false, false, "postcss")], None).unwrap();
        let processor = pipeline
            .processor_for(&ContentState::unprocessed("css"))
            .unwrap();
        assert_eq!(processor.name(), "postcss");
    }

    #[test]
    fn peek_leaves_content_untouched() {
        let pipeline = Pipeline::builtin();
        let mut item = ContentItem::new(SourceFile::new("a.json"), "{}");
        pipeline.peek_item(&mut item).unwrap();
        assert_eq!(item.state(), &ContentState::processed("js"));
        assert_eq!(item.content(), "{}");
    }

    #[cfg(unix)]
    #[test]
    fn run_drives_through_intermediate() {
        let pipeline = Pipeline::from_config(
            &[
                ProcessorConfig {
                    args: vec!["s/let/var/".to_string()],
                    ..config("ts", "js", true, false, "sed")
                },
                ProcessorConfig {
                    args: vec!["s/var/VAR/".to_string()],
                    ..config("js", "js", false, true, "sed")
                },
            ],
            None,
        )
        .unwrap();
        let mut item = ContentItem::new(SourceFile::new("a.ts"), "let x = 1;");
        pipeline.run(&mut item).unwrap();
        assert_eq!(item.content(), "VAR x = 1;");
        assert_eq!(item.state(), &ContentState::processed("js"));
    }
}
