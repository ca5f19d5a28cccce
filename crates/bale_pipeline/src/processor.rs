//! The closed set of content processors.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use bale_config::ProcessorConfig;

use crate::error::TransformError;
use crate::state::{ContentItem, ContentState};

/// One step of the pipeline.
///
/// Every processor accepts exactly one [`ContentState`] and moves content to
/// exactly one successor state.
#[derive(Debug, Clone)]
pub enum Processor {
    /// Raw JSON becomes a module returning the parsed value.
    Json,
    /// Raw content of an extension is already in its terminal form.
    Passthrough {
        /// The extension passed through.
        extension: String,
    },
    /// An external program converts the content.
    Command(CommandProcessor),
}

impl Processor {
    /// Passes raw content of `extension` through unchanged.
    pub fn passthrough(extension: impl Into<String>) -> Self {
        Processor::Passthrough {
            extension: extension.into(),
        }
    }

    /// Name used in logs and configuration errors.
    pub fn name(&self) -> String {
        match self {
            Processor::Json => "json".to_string(),
            Processor::Passthrough { extension } => format!("passthrough .{extension}"),
            Processor::Command(command) => command.program.clone(),
        }
    }

    /// The state this processor acts on.
    pub fn accepts(&self) -> ContentState {
        match self {
            Processor::Json => ContentState::unprocessed("json"),
            Processor::Passthrough { extension } => ContentState::unprocessed(extension.as_str()),
            Processor::Command(command) => command.accepts.clone(),
        }
    }

    /// Returns `true` if this processor acts on `state`.
    pub fn supports(&self, state: &ContentState) -> bool {
        self.accepts() == *state
    }

    /// The state content is in after this processor ran.
    pub fn produces(&self) -> ContentState {
        match self {
            // The result is a `return` module, so outputs are named `.js`, not `.json`.
            Processor::Json => ContentState::processed("js"),
            Processor::Passthrough { extension } => ContentState::processed(extension.as_str()),
            Processor::Command(command) => command.produces.clone(),
        }
    }

    /// Converts the item's content and moves it to [`produces`](Self::produces).
    pub fn transform(&self, item: &mut ContentItem) -> Result<(), TransformError> {
        let content = match self {
            Processor::Json => format!("return {};\n", item.content()),
            Processor::Passthrough { .. } => item.content().to_string(),
            Processor::Command(command) => command.run(item.content())?,
        };
        item.transition(self.produces(), content)
    }
}

/// Runs a program with the content on stdin and takes stdout as the result.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    accepts: ContentState,
    produces: ContentState,
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandProcessor {
    /// Creates a processor converting `accepts` into `produces` with `program`.
    pub fn new(
        accepts: ContentState,
        produces: ContentState,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            accepts,
            produces,
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Builds a processor from a `[[processors]]` table.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        let accepts = if config.chained {
            ContentState::intermediate(config.from.as_str())
        } else {
            ContentState::unprocessed(config.from.as_str())
        };
        let produces = if config.intermediate {
            ContentState::intermediate(config.to.as_str())
        } else {
            ContentState::processed(config.to.as_str())
        };
        Self::new(accepts, produces, config.command.as_str(), config.args.clone())
    }

    /// Runs the program inside `dir` instead of the process working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The program this processor runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, input: &str) -> Result<String, TransformError> {
        let spawn_error = |source| TransformError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        let mut child = command.spawn().map_err(spawn_error)?;

        // Feed stdin from a second thread so a program that writes before it
        // has read everything cannot fill the stdout pipe and stall.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or(Ok(()));
            (output, written)
        });
        let output = output.map_err(spawn_error)?;

        if !output.status.success() {
            return Err(TransformError::Command {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(spawn_error(e));
            }
        }

        String::from_utf8(output.stdout).map_err(|_| TransformError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}
