//! Staged content pipeline for the bale bundler.
//!
//! A file's content moves through a small state machine: it starts
//! unprocessed under its own extension, may pass through intermediate forms
//! named by extension, and ends processed. Each step is performed by one
//! [`Processor`], selected through a dispatch table that is validated when
//! the [`Pipeline`] is built. [`PipelineTranspiler`] puts the pipeline behind
//! the [`Transpiler`] interface the bundler consumes.

#![warn(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod processor;
pub mod state;
pub mod transpiler;

pub use error::{PipelineError, TransformError, TranspileError};
pub use pipeline::Pipeline;
pub use processor::{CommandProcessor, Processor};
pub use state::{ContentItem, ContentState, Stage};
pub use transpiler::{PipelineTranspiler, TranspileResult, Transpiler};
