//! Flowcut compiles user-authored node graphs into ordered ffmpeg pipelines.
//!
//! The path through the crate mirrors the data flow:
//!
//! - Parse a submission into a [`Graph`]
//! - [`linearize`] it into a deterministic input-to-output node sequence
//! - Resolve each node against the operation catalog ([`FilterOp`])
//! - [`compile`](compile::compile) the sequence into a [`CompiledPipeline`]
//! - [`execute`](execute::execute) it by invoking the system `ffmpeg`
#![forbid(unsafe_code)]

pub mod catalog;
pub mod compile;
pub mod error;
pub mod execute;
pub mod graph;
pub mod linearize;
pub mod resolve;
pub mod session;

pub use catalog::{OperationDescriptor, ParamDescriptor, ParamKind, operation_catalog};
pub use compile::{
    CompileOptions, CompiledPipeline, DecodeStage, EncodeStage, PREVIEW_DURATION_SECS, RenderMode,
};
pub use error::{FlowcutError, FlowcutResult, GraphValidationError};
pub use execute::{engine_args, execute, is_ffmpeg_on_path};
pub use graph::{Connection, Graph, Node, ParamValue};
pub use linearize::linearize;
pub use resolve::{FadeDirection, FilterOp, ResolveOptions, UnknownNodePolicy, resolve};
pub use session::{compile_and_execute, compile_graph};
