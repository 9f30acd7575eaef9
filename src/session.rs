//! Entry points exposed to the surrounding service layer.
//!
//! The full path is parse → linearize → compile → execute. Every
//! validation-class failure (format, topology, unsupported node, parameter,
//! missing source) is raised by the compile half, so the engine is never
//! invoked for a graph that cannot render.

use std::path::PathBuf;

use crate::compile::{CompileOptions, CompiledPipeline, RenderMode, compile};
use crate::error::FlowcutResult;
use crate::execute::execute;
use crate::graph::Graph;
use crate::linearize::linearize;

/// Compile a graph into an executable pipeline without running the engine.
///
/// Pure: compiling the same graph and mode twice yields structurally
/// identical pipelines (fix `CompileOptions::artifact_name` to make the
/// artifact path deterministic as well).
pub fn compile_graph(
    graph: &Graph,
    mode: RenderMode,
    opts: &CompileOptions,
) -> FlowcutResult<CompiledPipeline> {
    let order = linearize(graph)?;
    compile(&order, mode, opts)
}

/// Compile a graph and hand it to the external engine, blocking until the
/// artifact is produced.
pub fn compile_and_execute(
    graph: &Graph,
    mode: RenderMode,
    opts: &CompileOptions,
) -> FlowcutResult<PathBuf> {
    let pipeline = compile_graph(graph, mode, opts)?;
    execute(&pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FlowcutError, GraphValidationError};

    #[test]
    fn missing_output_node_fails_before_any_engine_work() {
        let graph = Graph::parse(
            r#"{
            "nodes": {
                "1": {
                    "name": "input",
                    "data": { "path": "a.mp4" },
                    "outputs": { "out": [ { "node": "2", "input": "in" } ] }
                },
                "2": { "name": "blur" }
            }
        }"#,
        )
        .unwrap();
        let err =
            compile_and_execute(&graph, RenderMode::Preview, &CompileOptions::default())
                .unwrap_err();
        assert!(matches!(
            err,
            FlowcutError::GraphValidation(GraphValidationError::NoOutputReached)
        ));
    }

    #[test]
    fn missing_source_fails_before_any_engine_work() {
        let graph = Graph::parse(
            r#"{
            "nodes": {
                "1": {
                    "name": "input",
                    "data": { "path": "no/such/file.mp4" },
                    "outputs": { "out": [ { "node": "2", "input": "in" } ] }
                },
                "2": { "name": "output" }
            }
        }"#,
        )
        .unwrap();
        let err =
            compile_and_execute(&graph, RenderMode::Full, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, FlowcutError::SourceNotFound(_)), "{err}");
    }
}
