//! Pipeline assembly: ordered nodes → decode stage, filter chain, encode
//! stage.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FlowcutError, FlowcutResult};
use crate::graph::Node;
use crate::resolve::{FilterOp, ResolveOptions, resolve};

/// Render mode selecting the encode-stage trade-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Fast, low-latency encode with the output clamped to a short excerpt.
    Preview,
    /// Full-length, higher-quality encode.
    Full,
}

/// Output duration ceiling for preview renders, in seconds.
pub const PREVIEW_DURATION_SECS: f64 = 3.0;

impl RenderMode {
    fn preset(self) -> &'static str {
        match self {
            RenderMode::Preview => "veryfast",
            RenderMode::Full => "medium",
        }
    }

    fn duration_limit(self) -> Option<f64> {
        match self {
            RenderMode::Preview => Some(PREVIEW_DURATION_SECS),
            RenderMode::Full => None,
        }
    }
}

impl FromStr for RenderMode {
    type Err = FlowcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(RenderMode::Preview),
            "full" => Ok(RenderMode::Full),
            other => Err(FlowcutError::graph_format(format!(
                "render mode must be 'preview' or 'full', got '{other}'"
            ))),
        }
    }
}

/// Decode stage: the source the engine reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeStage {
    pub source: PathBuf,
}

/// Encode stage: where and how the engine writes the artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeStage {
    pub out_path: PathBuf,
    pub codec: &'static str,
    pub preset: &'static str,
    /// Output duration ceiling in seconds; `None` means unclamped.
    pub duration_limit: Option<f64>,
    pub pixel_format: &'static str,
}

/// The final ordered stage list, ready for execution.
///
/// Owned exclusively by the compile call that produced it; discarded after
/// execution, never persisted or shared across requests.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPipeline {
    pub decode: DecodeStage,
    pub filters: Vec<FilterOp>,
    pub encode: EncodeStage,
}

/// Compilation configuration.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Directory artifacts are written into.
    pub out_dir: PathBuf,
    pub resolve: ResolveOptions,
    /// Fixed artifact file name. `None` generates a collision-resistant
    /// `render_<uuid>.mp4`, so concurrent renders never contend on a path.
    pub artifact_name: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("outputs"),
            resolve: ResolveOptions::default(),
            artifact_name: None,
        }
    }
}

impl CompileOptions {
    fn artifact_path(&self) -> PathBuf {
        let name = self
            .artifact_name
            .clone()
            .unwrap_or_else(|| format!("render_{}.mp4", uuid::Uuid::new_v4()));
        self.out_dir.join(name)
    }
}

/// Assemble a compiled pipeline from a linearized node sequence.
///
/// The sequence is expected to come from [`crate::linearize::linearize`]:
/// input first, output last, transformations in between. Every failure here is
/// raised before the engine is ever invoked.
pub fn compile(
    nodes: &[&Node],
    mode: RenderMode,
    opts: &CompileOptions,
) -> FlowcutResult<CompiledPipeline> {
    let Some((first, rest)) = nodes.split_first() else {
        return Err(FlowcutError::graph_format("node sequence is empty"));
    };
    if !first.is_input() {
        return Err(FlowcutError::graph_format(format!(
            "first node '{}' is not an 'input' node",
            first.id
        )));
    }
    let Some((last, middle)) = rest.split_last() else {
        return Err(FlowcutError::graph_format(
            "node sequence has no 'output' node",
        ));
    };
    if !last.is_output() {
        return Err(FlowcutError::graph_format(format!(
            "last node '{}' is not an 'output' node",
            last.id
        )));
    }

    let source = source_path(first)?;
    if !source.exists() {
        return Err(FlowcutError::SourceNotFound(source));
    }

    let mut filters = Vec::with_capacity(middle.len());
    for node in middle {
        filters.push(resolve(node, &opts.resolve)?);
    }

    let pipeline = CompiledPipeline {
        decode: DecodeStage { source },
        filters,
        encode: EncodeStage {
            out_path: opts.artifact_path(),
            codec: "libx264",
            preset: mode.preset(),
            duration_limit: mode.duration_limit(),
            pixel_format: "yuv420p",
        },
    };
    tracing::debug!(
        source = %pipeline.decode.source.display(),
        filters = pipeline.filters.len(),
        preset = pipeline.encode.preset,
        "compiled pipeline"
    );
    Ok(pipeline)
}

fn source_path(input: &Node) -> FlowcutResult<PathBuf> {
    let Some(value) = input.data.get("path") else {
        return Err(FlowcutError::parameter(&input.id, "path", "is required"));
    };
    let Some(path) = value.as_text() else {
        return Err(FlowcutError::parameter(
            &input.id,
            "path",
            "must be a string",
        ));
    };
    if path.trim().is_empty() {
        return Err(FlowcutError::parameter(
            &input.id,
            "path",
            "must be non-empty",
        ));
    }
    Ok(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::linearize::linearize;

    fn chain_graph(source: &Path) -> Graph {
        Graph::parse(&format!(
            r#"{{
            "nodes": {{
                "1": {{
                    "name": "input",
                    "data": {{ "path": {path} }},
                    "outputs": {{ "out": [ {{ "node": "2", "input": "in" }} ] }}
                }},
                "2": {{
                    "name": "scale",
                    "data": {{ "width": 1280, "height": 720 }},
                    "outputs": {{ "out": [ {{ "node": "3", "input": "in" }} ] }}
                }},
                "3": {{ "name": "output" }}
            }}
        }}"#,
            path = serde_json::to_string(&source.to_string_lossy()).unwrap()
        ))
        .unwrap()
    }

    fn fixed_opts(dir: &Path) -> CompileOptions {
        CompileOptions {
            out_dir: dir.to_path_buf(),
            artifact_name: Some("out.mp4".to_string()),
            ..CompileOptions::default()
        }
    }

    #[test]
    fn preview_clamps_duration_and_uses_fast_preset() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.mp4");
        std::fs::write(&src, b"x").unwrap();

        let graph = chain_graph(&src);
        let order = linearize(&graph).unwrap();
        let pipeline = compile(&order, RenderMode::Preview, &fixed_opts(dir.path())).unwrap();

        assert_eq!(pipeline.encode.duration_limit, Some(3.0));
        assert_eq!(pipeline.encode.preset, "veryfast");
        assert_eq!(pipeline.encode.codec, "libx264");
        assert_eq!(pipeline.encode.pixel_format, "yuv420p");
        assert_eq!(
            pipeline.filters,
            vec![FilterOp::Scale {
                width: 1280,
                height: 720
            }]
        );
    }

    #[test]
    fn full_mode_is_unclamped_and_higher_quality() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.mp4");
        std::fs::write(&src, b"x").unwrap();

        let graph = chain_graph(&src);
        let order = linearize(&graph).unwrap();
        let pipeline = compile(&order, RenderMode::Full, &fixed_opts(dir.path())).unwrap();

        assert_eq!(pipeline.encode.duration_limit, None);
        assert_eq!(pipeline.encode.preset, "medium");
    }

    #[test]
    fn compile_is_pure_for_a_fixed_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.mp4");
        std::fs::write(&src, b"x").unwrap();

        let graph = chain_graph(&src);
        let order = linearize(&graph).unwrap();
        let opts = fixed_opts(dir.path());
        let a = compile(&order, RenderMode::Preview, &opts).unwrap();
        let b = compile(&order, RenderMode::Preview, &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generated_artifact_names_do_not_collide() {
        let opts = CompileOptions::default();
        assert_ne!(opts.artifact_path(), opts.artifact_path());
    }

    #[test]
    fn missing_source_fails_before_resolution() {
        let graph = chain_graph(Path::new("definitely/not/here.mp4"));
        let order = linearize(&graph).unwrap();
        let err = compile(&order, RenderMode::Preview, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, FlowcutError::SourceNotFound(_)), "{err}");
    }

    #[test]
    fn input_without_path_fails() {
        let graph = Graph::parse(
            r#"{
            "nodes": {
                "1": {
                    "name": "input",
                    "outputs": { "out": [ { "node": "2", "input": "in" } ] }
                },
                "2": { "name": "output" }
            }
        }"#,
        )
        .unwrap();
        let order = linearize(&graph).unwrap();
        let err = compile(&order, RenderMode::Full, &CompileOptions::default()).unwrap_err();
        match err {
            FlowcutError::Parameter { node, field, .. } => {
                assert_eq!(node, "1");
                assert_eq!(field, "path");
            }
            other => panic!("expected Parameter error, got {other}"),
        }
    }

    #[test]
    fn render_mode_parses_from_str() {
        assert_eq!(
            "preview".parse::<RenderMode>().unwrap(),
            RenderMode::Preview
        );
        assert_eq!("full".parse::<RenderMode>().unwrap(), RenderMode::Full);
        assert!("draft".parse::<RenderMode>().is_err());
    }
}
