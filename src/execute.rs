//! Pipeline execution: hand a compiled pipeline to the system `ffmpeg` and
//! block until it finishes.
//!
//! The engine is an opaque collaborator. Its diagnostic output is surfaced
//! verbatim on failure; nothing is parsed, reinterpreted, or retried.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::compile::CompiledPipeline;
use crate::error::{FlowcutError, FlowcutResult};

/// Render a compiled pipeline to the `ffmpeg` argument vector.
///
/// Pure: this is the whole engine contract, testable without ffmpeg installed.
pub fn engine_args(pipeline: &CompiledPipeline) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    // Overwrite any pre-existing output at the target path.
    args.push("-y".into());
    args.push("-loglevel".into());
    args.push("error".into());
    args.push("-i".into());
    args.push(pipeline.decode.source.as_os_str().to_os_string());

    if !pipeline.filters.is_empty() {
        let chain = pipeline
            .filters
            .iter()
            .map(|op| op.render())
            .collect::<Vec<_>>()
            .join(",");
        args.push("-vf".into());
        args.push(chain.into());
    }

    if let Some(limit) = pipeline.encode.duration_limit {
        args.push("-t".into());
        args.push(format!("{limit}").into());
    }

    args.push("-c:v".into());
    args.push(pipeline.encode.codec.into());
    args.push("-preset".into());
    args.push(pipeline.encode.preset.into());
    args.push("-pix_fmt".into());
    args.push(pipeline.encode.pixel_format.into());
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(pipeline.encode.out_path.as_os_str().to_os_string());
    args
}

/// Execute a compiled pipeline, blocking until the engine exits.
///
/// Returns the artifact path on success. A nonzero engine exit surfaces the
/// engine's stderr text verbatim as an `EngineExecution` error.
pub fn execute(pipeline: &CompiledPipeline) -> FlowcutResult<PathBuf> {
    ensure_parent_dir(&pipeline.encode.out_path)?;

    let args = engine_args(pipeline);
    tracing::info!(
        source = %pipeline.decode.source.display(),
        out = %pipeline.encode.out_path.display(),
        filters = pipeline.filters.len(),
        "invoking ffmpeg"
    );

    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| "failed to spawn ffmpeg (is it installed and on PATH?)")?;

    if !output.status.success() {
        let diagnostic = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(FlowcutError::engine(diagnostic));
    }

    Ok(pipeline.encode.out_path.clone())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FlowcutResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{CompiledPipeline, DecodeStage, EncodeStage};
    use crate::resolve::FilterOp;

    fn pipeline(filters: Vec<FilterOp>, duration_limit: Option<f64>) -> CompiledPipeline {
        CompiledPipeline {
            decode: DecodeStage {
                source: PathBuf::from("a.mp4"),
            },
            filters,
            encode: EncodeStage {
                out_path: PathBuf::from("out/preview.mp4"),
                codec: "libx264",
                preset: if duration_limit.is_some() {
                    "veryfast"
                } else {
                    "medium"
                },
                duration_limit,
                pixel_format: "yuv420p",
            },
        }
    }

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn preview_scenario_renders_full_argument_vector() {
        let p = pipeline(
            vec![
                FilterOp::Scale {
                    width: 1280,
                    height: 720,
                },
                FilterOp::Equalize {
                    brightness: Some(0.2),
                    contrast: None,
                    saturation: None,
                },
            ],
            Some(3.0),
        );
        assert_eq!(
            strs(&engine_args(&p)),
            vec![
                "-y",
                "-loglevel",
                "error",
                "-i",
                "a.mp4",
                "-vf",
                "scale=1280:720,eq=brightness=0.2",
                "-t",
                "3",
                "-c:v",
                "libx264",
                "-preset",
                "veryfast",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
                "out/preview.mp4",
            ]
        );
    }

    #[test]
    fn full_mode_omits_duration_clamp() {
        let args = strs(&engine_args(&pipeline(vec![FilterOp::HFlip], None)));
        assert!(!args.contains(&"-t".to_string()));
        assert!(args.contains(&"medium".to_string()));
    }

    #[test]
    fn filterless_pipeline_omits_vf() {
        let args = strs(&engine_args(&pipeline(vec![], Some(3.0))));
        assert!(!args.contains(&"-vf".to_string()));
    }

    #[test]
    fn trim_expands_to_chained_filters() {
        let p = pipeline(
            vec![
                FilterOp::Trim {
                    start: 1.0,
                    end: Some(4.0),
                },
                FilterOp::Grayscale,
            ],
            None,
        );
        let args = strs(&engine_args(&p));
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(
            args[vf + 1],
            "trim=start=1:end=4,setpts=PTS-STARTPTS,hue=s=0"
        );
    }

    #[test]
    fn path_probe_does_not_panic() {
        let _ = is_ffmpeg_on_path();
    }
}
