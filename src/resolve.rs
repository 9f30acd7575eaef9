//! Operation resolution: node type + raw params → a normalized, validated
//! engine-facing operation.
//!
//! The catalog is a closed set of operation kinds; every kind applies its
//! documented defaults and checks its documented value domain. Out-of-domain
//! values are rejected (never clamped) so a bad graph fails loudly before the
//! engine is ever invoked.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::error::{FlowcutError, FlowcutResult};
use crate::graph::{Node, ParamValue};

/// What to do with a node whose type is not in the catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownNodePolicy {
    /// Fail resolution with an `UnsupportedNode` error.
    #[default]
    Reject,
    /// Emit the type name and raw parameter map as a generic engine filter.
    Passthrough,
}

/// Resolver configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolveOptions {
    pub unknown_nodes: UnknownNodePolicy,
}

/// Fade direction for the `fade` operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

/// A fully resolved catalog operation with all defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterOp {
    /// Resize; -1 on an axis preserves aspect ratio on that axis.
    Scale { width: i64, height: i64 },
    /// Rectangular crop. `None` for w/h inherits the source dimension.
    Crop {
        w: Option<i64>,
        h: Option<i64>,
        x: i64,
        y: i64,
    },
    /// Rotation, kept in degrees; rendered as an `angle*PI/180` expression.
    Rotate { angle_deg: f64 },
    HFlip,
    VFlip,
    /// Luma/chroma equalization. Exactly one field is set per source node
    /// (brightness / contrast / saturation nodes each map here).
    Equalize {
        brightness: Option<f64>,
        contrast: Option<f64>,
        saturation: Option<f64>,
    },
    GaussianBlur { sigma: f64 },
    /// Unsharp mask with a fixed 5x5 kernel and variable amount.
    Sharpen { amount: f64 },
    Fade {
        direction: FadeDirection,
        duration: f64,
    },
    /// Desaturate: saturation forced to 0.
    Grayscale,
    /// Timestamp rescale `(1/speed)*PTS`.
    SpeedChange { speed: f64 },
    FrameRate { fps: f64 },
    /// Time-range extraction; timestamps are reset to zero afterwards.
    Trim { start: f64, end: Option<f64> },
    /// Unknown type passed through verbatim (Passthrough policy only).
    Custom {
        name: String,
        args: BTreeMap<String, ParamValue>,
    },
}

/// Resolve one intermediate node against the operation catalog.
pub fn resolve(node: &Node, opts: &ResolveOptions) -> FlowcutResult<FilterOp> {
    match node.name.as_str() {
        "scale" => {
            let width = int_or(node, "width", -1)?;
            let height = int_or(node, "height", -1)?;
            check_axis(node, "width", width)?;
            check_axis(node, "height", height)?;
            Ok(FilterOp::Scale { width, height })
        }
        "crop" => {
            let w = opt_int(node, "w")?;
            let h = opt_int(node, "h")?;
            let x = int_or(node, "x", 0)?;
            let y = int_or(node, "y", 0)?;
            if let Some(w) = w
                && w <= 0
            {
                return Err(FlowcutError::parameter(&node.id, "w", "must be > 0"));
            }
            if let Some(h) = h
                && h <= 0
            {
                return Err(FlowcutError::parameter(&node.id, "h", "must be > 0"));
            }
            if x < 0 {
                return Err(FlowcutError::parameter(&node.id, "x", "must be >= 0"));
            }
            if y < 0 {
                return Err(FlowcutError::parameter(&node.id, "y", "must be >= 0"));
            }
            Ok(FilterOp::Crop { w, h, x, y })
        }
        "rotate" => {
            let angle_deg = num_or(node, "angle", 0.0)?;
            Ok(FilterOp::Rotate { angle_deg })
        }
        "hflip" => Ok(FilterOp::HFlip),
        "vflip" => Ok(FilterOp::VFlip),
        "brightness" => {
            let b = num_or(node, "brightness", 0.0)?;
            if !(-1.0..=1.0).contains(&b) {
                return Err(FlowcutError::parameter(
                    &node.id,
                    "brightness",
                    "must be within [-1, 1]",
                ));
            }
            Ok(FilterOp::Equalize {
                brightness: Some(b),
                contrast: None,
                saturation: None,
            })
        }
        "contrast" => {
            let c = num_or(node, "contrast", 1.0)?;
            if !(0.0..=3.0).contains(&c) {
                return Err(FlowcutError::parameter(
                    &node.id,
                    "contrast",
                    "must be within [0, 3]",
                ));
            }
            Ok(FilterOp::Equalize {
                brightness: None,
                contrast: Some(c),
                saturation: None,
            })
        }
        "saturation" => {
            let s = num_or(node, "saturation", 1.0)?;
            if !(0.0..=3.0).contains(&s) {
                return Err(FlowcutError::parameter(
                    &node.id,
                    "saturation",
                    "must be within [0, 3]",
                ));
            }
            Ok(FilterOp::Equalize {
                brightness: None,
                contrast: None,
                saturation: Some(s),
            })
        }
        "blur" => {
            let sigma = num_or(node, "sigma", 1.0)?;
            if sigma < 0.0 {
                return Err(FlowcutError::parameter(&node.id, "sigma", "must be >= 0"));
            }
            Ok(FilterOp::GaussianBlur { sigma })
        }
        "sharpen" => {
            let amount = num_or(node, "amount", 1.0)?;
            Ok(FilterOp::Sharpen { amount })
        }
        "fade" => {
            let direction = match text_or(node, "type", "in")?.as_str() {
                "in" => FadeDirection::In,
                "out" => FadeDirection::Out,
                other => {
                    return Err(FlowcutError::parameter(
                        &node.id,
                        "type",
                        format!("must be 'in' or 'out', got '{other}'"),
                    ));
                }
            };
            let duration = num_or(node, "duration", 1.0)?;
            if duration <= 0.0 {
                return Err(FlowcutError::parameter(&node.id, "duration", "must be > 0"));
            }
            Ok(FilterOp::Fade {
                direction,
                duration,
            })
        }
        "grayscale" => Ok(FilterOp::Grayscale),
        "speed" => {
            let speed = num_or(node, "speed", 1.0)?;
            if speed <= 0.0 {
                return Err(FlowcutError::parameter(&node.id, "speed", "must be > 0"));
            }
            Ok(FilterOp::SpeedChange { speed })
        }
        "fps" => {
            let fps = num_or(node, "fps", 30.0)?;
            if fps <= 0.0 {
                return Err(FlowcutError::parameter(&node.id, "fps", "must be > 0"));
            }
            Ok(FilterOp::FrameRate { fps })
        }
        "trim" => {
            let start = num_or(node, "start", 0.0)?;
            if start < 0.0 {
                return Err(FlowcutError::parameter(&node.id, "start", "must be >= 0"));
            }
            let end = opt_num(node, "end")?;
            if let Some(end) = end
                && end <= start
            {
                return Err(FlowcutError::parameter(
                    &node.id,
                    "end",
                    "must be greater than start",
                ));
            }
            Ok(FilterOp::Trim { start, end })
        }
        other => match opts.unknown_nodes {
            UnknownNodePolicy::Reject => Err(FlowcutError::unsupported_node(&node.id, other)),
            UnknownNodePolicy::Passthrough => Ok(FilterOp::Custom {
                name: other.to_string(),
                args: node.data.clone(),
            }),
        },
    }
}

impl FilterOp {
    /// Render to ffmpeg filter syntax, e.g. `scale=1280:720`.
    ///
    /// `Trim` renders two chained filters: the range extraction followed by a
    /// timestamp reset.
    pub fn render(&self) -> String {
        match self {
            FilterOp::Scale { width, height } => format!("scale={width}:{height}"),
            FilterOp::Crop { w, h, x, y } => {
                let w = w.map_or_else(|| "iw".to_string(), |v| v.to_string());
                let h = h.map_or_else(|| "ih".to_string(), |v| v.to_string());
                format!("crop={w}:{h}:{x}:{y}")
            }
            FilterOp::Rotate { angle_deg } => format!("rotate={}*PI/180", fmt_num(*angle_deg)),
            FilterOp::HFlip => "hflip".to_string(),
            FilterOp::VFlip => "vflip".to_string(),
            FilterOp::Equalize {
                brightness,
                contrast,
                saturation,
            } => {
                let mut out = String::from("eq=");
                let mut first = true;
                for (key, value) in [
                    ("brightness", brightness),
                    ("contrast", contrast),
                    ("saturation", saturation),
                ] {
                    if let Some(v) = value {
                        if !first {
                            out.push(':');
                        }
                        let _ = write!(out, "{key}={}", fmt_num(*v));
                        first = false;
                    }
                }
                out
            }
            FilterOp::GaussianBlur { sigma } => format!("gblur=sigma={}", fmt_num(*sigma)),
            FilterOp::Sharpen { amount } => format!("unsharp=5:5:{}", fmt_num(*amount)),
            FilterOp::Fade {
                direction,
                duration,
            } => {
                let t = match direction {
                    FadeDirection::In => "in",
                    FadeDirection::Out => "out",
                };
                format!("fade=t={t}:d={}", fmt_num(*duration))
            }
            FilterOp::Grayscale => "hue=s=0".to_string(),
            FilterOp::SpeedChange { speed } => format!("setpts={}*PTS", fmt_num(1.0 / speed)),
            FilterOp::FrameRate { fps } => format!("fps=fps={}", fmt_num(*fps)),
            FilterOp::Trim { start, end } => {
                let mut out = format!("trim=start={}", fmt_num(*start));
                if let Some(end) = end {
                    let _ = write!(out, ":end={}", fmt_num(*end));
                }
                out.push_str(",setpts=PTS-STARTPTS");
                out
            }
            FilterOp::Custom { name, args } => {
                let mut out = name.clone();
                for (i, (key, value)) in args.iter().enumerate() {
                    out.push(if i == 0 { '=' } else { ':' });
                    let _ = write!(out, "{key}={}", render_param(value));
                }
                out
            }
        }
    }
}

fn render_param(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        ParamValue::Number(n) => fmt_num(*n),
        ParamValue::Text(s) => s.clone(),
    }
}

/// Format a number without a trailing `.0` for integral values.
fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn num_or(node: &Node, key: &str, default: f64) -> FlowcutResult<f64> {
    match opt_num(node, key)? {
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

fn opt_num(node: &Node, key: &str) -> FlowcutResult<Option<f64>> {
    let Some(value) = node.data.get(key) else {
        return Ok(None);
    };
    let Some(n) = value.as_number() else {
        return Err(FlowcutError::parameter(&node.id, key, "must be a number"));
    };
    if !n.is_finite() {
        return Err(FlowcutError::parameter(&node.id, key, "must be finite"));
    }
    Ok(Some(n))
}

fn int_or(node: &Node, key: &str, default: i64) -> FlowcutResult<i64> {
    match opt_int(node, key)? {
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

fn opt_int(node: &Node, key: &str) -> FlowcutResult<Option<i64>> {
    match opt_num(node, key)? {
        Some(n) if n.fract() == 0.0 => Ok(Some(n as i64)),
        Some(_) => Err(FlowcutError::parameter(&node.id, key, "must be an integer")),
        None => Ok(None),
    }
}

fn text_or(node: &Node, key: &str, default: &str) -> FlowcutResult<String> {
    let Some(value) = node.data.get(key) else {
        return Ok(default.to_string());
    };
    match value.as_text() {
        Some(s) => Ok(s.to_string()),
        None => Err(FlowcutError::parameter(&node.id, key, "must be a string")),
    }
}

fn check_axis(node: &Node, key: &str, value: i64) -> FlowcutResult<()> {
    if value == -1 || value > 0 {
        Ok(())
    } else {
        Err(FlowcutError::parameter(
            &node.id,
            key,
            "must be > 0, or -1 to preserve aspect",
        ))
    }
}
