//! Static operation catalog.
//!
//! Pure data describing every operation type the resolver accepts, used to
//! drive authoring UIs. Listing the catalog never touches compilation.

use serde_json::json;

/// UI-facing description of one catalog operation.
#[derive(Clone, Debug, serde::Serialize)]
pub struct OperationDescriptor {
    /// Type tag as it appears in `Node::name`.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    pub params: Vec<ParamDescriptor>,
}

/// UI-facing description of one operation parameter.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: ParamKind,
    /// Resolver default. `None` means the default is derived from the source
    /// (crop w/h) or the parameter is genuinely optional (trim end).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Widget hint for a parameter.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    Range { min: f64, max: f64, step: f64 },
    Select { options: &'static [&'static str] },
}

fn number(name: &'static str, label: &'static str, default: serde_json::Value) -> ParamDescriptor {
    ParamDescriptor {
        name,
        label,
        kind: ParamKind::Number,
        default: Some(default),
    }
}

fn range(
    name: &'static str,
    label: &'static str,
    (min, max, step): (f64, f64, f64),
    default: serde_json::Value,
) -> ParamDescriptor {
    ParamDescriptor {
        name,
        label,
        kind: ParamKind::Range { min, max, step },
        default: Some(default),
    }
}

/// The full operation catalog, in resolver order.
///
/// Defaults here are the resolver defaults, not UI suggestions: `scale` axes
/// default to -1 (preserve aspect), `crop` w/h inherit the source dimensions.
pub fn operation_catalog() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor {
            name: "scale",
            label: "Resize",
            params: vec![
                number("width", "Width", json!(-1)),
                number("height", "Height", json!(-1)),
            ],
        },
        OperationDescriptor {
            name: "crop",
            label: "Crop",
            params: vec![
                ParamDescriptor {
                    name: "w",
                    label: "Width",
                    kind: ParamKind::Number,
                    default: None,
                },
                ParamDescriptor {
                    name: "h",
                    label: "Height",
                    kind: ParamKind::Number,
                    default: None,
                },
                number("x", "Position X", json!(0)),
                number("y", "Position Y", json!(0)),
            ],
        },
        OperationDescriptor {
            name: "rotate",
            label: "Rotate",
            params: vec![number("angle", "Angle (degrees)", json!(0))],
        },
        OperationDescriptor {
            name: "hflip",
            label: "Horizontal mirror",
            params: vec![],
        },
        OperationDescriptor {
            name: "vflip",
            label: "Vertical mirror",
            params: vec![],
        },
        OperationDescriptor {
            name: "brightness",
            label: "Brightness",
            params: vec![range(
                "brightness",
                "Brightness",
                (-1.0, 1.0, 0.1),
                json!(0.0),
            )],
        },
        OperationDescriptor {
            name: "contrast",
            label: "Contrast",
            params: vec![range("contrast", "Contrast", (0.0, 3.0, 0.1), json!(1.0))],
        },
        OperationDescriptor {
            name: "saturation",
            label: "Saturation",
            params: vec![range(
                "saturation",
                "Saturation",
                (0.0, 3.0, 0.1),
                json!(1.0),
            )],
        },
        OperationDescriptor {
            name: "blur",
            label: "Gaussian blur",
            params: vec![range("sigma", "Strength", (0.0, 10.0, 0.5), json!(1.0))],
        },
        OperationDescriptor {
            name: "sharpen",
            label: "Sharpen",
            params: vec![range("amount", "Strength", (0.0, 5.0, 0.1), json!(1.0))],
        },
        OperationDescriptor {
            name: "fade",
            label: "Fade",
            params: vec![
                ParamDescriptor {
                    name: "type",
                    label: "Direction",
                    kind: ParamKind::Select {
                        options: &["in", "out"],
                    },
                    default: Some(json!("in")),
                },
                number("duration", "Duration (s)", json!(1)),
            ],
        },
        OperationDescriptor {
            name: "grayscale",
            label: "Grayscale",
            params: vec![],
        },
        OperationDescriptor {
            name: "speed",
            label: "Speed",
            params: vec![range("speed", "Speed", (0.25, 4.0, 0.25), json!(1.0))],
        },
        OperationDescriptor {
            name: "fps",
            label: "Frame rate",
            params: vec![number("fps", "Frames per second", json!(30))],
        },
        OperationDescriptor {
            name: "trim",
            label: "Trim",
            params: vec![
                number("start", "Start (s)", json!(0)),
                ParamDescriptor {
                    name: "end",
                    label: "End (s)",
                    kind: ParamKind::Number,
                    default: None,
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_all_operation_types() {
        let names: Vec<&str> = operation_catalog().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "scale",
                "crop",
                "rotate",
                "hflip",
                "vflip",
                "brightness",
                "contrast",
                "saturation",
                "blur",
                "sharpen",
                "fade",
                "grayscale",
                "speed",
                "fps",
                "trim",
            ]
        );
    }

    #[test]
    fn resolver_defaults_are_exposed() {
        let catalog = operation_catalog();
        let scale = catalog.iter().find(|d| d.name == "scale").unwrap();
        assert_eq!(scale.params[0].default, Some(json!(-1)));
        assert_eq!(scale.params[1].default, Some(json!(-1)));

        let trim = catalog.iter().find(|d| d.name == "trim").unwrap();
        assert_eq!(trim.params[1].name, "end");
        assert!(trim.params[1].default.is_none());
    }

    #[test]
    fn catalog_serializes_to_json() {
        let s = serde_json::to_string(&operation_catalog()).unwrap();
        assert!(s.contains(r#""name":"fade""#));
        assert!(s.contains(r#""options":["in","out"]"#));
    }
}
