//! Colormap registry.
//!
//! Every map is stored as a 256 entry RGB table sampled from piecewise-linear
//! channel curves. Lookup follows the usual convention of `floor(x * 256)` clamped
//! to the last entry.

use std::sync::OnceLock;

use crate::thermal_pipeline::common::error::{PipelineError, Result};

/// Number of entries in each lookup table.
pub const LUT_SIZE: usize = 256;

/// Suffix that selects the mirrored variant of a registered map, e.g. `jet_r`.
pub const REVERSED_SUFFIX: &str = "_r";

/// Name used when a requested map is unknown and a fallback is wanted.
pub const DEFAULT_COLORMAP: &str = "gray";

type Curve = &'static [(f32, f32)];

enum Definition {
    /// Independent curve per channel, knots as `(x, value)`.
    Channels { red: Curve, green: Curve, blue: Curve },
    /// Evenly described anchors as `(x, rgb)`.
    Anchors(&'static [(f32, [u8; 3])]),
}

struct Entry {
    name: &'static str,
    definition: Definition,
}

const LINEAR: Curve = &[(0.0, 0.0), (1.0, 1.0)];
const ONE: Curve = &[(0.0, 1.0), (1.0, 1.0)];
const INVERSE: Curve = &[(0.0, 1.0), (1.0, 0.0)];

const ENTRIES: &[Entry] = &[
    Entry {
        name: "gray",
        definition: Definition::Channels {
            red: LINEAR,
            green: LINEAR,
            blue: LINEAR,
        },
    },
    Entry {
        name: "jet",
        definition: Definition::Channels {
            red: &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
            green: &[
                (0.0, 0.0),
                (0.125, 0.0),
                (0.375, 1.0),
                (0.64, 1.0),
                (0.91, 0.0),
                (1.0, 0.0),
            ],
            blue: &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
        },
    },
    Entry {
        name: "hsv",
        definition: Definition::Channels {
            red: &[
                (0.0, 1.0),
                (0.158730, 1.0),
                (0.174603, 0.96875),
                (0.333333, 0.03125),
                (0.349206, 0.0),
                (0.666667, 0.0),
                (0.682540, 0.03125),
                (0.841270, 0.96875),
                (0.857143, 1.0),
                (1.0, 1.0),
            ],
            green: &[
                (0.0, 0.0),
                (0.158730, 0.9375),
                (0.174603, 1.0),
                (0.507937, 1.0),
                (0.666667, 0.0625),
                (0.682540, 0.0),
                (1.0, 0.0),
            ],
            blue: &[
                (0.0, 0.0),
                (0.333333, 0.0),
                (0.349206, 0.0625),
                (0.507937, 1.0),
                (0.841270, 1.0),
                (0.857143, 0.9375),
                (1.0, 0.09375),
            ],
        },
    },
    Entry {
        name: "gnuplot2",
        definition: Definition::Channels {
            red: &[(0.0, 0.0), (0.25, 0.0), (0.57, 1.0), (1.0, 1.0)],
            green: &[(0.0, 0.0), (0.42, 0.0), (0.92, 1.0), (1.0, 1.0)],
            blue: &[(0.0, 0.0), (0.25, 1.0), (0.42, 1.0), (0.92, 0.0), (1.0, 1.0)],
        },
    },
    Entry {
        name: "hot",
        definition: Definition::Channels {
            red: &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
            green: &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
            blue: &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
        },
    },
    Entry {
        name: "bone",
        definition: Definition::Channels {
            red: &[(0.0, 0.0), (0.746032, 0.652778), (1.0, 1.0)],
            green: &[(0.0, 0.0), (0.365079, 0.319444), (0.746032, 0.777778), (1.0, 1.0)],
            blue: &[(0.0, 0.0), (0.365079, 0.444444), (1.0, 1.0)],
        },
    },
    Entry {
        name: "cool",
        definition: Definition::Channels {
            red: LINEAR,
            green: INVERSE,
            blue: ONE,
        },
    },
    Entry {
        name: "viridis",
        definition: Definition::Anchors(&[
            (0.0, [0x44, 0x01, 0x54]),
            (0.125, [0x47, 0x2d, 0x7b]),
            (0.25, [0x3b, 0x52, 0x8b]),
            (0.375, [0x2c, 0x72, 0x8e]),
            (0.5, [0x21, 0x91, 0x8c]),
            (0.625, [0x28, 0xae, 0x80]),
            (0.75, [0x5e, 0xc9, 0x62]),
            (0.875, [0xad, 0xdc, 0x30]),
            (1.0, [0xfd, 0xe7, 0x25]),
        ]),
    },
    Entry {
        name: "inferno",
        definition: Definition::Anchors(&[
            (0.0, [0x00, 0x00, 0x04]),
            (0.125, [0x1b, 0x0c, 0x41]),
            (0.25, [0x4a, 0x0c, 0x6b]),
            (0.375, [0x78, 0x1c, 0x6d]),
            (0.5, [0xa5, 0x2c, 0x60]),
            (0.625, [0xcf, 0x44, 0x46]),
            (0.75, [0xed, 0x69, 0x25]),
            (0.875, [0xfb, 0x9b, 0x06]),
            (0.9375, [0xf7, 0xd1, 0x3d]),
            (1.0, [0xfc, 0xff, 0xa4]),
        ]),
    },
    Entry {
        name: "magma",
        definition: Definition::Anchors(&[
            (0.0, [0x00, 0x00, 0x04]),
            (0.125, [0x1c, 0x10, 0x44]),
            (0.25, [0x4f, 0x12, 0x7b]),
            (0.375, [0x81, 0x25, 0x81]),
            (0.5, [0xb5, 0x36, 0x7a]),
            (0.625, [0xe5, 0x50, 0x64]),
            (0.75, [0xfb, 0x87, 0x61]),
            (0.875, [0xfe, 0xc2, 0x87]),
            (1.0, [0xfc, 0xfd, 0xbf]),
        ]),
    },
    Entry {
        name: "plasma",
        definition: Definition::Anchors(&[
            (0.0, [0x0d, 0x08, 0x87]),
            (0.125, [0x41, 0x04, 0x9d]),
            (0.25, [0x6a, 0x00, 0xa8]),
            (0.375, [0x8f, 0x0d, 0xa4]),
            (0.5, [0xb1, 0x2a, 0x90]),
            (0.625, [0xcc, 0x47, 0x78]),
            (0.75, [0xe1, 0x64, 0x62]),
            (0.875, [0xf2, 0x84, 0x4b]),
            (1.0, [0xf0, 0xf9, 0x21]),
        ]),
    },
    // Thermography palette: black through violet and red to white.
    Entry {
        name: "ironbow",
        definition: Definition::Anchors(&[
            (0.0, [0x00, 0x00, 0x00]),
            (0.15, [0x21, 0x00, 0x8c]),
            (0.35, [0x8c, 0x00, 0x99]),
            (0.55, [0xd9, 0x33, 0x26]),
            (0.75, [0xfa, 0x8c, 0x00]),
            (0.9, [0xff, 0xd9, 0x1a]),
            (1.0, [0xff, 0xff, 0xff]),
        ]),
    },
];

/// A named scalar-to-RGB lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colormap {
    name: &'static str,
    lut: Vec<[u8; 3]>,
}

impl Colormap {
    fn build(entry: &Entry) -> Self {
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let x = i as f32 / (LUT_SIZE - 1) as f32;
                match &entry.definition {
                    Definition::Channels { red, green, blue } => [
                        to_byte(interpolate(red, x)),
                        to_byte(interpolate(green, x)),
                        to_byte(interpolate(blue, x)),
                    ],
                    Definition::Anchors(anchors) => interpolate_anchors(anchors, x),
                }
            })
            .collect();
        Self {
            name: entry.name,
            lut,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Colour for a normalized value; input outside `[0, 1]` is clamped.
    pub fn lookup(&self, x: f32) -> [u8; 3] {
        self.lut[lut_index(x)]
    }

    /// Colour for a normalized value with the domain mirrored.
    pub fn lookup_reversed(&self, x: f32) -> [u8; 3] {
        self.lookup(1.0 - x)
    }

    pub fn entries(&self) -> &[[u8; 3]] {
        &self.lut
    }
}

fn lut_index(x: f32) -> usize {
    if x.is_nan() || x <= 0.0 {
        return 0;
    }
    ((x * LUT_SIZE as f32) as usize).min(LUT_SIZE - 1)
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

fn interpolate(curve: Curve, x: f32) -> f32 {
    let upper = curve.partition_point(|&(k, _)| k < x);
    if upper == 0 {
        return curve[0].1;
    }
    if upper == curve.len() {
        return curve[curve.len() - 1].1;
    }
    let (x0, y0) = curve[upper - 1];
    let (x1, y1) = curve[upper];
    if x1 <= x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn interpolate_anchors(anchors: &[(f32, [u8; 3])], x: f32) -> [u8; 3] {
    let upper = anchors.partition_point(|&(k, _)| k < x);
    if upper == 0 {
        return anchors[0].1;
    }
    if upper == anchors.len() {
        return anchors[anchors.len() - 1].1;
    }
    let (x0, c0) = anchors[upper - 1];
    let (x1, c1) = anchors[upper];
    let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 1.0 };
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])]
}

fn registry() -> &'static [Colormap] {
    static REGISTRY: OnceLock<Vec<Colormap>> = OnceLock::new();
    REGISTRY.get_or_init(|| ENTRIES.iter().map(Colormap::build).collect())
}

/// Names of every registered map, without reversed variants.
pub fn colormap_names() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|e| e.name)
}

/// Looks up a registered map by exact name.
pub fn colormap(name: &str) -> Result<&'static Colormap> {
    registry()
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| PipelineError::InvalidColormap(name.to_string()))
}

/// Resolves a name that may carry the reversed suffix.
///
/// Returns the map and whether the name asked for the mirrored variant.
pub fn resolve_colormap(name: &str) -> Result<(&'static Colormap, bool)> {
    if let Ok(map) = colormap(name) {
        return Ok((map, false));
    }
    match name.strip_suffix(REVERSED_SUFFIX) {
        Some(base) => colormap(base)
            .map(|map| (map, true))
            .map_err(|_| PipelineError::InvalidColormap(name.to_string())),
        None => Err(PipelineError::InvalidColormap(name.to_string())),
    }
}

pub fn is_valid_colormap(name: &str) -> bool {
    resolve_colormap(name).is_ok()
}
