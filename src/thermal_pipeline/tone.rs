//! Tone mapping module
//!
//! Turns a raw frame and its display window into an RGB frame: linear stretch (or
//! histogram equalization), gamma, then a named colormap.

pub mod colormap;
pub mod mapper;


pub use colormap::{
    Colormap, DEFAULT_COLORMAP, colormap, colormap_names, is_valid_colormap, resolve_colormap,
};
pub use mapper::{ToneMapper, ToneRequest, apply_gamma, normalize, tone_map};
