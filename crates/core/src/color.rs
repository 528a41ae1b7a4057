//! Deterministic fill-color assignment for frame rectangles.
//!
//! Colors are a pure function of the frame name (or depth), so the same
//! function is recognizable across branches and re-rendering identical
//! input reproduces identical bytes. Hashing is a fixed
//! multiply-accumulate over the name's bytes, never a randomized hasher.

use flamefold_protocol::{FrameKind, FrameRect};

use crate::model::ROOT_NAME;
use crate::options::ColorMode;

/// Pick the fill for one rectangle as a `rgb(r,g,b)` string.
pub fn fill_for(rect: &FrameRect, mode: ColorMode) -> String {
    let (r, g, b) = if rect.depth == 0 && rect.name == ROOT_NAME {
        // Synthetic root: neutral, never part of any palette family.
        (176, 176, 176)
    } else {
        match mode {
            ColorMode::ByFunction => by_function(rect),
            ColorMode::ByDepth => by_depth(rect.depth),
            ColorMode::ByPackage => by_package(rect),
        }
    };
    format!("rgb({r},{g},{b})")
}

/// Warm red-to-yellow ramp seeded by the display name, with annotation
/// kinds pulled into their conventional hue families: kernel frames
/// orange, jit green, inlined aqua.
fn by_function(rect: &FrameRect) -> (u8, u8, u8) {
    let h = hash_name(rect.name.display());
    let v1 = (h & 0xff) as f64 / 255.0;
    let v2 = ((h >> 8) & 0xff) as f64 / 255.0;
    match rect.name.kind() {
        FrameKind::User => (
            205 + (50.0 * v2) as u8,
            (230.0 * v1) as u8,
            (55.0 * v2) as u8,
        ),
        FrameKind::Kernel => (
            190 + (65.0 * v2) as u8,
            90 + (65.0 * v1) as u8,
            (30.0 * v2) as u8,
        ),
        FrameKind::Jit => (
            (55.0 * v2) as u8,
            180 + (70.0 * v1) as u8,
            (55.0 * v2) as u8,
        ),
        FrameKind::Inlined => (
            (55.0 * v2) as u8,
            160 + (55.0 * v1) as u8,
            160 + (55.0 * v2) as u8,
        ),
    }
}

/// Hue cycles with the row so neighboring depths contrast.
fn by_depth(depth: u32) -> (u8, u8, u8) {
    match depth % 4 {
        0 => hsl_to_rgb(4.0, 0.72, 0.52),
        1 => hsl_to_rgb(24.0, 0.80, 0.55),
        2 => hsl_to_rgb(44.0, 0.82, 0.52),
        _ => hsl_to_rgb(14.0, 0.62, 0.48),
    }
}

/// One hue family per leading path component, full spectrum.
fn by_package(rect: &FrameRect) -> (u8, u8, u8) {
    let h = hash_name(rect.name.package());
    let jitter = hash_name(rect.name.display());
    let hue = (h % 360) as f64;
    let saturation = 0.60 + ((jitter >> 8) % 20) as f64 / 100.0;
    let lightness = 0.42 + ((jitter >> 16) % 14) as f64 / 100.0;
    hsl_to_rgb(hue, saturation, lightness)
}

/// Fixed multiply-accumulate hash; stable across runs and platforms.
fn hash_name(name: &str) -> u32 {
    name.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h as u32) / 60 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
