//! Mapping of per-vertex scalar data to RGBA vertex colors using named, continuous colormaps.

use std::fmt;
use std::str::FromStr;

use colorgrad::{Color, CustomGradient, Gradient};
use tracing::debug;

use crate::error::{BrainviewError, Result};
use crate::util::{ensure_finite, vec32minmax};

/// The continuous colormaps that can be used for colorizing per-vertex data. The names follow the matplotlib conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColormapKind {
    Viridis,
    Inferno,
    Magma,
    Plasma,
    Cividis,
    Turbo,
    Cool,
    Spectral,
    RdBu,
    Blues,
    Greens,
    Greys,
    Oranges,
    Purples,
    Reds,
    YlOrRd,
}

const COLORMAP_NAMES: [(&str, ColormapKind); 16] = [
    ("viridis", ColormapKind::Viridis),
    ("inferno", ColormapKind::Inferno),
    ("magma", ColormapKind::Magma),
    ("plasma", ColormapKind::Plasma),
    ("cividis", ColormapKind::Cividis),
    ("turbo", ColormapKind::Turbo),
    ("cool", ColormapKind::Cool),
    ("Spectral", ColormapKind::Spectral),
    ("RdBu", ColormapKind::RdBu),
    ("Blues", ColormapKind::Blues),
    ("Greens", ColormapKind::Greens),
    ("Greys", ColormapKind::Greys),
    ("Oranges", ColormapKind::Oranges),
    ("Purples", ColormapKind::Purples),
    ("Reds", ColormapKind::Reds),
    ("YlOrRd", ColormapKind::YlOrRd),
];

/// Names of all supported colormaps. Each may be suffixed with `_r` for the reversed map.
pub fn colormap_names() -> Vec<&'static str> {
    COLORMAP_NAMES.iter().map(|(name, _)| *name).collect()
}


/// A named colormap, optionally reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    pub kind: ColormapKind,
    pub reversed: bool,
}

impl FromStr for Colormap {
    type Err = BrainviewError;

    fn from_str(name: &str) -> Result<Colormap> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        COLORMAP_NAMES
            .iter()
            .find(|(known, _)| *known == base)
            .map(|(_, kind)| Colormap { kind: *kind, reversed })
            .ok_or_else(|| {
                BrainviewError::invalid_argument(format!(
                    "Unknown colormap '{}', must be one of {{{}}}, optionally with suffix '_r'.",
                    name,
                    colormap_names().join(", ")
                ))
            })
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = COLORMAP_NAMES
            .iter()
            .find(|(_, kind)| *kind == self.kind)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        write!(f, "{}{}", name, if self.reversed { "_r" } else { "" })
    }
}

impl Colormap {

    fn gradient(&self) -> Result<Gradient> {
        let grad = match self.kind {
            ColormapKind::Viridis => colorgrad::viridis(),
            ColormapKind::Inferno => colorgrad::inferno(),
            ColormapKind::Magma => colorgrad::magma(),
            ColormapKind::Plasma => colorgrad::plasma(),
            ColormapKind::Cividis => colorgrad::cividis(),
            ColormapKind::Turbo => colorgrad::turbo(),
            // matplotlib's 'cool' is a plain ramp from cyan to magenta.
            ColormapKind::Cool => CustomGradient::new()
                .colors(&[Color::new(0.0, 1.0, 1.0, 1.0), Color::new(1.0, 0.0, 1.0, 1.0)])
                .build()
                .map_err(|e| BrainviewError::invalid_argument(format!("Cannot build colormap 'cool': {}", e)))?,
            ColormapKind::Spectral => colorgrad::spectral(),
            ColormapKind::RdBu => colorgrad::rd_bu(),
            ColormapKind::Blues => colorgrad::blues(),
            ColormapKind::Greens => colorgrad::greens(),
            ColormapKind::Greys => colorgrad::greys(),
            ColormapKind::Oranges => colorgrad::oranges(),
            ColormapKind::Purples => colorgrad::purples(),
            ColormapKind::Reds => colorgrad::reds(),
            ColormapKind::YlOrRd => colorgrad::yl_or_rd(),
        };
        Ok(grad)
    }

    /// Map normalized values in range `[0, 1]` to RGBA colors, 4 `u8` values per input value. Values outside the range are clamped.
    pub fn colors_for_normalized(&self, normalized: &[f64]) -> Result<Vec<u8>> {
        let grad = self.gradient()?;
        let mut colors: Vec<u8> = Vec::with_capacity(normalized.len() * 4);
        for &t in normalized.iter() {
            let t = t.max(0.0).min(1.0);
            let t = if self.reversed { 1.0 - t } else { t };
            colors.extend_from_slice(&grad.at(t).to_rgba8());
        }
        Ok(colors)
    }
}


/// Normalize the data to `[0, 1]` using the given `(vmin, vmax)` range. Values outside the range end up outside of `[0, 1]`.
/// If the range is empty (`vmin == vmax`), all values are mapped to `0`.
pub fn normalize(data: &[f32], vmin: f32, vmax: f32) -> Vec<f64> {
    let span = f64::from(vmax) - f64::from(vmin);
    if span <= 0.0 {
        return vec![0.0; data.len()];
    }
    data.iter().map(|&v| (f64::from(v) - f64::from(vmin)) / span).collect()
}


/// Determine RGBA vertex colors for per-vertex data, normalizing the data with its own min and max values.
///
/// Returns `Ok(None)` if the data or the colormap name is missing: there is nothing to colorize then, which is not an error.
///
/// # Parameters
///
/// * `morph_data`: the per-vertex data, e.g., cortical thickness values. Clipping, if wanted, must happen before.
/// * `colormap_name`: the name of the colormap, see [`colormap_names`].
/// * `colormap_adjust_alpha_to`: if in range `[0, 255]`, all alpha values are set to this value. Negative values keep the
///   alpha value of the colormap, which is 255 (opaque) for all supported maps.
///
/// # Errors
///
/// An InvalidArgument error is returned for unknown colormap names, alpha values above 255 and non-finite data.
///
/// # Examples
///
/// ```
/// let colors = brainview::scalars_to_colors(Some(&[0.5, 0.1, 0.9]), Some("viridis"), 100).unwrap().unwrap();
/// assert_eq!(12, colors.len());
/// assert_eq!(100, colors[3]);
/// ```
pub fn scalars_to_colors(
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
) -> Result<Option<Vec<u8>>> {
    scalars_to_colors_in_range(morph_data, colormap_name, colormap_adjust_alpha_to, None)
}


/// Determine RGBA vertex colors for per-vertex data, see [`scalars_to_colors`].
///
/// If `value_range` is given, it is used for normalizing the data instead of the data's min and max values. This allows
/// for consistent colors across several exports. Values outside of the range get the colors of the range ends.
pub fn scalars_to_colors_in_range(
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
    value_range: Option<(f32, f32)>,
) -> Result<Option<Vec<u8>>> {
    let (data, colormap_name) = match (morph_data, colormap_name) {
        (Some(data), Some(name)) => (data, name),
        _ => return Ok(None),
    };

    let colormap: Colormap = colormap_name.parse()?;
    let alpha = alpha_override(colormap_adjust_alpha_to)?;
    ensure_finite(data, "morphometry data")?;

    let (vmin, vmax) = match value_range {
        Some((vmin, vmax)) => {
            if !(vmin.is_finite() && vmax.is_finite()) || vmin > vmax {
                return Err(BrainviewError::invalid_argument(format!(
                    "Invalid colormap value range ({}, {}), min must not exceed max.",
                    vmin, vmax
                )));
            }
            (vmin, vmax)
        }
        None => vec32minmax(data).unwrap_or((0.0, 0.0)),
    };
    debug!(colormap = %colormap, vmin, vmax, "Mapping {} values to vertex colors.", data.len());

    let mut colors = colormap.colors_for_normalized(&normalize(data, vmin, vmax))?;
    if let Some(alpha) = alpha {
        for rgba in colors.chunks_exact_mut(4) {
            rgba[3] = alpha;
        }
    }
    Ok(Some(colors))
}


/// Interpret an alpha override setting: negative values mean no override.
fn alpha_override(colormap_adjust_alpha_to: i32) -> Result<Option<u8>> {
    if colormap_adjust_alpha_to < 0 {
        Ok(None)
    } else if colormap_adjust_alpha_to > 255 {
        Err(BrainviewError::invalid_argument(format!(
            "Alpha override must be in range [0, 255] or negative to disable it, but is {}.",
            colormap_adjust_alpha_to
        )))
    } else {
        Ok(Some(colormap_adjust_alpha_to as u8))
    }
}
