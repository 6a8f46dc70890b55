//! Configuration for brainview.
//!
//! The configuration is read from the INI file `~/.brainviewrc` if it exists, otherwise internal defaults are used.
//! Options missing from the file keep their default values. The file may contain these sections and options:
//!
//! ```ini
//! [figure]
//! width = 800
//! height = 600
//!
//! [mesh]
//! representation = surface
//! colormap = cool
//!
//! [meshexport]
//! colormap = viridis
//! colormap_adjust_alpha_to = -1
//! clip_data = false
//! clip_lower = 5
//! clip_upper = 95
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use tracing::{info, warn};

use crate::clip::{DEFAULT_CLIP_LOWER, DEFAULT_CLIP_UPPER};
use crate::error::{BrainviewError, Result};

pub const DEFAULT_CONFIG_FILE_NAME: &str = ".brainviewrc";

/// Settings for the figure of the interactive viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> FigureConfig {
        FigureConfig { width: 800, height: 600 }
    }
}


/// How a mesh is drawn in the interactive viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Surface,
    Wireframe,
    Points,
    Mesh,
    Fancymesh,
}

impl FromStr for Representation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Representation, String> {
        match s {
            "surface" => Ok(Representation::Surface),
            "wireframe" => Ok(Representation::Wireframe),
            "points" => Ok(Representation::Points),
            "mesh" => Ok(Representation::Mesh),
            "fancymesh" => Ok(Representation::Fancymesh),
            other => Err(format!(
                "'{}' is not a mesh representation, must be one of {{surface, wireframe, points, mesh, fancymesh}}",
                other
            )),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Representation::Surface => "surface",
            Representation::Wireframe => "wireframe",
            Representation::Points => "points",
            Representation::Mesh => "mesh",
            Representation::Fancymesh => "fancymesh",
        };
        write!(f, "{}", name)
    }
}


/// Settings for the live mesh visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    pub representation: Representation,
    pub colormap: String,
}

impl Default for MeshConfig {
    fn default() -> MeshConfig {
        MeshConfig { representation: Representation::Surface, colormap: String::from("cool") }
    }
}


/// Settings for mesh export with vertex colors.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshExportConfig {
    /// The colormap for vertex colors. `None` disables vertex colors.
    pub colormap: Option<String>,
    /// Alpha value in `[0, 255]` for all vertex colors. Negative values keep the colormap alpha.
    pub colormap_adjust_alpha_to: i32,
    /// Whether to clip the per-vertex data at the `clip_lower` and `clip_upper` percentiles before colorization.
    pub clip_data: bool,
    pub clip_lower: f32,
    pub clip_upper: f32,
}

impl Default for MeshExportConfig {
    fn default() -> MeshExportConfig {
        MeshExportConfig {
            colormap: Some(String::from("viridis")),
            colormap_adjust_alpha_to: -1,
            clip_data: false,
            clip_lower: DEFAULT_CLIP_LOWER,
            clip_upper: DEFAULT_CLIP_UPPER,
        }
    }
}

impl MeshExportConfig {
    /// The `(lower, upper)` clip percentiles, or `None` if clipping is disabled.
    pub fn clip_percentiles(&self) -> Option<(f32, f32)> {
        if self.clip_data {
            Some((self.clip_lower, self.clip_upper))
        } else {
            None
        }
    }
}


/// The complete brainview configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrainviewConfig {
    pub figure: FigureConfig,
    pub mesh: MeshConfig,
    pub meshexport: MeshExportConfig,
}


fn parse_value<T: FromStr>(section: &str, option: &str, value: &str) -> std::result::Result<T, String>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| format!("cannot parse option '{}' in section '{}' from value '{}': {}", option, section, value, e))
}


fn parse_bool(section: &str, option: &str, value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(format!(
            "option '{}' in section '{}' must be a boolean, but is '{}'",
            option, section, value
        )),
    }
}


fn parse_colormap(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(String::from(value))
    }
}


impl BrainviewConfig {

    /// Parse the configuration from INI text. Options that are not given keep their defaults.
    pub fn from_ini_str(contents: &str) -> Result<BrainviewConfig> {
        let source = PathBuf::from("<string>");
        let ini = Ini::load_from_str(contents).map_err(|e| BrainviewError::InvalidConfig(source.clone(), e.to_string()))?;
        BrainviewConfig::from_ini(&ini).map_err(|msg| BrainviewError::InvalidConfig(source, msg))
    }

    /// Read the configuration from an INI file. Options that are not given in the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BrainviewConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BrainviewError::ConfigFileMissing(path.to_path_buf()));
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(err) => BrainviewError::Io(path.to_path_buf(), err),
            ini::Error::Parse(err) => BrainviewError::InvalidConfig(path.to_path_buf(), err.to_string()),
        })?;
        BrainviewConfig::from_ini(&ini).map_err(|msg| BrainviewError::InvalidConfig(path.to_path_buf(), msg))
    }

    fn from_ini(ini: &Ini) -> std::result::Result<BrainviewConfig, String> {
        let mut config = BrainviewConfig::default();

        for (section, properties) in ini.iter() {
            let section = section.unwrap_or("").to_lowercase();
            for (option, value) in properties.iter() {
                let option = option.to_lowercase();
                let known = match (section.as_str(), option.as_str()) {
                    ("figure", "width") => { config.figure.width = parse_value(&section, &option, value)?; true }
                    ("figure", "height") => { config.figure.height = parse_value(&section, &option, value)?; true }
                    ("mesh", "representation") => {
                        config.mesh.representation = parse_value(&section, &option, value)?;
                        true
                    }
                    ("mesh", "colormap") => { config.mesh.colormap = String::from(value.trim()); true }
                    ("meshexport", "colormap") => { config.meshexport.colormap = parse_colormap(value); true }
                    ("meshexport", "colormap_adjust_alpha_to") => {
                        config.meshexport.colormap_adjust_alpha_to = parse_value(&section, &option, value)?;
                        true
                    }
                    ("meshexport", "clip_data") => { config.meshexport.clip_data = parse_bool(&section, &option, value)?; true }
                    ("meshexport", "clip_lower") => { config.meshexport.clip_lower = parse_value(&section, &option, value)?; true }
                    ("meshexport", "clip_upper") => { config.meshexport.clip_upper = parse_value(&section, &option, value)?; true }
                    _ => false,
                };
                if !known {
                    warn!("Ignoring unknown config option '{}' in section '{}'.", option, section);
                }
            }
        }
        Ok(config)
    }
}


/// Return the path to the brainview default config file, `~/.brainviewrc`. This does not imply that the file exists.
pub fn default_config_filename() -> PathBuf {
    let home = env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(DEFAULT_CONFIG_FILE_NAME)
}


/// Return the config parsed from the given INI file.
///
/// # Errors
///
/// A ConfigFileMissing error is returned if the file does not exist. Malformed files lead to an InvalidConfig error.
pub fn get_config_from_file<P: AsRef<Path>>(path: P) -> Result<BrainviewConfig> {
    let config = BrainviewConfig::from_file(&path)?;
    info!("Loaded brainview config from file '{}'.", path.as_ref().display());
    Ok(config)
}


/// Retrieve the brainview configuration.
///
/// Loads the configuration from the default config file if it exists, see [`default_config_filename`]. Otherwise,
/// the internal defaults are used. Also returns the path of the config file that was loaded, or `None` if the
/// defaults were used.
///
/// # Examples
///
/// ```no_run
/// let (cfg, config_file_used) = brainview::get_config().unwrap();
/// println!("Figure width is {}, config file: {:?}", cfg.figure.width, config_file_used);
/// ```
pub fn get_config() -> Result<(BrainviewConfig, Option<PathBuf>)> {
    let config_file = default_config_filename();
    if config_file.is_file() {
        let config = get_config_from_file(&config_file)?;
        Ok((config, Some(config_file)))
    } else {
        Ok((BrainviewConfig::default(), None))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_default_config_has_the_documented_values() {
        let cfg = BrainviewConfig::default();
        assert_eq!(800, cfg.figure.width);
        assert_eq!(600, cfg.figure.height);
        assert_eq!(Representation::Surface, cfg.mesh.representation);
        assert_eq!("cool", cfg.mesh.colormap);
        assert_eq!(Some(String::from("viridis")), cfg.meshexport.colormap);
        assert_eq!(-1, cfg.meshexport.colormap_adjust_alpha_to);
        assert_eq!(None, cfg.meshexport.clip_percentiles());
    }

    #[test]
    fn the_default_config_file_is_in_the_home_dir() {
        let cfg_file = default_config_filename();
        assert!(cfg_file.to_string_lossy().ends_with(".brainviewrc"));
    }

    #[test]
    fn config_values_override_defaults() {
        let cfg = BrainviewConfig::from_ini_str(
            "[figure]\nwidth = 900\nheight = 400\n\n[mesh]\nrepresentation = wireframe\n\n[meshexport]\ncolormap = magma\nclip_data = yes\nclip_lower = 2\nclip_upper = 98.5\n",
        )
        .unwrap();
        assert_eq!(900, cfg.figure.width);
        assert_eq!(400, cfg.figure.height);
        assert_eq!(Representation::Wireframe, cfg.mesh.representation);
        assert_eq!("cool", cfg.mesh.colormap);
        assert_eq!(Some(String::from("magma")), cfg.meshexport.colormap);
        assert_eq!(-1, cfg.meshexport.colormap_adjust_alpha_to);
        assert_eq!(Some((2.0, 98.5)), cfg.meshexport.clip_percentiles());
    }

    #[test]
    fn option_names_are_case_insensitive() {
        let cfg = BrainviewConfig::from_ini_str("[MeshExport]\nColormap_Adjust_Alpha_To = 128\n").unwrap();
        assert_eq!(128, cfg.meshexport.colormap_adjust_alpha_to);
    }

    #[test]
    fn an_empty_export_colormap_disables_colors() {
        let cfg = BrainviewConfig::from_ini_str("[meshexport]\ncolormap = none\n").unwrap();
        assert_eq!(None, cfg.meshexport.colormap);
    }

    #[test]
    fn unknown_options_are_ignored() {
        let cfg = BrainviewConfig::from_ini_str("[figure]\nwidht = 1000\n[nosuchsection]\nfoo = bar\n").unwrap();
        assert_eq!(BrainviewConfig::default(), cfg);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = BrainviewConfig::from_ini_str("[figure]\nwidth = wide\n").unwrap_err();
        assert!(matches!(err, BrainviewError::InvalidConfig(_, _)));
        assert!(err.to_string().contains("width"));

        assert!(BrainviewConfig::from_ini_str("[meshexport]\nclip_data = maybe\n").is_err());
        assert!(BrainviewConfig::from_ini_str("[mesh]\nrepresentation = cubes\n").is_err());
    }

    #[test]
    fn a_missing_config_file_is_reported_with_its_path() {
        let err = get_config_from_file("/no/such/dir/brainviewrc_not_there").unwrap_err();
        assert!(matches!(err, BrainviewError::ConfigFileMissing(_)));
        assert!(err.to_string().contains("not_there"));
    }

    #[test]
    fn a_config_file_can_be_read() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_file = dir.path().join("brainviewrc");
        std::fs::write(&cfg_file, "[figure]\nwidth = 900\nheight = 400\n").unwrap();

        let cfg = get_config_from_file(&cfg_file).unwrap();
        assert_eq!(900, cfg.figure.width);
        assert_eq!(400, cfg.figure.height);
    }
}
