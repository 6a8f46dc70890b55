//! Export of brain meshes to mesh files, e.g., for loading them into standard 3D modeling software like Blender or MeshLab.
//!
//! The export format is determined from the file extension. Per-vertex data can be clipped at percentiles and is
//! mapped to vertex colors through a colormap. Only the PLY format stores vertex colors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::clip::clip_data_at_percentiles;
use crate::colormap::scalars_to_colors_in_range;
use crate::config::MeshExportConfig;
use crate::error::{BrainviewError, Result};
use crate::mesh::BrainMesh;
use crate::util::has_suffix;

/// The supported mesh export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Wavefront Object, without vertex colors.
    Obj,
    /// ASCII Stanford PLY, with optional RGBA vertex colors.
    Ply,
}

impl FromStr for ExportFormat {
    type Err = BrainviewError;

    fn from_str(export_format: &str) -> Result<ExportFormat> {
        match export_format {
            "obj" => Ok(ExportFormat::Obj),
            "ply" => Ok(ExportFormat::Ply),
            other => Err(BrainviewError::invalid_argument(format!(
                "export_format must be one of {{obj, ply}} but is '{}'.",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportFormat::Obj => write!(f, "obj"),
            ExportFormat::Ply => write!(f, "ply"),
        }
    }
}


/// Determine a mesh export format based on a file name. This inspects the file extension only.
///
/// Returns the format and whether the file name ended with a known extension. If it did not, the default format
/// OBJ is returned and `matched` is `false`. This is not an error.
///
/// # Examples
///
/// ```
/// use brainview::{mesh_export_format_from_filename, ExportFormat};
/// assert_eq!((ExportFormat::Ply, true), mesh_export_format_from_filename("/home/me/export/brain.ply"));
/// assert_eq!((ExportFormat::Obj, false), mesh_export_format_from_filename("brain.txt"));
/// ```
pub fn mesh_export_format_from_filename<P: AsRef<Path>>(filename: P) -> (ExportFormat, bool) {
    if has_suffix(&filename, ".ply") {
        (ExportFormat::Ply, true)
    } else if has_suffix(&filename, ".obj") {
        (ExportFormat::Obj, true)
    } else {
        (ExportFormat::Obj, false)
    }
}


fn colors_for_export(
    mesh: &BrainMesh,
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
    value_range: Option<(f32, f32)>,
) -> Result<Option<Vec<u8>>> {
    if let (Some(data), Some(_)) = (morph_data, colormap_name) {
        if data.len() != mesh.num_vertices() {
            return Err(BrainviewError::invalid_argument(format!(
                "Per-vertex data has {} values, but the mesh has {} vertices.",
                data.len(),
                mesh.num_vertices()
            )));
        }
    }
    scalars_to_colors_in_range(morph_data, colormap_name, colormap_adjust_alpha_to, value_range)
}


fn export_string(
    export_format: ExportFormat,
    mesh: &BrainMesh,
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
    value_range: Option<(f32, f32)>,
) -> Result<String> {
    mesh.validate()?;
    match export_format {
        ExportFormat::Obj => Ok(mesh.to_obj()),
        ExportFormat::Ply => {
            let vertex_colors = colors_for_export(mesh, morph_data, colormap_name, colormap_adjust_alpha_to, value_range)?;
            mesh.to_ply(vertex_colors.as_deref())
        }
    }
}


/// Get the text representation of the mesh in the given export format.
///
/// The `export_format` must be one of `"obj"` or `"ply"`. For PLY, vertex colors are computed from the
/// per-vertex data and colormap if both are given, see [`crate::scalars_to_colors`].
///
/// # Errors
///
/// An InvalidArgument error is returned for an unsupported format, an invalid mesh, or invalid colorization arguments.
pub fn mesh_export_string(
    export_format: &str,
    mesh: &BrainMesh,
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
) -> Result<String> {
    let export_format: ExportFormat = export_format.parse()?;
    export_string(export_format, mesh, morph_data, colormap_name, colormap_adjust_alpha_to, None)
}


fn write_export_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| BrainviewError::Io(path.to_path_buf(), e))?;
    info!("Exported brain mesh to file '{}'.", path.display());
    Ok(())
}


/// Export a brain mesh to a file, the format is determined from the file extension (see [`mesh_export_format_from_filename`]).
///
/// An existing file is overwritten. All arguments are checked before the file is opened. If writing fails midway, an
/// empty or incomplete file may remain.
///
/// # Parameters
///
/// * `filename`: the output file. Its parent directory must exist.
/// * `mesh`: the brain mesh.
/// * `morph_data`: optional per-vertex data, used for vertex colors in PLY exports.
/// * `colormap_name`: optional colormap name. If `None`, no vertex colors are written.
/// * `colormap_adjust_alpha_to`: alpha value in `[0, 255]` for all vertex colors, negative values keep the colormap alpha.
///
/// # Examples
///
/// ```no_run
/// let mesh = brainview::BrainMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]).unwrap();
/// let thickness: [f32; 3] = [2.5, 3.1, 1.9];
/// brainview::export_mesh("/tmp/brain.ply", &mesh, Some(&thickness), Some("viridis"), -1).unwrap();
/// ```
pub fn export_mesh<P: AsRef<Path>>(
    filename: P,
    mesh: &BrainMesh,
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
) -> Result<()> {
    export_mesh_to_file(filename, mesh, morph_data, colormap_name, colormap_adjust_alpha_to, None)
}


/// Export a brain mesh to a file like [`export_mesh`], clipping the per-vertex data at the given `(lower, upper)`
/// percentiles first if `clip_data_perc` is given.
pub fn export_mesh_to_file<P: AsRef<Path>>(
    filename: P,
    mesh: &BrainMesh,
    morph_data: Option<&[f32]>,
    colormap_name: Option<&str>,
    colormap_adjust_alpha_to: i32,
    clip_data_perc: Option<(f32, f32)>,
) -> Result<()> {
    let mut request = ExportRequest::new(filename.as_ref(), mesh).alpha(colormap_adjust_alpha_to);
    request.morph_data = morph_data;
    request.colormap_name = colormap_name.map(String::from);
    request.clip_data_perc = clip_data_perc;
    request.export()
}


/// All settings for a single mesh export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest<'a> {
    pub filename: PathBuf,
    pub mesh: &'a BrainMesh,
    pub morph_data: Option<&'a [f32]>,
    pub colormap_name: Option<String>,
    pub colormap_adjust_alpha_to: i32,
    pub clip_data_perc: Option<(f32, f32)>,
    pub value_range: Option<(f32, f32)>,
}

impl<'a> ExportRequest<'a> {

    /// A request exporting the bare mesh. Colorization with the 'viridis' colormap happens once per-vertex data is set.
    pub fn new<P: AsRef<Path>>(filename: P, mesh: &'a BrainMesh) -> ExportRequest<'a> {
        ExportRequest {
            filename: filename.as_ref().to_path_buf(),
            mesh,
            morph_data: None,
            colormap_name: Some(String::from("viridis")),
            colormap_adjust_alpha_to: -1,
            clip_data_perc: None,
            value_range: None,
        }
    }

    /// A request using the colormap, alpha and clipping settings of the given export configuration.
    pub fn from_config<P: AsRef<Path>>(filename: P, mesh: &'a BrainMesh, config: &MeshExportConfig) -> ExportRequest<'a> {
        ExportRequest {
            colormap_name: config.colormap.clone(),
            colormap_adjust_alpha_to: config.colormap_adjust_alpha_to,
            clip_data_perc: config.clip_percentiles(),
            ..ExportRequest::new(filename, mesh)
        }
    }

    pub fn morph_data(mut self, morph_data: &'a [f32]) -> Self {
        self.morph_data = Some(morph_data);
        self
    }

    pub fn colormap(mut self, colormap_name: &str) -> Self {
        self.colormap_name = Some(String::from(colormap_name));
        self
    }

    pub fn no_colormap(mut self) -> Self {
        self.colormap_name = None;
        self
    }

    pub fn alpha(mut self, colormap_adjust_alpha_to: i32) -> Self {
        self.colormap_adjust_alpha_to = colormap_adjust_alpha_to;
        self
    }

    pub fn clip_percentiles(mut self, lower: f32, upper: f32) -> Self {
        self.clip_data_perc = Some((lower, upper));
        self
    }

    /// Use a fixed `(vmin, vmax)` range for mapping data to colors, instead of the min and max of the (clipped) data.
    pub fn value_range(mut self, vmin: f32, vmax: f32) -> Self {
        self.value_range = Some((vmin, vmax));
        self
    }

    /// The export format resolved from the file name, see [`mesh_export_format_from_filename`].
    pub fn format(&self) -> (ExportFormat, bool) {
        mesh_export_format_from_filename(&self.filename)
    }

    /// Get the text representation of the mesh for this request, without writing it.
    pub fn to_export_string(&self) -> Result<String> {
        let (export_format, matched) = self.format();
        if matched {
            debug!("Exporting mesh in {} format based on file name '{}'.", export_format, self.filename.display());
        } else {
            debug!(
                "File name '{}' has no known mesh extension, using default format {}.",
                self.filename.display(),
                export_format
            );
        }

        let clipped: Option<Vec<f32>> = match (self.morph_data, self.clip_data_perc) {
            (Some(data), Some((lower, upper))) => Some(clip_data_at_percentiles(data, lower, upper)?),
            _ => None,
        };
        let morph_data = clipped.as_deref().or(self.morph_data);

        export_string(
            export_format,
            self.mesh,
            morph_data,
            self.colormap_name.as_deref(),
            self.colormap_adjust_alpha_to,
            self.value_range,
        )
    }

    /// Write the mesh file for this request, replacing any existing file.
    pub fn export(&self) -> Result<()> {
        let export_repr = self.to_export_string()?;
        write_export_file(&self.filename, &export_repr)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn triangle() -> BrainMesh {
        BrainMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]).unwrap()
    }

    #[test]
    fn export_formats_are_resolved_from_the_file_extension() {
        assert_eq!((ExportFormat::Ply, true), mesh_export_format_from_filename("brain.ply"));
        assert_eq!((ExportFormat::Obj, true), mesh_export_format_from_filename("brain.obj"));
        assert_eq!((ExportFormat::Obj, true), mesh_export_format_from_filename("/tmp/file.obj"));
        assert_eq!((ExportFormat::Obj, false), mesh_export_format_from_filename("/a/b/brain.txt"));
        assert_eq!((ExportFormat::Obj, false), mesh_export_format_from_filename("brain"));
        assert_eq!((ExportFormat::Obj, false), mesh_export_format_from_filename("brain.PLY"));
    }

    #[test]
    fn export_format_strings_can_be_parsed() {
        assert_eq!(ExportFormat::Obj, "obj".parse().unwrap());
        assert_eq!(ExportFormat::Ply, "ply".parse().unwrap());
        assert_eq!("ply", ExportFormat::Ply.to_string());
    }

    #[test]
    fn an_unsupported_export_format_string_is_rejected() {
        let err = mesh_export_string("stl", &triangle(), None, None, -1).unwrap_err();
        assert!(matches!(err, BrainviewError::InvalidArgument(_)));
        let msg = err.to_string();
        assert!(msg.contains("'stl'"));
        assert!(msg.contains("{obj, ply}"));
    }

    #[test]
    fn obj_export_strings_ignore_colors() {
        let data: [f32; 3] = [0.5, 0.1, 0.9];
        let obj_repr = mesh_export_string("obj", &triangle(), Some(&data), Some("viridis"), -1).unwrap();
        assert_eq!(3, obj_repr.lines().filter(|l| l.starts_with("v ")).count());
        assert_eq!(1, obj_repr.lines().filter(|l| l.starts_with("f ")).count());
    }

    #[test]
    fn ply_export_strings_have_colors_only_with_data_and_colormap() {
        let data: [f32; 3] = [0.5, 0.1, 0.9];
        let with_colors = mesh_export_string("ply", &triangle(), Some(&data), Some("viridis"), -1).unwrap();
        assert!(with_colors.contains("property uchar red"));

        let without_colormap = mesh_export_string("ply", &triangle(), Some(&data), None, -1).unwrap();
        assert!(!without_colormap.contains("property uchar red"));

        let without_data = mesh_export_string("ply", &triangle(), None, Some("viridis"), -1).unwrap();
        assert!(!without_data.contains("property uchar red"));
    }

    #[test]
    fn data_must_match_the_vertex_count() {
        let res = mesh_export_string("ply", &triangle(), Some(&[1.0, 2.0]), Some("viridis"), -1);
        assert!(matches!(res, Err(BrainviewError::InvalidArgument(_))));
    }

    #[test]
    fn export_requests_can_be_built_from_config() {
        let mesh = triangle();
        let mut config = MeshExportConfig::default();
        config.colormap = Some(String::from("magma"));
        config.colormap_adjust_alpha_to = 50;
        config.clip_data = true;

        let request = ExportRequest::from_config("brain.ply", &mesh, &config);
        assert_eq!(Some(String::from("magma")), request.colormap_name);
        assert_eq!(50, request.colormap_adjust_alpha_to);
        assert_eq!(Some((5.0, 95.0)), request.clip_data_perc);
        assert_eq!((ExportFormat::Ply, true), request.format());
    }

    #[test]
    fn clipping_happens_before_colorization() {
        let mesh = BrainMesh::new(vec![0.0; 15], vec![0, 1, 2, 2, 3, 4]).unwrap();
        let data: [f32; 5] = [1.0, 2.0, 3.0, 4.0, 1000.0];
        let request = ExportRequest::new("brain.ply", &mesh).morph_data(&data).clip_percentiles(0.0, 75.0);
        let clipped_repr = request.to_export_string().unwrap();
        let raw_repr = ExportRequest::new("brain.ply", &mesh).morph_data(&data).to_export_string().unwrap();

        let vertex_rows = |repr: &str| -> Vec<String> {
            repr.lines().skip_while(|l| *l != "end_header").skip(1).take(5).map(String::from).collect()
        };
        // with the outlier clipped to 4.0, the last two vertices share the top color
        let clipped_rows = vertex_rows(&clipped_repr);
        assert_eq!(clipped_rows[3], clipped_rows[4]);
        let raw_rows = vertex_rows(&raw_repr);
        assert_ne!(raw_rows[3], raw_rows[4]);
    }
}
