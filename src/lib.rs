//! Export of brain surface meshes with per-vertex morphometry data.
//!
//! The focus of this package is on getting surface-based MRI data, as produced by FreeSurfer, into standard
//! 3D software: per-vertex values are optionally clipped at percentiles, mapped to vertex colors with a
//! colormap, and written together with the mesh to OBJ or PLY files.

pub mod clip;
pub mod colormap;
pub mod config;
pub mod error;
pub mod export;
pub mod mesh;
pub mod util;

pub use clip::{clip_data, clip_data_at_percentiles, percentile};
pub use colormap::{colormap_names, scalars_to_colors, scalars_to_colors_in_range, Colormap, ColormapKind};
pub use config::{
    default_config_filename, get_config, get_config_from_file, BrainviewConfig, FigureConfig, MeshConfig,
    MeshExportConfig, Representation,
};
pub use error::{BrainviewError, Result};
pub use export::{
    export_mesh, export_mesh_to_file, mesh_export_format_from_filename, mesh_export_string, ExportFormat,
    ExportRequest,
};
pub use mesh::BrainMesh;
