//! Triangular brain surface meshes and their text representations.
//!
//! A mesh is stored in flat buffers, the way FreeSurfer surface readers return it: each vertex is
//! defined by its x,y,z coords and each face is defined by 3 vertices, stored as 3 indices into the vertices.

use std::fmt;

use crate::error::{BrainviewError, Result};

/// Comment line content written into the header of all exported mesh files.
pub fn generator_comment() -> String {
    format!("Generated by brainview {}", env!("CARGO_PKG_VERSION"))
}


/// A triangular Brain Mesh.
#[derive(Debug, PartialEq, Clone)]
pub struct BrainMesh {
    pub vertices: Vec<f32>,
    pub faces: Vec<i32>,
}


impl BrainMesh {

    /// Create a new mesh from flat vertex coordinates (3 per vertex) and flat faces (3 vertex indices per face).
    ///
    /// # Errors
    ///
    /// An InvalidArgument error is returned if the buffer lengths are not multiples of 3, or if a face
    /// references a vertex that does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// let mesh = brainview::BrainMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]).unwrap();
    /// assert_eq!(3, mesh.num_vertices());
    /// assert_eq!(1, mesh.num_faces());
    /// ```
    pub fn new(vertices: Vec<f32>, faces: Vec<i32>) -> Result<BrainMesh> {
        let mesh = BrainMesh { vertices, faces };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len() / 3
    }

    /// Check the mesh invariants. The fields are public, so meshes assembled by hand are checked again before export.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(BrainviewError::invalid_argument(format!(
                "Vertex buffer length must be a multiple of 3, but is {}.",
                self.vertices.len()
            )));
        }
        if self.faces.len() % 3 != 0 {
            return Err(BrainviewError::invalid_argument(format!(
                "Face buffer length must be a multiple of 3, but is {}.",
                self.faces.len()
            )));
        }
        let num_vertices = self.num_vertices();
        if let Some(bad) = self.faces.iter().find(|&&idx| idx < 0 || idx as usize >= num_vertices) {
            return Err(BrainviewError::invalid_argument(format!(
                "Face vertex index {} out of range for mesh with {} vertices.",
                bad, num_vertices
            )));
        }
        Ok(())
    }


    /// Get the Wavefront Object format representation of this mesh. Vertex indices in the face lines are 1-based.
    ///
    /// # Examples
    ///
    /// ```
    /// let mesh = brainview::BrainMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]).unwrap();
    /// let obj_repr = mesh.to_obj();
    /// assert!(obj_repr.contains("f 1 2 3"));
    /// ```
    pub fn to_obj(&self) -> String {
        let mut obj_repr = String::with_capacity(self.vertices.len() * 10 + self.faces.len() * 8);
        obj_repr.push_str(&format!("# {}\n", generator_comment()));

        for v in self.vertices.chunks_exact(3) {
            obj_repr.push_str(&format!("v {} {} {}\n", v[0], v[1], v[2]));
        }

        for f in self.faces.chunks_exact(3) {
            obj_repr.push_str(&format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1));
        }
        obj_repr
    }


    /// Get the ASCII Stanford PLY format representation of this mesh.
    ///
    /// # Parameters
    ///
    /// * `vertex_colors`: optional RGBA colors, 4 `u8` values per vertex. If given, `red`, `green`, `blue` and `alpha`
    ///   properties are declared for the vertices and written after the coordinates.
    ///
    /// # Errors
    ///
    /// An InvalidArgument error is returned if the color buffer does not hold exactly 4 values per vertex.
    pub fn to_ply(&self, vertex_colors: Option<&[u8]>) -> Result<String> {
        if let Some(colors) = vertex_colors {
            if colors.len() != self.num_vertices() * 4 {
                return Err(BrainviewError::invalid_argument(format!(
                    "Expected 4 color values for each of the {} vertices ({} in total), but got {}.",
                    self.num_vertices(),
                    self.num_vertices() * 4,
                    colors.len()
                )));
            }
        }

        let mut ply_repr = String::with_capacity(self.vertices.len() * 14 + self.faces.len() * 8 + 256);
        ply_repr.push_str("ply\nformat ascii 1.0\n");
        ply_repr.push_str(&format!("comment {}\n", generator_comment()));
        ply_repr.push_str(&format!("element vertex {}\n", self.num_vertices()));
        ply_repr.push_str("property float x\nproperty float y\nproperty float z\n");
        if vertex_colors.is_some() {
            ply_repr.push_str("property uchar red\nproperty uchar green\nproperty uchar blue\nproperty uchar alpha\n");
        }
        ply_repr.push_str(&format!("element face {}\n", self.num_faces()));
        ply_repr.push_str("property list uchar int vertex_indices\nend_header\n");

        match vertex_colors {
            Some(colors) => {
                for (v, c) in self.vertices.chunks_exact(3).zip(colors.chunks_exact(4)) {
                    ply_repr.push_str(&format!("{} {} {} {} {} {} {}\n", v[0], v[1], v[2], c[0], c[1], c[2], c[3]));
                }
            }
            None => {
                for v in self.vertices.chunks_exact(3) {
                    ply_repr.push_str(&format!("{} {} {}\n", v[0], v[1], v[2]));
                }
            }
        }

        for f in self.faces.chunks_exact(3) {
            ply_repr.push_str(&format!("3 {} {} {}\n", f[0], f[1], f[2]));
        }
        Ok(ply_repr)
    }
}


impl fmt::Display for BrainMesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Brain mesh with {} vertices and {} faces.", self.num_vertices(), self.num_faces())
    }
}
