//! CPU-side model representation produced by the loaders.

use std::{collections::HashMap, sync::Arc};

use corelib::{Color, Vec3};

/// Surface properties declared by one `newmtl` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub specular_exponent: f32,
    pub transparency: f32,
}

impl Material {
    /// All-zero material with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Materials of one `.mtl` file, keyed by case-sensitive name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a material, returning the definition it replaced, if any.
    pub fn insert(&mut self, material: Material) -> Option<Arc<Material>> {
        self.materials
            .insert(material.name.clone(), Arc::new(material))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Triangle soup: every face contributes three positions and three normals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Shared with the library that defined it.
    pub material: Option<Arc<Material>>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]) {
        self.vertices.extend_from_slice(&positions);
        self.normals.extend_from_slice(&normals);
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Positions and normals are parallel and hold whole triangles.
    pub fn is_valid(&self) -> bool {
        self.vertices.len() == self.normals.len() && self.vertices.len() % 3 == 0
    }
}

/// Result of parsing one `.obj` file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    /// Resolved path of the last `mtllib` the file referenced.
    pub material_library: Option<String>,
}

impl Model {
    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}
