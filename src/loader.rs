//! OBJ parsing, flattened into per-shape blocks.
//!
//! [`load_obj`] turns a Wavefront file into [`Shape`]s: one mesh block of
//! flat position/normal/texcoord arrays plus a triangle index list, and
//! one resolved material block per shape. Everything downstream consumes
//! these arrays; nothing else touches the file format.

use std::collections::HashMap;
use std::path::Path;

/// Material block resolved for one shape. Transmittance (`Tf`) and
/// emission (`Ke`) are not first-class statements in the parser, so they
/// are recovered from the unrecognized-parameter map; every other
/// unrecognized key stays available in `unknown`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub transmittance: [f32; 3],
    pub emission: [f32; 3],
    pub shininess: f32,
    pub ior: f32,
    pub ambient_texture: String,
    pub diffuse_texture: String,
    pub specular_texture: String,
    pub normal_texture: String,
    pub unknown: HashMap<String, String>,
}

impl ObjMaterial {
    fn from_tobj(material: &tobj::Material) -> Self {
        let unknown: HashMap<String, String> = material
            .unknown_param
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            name: material.name.clone(),
            ambient: material.ambient.unwrap_or_default(),
            diffuse: material.diffuse.unwrap_or_default(),
            specular: material.specular.unwrap_or_default(),
            transmittance: triple(unknown.get("Tf")),
            emission: triple(unknown.get("Ke")),
            shininess: material.shininess.unwrap_or_default(),
            ior: material.optical_density.unwrap_or_default(),
            ambient_texture: material.ambient_texture.clone().unwrap_or_default(),
            diffuse_texture: material.diffuse_texture.clone().unwrap_or_default(),
            specular_texture: material.specular_texture.clone().unwrap_or_default(),
            normal_texture: material.normal_texture.clone().unwrap_or_default(),
            unknown,
        }
    }
}

fn triple(value: Option<&String>) -> [f32; 3] {
    let mut out = [0.0; 3];
    if let Some(value) = value {
        for (slot, token) in out.iter_mut().zip(value.split_whitespace()) {
            *slot = token.parse().unwrap_or(0.0);
        }
    }
    out
}

/// Flat mesh arrays sharing one index list. `indices.len()` is always a
/// multiple of 3; `normals` and `texcoords` are either empty or sized to
/// match `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub name: String,
    pub material: ObjMaterial,
    pub mesh: ShapeMesh,
}

/// Parses `path`, triangulating faces and reindexing every attribute onto
/// one shared index list. Material files resolve next to the OBJ; a
/// missing or broken one degrades to default materials rather than
/// failing the load.
pub fn load_obj(path: &Path) -> Result<Vec<Shape>, String> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options)
        .map_err(|e| format!("failed to load model `{}`: {e}", path.display()))?;
    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("material library for `{}`: {e}", path.display());
            Vec::new()
        }
    };

    let shapes = models
        .into_iter()
        .map(|model| {
            debug_assert!(model.mesh.indices.len() % 3 == 0);
            let material = model
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(ObjMaterial::from_tobj)
                .unwrap_or_default();
            Shape {
                name: model.name,
                material,
                mesh: ShapeMesh {
                    positions: model.mesh.positions,
                    normals: model.mesh.normals,
                    texcoords: model.mesh.texcoords,
                    indices: model.mesh.indices,
                },
            }
        })
        .collect();
    Ok(shapes)
}
