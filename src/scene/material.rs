//! Shared surface material: Phong terms plus texture slots.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec3, Vec4};

use crate::abs::{CubeMap, NormalMap, Texture2D};

/// Fixed texture-unit assignment shared by every shading program.
pub const NORMAL_MAP_UNIT: u32 = 0;
pub const DECAL_UNIT: u32 = 1;
pub const HEIGHT_FIELD_UNIT: u32 = 2;
pub const ENV_MAP_UNIT: u32 = 3;

/// One material, shared mutably between every drawable that renders with
/// it. Menu actions rewrite it in place and all surfaces pick the change
/// up on their next frame.
pub type SharedMaterial = Rc<RefCell<Material>>;

pub struct Material {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
    pub normal_map: Option<Rc<NormalMap>>,
    pub decal: Option<Rc<Texture2D>>,
    pub height_field: Option<Rc<Texture2D>>,
    pub env_map: Option<Rc<CubeMap>>,
}

impl Material {
    pub fn new() -> Self {
        Self {
            ambient: Vec4::splat(0.2),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::ZERO,
            shininess: 0.0,
            normal_map: None,
            decal: None,
            height_field: None,
            env_map: None,
        }
    }

    pub fn shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    /// Replaces the Phong terms, forcing opaque alpha.
    pub fn set_phong(&mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) {
        self.ambient = ambient.extend(1.0);
        self.diffuse = diffuse.extend(1.0);
        self.specular = specular.extend(1.0);
        self.shininess = shininess;
    }

    /// Binds whichever texture slots are populated to their fixed units.
    pub fn bind_textures(&self) {
        if let Some(normal_map) = &self.normal_map {
            normal_map.bind_to_unit(NORMAL_MAP_UNIT);
        }
        if let Some(decal) = &self.decal {
            decal.bind_to_unit(DECAL_UNIT);
        }
        if let Some(height_field) = &self.height_field {
            height_field.bind_to_unit(HEIGHT_FIELD_UNIT);
        }
        if let Some(env_map) = &self.env_map {
            env_map.bind_to_unit(ENV_MAP_UNIT);
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
