//! Fixed selection tables and the actions behind them.
//!
//! Each table is indexed by the key bindings in `main`. Indexing past the
//! end of a table is a programmer error and panics; everything else a
//! selection can get wrong (missing file, bad shader) is handled inside
//! the scene and logged.

use glam::Vec3;

use crate::scene::{Scene, ShadingMode};

#[derive(Debug, Clone, Copy)]
pub struct ModelEntry {
    pub name: &'static str,
    pub file: &'static str,
}

/// Loadable models, as paths under the media directory.
pub const MODELS: [ModelEntry; 10] = [
    ModelEntry { name: "Cubey", file: "cube/cube.obj" },
    ModelEntry { name: "Statue", file: "statue/statue.obj" },
    ModelEntry { name: "Mario", file: "mario/mario.obj" },
    ModelEntry { name: "Giant Robot", file: "giant_robot/giant_robot.obj" },
    ModelEntry { name: "R2D2", file: "r2d2/R2.obj" },
    ModelEntry { name: "Skull", file: "skull/skull.obj" },
    ModelEntry { name: "Shark", file: "shark/shark.obj" },
    ModelEntry { name: "Monkey", file: "monkey/monkey.obj" },
    ModelEntry { name: "Dragon", file: "dragon_smooth/dragon_smooth.obj" },
    ModelEntry { name: "Bunny", file: "bunny/bunny.obj" },
];

#[derive(Debug, Clone, Copy)]
pub struct EnvMapEntry {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Cube-map face patterns; `%s` expands to the six face suffixes.
pub const ENV_MAPS: [EnvMapEntry; 6] = [
    EnvMapEntry { name: "Cloudy hills", pattern: "tga/cloudyhills_%s.tga" },
    EnvMapEntry { name: "Foggy desert", pattern: "tga/foggydesert_%s.tga" },
    EnvMapEntry { name: "In clouds", pattern: "tga/inclouds_%s.tga" },
    EnvMapEntry { name: "Nighttime", pattern: "tga/night_%s.tga" },
    EnvMapEntry { name: "Tron world", pattern: "tga/tron_%s.tga" },
    EnvMapEntry { name: "Lava world", pattern: "tga/lava_%s.tga" },
];

#[derive(Debug, Clone, Copy)]
pub struct BumpMapEntry {
    pub name: &'static str,
    pub file: &'static str,
}

/// Height fields doubling as bump maps.
pub const BUMP_MAPS: [BumpMapEntry; 9] = [
    BumpMapEntry { name: "Outward bumps", file: "tga/bumps_out.tga" },
    BumpMapEntry { name: "Inward bumps", file: "tga/bumps_in.tga" },
    BumpMapEntry { name: "Brick", file: "tga/brick.tga" },
    BumpMapEntry { name: "GeForce cell", file: "tga/geforce_cell.tga" },
    BumpMapEntry { name: "GeForce etch", file: "tga/geforce_etch.tga" },
    BumpMapEntry { name: "Mosaic", file: "tga/mosaic.tga" },
    BumpMapEntry { name: "Stripes", file: "tga/stripes.tga" },
    BumpMapEntry { name: "Texas Longhorn", file: "tga/texas_longhorn.tga" },
    BumpMapEntry { name: "Texas Longhorn 2", file: "tga/texas_longhorn2.tga" },
];

#[derive(Debug, Clone, Copy)]
pub struct DecalEntry {
    pub name: &'static str,
    pub file: &'static str,
}

/// Decal textures bound to unit 1.
pub const DECALS: [DecalEntry; 6] = [
    DecalEntry { name: "Texas Longhorn", file: "tga/texas_longhorn_texture.tga" },
    DecalEntry { name: "Solid white", file: "tga/solid_white.tga" },
    DecalEntry { name: "Brick", file: "tga/brick_texture.tga" },
    DecalEntry { name: "GeForce", file: "tga/geforce.tga" },
    DecalEntry { name: "Solid green", file: "tga/solid_green.tga" },
    DecalEntry { name: "Green stripes", file: "tga/green_stripes.tga" },
];

#[derive(Debug, Clone, Copy)]
pub struct MaterialEntry {
    pub name: &'static str,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

/// Classic Phong material presets. Shininess is on the usual 0..128 scale.
pub const MATERIALS: [MaterialEntry; 25] = [
    MaterialEntry {
        name: "Matte white",
        ambient: Vec3::new(0.1, 0.1, 0.1),
        diffuse: Vec3::new(0.9, 0.9, 0.9),
        specular: Vec3::ZERO,
        shininess: 0.0,
    },
    MaterialEntry {
        name: "Emerald",
        ambient: Vec3::new(0.0215, 0.1745, 0.0215),
        diffuse: Vec3::new(0.07568, 0.61424, 0.07568),
        specular: Vec3::new(0.633, 0.727811, 0.633),
        shininess: 0.6 * 128.0,
    },
    MaterialEntry {
        name: "Jade",
        ambient: Vec3::new(0.135, 0.2225, 0.1575),
        diffuse: Vec3::new(0.54, 0.89, 0.63),
        specular: Vec3::new(0.316228, 0.316228, 0.316228),
        shininess: 0.1 * 128.0,
    },
    MaterialEntry {
        name: "Obsidian",
        ambient: Vec3::new(0.05375, 0.05, 0.06625),
        diffuse: Vec3::new(0.18275, 0.17, 0.22525),
        specular: Vec3::new(0.332741, 0.328634, 0.346435),
        shininess: 0.3 * 128.0,
    },
    MaterialEntry {
        name: "Pearl",
        ambient: Vec3::new(0.25, 0.20725, 0.20725),
        diffuse: Vec3::new(1.0, 0.829, 0.829),
        specular: Vec3::new(0.296648, 0.296648, 0.296648),
        shininess: 0.088 * 128.0,
    },
    MaterialEntry {
        name: "Ruby",
        ambient: Vec3::new(0.1745, 0.01175, 0.01175),
        diffuse: Vec3::new(0.61424, 0.04136, 0.04136),
        specular: Vec3::new(0.727811, 0.626959, 0.626959),
        shininess: 0.6 * 128.0,
    },
    MaterialEntry {
        name: "Turquoise",
        ambient: Vec3::new(0.1, 0.18725, 0.1745),
        diffuse: Vec3::new(0.396, 0.74151, 0.69102),
        specular: Vec3::new(0.297254, 0.30829, 0.306678),
        shininess: 0.1 * 128.0,
    },
    MaterialEntry {
        name: "Brass",
        ambient: Vec3::new(0.329412, 0.223529, 0.027451),
        diffuse: Vec3::new(0.780392, 0.568627, 0.113725),
        specular: Vec3::new(0.992157, 0.941176, 0.807843),
        shininess: 0.21794872 * 128.0,
    },
    MaterialEntry {
        name: "Bronze",
        ambient: Vec3::new(0.2125, 0.1275, 0.054),
        diffuse: Vec3::new(0.714, 0.4284, 0.18144),
        specular: Vec3::new(0.393548, 0.271906, 0.166721),
        shininess: 0.2 * 128.0,
    },
    MaterialEntry {
        name: "Chrome",
        ambient: Vec3::new(0.25, 0.25, 0.25),
        diffuse: Vec3::new(0.4, 0.4, 0.4),
        specular: Vec3::new(0.774597, 0.774597, 0.774597),
        shininess: 0.6 * 128.0,
    },
    MaterialEntry {
        name: "Copper",
        ambient: Vec3::new(0.19125, 0.0735, 0.0225),
        diffuse: Vec3::new(0.7038, 0.27048, 0.0828),
        specular: Vec3::new(0.256777, 0.137622, 0.086014),
        shininess: 0.1 * 128.0,
    },
    MaterialEntry {
        name: "Gold",
        ambient: Vec3::new(0.24725, 0.1995, 0.0745),
        diffuse: Vec3::new(0.75164, 0.60648, 0.22648),
        specular: Vec3::new(0.628281, 0.555802, 0.366065),
        shininess: 0.4 * 128.0,
    },
    MaterialEntry {
        name: "Silver",
        ambient: Vec3::new(0.19225, 0.19225, 0.19225),
        diffuse: Vec3::new(0.50754, 0.50754, 0.50754),
        specular: Vec3::new(0.508273, 0.508273, 0.508273),
        shininess: 0.4 * 128.0,
    },
    MaterialEntry {
        name: "Black plastic",
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.01, 0.01, 0.01),
        specular: Vec3::new(0.5, 0.5, 0.5),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "Cyan plastic",
        ambient: Vec3::new(0.0, 0.1, 0.06),
        diffuse: Vec3::new(0.0, 0.50980392, 0.50980392),
        specular: Vec3::new(0.50196078, 0.50196078, 0.50196078),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "Green plastic",
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.1, 0.35, 0.1),
        specular: Vec3::new(0.45, 0.55, 0.45),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "Red plastic",
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.5, 0.0, 0.0),
        specular: Vec3::new(0.7, 0.6, 0.6),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "White plastic",
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.55, 0.55, 0.55),
        specular: Vec3::new(0.7, 0.7, 0.7),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "Yellow plastic",
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.5, 0.5, 0.0),
        specular: Vec3::new(0.6, 0.6, 0.5),
        shininess: 0.25 * 128.0,
    },
    MaterialEntry {
        name: "Black rubber",
        ambient: Vec3::new(0.02, 0.02, 0.02),
        diffuse: Vec3::new(0.01, 0.01, 0.01),
        specular: Vec3::new(0.4, 0.4, 0.4),
        shininess: 0.078125 * 128.0,
    },
    MaterialEntry {
        name: "Cyan rubber",
        ambient: Vec3::new(0.0, 0.05, 0.05),
        diffuse: Vec3::new(0.4, 0.5, 0.5),
        specular: Vec3::new(0.04, 0.7, 0.7),
        shininess: 0.078125 * 128.0,
    },
    MaterialEntry {
        name: "Green rubber",
        ambient: Vec3::new(0.0, 0.05, 0.0),
        diffuse: Vec3::new(0.4, 0.5, 0.4),
        specular: Vec3::new(0.04, 0.7, 0.04),
        shininess: 0.078125 * 128.0,
    },
    MaterialEntry {
        name: "Red rubber",
        ambient: Vec3::new(0.05, 0.0, 0.0),
        diffuse: Vec3::new(0.5, 0.4, 0.4),
        specular: Vec3::new(0.7, 0.04, 0.04),
        shininess: 0.078125 * 128.0,
    },
    MaterialEntry {
        name: "White rubber",
        ambient: Vec3::new(0.05, 0.05, 0.05),
        diffuse: Vec3::new(0.5, 0.5, 0.5),
        specular: Vec3::new(0.7, 0.7, 0.7),
        shininess: 0.078125 * 128.0,
    },
    MaterialEntry {
        name: "Yellow rubber",
        ambient: Vec3::new(0.05, 0.05, 0.0),
        diffuse: Vec3::new(0.5, 0.5, 0.4),
        specular: Vec3::new(0.7, 0.7, 0.04),
        shininess: 0.078125 * 128.0,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct LightColorEntry {
    pub name: &'static str,
    pub color: Vec3,
}

pub const LIGHT_COLORS: [LightColorEntry; 7] = [
    LightColorEntry { name: "White", color: Vec3::ONE },
    LightColorEntry { name: "Yellow white", color: Vec3::new(1.0, 1.0, 0.8) },
    LightColorEntry { name: "Bright white", color: Vec3::splat(1.8) },
    LightColorEntry { name: "Red", color: Vec3::new(1.0, 0.0, 0.0) },
    LightColorEntry { name: "Green", color: Vec3::new(0.0, 1.0, 0.0) },
    LightColorEntry { name: "Blue", color: Vec3::new(0.0, 0.0, 1.0) },
    LightColorEntry { name: "Yellow", color: Vec3::new(1.0, 1.0, 0.0) },
];

#[derive(Debug, Clone, Copy)]
pub struct ShaderEntry {
    pub name: &'static str,
    pub file: &'static str,
}

/// Fragment looks for the normal shading mode. The last entry switches
/// the model into the god-ray mode instead of swapping the fragment.
pub const SHADER_LOOKS: [ShaderEntry; 13] = [
    ShaderEntry { name: "Flat Lighting", file: "phong.frag" },
    ShaderEntry { name: "Negative", file: "negative.frag" },
    ShaderEntry { name: "Sepia", file: "sepia.frag" },
    ShaderEntry { name: "Monochrome", file: "monochrome.frag" },
    ShaderEntry { name: "Color Cycle", file: "color_cycle.frag" },
    ShaderEntry { name: "Noise Stripes & Spirals", file: "noise_stripes_spirals.frag" },
    ShaderEntry { name: "Anti-Diffuse", file: "anti_diffuse.frag" },
    ShaderEntry { name: "Normals", file: "normals.frag" },
    ShaderEntry { name: "Facing-Ratio", file: "facing.frag" },
    ShaderEntry { name: "Toon Simple 1", file: "toon_simple.frag" },
    ShaderEntry { name: "Toon Simple 2", file: "toon_simple_glossy.frag" },
    ShaderEntry { name: "Gooch", file: "gooch.frag" },
    ShaderEntry { name: "Gods Ray", file: "gods_ray.frag" },
];

/// Index of the god-ray entry in [`SHADER_LOOKS`].
pub const GOD_RAY_LOOK: usize = 12;

pub fn apply_model(scene: &mut Scene, index: usize) {
    scene.change_model(MODELS[index].file);
}

pub fn apply_env_map(scene: &mut Scene, index: usize) {
    scene.set_env_map(ENV_MAPS[index].pattern);
}

pub fn apply_bump_map(scene: &mut Scene, index: usize, bump_height: f32) {
    scene.set_bump_map(BUMP_MAPS[index].file, bump_height);
}

pub fn apply_decal(scene: &mut Scene, index: usize) {
    scene.set_decal(DECALS[index].file);
}

pub fn apply_material(scene: &mut Scene, index: usize) {
    let entry = &MATERIALS[index];
    scene.material().borrow_mut().set_phong(
        entry.ambient,
        entry.diffuse,
        entry.specular,
        entry.shininess,
    );
}

pub fn apply_light_color(scene: &mut Scene, index: usize) {
    scene.primary_light_mut().set_color(LIGHT_COLORS[index].color);
}

/// Swaps the shading look on the current model, or switches it into the
/// god-ray mode for the final table entry. Without a model this is a
/// no-op.
pub fn apply_shader_look(scene: &mut Scene, index: usize) {
    let entry = &SHADER_LOOKS[index];
    let Some(model) = scene.model_mut() else {
        log::warn!("no model loaded, ignoring shader {}", entry.name);
        return;
    };
    log::info!("switching to shader {}", entry.name);
    if index == GOD_RAY_LOOK {
        model.set_mode(ShadingMode::GodRay);
    } else {
        model.set_fragment(entry.file);
    }
}
