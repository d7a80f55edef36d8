//! Startup configuration, read once from an optional `shadeview.json`.

use std::path::PathBuf;

/// Everything the viewer lets an install tune. Every field has a default,
/// so a partial file only overrides what it names.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub media_dir: PathBuf,
    pub shader_dir: PathBuf,
    pub max_framerate: f32,
    pub bump_height: f32,
    pub god_ray_offscreen: bool,
    pub verbose: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            fullscreen: false,
            vsync: true,
            media_dir: PathBuf::from("media"),
            shader_dir: PathBuf::from("shaders"),
            max_framerate: 60.0,
            bump_height: 8.0,
            god_ray_offscreen: false,
            verbose: false,
        }
    }
}

impl ViewerConfig {
    pub fn parse(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_the_defaults() {
        let config = ViewerConfig::parse("{}").unwrap();
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 768);
        assert!(!config.fullscreen);
        assert!(config.vsync);
        assert_eq!(config.media_dir, PathBuf::from("media"));
        assert_eq!(config.shader_dir, PathBuf::from("shaders"));
        assert_eq!(config.max_framerate, 60.0);
        assert_eq!(config.bump_height, 8.0);
        assert!(!config.god_ray_offscreen);
        assert!(!config.verbose);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config =
            ViewerConfig::parse(r#"{ "window_width": 1920, "god_ray_offscreen": true }"#).unwrap();
        assert_eq!(config.window_width, 1920);
        assert!(config.god_ray_offscreen);
        assert_eq!(config.window_height, 768);
        assert_eq!(config.bump_height, 8.0);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(ViewerConfig::parse("not json").is_err());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let config = ViewerConfig::parse(r#"{ "window_title": "x", "vsync": false }"#).unwrap();
        assert!(!config.vsync);
    }
}
