use crate::geometry::projection::{MAX_SCALE, Projector};
use crate::scene::cubes::{default_cube, rgb_cube};
use crate::scene::mesh::{Mesh, PrimitiveKind};
use crate::scene::shapes::Shape;
use crate::utils::color_utils::{Color, parse_color};
use std::fmt;
use std::str::FromStr;

/// Built-in meshes that can be listed in `[scene] draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEntry {
    /// Cube corners as points.
    Points,
    /// Cube edges.
    Lines,
    /// Cube faces in one color.
    Triangles,
    /// Cube faces with a color per corner.
    RgbCube,
}

impl SceneEntry {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneEntry::Points => "points",
            SceneEntry::Lines => "lines",
            SceneEntry::Triangles => "triangles",
            SceneEntry::RgbCube => "rgb",
        }
    }

    pub fn build(&self, cube_color: Option<Color>) -> Mesh {
        match self {
            SceneEntry::Points => default_cube(PrimitiveKind::Point, cube_color),
            SceneEntry::Lines => default_cube(PrimitiveKind::Line, cube_color),
            SceneEntry::Triangles => default_cube(PrimitiveKind::Triangle, cube_color),
            SceneEntry::RgbCube => rgb_cube(),
        }
    }
}

impl fmt::Display for SceneEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "points" => Ok(SceneEntry::Points),
            "lines" => Ok(SceneEntry::Lines),
            "triangles" => Ok(SceneEntry::Triangles),
            "rgb" | "rgb_cube" => Ok(SceneEntry::RgbCube),
            other => Err(format!("Unknown scene entry: {}", other)),
        }
    }
}

/// Everything that can be configured through TOML or the CLI.
///
/// Plain data; meshes and shapes are already validated when they get here.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    // ===== files =====
    /// Base name of the output image (`<output>_color.png`)
    pub output: String,
    /// Directory the image is written to
    pub output_dir: String,

    // ===== render =====
    /// Display width in screen pixels
    pub width: usize,
    /// Display height in screen pixels
    pub height: usize,
    /// Screen pixels per logical buffer pixel
    pub pixel_size: usize,
    /// Buffer pixels per model unit
    pub scale: f32,
    /// Clear color, "r,g,b,a"
    pub background_color: String,
    /// Enlarge the saved image back to display size
    pub upscale_output: bool,

    // ===== scene =====
    /// Built-in meshes, drawn in order
    pub scene: Vec<SceneEntry>,
    /// Color of the single-colored cubes, "r,g,b,a"; magenta when unset
    pub cube_color: Option<String>,
    /// Meshes from `[[mesh]]`, drawn after the built-in ones
    pub meshes: Vec<Mesh>,
    /// Direct buffer-space drawings from `[[shape]]`, drawn last
    pub shapes: Vec<Shape>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output: "output".to_string(),
            output_dir: "output_rust".to_string(),
            width: 600,
            height: 400,
            pixel_size: 5,
            scale: 40.0,
            background_color: "0,0,0,0".to_string(),
            upscale_output: true,
            scene: vec![
                SceneEntry::Points,
                SceneEntry::Lines,
                SceneEntry::Triangles,
                SceneEntry::RgbCube,
            ],
            cube_color: None,
            meshes: Vec::new(),
            shapes: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Width of the logical pixel buffer.
    pub fn buffer_width(&self) -> usize {
        self.width / self.pixel_size.max(1)
    }

    /// Height of the logical pixel buffer.
    pub fn buffer_height(&self) -> usize {
        self.height / self.pixel_size.max(1)
    }

    pub fn get_background_color(&self) -> Result<Color, String> {
        parse_color(&self.background_color).map_err(|e| format!("Invalid background_color: {}", e))
    }

    pub fn get_cube_color(&self) -> Result<Option<Color>, String> {
        self.cube_color
            .as_deref()
            .map(|s| parse_color(s).map_err(|e| format!("Invalid cube_color: {}", e)))
            .transpose()
    }

    pub fn build_projector(&self) -> Result<Projector, String> {
        Projector::new(self.scale, self.width, self.height, self.pixel_size)
    }

    /// Built-in scene meshes followed by the custom ones.
    pub fn scene_meshes(&self) -> Result<Vec<Mesh>, String> {
        let cube_color = self.get_cube_color()?;
        let mut meshes: Vec<Mesh> = self.scene.iter().map(|entry| entry.build(cube_color)).collect();
        meshes.extend(self.meshes.iter().cloned());
        Ok(meshes)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Error: width and height must be greater than 0".to_string());
        }

        if self.pixel_size == 0 {
            return Err("Error: pixel_size must be greater than 0".to_string());
        }

        if self.buffer_width() == 0 || self.buffer_height() == 0 {
            return Err(format!(
                "Error: pixel_size {} leaves no logical pixels in a {}x{} canvas",
                self.pixel_size, self.width, self.height
            ));
        }

        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > MAX_SCALE {
            return Err(format!(
                "Error: scale must be in (0, {}], got {}",
                MAX_SCALE, self.scale
            ));
        }

        if self.output_dir.trim().is_empty() {
            return Err("Error: output directory must not be empty".to_string());
        }

        if self.output.trim().is_empty() {
            return Err("Error: output name must not be empty".to_string());
        }

        self.get_background_color()?;
        self.get_cube_color()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_the_demo_canvas() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!((settings.buffer_width(), settings.buffer_height()), (120, 80));
        assert_eq!(settings.scene_meshes().unwrap().len(), 4);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad = [
            RenderSettings {
                width: 0,
                ..Default::default()
            },
            RenderSettings {
                pixel_size: 0,
                ..Default::default()
            },
            RenderSettings {
                pixel_size: 1000,
                ..Default::default()
            },
            RenderSettings {
                scale: -1.0,
                ..Default::default()
            },
            RenderSettings {
                scale: 1.0e9,
                ..Default::default()
            },
            RenderSettings {
                output: " ".to_string(),
                ..Default::default()
            },
            RenderSettings {
                background_color: "red".to_string(),
                ..Default::default()
            },
            RenderSettings {
                cube_color: Some("1,2".to_string()),
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(settings.validate().is_err(), "{:?}", settings);
        }
    }

    #[test]
    fn cube_color_applies_to_single_colored_cubes() {
        let settings = RenderSettings {
            scene: vec![SceneEntry::Lines, SceneEntry::RgbCube],
            cube_color: Some("0,255,0".to_string()),
            ..Default::default()
        };
        let meshes = settings.scene_meshes().unwrap();
        assert_eq!(meshes[0].colors(), &[Color::new(0.0, 255.0, 0.0, 255.0)]);
        assert_eq!(meshes[1].colors().len(), 8);
    }

    #[test]
    fn scene_entries_parse_by_name() {
        assert_eq!("RGB".parse::<SceneEntry>().unwrap(), SceneEntry::RgbCube);
        assert_eq!("points".parse::<SceneEntry>().unwrap().to_string(), "points");
        assert!("spheres".parse::<SceneEntry>().is_err());
    }
}
