use crate::io::render_settings::{RenderSettings, SceneEntry};
use crate::scene::mesh::{Mesh, PrimitiveKind};
use crate::scene::shapes::Shape;
use crate::utils::color_utils::{Color, error_color, format_color, parse_color};
use log::warn;
use nalgebra::{Vector2, Vector3};
use std::path::Path;
use toml::Value;

/// Reads and writes [`RenderSettings`] as TOML.
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            )
        })?;

        Self::load_from_content(&content)
    }

    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings)?;
        std::fs::write(path, toml_content).map_err(|e| format!("Failed to write config file: {}", e))
    }

    /// Writes a config that renders the default cube sequence plus one custom
    /// mesh and one curve, so every section appears at least once.
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
        let banner = Mesh::new(
            PrimitiveKind::Triangle,
            vec![
                Vector3::new(-1.4, -0.9, 0.0),
                Vector3::new(-0.6, -0.9, 0.0),
                Vector3::new(-1.0, -0.4, 0.0),
            ],
            vec![0, 1, 2],
            vec![
                Color::new(255.0, 200.0, 0.0, 255.0),
                Color::new(0.0, 200.0, 255.0, 255.0),
                Color::new(255.0, 255.0, 255.0, 255.0),
            ],
        )
        .map_err(|e| format!("Failed to build example mesh: {}", e))?;

        let curve = Shape::Bezier {
            p0: Vector2::new(5.0, 75.0),
            p1: Vector2::new(35.0, 45.0),
            p2: Vector2::new(85.0, 105.0),
            p3: Vector2::new(115.0, 75.0),
            color_start: Color::new(255.0, 0.0, 0.0, 255.0),
            color_end: Color::new(0.0, 0.0, 255.0, 255.0),
            samples: 16,
        };

        let settings = RenderSettings {
            meshes: vec![banner],
            shapes: vec![curve],
            ..Default::default()
        };

        Self::save_to_file(&settings, path)
            .map_err(|e| format!("Failed to create example config: {}", e))
    }

    // ===== TOML -> RenderSettings =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        if let Some(files) = toml.get("files").and_then(|v| v.as_table()) {
            Self::parse_files_section(&mut settings, files)?;
        }

        if let Some(render) = toml.get("render").and_then(|v| v.as_table()) {
            Self::parse_render_section(&mut settings, render)?;
        }

        if let Some(scene) = toml.get("scene").and_then(|v| v.as_table()) {
            Self::parse_scene_section(&mut settings, scene)?;
        }

        settings.meshes = Self::parse_mesh_array(&toml)?;
        settings.shapes = Self::parse_shape_array(&toml)?;

        Ok(settings)
    }

    fn parse_files_section(
        settings: &mut RenderSettings,
        files: &toml::Table,
    ) -> Result<(), String> {
        if let Some(output) = files.get("output").and_then(|v| v.as_str()) {
            settings.output = output.to_string();
        }
        if let Some(output_dir) = files.get("output_dir").and_then(|v| v.as_str()) {
            settings.output_dir = output_dir.to_string();
        }
        Ok(())
    }

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = render.get("width") {
            settings.width = Self::value_to_usize(width).map_err(|e| format!("width: {}", e))?;
        }
        if let Some(height) = render.get("height") {
            settings.height = Self::value_to_usize(height).map_err(|e| format!("height: {}", e))?;
        }
        if let Some(pixel_size) = render.get("pixel_size") {
            settings.pixel_size =
                Self::value_to_usize(pixel_size).map_err(|e| format!("pixel_size: {}", e))?;
        }
        if let Some(scale) = render.get("scale") {
            settings.scale = Self::value_to_f32(scale).map_err(|e| format!("scale: {}", e))?;
        }
        if let Some(background) = render.get("background_color") {
            let color = Self::value_to_color(background)
                .map_err(|e| format!("background_color: {}", e))?;
            settings.background_color = format_color(&color);
        }
        if let Some(upscale) = render.get("upscale_output").and_then(|v| v.as_bool()) {
            settings.upscale_output = upscale;
        }
        Ok(())
    }

    fn parse_scene_section(
        settings: &mut RenderSettings,
        scene: &toml::Table,
    ) -> Result<(), String> {
        if let Some(draw) = scene.get("draw") {
            let entries = draw
                .as_array()
                .ok_or("[scene] draw must be an array of names")?;
            settings.scene = entries
                .iter()
                .map(|entry| {
                    entry
                        .as_str()
                        .ok_or_else(|| format!("Scene entry must be a string, got {}", entry))
                        .and_then(|name| name.parse::<SceneEntry>())
                })
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(cube_color) = scene.get("cube_color") {
            let color =
                Self::value_to_color(cube_color).map_err(|e| format!("cube_color: {}", e))?;
            settings.cube_color = Some(format_color(&color));
        }
        Ok(())
    }

    // ===== [[mesh]] =====

    fn parse_mesh_array(toml: &Value) -> Result<Vec<Mesh>, String> {
        let mut meshes = Vec::new();

        if let Some(mesh_array) = toml.get("mesh").and_then(|v| v.as_array()) {
            for (i, mesh_value) in mesh_array.iter().enumerate() {
                let mesh_table = mesh_value
                    .as_table()
                    .ok_or_else(|| format!("Mesh #{} is not a table", i + 1))?;
                let mesh = Self::parse_single_mesh(mesh_table)
                    .map_err(|e| format!("Failed to parse mesh #{}: {}", i + 1, e))?;
                meshes.push(mesh);
            }
        }

        Ok(meshes)
    }

    fn parse_single_mesh(mesh_table: &toml::Table) -> Result<Mesh, String> {
        let kind_name = mesh_table
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or("Mesh is missing the kind field")?;
        let kind = kind_name
            .parse::<PrimitiveKind>()
            .map_err(|e| e.to_string())?;

        let positions = mesh_table
            .get("positions")
            .and_then(|v| v.as_array())
            .ok_or("Mesh is missing the positions array")?
            .iter()
            .map(Self::value_to_vec3)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("positions: {}", e))?;

        let indices = match mesh_table.get("indices") {
            Some(value) => value
                .as_array()
                .ok_or("indices must be an array")?
                .iter()
                .map(Self::value_to_index)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("indices: {}", e))?,
            None => {
                warn!("Mesh without indices draws nothing");
                Vec::new()
            }
        };

        let colors = match mesh_table.get("colors") {
            Some(value) => value
                .as_array()
                .ok_or("colors must be an array")?
                .iter()
                .map(Self::value_to_color)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("colors: {}", e))?,
            None => vec![error_color()],
        };

        Mesh::new(kind, positions, indices, colors).map_err(|e| e.to_string())
    }

    // ===== [[shape]] =====

    fn parse_shape_array(toml: &Value) -> Result<Vec<Shape>, String> {
        let mut shapes = Vec::new();

        if let Some(shape_array) = toml.get("shape").and_then(|v| v.as_array()) {
            for (i, shape_value) in shape_array.iter().enumerate() {
                let shape_table = shape_value
                    .as_table()
                    .ok_or_else(|| format!("Shape #{} is not a table", i + 1))?;
                let shape = Self::parse_single_shape(shape_table)
                    .map_err(|e| format!("Failed to parse shape #{}: {}", i + 1, e))?;
                shapes.push(shape);
            }
        }

        Ok(shapes)
    }

    fn parse_single_shape(table: &toml::Table) -> Result<Shape, String> {
        let shape_type = table
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or("Shape is missing the type field")?;

        match shape_type {
            "circle" => Ok(Shape::Circle {
                center: Self::required_vec2(table, "center")?,
                radius: Self::required_f32(table, "radius")?,
                color: Self::required_color(table, "color")?,
            }),
            "line" => {
                let color_start = Self::required_color(table, "color_start")?;
                Ok(Shape::Line {
                    start: Self::required_vec2(table, "start")?,
                    end: Self::required_vec2(table, "end")?,
                    color_end: Self::optional_color(table, "color_end")?.unwrap_or(color_start),
                    color_start,
                })
            }
            "triangle" => {
                let color_a = Self::required_color(table, "color_a")?;
                Ok(Shape::Triangle {
                    a: Self::required_vec2(table, "a")?,
                    b: Self::required_vec2(table, "b")?,
                    c: Self::required_vec2(table, "c")?,
                    color_b: Self::optional_color(table, "color_b")?.unwrap_or(color_a),
                    color_c: Self::optional_color(table, "color_c")?.unwrap_or(color_a),
                    color_a,
                })
            }
            "bezier" => {
                let color_start = Self::required_color(table, "color_start")?;
                let samples = match table.get("samples") {
                    Some(value) => {
                        Self::value_to_usize(value).map_err(|e| format!("samples: {}", e))?
                    }
                    None => 16,
                };
                Ok(Shape::Bezier {
                    p0: Self::required_vec2(table, "p0")?,
                    p1: Self::required_vec2(table, "p1")?,
                    p2: Self::required_vec2(table, "p2")?,
                    p3: Self::required_vec2(table, "p3")?,
                    color_end: Self::optional_color(table, "color_end")?.unwrap_or(color_start),
                    color_start,
                    samples,
                })
            }
            _ => Err(format!("Unknown shape type: {}", shape_type)),
        }
    }

    fn required_vec2(table: &toml::Table, key: &str) -> Result<Vector2<f32>, String> {
        let value = table
            .get(key)
            .ok_or_else(|| format!("Missing field {}", key))?;
        Self::value_to_vec2(value).map_err(|e| format!("{}: {}", key, e))
    }

    fn required_f32(table: &toml::Table, key: &str) -> Result<f32, String> {
        let value = table
            .get(key)
            .ok_or_else(|| format!("Missing field {}", key))?;
        Self::value_to_f32(value).map_err(|e| format!("{}: {}", key, e))
    }

    fn required_color(table: &toml::Table, key: &str) -> Result<Color, String> {
        Self::optional_color(table, key)?.ok_or_else(|| format!("Missing field {}", key))
    }

    fn optional_color(table: &toml::Table, key: &str) -> Result<Option<Color>, String> {
        table
            .get(key)
            .map(|value| Self::value_to_color(value).map_err(|e| format!("{}: {}", key, e)))
            .transpose()
    }

    // ===== value helpers =====

    fn value_to_f32(value: &Value) -> Result<f32, String> {
        match value {
            Value::Float(f) => Ok(*f as f32),
            Value::Integer(i) => Ok(*i as f32),
            other => Err(format!("Expected a number, got {}", other)),
        }
    }

    fn value_to_usize(value: &Value) -> Result<usize, String> {
        let int = value
            .as_integer()
            .ok_or_else(|| format!("Expected an integer, got {}", value))?;
        usize::try_from(int).map_err(|_| format!("Expected a non-negative integer, got {}", int))
    }

    fn value_to_index(value: &Value) -> Result<u32, String> {
        let int = value
            .as_integer()
            .ok_or_else(|| format!("Expected an integer index, got {}", value))?;
        u32::try_from(int).map_err(|_| format!("Index out of range: {}", int))
    }

    fn value_to_floats(value: &Value, len: usize) -> Result<Vec<f32>, String> {
        let array = value
            .as_array()
            .ok_or_else(|| format!("Expected an array of {} numbers, got {}", len, value))?;
        if array.len() != len {
            return Err(format!(
                "Expected {} numbers, got {}",
                len,
                array.len()
            ));
        }
        array.iter().map(Self::value_to_f32).collect()
    }

    fn value_to_vec2(value: &Value) -> Result<Vector2<f32>, String> {
        let v = Self::value_to_floats(value, 2)?;
        Ok(Vector2::new(v[0], v[1]))
    }

    fn value_to_vec3(value: &Value) -> Result<Vector3<f32>, String> {
        let v = Self::value_to_floats(value, 3)?;
        Ok(Vector3::new(v[0], v[1], v[2]))
    }

    /// Colors are either `"r,g,b[,a]"` or `[r, g, b]` / `[r, g, b, a]`.
    fn value_to_color(value: &Value) -> Result<Color, String> {
        match value {
            Value::String(s) => parse_color(s),
            Value::Array(array) => {
                if array.len() != 3 && array.len() != 4 {
                    return Err(format!(
                        "Expected 3 or 4 color channels, got {}",
                        array.len()
                    ));
                }
                let mut channels = [255.0f32; 4];
                for (i, channel) in array.iter().enumerate() {
                    channels[i] = Self::value_to_f32(channel)?;
                }
                Ok(Color::from(channels))
            }
            other => Err(format!("Expected a color, got {}", other)),
        }
    }

    // ===== RenderSettings -> TOML =====

    fn settings_to_toml(settings: &RenderSettings) -> Result<String, String> {
        let mut content = String::new();

        content.push_str("# mesh_rasterizer configuration\n");
        content.push_str("# Generated from RenderSettings defaults\n\n");

        content.push_str("[files]\n");
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        content.push('\n');

        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("pixel_size = {}\n", settings.pixel_size));
        content.push_str(&format!("scale = {:?}\n", settings.scale));
        content.push_str(&format!(
            "background_color = \"{}\"\n",
            settings.background_color
        ));
        content.push_str(&format!("upscale_output = {}\n", settings.upscale_output));
        content.push('\n');

        content.push_str("[scene]\n");
        let names: Vec<String> = settings
            .scene
            .iter()
            .map(|entry| format!("\"{}\"", entry))
            .collect();
        content.push_str(&format!("draw = [{}]\n", names.join(", ")));
        if let Some(cube_color) = &settings.cube_color {
            content.push_str(&format!("cube_color = \"{}\"\n", cube_color));
        } else {
            content.push_str("# cube_color = \"255,0,255,255\"  # single-colored cubes\n");
        }

        for mesh in &settings.meshes {
            content.push('\n');
            content.push_str("[[mesh]]\n");
            content.push_str(&format!(
                "kind = \"{}\"\n",
                mesh.kind().to_string().to_lowercase()
            ));
            let positions: Vec<String> = mesh
                .positions()
                .iter()
                .map(|p| format_floats(p.as_slice()))
                .collect();
            content.push_str(&format!("positions = [{}]\n", positions.join(", ")));
            let indices: Vec<String> = mesh.indices().iter().map(|i| i.to_string()).collect();
            content.push_str(&format!("indices = [{}]\n", indices.join(", ")));
            let colors: Vec<String> = mesh
                .colors()
                .iter()
                .map(|c| format!("\"{}\"", format_color(c)))
                .collect();
            content.push_str(&format!("colors = [{}]\n", colors.join(", ")));
        }

        for shape in &settings.shapes {
            content.push('\n');
            content.push_str("[[shape]]\n");
            content.push_str(&format!("type = \"{}\"\n", shape.name()));
            match shape {
                Shape::Circle {
                    center,
                    radius,
                    color,
                } => {
                    content.push_str(&format!("center = {}\n", format_floats(center.as_slice())));
                    content.push_str(&format!("radius = {:?}\n", radius));
                    content.push_str(&format!("color = \"{}\"\n", format_color(color)));
                }
                Shape::Line {
                    start,
                    end,
                    color_start,
                    color_end,
                } => {
                    content.push_str(&format!("start = {}\n", format_floats(start.as_slice())));
                    content.push_str(&format!("end = {}\n", format_floats(end.as_slice())));
                    content.push_str(&format!("color_start = \"{}\"\n", format_color(color_start)));
                    content.push_str(&format!("color_end = \"{}\"\n", format_color(color_end)));
                }
                Shape::Triangle {
                    a,
                    b,
                    c,
                    color_a,
                    color_b,
                    color_c,
                } => {
                    content.push_str(&format!("a = {}\n", format_floats(a.as_slice())));
                    content.push_str(&format!("b = {}\n", format_floats(b.as_slice())));
                    content.push_str(&format!("c = {}\n", format_floats(c.as_slice())));
                    content.push_str(&format!("color_a = \"{}\"\n", format_color(color_a)));
                    content.push_str(&format!("color_b = \"{}\"\n", format_color(color_b)));
                    content.push_str(&format!("color_c = \"{}\"\n", format_color(color_c)));
                }
                Shape::Bezier {
                    p0,
                    p1,
                    p2,
                    p3,
                    color_start,
                    color_end,
                    samples,
                } => {
                    content.push_str(&format!("p0 = {}\n", format_floats(p0.as_slice())));
                    content.push_str(&format!("p1 = {}\n", format_floats(p1.as_slice())));
                    content.push_str(&format!("p2 = {}\n", format_floats(p2.as_slice())));
                    content.push_str(&format!("p3 = {}\n", format_floats(p3.as_slice())));
                    content.push_str(&format!("color_start = \"{}\"\n", format_color(color_start)));
                    content.push_str(&format!("color_end = \"{}\"\n", format_color(color_end)));
                    content.push_str(&format!("samples = {}\n", samples));
                }
            }
        }

        Ok(content)
    }
}

/// `[a, b, c]` with every value written as a TOML float.
fn format_floats(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_gives_defaults() {
        let settings = TomlConfigLoader::load_from_content("").unwrap();
        let defaults = RenderSettings::default();
        assert_eq!(settings.width, defaults.width);
        assert_eq!(settings.scene, defaults.scene);
        assert!(settings.meshes.is_empty());
        assert!(settings.shapes.is_empty());
    }

    #[test]
    fn parses_every_section() {
        let content = r#"
            [files]
            output = "cubes"
            output_dir = "out"

            [render]
            width = 300
            height = 200
            pixel_size = 2
            scale = 25.5
            background_color = [10, 20, 30]
            upscale_output = false

            [scene]
            draw = ["rgb", "lines"]
            cube_color = "0,255,0"

            [[mesh]]
            kind = "line"
            positions = [[0, 0, 0], [1.0, 1.0, 0.0]]
            indices = [0, 1]
            colors = ["255,0,0,255"]

            [[shape]]
            type = "circle"
            center = [10, 10]
            radius = 4
            color = [0, 0, 255, 255]

            [[shape]]
            type = "line"
            start = [0, 0]
            end = [5, 5]
            color_start = "255,255,255"
        "#;

        let settings = TomlConfigLoader::load_from_content(content).unwrap();
        assert_eq!(settings.output, "cubes");
        assert_eq!(settings.output_dir, "out");
        assert_eq!((settings.width, settings.height, settings.pixel_size), (300, 200, 2));
        assert_eq!(settings.scale, 25.5);
        assert_eq!(settings.background_color, "10,20,30,255");
        assert!(!settings.upscale_output);
        assert_eq!(settings.scene, vec![SceneEntry::RgbCube, SceneEntry::Lines]);
        assert_eq!(settings.cube_color.as_deref(), Some("0,255,0,255"));

        assert_eq!(settings.meshes.len(), 1);
        assert_eq!(settings.meshes[0].kind(), PrimitiveKind::Line);
        assert_eq!(settings.meshes[0].indices(), &[0, 1]);

        assert_eq!(settings.shapes.len(), 2);
        match &settings.shapes[1] {
            Shape::Line {
                color_start,
                color_end,
                ..
            } => assert_eq!(color_start, color_end),
            other => panic!("expected a line, got {:?}", other),
        }
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn mesh_violations_are_reported_with_context() {
        let arity = r#"
            [[mesh]]
            kind = "triangle"
            positions = [[0, 0, 0], [1, 0, 0]]
            indices = [0, 1]
            colors = ["1,1,1"]
        "#;
        let err = TomlConfigLoader::load_from_content(arity).unwrap_err();
        assert!(err.contains("mesh #1"), "{}", err);
        assert!(err.contains("multiple of 3"), "{}", err);

        let kind = r#"
            [[mesh]]
            kind = "quad"
            positions = []
            colors = ["1,1,1"]
        "#;
        let err = TomlConfigLoader::load_from_content(kind).unwrap_err();
        assert!(err.contains("Unsupported primitive type"), "{}", err);

        let colors = r#"
            [[mesh]]
            kind = "point"
            positions = [[0, 0, 0], [1, 0, 0]]
            indices = [0, 1]
            colors = ["1,1,1", "2,2,2", "3,3,3"]
        "#;
        let err = TomlConfigLoader::load_from_content(colors).unwrap_err();
        assert!(err.contains("does not match"), "{}", err);
    }

    #[test]
    fn mesh_without_colors_uses_the_error_color() {
        let content = r#"
            [[mesh]]
            kind = "points"
            positions = [[0, 0, 0]]
            indices = [0]
        "#;
        let settings = TomlConfigLoader::load_from_content(content).unwrap();
        assert_eq!(settings.meshes[0].colors(), &[error_color()]);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(TomlConfigLoader::load_from_content("[scene]\ndraw = [\"teapot\"]").is_err());
        assert!(TomlConfigLoader::load_from_content("[[shape]]\ntype = \"star\"").is_err());
        assert!(TomlConfigLoader::load_from_content("[render]\nwidth = -5").is_err());
        assert!(TomlConfigLoader::load_from_content("not toml = = =").is_err());
    }

    #[test]
    fn example_config_survives_a_save_and_load() {
        let dir = std::env::temp_dir().join(format!("mesh_rasterizer_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("example.toml");

        TomlConfigLoader::create_example_config(&path).unwrap();
        let settings = TomlConfigLoader::load_from_file(&path).unwrap();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.scene, RenderSettings::default().scene);
        assert_eq!(settings.meshes.len(), 1);
        assert_eq!(settings.meshes[0].kind(), PrimitiveKind::Triangle);
        assert_eq!(settings.meshes[0].colors().len(), 3);
        assert_eq!(settings.shapes.len(), 1);
        assert_eq!(settings.shapes[0].name(), "bezier");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = TomlConfigLoader::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.contains("Failed to read config file"));
    }
}
