use nalgebra::Vector4;

/// RGBA color with components in [0, 255]. Stays floating point until it is
/// written to a pixel buffer, so interpolated values need not be integral.
pub type Color = Vector4<f32>;

/// Magenta, used when a mesh is built without any color.
pub const ERROR_COLOR: [f32; 4] = [255.0, 0.0, 255.0, 255.0];

pub fn error_color() -> Color {
    Color::from(ERROR_COLOR)
}

/// Converts a floating point color to bytes: round to nearest, clamp to [0, 255].
/// NaN channels become 0.
pub fn color_to_rgba8(color: &Color) -> [u8; 4] {
    let channel = |v: f32| {
        if v.is_nan() {
            0
        } else {
            v.round().clamp(0.0, 255.0) as u8
        }
    };
    [
        channel(color.x),
        channel(color.y),
        channel(color.z),
        channel(color.w),
    ]
}

/// Parses `"r,g,b,a"` (or `"r,g,b"`, alpha defaults to 255).
pub fn parse_color(s: &str) -> Result<Color, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!(
            "Expected 3 or 4 comma-separated values, got '{}'",
            s
        ));
    }
    let mut channels = [255.0f32; 4];
    for (i, part) in parts.iter().enumerate() {
        channels[i] = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("Invalid number '{}': {}", part, e))?;
    }
    Ok(Color::from(channels))
}

/// Formats a color the way `parse_color` reads it.
pub fn format_color(color: &Color) -> String {
    format!("{},{},{},{}", color.x, color.y, color.z, color.w)
}
