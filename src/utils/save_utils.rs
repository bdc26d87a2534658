use crate::core::frame_buffer::FrameBuffer;
use image::ColorType;
use log::info;
use std::path::{Path, PathBuf};

/// Writes the buffer to a PNG file as RGBA8.
pub fn save_image(path: &Path, buffer: &FrameBuffer) -> Result<(), String> {
    let width = buffer.width() as u32;
    let height = buffer.height() as u32;
    image::save_buffer(path, buffer.as_bytes(), width, height, ColorType::Rgba8)
        .map_err(|e| format!("Failed to save image to {}: {}", path.display(), e))?;
    info!("Image saved to {}", path.display());
    Ok(())
}

/// `<output_dir>/<output>_color.png`
pub fn color_output_path(output_dir: &str, output: &str) -> PathBuf {
    Path::new(output_dir).join(format!("{}_color.png", output))
}

/// Saves the buffer as `<output_dir>/<output>_color.png`.
///
/// # Arguments
/// * `buffer` - logical pixels to write
/// * `output_dir` - created if it is missing
/// * `output` - file base name
/// * `upscale_factor` - each logical pixel becomes a `factor` x `factor` block; 0 or 1 keeps the size
///
/// # Returns
/// Path of the written file.
pub fn save_frame_buffer(
    buffer: &FrameBuffer,
    output_dir: &str,
    output: &str,
    upscale_factor: usize,
) -> Result<PathBuf, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory '{}': {}", output_dir, e))?;

    let path = color_output_path(output_dir, output);
    if upscale_factor > 1 {
        save_image(&path, &buffer.upscaled(upscale_factor))?;
    } else {
        save_image(&path, buffer)?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_color_path() {
        let path = color_output_path("out", "frame");
        assert_eq!(path, Path::new("out").join("frame_color.png"));
    }

    #[test]
    fn saves_upscaled_png() {
        let dir = std::env::temp_dir().join(format!("mesh_rasterizer_save_{}", std::process::id()));
        let dir_str = dir.to_str().unwrap().to_string();

        let mut buffer = FrameBuffer::new(2, 1);
        buffer.write_rgba(1, 0, [255, 0, 0, 255]);
        let path = save_frame_buffer(&buffer, &dir_str, "tiny", 3).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (6, 3));
        assert_eq!(image.get_pixel(4, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [0, 0, 0, 0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
