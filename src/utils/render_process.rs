use crate::core::frame_buffer::FrameBuffer;
use crate::core::rasterizer::Rasterizer;
use crate::core::renderer::Renderer;
use crate::io::render_settings::RenderSettings;
use crate::utils::color_utils::color_to_rgba8;
use crate::utils::save_utils::save_frame_buffer;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Result of one render: the logical buffer and what could not be drawn into it.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub buffer: FrameBuffer,
    pub skipped_pixels: usize,
    pub skipped_primitives: usize,
}

impl RenderOutcome {
    pub fn all_pixels_painted(&self) -> bool {
        self.skipped_pixels == 0 && self.skipped_primitives == 0
    }
}

/// Renders the configured scene into a fresh buffer.
///
/// Clears to the background color, draws the built-in and custom meshes
/// through the [`Renderer`], then the buffer-space shapes on top.
///
/// # Arguments
/// * `settings` - validated or not; invalid settings are rejected first
///
/// # Returns
/// The `width / pixel_size` x `height / pixel_size` buffer and the skip counters.
/// Off-canvas geometry is not an error, it only shows up in the counters.
pub fn render_to_buffer(settings: &RenderSettings) -> Result<RenderOutcome, String> {
    settings.validate()?;

    let start_time = Instant::now();
    let mut buffer = FrameBuffer::new(settings.buffer_width(), settings.buffer_height());
    buffer.clear(color_to_rgba8(&settings.get_background_color()?));

    let renderer = Renderer::new(settings.build_projector()?);
    let meshes = settings.scene_meshes()?;
    let mut rasterizer = Rasterizer::new();

    info!(
        "Rendering {} mesh(es) and {} shape(s) into {}x{} logical pixels",
        meshes.len(),
        settings.shapes.len(),
        buffer.width(),
        buffer.height()
    );

    renderer.draw(&meshes, &mut rasterizer, &mut buffer);

    for shape in &settings.shapes {
        debug!("Drawing {}", shape.name());
        shape.draw(&mut rasterizer, &mut buffer);
    }

    if !rasterizer.all_pixels_painted() {
        warn!(
            "Not all pixels could be generated ({} pixel(s) outside the buffer, {} primitive(s) skipped)",
            rasterizer.skipped_pixels(),
            rasterizer.skipped_primitives()
        );
    }

    info!("Frame rendered in {:?}", start_time.elapsed());

    Ok(RenderOutcome {
        buffer,
        skipped_pixels: rasterizer.skipped_pixels(),
        skipped_primitives: rasterizer.skipped_primitives(),
    })
}

/// Renders and writes `<output_dir>/<output>_color.png`.
pub fn render_and_save(settings: &RenderSettings) -> Result<(RenderOutcome, PathBuf), String> {
    let outcome = render_to_buffer(settings)?;
    let upscale_factor = if settings.upscale_output {
        settings.pixel_size
    } else {
        1
    };
    let path = save_frame_buffer(
        &outcome.buffer,
        &settings.output_dir,
        &settings.output,
        upscale_factor,
    )?;
    Ok((outcome, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::render_settings::SceneEntry;

    #[test]
    fn default_scene_fits_the_canvas() {
        let outcome = render_to_buffer(&RenderSettings::default()).unwrap();
        assert_eq!((outcome.buffer.width(), outcome.buffer.height()), (120, 80));
        assert!(outcome.all_pixels_painted());
        assert!(outcome.buffer.count_pixels_not([0, 0, 0, 0]) > 0);
    }

    #[test]
    fn empty_scene_is_only_background() {
        let settings = RenderSettings {
            scene: Vec::new(),
            background_color: "10,20,30,255".to_string(),
            ..Default::default()
        };
        let outcome = render_to_buffer(&settings).unwrap();
        assert_eq!(outcome.buffer.count_pixels_not([10, 20, 30, 255]), 0);
    }

    #[test]
    fn oversized_scale_reports_skipped_pixels() {
        let settings = RenderSettings {
            scene: vec![SceneEntry::Lines],
            scale: 400.0,
            ..Default::default()
        };
        let outcome = render_to_buffer(&settings).unwrap();
        assert!(outcome.skipped_pixels > 0);
        assert!(!outcome.all_pixels_painted());
    }

    #[test]
    fn invalid_settings_are_rejected_before_rendering() {
        let settings = RenderSettings {
            pixel_size: 0,
            ..Default::default()
        };
        assert!(render_to_buffer(&settings).is_err());
    }
}
