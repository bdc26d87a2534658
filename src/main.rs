use log::{error, info};
use mesh_rasterizer::io::simple_cli::SimpleCli;
use mesh_rasterizer::utils::render_process::render_and_save;
use std::time::Instant;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();
    let settings = SimpleCli::process()?;

    if let Err(e) = settings.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e);
    }

    let (outcome, path) = render_and_save(&settings)?;

    info!(
        "Saved {} ({}x{} logical pixels, {} skipped) in {:?}",
        path.display(),
        outcome.buffer.width(),
        outcome.buffer.height(),
        outcome.skipped_pixels,
        start_time.elapsed()
    );
    Ok(())
}
