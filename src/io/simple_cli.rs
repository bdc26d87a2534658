use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// Command line: a TOML file or the built-in defaults, plus output overrides.
#[derive(Parser, Debug)]
#[command(name = "mesh_rasterizer")]
#[command(about = "Projects meshes and rasterizes them into an RGBA8 image")]
pub struct SimpleCli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Write an example configuration to the working directory and render it
    #[arg(long)]
    pub use_example_config: bool,

    /// Output file base name (overrides the config)
    #[arg(long, value_name = "NAME")]
    pub output: Option<String>,

    /// Output directory (overrides the config)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

pub const EXAMPLE_CONFIG_PATH: &str = "example_config.toml";

impl SimpleCli {
    /// Parses the process arguments into settings.
    pub fn process() -> Result<RenderSettings, String> {
        Self::parse().into_settings()
    }

    pub fn into_settings(self) -> Result<RenderSettings, String> {
        let mut settings = if self.use_example_config {
            TomlConfigLoader::create_example_config(EXAMPLE_CONFIG_PATH)?;
            info!("Example config written to {}", EXAMPLE_CONFIG_PATH);

            // The file is left in place as a template.
            TomlConfigLoader::load_from_file(EXAMPLE_CONFIG_PATH)
                .map_err(|e| format!("Failed to load example config: {}", e))?
        } else if let Some(config_path) = &self.config {
            info!("Loading config file: {}", config_path);
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("Failed to load config file: {}", e))?
        } else {
            info!("No config given, rendering the default scene");
            RenderSettings::default()
        };

        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(output_dir) = self.output_dir {
            settings.output_dir = output_dir;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = SimpleCli::try_parse_from([
            "mesh_rasterizer",
            "--output",
            "frame",
            "--output-dir",
            "renders",
        ])
        .unwrap();
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.output, "frame");
        assert_eq!(settings.output_dir, "renders");
        assert_eq!(settings.width, 600);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let cli =
            SimpleCli::try_parse_from(["mesh_rasterizer", "-c", "/no/such/config.toml"]).unwrap();
        let err = cli.into_settings().unwrap_err();
        assert!(err.contains("Failed to load config file"));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(SimpleCli::try_parse_from(["mesh_rasterizer", "--headless"]).is_err());
    }
}
