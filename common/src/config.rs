use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use gl_wrapper::debug::ErrorPolicy;

/// How the shape is submitted to GL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// A triangle drawn straight from the vertex buffer.
    Arrays,
    /// A quad assembled from four vertices through an index buffer.
    #[default]
    Indexed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub shader: PathBuf,
    pub mode: DrawMode,
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub debug: DebugConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shader: PathBuf::from("res/shaders/basic.shader"),
            mode: DrawMode::default(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: "Hello World".to_string(),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    /// Written to the `u_Color` uniform, if the shader declares it.
    pub shape_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shape_color: [0.2, 0.3, 0.8, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Panic on the first GL error instead of logging it.
    pub halt_on_error: bool,
}

impl DebugConfig {
    pub fn error_policy(&self) -> ErrorPolicy {
        if self.halt_on_error {
            ErrorPolicy::Halt
        } else {
            ErrorPolicy::Log
        }
    }
}

impl Config {
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: e,
        })?;

        let config = Self::from_toml(&text)?;
        log::debug!("loaded config from {}", path.display());

        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;

        if config.window.width == 0 || config.window.height == 0 {
            return Err(ConfigError::ZeroSize);
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Format(#[from] toml::de::Error),
    #[error("window size must be non-zero")]
    ZeroSize,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.window.title, "Hello World");
        assert_eq!(config.mode, DrawMode::Indexed);
        assert_eq!(config.debug.error_policy(), ErrorPolicy::Log);
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            r#"
            shader = "other.shader"
            mode = "arrays"

            [window]
            width = 1280
            height = 720
            title = "Shapes"
            vsync = false

            [render]
            clear_color = [0.1, 0.1, 0.1, 1.0]
            shape_color = [1.0, 0.0, 0.0, 1.0]

            [debug]
            halt_on_error = true
            "#,
        )
        .unwrap();

        assert_eq!(config.shader, PathBuf::from("other.shader"));
        assert_eq!(config.mode, DrawMode::Arrays);
        assert_eq!(config.window.width, 1280);
        assert!(!config.window.vsync);
        assert_eq!(config.render.shape_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.debug.error_policy(), ErrorPolicy::Halt);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = Config::from_toml("[window]\ntitle = \"Quad\"\n").unwrap();

        assert_eq!(config.window.title, "Quad");
        assert_eq!(config.window.width, 640);
        assert!(config.window.vsync);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            Config::from_toml("colour = 1"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            Config::from_toml("mode = \"points\""),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            Config::from_toml("[window]\nwidth = 0"),
            Err(ConfigError::ZeroSize)
        ));
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../res/shapes.toml");

        assert_eq!(Config::load_path(path).unwrap(), Config::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"arrays\"").unwrap();

        let config = Config::load_path(file.path()).unwrap();
        assert_eq!(config.mode, DrawMode::Arrays);
    }
}
