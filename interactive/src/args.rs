use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use shapes_common::config::{Config, DrawMode};

#[derive(Debug, Parser)]
#[command(about = "Draws a single shape with OpenGL")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Combined shader file with `#shader vertex` and `#shader fragment` sections
    #[arg(short, long)]
    pub shader: Option<PathBuf>,
    /// How the shape is drawn
    #[arg(short, long, value_enum)]
    pub mode: Option<DrawModeArg>,
    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,
    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

impl Args {
    /// Overrides config values with the ones given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(shader) = &self.shader {
            config.shader = shader.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DrawModeArg {
    /// Triangle from a plain vertex buffer
    Arrays,
    /// Quad through an index buffer
    Indexed,
}

impl From<DrawModeArg> for DrawMode {
    fn from(m: DrawModeArg) -> Self {
        match m {
            DrawModeArg::Arrays => Self::Arrays,
            DrawModeArg::Indexed => Self::Indexed,
        }
    }
}
