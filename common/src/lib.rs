pub mod config;
pub mod mesh;
pub mod shader_source;
