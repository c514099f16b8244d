pub mod api;
pub mod buffer;
pub mod context;
pub mod debug;
pub mod layout;
pub mod program;
pub mod renderer;
pub mod vertex_array;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{GlApi, NativeGl};
pub use context::GlContext;
