use gl_wrapper::layout::{LayoutError, ScalarType, VertexBufferLayout};

#[rustfmt::skip]
pub const TRIANGLE: [f32; 6] = [
    -0.5, -0.5,
     0.0,  0.5,
     0.5, -0.5,
];

#[rustfmt::skip]
pub const QUAD: [f32; 8] = [
    -0.5, -0.5,
     0.5, -0.5,
     0.5,  0.5,
    -0.5,  0.5,
];

#[rustfmt::skip]
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 2,
    2, 3, 0,
];

/// CPU side vertex data plus the layout describing one vertex.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Option<Vec<u32>>,
    pub layout: VertexBufferLayout,
}

impl Mesh {
    pub fn triangle() -> Self {
        Self::new(TRIANGLE.to_vec(), None, position_2d())
            .unwrap_or_else(|e| unreachable!("built-in triangle: {e}"))
    }

    pub fn quad() -> Self {
        Self::new(QUAD.to_vec(), Some(QUAD_INDICES.to_vec()), position_2d())
            .unwrap_or_else(|e| unreachable!("built-in quad: {e}"))
    }

    /// Checks that `vertices` holds whole vertices of `layout` and that every
    /// index points at one of them.

    pub fn new(
        vertices: Vec<f32>,
        indices: Option<Vec<u32>>,
        layout: VertexBufferLayout,
    ) -> Result<Self, MeshError> {
        let floats_per_vertex = layout.stride() / std::mem::size_of::<f32>();

        if layout
            .elements()
            .iter()
            .any(|e| e.scalar != ScalarType::Float)
        {
            return Err(MeshError::NonFloatLayout);
        }

        if vertices.len() % floats_per_vertex != 0 {
            return Err(MeshError::InvalidDataLength);
        }

        let mesh = Self {
            vertices,
            indices,
            layout,
        };

        if let Some(indices) = &mesh.indices {
            let count = mesh.vertex_count();
            if let Some(bad) = indices.iter().find(|i| **i as usize >= count) {
                return Err(MeshError::IndexOutOfRange(*bad, count));
            }
        }

        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<f32>() / self.layout.stride()
    }
}

fn position_2d() -> VertexBufferLayout {
    VertexBufferLayout::builder()
        .push_of::<f32>(2)
        .build()
        .unwrap_or_else(|e: LayoutError| unreachable!("static layout: {e}"))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("Invalid data length for given layout")]
    InvalidDataLength,
    #[error("mesh layouts must only contain float attributes")]
    NonFloatLayout,
    #[error("index {0} out of range for {1} vertices")]
    IndexOutOfRange(u32, usize),
}
