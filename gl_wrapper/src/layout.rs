use gl::types::GLenum;
use thiserror::Error;

/// Component type of a vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl ScalarType {
    /// Size of one component in bytes.
    pub fn size(&self) -> usize {
        match self {
            ScalarType::Float => 4,
            ScalarType::UnsignedInt => 4,
            ScalarType::UnsignedByte => 1,
        }
    }

    pub fn gl_enum(&self) -> GLenum {
        match self {
            ScalarType::Float => gl::FLOAT,
            ScalarType::UnsignedInt => gl::UNSIGNED_INT,
            ScalarType::UnsignedByte => gl::UNSIGNED_BYTE,
        }
    }
}

/// Rust types that map onto a [`ScalarType`].
pub trait VertexScalar: bytemuck::Pod {
    const SCALAR: ScalarType;
}

impl VertexScalar for f32 {
    const SCALAR: ScalarType = ScalarType::Float;
}

impl VertexScalar for u32 {
    const SCALAR: ScalarType = ScalarType::UnsignedInt;
}

impl VertexScalar for u8 {
    const SCALAR: ScalarType = ScalarType::UnsignedByte;
}

/// One attribute: `count` components of `scalar`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexBufferElement {
    pub count: u8,
    pub scalar: ScalarType,
    pub normalized: bool,
}

impl VertexBufferElement {
    pub fn size(&self) -> usize {
        self.count as usize * self.scalar.size()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("attribute {index} has {count} components, expected 1 to 4")]
    InvalidCount { index: usize, count: u8 },
    #[error("layout has no attributes")]
    Empty,
}

/// Describes how one vertex record is laid out in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
    stride: usize,
}

impl VertexBufferLayout {
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    pub fn elements(&self) -> &[VertexBufferElement] {
        &self.elements
    }

    /// Bytes between the starts of two consecutive vertices.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Yields `(attribute index, element, byte offset)` for every element.
    pub fn attributes(&self) -> impl Iterator<Item = (u32, &VertexBufferElement, usize)> {
        self.elements
            .iter()
            .enumerate()
            .scan(0, |offset, (i, element)| {
                let current = *offset;
                *offset += element.size();
                Some((i as u32, element, current))
            })
    }
}

#[derive(Debug, Default)]
pub struct LayoutBuilder {
    elements: Vec<VertexBufferElement>,
}

impl LayoutBuilder {
    /// Appends an attribute. Byte attributes are normalized, others are not.
    pub fn push(self, scalar: ScalarType, count: u8) -> Self {
        let normalized = scalar == ScalarType::UnsignedByte;
        self.push_element(scalar, count, normalized)
    }

    pub fn push_normalized(self, scalar: ScalarType, count: u8, normalized: bool) -> Self {
        self.push_element(scalar, count, normalized)
    }

    pub fn push_of<T: VertexScalar>(self, count: u8) -> Self {
        self.push(T::SCALAR, count)
    }

    pub fn build(self) -> Result<VertexBufferLayout, LayoutError> {
        if self.elements.is_empty() {
            return Err(LayoutError::Empty);
        }

        if let Some((index, element)) = self
            .elements
            .iter()
            .enumerate()
            .find(|(_, e)| !(1..=4).contains(&e.count))
        {
            return Err(LayoutError::InvalidCount {
                index,
                count: element.count,
            });
        }

        let stride = self.elements.iter().map(|e| e.size()).sum();

        Ok(VertexBufferLayout {
            elements: self.elements,
            stride,
        })
    }

    fn push_element(mut self, scalar: ScalarType, count: u8, normalized: bool) -> Self {
        self.elements.push(VertexBufferElement {
            count,
            scalar,
            normalized,
        });
        self
    }
}
