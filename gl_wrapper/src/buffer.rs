use std::rc::Rc;

use gl::types::{GLenum, GLuint};

use crate::api::{GlApi, NativeGl};
use crate::context::GlContext;

struct RawBuffer<A: GlApi> {
    ctx: Rc<GlContext<A>>,
    id: GLuint,
    target: GLenum,
    size: usize,
}

impl<A: GlApi> RawBuffer<A> {
    fn new(ctx: &Rc<GlContext<A>>, target: GLenum, data: &[u8]) -> Self {
        let id = ctx.call("glGenBuffers", |api| api.gen_buffer());
        ctx.call("glBindBuffer", |api| api.bind_buffer(target, id));
        ctx.call("glBufferData", |api| {
            api.buffer_data(target, data, gl::STATIC_DRAW)
        });

        log::trace!("uploaded {} bytes to buffer {id}", data.len());

        Self {
            ctx: Rc::clone(ctx),
            id,
            target,
            size: data.len(),
        }
    }

    fn bind(&self) {
        self.ctx
            .call("glBindBuffer", |api| api.bind_buffer(self.target, self.id));
    }

    fn unbind(&self) {
        self.ctx
            .call("glBindBuffer", |api| api.bind_buffer(self.target, 0));
    }
}

impl<A: GlApi> Drop for RawBuffer<A> {
    fn drop(&mut self) {
        self.ctx
            .call("glDeleteBuffers", |api| api.delete_buffer(self.id));
    }
}

/// Vertex data uploaded once with `STATIC_DRAW`.
pub struct VertexBuffer<A: GlApi = NativeGl> {
    raw: RawBuffer<A>,
}

impl<A: GlApi> VertexBuffer<A> {
    pub fn new<T: bytemuck::Pod>(ctx: &Rc<GlContext<A>>, data: &[T]) -> Self {
        Self {
            raw: RawBuffer::new(ctx, gl::ARRAY_BUFFER, bytemuck::cast_slice(data)),
        }
    }

    pub fn bind(&self) {
        self.raw.bind();
    }

    pub fn unbind(&self) {
        self.raw.unbind();
    }

    /// Length of the uploaded data in bytes.
    pub fn size(&self) -> usize {
        self.raw.size
    }

    pub fn id(&self) -> GLuint {
        self.raw.id
    }
}

/// `u32` indices uploaded once with `STATIC_DRAW`.
pub struct IndexBuffer<A: GlApi = NativeGl> {
    raw: RawBuffer<A>,
    count: usize,
}

impl<A: GlApi> IndexBuffer<A> {
    pub fn new(ctx: &Rc<GlContext<A>>, indices: &[u32]) -> Self {
        Self {
            raw: RawBuffer::new(
                ctx,
                gl::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
            ),
            count: indices.len(),
        }
    }

    pub fn bind(&self) {
        self.raw.bind();
    }

    pub fn unbind(&self) {
        self.raw.unbind();
    }

    /// Number of indices, not bytes.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn id(&self) -> GLuint {
        self.raw.id
    }
}
