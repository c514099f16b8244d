use std::rc::Rc;

use gl::types::{GLint, GLsizei, GLuint};

use crate::api::{GlApi, NativeGl};
use crate::buffer::VertexBuffer;
use crate::context::GlContext;
use crate::layout::VertexBufferLayout;

/// Records which buffers feed which vertex attributes.
pub struct VertexArray<A: GlApi = NativeGl> {
    ctx: Rc<GlContext<A>>,
    id: GLuint,
}

impl<A: GlApi> VertexArray<A> {
    pub fn new(ctx: &Rc<GlContext<A>>) -> Self {
        let id = ctx.call("glGenVertexArrays", |api| api.gen_vertex_array());

        Self {
            ctx: Rc::clone(ctx),
            id,
        }
    }

    /// Points attribute `i` at the `i`-th element of `layout` inside `vb`.
    pub fn add_buffer(&self, vb: &VertexBuffer<A>, layout: &VertexBufferLayout) {
        self.bind();
        vb.bind();

        let stride = layout.stride() as GLsizei;

        for (index, element, offset) in layout.attributes() {
            self.ctx.call("glEnableVertexAttribArray", |api| {
                api.enable_vertex_attrib_array(index)
            });
            self.ctx.call("glVertexAttribPointer", |api| {
                api.vertex_attrib_pointer(
                    index,
                    element.count as GLint,
                    element.scalar.gl_enum(),
                    element.normalized,
                    stride,
                    offset,
                )
            });
        }
    }

    pub fn bind(&self) {
        self.ctx
            .call("glBindVertexArray", |api| api.bind_vertex_array(self.id));
    }

    pub fn unbind(&self) {
        self.ctx
            .call("glBindVertexArray", |api| api.bind_vertex_array(0));
    }

    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl<A: GlApi> Drop for VertexArray<A> {
    fn drop(&mut self) {
        self.ctx
            .call("glDeleteVertexArrays", |api| api.delete_vertex_array(self.id));
    }
}
