use std::rc::Rc;

use gl::types::GLsizei;

use crate::api::{GlApi, NativeGl};
use crate::buffer::IndexBuffer;
use crate::context::GlContext;
use crate::program::Program;
use crate::vertex_array::VertexArray;

pub struct GlRenderer<A: GlApi = NativeGl> {
    ctx: Rc<GlContext<A>>,
}

impl<A: GlApi> GlRenderer<A> {
    pub fn new(ctx: &Rc<GlContext<A>>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
        }
    }

    /// Draws `count` vertices of `va` as triangles.
    pub fn draw_arrays(&mut self, va: &VertexArray<A>, program: &Program<A>, count: usize) {
        let Ok(count) = GLsizei::try_from(count) else {
            log::error!("{count} vertices do not fit in a single draw, skipping");
            return;
        };

        program.bind();
        va.bind();

        self.ctx
            .call("glDrawArrays", |api| api.draw_arrays(gl::TRIANGLES, 0, count));
    }

    /// Draws the triangles described by `ib`.
    pub fn draw_indexed(&mut self, va: &VertexArray<A>, ib: &IndexBuffer<A>, program: &Program<A>) {
        let Ok(count) = GLsizei::try_from(ib.count()) else {
            log::error!("{} indices do not fit in a single draw, skipping", ib.count());
            return;
        };

        program.bind();
        va.bind();
        ib.bind();

        self.ctx.call("glDrawElements", |api| {
            api.draw_elements(gl::TRIANGLES, count, gl::UNSIGNED_INT, 0)
        });
    }

    pub fn resize(&self, width: u32, height: u32) {
        let (width, height) = (clamp_size(width), clamp_size(height));

        self.ctx
            .call("glViewport", |api| api.viewport(0, 0, width, height));
    }

    pub fn clear(&self, color: [f32; 4]) {
        self.ctx.call("glClearColor", |api| api.clear_color(color));
        self.ctx
            .call("glClear", |api| api.clear(gl::COLOR_BUFFER_BIT));
    }
}

fn clamp_size(value: u32) -> GLsizei {
    GLsizei::try_from(value).unwrap_or_else(|_| {
        log::warn!("viewport size {value} clamped to {}", GLsizei::MAX);
        GLsizei::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::VertexBuffer;
    use crate::layout::{ScalarType, VertexBufferLayout};
    use crate::program::ProgramBuilder;
    use crate::testing::{Call, RecordingGl};

    fn setup() -> (Rc<GlContext<RecordingGl>>, VertexArray<RecordingGl>, Program<RecordingGl>) {
        let ctx = Rc::new(GlContext::new(RecordingGl::new()));
        let program = ProgramBuilder::new("v", "f").build(&ctx).unwrap();
        let va = VertexArray::new(&ctx);
        (ctx, va, program)
    }

    #[test]
    fn program_is_bound_for_every_draw() {
        let (ctx, va, program) = setup();
        let mut renderer = GlRenderer::new(&ctx);
        ctx.api().take_calls();

        renderer.draw_arrays(&va, &program, 3);
        renderer.draw_arrays(&va, &program, 3);

        let calls = ctx.api().calls();
        let binds = calls
            .iter()
            .filter(|c| matches!(c, Call::UseProgram(_)))
            .count();
        assert_eq!(binds, 2);
        assert_eq!(
            calls.last(),
            Some(&Call::DrawArrays {
                mode: gl::TRIANGLES,
                first: 0,
                count: 3
            })
        );
    }

    #[test]
    fn unbinding_between_draws_does_not_leave_program_zero() {
        let (ctx, va, program) = setup();
        let mut renderer = GlRenderer::new(&ctx);

        renderer.draw_arrays(&va, &program, 3);
        program.unbind();
        ctx.api().take_calls();
        renderer.draw_arrays(&va, &program, 3);

        assert_eq!(
            ctx.api().calls(),
            vec![
                Call::UseProgram(program.get_id()),
                Call::BindVertexArray(va.id()),
                Call::DrawArrays {
                    mode: gl::TRIANGLES,
                    first: 0,
                    count: 3
                },
            ]
        );
    }

    #[test]
    fn oversized_vertex_count_is_skipped() {
        let (ctx, va, program) = setup();
        let mut renderer = GlRenderer::new(&ctx);
        ctx.api().take_calls();

        renderer.draw_arrays(&va, &program, GLsizei::MAX as usize + 1);

        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn oversized_viewport_is_clamped() {
        let (ctx, _va, _program) = setup();
        let renderer = GlRenderer::new(&ctx);
        ctx.api().take_calls();

        renderer.resize(u32::MAX, 600);

        assert_eq!(
            ctx.api().calls(),
            vec![Call::Viewport(0, 0, GLsizei::MAX, 600)]
        );
    }

    #[test]
    fn indexed_draw_uses_index_count() {
        let (ctx, va, program) = setup();
        let vb = VertexBuffer::new(&ctx, &[0.0_f32; 8]);
        let layout = VertexBufferLayout::builder()
            .push(ScalarType::Float, 2)
            .build()
            .unwrap();
        va.add_buffer(&vb, &layout);
        let ib = IndexBuffer::new(&ctx, &[0, 1, 2, 2, 3, 0]);

        let mut renderer = GlRenderer::new(&ctx);
        ctx.api().take_calls();
        renderer.draw_indexed(&va, &ib, &program);

        assert_eq!(
            ctx.api().calls(),
            vec![
                Call::UseProgram(program.get_id()),
                Call::BindVertexArray(va.id()),
                Call::BindBuffer {
                    target: gl::ELEMENT_ARRAY_BUFFER,
                    id: ib.id()
                },
                Call::DrawElements {
                    mode: gl::TRIANGLES,
                    count: 6,
                    kind: gl::UNSIGNED_INT,
                    offset: 0
                },
            ]
        );
    }

    #[test]
    fn clear_sets_color_then_clears() {
        let (ctx, _va, _program) = setup();
        let renderer = GlRenderer::new(&ctx);
        ctx.api().take_calls();

        renderer.clear([0.1, 0.2, 0.3, 1.0]);
        renderer.resize(800, 600);

        assert_eq!(
            ctx.api().calls(),
            vec![
                Call::ClearColor([0.1, 0.2, 0.3, 1.0]),
                Call::Clear(gl::COLOR_BUFFER_BIT),
                Call::Viewport(0, 0, 800, 600),
            ]
        );
    }
}
