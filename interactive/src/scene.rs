use std::rc::Rc;

use gl_wrapper::buffer::{IndexBuffer, VertexBuffer};
use gl_wrapper::program::{Program, ProgramBuilder, ProgramError};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::vertex_array::VertexArray;
use gl_wrapper::{GlApi, GlContext, NativeGl};

use shapes_common::config::{Config, DrawMode};
use shapes_common::mesh::Mesh;
use shapes_common::shader_source::ShaderSource;

pub const COLOR_UNIFORM: &str = "u_Color";

/// GPU resources for the one shape on screen.
pub struct Scene<A: GlApi = NativeGl> {
    program: Program<A>,
    va: VertexArray<A>,
    _vb: VertexBuffer<A>,
    ib: Option<IndexBuffer<A>>,
    vertices: usize,
}

impl<A: GlApi> Scene<A> {
    /// Builds the shape picked by `config.mode` with the configured shader.
    ///
    /// A shader that cannot be read or built is logged and gives no scene;
    /// the frame loop then only clears the window.
    pub fn load(ctx: &Rc<GlContext<A>>, config: &Config) -> Option<Self> {
        let source = match ShaderSource::load_path(&config.shader) {
            Ok(source) => source,
            Err(e) => {
                log::error!("{e}, nothing will be drawn");
                return None;
            }
        };

        let mesh = match config.mode {
            DrawMode::Arrays => Mesh::triangle(),
            DrawMode::Indexed => Mesh::quad(),
        };

        match Self::new(ctx, &mesh, &source, config.render.shape_color) {
            Ok(scene) => Some(scene),
            Err(e) => {
                log::error!("{e}, nothing will be drawn");
                None
            }
        }
    }

    pub fn new(
        ctx: &Rc<GlContext<A>>,
        mesh: &Mesh,
        source: &ShaderSource,
        color: [f32; 4],
    ) -> Result<Self, ProgramError> {
        let program = ProgramBuilder::new(source.vertex.as_str(), source.fragment.as_str())
            .build(ctx)?;

        program.bind();
        program.set_uniform_4f(COLOR_UNIFORM, color);
        program.unbind();

        let va = VertexArray::new(ctx);
        let vb = VertexBuffer::new(ctx, mesh.vertices.as_slice());
        va.add_buffer(&vb, &mesh.layout);

        let ib = mesh
            .indices
            .as_ref()
            .map(|indices| IndexBuffer::new(ctx, indices));

        va.unbind();
        vb.unbind();

        log::info!(
            "scene ready: {} vertices, {}",
            mesh.vertex_count(),
            match &ib {
                Some(ib) => format!("{} indices", ib.count()),
                None => "no index buffer".to_string(),
            }
        );

        Ok(Self {
            program,
            va,
            _vb: vb,
            ib,
            vertices: mesh.vertex_count(),
        })
    }

    pub fn draw(&self, renderer: &mut GlRenderer<A>) {
        match &self.ib {
            Some(ib) => renderer.draw_indexed(&self.va, ib, &self.program),
            None => renderer.draw_arrays(&self.va, &self.program, self.vertices),
        }
    }
}
