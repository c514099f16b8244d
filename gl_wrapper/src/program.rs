use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use gl::types::{GLenum, GLint, GLuint};
use thiserror::Error;

use crate::api::{GlApi, NativeGl};
use crate::context::GlContext;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(&self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

pub struct ProgramBuilder {
    vert: String,
    frag: String,
}

impl ProgramBuilder {
    pub fn new(vert_src: impl Into<String>, frag_src: impl Into<String>) -> Self {
        Self {
            vert: vert_src.into(),
            frag: frag_src.into(),
        }
    }

    /// Compiles both stages, then links and validates them into a program.
    pub fn build<A: GlApi>(self, ctx: &Rc<GlContext<A>>) -> Result<Program<A>, ProgramError> {
        let vert = compile(ctx, ShaderStage::Vertex, &self.vert)?;
        let frag = match compile(ctx, ShaderStage::Fragment, &self.frag) {
            Ok(frag) => frag,
            Err(e) => {
                ctx.call("glDeleteShader", |api| api.delete_shader(vert));
                return Err(e);
            }
        };

        let id = ctx.call("glCreateProgram", |api| api.create_program());
        ctx.call("glAttachShader", |api| api.attach_shader(id, vert));
        ctx.call("glAttachShader", |api| api.attach_shader(id, frag));
        ctx.call("glLinkProgram", |api| api.link_program(id));

        // shaders are flagged for deletion, they live on while attached
        ctx.call("glDeleteShader", |api| api.delete_shader(vert));
        ctx.call("glDeleteShader", |api| api.delete_shader(frag));

        let program = Program {
            ctx: Rc::clone(ctx),
            id,
            uniforms: RefCell::new(HashMap::new()),
        };

        if !ctx.call("glGetProgramiv", |api| api.program_status(id, gl::LINK_STATUS)) {
            let log = ctx.call("glGetProgramInfoLog", |api| api.program_info_log(id));
            return Err(ProgramError::Linking(log));
        }

        ctx.call("glValidateProgram", |api| api.validate_program(id));
        if !ctx.call("glGetProgramiv", |api| {
            api.program_status(id, gl::VALIDATE_STATUS)
        }) {
            let log = ctx.call("glGetProgramInfoLog", |api| api.program_info_log(id));
            return Err(ProgramError::Validation(log));
        }

        log::debug!("linked program {id}");

        Ok(program)
    }
}

fn compile<A: GlApi>(
    ctx: &GlContext<A>,
    stage: ShaderStage,
    src: &str,
) -> Result<GLuint, ProgramError> {
    let src = CString::new(src).map_err(|_| ProgramError::InvalidSource(stage))?;

    let id = ctx.call("glCreateShader", |api| api.create_shader(stage.gl_enum()));
    ctx.call("glShaderSource", |api| api.shader_source(id, &src));
    ctx.call("glCompileShader", |api| api.compile_shader(id));

    if !ctx.call("glGetShaderiv", |api| api.shader_compiled(id)) {
        let log = ctx.call("glGetShaderInfoLog", |api| api.shader_info_log(id));
        ctx.call("glDeleteShader", |api| api.delete_shader(id));

        log::error!("failed to compile {stage} shader:\n{log}");

        return Err(ProgramError::Compilation { stage, log });
    }

    Ok(id)
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to compile {stage} shader: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("failed to link program: {0}")]
    Linking(String),
    #[error("program failed validation: {0}")]
    Validation(String),
    #[error("{0} shader source contains a NUL byte")]
    InvalidSource(ShaderStage),
}

pub struct Program<A: GlApi = NativeGl> {
    ctx: Rc<GlContext<A>>,
    id: GLuint,
    uniforms: RefCell<HashMap<String, GLint>>,
}

impl<A: GlApi> Program<A> {
    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn bind(&self) {
        self.ctx.call("glUseProgram", |api| api.use_program(self.id));
    }

    pub fn unbind(&self) {
        self.ctx.call("glUseProgram", |api| api.use_program(0));
    }

    /// Sets a `vec4` uniform. The program must be bound.
    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) {
        let Some(location) = self.uniform_location(name) else {
            return;
        };

        self.ctx
            .call("glUniform4f", |api| api.uniform_4f(location, value));
    }

    fn uniform_location(&self, name: &str) -> Option<GLint> {
        if let Some(location) = self.uniforms.borrow().get(name) {
            return (*location != -1).then_some(*location);
        }

        let location = match CString::new(name) {
            Ok(c_name) => self
                .ctx
                .call("glGetUniformLocation", |api| api.uniform_location(self.id, &c_name)),
            Err(_) => -1,
        };

        if location == -1 {
            log::warn!("uniform '{name}' not found in program {}", self.id);
        }

        self.uniforms.borrow_mut().insert(name.to_string(), location);

        (location != -1).then_some(location)
    }
}

impl<A: GlApi> Drop for Program<A> {
    fn drop(&mut self) {
        self.ctx.call("glDeleteProgram", |api| api.delete_program(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingGl};

    const VERT: &str = "#version 330 core\nlayout(location = 0) in vec4 position;\nvoid main() { gl_Position = position; }\n";
    const FRAG: &str = "#version 330 core\nlayout(location = 0) out vec4 color;\nuniform vec4 u_Color;\nvoid main() { color = u_Color; }\n";

    #[test]
    fn builds_and_cleans_up_intermediate_shaders() {
        let ctx = Rc::new(GlContext::new(RecordingGl::new()));
        let program = ProgramBuilder::new(VERT, FRAG).build(&ctx).unwrap();

        let calls = ctx.api().calls();
        let shaders: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateShader { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(shaders.len(), 2);

        for shader in &shaders {
            assert!(calls.contains(&Call::AttachShader {
                program: program.get_id(),
                shader: *shader
            }));
            assert!(calls.contains(&Call::DeleteShader(*shader)));
        }
        assert!(calls.contains(&Call::ValidateProgram(program.get_id())));
        assert!(calls.contains(&Call::ShaderSource {
            id: shaders[0],
            source: VERT.to_string()
        }));
    }

    #[test]
    fn compile_failure_names_stage_and_deletes_shader() {
        let ctx = Rc::new(GlContext::new(RecordingGl::new()));
        ctx.api().fail_compile(gl::FRAGMENT_SHADER);

        let err = ProgramBuilder::new(VERT, FRAG).build(&ctx).err().unwrap();

        match err {
            ProgramError::Compilation { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("syntax error"));
            }
            e => panic!("unexpected error {e}"),
        }

        let calls = ctx.api().calls();
        let created = calls
            .iter()
            .filter(|c| matches!(c, Call::CreateShader { .. }))
            .count();
        let deleted = calls
            .iter()
            .filter(|c| matches!(c, Call::DeleteShader(_)))
            .count();
        assert_eq!(created, 2);
        assert_eq!(deleted, 2);
        assert!(!calls.iter().any(|c| matches!(c, Call::CreateProgram(_))));
    }

    #[test]
    fn link_failure_deletes_program() {
        let ctx = Rc::new(GlContext::new(RecordingGl::new()));
        ctx.api().fail_link();

        let err = ProgramBuilder::new(VERT, FRAG).build(&ctx).err().unwrap();
        assert!(matches!(err, ProgramError::Linking(_)));

        let calls = ctx.api().calls();
        assert!(matches!(calls.last(), Some(Call::DeleteProgram(_))));
    }

    #[test]
    fn nul_in_source_is_rejected() {
        let ctx = Rc::new(GlContext::new(RecordingGl::new()));
        let err = ProgramBuilder::new("void main() {}\0", FRAG)
            .build(&ctx)
            .err()
            .unwrap();

        assert!(matches!(err, ProgramError::InvalidSource(ShaderStage::Vertex)));
    }

    #[test]
    fn uniform_location_is_looked_up_once() {
        let ctx = Rc::new(GlContext::new(RecordingGl::new().with_uniform("u_Color")));
        let program = ProgramBuilder::new(VERT, FRAG).build(&ctx).unwrap();
        program.bind();
        ctx.api().take_calls();

        program.set_uniform_4f("u_Color", [0.2, 0.3, 0.8, 1.0]);
        program.set_uniform_4f("u_Color", [1.0, 0.0, 0.0, 1.0]);
        program.set_uniform_4f("u_Missing", [1.0, 0.0, 0.0, 1.0]);
        program.set_uniform_4f("u_Missing", [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(
            ctx.api().calls(),
            vec![
                Call::UniformLocation("u_Color".to_string()),
                Call::Uniform4f {
                    location: 0,
                    value: [0.2, 0.3, 0.8, 1.0]
                },
                Call::Uniform4f {
                    location: 0,
                    value: [1.0, 0.0, 0.0, 1.0]
                },
                Call::UniformLocation("u_Missing".to_string()),
            ]
        );
    }
}
