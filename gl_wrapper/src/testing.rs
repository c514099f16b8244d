//! A fake [`GlApi`] that records every call, for tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::ffi::CStr;

use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::api::GlApi;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenBuffer(GLuint),
    BindBuffer {
        target: GLenum,
        id: GLuint,
    },
    BufferData {
        target: GLenum,
        bytes: Vec<u8>,
        usage: GLenum,
    },
    DeleteBuffer(GLuint),
    GenVertexArray(GLuint),
    BindVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    EnableAttrib(GLuint),
    AttribPointer {
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },
    CreateShader {
        kind: GLenum,
        id: GLuint,
    },
    ShaderSource {
        id: GLuint,
        source: String,
    },
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader {
        program: GLuint,
        shader: GLuint,
    },
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    UniformLocation(String),
    Uniform4f {
        location: GLint,
        value: [f32; 4],
    },
    ClearColor([f32; 4]),
    Clear(GLenum),
    Viewport(GLint, GLint, GLsizei, GLsizei),
    DrawArrays {
        mode: GLenum,
        first: GLint,
        count: GLsizei,
    },
    DrawElements {
        mode: GLenum,
        count: GLsizei,
        kind: GLenum,
        offset: usize,
    },
}

#[derive(Default)]
pub struct RecordingGl {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<GLuint>,
    errors: RefCell<VecDeque<GLenum>>,
    fail_next: RefCell<Vec<(&'static str, GLenum)>>,
    failing_stage: Cell<Option<GLenum>>,
    failing_link: Cell<bool>,
    shader_kinds: RefCell<Vec<(GLuint, GLenum)>>,
    uniforms: RefCell<HashSet<String>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error code as if an earlier, unchecked call raised it.
    pub fn push_error(&self, code: GLenum) {
        self.errors.borrow_mut().push_back(code);
    }

    /// Raises `code` the next time `method` is called.
    pub fn fail_next(&self, method: &'static str, code: GLenum) {
        self.fail_next.borrow_mut().push((method, code));
    }

    /// Shaders of `kind` report a failed compile.
    pub fn fail_compile(&self, kind: GLenum) {
        self.failing_stage.set(Some(kind));
    }

    pub fn fail_link(&self) {
        self.failing_link.set(true);
    }

    pub fn with_uniform(self, name: &str) -> Self {
        self.uniforms.borrow_mut().insert(name.to_string());
        self
    }

    pub fn pending_errors(&self) -> Vec<GLenum> {
        self.errors.borrow().iter().copied().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, method: &'static str, call: Call) {
        self.calls.borrow_mut().push(call);

        let mut fail_next = self.fail_next.borrow_mut();
        if let Some(pos) = fail_next.iter().position(|(m, _)| *m == method) {
            let (_, code) = fail_next.remove(pos);
            self.errors.borrow_mut().push_back(code);
        }
    }

    fn new_id(&self) -> GLuint {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn shader_kind(&self, id: GLuint) -> Option<GLenum> {
        self.shader_kinds
            .borrow()
            .iter()
            .find(|(s, _)| *s == id)
            .map(|(_, kind)| *kind)
    }
}

impl GlApi for RecordingGl {
    fn get_error(&self) -> GLenum {
        self.errors.borrow_mut().pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn gen_buffer(&self) -> GLuint {
        let id = self.new_id();
        self.record("gen_buffer", Call::GenBuffer(id));
        id
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        self.record("bind_buffer", Call::BindBuffer { target, id });
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        self.record(
            "buffer_data",
            Call::BufferData {
                target,
                bytes: data.to_vec(),
                usage,
            },
        );
    }

    fn delete_buffer(&self, id: GLuint) {
        self.record("delete_buffer", Call::DeleteBuffer(id));
    }

    fn gen_vertex_array(&self) -> GLuint {
        let id = self.new_id();
        self.record("gen_vertex_array", Call::GenVertexArray(id));
        id
    }

    fn bind_vertex_array(&self, id: GLuint) {
        self.record("bind_vertex_array", Call::BindVertexArray(id));
    }

    fn delete_vertex_array(&self, id: GLuint) {
        self.record("delete_vertex_array", Call::DeleteVertexArray(id));
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record("enable_vertex_attrib_array", Call::EnableAttrib(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(
            "vertex_attrib_pointer",
            Call::AttribPointer {
                index,
                size,
                kind,
                normalized,
                stride,
                offset,
            },
        );
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        let id = self.new_id();
        self.shader_kinds.borrow_mut().push((id, kind));
        self.record("create_shader", Call::CreateShader { kind, id });
        id
    }

    fn shader_source(&self, id: GLuint, source: &CStr) {
        let source = source.to_string_lossy().to_string();
        self.record("shader_source", Call::ShaderSource { id, source });
    }

    fn compile_shader(&self, id: GLuint) {
        self.record("compile_shader", Call::CompileShader(id));
    }

    fn shader_compiled(&self, id: GLuint) -> bool {
        self.failing_stage.get().is_none() || self.failing_stage.get() != self.shader_kind(id)
    }

    fn shader_info_log(&self, _id: GLuint) -> String {
        "0:1(1): error: syntax error".to_string()
    }

    fn delete_shader(&self, id: GLuint) {
        self.record("delete_shader", Call::DeleteShader(id));
    }

    fn create_program(&self) -> GLuint {
        let id = self.new_id();
        self.record("create_program", Call::CreateProgram(id));
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record("attach_shader", Call::AttachShader { program, shader });
    }

    fn link_program(&self, program: GLuint) {
        self.record("link_program", Call::LinkProgram(program));
    }

    fn validate_program(&self, program: GLuint) {
        self.record("validate_program", Call::ValidateProgram(program));
    }

    fn program_status(&self, _program: GLuint, pname: GLenum) -> bool {
        !(pname == gl::LINK_STATUS && self.failing_link.get())
    }

    fn program_info_log(&self, _program: GLuint) -> String {
        "error: vertex output not consumed".to_string()
    }

    fn use_program(&self, program: GLuint) {
        self.record("use_program", Call::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record("delete_program", Call::DeleteProgram(program));
    }

    fn uniform_location(&self, _program: GLuint, name: &CStr) -> GLint {
        let name = name.to_string_lossy().to_string();
        let known = self.uniforms.borrow().contains(&name);
        self.record("uniform_location", Call::UniformLocation(name));

        if known {
            0
        } else {
            -1
        }
    }

    fn uniform_4f(&self, location: GLint, value: [f32; 4]) {
        self.record("uniform_4f", Call::Uniform4f { location, value });
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.record("clear_color", Call::ClearColor(color));
    }

    fn clear(&self, mask: GLenum) {
        self.record("clear", Call::Clear(mask));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record("viewport", Call::Viewport(x, y, width, height));
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record("draw_arrays", Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, offset: usize) {
        self.record(
            "draw_elements",
            Call::DrawElements {
                mode,
                count,
                kind,
                offset,
            },
        );
    }
}
