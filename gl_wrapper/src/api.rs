use std::ffi::{c_char, c_void, CStr};

use gl::types::{GLenum, GLint, GLsizei, GLsizeiptr, GLuint};

/// The subset of OpenGL used by the wrappers in this crate.
///
/// Everything above this trait talks to GL only through it, so error
/// checking can be layered on top and the wrappers can run against a fake
/// in tests. [`NativeGl`] is the real implementation.
pub trait GlApi {
    fn get_error(&self) -> GLenum;

    fn gen_buffer(&self) -> GLuint;
    fn bind_buffer(&self, target: GLenum, id: GLuint);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);
    fn delete_buffer(&self, id: GLuint);

    fn gen_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, id: GLuint);
    fn delete_vertex_array(&self, id: GLuint);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, id: GLuint, source: &CStr);
    fn compile_shader(&self, id: GLuint);
    fn shader_compiled(&self, id: GLuint) -> bool;
    fn shader_info_log(&self, id: GLuint) -> String;
    fn delete_shader(&self, id: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn validate_program(&self, program: GLuint);
    /// Queries a boolean program parameter such as `LINK_STATUS`.
    fn program_status(&self, program: GLuint, pname: GLenum) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);
    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_4f(&self, location: GLint, value: [f32; 4]);

    fn clear_color(&self, color: [f32; 4]);
    fn clear(&self, mask: GLenum);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, offset: usize);
}

/// Calls straight into the loaded `gl` function pointers.
///
/// A GL context must be current on the calling thread for any method to be
/// meaningful.
#[derive(Debug)]
pub struct NativeGl {
    _private: (),
}

impl NativeGl {
    /// Loads the GL function pointers through `loader`, usually the
    /// display's `get_proc_address`.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        Self { _private: () }
    }
}

impl GlApi for NativeGl {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut id = 0;
        unsafe {
            gl::GenBuffers(1, (&mut id) as *mut u32);
        }
        id
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindBuffer(target, id) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                usage,
            );
        }
    }

    fn delete_buffer(&self, id: GLuint) {
        unsafe { gl::DeleteBuffers(1, (&id) as *const u32) }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut id = 0;
        unsafe {
            gl::GenVertexArrays(1, (&mut id) as *mut u32);
        }
        id
    }

    fn bind_vertex_array(&self, id: GLuint) {
        unsafe { gl::BindVertexArray(id) }
    }

    fn delete_vertex_array(&self, id: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, (&id) as *const u32) }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
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
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };

        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                kind,
                normalized,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, id: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(
                id,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            );
        }
    }

    fn compile_shader(&self, id: GLuint) {
        unsafe { gl::CompileShader(id) }
    }

    fn shader_compiled(&self, id: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe {
            gl::GetShaderiv(id, gl::COMPILE_STATUS, (&mut success) as *mut i32);
        }
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, id: GLuint) -> String {
        let mut length: GLint = 0;
        unsafe {
            gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, (&mut length) as *mut i32);
        }

        let mut buf = vec![0_u8; length.max(1) as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                id,
                buf.len() as GLsizei,
                (&mut written) as *mut GLsizei,
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        log_to_string(buf, written)
    }

    fn delete_shader(&self, id: GLuint) {
        unsafe { gl::DeleteShader(id) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) }
    }

    fn program_status(&self, program: GLuint, pname: GLenum) -> bool {
        let mut success: GLint = 0;
        unsafe {
            gl::GetProgramiv(program, pname, (&mut success) as *mut i32);
        }
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut length: GLint = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, (&mut length) as *mut i32);
        }

        let mut buf = vec![0_u8; length.max(1) as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buf.len() as GLsizei,
                (&mut written) as *mut GLsizei,
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        log_to_string(buf, written)
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_4f(&self, location: GLint, value: [f32; 4]) {
        let [x, y, z, w] = value;
        unsafe { gl::Uniform4f(location, x, y, z, w) }
    }

    fn clear_color(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear(&self, mask: GLenum) {
        unsafe { gl::Clear(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, offset: usize) {
        unsafe { gl::DrawElements(mode, count, kind, offset as *const c_void) }
    }
}

fn log_to_string(mut buf: Vec<u8>, written: GLsizei) -> String {
    buf.truncate(written.max(0) as usize);

    String::from_utf8_lossy(&buf).trim_end().to_string()
}
