use std::fmt::Write;
use std::panic::Location;

use gl::types::GLenum;
use thiserror::Error;

use crate::api::GlApi;

/// Upper bound on codes drained in one go. Without a current context
/// `glGetError` is allowed to never return `NO_ERROR`.
pub const MAX_DRAINED_ERRORS: usize = 64;

/// Error codes raised by a single checked GL call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[OpenGL Error] ({}): {call} {file}:{line}", format_codes(.codes))]
pub struct GlCallError {
    pub codes: Vec<GLenum>,
    pub call: &'static str,
    pub file: &'static str,
    pub line: u32,
}

/// What happens after an error has been handed to the sink.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Report and keep going.
    #[default]
    Log,
    /// Report, then panic so a debugger stops at the offending call.
    Halt,
}

pub type ErrorSink = Box<dyn Fn(&GlCallError)>;

/// Clears pending errors before a call and checks for new ones after it.
pub struct ErrorProbe {
    policy: ErrorPolicy,
    sink: ErrorSink,
}

impl ErrorProbe {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            sink: Box::new(|err| log::error!("{err}")),
        }
    }

    /// Replaces the default `log::error!` reporting.
    pub fn with_sink(mut self, sink: impl Fn(&GlCallError) + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Drains every pending error code, returning how many were discarded.
    pub fn clear<A: GlApi>(api: &A) -> usize {
        drain(api).len()
    }

    /// Drains pending error codes and attributes them to `call`.
    pub fn check<A: GlApi>(
        api: &A,
        call: &'static str,
        location: &'static Location<'static>,
    ) -> Result<(), GlCallError> {
        let codes = drain(api);

        if codes.is_empty() {
            Ok(())
        } else {
            Err(GlCallError {
                codes,
                call,
                file: location.file(),
                line: location.line(),
            })
        }
    }

    /// Clear, invoke, check. Errors go through [`ErrorProbe::report`].
    pub fn invoke<A, T, F>(
        &self,
        api: &A,
        call: &'static str,
        location: &'static Location<'static>,
        f: F,
    ) -> T
    where
        A: GlApi,
        F: FnOnce(&A) -> T,
    {
        match Self::try_invoke(api, call, location, f) {
            Ok(value) => value,
            Err((value, err)) => {
                self.report(&err);
                value
            }
        }
    }

    /// Like [`ErrorProbe::invoke`], but hands the error back instead of
    /// reporting it. The call's return value is kept either way.
    #[allow(clippy::type_complexity)]
    pub fn try_invoke<A, T, F>(
        api: &A,
        call: &'static str,
        location: &'static Location<'static>,
        f: F,
    ) -> Result<T, (T, GlCallError)>
    where
        A: GlApi,
        F: FnOnce(&A) -> T,
    {
        let stale = Self::clear(api);
        if stale > 0 {
            log::trace!("discarded {stale} stale GL error(s) before {call}");
        }

        let value = f(api);

        match Self::check(api, call, location) {
            Ok(()) => Ok(value),
            Err(err) => Err((value, err)),
        }
    }

    /// Hands `err` to the sink. Under [`ErrorPolicy::Halt`] this panics,
    /// unless the thread is already unwinding (e.g. a wrapper deleting its
    /// GL object on drop), where a second panic would abort.
    pub fn report(&self, err: &GlCallError) {
        (self.sink)(err);

        if self.policy == ErrorPolicy::Halt && !std::thread::panicking() {
            panic!("halting on GL error: {err}");
        }
    }
}

impl Default for ErrorProbe {
    fn default() -> Self {
        Self::new(ErrorPolicy::default())
    }
}

fn drain<A: GlApi>(api: &A) -> Vec<GLenum> {
    let mut codes = Vec::new();

    while codes.len() < MAX_DRAINED_ERRORS {
        match api.get_error() {
            gl::NO_ERROR => break,
            code => codes.push(code),
        }
    }

    codes
}

/// Symbolic name of a `glGetError` code.
pub fn error_name(code: GLenum) -> &'static str {
    match code {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "unknown",
    }
}

fn format_codes(codes: &[GLenum]) -> String {
    let mut out = String::new();

    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{code:#06x} {}", error_name(*code));
    }

    out
}
