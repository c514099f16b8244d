use std::panic::Location;

use crate::api::{GlApi, NativeGl};
use crate::debug::{ErrorProbe, GlCallError};

/// A [`GlApi`] paired with the probe that checks every call made through it.
///
/// Wrapper objects keep an `Rc<GlContext>` so they can delete themselves on
/// drop; that also keeps them on the thread owning the context.
pub struct GlContext<A: GlApi = NativeGl> {
    api: A,
    probe: ErrorProbe,
}

impl<A: GlApi> GlContext<A> {
    pub fn new(api: A) -> Self {
        Self::with_probe(api, ErrorProbe::default())
    }

    pub fn with_probe(api: A, probe: ErrorProbe) -> Self {
        Self { api, probe }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn probe(&self) -> &ErrorProbe {
        &self.probe
    }

    /// Runs one GL call with error checking around it.
    ///
    /// `name` is the GL entry point, used in the report together with the
    /// caller's file and line.
    #[track_caller]
    pub fn call<T>(&self, name: &'static str, f: impl FnOnce(&A) -> T) -> T {
        self.probe.invoke(&self.api, name, Location::caller(), f)
    }

    /// Runs one GL call and returns its error instead of reporting it.
    #[track_caller]
    pub fn try_call<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&A) -> T,
    ) -> Result<T, GlCallError> {
        ErrorProbe::try_invoke(&self.api, name, Location::caller(), f).map_err(|(_, err)| err)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::debug::ErrorPolicy;
    use crate::testing::RecordingGl;

    #[test]
    fn call_reports_caller_line() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let probe = ErrorProbe::new(ErrorPolicy::Log)
            .with_sink(move |err| seen_clone.borrow_mut().push(err.clone()));

        let ctx = GlContext::with_probe(RecordingGl::new(), probe);
        ctx.api().fail_next("clear", gl::INVALID_VALUE);

        let line = line!() + 1;
        ctx.call("glClear", |api| api.clear(gl::COLOR_BUFFER_BIT));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].line, line);
        assert!(seen[0].file.ends_with("context.rs"));
    }

    #[test]
    fn try_call_propagates() {
        let ctx = GlContext::new(RecordingGl::new());
        ctx.api().fail_next("viewport", gl::INVALID_VALUE);

        let err = ctx
            .try_call("glViewport", |api| api.viewport(0, 0, -1, -1))
            .unwrap_err();
        assert_eq!(err.codes, vec![gl::INVALID_VALUE]);

        assert!(ctx.try_call("glViewport", |api| api.viewport(0, 0, 1, 1)).is_ok());
    }
}
