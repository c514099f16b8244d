use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    WindowReady,
    ContextReady,
    Running,
    Terminated,
}

impl State {
    fn next(self) -> Option<State> {
        match self {
            State::Uninitialized => Some(State::WindowReady),
            State::WindowReady => Some(State::ContextReady),
            State::ContextReady => Some(State::Running),
            State::Running => Some(State::Terminated),
            State::Terminated => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid lifecycle transition {from:?} -> {to:?}")]
pub struct LifecycleError {
    pub from: State,
    pub to: State,
}

/// Tracks how far application start-up got, and whether it has shut down.
///
/// States only move forward one step at a time, except that any live state
/// can jump to `Terminated`.
#[derive(Debug)]
pub struct Lifecycle {
    state: State,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn advance(&mut self, to: State) -> Result<(), LifecycleError> {
        let allowed = self.state.next() == Some(to)
            || (to == State::Terminated && self.state != State::Terminated);

        if !allowed {
            return Err(LifecycleError {
                from: self.state,
                to,
            });
        }

        log::debug!("{:?} -> {:?}", self.state, to);
        self.state = to;

        Ok(())
    }

    /// Moves to `Terminated` unless already there.
    pub fn terminate(&mut self) {
        if self.state != State::Terminated {
            log::debug!("{:?} -> {:?}", self.state, State::Terminated);
            self.state = State::Terminated;
        }
    }

    /// Terminates because of `err`, handing it back for propagation.
    pub fn fail<E: Display>(&mut self, err: E) -> E {
        log::debug!("start-up failed in {:?}: {err}", self.state);
        self.terminate();
        err
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
