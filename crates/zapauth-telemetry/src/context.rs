//! Process-wide span carrying the run identifier.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the run-level span entered for the lifetime of the process.
pub struct RunContextGuard {
    _guard: Entered<'static>,
}

impl RunContextGuard {
    /// Enter the `run` span tagged with `run_id`, the target and the build SHA.
    #[must_use]
    pub fn new(run_id: impl Into<String>, target: impl Into<String>) -> Self {
        let run_id = run_id.into();
        let target = target.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "run",
            run_id = %run_id,
            target_url = %target,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_context_guard_enters_and_exits() {
        let guard = RunContextGuard::new("run-1", "http://localhost:3000");
        drop(guard);
    }
}
