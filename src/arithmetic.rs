//! The process-wide `floatSimplification` toggle (spec §5, §9).
//!
//! The simplifier itself takes `float_simplification` as a plain
//! argument (spec §9: "keep `floatSimplification` as configuration
//! threaded into the simplifier as an argument"); this module is the
//! opt-in convenience wrapper around a shared default for callers — like
//! the CLI — that want one. `scoped` guarantees the previous value is
//! restored on every exit path, including early returns via `?`, since
//! restoration happens in the guard's `Drop`.

use std::cell::Cell;

thread_local! {
    static FLOAT_SIMPLIFICATION: Cell<bool> = Cell::new(false);
}

/// Reads the current process-wide default.
pub fn float_simplification() -> bool {
    FLOAT_SIMPLIFICATION.with(|cell| cell.get())
}

/// A scope guard that restores the previous `floatSimplification` value
/// when dropped.
pub struct Guard {
    previous: bool,
}

impl Drop for Guard {
    fn drop(&mut self) {
        FLOAT_SIMPLIFICATION.with(|cell| cell.set(self.previous));
    }
}

/// Sets the process-wide default to `value` for as long as the returned
/// guard lives (spec §5: "Callers MUST scope mutations with guaranteed
/// restoration on every exit path"). The approximator uses this to force
/// floats on for the duration of its run.
pub fn scoped(value: bool) -> Guard {
    let previous = FLOAT_SIMPLIFICATION.with(|cell| cell.replace(value));
    Guard { previous }
}
