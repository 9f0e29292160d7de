//! Unit-at-a-time execution.
//!
//! A [`Unit`] is one top-level statement or file chunk that knows how to
//! translate itself into a codelet [`Lambda`] against the current
//! [`Environment`]. [`Session::run_unit`] gives every unit its own scope.
//! A unit that completes has its scope folded into the session scope, which
//! sits just above the core library, so its bindings stay visible and the
//! scope stack does not grow. A unit that fails has its bindings and global
//! writes rolled back so later units see the state from before it started.

mod diagnostic;

use std::rc::Rc;

use tracing::{debug, debug_span, warn};
use vgl_ir::{SharedInterner, SymbolInterner};
use vgl_table::ResolveError;
use vgl_vm::{ExecMode, Interpreter, InterruptFlag, Lambda, VmError};

pub use diagnostic::{Diagnostic, DiagnosticKind};

use crate::{install_builtins, Environment, Settings};

/// Something the session can translate and run.
pub trait Unit {
    /// Bind the unit's declarations in `env` and produce its code.
    fn translate(
        &self,
        env: &mut Environment,
        interner: &SymbolInterner,
    ) -> Result<Rc<Lambda>, Diagnostic>;
}

impl<F> Unit for F
where
    F: Fn(&mut Environment, &SymbolInterner) -> Result<Rc<Lambda>, Diagnostic>,
{
    fn translate(
        &self,
        env: &mut Environment,
        interner: &SymbolInterner,
    ) -> Result<Rc<Lambda>, Diagnostic> {
        self(env, interner)
    }
}

/// How a unit ended, when the session can keep going.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitStatus {
    Completed,
    /// Translation or a runtime error; a diagnostic was recorded.
    Failed,
    /// Stopped by the interrupt flag; no diagnostic.
    Interrupted,
}

/// Tally of a [`Session::run_units`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub interrupted: usize,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.interrupted == 0
    }
}

pub struct Session {
    interner: SharedInterner,
    env: Environment,
    vm: Interpreter,
    diagnostics: Vec<Diagnostic>,
    units_run: usize,
}

impl Session {
    /// A session configured from `settings`, with the core library
    /// installed.
    pub fn new(settings: &Settings) -> Result<Self, ResolveError> {
        Self::with_interpreter(settings.interpreter().build(), SharedInterner::new())
    }

    /// A session around an existing interpreter. The environment may
    /// allocate as many globals as the interpreter's globals frame holds.
    pub fn with_interpreter(
        vm: Interpreter,
        interner: SharedInterner,
    ) -> Result<Self, ResolveError> {
        let mut env = Environment::new(vm.globals().len());
        install_builtins(&mut env, &interner)?;
        // User declarations may shadow the library but never replace it.
        env.begin_scope();
        Ok(Session {
            interner,
            env,
            vm,
            diagnostics: Vec::new(),
            units_run: 0,
        })
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.vm
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.vm
    }

    /// Handle for cancelling the running unit from another thread.
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.vm.interrupt_flag().clone()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Translate and run one unit.
    ///
    /// Translation failures, runtime errors and interrupts roll the unit
    /// back and are reported through the returned status. Errors the
    /// session cannot recover from (stack overflow, malformed code) are
    /// returned after the rollback.
    pub fn run_unit(&mut self, unit: &dyn Unit) -> Result<UnitStatus, VmError> {
        self.units_run += 1;
        let span = debug_span!("unit", n = self.units_run);
        let _guard = span.enter();

        self.env.begin_scope();
        let lambda = match unit.translate(&mut self.env, &self.interner) {
            Ok(lambda) => lambda,
            Err(diagnostic) => {
                self.env.end_scope();
                warn!(%diagnostic, "unit rejected");
                self.diagnostics.push(diagnostic);
                return Ok(UnitStatus::Failed);
            }
        };

        debug!(globals = self.env.globals_used(), "running unit");
        let saved = self.vm.snapshot_globals();
        let Err(err) = self.vm.run_lambda(&lambda) else {
            self.env.merge_scope();
            debug!("unit completed");
            return Ok(UnitStatus::Completed);
        };

        self.env.end_scope();
        self.vm.restore_globals(saved);
        self.vm.reset_operands();

        if !err.category().is_recoverable() {
            warn!(error = %err, category = ?err.category(), "unit aborted session");
            return Err(err);
        }
        if err.is_interrupt() {
            self.vm.interrupt_flag().clear();
            debug!("unit interrupted");
            return Ok(UnitStatus::Interrupted);
        }

        let diagnostic = Diagnostic::runtime(&err, &self.interner);
        warn!(%diagnostic, "unit failed");
        self.diagnostics.push(diagnostic);
        Ok(UnitStatus::Failed)
    }

    /// Run `units` in order.
    ///
    /// In batch mode the first failed unit ends the run; interactive and
    /// test sessions carry on.
    pub fn run_units(&mut self, units: &[&dyn Unit]) -> Result<RunSummary, VmError> {
        let keep_going = self.vm.mode().continues_after_error();
        let mut summary = RunSummary::default();
        for unit in units {
            match self.run_unit(*unit)? {
                UnitStatus::Completed => summary.completed += 1,
                UnitStatus::Failed => {
                    summary.failed += 1;
                    if !keep_going {
                        break;
                    }
                }
                UnitStatus::Interrupted => {
                    summary.interrupted += 1;
                    if !keep_going {
                        break;
                    }
                }
            }
        }
        debug!(?summary, "units finished");
        Ok(summary)
    }

    /// Every live variable and function, one per line as `name: signature`,
    /// sorted by name.
    pub fn list_variables(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for symbol in self.env.vars().completions("", &*self.interner) {
            let name = self.interner.lookup(symbol);
            for entry in self.env.vars().overloads(symbol) {
                lines.push(format!("{name}: {}", entry.signature));
            }
        }
        lines
    }

    pub fn mode(&self) -> ExecMode {
        self.vm.mode()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
