use pretty_assertions::assert_eq;
use vgl_ir::SourcePos;
use vgl_vm::{silent_output, Callable, Inst, Item, ItemKind, Program, ProgramBuilder, VmErrorKind};

use super::*;

fn session_in(mode: ExecMode) -> Session {
    let vm = Interpreter::builder()
        .mode(mode)
        .globals(8)
        .output(silent_output())
        .build();
    Session::with_interpreter(vm, SharedInterner::new()).unwrap()
}

fn session() -> Session {
    session_in(ExecMode::Test)
}

/// Declares int global `name`, stores `value` in it, then runs `tail`.
fn declare(
    name: &'static str,
    value: i64,
    tail: Vec<Inst>,
) -> impl Fn(&mut Environment, &SymbolInterner) -> Result<Rc<Lambda>, Diagnostic> {
    move |env: &mut Environment, interner: &SymbolInterner| {
        let slot = env
            .define_global(interner.intern(name), ItemKind::Int)
            .map_err(|e| Diagnostic::resolve(&e, None, interner))?;
        let mut code = ProgramBuilder::new();
        code.mark(SourcePos::new(1, 1));
        code.emit(Inst::IntPush(value));
        code.emit(Inst::GlobalSave(slot));
        code.emit(Inst::Pop);
        for inst in &tail {
            code.emit(inst.clone());
        }
        code.emit(Inst::Ret);
        code.into_lambda(0, 1)
            .map(Rc::new)
            .map_err(|e| Diagnostic::compile(None, e.to_string()))
    }
}

fn divide_by_zero() -> Vec<Inst> {
    vec![Inst::IntPush(1), Inst::IntPush(0), Inst::IDivide]
}

#[test]
fn test_completed_unit_keeps_bindings() {
    let mut session = session();
    let status = session.run_unit(&declare("x", 5, vec![])).unwrap();
    assert_eq!(status, UnitStatus::Completed);

    let x = session.interner().intern("x");
    let entry = session.environment().lookup_var(x).unwrap();
    assert!(matches!(entry.access, crate::Access::Global(0)));
    assert_eq!(session.interpreter().globals().get(0), Some(Item::Int(5)));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_completed_units_do_not_deepen_scopes() {
    let mut session = session();
    let depth = session.environment().depth();
    let empty = |_: &mut Environment, _: &SymbolInterner| -> Result<Rc<Lambda>, Diagnostic> {
        let mut code = ProgramBuilder::new();
        code.emit(Inst::Ret);
        code.into_lambda(0, 1)
            .map(Rc::new)
            .map_err(|e| Diagnostic::compile(None, e.to_string()))
    };
    for _ in 0..1000 {
        assert_eq!(session.run_unit(&empty).unwrap(), UnitStatus::Completed);
    }
    assert_eq!(session.environment().depth(), depth);
    assert!(session.environment().vars().top_scope().is_empty());
}

#[test]
fn test_redeclared_global_replaces_earlier_one() {
    let mut session = session();
    session.run_unit(&declare("x", 5, vec![])).unwrap();
    let depth = session.environment().depth();
    session.run_unit(&declare("x", 6, vec![])).unwrap();

    let x = session.interner().intern("x");
    assert_eq!(session.environment().depth(), depth);
    assert_eq!(session.environment().vars().overloads(x).count(), 1);
    let entry = session.environment().lookup_var(x).unwrap();
    assert!(matches!(entry.access, crate::Access::Global(1)));
    assert_eq!(session.interpreter().globals().get(1), Some(Item::Int(6)));
    assert_eq!(session.environment().vars().top_scope(), &[x]);
}

#[test]
fn test_runtime_error_rolls_back_unit() {
    let mut session = session();
    session.run_unit(&declare("x", 5, vec![])).unwrap();
    let depth = session.environment().depth();

    let mut tail = vec![Inst::IntPush(9), Inst::GlobalSave(0), Inst::Pop];
    tail.extend(divide_by_zero());
    let status = session.run_unit(&declare("y", 7, tail)).unwrap();
    assert_eq!(status, UnitStatus::Failed);

    let y = session.interner().intern("y");
    assert!(session.environment().lookup_var(y).is_err());
    assert_eq!(session.environment().depth(), depth);
    assert_eq!(session.environment().globals_used(), 1);

    let globals = session.interpreter().globals();
    assert_eq!(globals.get(0), Some(Item::Int(5)));
    assert_eq!(globals.get(1), Some(Item::Void));
    assert_eq!(session.interpreter().depth(), 0);

    let diagnostics = session.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].to_string(), "1.1: runtime: divide by 0");
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Runtime);
    assert_eq!(diagnostics[0].backtrace, "stack backtrace:\n  0: <anonymous> at 1.1\n");
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_translation_failure_rolls_back_unit() {
    let mut session = session();
    let unit = |env: &mut Environment,
                interner: &SymbolInterner|
     -> Result<Rc<Lambda>, Diagnostic> {
        env.define_global(interner.intern("z"), ItemKind::Real)
            .map_err(|e| Diagnostic::resolve(&e, None, interner))?;
        Err(Diagnostic::compile(
            Some(SourcePos::new(2, 4)),
            "no matching function",
        ))
    };

    assert_eq!(session.run_unit(&unit).unwrap(), UnitStatus::Failed);
    let z = session.interner().intern("z");
    assert!(session.environment().lookup_var(z).is_err());
    assert_eq!(session.environment().globals_used(), 0);
    assert_eq!(
        session.diagnostics()[0].to_string(),
        "2.4: no matching function"
    );
}

#[test]
fn test_slot_exhaustion_is_a_compile_error() {
    let vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(1)
        .build();
    let mut session = Session::with_interpreter(vm, SharedInterner::new()).unwrap();

    assert_eq!(
        session.run_unit(&declare("a", 1, vec![])).unwrap(),
        UnitStatus::Completed
    );
    assert_eq!(
        session.run_unit(&declare("b", 2, vec![])).unwrap(),
        UnitStatus::Failed
    );
    assert_eq!(
        session.diagnostics()[0].to_string(),
        "cannot allocate 'b': all 1 global slots are in use"
    );
}

#[test]
fn test_interrupted_unit_is_silent() {
    fn raise(vm: &mut Interpreter) -> vgl_vm::VmResult<()> {
        vm.interrupt_flag().set();
        Ok(())
    }

    let mut session = session();
    let tail = vec![Inst::Builtin(vgl_vm::Builtin::new("raise", raise))];
    let status = session.run_unit(&declare("x", 1, tail)).unwrap();

    assert_eq!(status, UnitStatus::Interrupted);
    assert!(session.diagnostics().is_empty());
    assert!(!session.interrupt_flag().is_set());
    assert_eq!(session.interpreter().globals().get(0), Some(Item::Void));
}

#[test]
fn test_stack_overflow_is_fatal() {
    let vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(2)
        .max_call_depth(Some(16))
        .build();
    let mut session = Session::with_interpreter(vm, SharedInterner::new()).unwrap();

    let unit = |env: &mut Environment,
                interner: &SymbolInterner|
     -> Result<Rc<Lambda>, Diagnostic> {
        let slot = env
            .define_global(interner.intern("f"), ItemKind::Callable)
            .map_err(|e| Diagnostic::resolve(&e, None, interner))?;
        let recurse = Rc::new(Lambda::new(
            Program::from_parts(vec![Inst::GlobalPush(slot), Inst::PopCall, Inst::Ret], vec![]),
            0,
            1,
        ));
        let main = Lambda::new(
            Program::from_parts(
                vec![
                    Inst::ConstPush(0),
                    Inst::GlobalSave(slot),
                    Inst::PopCall,
                    Inst::Ret,
                ],
                vec![Item::from(Callable::func(recurse, None))],
            ),
            0,
            1,
        );
        Ok(Rc::new(main))
    };

    let err = session.run_unit(&unit).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::StackOverflow { limit: 16 });
    let f = session.interner().intern("f");
    assert!(session.environment().lookup_var(f).is_err());
    assert_eq!(session.interpreter().globals().get(0), Some(Item::Void));
    assert_eq!(session.interpreter().call_depth(), 0);
}

#[test]
fn test_batch_stops_at_first_failure() {
    let ok = declare("a", 1, vec![]);
    let bad = declare("b", 2, divide_by_zero());
    let later = declare("c", 3, vec![]);
    let units: [&dyn Unit; 3] = [&ok, &bad, &later];

    let mut batch = session_in(ExecMode::Batch);
    let summary = batch.run_units(&units).unwrap();
    assert_eq!(
        summary,
        RunSummary {
            completed: 1,
            failed: 1,
            interrupted: 0
        }
    );
    assert!(!summary.success());

    let mut interactive = session_in(ExecMode::Interactive);
    let summary = interactive.run_units(&units).unwrap();
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);

    let c = interactive.interner().intern("c");
    let entry = interactive.environment().lookup_var(c).unwrap();
    assert!(matches!(entry.access, crate::Access::Global(1)));
}

#[test]
fn test_list_variables() {
    let mut session = session();
    session.run_unit(&declare("x", 5, vec![])).unwrap();
    let listing = session.list_variables();

    assert!(listing.contains(&"x: int".to_string()));
    assert!(listing.contains(&"sqrt: (real) -> real".to_string()));
    assert!(listing.contains(&"operator +: (pair, pair) -> pair".to_string()));

    let names: Vec<&str> = listing
        .iter()
        .map(|line| line.split(": ").next().unwrap())
        .collect();
    assert!(names.windows(2).all(|w| w[0] <= w[1]));
}
