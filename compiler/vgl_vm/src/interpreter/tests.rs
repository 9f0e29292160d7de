use std::rc::Rc;

use pretty_assertions::assert_eq;
use vgl_ir::{SourcePos, SymbolInterner};

use super::*;
use crate::builtins::int_abs;
use crate::errors::{ErrorCategory, VmErrorKind};
use crate::{Inst, PositionTable, Program};

fn vm() -> Interpreter {
    Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(4)
        .build()
}

fn lambda(code: Vec<Inst>, params: usize, vars: usize) -> Rc<Lambda> {
    Rc::new(Lambda::new(Program::from_parts(code, Vec::new()), params, vars))
}

fn lambda_with_constants(code: Vec<Inst>, constants: Vec<Item>) -> Rc<Lambda> {
    Rc::new(Lambda::new(Program::from_parts(code, constants), 0, 1))
}

fn run(vm: &mut Interpreter, code: Vec<Inst>) -> VmResult<()> {
    vm.run_lambda(&lambda(code, 0, 4))
}

#[test]
fn test_arguments_fill_slots_in_order() {
    let mut vm = vm();
    let body = lambda(vec![Inst::PushClosure, Inst::Ret], 3, 5);
    vm.push(10i64);
    vm.push(20i64);
    vm.push(30i64);

    vm.run_lambda(&body).unwrap();

    let frame = vm.pop_frame().unwrap().unwrap();
    assert_eq!(vm.depth(), 0);
    assert_eq!(frame.len(), 5);
    assert_eq!(frame.get(0), Some(Item::null_frame()));
    assert_eq!(frame.get(1), Some(Item::Int(10)));
    assert_eq!(frame.get(2), Some(Item::Int(20)));
    assert_eq!(frame.get(3), Some(Item::Int(30)));
    assert_eq!(frame.get(4), Some(Item::Void));
}

#[test]
fn test_missing_arguments_underflow() {
    let mut vm = vm();
    vm.push(1i64);
    let err = vm.run_lambda(&lambda(vec![Inst::Ret], 2, 3)).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::StackUnderflow);
}

#[test]
fn test_binary_ops_pop_right_then_left() {
    let mut vm = vm();
    run(
        &mut vm,
        vec![
            Inst::IntPush(10),
            Inst::IntPush(3),
            Inst::IMinus,
            Inst::IntPush(-7),
            Inst::IntPush(2),
            Inst::IDivide,
            Inst::IntPush(2),
            Inst::IntPush(5),
            Inst::ILt,
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(
        vm.operands(),
        &[Item::Int(7), Item::Int(-3), Item::Bool(true)]
    );
}

#[test]
fn test_real_ops() {
    let mut vm = vm();
    let body = lambda_with_constants(
        vec![
            Inst::ConstPush(0),
            Inst::ConstPush(1),
            Inst::FDivide,
            Inst::FNegate,
            Inst::ConstPush(1),
            Inst::FGe,
            Inst::Ret,
        ],
        vec![Item::Real(1.0), Item::Real(4.0)],
    );
    vm.run_lambda(&body).unwrap();
    assert_eq!(vm.operands(), &[Item::Bool(false)]);
}

#[test]
fn test_integer_arithmetic_wraps() {
    let mut vm = vm();
    run(
        &mut vm,
        vec![Inst::IntPush(i64::MAX), Inst::IIncr, Inst::Ret],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(i64::MIN)]);
}

#[test]
fn test_integer_division_by_zero_leaves_empty_stack() {
    let mut vm = vm();
    let err = run(
        &mut vm,
        vec![Inst::IntPush(5), Inst::IntPush(0), Inst::IDivide, Inst::Ret],
    )
    .unwrap_err();
    assert_eq!(err.kind, VmErrorKind::DivisionByZero);
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert_eq!(vm.depth(), 0);
}

#[test]
fn test_real_division_by_zero_leaves_empty_stack() {
    let mut vm = vm();
    let body = lambda_with_constants(
        vec![Inst::ConstPush(0), Inst::ConstPush(1), Inst::FDivide, Inst::Ret],
        vec![Item::Real(5.0), Item::Real(0.0)],
    );
    let err = vm.run_lambda(&body).unwrap_err();
    assert_eq!(err.message, "divide by 0");
    assert_eq!(vm.depth(), 0);
}

#[test]
fn test_locals_and_globals() {
    let mut vm = vm();
    run(
        &mut vm,
        vec![
            Inst::IntPush(4),
            Inst::VarSave(1),
            Inst::GlobalSave(2),
            Inst::Pop,
            Inst::VarPush(1),
            Inst::IDecr,
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(3)]);
    assert_eq!(vm.globals().get(2), Some(Item::Int(4)));
}

#[test]
fn test_record_field_round_trip() {
    let interner = SymbolInterner::new();
    let point = interner.intern("point");
    // Store 42 into field 1 of the new instance.
    let init = lambda(
        vec![
            Inst::IntPush(42),
            Inst::VarPush(0),
            Inst::FieldSave(1),
            Inst::Pop,
            Inst::Ret,
        ],
        0,
        1,
    );
    let record = Rc::new(Record::new(point, 3, init));

    let mut vm = vm();
    run(
        &mut vm,
        vec![
            Inst::PushClosure,
            Inst::Alloc(Rc::clone(&record)),
            Inst::FieldPush(1),
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(42)]);
}

#[test]
fn test_instantiate_links_parent_and_pushes_instance() {
    let interner = SymbolInterner::new();
    let init = lambda(
        vec![Inst::IntPush(7), Inst::VarPush(0), Inst::FieldSave(2), Inst::Pop, Inst::Ret],
        0,
        1,
    );
    let record = Rc::new(Record::new(interner.intern("box"), 3, init));
    let parent = Frame::new(1);

    let mut vm = vm();
    let instance = vm.instantiate(&record, Some(parent.clone())).unwrap();

    assert!(instance.link().is_some_and(|l| Frame::ptr_eq(&l, &parent)));
    assert_eq!(instance.get(2), Some(Item::Int(7)));
    assert_eq!(vm.operands(), &[Item::from(instance)]);
}

#[test]
fn test_null_record_field_access() {
    let mut vm = vm();
    let mut positions = PositionTable::new();
    positions.push(0, SourcePos::new(3, 1));
    positions.push(1, SourcePos::new(3, 7));
    let body = Rc::new(
        Lambda::new(
            Program::from_parts(
                vec![Inst::ConstPush(0), Inst::FieldPush(1), Inst::Ret],
                vec![Item::null_frame()],
            ),
            0,
            1,
        )
        .with_positions(positions),
    );

    let err = vm.run_lambda(&body).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::NullDereference);
    assert_eq!(err.pos, Some(SourcePos::new(3, 7)));
    assert_eq!(err.to_string(), "3.7: dereference of null pointer");
}

#[test]
fn test_null_function_compare_and_call() {
    let abs = Callable::builtin("int_abs", int_abs);
    let f = Callable::func(lambda(vec![Inst::Ret], 0, 1), None);

    assert!(Callable::Null.compare(&Callable::Null));
    assert!(!abs.compare(&Callable::Null));
    assert!(!f.compare(&Callable::Null));
    assert!(!Callable::Null.compare(&f));

    let mut vm = vm();
    let err = vm.run(&Callable::Null).unwrap_err();
    assert_eq!(err.message, "dereference of null function");

    let body = lambda_with_constants(
        vec![Inst::ConstPush(0), Inst::PopCall, Inst::Ret],
        vec![Item::Callable(Callable::Null)],
    );
    let err = vm.run_lambda(&body).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::NullFunction);
}

#[test]
fn test_function_identity() {
    let body = lambda(vec![Inst::Ret], 0, 1);
    let closure = Frame::new(1);
    let a = Callable::func(Rc::clone(&body), Some(closure.clone()));
    let b = Callable::func(Rc::clone(&body), Some(closure));
    let c = Callable::func(Rc::clone(&body), Some(Frame::new(1)));
    let other = Callable::func(lambda(vec![Inst::Ret], 0, 1), None);

    assert!(a.compare(&b));
    assert!(!a.compare(&c));
    assert!(!other.compare(&Callable::func(lambda(vec![Inst::Ret], 0, 1), None)));

    let abs = Callable::builtin("int_abs", int_abs);
    assert!(abs.compare(&Callable::builtin("abs", int_abs)));

    let thunk = Callable::thunk(abs, Item::Int(1));
    assert!(!thunk.compare(&thunk.clone()));
}

#[test]
fn test_func_eq_opcode() {
    let mut vm = vm();
    let abs = Callable::builtin("int_abs", int_abs);
    let body = lambda_with_constants(
        vec![
            Inst::ConstPush(0),
            Inst::ConstPush(0),
            Inst::FuncEq,
            Inst::ConstPush(0),
            Inst::ConstPush(1),
            Inst::FuncNeq,
            Inst::Ret,
        ],
        vec![Item::from(abs), Item::Callable(Callable::Null)],
    );
    vm.run_lambda(&body).unwrap();
    assert_eq!(vm.operands(), &[Item::Bool(true), Item::Bool(true)]);
}

#[test]
fn test_thunk_pushes_bound_argument() {
    let mut vm = vm();
    let thunk = Callable::thunk(Callable::builtin("int_abs", int_abs), Item::Int(-3));
    vm.run(&thunk).unwrap();
    assert_eq!(vm.operands(), &[Item::Int(3)]);
}

#[test]
fn test_closure_reads_enclosing_frame() {
    // inner: push slot 1 of its closure
    let inner = lambda(vec![Inst::VarPush(0), Inst::FieldPush(1), Inst::Ret], 0, 1);
    let mut vm = vm();
    run(
        &mut vm,
        vec![
            Inst::IntPush(7),
            Inst::VarSave(1),
            Inst::Pop,
            Inst::PushClosure,
            Inst::MakeFunc(inner),
            Inst::PopCall,
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(7)]);
}

#[test]
fn test_conditional_jumps() {
    let mut vm = vm();
    // if (1 == 2) push 10 else push 20
    run(
        &mut vm,
        vec![
            Inst::IntPush(1),
            Inst::IntPush(2),
            Inst::IEq,
            Inst::Njmp(6),
            Inst::IntPush(10),
            Inst::Jmp(7),
            Inst::IntPush(20),
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(20)]);
}

#[test]
fn test_counting_loop() {
    let mut vm = vm();
    // slot 1 counts down from 3, slot 2 counts iterations
    run(
        &mut vm,
        vec![
            Inst::IntPush(3),
            Inst::VarSave(1),
            Inst::Pop,
            Inst::IntPush(0),
            Inst::VarSave(2),
            Inst::Pop,
            // loop: offset 6
            Inst::VarPush(1),
            Inst::IntPush(0),
            Inst::IGt,
            Inst::Njmp(19),
            Inst::VarPush(1),
            Inst::IDecr,
            Inst::VarSave(1),
            Inst::Pop,
            Inst::VarPush(2),
            Inst::IIncr,
            Inst::VarSave(2),
            Inst::Pop,
            Inst::Jmp(6),
            // end: offset 19
            Inst::VarPush(2),
            Inst::Ret,
        ],
    )
    .unwrap();
    assert_eq!(vm.operands(), &[Item::Int(3)]);
}

#[test]
fn test_interrupt_after_builtin() {
    fn raise(vm: &mut Interpreter) -> VmResult<()> {
        vm.interrupt_flag().set();
        Ok(())
    }

    let mut vm = vm();
    let err = run(
        &mut vm,
        vec![
            Inst::Builtin(crate::Builtin::new("raise", raise)),
            Inst::IntPush(1),
            Inst::Ret,
        ],
    )
    .unwrap_err();
    assert!(err.is_interrupt());
    assert_eq!(err.category(), ErrorCategory::Cancelled);
    assert_eq!(vm.depth(), 0);
    assert!(vm.interrupt_flag().is_set());
}

#[test]
fn test_interrupt_breaks_infinite_loop() {
    let flag = InterruptFlag::new();
    let mut vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .interrupt(flag.clone())
        .build();
    flag.set();
    let err = run(&mut vm, vec![Inst::Jmp(0)]).unwrap_err();
    assert!(err.is_interrupt());
}

#[test]
fn test_runaway_recursion_is_a_stack_overflow() {
    let mut vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(1)
        .max_call_depth(Some(64))
        .build();
    let recurse = lambda(vec![Inst::GlobalPush(0), Inst::PopCall, Inst::Ret], 0, 1);
    assert!(vm
        .globals()
        .set(0, Item::from(Callable::func(Rc::clone(&recurse), None))));

    let err = vm.run_lambda(&recurse).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::StackOverflow { limit: 64 });
    assert_eq!(err.category(), ErrorCategory::Resource);
    assert_eq!(vm.call_depth(), 0);
}

#[test]
fn test_type_errors() {
    let mut vm = vm();
    let err = run(&mut vm, vec![Inst::IntPush(1), Inst::LogNot, Inst::Ret]).unwrap_err();
    assert_eq!(
        err.kind,
        VmErrorKind::TypeMismatch {
            expected: ItemKind::Bool,
            got: ItemKind::Int
        }
    );

    let err = run(&mut vm, vec![Inst::VarPush(2), Inst::IIncr, Inst::Ret]).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::Uninitialized);

    let err = run(&mut vm, vec![Inst::Pop, Inst::Ret]).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::StackUnderflow);
}

#[test]
fn test_malformed_programs_are_internal_errors() {
    let mut vm = vm();
    let err = run(&mut vm, vec![Inst::IntPush(1)]).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::IpOutOfRange { ip: 1 });
    assert_eq!(err.category(), ErrorCategory::Internal);

    let err = run(&mut vm, vec![Inst::VarPush(99), Inst::Ret]).unwrap_err();
    assert_eq!(
        err.kind,
        VmErrorKind::BadSlot {
            space: "local",
            slot: 99
        }
    );

    let err = run(&mut vm, vec![Inst::ConstPush(3), Inst::Ret]).unwrap_err();
    assert_eq!(err.kind, VmErrorKind::BadConstant { index: 3 });
}

#[test]
fn test_backtrace_names_nested_calls() {
    let interner = SymbolInterner::new();
    let outer_name = interner.intern("outer");
    let inner_name = interner.intern("inner");

    let mut inner_positions = PositionTable::new();
    inner_positions.push(0, SourcePos::new(2, 3));
    let inner = Rc::new(
        Lambda::new(
            Program::from_parts(vec![Inst::Pop, Inst::Ret], Vec::new()),
            0,
            1,
        )
        .with_positions(inner_positions)
        .with_name(inner_name),
    );

    let mut outer_positions = PositionTable::new();
    outer_positions.push(0, SourcePos::new(9, 1));
    let outer = Rc::new(
        Lambda::new(
            Program::from_parts(
                vec![Inst::PushClosure, Inst::MakeFunc(inner), Inst::PopCall, Inst::Ret],
                Vec::new(),
            ),
            0,
            1,
        )
        .with_positions(outer_positions)
        .with_name(outer_name),
    );

    let mut vm = vm();
    let err = vm.run_lambda(&outer).unwrap_err();
    assert_eq!(err.pos, Some(SourcePos::new(2, 3)));
    let backtrace = err.backtrace.unwrap();
    assert_eq!(
        backtrace.render(&interner),
        "stack backtrace:\n  0: inner at 2.3\n  1: outer at 9.1\n"
    );
    assert_eq!(vm.call_depth(), 0);
}

#[test]
fn test_draw_summarizes_state() {
    let mut vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(2)
        .build();
    vm.push(1i64);
    vm.push(true);
    assert!(vm.globals().set(1, Item::Real(0.5)));
    assert_eq!(
        vm.draw(),
        "operands (2): Int(1) Bool(true)\nvars:\nactivations: 0 (depth 0)\nglobals: void real\n"
    );
}

fn draw_to_output(vm: &mut Interpreter) -> VmResult<()> {
    let state = vm.draw();
    vm.output().print(&state);
    Ok(())
}

#[test]
fn test_draw_shows_running_frame() {
    let mut vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .output(crate::buffer_output())
        .build();
    let body = lambda(
        vec![
            Inst::Builtin(crate::Builtin::new("draw", draw_to_output)),
            Inst::Ret,
        ],
        2,
        4,
    );
    vm.push(7i64);
    vm.push(0.5);
    vm.run_func(&body, Some(Frame::new(1))).unwrap();

    let drawn = vm.output().captured();
    let lines: Vec<&str> = drawn.lines().collect();
    assert_eq!(lines[0], "operands (0):");
    assert_eq!(lines[1], "vars: link int real void");
    assert_eq!(lines[2], "activations: 1 (depth 1)");
}

#[test]
fn test_draw_caps_long_lines() {
    let mut vm = Interpreter::builder()
        .mode(ExecMode::Test)
        .globals(12)
        .output(crate::buffer_output())
        .build();
    for i in 0..12i64 {
        vm.push(i);
    }
    let body = lambda(
        vec![
            Inst::Builtin(crate::Builtin::new("draw", draw_to_output)),
            Inst::Ret,
        ],
        12,
        13,
    );
    vm.run_lambda(&body).unwrap();

    let drawn = vm.output().captured();
    let lines: Vec<&str> = drawn.lines().collect();
    assert_eq!(lines[1], format!("vars: 0{} ...", " int".repeat(9)));
    assert_eq!(lines[3], format!("globals:{} ...", " void".repeat(10)));
}

#[test]
fn test_globals_snapshot_restore() {
    let mut vm = vm();
    let saved = vm.snapshot_globals();
    run(&mut vm, vec![Inst::IntPush(5), Inst::GlobalSave(0), Inst::Ret]).unwrap();
    assert_eq!(vm.globals().get(0), Some(Item::Int(5)));
    vm.restore_globals(saved);
    assert_eq!(vm.globals().get(0), Some(Item::Void));
    vm.reset_operands();
    assert_eq!(vm.depth(), 0);
}
