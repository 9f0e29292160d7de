use super::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use vgl_ir::SourcePos;

#[test]
fn test_mnemonic_table_covers_every_opcode() {
    let names: HashSet<_> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
    assert_eq!(names.len(), Opcode::ALL.len());
    assert!(!names.contains("<<invalid op>>"));

    for (i, op) in Opcode::ALL.iter().enumerate() {
        assert_eq!(usize::from(op.ordinal()), i);
        assert_eq!(Opcode::from_ordinal(op.ordinal()), Some(*op));
    }
    assert_eq!(Opcode::from_ordinal(200), None);
}

#[test]
fn test_inst_opcode_mnemonics() {
    assert_eq!(Inst::IntPush(3).opcode().mnemonic(), "intpush");
    assert_eq!(Inst::FieldSave(1).opcode().mnemonic(), "fieldsave");
    assert_eq!(Inst::LogNeq.opcode().mnemonic(), "log_neq");
    assert_eq!(Inst::Ret.opcode(), Opcode::Ret);
}

#[test]
fn test_forward_and_backward_labels_resolve() {
    let mut b = ProgramBuilder::new();
    let top = b.label_here();
    let end = b.new_label();
    b.emit(Inst::IntPush(1));
    b.jump(JumpKind::IfTrue, end);
    b.jump(JumpKind::Always, top);
    b.place(end);
    b.emit(Inst::Ret);

    let (program, _) = b.finish().unwrap();
    assert_eq!(program.len(), 4);
    assert_eq!(program.get(1).and_then(Inst::jump_target), Some(3));
    assert_eq!(program.get(2).and_then(Inst::jump_target), Some(0));
}

#[test]
fn test_unplaced_label_is_an_error() {
    let mut b = ProgramBuilder::new();
    let nowhere = b.new_label();
    b.jump(JumpKind::IfFalse, nowhere);
    assert_eq!(
        b.finish().unwrap_err(),
        ProgramError::UnplacedLabel { label: 0 }
    );
}

#[test]
fn test_label_placed_twice_is_an_error() {
    let mut b = ProgramBuilder::new();
    let l = b.label_here();
    b.emit(Inst::Pop);
    b.place(l);
    assert_eq!(
        b.finish().unwrap_err(),
        ProgramError::LabelPlacedTwice { label: 0 }
    );
}

#[test]
fn test_constants_and_positions() {
    let mut b = ProgramBuilder::new();
    b.mark(SourcePos::new(1, 1));
    b.push_constant(Item::from("hello"));
    b.mark(SourcePos::new(2, 3));
    b.push_constant(Item::Real(1.5));
    b.emit(Inst::Ret);

    let lambda = b.into_lambda(0, 1).unwrap();
    assert!(matches!(lambda.code.get(1), Some(Inst::ConstPush(1))));
    assert_eq!(lambda.code.constant(0), Some(&Item::from("hello")));
    assert_eq!(lambda.code.constant(2), None);
    assert_eq!(lambda.pos_at(0), Some(SourcePos::new(1, 1)));
    assert_eq!(lambda.pos_at(2), Some(SourcePos::new(2, 3)));
}

#[test]
fn test_position_lookup_before_first_entry() {
    let mut table = crate::PositionTable::new();
    table.push(2, SourcePos::new(4, 1));
    table.push(5, SourcePos::new(6, 2));
    table.push(5, SourcePos::new(7, 2));
    assert_eq!(table.len(), 2);
    assert_eq!(table.lookup(0), None);
    assert_eq!(table.lookup(2), Some(SourcePos::new(4, 1)));
    assert_eq!(table.lookup(4), Some(SourcePos::new(4, 1)));
    assert_eq!(table.lookup(99), Some(SourcePos::new(7, 2)));
}

#[test]
fn test_lambda_frame_fits_parameters() {
    let lambda = crate::Lambda::new(Program::default(), 3, 0);
    assert_eq!(lambda.vars, 4);
    assert_eq!(crate::Lambda::new(Program::default(), 1, 6).vars, 6);
}
