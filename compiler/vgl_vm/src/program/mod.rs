//! Instruction streams.
//!
//! A [`Program`] is a flat vector of [`Inst`] plus a constant pool. Jump
//! operands are absolute instruction indices into the same program. Code is
//! assembled with [`ProgramBuilder`], which hands out [`Label`]s that can be
//! jumped to before they are placed.

mod builder;
mod opcode;

use std::rc::Rc;

pub use builder::{JumpKind, Label, ProgramBuilder, ProgramError};
pub use opcode::Opcode;

use crate::{Builtin, Item, Lambda, Record};

/// One instruction, operands inline.
#[derive(Clone, Debug)]
pub enum Inst {
    Pop,
    IntPush(i64),
    /// Push constant-pool entry.
    ConstPush(u32),
    VarPush(usize),
    /// Store the top of the stack into a local slot, leaving it in place.
    VarSave(usize),
    GlobalPush(usize),
    GlobalSave(usize),
    /// Pop a frame and push its slot.
    FieldPush(usize),
    /// Pop a frame and store the top of the stack into its slot.
    FieldSave(usize),

    MemEq,
    MemNeq,
    FuncEq,
    FuncNeq,

    IPlus,
    IMinus,
    ITimes,
    IDivide,
    INegate,
    IIncr,
    IDecr,
    IEq,
    INeq,
    IGt,
    IGe,
    ILt,
    ILe,

    FPlus,
    FMinus,
    FTimes,
    FDivide,
    FNegate,
    FEq,
    FNeq,
    FGt,
    FGe,
    FLt,
    FLe,

    LogNot,
    LogEq,
    LogNeq,

    Builtin(Builtin),
    Jmp(usize),
    /// Jump if the popped bool is true.
    Cjmp(usize),
    /// Jump if the popped bool is false.
    Njmp(usize),
    PopCall,
    PushClosure,
    /// Pop a closure frame and push a function over the lambda.
    MakeFunc(Rc<Lambda>),
    Ret,
    /// Pop a parent frame and instantiate the record.
    Alloc(Rc<Record>),
}

impl Inst {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::Pop => Opcode::Pop,
            Inst::IntPush(_) => Opcode::IntPush,
            Inst::ConstPush(_) => Opcode::ConstPush,
            Inst::VarPush(_) => Opcode::VarPush,
            Inst::VarSave(_) => Opcode::VarSave,
            Inst::GlobalPush(_) => Opcode::GlobalPush,
            Inst::GlobalSave(_) => Opcode::GlobalSave,
            Inst::FieldPush(_) => Opcode::FieldPush,
            Inst::FieldSave(_) => Opcode::FieldSave,
            Inst::MemEq => Opcode::MemEq,
            Inst::MemNeq => Opcode::MemNeq,
            Inst::FuncEq => Opcode::FuncEq,
            Inst::FuncNeq => Opcode::FuncNeq,
            Inst::IPlus => Opcode::IPlus,
            Inst::IMinus => Opcode::IMinus,
            Inst::ITimes => Opcode::ITimes,
            Inst::IDivide => Opcode::IDivide,
            Inst::INegate => Opcode::INegate,
            Inst::IIncr => Opcode::IIncr,
            Inst::IDecr => Opcode::IDecr,
            Inst::IEq => Opcode::IEq,
            Inst::INeq => Opcode::INeq,
            Inst::IGt => Opcode::IGt,
            Inst::IGe => Opcode::IGe,
            Inst::ILt => Opcode::ILt,
            Inst::ILe => Opcode::ILe,
            Inst::FPlus => Opcode::FPlus,
            Inst::FMinus => Opcode::FMinus,
            Inst::FTimes => Opcode::FTimes,
            Inst::FDivide => Opcode::FDivide,
            Inst::FNegate => Opcode::FNegate,
            Inst::FEq => Opcode::FEq,
            Inst::FNeq => Opcode::FNeq,
            Inst::FGt => Opcode::FGt,
            Inst::FGe => Opcode::FGe,
            Inst::FLt => Opcode::FLt,
            Inst::FLe => Opcode::FLe,
            Inst::LogNot => Opcode::LogNot,
            Inst::LogEq => Opcode::LogEq,
            Inst::LogNeq => Opcode::LogNeq,
            Inst::Builtin(_) => Opcode::Builtin,
            Inst::Jmp(_) => Opcode::Jmp,
            Inst::Cjmp(_) => Opcode::Cjmp,
            Inst::Njmp(_) => Opcode::Njmp,
            Inst::PopCall => Opcode::PopCall,
            Inst::PushClosure => Opcode::PushClosure,
            Inst::MakeFunc(_) => Opcode::MakeFunc,
            Inst::Ret => Opcode::Ret,
            Inst::Alloc(_) => Opcode::Alloc,
        }
    }

    /// Jump target, for the three jump instructions.
    pub fn jump_target(&self) -> Option<usize> {
        match *self {
            Inst::Jmp(t) | Inst::Cjmp(t) | Inst::Njmp(t) => Some(t),
            _ => None,
        }
    }
}

/// Assembled instruction stream and its constant pool.
#[derive(Clone, Debug, Default)]
pub struct Program {
    code: Vec<Inst>,
    constants: Vec<Item>,
}

impl Program {
    /// Build a program from raw parts. Jump targets are taken as given.
    pub fn from_parts(code: Vec<Inst>, constants: Vec<Item>) -> Self {
        Program { code, constants }
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<&Inst> {
        self.code.get(offset)
    }

    #[inline]
    pub fn constant(&self, index: u32) -> Option<&Item> {
        self.constants.get(index as usize)
    }

    pub fn insts(&self) -> &[Inst] {
        &self.code
    }

    pub fn constants(&self) -> &[Item] {
        &self.constants
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
