//! Textual dumps of instruction streams.
//!
//! One line per instruction: the offset right-aligned to four columns, the
//! mnemonic, then the operand. Slots and immediates print in decimal,
//! constant-pool indices in hex, jump targets as `i` plus four digits.
//!
//! ```text
//!    0 globalpush 1
//!    1 njmp i0004
//!    2 constpush 0x0
//!    3 jmp i0005
//!    4 builtin write
//!    5 ret
//! ```

use std::fmt::{self, Write};

use vgl_ir::SymbolLookup;

use crate::{Inst, Program};

/// Write the instruction at `offset`, without a trailing newline.
pub fn print_inst<W, L>(out: &mut W, program: &Program, offset: usize, lookup: &L) -> fmt::Result
where
    W: Write + ?Sized,
    L: SymbolLookup + ?Sized,
{
    let Some(inst) = program.get(offset) else {
        return write!(out, "{offset:>4} <<invalid op>>");
    };
    write!(out, "{offset:>4} {}", inst.opcode().mnemonic())?;
    match inst {
        Inst::IntPush(value) => write!(out, " {value}"),
        Inst::ConstPush(index) => write!(out, " 0x{index:x}"),
        Inst::VarPush(n)
        | Inst::VarSave(n)
        | Inst::GlobalPush(n)
        | Inst::GlobalSave(n)
        | Inst::FieldPush(n)
        | Inst::FieldSave(n) => write!(out, " {n}"),
        Inst::Builtin(builtin) => write!(out, " {}", builtin.name()),
        Inst::Jmp(target) | Inst::Cjmp(target) | Inst::Njmp(target) => {
            write!(out, " i{target:04}")
        }
        Inst::MakeFunc(lambda) => match lambda.name {
            Some(name) => write!(out, " {}", lookup.lookup(name)),
            None => write!(out, " <lambda>"),
        },
        Inst::Alloc(record) => write!(out, " {}", lookup.lookup(record.name)),
        _ => Ok(()),
    }
}

/// Write every instruction from offset 0 through the first `ret`.
pub fn print<W, L>(out: &mut W, program: &Program, lookup: &L) -> fmt::Result
where
    W: Write + ?Sized,
    L: SymbolLookup + ?Sized,
{
    for (offset, inst) in program.insts().iter().enumerate() {
        print_inst(out, program, offset, lookup)?;
        out.write_char('\n')?;
        if matches!(inst, Inst::Ret) {
            break;
        }
    }
    Ok(())
}

/// [`print`] into a fresh string.
pub fn disassemble<L: SymbolLookup + ?Sized>(program: &Program, lookup: &L) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = print(&mut out, program, lookup);
    out
}
