//! The instruction loop.

use std::rc::Rc;

use tracing::trace;

use super::Interpreter;
use crate::errors::{self, VmError, VmResult};
use crate::{Callable, Frame, Inst, Lambda, Program};

/// What the loop does after an instruction.
enum Flow {
    Next,
    Jump(usize),
    Return,
}

/// Pop right then left, push the result.
macro_rules! binary {
    ($vm:ident, $pop:ident, |$a:ident, $b:ident| $result:expr) => {{
        let $b = $vm.$pop()?;
        let $a = $vm.$pop()?;
        $vm.push($result);
    }};
}

macro_rules! unary {
    ($vm:ident, $pop:ident, |$a:ident| $result:expr) => {{
        let $a = $vm.$pop()?;
        $vm.push($result);
    }};
}

impl Interpreter {
    /// Execute `lambda` in `vars` until `ret`.
    pub(super) fn execute(&mut self, lambda: &Rc<Lambda>, vars: &Frame) -> VmResult<()> {
        let code = &lambda.code;
        let mut ip = 0usize;
        loop {
            let Some(inst) = code.get(ip) else {
                return Err(self.locate(errors::ip_out_of_range(ip), lambda, ip));
            };
            if self.trace_instructions {
                trace!(
                    offset = ip,
                    op = inst.opcode().mnemonic(),
                    stack = self.operands.len(),
                    "step"
                );
            }
            match self.step(inst, code, vars, ip) {
                Ok(Flow::Next) => ip += 1,
                Ok(Flow::Jump(target)) => ip = target,
                Ok(Flow::Return) => return Ok(()),
                Err(e) => return Err(self.locate(e, lambda, ip)),
            }
        }
    }

    #[allow(
        clippy::float_cmp,
        reason = "real comparison opcodes are exact by definition"
    )]
    fn step(
        &mut self,
        inst: &Inst,
        code: &Program,
        vars: &Frame,
        offset: usize,
    ) -> VmResult<Flow> {
        match inst {
            Inst::Pop => {
                self.pop()?;
            }
            Inst::IntPush(value) => self.push(*value),
            Inst::ConstPush(index) => {
                let item = code
                    .constant(*index)
                    .cloned()
                    .ok_or_else(|| errors::bad_constant(*index))?;
                self.push(item);
            }

            // Slots
            Inst::VarPush(n) => {
                let item = vars.get(*n).ok_or_else(|| errors::bad_slot("local", *n))?;
                self.push(item);
            }
            Inst::VarSave(n) => {
                let item = self.top()?.clone();
                if !vars.set(*n, item) {
                    return Err(errors::bad_slot("local", *n));
                }
            }
            Inst::GlobalPush(n) => {
                let item = self
                    .globals
                    .get(*n)
                    .ok_or_else(|| errors::bad_slot("global", *n))?;
                self.push(item);
            }
            Inst::GlobalSave(n) => {
                let item = self.top()?.clone();
                if !self.globals.set(*n, item) {
                    return Err(errors::bad_slot("global", *n));
                }
            }
            Inst::FieldPush(n) => {
                let frame = self.pop_frame()?.ok_or_else(errors::null_dereference)?;
                let item = frame.get(*n).ok_or_else(|| errors::bad_slot("field", *n))?;
                self.push(item);
            }
            Inst::FieldSave(n) => {
                let frame = self.pop_frame()?.ok_or_else(errors::null_dereference)?;
                let item = self.top()?.clone();
                if !frame.set(*n, item) {
                    return Err(errors::bad_slot("field", *n));
                }
            }

            // Identity
            Inst::MemEq => binary!(self, pop_frame, |a, b| Frame::same(a.as_ref(), b.as_ref())),
            Inst::MemNeq => binary!(self, pop_frame, |a, b| !Frame::same(a.as_ref(), b.as_ref())),
            Inst::FuncEq => binary!(self, pop_callable, |a, b| a.compare(&b)),
            Inst::FuncNeq => binary!(self, pop_callable, |a, b| !a.compare(&b)),

            // Integers wrap on overflow
            Inst::IPlus => binary!(self, pop_int, |a, b| a.wrapping_add(b)),
            Inst::IMinus => binary!(self, pop_int, |a, b| a.wrapping_sub(b)),
            Inst::ITimes => binary!(self, pop_int, |a, b| a.wrapping_mul(b)),
            Inst::IDivide => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                if b == 0 {
                    return Err(errors::division_by_zero());
                }
                self.push(a.wrapping_div(b));
            }
            Inst::INegate => unary!(self, pop_int, |a| a.wrapping_neg()),
            Inst::IIncr => unary!(self, pop_int, |a| a.wrapping_add(1)),
            Inst::IDecr => unary!(self, pop_int, |a| a.wrapping_sub(1)),
            Inst::IEq => binary!(self, pop_int, |a, b| a == b),
            Inst::INeq => binary!(self, pop_int, |a, b| a != b),
            Inst::IGt => binary!(self, pop_int, |a, b| a > b),
            Inst::IGe => binary!(self, pop_int, |a, b| a >= b),
            Inst::ILt => binary!(self, pop_int, |a, b| a < b),
            Inst::ILe => binary!(self, pop_int, |a, b| a <= b),

            // Reals
            Inst::FPlus => binary!(self, pop_real, |a, b| a + b),
            Inst::FMinus => binary!(self, pop_real, |a, b| a - b),
            Inst::FTimes => binary!(self, pop_real, |a, b| a * b),
            Inst::FDivide => {
                let b = self.pop_real()?;
                let a = self.pop_real()?;
                if b == 0.0 {
                    return Err(errors::division_by_zero());
                }
                self.push(a / b);
            }
            Inst::FNegate => unary!(self, pop_real, |a| -a),
            Inst::FEq => binary!(self, pop_real, |a, b| a == b),
            Inst::FNeq => binary!(self, pop_real, |a, b| a != b),
            Inst::FGt => binary!(self, pop_real, |a, b| a > b),
            Inst::FGe => binary!(self, pop_real, |a, b| a >= b),
            Inst::FLt => binary!(self, pop_real, |a, b| a < b),
            Inst::FLe => binary!(self, pop_real, |a, b| a <= b),

            // Booleans
            Inst::LogNot => unary!(self, pop_bool, |a| !a),
            Inst::LogEq => binary!(self, pop_bool, |a, b| a == b),
            Inst::LogNeq => binary!(self, pop_bool, |a, b| a != b),

            // Control
            Inst::Builtin(builtin) => {
                self.set_offset(offset);
                builtin.call(self)?;
                self.check_interrupt()?;
            }
            Inst::Jmp(target) => return self.jump(*target, offset),
            Inst::Cjmp(target) => {
                if self.pop_bool()? {
                    return self.jump(*target, offset);
                }
            }
            Inst::Njmp(target) => {
                if !self.pop_bool()? {
                    return self.jump(*target, offset);
                }
            }
            Inst::PopCall => {
                let callable = self.pop_callable()?;
                self.set_offset(offset);
                callable.call(self)?;
                self.check_interrupt()?;
            }
            Inst::PushClosure => self.push(vars.clone()),
            Inst::MakeFunc(lambda) => {
                let closure = self.pop_frame()?;
                self.push(Callable::func(Rc::clone(lambda), closure));
            }
            Inst::Ret => return Ok(Flow::Return),
            Inst::Alloc(record) => {
                let parent = self.pop_frame()?;
                self.set_offset(offset);
                self.alloc_record(record, parent)?;
            }
        }
        Ok(Flow::Next)
    }

    /// Backward jumps close loops, so they poll for interrupts.
    #[inline]
    fn jump(&self, target: usize, offset: usize) -> VmResult<Flow> {
        if target <= offset {
            self.check_interrupt()?;
        }
        Ok(Flow::Jump(target))
    }

    /// Attach the faulting instruction's position and a backtrace, unless a
    /// nested loop already did.
    fn locate(&mut self, err: VmError, lambda: &Lambda, offset: usize) -> VmError {
        if err.is_located() {
            return err;
        }
        self.set_offset(offset);
        let err = match lambda.pos_at(offset) {
            Some(pos) => err.with_pos(pos),
            None => err,
        };
        err.with_backtrace(self.capture_backtrace())
    }
}
