use std::fmt;

use vgl_ir::SourcePos;

use super::{Inst, Program};
use crate::{Item, Lambda, PositionTable};

/// Handle to a jump target, placed at most once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(usize);

/// Which jump instruction to emit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// `jmp`
    Always,
    /// `cjmp`: taken when the popped bool is true.
    IfTrue,
    /// `njmp`: taken when the popped bool is false.
    IfFalse,
}

/// Failure to assemble a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramError {
    /// A jump refers to a label that was never placed.
    UnplacedLabel { label: usize },
    /// A label was placed a second time.
    LabelPlacedTwice { label: usize },
    /// The constant pool overflowed its index type.
    TooManyConstants,
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnplacedLabel { label } => write!(f, "jump to label {label} that was never placed"),
            Self::LabelPlacedTwice { label } => write!(f, "label {label} placed twice"),
            Self::TooManyConstants => write!(f, "constant pool is full"),
        }
    }
}

impl std::error::Error for ProgramError {}

/// Incremental assembler for one lambda body.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    code: Vec<Inst>,
    constants: Vec<Item>,
    labels: Vec<Option<usize>>,
    /// Jump instructions awaiting their label's offset.
    fixups: Vec<(usize, Label)>,
    positions: PositionTable,
    error: Option<ProgramError>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next instruction will get.
    #[inline]
    pub fn here(&self) -> usize {
        self.code.len()
    }

    /// Append an instruction, returning its offset.
    pub fn emit(&mut self, inst: Inst) -> usize {
        let at = self.code.len();
        self.code.push(inst);
        at
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the next instruction's offset.
    pub fn place(&mut self, label: Label) {
        let here = self.here();
        match self.labels.get_mut(label.0) {
            Some(slot @ None) => *slot = Some(here),
            Some(Some(_)) => self.fail(ProgramError::LabelPlacedTwice { label: label.0 }),
            None => self.fail(ProgramError::UnplacedLabel { label: label.0 }),
        }
    }

    /// A new label placed at the next instruction.
    pub fn label_here(&mut self) -> Label {
        let label = self.new_label();
        self.place(label);
        label
    }

    /// Emit a jump to `label`, which may be placed later.
    pub fn jump(&mut self, kind: JumpKind, label: Label) -> usize {
        let inst = match kind {
            JumpKind::Always => Inst::Jmp(usize::MAX),
            JumpKind::IfTrue => Inst::Cjmp(usize::MAX),
            JumpKind::IfFalse => Inst::Njmp(usize::MAX),
        };
        let at = self.emit(inst);
        self.fixups.push((at, label));
        at
    }

    /// Add `item` to the constant pool and emit a push of it.
    pub fn push_constant(&mut self, item: Item) -> usize {
        match u32::try_from(self.constants.len()) {
            Ok(index) => {
                self.constants.push(item);
                self.emit(Inst::ConstPush(index))
            }
            Err(_) => {
                self.fail(ProgramError::TooManyConstants);
                self.here()
            }
        }
    }

    /// Attribute code emitted from here on to `pos`.
    pub fn mark(&mut self, pos: SourcePos) {
        let here = self.here();
        self.positions.push(here, pos);
    }

    fn fail(&mut self, error: ProgramError) {
        self.error.get_or_insert(error);
    }

    /// Resolve every jump and return the program with its position table.
    pub fn finish(mut self) -> Result<(Program, PositionTable), ProgramError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        for &(at, label) in &self.fixups {
            let target = self
                .labels
                .get(label.0)
                .copied()
                .flatten()
                .ok_or(ProgramError::UnplacedLabel { label: label.0 })?;
            if let Some(Inst::Jmp(t) | Inst::Cjmp(t) | Inst::Njmp(t)) = self.code.get_mut(at) {
                *t = target;
            }
        }
        Ok((Program::from_parts(self.code, self.constants), self.positions))
    }

    /// Finish into a lambda taking `params` arguments in `vars` slots.
    pub fn into_lambda(self, params: usize, vars: usize) -> Result<Lambda, ProgramError> {
        let (code, positions) = self.finish()?;
        Ok(Lambda::new(code, params, vars).with_positions(positions))
    }
}
