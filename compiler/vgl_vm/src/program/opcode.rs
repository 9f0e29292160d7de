/// Fieldless mirror of [`Inst`](super::Inst), ordinal-indexed into the
/// mnemonic table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Pop,
    IntPush,
    ConstPush,
    VarPush,
    VarSave,
    GlobalPush,
    GlobalSave,
    FieldPush,
    FieldSave,
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
    Builtin,
    Jmp,
    Cjmp,
    Njmp,
    PopCall,
    PushClosure,
    MakeFunc,
    Ret,
    Alloc,
}

/// Mnemonics in opcode order.
const MNEMONICS: &[&str] = &[
    "pop",
    "intpush",
    "constpush",
    "varpush",
    "varsave",
    "globalpush",
    "globalsave",
    "fieldpush",
    "fieldsave",
    "mem_eq",
    "mem_neq",
    "func_eq",
    "func_neq",
    "i_plus",
    "i_minus",
    "i_times",
    "i_divide",
    "i_negate",
    "i_incr",
    "i_decr",
    "i_eq",
    "i_neq",
    "i_gt",
    "i_ge",
    "i_lt",
    "i_le",
    "f_plus",
    "f_minus",
    "f_times",
    "f_divide",
    "f_negate",
    "f_eq",
    "f_neq",
    "f_gt",
    "f_ge",
    "f_lt",
    "f_le",
    "log_not",
    "log_eq",
    "log_neq",
    "builtin",
    "jmp",
    "cjmp",
    "njmp",
    "popcall",
    "pushclosure",
    "makefunc",
    "ret",
    "alloc",
];

impl Opcode {
    /// Every opcode, in ordinal order.
    pub const ALL: [Opcode; 49] = [
        Opcode::Pop,
        Opcode::IntPush,
        Opcode::ConstPush,
        Opcode::VarPush,
        Opcode::VarSave,
        Opcode::GlobalPush,
        Opcode::GlobalSave,
        Opcode::FieldPush,
        Opcode::FieldSave,
        Opcode::MemEq,
        Opcode::MemNeq,
        Opcode::FuncEq,
        Opcode::FuncNeq,
        Opcode::IPlus,
        Opcode::IMinus,
        Opcode::ITimes,
        Opcode::IDivide,
        Opcode::INegate,
        Opcode::IIncr,
        Opcode::IDecr,
        Opcode::IEq,
        Opcode::INeq,
        Opcode::IGt,
        Opcode::IGe,
        Opcode::ILt,
        Opcode::ILe,
        Opcode::FPlus,
        Opcode::FMinus,
        Opcode::FTimes,
        Opcode::FDivide,
        Opcode::FNegate,
        Opcode::FEq,
        Opcode::FNeq,
        Opcode::FGt,
        Opcode::FGe,
        Opcode::FLt,
        Opcode::FLe,
        Opcode::LogNot,
        Opcode::LogEq,
        Opcode::LogNeq,
        Opcode::Builtin,
        Opcode::Jmp,
        Opcode::Cjmp,
        Opcode::Njmp,
        Opcode::PopCall,
        Opcode::PushClosure,
        Opcode::MakeFunc,
        Opcode::Ret,
        Opcode::Alloc,
    ];

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Opcode with the given ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Opcode> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    /// Disassembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        MNEMONICS
            .get(usize::from(self.ordinal()))
            .copied()
            .unwrap_or("<<invalid op>>")
    }
}
