//! Opcode descriptor tables.
//!
//! Each of the 256 opcode bytes maps to a descriptor carrying the
//! mnemonic, the operation, the destination and source operand patterns,
//! the operand width and the string flag. The decoder walks the patterns
//! to know which bytes to fetch; the executor dispatches on the
//! operation. A second eight-entry table resolves the `0x80-0x83`
//! immediate group through the ModR/M `reg` field.

use crate::registers::{AH, AL, AX, BH, BL, BP, BX, CH, CL, CS, CX, DH, DI, DL, DS, DX, ES, SI, SP, SS};

/// Condition tested by a conditional jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cond {
    O,
    No,
    B,
    Ae,
    E,
    Ne,
    Be,
    A,
    S,
    Ns,
    P,
    Np,
    L,
    Ge,
    Le,
    G,
}

impl Cond {
    /// Evaluate the condition against a FLAGS word.
    pub(crate) fn holds(self, flags: u16) -> bool {
        use crate::flags::{CF, OF, PF, SF, ZF};
        let cf = flags & CF != 0;
        let zf = flags & ZF != 0;
        let sf = flags & SF != 0;
        let of = flags & OF != 0;
        let pf = flags & PF != 0;
        match self {
            Self::O => of,
            Self::No => !of,
            Self::B => cf,
            Self::Ae => !cf,
            Self::E => zf,
            Self::Ne => !zf,
            Self::Be => cf || zf,
            Self::A => !cf && !zf,
            Self::S => sf,
            Self::Ns => !sf,
            Self::P => pf,
            Self::Np => !pf,
            Self::L => sf != of,
            Self::Ge => sf == of,
            Self::Le => sf != of || zf,
            Self::G => sf == of && !zf,
        }
    }
}

/// Executor operation selected by an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Add,
    Adc,
    Sub,
    Sbb,
    Cmp,
    And,
    Or,
    Xor,
    Test,
    Inc,
    Dec,
    Daa,
    Das,
    Aaa,
    Aas,
    Cbw,
    Cwd,
    Mov,
    Xchg,
    Lea,
    Lds,
    Les,
    Push,
    Pop,
    Pushf,
    Popf,
    Sahf,
    Lahf,
    Jcc(Cond),
    CallNear,
    CallFar,
    JmpNear,
    JmpFar,
    RetNear,
    RetFar,
    Wait,
    /// `0x80-0x83`: real operation comes from the ModR/M `reg` field.
    ImmGroup,
    Clc,
    Stc,
    Cmc,
    Cld,
    Std,
    Cli,
    Sti,
    /// Prefix bytes; intercepted in the Ready stage, never executed.
    Prefix,
    Illegal,
}

/// How an operand is located, before decoding resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pattern {
    /// Fixed 16-bit GPR by ModR/M index.
    Reg16(u8),
    /// Fixed 8-bit register by ModR/M byte index.
    Reg8(u8),
    /// Fixed segment register by ModR/M index.
    Seg(u8),
    /// Immediate of the opcode's width.
    Imm,
    /// 8-bit immediate sign-extended to a word (`0x83` only).
    Imm8,
    /// ModR/M r/m field: register or memory.
    Rm,
    /// ModR/M reg field: GPR.
    Reg,
    /// ModR/M reg field: segment register.
    SReg,
    /// 16-bit direct address following the opcode.
    Addr,
    /// Far segment:offset immediate (CALL/JMP far).
    SegOff,
    /// String source `DS:SI` (segment override allowed).
    StrSrc,
    /// String destination `ES:DI` (never overridden).
    StrDst,
    /// Operand not present.
    None,
}

impl Pattern {
    /// True for the patterns resolved through the ModR/M byte.
    pub(crate) fn uses_modrm(self) -> bool {
        matches!(self, Self::Rm | Self::Reg | Self::SReg)
    }
}

/// One opcode's static description.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpcodeDesc {
    /// Mnemonic, kept for debugging and observability.
    pub name: &'static str,
    pub op: Op,
    pub dst: Pattern,
    pub src: Pattern,
    /// Word (16-bit) operation; false means byte.
    pub word: bool,
    /// String instruction, eligible for REP.
    pub string: bool,
}

const fn d(name: &'static str, op: Op, dst: Pattern, src: Pattern, word: bool) -> OpcodeDesc {
    OpcodeDesc {
        name,
        op,
        dst,
        src,
        word,
        string: false,
    }
}

const fn strd(name: &'static str, op: Op, dst: Pattern, src: Pattern, word: bool) -> OpcodeDesc {
    OpcodeDesc {
        name,
        op,
        dst,
        src,
        word,
        string: true,
    }
}

const ILLEGAL: OpcodeDesc = d("ILLEGAL", Op::Illegal, Pattern::None, Pattern::None, false);

const fn prefix(name: &'static str) -> OpcodeDesc {
    d(name, Op::Prefix, Pattern::None, Pattern::None, false)
}

/// Root opcode table, indexed by the opcode byte.
#[rustfmt::skip]
pub(crate) static OPCODES: [OpcodeDesc; 256] = [
    // 0x00-0x0F
    d("ADD",   Op::Add,  Pattern::Rm,         Pattern::Reg,    false),
    d("ADD",   Op::Add,  Pattern::Rm,         Pattern::Reg,    true),
    d("ADD",   Op::Add,  Pattern::Reg,        Pattern::Rm,     false),
    d("ADD",   Op::Add,  Pattern::Reg,        Pattern::Rm,     true),
    d("ADD",   Op::Add,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("ADD",   Op::Add,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    d("PUSH",  Op::Push, Pattern::Seg(ES),    Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Seg(ES),    Pattern::None,   true),
    d("OR",    Op::Or,   Pattern::Rm,         Pattern::Reg,    false),
    d("OR",    Op::Or,   Pattern::Rm,         Pattern::Reg,    true),
    d("OR",    Op::Or,   Pattern::Reg,        Pattern::Rm,     false),
    d("OR",    Op::Or,   Pattern::Reg,        Pattern::Rm,     true),
    d("OR",    Op::Or,   Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("OR",    Op::Or,   Pattern::Reg16(AX),  Pattern::Imm,    true),
    d("PUSH",  Op::Push, Pattern::Seg(CS),    Pattern::None,   true),
    ILLEGAL, // 0x0F: POP CS on very early parts; treated as illegal
    // 0x10-0x1F
    d("ADC",   Op::Adc,  Pattern::Rm,         Pattern::Reg,    false),
    d("ADC",   Op::Adc,  Pattern::Rm,         Pattern::Reg,    true),
    d("ADC",   Op::Adc,  Pattern::Reg,        Pattern::Rm,     false),
    d("ADC",   Op::Adc,  Pattern::Reg,        Pattern::Rm,     true),
    d("ADC",   Op::Adc,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("ADC",   Op::Adc,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    d("PUSH",  Op::Push, Pattern::Seg(SS),    Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Seg(SS),    Pattern::None,   true),
    d("SBB",   Op::Sbb,  Pattern::Rm,         Pattern::Reg,    false),
    d("SBB",   Op::Sbb,  Pattern::Rm,         Pattern::Reg,    true),
    d("SBB",   Op::Sbb,  Pattern::Reg,        Pattern::Rm,     false),
    d("SBB",   Op::Sbb,  Pattern::Reg,        Pattern::Rm,     true),
    d("SBB",   Op::Sbb,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("SBB",   Op::Sbb,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    d("PUSH",  Op::Push, Pattern::Seg(DS),    Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Seg(DS),    Pattern::None,   true),
    // 0x20-0x2F
    d("AND",   Op::And,  Pattern::Rm,         Pattern::Reg,    false),
    d("AND",   Op::And,  Pattern::Rm,         Pattern::Reg,    true),
    d("AND",   Op::And,  Pattern::Reg,        Pattern::Rm,     false),
    d("AND",   Op::And,  Pattern::Reg,        Pattern::Rm,     true),
    d("AND",   Op::And,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("AND",   Op::And,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    prefix("ES:"),
    d("DAA",   Op::Daa,  Pattern::None,       Pattern::None,   false),
    d("SUB",   Op::Sub,  Pattern::Rm,         Pattern::Reg,    false),
    d("SUB",   Op::Sub,  Pattern::Rm,         Pattern::Reg,    true),
    d("SUB",   Op::Sub,  Pattern::Reg,        Pattern::Rm,     false),
    d("SUB",   Op::Sub,  Pattern::Reg,        Pattern::Rm,     true),
    d("SUB",   Op::Sub,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("SUB",   Op::Sub,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    prefix("CS:"),
    d("DAS",   Op::Das,  Pattern::None,       Pattern::None,   false),
    // 0x30-0x3F
    d("XOR",   Op::Xor,  Pattern::Rm,         Pattern::Reg,    false),
    d("XOR",   Op::Xor,  Pattern::Rm,         Pattern::Reg,    true),
    d("XOR",   Op::Xor,  Pattern::Reg,        Pattern::Rm,     false),
    d("XOR",   Op::Xor,  Pattern::Reg,        Pattern::Rm,     true),
    d("XOR",   Op::Xor,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("XOR",   Op::Xor,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    prefix("SS:"),
    d("AAA",   Op::Aaa,  Pattern::None,       Pattern::None,   false),
    d("CMP",   Op::Cmp,  Pattern::Rm,         Pattern::Reg,    false),
    d("CMP",   Op::Cmp,  Pattern::Rm,         Pattern::Reg,    true),
    d("CMP",   Op::Cmp,  Pattern::Reg,        Pattern::Rm,     false),
    d("CMP",   Op::Cmp,  Pattern::Reg,        Pattern::Rm,     true),
    d("CMP",   Op::Cmp,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("CMP",   Op::Cmp,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    prefix("DS:"),
    d("AAS",   Op::Aas,  Pattern::None,       Pattern::None,   false),
    // 0x40-0x4F
    d("INC",   Op::Inc,  Pattern::Reg16(AX),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(CX),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(DX),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(BX),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(SP),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(BP),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(SI),  Pattern::None,   true),
    d("INC",   Op::Inc,  Pattern::Reg16(DI),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(AX),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(CX),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(DX),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(BX),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(SP),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(BP),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(SI),  Pattern::None,   true),
    d("DEC",   Op::Dec,  Pattern::Reg16(DI),  Pattern::None,   true),
    // 0x50-0x5F
    d("PUSH",  Op::Push, Pattern::Reg16(AX),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(CX),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(DX),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(BX),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(SP),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(BP),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(SI),  Pattern::None,   true),
    d("PUSH",  Op::Push, Pattern::Reg16(DI),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(AX),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(CX),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(DX),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(BX),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(SP),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(BP),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(SI),  Pattern::None,   true),
    d("POP",   Op::Pop,  Pattern::Reg16(DI),  Pattern::None,   true),
    // 0x60-0x6F: undefined on the 8086 (aliases of 0x70-0x7F); kept illegal
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL,
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL,
    // 0x70-0x7F
    d("JO",    Op::Jcc(Cond::O),  Pattern::None, Pattern::Imm, false),
    d("JNO",   Op::Jcc(Cond::No), Pattern::None, Pattern::Imm, false),
    d("JB",    Op::Jcc(Cond::B),  Pattern::None, Pattern::Imm, false),
    d("JAE",   Op::Jcc(Cond::Ae), Pattern::None, Pattern::Imm, false),
    d("JE",    Op::Jcc(Cond::E),  Pattern::None, Pattern::Imm, false),
    d("JNE",   Op::Jcc(Cond::Ne), Pattern::None, Pattern::Imm, false),
    d("JBE",   Op::Jcc(Cond::Be), Pattern::None, Pattern::Imm, false),
    d("JA",    Op::Jcc(Cond::A),  Pattern::None, Pattern::Imm, false),
    d("JS",    Op::Jcc(Cond::S),  Pattern::None, Pattern::Imm, false),
    d("JNS",   Op::Jcc(Cond::Ns), Pattern::None, Pattern::Imm, false),
    d("JP",    Op::Jcc(Cond::P),  Pattern::None, Pattern::Imm, false),
    d("JNP",   Op::Jcc(Cond::Np), Pattern::None, Pattern::Imm, false),
    d("JL",    Op::Jcc(Cond::L),  Pattern::None, Pattern::Imm, false),
    d("JGE",   Op::Jcc(Cond::Ge), Pattern::None, Pattern::Imm, false),
    d("JLE",   Op::Jcc(Cond::Le), Pattern::None, Pattern::Imm, false),
    d("JG",    Op::Jcc(Cond::G),  Pattern::None, Pattern::Imm, false),
    // 0x80-0x8F
    d("IMM",   Op::ImmGroup, Pattern::Rm,     Pattern::Imm,    false),
    d("IMM",   Op::ImmGroup, Pattern::Rm,     Pattern::Imm,    true),
    d("IMM",   Op::ImmGroup, Pattern::Rm,     Pattern::Imm,    false),
    d("IMM",   Op::ImmGroup, Pattern::Rm,     Pattern::Imm8,   true),
    d("TEST",  Op::Test, Pattern::Reg,        Pattern::Rm,     false),
    d("TEST",  Op::Test, Pattern::Reg,        Pattern::Rm,     true),
    d("XCHG",  Op::Xchg, Pattern::Reg,        Pattern::Rm,     false),
    d("XCHG",  Op::Xchg, Pattern::Reg,        Pattern::Rm,     true),
    d("MOV",   Op::Mov,  Pattern::Rm,         Pattern::Reg,    false),
    d("MOV",   Op::Mov,  Pattern::Rm,         Pattern::Reg,    true),
    d("MOV",   Op::Mov,  Pattern::Reg,        Pattern::Rm,     false),
    d("MOV",   Op::Mov,  Pattern::Reg,        Pattern::Rm,     true),
    d("MOV",   Op::Mov,  Pattern::Rm,         Pattern::SReg,   true),
    d("LEA",   Op::Lea,  Pattern::Reg,        Pattern::Rm,     true),
    d("MOV",   Op::Mov,  Pattern::SReg,       Pattern::Rm,     true),
    d("POP",   Op::Pop,  Pattern::Rm,         Pattern::None,   true),
    // 0x90-0x9F
    d("NOP",   Op::Xchg, Pattern::Reg16(AX),  Pattern::Reg16(AX), true), // XCHG AX, AX
    d("XCHG",  Op::Xchg, Pattern::Reg16(CX),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(DX),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(BX),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(SP),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(BP),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(SI),  Pattern::Reg16(AX), true),
    d("XCHG",  Op::Xchg, Pattern::Reg16(DI),  Pattern::Reg16(AX), true),
    d("CBW",   Op::Cbw,  Pattern::None,       Pattern::None,   true),
    d("CWD",   Op::Cwd,  Pattern::None,       Pattern::None,   true),
    d("CALL",  Op::CallFar, Pattern::None,    Pattern::SegOff, true),
    d("WAIT",  Op::Wait, Pattern::None,       Pattern::None,   false),
    d("PUSHF", Op::Pushf, Pattern::None,      Pattern::None,   false),
    d("POPF",  Op::Popf, Pattern::None,       Pattern::None,   false),
    d("SAHF",  Op::Sahf, Pattern::None,       Pattern::None,   false),
    d("LAHF",  Op::Lahf, Pattern::None,       Pattern::None,   false),
    // 0xA0-0xAF
    d("MOV",   Op::Mov,  Pattern::Reg8(AL),   Pattern::Addr,   false),
    d("MOV",   Op::Mov,  Pattern::Reg16(AX),  Pattern::Addr,   true),
    d("MOV",   Op::Mov,  Pattern::Addr,       Pattern::Reg8(AL),  false),
    d("MOV",   Op::Mov,  Pattern::Addr,       Pattern::Reg16(AX), true),
    strd("MOVSB", Op::Mov, Pattern::StrDst,   Pattern::StrSrc, false),
    strd("MOVSW", Op::Mov, Pattern::StrDst,   Pattern::StrSrc, true),
    strd("CMPSB", Op::Cmp, Pattern::StrSrc,   Pattern::StrDst, false),
    strd("CMPSW", Op::Cmp, Pattern::StrSrc,   Pattern::StrDst, true),
    d("TEST",  Op::Test, Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("TEST",  Op::Test, Pattern::Reg16(AX),  Pattern::Imm,    true),
    strd("STOSB", Op::Mov, Pattern::StrDst,   Pattern::Reg8(AL),  false),
    strd("STOSW", Op::Mov, Pattern::StrDst,   Pattern::Reg16(AX), true),
    strd("LODSB", Op::Mov, Pattern::Reg8(AL), Pattern::StrSrc, false),
    strd("LODSW", Op::Mov, Pattern::Reg16(AX), Pattern::StrSrc, true),
    strd("SCASB", Op::Cmp, Pattern::Reg8(AL), Pattern::StrDst, false),
    strd("SCASW", Op::Cmp, Pattern::Reg16(AX), Pattern::StrDst, true),
    // 0xB0-0xBF
    d("MOV",   Op::Mov,  Pattern::Reg8(AL),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(CL),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(DL),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(BL),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(AH),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(CH),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(DH),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg8(BH),   Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Reg16(AX),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(CX),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(DX),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(BX),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(SP),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(BP),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(SI),  Pattern::Imm,    true),
    d("MOV",   Op::Mov,  Pattern::Reg16(DI),  Pattern::Imm,    true),
    // 0xC0-0xCF
    ILLEGAL,
    ILLEGAL,
    d("RET",   Op::RetNear, Pattern::None,    Pattern::Imm,    true),
    d("RET",   Op::RetNear, Pattern::None,    Pattern::None,   true),
    d("LES",   Op::Les,  Pattern::Reg,        Pattern::Rm,     true),
    d("LDS",   Op::Lds,  Pattern::Reg,        Pattern::Rm,     true),
    d("MOV",   Op::Mov,  Pattern::Rm,         Pattern::Imm,    false),
    d("MOV",   Op::Mov,  Pattern::Rm,         Pattern::Imm,    true),
    ILLEGAL,
    ILLEGAL,
    d("RET",   Op::RetFar, Pattern::None,     Pattern::Imm,    true),
    d("RET",   Op::RetFar, Pattern::None,     Pattern::None,   true),
    ILLEGAL, // 0xCC: INT 3, out of scope
    ILLEGAL, // 0xCD: INT imm8, out of scope
    ILLEGAL, // 0xCE: INTO, out of scope
    ILLEGAL, // 0xCF: IRET, out of scope
    // 0xD0-0xDF: shift/rotate group and ESC, out of scope
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL,
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL,
    // 0xE0-0xEF
    ILLEGAL, // 0xE0: LOOPNZ, out of scope
    ILLEGAL, // 0xE1: LOOPZ, out of scope
    ILLEGAL, // 0xE2: LOOP, out of scope
    ILLEGAL, // 0xE3: JCXZ, out of scope
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, // 0xE4-0xE7: IN/OUT, out of scope
    d("CALL",  Op::CallNear, Pattern::None,   Pattern::Imm,    true),
    d("JMP",   Op::JmpNear,  Pattern::None,   Pattern::Imm,    true),
    d("JMP",   Op::JmpFar,   Pattern::None,   Pattern::SegOff, true),
    d("JMP",   Op::JmpNear,  Pattern::None,   Pattern::Imm,    false),
    ILLEGAL, ILLEGAL, ILLEGAL, ILLEGAL, // 0xEC-0xEF: IN/OUT, out of scope
    // 0xF0-0xFF
    prefix("LOCK"),
    ILLEGAL,
    prefix("REPNZ"),
    prefix("REPZ"),
    ILLEGAL, // 0xF4: HLT, out of scope
    d("CMC",   Op::Cmc,  Pattern::None,       Pattern::None,   false),
    ILLEGAL, // 0xF6: group 3 byte (TEST/NOT/NEG/MUL/DIV), out of scope
    ILLEGAL, // 0xF7: group 3 word, out of scope
    d("CLC",   Op::Clc,  Pattern::None,       Pattern::None,   false),
    d("STC",   Op::Stc,  Pattern::None,       Pattern::None,   false),
    d("CLI",   Op::Cli,  Pattern::None,       Pattern::None,   false),
    d("STI",   Op::Sti,  Pattern::None,       Pattern::None,   false),
    d("CLD",   Op::Cld,  Pattern::None,       Pattern::None,   false),
    d("STD",   Op::Std,  Pattern::None,       Pattern::None,   false),
    ILLEGAL, // 0xFE: group 4, out of scope
    ILLEGAL, // 0xFF: group 5, out of scope
];

/// Immediate-group operations selected by ModR/M `reg` for `0x80-0x83`.
pub(crate) static IMM_GROUP: [Op; 8] = [
    Op::Add,
    Op::Or,
    Op::Adc,
    Op::Sbb,
    Op::And,
    Op::Sub,
    Op::Xor,
    Op::Cmp,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_opcodes_are_flagged() {
        for opcode in [0xA4, 0xA5, 0xA6, 0xA7, 0xAA, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF] {
            assert!(OPCODES[opcode].string, "{opcode:#04X} should be a string op");
        }
        assert!(!OPCODES[0xA8].string, "TEST AL, imm is not a string op");
    }

    #[test]
    fn canonical_nop_is_xchg_ax_ax() {
        let nop = &OPCODES[0x90];
        assert_eq!(nop.op, Op::Xchg);
        assert_eq!(nop.dst, Pattern::Reg16(AX));
        assert_eq!(nop.src, Pattern::Reg16(AX));
    }

    #[test]
    fn conditions_match_flag_semantics() {
        use crate::flags::{CF, OF, SF, ZF};
        assert!(Cond::Be.holds(CF));
        assert!(Cond::Be.holds(ZF));
        assert!(!Cond::A.holds(CF | ZF));
        assert!(Cond::A.holds(0));
        assert!(Cond::L.holds(SF));
        assert!(Cond::L.holds(OF));
        assert!(!Cond::L.holds(SF | OF));
        assert!(Cond::G.holds(0));
        assert!(!Cond::G.holds(ZF));
    }
}
