//! Staged instruction decoder.
//!
//! The decoder pulls bytes out of the prefetch queue one stage at a time:
//! prefixes and opcode, ModR/M plus displacement, immediate, direct
//! address, then operand resolution and execution. Every byte fetch may
//! find the queue empty; the stage machine keeps partial state and
//! resumes at the same point on a later tick.

use crate::bus::Bus8086;
use crate::cpu::Cpu8086;
use crate::ea::ModRm;
use crate::opcode::{OpcodeDesc, Pattern, OPCODES};
use crate::operand::{Loc, LocKind, Place};
use crate::registers::{AH, AL, AX, DS, ES};

/// Group-1 prefix bytes.
pub(crate) const PREFIX_LOCK: u8 = 0xF0;
pub(crate) const PREFIX_REPNZ: u8 = 0xF2;
pub(crate) const PREFIX_REPZ: u8 = 0xF3;

/// Decoder stage, advanced inside a single tick until a byte is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Waiting for a prefix or opcode byte.
    #[default]
    Ready,
    /// Opcode needs a ModR/M byte (and maybe displacement).
    FetchModRm,
    /// Opcode needs an immediate.
    FetchImm,
    /// Opcode needs a direct address or far pointer.
    FetchAddr,
    /// All bytes in hand; resolve operand locations.
    DecodeLoc,
    /// Instruction handler ran (or is about to run).
    Execute,
}

/// Per-instruction decode work area. Cleared when a new instruction
/// starts; `Option` fields mark bytes not yet fetched so stalled stages
/// can resume.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Decode {
    pub stage: Stage,
    pub prefix_g1: Option<u8>,
    /// Segment override as a segment register index.
    pub seg_override: Option<u8>,
    pub opcode: Option<u8>,
    /// Width of the current opcode.
    pub word: bool,
    /// REP prefix seen and opcode is a string instruction.
    pub repeat: bool,
    pub modrm: Option<ModRm>,
    pub modrm_is_segreg: bool,
    pub disp_lo: Option<u8>,
    pub disp_hi: Option<u8>,
    pub imm_lo: Option<u8>,
    pub imm_hi: Option<u8>,
    pub seg_lo: Option<u8>,
    pub seg_hi: Option<u8>,
    /// Composed immediate, direct-address offset or far offset.
    pub immediate: u16,
    /// Far segment for CALL/JMP far.
    pub far_segment: u16,
    /// 16-bit effective address before segmentation (for LEA).
    pub ea_offset: u16,
    /// Resolved ModR/M `reg` operand.
    pub reg: Loc,
    /// Resolved ModR/M `r/m` operand.
    pub rm: Loc,
    /// Final destination operand.
    pub dst: Loc,
    /// Final source operand.
    pub src: Loc,
}

impl Decode {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Cpu8086 {
    /// Advance the decoder as far as the queue contents allow.
    ///
    /// Called once per tick when the cycle budget has drained. Either
    /// completes an instruction (leaving the stage at `Execute`) or
    /// parks mid-stage waiting for prefetch.
    pub(crate) fn step_decoder<B: Bus8086>(&mut self, bus: &mut B) {
        if self.queue.is_empty() {
            return;
        }

        // The previous instruction has fully drained; start fresh.
        if self.dec.stage == Stage::Execute {
            self.dec.clear();
        }

        loop {
            match self.dec.stage {
                Stage::Ready => {
                    let byte = self.fetch_queue_byte();
                    match byte {
                        // Prefixes are one-byte instructions of their own:
                        // 2 cycles, stay in Ready for the real opcode.
                        PREFIX_LOCK => {
                            // No bus arbitration modeled; LOCK only burns time.
                            self.cycles = 1;
                            return;
                        }
                        PREFIX_REPNZ | PREFIX_REPZ => {
                            self.dec.repeat = true;
                            self.dec.prefix_g1 = Some(byte);
                            self.cycles = 1;
                            return;
                        }
                        0x26 | 0x2E | 0x36 | 0x3E => {
                            self.dec.seg_override = Some((byte >> 3) & 3);
                            self.cycles = 1;
                            return;
                        }
                        _ => {}
                    }

                    let desc = &OPCODES[byte as usize];
                    self.dec.opcode = Some(byte);
                    self.dec.word = desc.word;
                    // REP only sticks to string instructions.
                    if self.dec.repeat && !desc.string {
                        self.dec.repeat = false;
                    }
                    self.dec.stage = Self::stage_after_opcode(desc);
                }
                Stage::FetchModRm => {
                    if !self.stage_fetch_modrm() {
                        return;
                    }
                    let desc = self.current_desc();
                    self.dec.stage = Self::stage_after_modrm(desc);
                }
                Stage::FetchImm => {
                    if !self.stage_fetch_imm() {
                        return;
                    }
                    self.dec.stage = Stage::DecodeLoc;
                }
                Stage::FetchAddr => {
                    if !self.stage_fetch_addr() {
                        return;
                    }
                    self.dec.stage = Stage::DecodeLoc;
                }
                Stage::DecodeLoc => {
                    let desc = self.current_desc();
                    self.dec.dst = self.loc_for(desc.dst);
                    self.dec.src = self.loc_for(desc.src);
                    self.dec.stage = Stage::Execute;
                }
                Stage::Execute => {
                    self.execute_instruction(bus);
                    return;
                }
            }
        }
    }

    /// Descriptor of the opcode currently being decoded.
    pub(crate) fn current_desc(&self) -> &'static OpcodeDesc {
        let opcode = self.dec.opcode.unwrap_or(0x90);
        &OPCODES[opcode as usize]
    }

    fn stage_after_opcode(desc: &OpcodeDesc) -> Stage {
        if desc.dst.uses_modrm() || desc.src.uses_modrm() {
            Stage::FetchModRm
        } else {
            Self::stage_after_modrm(desc)
        }
    }

    fn stage_after_modrm(desc: &OpcodeDesc) -> Stage {
        if matches!(desc.src, Pattern::Imm | Pattern::Imm8) {
            Stage::FetchImm
        } else if desc.dst == Pattern::Addr
            || matches!(desc.src, Pattern::Addr | Pattern::SegOff)
        {
            Stage::FetchAddr
        } else {
            Stage::DecodeLoc
        }
    }

    /// Fetch ModR/M and displacement bytes. Returns false on queue stall.
    fn stage_fetch_modrm(&mut self) -> bool {
        if self.dec.modrm.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            let byte = self.fetch_queue_byte();
            self.dec.modrm = Some(ModRm::from_byte(byte));
        }
        let Some(modrm) = self.dec.modrm else {
            return false;
        };

        let wide_disp = (modrm.md == 0b00 && modrm.rm == 0b110) || modrm.md == 0b10;
        if (modrm.md == 0b01 || wide_disp) && self.dec.disp_lo.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.dec.disp_lo = Some(self.fetch_queue_byte());
        }
        if wide_disp && self.dec.disp_hi.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.dec.disp_hi = Some(self.fetch_queue_byte());
        }

        let desc = self.current_desc();
        let is_segreg = desc.dst == Pattern::SReg || desc.src == Pattern::SReg;
        self.resolve_modrm(modrm, is_segreg);
        true
    }

    /// Fetch immediate byte(s). Returns false on queue stall.
    fn stage_fetch_imm(&mut self) -> bool {
        if self.dec.imm_lo.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.dec.imm_lo = Some(self.fetch_queue_byte());
        }
        let lo = self.dec.imm_lo.unwrap_or(0);

        if self.dec.word && self.dec.imm_hi.is_none() {
            // 0x83 reads a byte and sign-extends it to a word.
            if self.current_desc().src == Pattern::Imm8 {
                self.dec.imm_hi = Some(if lo & 0x80 != 0 { 0xFF } else { 0x00 });
            } else {
                if self.queue.is_empty() {
                    return false;
                }
                self.dec.imm_hi = Some(self.fetch_queue_byte());
            }
        }

        self.dec.immediate = if self.dec.word {
            u16::from_le_bytes([lo, self.dec.imm_hi.unwrap_or(0)])
        } else {
            u16::from(lo)
        };
        true
    }

    /// Fetch a 16-bit direct address, plus the segment word for far
    /// CALL/JMP. Returns false on queue stall.
    fn stage_fetch_addr(&mut self) -> bool {
        if self.dec.imm_lo.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.dec.imm_lo = Some(self.fetch_queue_byte());
        }
        if self.dec.imm_hi.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.dec.imm_hi = Some(self.fetch_queue_byte());
        }

        if self.current_desc().src == Pattern::SegOff {
            if self.dec.seg_lo.is_none() {
                if self.queue.is_empty() {
                    return false;
                }
                self.dec.seg_lo = Some(self.fetch_queue_byte());
            }
            if self.dec.seg_hi.is_none() {
                if self.queue.is_empty() {
                    return false;
                }
                self.dec.seg_hi = Some(self.fetch_queue_byte());
            }
            self.dec.far_segment =
                u16::from_le_bytes([self.dec.seg_lo.unwrap_or(0), self.dec.seg_hi.unwrap_or(0)]);
        }

        self.dec.immediate =
            u16::from_le_bytes([self.dec.imm_lo.unwrap_or(0), self.dec.imm_hi.unwrap_or(0)]);
        true
    }

    /// Turn an operand pattern into a resolved location.
    pub(crate) fn loc_for(&self, pattern: Pattern) -> Loc {
        match pattern {
            Pattern::Reg16(r) => Loc::new(
                if r == AX {
                    LocKind::Accumulator
                } else {
                    LocKind::Register
                },
                Place::Reg16(r),
            ),
            Pattern::Reg8(r) => Loc::new(
                if r == AL || r == AH {
                    LocKind::Accumulator
                } else {
                    LocKind::Register
                },
                Place::Reg8(r),
            ),
            Pattern::Seg(s) => Loc::new(LocKind::SegmentRegister, Place::Seg(s)),
            Pattern::Imm | Pattern::Imm8 | Pattern::SegOff => {
                Loc::new(LocKind::Immediate, Place::Imm(self.dec.immediate))
            }
            Pattern::Rm => self.dec.rm,
            Pattern::Reg | Pattern::SReg => self.dec.reg,
            Pattern::Addr => {
                let segment = self.dec.seg_override.unwrap_or(DS);
                Loc::new(
                    LocKind::Memory,
                    Place::Mem(self.regs.physical(segment, self.dec.immediate)),
                )
            }
            Pattern::StrSrc => self.string_source(),
            Pattern::StrDst => self.string_destination(),
            Pattern::None => Loc::NULL,
        }
    }

    /// String source `seg:SI` (DS unless overridden).
    pub(crate) fn string_source(&self) -> Loc {
        let segment = self.dec.seg_override.unwrap_or(DS);
        Loc::new(
            LocKind::Str,
            Place::Mem(self.regs.physical(segment, self.regs.si())),
        )
    }

    /// String destination `ES:DI`; the override never applies.
    pub(crate) fn string_destination(&self) -> Loc {
        Loc::new(
            LocKind::Str,
            Place::Mem(self.regs.physical(ES, self.regs.di())),
        )
    }
}
