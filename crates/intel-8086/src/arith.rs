//! Arithmetic instruction handlers: ADD/ADC, SUB/SBB, CMP, INC/DEC,
//! the decimal and ASCII adjusts, and the sign extensions.

use crate::alu;
use crate::bus::Bus8086;
use crate::cpu::Cpu8086;
use crate::flags::CF;
use crate::timing;

impl Cpu8086 {
    /// ADD and, with `with_carry`, ADC.
    pub(crate) fn op_add<B: Bus8086>(&mut self, bus: &mut B, with_carry: bool) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);
        let carry = with_carry && self.regs.flag(CF);

        let r = alu::add(dest, source, carry, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::binary_alu(dst.kind, src.kind);
    }

    /// SUB and, with `with_borrow`, SBB.
    pub(crate) fn op_sub<B: Bus8086>(&mut self, bus: &mut B, with_borrow: bool) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);
        let borrow = with_borrow && self.regs.flag(CF);

        let r = alu::sub(dest, source, borrow, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::binary_alu(dst.kind, src.kind);
    }

    /// CMP: subtract without storing. Also CMPS/SCAS element compares.
    pub(crate) fn op_cmp<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);

        let r = alu::sub(dest, source, false, self.dec.word, self.regs.flags);
        self.regs.flags = r.flags;

        self.cycles += timing::cmp(dst.kind, src.kind);
    }

    /// INC: add 1, CF untouched.
    pub(crate) fn op_inc<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let dest = self.loc_read(bus, dst);

        let r = alu::inc(dest, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::inc_dec(dst.kind, self.dec.word);
    }

    /// DEC: subtract 1, CF untouched.
    pub(crate) fn op_dec<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let dest = self.loc_read(bus, dst);

        let r = alu::dec(dest, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::inc_dec(dst.kind, self.dec.word);
    }

    /// DAA: decimal adjust AL after addition.
    pub(crate) fn op_daa(&mut self) {
        let (al, f) = alu::daa(self.regs.al(), self.regs.flags);
        self.regs.set_al(al);
        self.regs.flags = f;
        self.cycles += 4;
    }

    /// DAS: decimal adjust AL after subtraction.
    pub(crate) fn op_das(&mut self) {
        let (al, f) = alu::das(self.regs.al(), self.regs.flags);
        self.regs.set_al(al);
        self.regs.flags = f;
        self.cycles += 4;
    }

    /// AAA: ASCII adjust AL after addition.
    pub(crate) fn op_aaa(&mut self) {
        let (al, ah, f) = alu::aaa(self.regs.al(), self.regs.ah(), self.regs.flags);
        self.regs.set_al(al);
        self.regs.set_ah(ah);
        self.regs.flags = f;
        self.cycles += 4;
    }

    /// AAS: ASCII adjust AL after subtraction.
    pub(crate) fn op_aas(&mut self) {
        let (al, ah, f) = alu::aas(self.regs.al(), self.regs.ah(), self.regs.flags);
        self.regs.set_al(al);
        self.regs.set_ah(ah);
        self.regs.flags = f;
        self.cycles += 4;
    }

    /// CBW: sign-extend AL into AH.
    pub(crate) fn op_cbw(&mut self) {
        let ah = if self.regs.al() & 0x80 != 0 { 0xFF } else { 0x00 };
        self.regs.set_ah(ah);
        self.cycles += 2;
    }

    /// CWD: sign-extend AX into DX.
    pub(crate) fn op_cwd(&mut self) {
        let dx = if self.regs.ax() & 0x8000 != 0 {
            0xFFFF
        } else {
            0x0000
        };
        self.regs.set_dx(dx);
        self.cycles += 5;
    }
}
