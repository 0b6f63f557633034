//! Bitwise instruction handlers: AND, OR, XOR, TEST.

use crate::alu;
use crate::bus::Bus8086;
use crate::cpu::Cpu8086;
use crate::timing;

impl Cpu8086 {
    pub(crate) fn op_and<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);

        let r = alu::and(dest, source, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::binary_alu(dst.kind, src.kind);
    }

    pub(crate) fn op_or<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);

        let r = alu::or(dest, source, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::binary_alu(dst.kind, src.kind);
    }

    pub(crate) fn op_xor<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);

        let r = alu::xor(dest, source, self.dec.word, self.regs.flags);
        self.loc_write(bus, dst, r.value);
        self.regs.flags = r.flags;

        self.cycles += timing::binary_alu(dst.kind, src.kind);
    }

    /// TEST: AND that only sets flags.
    pub(crate) fn op_test<B: Bus8086>(&mut self, bus: &mut B) {
        let dst = self.dec.dst;
        let src = self.dec.src;
        let dest = self.loc_read(bus, dst);
        let source = self.loc_read(bus, src);

        let r = alu::and(dest, source, self.dec.word, self.regs.flags);
        self.regs.flags = r.flags;

        self.cycles += timing::test(dst.kind, src.kind);
    }
}
