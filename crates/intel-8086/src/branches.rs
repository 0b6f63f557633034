//! Control-transfer handlers: conditional jumps, calls, jumps, returns
//! and WAIT. Every taken transfer goes through `jump()`, which flushes
//! the prefetch queue and charges the refill penalty.

use crate::bus::Bus8086;
use crate::cpu::Cpu8086;
use crate::opcode::Cond;
use crate::operand::LocKind;
use crate::registers::CS;

impl Cpu8086 {
    /// Jcc: signed 8-bit displacement from the next instruction.
    pub(crate) fn op_jcc<B: Bus8086>(&mut self, bus: &mut B, cond: Cond) {
        let src = self.dec.src;
        let offset = self.loc_read(bus, src) as u8 as i8;
        if cond.holds(self.regs.flags) {
            let target = self.current_ip.wrapping_add_signed(i16::from(offset));
            let cs = self.regs.seg[CS as usize];
            self.jump(cs, target);
            self.cycles += 12;
        }
        self.cycles += 4;
    }

    /// CALL near: push the return IP, branch by a 16-bit displacement.
    pub(crate) fn op_call_near<B: Bus8086>(&mut self, bus: &mut B) {
        let return_ip = self.current_ip;
        self.push_word(bus, return_ip);
        let target = return_ip.wrapping_add_signed(self.dec.immediate as i16);
        let cs = self.regs.seg[CS as usize];
        self.jump(cs, target);
        self.cycles += 19;
    }

    /// CALL far: push CS and the return IP, land at segment:offset.
    pub(crate) fn op_call_far<B: Bus8086>(&mut self, bus: &mut B) {
        let cs = self.regs.seg[CS as usize];
        self.push_word(bus, cs);
        let return_ip = self.current_ip;
        self.push_word(bus, return_ip);

        let target_ip = self.dec.immediate;
        let target_cs = self.dec.far_segment;
        self.jump(target_cs, target_ip);
        self.cycles += 28;
    }

    /// JMP near/short: relative branch, 16- or sign-extended 8-bit.
    pub(crate) fn op_jmp_near(&mut self) {
        let disp = if self.dec.word {
            self.dec.immediate as i16
        } else {
            i16::from(self.dec.immediate as u8 as i8)
        };
        let target = self.current_ip.wrapping_add_signed(disp);
        let cs = self.regs.seg[CS as usize];
        self.jump(cs, target);
        self.cycles += 15;
    }

    /// JMP far: land at segment:offset.
    pub(crate) fn op_jmp_far(&mut self) {
        let target_ip = self.dec.immediate;
        let target_cs = self.dec.far_segment;
        self.jump(target_cs, target_ip);
        self.cycles += 15;
    }

    /// RET near: pop IP; an immediate releases callee parameters.
    pub(crate) fn op_ret_near<B: Bus8086>(&mut self, bus: &mut B) {
        let ip = self.pop_word(bus);
        let cs = self.regs.seg[CS as usize];
        self.jump(cs, ip);

        if self.dec.src.kind == LocKind::Immediate {
            let release = self.dec.immediate;
            self.regs.set_sp(self.regs.sp().wrapping_add(release));
            self.cycles += 12;
        } else {
            self.cycles += 8;
        }
    }

    /// RET far: pop IP then CS; an immediate releases callee parameters.
    pub(crate) fn op_ret_far<B: Bus8086>(&mut self, bus: &mut B) {
        let ip = self.pop_word(bus);
        let cs = self.pop_word(bus);
        self.jump(cs, ip);

        if self.dec.src.kind == LocKind::Immediate {
            let release = self.dec.immediate;
            self.regs.set_sp(self.regs.sp().wrapping_add(release));
            self.cycles += 17;
        } else {
            self.cycles += 18;
        }
    }

    /// WAIT: base cost here; the tick engine keeps stalling while the
    /// TEST line stays asserted.
    pub(crate) fn op_wait(&mut self) {
        self.cycles += 3;
    }
}
