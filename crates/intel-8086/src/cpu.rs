//! 8086 CPU core: the tick engine tying the BIU and EU together.
//!
//! One call to `tick()` is one CPU clock. Per tick:
//! 1. The BIU counts down toward its next prefetch and, every fourth
//!    cycle with queue room, reads a word at `CS:IP` into the queue.
//! 2. A completed WAIT keeps stalling while the TEST line is asserted.
//! 3. Budgeted cycles from the instruction in flight burn off one per
//!    tick; only at zero does the decoder run.
//! 4. The decoder advances as far as the queue allows, possibly
//!    executing an instruction and charging its cycle cost.

use emu_core::{Observable, Ticks, Value};

use crate::bus::Bus8086;
use crate::decode::{Decode, Stage, PREFIX_REPNZ, PREFIX_REPZ};
use crate::flags;
use crate::opcode::{Op, OpcodeDesc, Pattern, IMM_GROUP};
use crate::queue::PrefetchQueue;
use crate::registers::{Registers, CS, SS};

/// Intel 8086/8088 CPU.
#[derive(Debug, Clone)]
pub struct Cpu8086 {
    /// Architectural registers, public for inspection and test setup.
    pub regs: Registers,

    // === BIU state ===
    pub(crate) queue: PrefetchQueue,
    /// Cycles until the next prefetch completes (wraps 3..0).
    pub(crate) biu_countdown: u8,

    // === EU state ===
    /// Per-instruction decode work area.
    pub(crate) dec: Decode,
    /// Cycles still owed by the instruction in flight.
    pub(crate) cycles: u32,
    /// Address of the next undecoded byte, irrespective of prefetch.
    /// Control transfers use this as the return/branch base.
    pub(crate) current_ip: u16,

    /// Last illegal opcode byte, latched for the host until reset.
    pub(crate) illegal: Option<u8>,

    total_cycles: Ticks,
}

impl Cpu8086 {
    /// Create a CPU in the reset state.
    #[must_use]
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::new(),
            queue: PrefetchQueue::new(),
            biu_countdown: 3,
            dec: Decode::default(),
            cycles: 0,
            current_ip: 0,
            illegal: None,
            total_cycles: Ticks::ZERO,
        };
        cpu.reset();
        cpu
    }

    /// Reset to the power-on state.
    ///
    /// `CS:IP = FFFF:0000`, so the first fetch hits the 8086 reset
    /// vector at physical `0xFFFF0`. General registers are untouched.
    pub fn reset(&mut self) {
        self.regs.flags = 0x0000;
        self.regs.ip = 0x0000;
        self.regs.seg = [0x0000, 0xFFFF, 0x0000, 0x0000];
        self.queue.reset();
        self.biu_countdown = 3;
        self.cycles = 0;
        self.current_ip = 0x0000;
        self.dec.clear();
        self.illegal = None;
    }

    /// Advance the CPU by one clock.
    pub fn tick<B: Bus8086>(&mut self, bus: &mut B) {
        self.total_cycles += Ticks::new(1);

        // The BIU, unless the queue is full, is always fetching. A bus
        // cycle takes 4 clocks; wait states are not modeled.
        if !self.queue.is_full() {
            if self.biu_countdown == 0 {
                let ip = self.regs.ip;
                let odd = ip & 1 != 0;
                // Fetch the aligned word containing IP. On an odd IP the
                // low byte predates IP and the queue discards it.
                let addr = self.regs.physical(CS, ip & !1);
                let word = bus.read_word(addr);
                self.queue.push(word, odd);
                self.regs.ip = ip.wrapping_add(if odd { 1 } else { 2 });
                self.biu_countdown = 3;
            } else {
                self.biu_countdown -= 1;
            }
        }

        // A completed WAIT keeps the EU stalled while TEST is asserted.
        if self.dec.opcode == Some(0x9B) && bus.test_line() {
            self.cycles += 5;
        }

        // Burn off the budget of the instruction in flight.
        if self.cycles > 0 {
            self.cycles -= 1;
            return;
        }

        self.step_decoder(bus);
    }

    // === Accessors ===

    /// Total elapsed CPU clocks.
    #[must_use]
    pub const fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    /// Cycles still owed by the instruction in flight.
    #[must_use]
    pub const fn cycles_remaining(&self) -> u32 {
        self.cycles
    }

    /// Bytes currently buffered in the prefetch queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Last illegal opcode byte, if any was encountered since reset.
    #[must_use]
    pub const fn illegal_opcode(&self) -> Option<u8> {
        self.illegal
    }

    /// True when an instruction has fully retired (executed and its
    /// cycle cost drained) and the next has not started decoding.
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.cycles == 0 && self.dec.stage == Stage::Execute
    }

    /// Get a reference to the register set.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Get a mutable reference to the register set.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    // === Shared execution helpers ===

    /// Dequeue one instruction byte and advance the logical IP.
    pub(crate) fn fetch_queue_byte(&mut self) -> u8 {
        let byte = self.queue.pop();
        self.current_ip = self.current_ip.wrapping_add(1);
        byte
    }

    /// Control transfer: flush the queue, charge the refill penalty and
    /// land at `cs:ip`.
    pub(crate) fn jump(&mut self, cs: u16, ip: u16) {
        self.queue.flush();
        if self.biu_countdown != 3 {
            self.biu_countdown += 4;
        }
        self.regs.seg[CS as usize] = cs;
        self.regs.ip = ip;
        self.current_ip = ip;
    }

    /// Push a word at `SS:SP-2`.
    pub(crate) fn push_word<B: Bus8086>(&mut self, bus: &mut B, value: u16) {
        let sp = self.regs.sp().wrapping_sub(2);
        self.regs.set_sp(sp);
        let addr = self.regs.physical(SS, sp);
        self.bus_write_word(bus, addr, value);
    }

    /// Pop a word from `SS:SP`.
    pub(crate) fn pop_word<B: Bus8086>(&mut self, bus: &mut B) -> u16 {
        let addr = self.regs.physical(SS, self.regs.sp());
        let value = self.bus_read_word(bus, addr);
        self.regs.set_sp(self.regs.sp().wrapping_add(2));
        value
    }

    // === Execute stage ===

    /// Run the decoded instruction, including any REP loop.
    pub(crate) fn execute_instruction<B: Bus8086>(&mut self, bus: &mut B) {
        let desc = self.current_desc();

        if self.dec.repeat {
            self.cycles += 9;
        }

        loop {
            if self.dec.repeat {
                let cx = self.regs.cx();
                if cx == 0 {
                    // Repeat exits keep the full cycle charge; only a
                    // plain instruction gets the execute-tick rebate.
                    return;
                }
                self.regs.set_cx(cx.wrapping_sub(1));
            }

            if desc.string {
                self.refresh_string_locs(desc);
            }

            self.dispatch(desc.op, bus);

            if desc.string {
                self.step_string_indices();
            }

            if !self.dec.repeat {
                break;
            }

            // REPZ/REPNZ watch ZF after each compare element.
            if desc.op == Op::Cmp {
                let zf = self.regs.flag(flags::ZF);
                match self.dec.prefix_g1 {
                    Some(PREFIX_REPZ) if !zf => return,
                    Some(PREFIX_REPNZ) if zf => return,
                    _ => {}
                }
            }
        }

        // Cycle tables include the execute tick itself; give it back.
        self.cycles = self.cycles.saturating_sub(1);
    }

    /// Re-resolve string operand addresses from the current SI/DI.
    fn refresh_string_locs(&mut self, desc: &OpcodeDesc) {
        match desc.dst {
            Pattern::StrSrc => self.dec.dst = self.string_source(),
            Pattern::StrDst => self.dec.dst = self.string_destination(),
            _ => {}
        }
        match desc.src {
            Pattern::StrSrc => self.dec.src = self.string_source(),
            Pattern::StrDst => self.dec.src = self.string_destination(),
            _ => {}
        }
    }

    /// Step SI and DI by the element size in the DF direction.
    fn step_string_indices(&mut self) {
        let size: u16 = if self.dec.word { 2 } else { 1 };
        let delta = if self.regs.flag(flags::DF) {
            size.wrapping_neg()
        } else {
            size
        };
        self.regs.set_si(self.regs.si().wrapping_add(delta));
        self.regs.set_di(self.regs.di().wrapping_add(delta));
    }

    /// Dispatch one operation to its handler.
    pub(crate) fn dispatch<B: Bus8086>(&mut self, op: Op, bus: &mut B) {
        match op {
            Op::Add => self.op_add(bus, false),
            Op::Adc => self.op_add(bus, true),
            Op::Sub => self.op_sub(bus, false),
            Op::Sbb => self.op_sub(bus, true),
            Op::Cmp => self.op_cmp(bus),
            Op::And => self.op_and(bus),
            Op::Or => self.op_or(bus),
            Op::Xor => self.op_xor(bus),
            Op::Test => self.op_test(bus),
            Op::Inc => self.op_inc(bus),
            Op::Dec => self.op_dec(bus),
            Op::Daa => self.op_daa(),
            Op::Das => self.op_das(),
            Op::Aaa => self.op_aaa(),
            Op::Aas => self.op_aas(),
            Op::Cbw => self.op_cbw(),
            Op::Cwd => self.op_cwd(),
            Op::Mov => self.op_mov(bus),
            Op::Xchg => self.op_xchg(bus),
            Op::Lea => self.op_lea(bus),
            Op::Lds => self.op_lseg(bus, crate::registers::DS),
            Op::Les => self.op_lseg(bus, crate::registers::ES),
            Op::Push => self.op_push(bus),
            Op::Pop => self.op_pop(bus),
            Op::Pushf => self.op_pushf(bus),
            Op::Popf => self.op_popf(bus),
            Op::Sahf => self.op_sahf(),
            Op::Lahf => self.op_lahf(),
            Op::Jcc(cond) => self.op_jcc(bus, cond),
            Op::CallNear => self.op_call_near(bus),
            Op::CallFar => self.op_call_far(bus),
            Op::JmpNear => self.op_jmp_near(),
            Op::JmpFar => self.op_jmp_far(),
            Op::RetNear => self.op_ret_near(bus),
            Op::RetFar => self.op_ret_far(bus),
            Op::Wait => self.op_wait(),
            Op::ImmGroup => {
                let group_op = self
                    .dec
                    .modrm
                    .map_or(Op::Illegal, |m| IMM_GROUP[m.reg as usize]);
                self.dispatch(group_op, bus);
            }
            Op::Clc => self.op_set_flag(flags::CF, false),
            Op::Stc => self.op_set_flag(flags::CF, true),
            Op::Cmc => self.op_cmc(),
            Op::Cld => self.op_set_flag(flags::DF, false),
            Op::Std => self.op_set_flag(flags::DF, true),
            Op::Cli => self.op_set_flag(flags::IF, false),
            Op::Sti => self.op_set_flag(flags::IF, true),
            Op::Prefix => {
                debug_assert!(false, "prefix byte reached the executor");
                self.cycles += 1;
            }
            Op::Illegal => self.op_illegal(),
        }
    }

    /// Illegal opcode: 1-cycle NOP, latched for the host.
    fn op_illegal(&mut self) {
        self.illegal = self.dec.opcode;
        self.cycles += 1;
    }
}

impl Default for Cpu8086 {
    fn default() -> Self {
        Self::new()
    }
}

// === Observable implementation ===

const CPU8086_QUERY_PATHS: &[&str] = &[
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di",
    "al", "ah", "cl", "ch", "dl", "dh", "bl", "bh",
    "es", "cs", "ss", "ds",
    "ip", "flags",
    "flags.c", "flags.p", "flags.a", "flags.z", "flags.s",
    "flags.t", "flags.i", "flags.d", "flags.o",
    "cycles", "queue.len", "opcode", "illegal",
];

impl Observable for Cpu8086 {
    fn query(&self, path: &str) -> Option<Value> {
        use crate::registers as r;
        match path {
            "ax" => Some(self.regs.ax().into()),
            "cx" => Some(self.regs.cx().into()),
            "dx" => Some(self.regs.dx().into()),
            "bx" => Some(self.regs.bx().into()),
            "sp" => Some(self.regs.sp().into()),
            "bp" => Some(self.regs.bp().into()),
            "si" => Some(self.regs.si().into()),
            "di" => Some(self.regs.di().into()),
            "al" => Some(self.regs.gpr8(r::AL).into()),
            "ah" => Some(self.regs.gpr8(r::AH).into()),
            "cl" => Some(self.regs.gpr8(r::CL).into()),
            "ch" => Some(self.regs.gpr8(r::CH).into()),
            "dl" => Some(self.regs.gpr8(r::DL).into()),
            "dh" => Some(self.regs.gpr8(r::DH).into()),
            "bl" => Some(self.regs.gpr8(r::BL).into()),
            "bh" => Some(self.regs.gpr8(r::BH).into()),
            "es" => Some(self.regs.seg[r::ES as usize].into()),
            "cs" => Some(self.regs.seg[r::CS as usize].into()),
            "ss" => Some(self.regs.seg[r::SS as usize].into()),
            "ds" => Some(self.regs.seg[r::DS as usize].into()),
            "ip" => Some(self.regs.ip.into()),
            "flags" => Some(self.regs.flags.into()),
            "flags.c" => Some(self.regs.flag(flags::CF).into()),
            "flags.p" => Some(self.regs.flag(flags::PF).into()),
            "flags.a" => Some(self.regs.flag(flags::AF).into()),
            "flags.z" => Some(self.regs.flag(flags::ZF).into()),
            "flags.s" => Some(self.regs.flag(flags::SF).into()),
            "flags.t" => Some(self.regs.flag(flags::TF).into()),
            "flags.i" => Some(self.regs.flag(flags::IF).into()),
            "flags.d" => Some(self.regs.flag(flags::DF).into()),
            "flags.o" => Some(self.regs.flag(flags::OF).into()),
            "cycles" => Some(self.total_cycles.get().into()),
            "queue.len" => Some((self.queue.len() as u64).into()),
            "opcode" => self.dec.opcode.map(Value::U8),
            "illegal" => Some(self.illegal.is_some().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        CPU8086_QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FlatMemory;

    #[test]
    fn reset_lands_on_the_reset_vector() {
        let cpu = Cpu8086::new();
        assert_eq!(cpu.regs.seg[CS as usize], 0xFFFF);
        assert_eq!(cpu.regs.ip, 0x0000);
        assert_eq!(cpu.regs.physical(CS, cpu.regs.ip), 0xFFFF0);
        assert_eq!(cpu.regs.flags, 0);
        assert_eq!(cpu.queue_len(), 0);
        assert_eq!(cpu.cycles_remaining(), 0);
        assert_eq!(cpu.illegal_opcode(), None);
    }

    #[test]
    fn prefetch_takes_four_cycles_per_word() {
        let mut cpu = Cpu8086::new();
        let mut mem = FlatMemory::new();
        mem.load(0xFFFF0, &[0x90, 0x90, 0x90, 0x90]);

        // Countdown starts at 3: first word lands on the fourth tick.
        for _ in 0..3 {
            cpu.tick(&mut mem);
            assert_eq!(cpu.queue_len(), 0);
        }
        cpu.tick(&mut mem);
        assert!(cpu.queue_len() > 0);
    }

    #[test]
    fn illegal_opcode_is_latched_and_costs_one_cycle() {
        let mut cpu = Cpu8086::new();
        let mut mem = FlatMemory::new();
        // 0x0F is illegal; follow with a self-jump.
        mem.load(0xFFFF0, &[0x0F, 0xEB, 0xFE]);

        for _ in 0..40 {
            cpu.tick(&mut mem);
        }
        assert_eq!(cpu.illegal_opcode(), Some(0x0F));
    }
}
