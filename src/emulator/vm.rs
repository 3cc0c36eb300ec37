use super::basics::{Address, Keypad, Register, Value, FONT_OFFSET, GLYPH_HEIGHT, KEY_COUNT};
use super::display::DisplayBuffer;
use super::memory::{LoadError, Memory};
use super::program::{decode, AluOp, Instruction, MiscOp};
use super::registers::{RegisterFile, StackError};
use super::timers::{AudioGate, Timers};
use log::{debug, error, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RunState {
    Running,
    Paused,
    Halted,
}

/// What a single `step` did, as far as the scheduler cares.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StepOutcome {
    Continue,
    /// The display buffer changed and should be presented.
    Redraw,
    /// Waiting for a key press; stepping again retries the wait.
    Blocked,
}

/// Conditions that stop the machine.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Error)]
pub enum Fault {
    #[error("call stack overflow at {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("machine is not running ({0:?})")]
    NotRunning(RunState),
}

/// The whole emulated computer: memory, registers, display, timers, keypad and
/// the random source used by `CXNN`.
pub struct MachineState {
    boot_memory: Memory,
    memory: Memory,
    display: DisplayBuffer,
    registers: RegisterFile,
    timers: Timers,
    keypad: Keypad,
    run_state: RunState,
    redraw_pending: bool,
    awaiting_key: Option<Register>,
    rng: StdRng,
}

impl MachineState {
    /// Loads a program image with a random source seeded from the OS.
    pub fn load(image: &[u8]) -> Result<MachineState, LoadError> {
        MachineState::load_with_rng(image, StdRng::from_entropy())
    }

    pub fn load_with_seed(image: &[u8], seed: u64) -> Result<MachineState, LoadError> {
        MachineState::load_with_rng(image, StdRng::seed_from_u64(seed))
    }

    pub fn load_with_rng(image: &[u8], rng: StdRng) -> Result<MachineState, LoadError> {
        let boot_memory = Memory::with_image(image)?;
        info!("loaded {} byte program image", image.len());
        Ok(MachineState {
            memory: boot_memory.clone(),
            boot_memory,
            display: DisplayBuffer::new(),
            registers: RegisterFile::new(),
            timers: Timers::default(),
            keypad: [false; KEY_COUNT],
            run_state: RunState::Running,
            redraw_pending: false,
            awaiting_key: None,
            rng,
        })
    }

    /// Soft reset: everything goes back to the state right after `load`, with
    /// the same image. The random source keeps its sequence.
    pub fn reset(&mut self) {
        self.memory = self.boot_memory.clone();
        self.display.clear();
        self.registers = RegisterFile::new();
        self.timers = Timers::default();
        self.keypad = [false; KEY_COUNT];
        self.run_state = RunState::Running;
        self.redraw_pending = false;
        self.awaiting_key = None;
        info!("machine reset");
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn set_key(&mut self, key: u8, down: bool) {
        self.keypad[(key & 0x0F) as usize] = down;
    }

    pub fn register(&self, reg: Register) -> Value {
        self.registers.get(reg)
    }

    pub fn program_counter(&self) -> Address {
        self.registers.pc
    }

    pub fn index(&self) -> Address {
        self.registers.i
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
            info!("====== PAUSED ======");
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            info!("resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Halted => (),
        }
    }

    pub fn halt(&mut self) {
        self.run_state = RunState::Halted;
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Returns the redraw flag and clears it.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw_pending, false)
    }

    /// Counts the timers down by one frame.
    pub fn tick_timers(&mut self) -> AudioGate {
        self.timers.tick()
    }

    /// Fetches, decodes and executes one instruction.
    ///
    /// A stack fault halts the machine before it is returned; later calls
    /// report `Fault::NotRunning`.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        if self.run_state != RunState::Running {
            return Err(Fault::NotRunning(self.run_state));
        }
        if let Some(reg) = self.awaiting_key {
            return Ok(self.poll_key(reg));
        }

        let pc = self.registers.pc;
        let opcode = self.memory.read_word(pc);
        self.registers.pc.incr();
        let instruction = Instruction::from(decode(opcode));
        trace!("{:#05X}: {:04X} {}", pc.0, opcode, instruction);

        let result = self.execute_instruction(&instruction);
        if let Err(fault) = result {
            error!("halting: {}", fault);
            self.halt();
        }
        result
    }

    /// Completes a pending `FX0A`: the lowest pressed key wins.
    fn poll_key(&mut self, reg: Register) -> StepOutcome {
        match self.keypad.iter().position(|down| *down) {
            Some(key) => {
                self.registers.set(reg, Value(key as u8));
                self.registers.pc.incr();
                self.awaiting_key = None;
                StepOutcome::Continue
            }
            None => StepOutcome::Blocked,
        }
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc.incr();
        }
    }

    fn fault_pc(&self) -> u16 {
        Address::new(self.registers.pc.0.wrapping_sub(2)).0
    }

    /// Executes an already fetched instruction. The program counter must
    /// already point past it.
    pub fn execute_instruction(&mut self, instruction: &Instruction) -> Result<StepOutcome, Fault> {
        let regs = &mut self.registers;
        match *instruction {
            // Jumps
            Instruction::CallSubroutine(addr) => {
                if let Err(StackError::Overflow) = regs.stack.push(regs.pc) {
                    return Err(Fault::StackOverflow { pc: self.fault_pc() });
                }
                regs.pc = addr;
            }
            Instruction::ReturnSubroutine => match regs.stack.pop() {
                Ok(addr) => regs.pc = addr,
                Err(_) => return Err(Fault::StackUnderflow { pc: self.fault_pc() }),
            },
            Instruction::Jump(addr) => regs.pc = addr,
            Instruction::JumpAdd(addr) => {
                regs.pc = addr.offset(regs.get(Register(0)).0 as u16);
            }

            // Conditionals
            Instruction::IfNotEqualConst(vx, n) => {
                let skip = self.registers.get(vx) == n;
                self.skip_if(skip);
            }
            Instruction::IfEqualConst(vx, n) => {
                let skip = self.registers.get(vx) != n;
                self.skip_if(skip);
            }
            Instruction::IfNotEqual(vx, vy) => {
                let skip = self.registers.get(vx) == self.registers.get(vy);
                self.skip_if(skip);
            }
            Instruction::IfEqual(vx, vy) => {
                let skip = self.registers.get(vx) != self.registers.get(vy);
                self.skip_if(skip);
            }

            // Register arithmetic
            Instruction::SetConst(vx, n) => regs.set(vx, n),
            Instruction::AddConst(vx, n) => {
                let value = regs.get(vx).0.wrapping_add(n.0);
                regs.set(vx, Value(value));
            }
            Instruction::Alu(op, vx, vy) => self.execute_alu(op, vx, vy),

            // Key presses
            Instruction::IfNotKey(vx) => {
                let skip = self.key_down(vx);
                self.skip_if(skip);
            }
            Instruction::IfKey(vx) => {
                let skip = !self.key_down(vx);
                self.skip_if(skip);
            }

            // Graphics
            Instruction::ClearDisplay => {
                self.display.clear();
                self.redraw_pending = true;
                return Ok(StepOutcome::Redraw);
            }
            Instruction::Draw(vx, vy, n) => {
                let x = regs.get(vx).0;
                let y = regs.get(vy).0;
                let rows = self.memory.read_slice(regs.i, n as usize);
                let collision = self.display.draw_sprite(x, y, &rows);
                self.registers.set_flag(collision);
                self.redraw_pending = true;
                return Ok(StepOutcome::Redraw);
            }

            // I register
            Instruction::SetI(addr) => regs.i = addr,

            // Misc
            Instruction::Rand(vx, n) => {
                let value = self.rng.gen::<u8>() & n.0;
                self.registers.set(vx, Value(value));
            }
            Instruction::Misc(op, vx) => return Ok(self.execute_misc(op, vx)),
            Instruction::Unknown(opcode) => {
                debug!("unknown opcode {:04X} at {:#05X}, ignored", opcode, self.fault_pc());
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn key_down(&self, reg: Register) -> bool {
        self.keypad[(self.registers.get(reg).0 & 0x0F) as usize]
    }

    /// Both operands are read before anything is written, and the flag is
    /// written last, so `VF` as destination ends up holding the flag.
    fn execute_alu(&mut self, op: AluOp, vx: Register, vy: Register) {
        let x = self.registers.get(vx).0;
        let y = self.registers.get(vy).0;
        let (result, flag) = match op {
            AluOp::Copy => (y, None),
            AluOp::Or => (x | y, None),
            AluOp::And => (x & y, None),
            AluOp::Xor => (x ^ y, None),
            AluOp::Add => {
                let (sum, carry) = x.overflowing_add(y);
                (sum, Some(carry))
            }
            AluOp::Sub => (x.wrapping_sub(y), Some(x >= y)),
            AluOp::ShiftRight => (x >> 1, Some(x & 0x01 == 1)),
            AluOp::SubNeg => (y.wrapping_sub(x), Some(y >= x)),
            AluOp::ShiftLeft => (x << 1, Some(x & 0x80 != 0)),
        };
        self.registers.set(vx, Value(result));
        if let Some(flag) = flag {
            self.registers.set_flag(flag);
        }
    }

    fn execute_misc(&mut self, op: MiscOp, vx: Register) -> StepOutcome {
        let value = self.registers.get(vx);
        match op {
            MiscOp::GetDelayTimer => self.registers.set(vx, self.timers.delay),
            MiscOp::SetDelayTimer => self.timers.delay = value,
            MiscOp::SetSoundTimer => self.timers.sound = value,
            MiscOp::WaitKey => {
                self.registers.pc.decr();
                self.awaiting_key = Some(vx);
                return self.poll_key(vx);
            }
            MiscOp::AddToI => self.registers.i = self.registers.i.offset(value.0 as u16),
            MiscOp::SpriteAddr => {
                self.registers.i = Address::new(FONT_OFFSET + value.0 as u16 * GLYPH_HEIGHT);
            }
            MiscOp::Decimal => {
                let i = self.registers.i;
                self.memory.write(i, Value(value.0 / 100));
                self.memory.write(i.offset(1), Value(value.0 / 10 % 10));
                self.memory.write(i.offset(2), Value(value.0 % 10));
            }
            MiscOp::StoreRegisters => {
                let i = self.registers.i;
                for r in 0..=vx.0 {
                    self.memory.write(i.offset(r as u16), self.registers.get(Register(r)));
                }
            }
            MiscOp::LoadRegisters => {
                let i = self.registers.i;
                for r in 0..=vx.0 {
                    self.registers.set(Register(r), self.memory.read(i.offset(r as u16)));
                }
            }
        }
        StepOutcome::Continue
    }
}
