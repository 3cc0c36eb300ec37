use super::basics::{Address, Register, Value, ENTRY_POINT, FLAG_REGISTER, REGISTER_COUNT, STACK_DEPTH};
use arrayvec::ArrayVec;

/// The return-address stack. Its capacity is fixed; callers decide what an
/// overflow or underflow means.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: ArrayVec<[Address; STACK_DEPTH]>,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StackError {
    Overflow,
    Underflow,
}

impl CallStack {
    pub fn push(&mut self, addr: Address) -> Result<(), StackError> {
        self.frames.try_push(addr).map_err(|_| StackError::Overflow)
    }

    pub fn pop(&mut self) -> Result<Address, StackError> {
        self.frames.pop().ok_or(StackError::Underflow)
    }

    /// Number of return addresses currently held; doubles as the stack pointer.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_full(&self) -> bool {
        self.frames.is_full()
    }
}

/// V0-VF, the index register and the program counter.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    v: [Value; REGISTER_COUNT],
    pub i: Address,
    pub pc: Address,
    pub stack: CallStack,
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile {
            v: [Value(0); REGISTER_COUNT],
            i: Address(0),
            pc: Address(ENTRY_POINT),
            stack: CallStack::default(),
        }
    }

    pub fn get(&self, reg: Register) -> Value {
        self.v[reg.index()]
    }

    pub fn set(&mut self, reg: Register, value: Value) {
        self.v[reg.index()] = value;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.set(FLAG_REGISTER, Value(flag as u8));
    }

    pub fn flag(&self) -> Value {
        self.get(FLAG_REGISTER)
    }

    pub fn values(&self) -> &[Value; REGISTER_COUNT] {
        &self.v
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        RegisterFile::new()
    }
}
