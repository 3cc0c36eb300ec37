use super::basics::{Address, Register, Value};
use std::fmt;

/// The raw sub-fields of an opcode. Every 16-bit word has one; which fields
/// matter depends on the instruction class.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DecodedInstruction {
    pub opcode: u16,
    pub nnn: Address,
    pub nn: Value,
    pub n: u8,
    pub x: Register,
    pub y: Register,
}

pub fn decode(opcode: u16) -> DecodedInstruction {
    DecodedInstruction {
        opcode,
        nnn: Address(opcode & 0x0FFF),
        nn: Value((opcode & 0x00FF) as u8),
        n: (opcode & 0x000F) as u8,
        x: Register(((opcode & 0x0F00) >> 8) as u8),
        y: Register(((opcode & 0x00F0) >> 4) as u8),
    }
}

impl DecodedInstruction {
    pub fn class(&self) -> u8 {
        (self.opcode >> 12) as u8
    }
}

/// Register-to-register operations of the `8XYN` group.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AluOp {
    Copy,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubNeg,
    ShiftLeft,
}

/// The `FXNN` group.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MiscOp {
    GetDelayTimer,
    WaitKey,
    SetDelayTimer,
    SetSoundTimer,
    AddToI,
    SpriteAddr,
    Decimal,
    StoreRegisters,
    LoadRegisters,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Instruction {
    ClearDisplay,
    ReturnSubroutine,
    Jump(Address),
    CallSubroutine(Address),
    IfNotEqualConst(Register, Value),
    IfEqualConst(Register, Value),
    IfNotEqual(Register, Register),
    IfEqual(Register, Register),
    SetConst(Register, Value),
    AddConst(Register, Value),
    Alu(AluOp, Register, Register),
    SetI(Address),
    JumpAdd(Address),
    Rand(Register, Value),
    Draw(Register, Register, u8),
    IfNotKey(Register),
    IfKey(Register),
    Misc(MiscOp, Register),
    /// Anything outside the instruction set, including `0NNN` machine routines.
    Unknown(u16),
}

impl Instruction {
    pub fn from_opcode(opcode: u16) -> Instruction {
        Instruction::from(decode(opcode))
    }

    pub fn from_16bit(a: u8, b: u8) -> Instruction {
        Instruction::from_opcode(u16::from_be_bytes([a, b]))
    }
}

impl From<DecodedInstruction> for Instruction {
    fn from(d: DecodedInstruction) -> Instruction {
        // Skip instructions are named for when the following instruction runs.
        match (d.class(), d.nn.0, d.n) {
            (0x0, 0xE0, _) if d.x.0 == 0 => Instruction::ClearDisplay,
            (0x0, 0xEE, _) if d.x.0 == 0 => Instruction::ReturnSubroutine,
            (0x1, _, _) => Instruction::Jump(d.nnn),
            (0x2, _, _) => Instruction::CallSubroutine(d.nnn),
            (0x3, _, _) => Instruction::IfNotEqualConst(d.x, d.nn),
            (0x4, _, _) => Instruction::IfEqualConst(d.x, d.nn),
            (0x5, _, 0x0) => Instruction::IfNotEqual(d.x, d.y),
            (0x6, _, _) => Instruction::SetConst(d.x, d.nn),
            (0x7, _, _) => Instruction::AddConst(d.x, d.nn),
            (0x8, _, n) => match alu_op(n) {
                Some(op) => Instruction::Alu(op, d.x, d.y),
                None => Instruction::Unknown(d.opcode),
            },
            (0x9, _, 0x0) => Instruction::IfEqual(d.x, d.y),
            (0xA, _, _) => Instruction::SetI(d.nnn),
            (0xB, _, _) => Instruction::JumpAdd(d.nnn),
            (0xC, _, _) => Instruction::Rand(d.x, d.nn),
            (0xD, _, n) => Instruction::Draw(d.x, d.y, n),
            (0xE, 0x9E, _) => Instruction::IfNotKey(d.x),
            (0xE, 0xA1, _) => Instruction::IfKey(d.x),
            (0xF, nn, _) => match misc_op(nn) {
                Some(op) => Instruction::Misc(op, d.x),
                None => Instruction::Unknown(d.opcode),
            },
            _ => Instruction::Unknown(d.opcode),
        }
    }
}

fn alu_op(n: u8) -> Option<AluOp> {
    Some(match n {
        0x0 => AluOp::Copy,
        0x1 => AluOp::Or,
        0x2 => AluOp::And,
        0x3 => AluOp::Xor,
        0x4 => AluOp::Add,
        0x5 => AluOp::Sub,
        0x6 => AluOp::ShiftRight,
        0x7 => AluOp::SubNeg,
        0xE => AluOp::ShiftLeft,
        _ => return None,
    })
}

fn misc_op(nn: u8) -> Option<MiscOp> {
    Some(match nn {
        0x07 => MiscOp::GetDelayTimer,
        0x0A => MiscOp::WaitKey,
        0x15 => MiscOp::SetDelayTimer,
        0x18 => MiscOp::SetSoundTimer,
        0x1E => MiscOp::AddToI,
        0x29 => MiscOp::SpriteAddr,
        0x33 => MiscOp::Decimal,
        0x55 => MiscOp::StoreRegisters,
        0x65 => MiscOp::LoadRegisters,
        _ => return None,
    })
}

/// Assembly-like mnemonics, used for trace logging.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearDisplay => write!(f, "CLS"),
            ReturnSubroutine => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05X}", a.0),
            CallSubroutine(a) => write!(f, "CALL {:#05X}", a.0),
            IfNotEqualConst(x, n) => write!(f, "SE V{:X}, {:#04X}", x.0, n.0),
            IfEqualConst(x, n) => write!(f, "SNE V{:X}, {:#04X}", x.0, n.0),
            IfNotEqual(x, y) => write!(f, "SE V{:X}, V{:X}", x.0, y.0),
            IfEqual(x, y) => write!(f, "SNE V{:X}, V{:X}", x.0, y.0),
            SetConst(x, n) => write!(f, "LD V{:X}, {:#04X}", x.0, n.0),
            AddConst(x, n) => write!(f, "ADD V{:X}, {:#04X}", x.0, n.0),
            Alu(op, x, y) => {
                let mnemonic = match op {
                    AluOp::Copy => "LD",
                    AluOp::Or => "OR",
                    AluOp::And => "AND",
                    AluOp::Xor => "XOR",
                    AluOp::Add => "ADD",
                    AluOp::Sub => "SUB",
                    AluOp::ShiftRight => "SHR",
                    AluOp::SubNeg => "SUBN",
                    AluOp::ShiftLeft => "SHL",
                };
                write!(f, "{} V{:X}, V{:X}", mnemonic, x.0, y.0)
            }
            SetI(a) => write!(f, "LD I, {:#05X}", a.0),
            JumpAdd(a) => write!(f, "JP V0, {:#05X}", a.0),
            Rand(x, n) => write!(f, "RND V{:X}, {:#04X}", x.0, n.0),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x.0, y.0, n),
            IfNotKey(x) => write!(f, "SKP V{:X}", x.0),
            IfKey(x) => write!(f, "SKNP V{:X}", x.0),
            Misc(op, x) => match op {
                MiscOp::GetDelayTimer => write!(f, "LD V{:X}, DT", x.0),
                MiscOp::WaitKey => write!(f, "LD V{:X}, K", x.0),
                MiscOp::SetDelayTimer => write!(f, "LD DT, V{:X}", x.0),
                MiscOp::SetSoundTimer => write!(f, "LD ST, V{:X}", x.0),
                MiscOp::AddToI => write!(f, "ADD I, V{:X}", x.0),
                MiscOp::SpriteAddr => write!(f, "LD F, V{:X}", x.0),
                MiscOp::Decimal => write!(f, "LD B, V{:X}", x.0),
                MiscOp::StoreRegisters => write!(f, "LD [I], V{:X}", x.0),
                MiscOp::LoadRegisters => write!(f, "LD V{:X}, [I]", x.0),
            },
            Unknown(op) => write!(f, "DW {:#06X}", op),
        }
    }
}
