pub const MEMORY_SIZE: usize = 4096;
pub const ADDRESS_MASK: u16 = 0x0FFF;
pub const SCREEN_WIDTH: u8 = 64;
pub const SCREEN_HEIGHT: u8 = 32;
pub const DISPLAY_SIZE: usize = SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize;
pub const FONT_OFFSET: u16 = 0;
pub const GLYPH_HEIGHT: u16 = 5;
pub const ENTRY_POINT: u16 = 0x200;
pub const STACK_DEPTH: usize = 12;
pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const FLAG_REGISTER: Register = Register(0xF);
pub const FRAME_RATE: u32 = 60;

pub type Keypad = [bool; KEY_COUNT];

/// Largest program image that fits between the entry point and the end of memory.
pub const MAX_IMAGE_SIZE: usize = MEMORY_SIZE - ENTRY_POINT as usize;

#[rustfmt::skip]
pub const FONT_SPRITES: [u8; 16 * GLYPH_HEIGHT as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// A 12-bit guest address. Construction and arithmetic keep it inside memory.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Address(pub u16);

impl Address {
    pub fn new(raw: u16) -> Address {
        Address(raw & ADDRESS_MASK)
    }

    pub fn offset(self, by: u16) -> Address {
        Address::new(self.0.wrapping_add(by))
    }

    pub fn incr(&mut self) {
        *self = self.offset(2);
    }

    pub fn decr(&mut self) {
        *self = Address::new(self.0.wrapping_sub(2));
    }

    pub fn index(self) -> usize {
        (self.0 & ADDRESS_MASK) as usize
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Register(pub u8);

impl Register {
    pub fn index(self) -> usize {
        (self.0 & 0x0F) as usize
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Value(pub u8);
