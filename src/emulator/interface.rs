//! What the interpreter needs from the outside world: somewhere to show the
//! display, a source of key states and control requests, and a tone switch.

use super::display::DisplayBuffer;

pub use super::basics::Keypad;
pub use super::timers::AudioGate;

/// Colours are RGBA, most significant byte red.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Palette {
    pub foreground: u32,
    pub background: u32,
    /// Outline lit cells with the background colour.
    pub pixelated: bool,
}

impl Palette {
    pub fn rgba(color: u32) -> (u8, u8, u8, u8) {
        let [r, g, b, a] = color.to_be_bytes();
        (r, g, b, a)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            foreground: 0xFFFF_FFFF,
            background: 0x0000_00FF,
            pixelated: true,
        }
    }
}

/// Requests delivered to the scheduler between frames.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ControlSignal {
    TogglePause,
    Reset,
    Quit,
}

pub trait Presenter {
    /// Shows the current display buffer.
    fn present(&mut self, display: &DisplayBuffer, palette: &Palette);

    /// Fills the whole output with the background colour.
    fn clear(&mut self, palette: &Palette);
}

pub trait InputSampler {
    /// Applies pending key transitions to `keypad` and returns any control
    /// requests seen since the last call.
    fn sample(&mut self, keypad: &mut Keypad) -> Vec<ControlSignal>;
}

pub trait AudioSink {
    fn set_gate(&mut self, gate: AudioGate);
}

/// Everything the scheduler talks to. Implemented for any type that provides
/// all three halves, which lets one window object serve as all of them.
pub trait Frontend: Presenter + InputSampler + AudioSink {}

impl<T: Presenter + InputSampler + AudioSink> Frontend for T {}
