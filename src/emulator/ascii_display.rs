use super::{
    basics::{SCREEN_HEIGHT, SCREEN_WIDTH},
    display::DisplayBuffer,
    interface::{AudioGate, AudioSink, ControlSignal, InputSampler, Keypad, Palette, Presenter},
};
use std::fmt;
use std::io::{self, Write};

impl fmt::Display for DisplayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..SCREEN_HEIGHT {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..SCREEN_WIDTH {
                f.write_str(if self.get(x, y) { "@" } else { " " })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for DisplayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DisplayBuffer {{")?;
        writeln!(f, "{}", self)?;
        write!(f, "}}")
    }
}

/// Headless frontend: prints the display as text, never reports key presses
/// and keeps the audio gate only so it can be inspected.
pub struct AsciiFrontend<W: Write> {
    out: W,
    frames_presented: u64,
    gate: AudioGate,
}

impl AsciiFrontend<io::Stdout> {
    pub fn stdout() -> Self {
        AsciiFrontend::new(io::stdout())
    }
}

impl<W: Write> AsciiFrontend<W> {
    pub fn new(out: W) -> Self {
        AsciiFrontend {
            out,
            frames_presented: 0,
            gate: AudioGate::Off,
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn gate(&self) -> AudioGate {
        self.gate
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, display: &DisplayBuffer) {
        if let Err(e) = writeln!(self.out, "{}\n", display) {
            log::warn!("could not write frame: {}", e);
        }
    }
}

impl<W: Write> Presenter for AsciiFrontend<W> {
    fn present(&mut self, display: &DisplayBuffer, _palette: &Palette) {
        self.frames_presented += 1;
        self.write_frame(display);
    }

    /// Writes an empty frame.
    fn clear(&mut self, _palette: &Palette) {
        self.write_frame(&DisplayBuffer::new());
    }
}

impl<W: Write> InputSampler for AsciiFrontend<W> {
    fn sample(&mut self, _keypad: &mut Keypad) -> Vec<ControlSignal> {
        Vec::new()
    }
}

impl<W: Write> AudioSink for AsciiFrontend<W> {
    fn set_gate(&mut self, gate: AudioGate) {
        self.gate = gate;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_glyph() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(0, 0, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        let text = display.to_string();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), SCREEN_HEIGHT as usize);
        assert!(lines.iter().all(|l| l.chars().count() == SCREEN_WIDTH as usize));
        assert!(lines[0].starts_with("@@@@ "));
        assert!(lines[1].starts_with("@  @ "));
        assert!(lines[5].trim().is_empty());
    }

    #[test]
    fn test_frontend_writes_frames() {
        let mut frontend = AsciiFrontend::new(Vec::new());
        let display = DisplayBuffer::new();
        frontend.present(&display, &Palette::default());
        assert_eq!(frontend.frames_presented(), 1);
        let written = String::from_utf8(frontend.into_inner()).unwrap();
        assert_eq!(written.lines().count(), SCREEN_HEIGHT as usize + 1);
    }

    #[test]
    fn test_clear_writes_blank_frame() {
        let mut frontend = AsciiFrontend::new(Vec::new());
        frontend.clear(&Palette::default());
        assert_eq!(frontend.frames_presented(), 0);
        let written = String::from_utf8(frontend.into_inner()).unwrap();
        assert_eq!(written.lines().count(), SCREEN_HEIGHT as usize + 1);
        assert!(written.chars().all(|c| c == ' ' || c == '\n'));
    }
}
