use crate::emulator::basics::{FRAME_RATE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::emulator::interface::Palette;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("instructions per second must be positive")]
    ZeroInstructionRate,

    #[error("frame rate must be positive")]
    ZeroFrameRate,

    #[error("only the 64x32 grid is supported, got {width}x{height}")]
    UnsupportedGrid { width: u32, height: u32 },

    #[error("scale factor must be positive")]
    ZeroScale,

    #[error("tone of {frequency} Hz cannot be produced at {sample_rate} samples per second")]
    UnplayableTone { frequency: u32, sample_rate: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub instructions_per_second: u32,
    pub frame_rate: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub scale_factor: u32,
    pub foreground: u32,
    pub background: u32,
    pub pixelated: bool,
    pub square_wave_frequency: u32,
    pub audio_sample_rate: u32,
    pub volume: i16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: 700,
            frame_rate: FRAME_RATE,
            window_width: SCREEN_WIDTH as u32,
            window_height: SCREEN_HEIGHT as u32,
            scale_factor: 20,
            foreground: 0xFFFF_FFFF,
            background: 0x0000_00FF,
            pixelated: true,
            square_wave_frequency: 440,
            audio_sample_rate: 44100,
            volume: 3000,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instructions_per_second == 0 {
            return Err(ConfigError::ZeroInstructionRate);
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.window_width != SCREEN_WIDTH as u32 || self.window_height != SCREEN_HEIGHT as u32 {
            return Err(ConfigError::UnsupportedGrid {
                width: self.window_width,
                height: self.window_height,
            });
        }
        if self.scale_factor == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if self.square_wave_frequency == 0
            || self.audio_sample_rate == 0
            || self.square_wave_frequency > self.audio_sample_rate / 2
        {
            return Err(ConfigError::UnplayableTone {
                frequency: self.square_wave_frequency,
                sample_rate: self.audio_sample_rate,
            });
        }
        Ok(())
    }

    /// Truncating division: 700 instructions per second at 60 Hz gives 11.
    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_second / self.frame_rate.max(1)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    pub fn palette(&self) -> Palette {
        Palette {
            foreground: self.foreground,
            background: self.background,
            pixelated: self.pixelated,
        }
    }

    /// Window size in host pixels.
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.window_width * self.scale_factor,
            self.window_height * self.scale_factor,
        )
    }
}

lazy_static! {
    /// Hex keypad on the left of a QWERTY keyboard:
    ///
    /// ```text
    /// 1 2 3 C      1 2 3 4
    /// 4 5 6 D      q w e r
    /// 7 8 9 E      a s d f
    /// A 0 B F      z x c v
    /// ```
    static ref KEYPAD_LAYOUT: HashMap<char, u8> = vec![
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ]
    .into_iter()
    .collect();
}

/// Keypad index for a host key, if it is part of the layout.
pub fn keypad_index(key: char) -> Option<u8> {
    KEYPAD_LAYOUT.get(&key.to_ascii_lowercase()).copied()
}

/// Parses `RRGGBBAA`, with or without a leading `0x` or `#`.
pub fn parse_color(text: &str) -> Result<u32, String> {
    let digits = text
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('#');
    if digits.len() != 8 {
        return Err(format!("expected 8 hex digits (RRGGBBAA), got {:?}", text));
    }
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid colour {:?}: {}", text, e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.instructions_per_frame(), 11);
        assert_eq!(config.window_size(), (1280, 640));
    }

    #[test]
    fn test_validation() {
        let bad_rate = Config {
            instructions_per_second: 0,
            ..Config::default()
        };
        assert_eq!(bad_rate.validate(), Err(ConfigError::ZeroInstructionRate));
        let bad_grid = Config {
            window_width: 128,
            ..Config::default()
        };
        assert_eq!(
            bad_grid.validate(),
            Err(ConfigError::UnsupportedGrid { width: 128, height: 32 })
        );
        let bad_tone = Config {
            square_wave_frequency: 30000,
            ..Config::default()
        };
        assert!(matches!(bad_tone.validate(), Err(ConfigError::UnplayableTone { .. })));
    }

    #[test]
    fn test_keypad_layout() {
        assert_eq!(keypad_index('x'), Some(0x0));
        assert_eq!(keypad_index('V'), Some(0xF));
        assert_eq!(keypad_index('4'), Some(0xC));
        assert_eq!(keypad_index('p'), None);
        let mut seen: Vec<u8> = KEYPAD_LAYOUT.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("FFFFFFFF"), Ok(0xFFFF_FFFF));
        assert_eq!(parse_color("0x000000ff"), Ok(0xFF));
        assert_eq!(parse_color("#12345678"), Ok(0x1234_5678));
        assert!(parse_color("fff").is_err());
        assert!(parse_color("GGGGGGGG").is_err());
    }
}
