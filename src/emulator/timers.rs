use super::basics::Value;

/// Whether the external tone generator should be sounding this frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AudioGate {
    On,
    Off,
}

impl AudioGate {
    pub fn is_on(self) -> bool {
        self == AudioGate::On
    }
}

/// The delay and sound counters. Both count down once per frame and stop at zero.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Timers {
    pub delay: Value,
    pub sound: Value,
}

impl Timers {
    pub fn tick(&mut self) -> AudioGate {
        self.delay.0 = self.delay.0.saturating_sub(1);
        self.sound.0 = self.sound.0.saturating_sub(1);
        self.gate()
    }

    pub fn gate(&self) -> AudioGate {
        if self.sound.0 > 0 {
            AudioGate::On
        } else {
            AudioGate::Off
        }
    }
}
