/// An endless square wave. Sample `k` is `+volume` in the upper half of each
/// period and `-volume` in the lower half; `restart` goes back to `k = 0`.
#[derive(Clone, Debug)]
pub struct SquareWave {
    half_period: u32,
    volume: i16,
    sample_index: u32,
}

impl SquareWave {
    /// `frequency` must be non-zero and at most half of `sample_rate`.
    pub fn new(frequency: u32, sample_rate: u32, volume: i16) -> SquareWave {
        let period = sample_rate / frequency.max(1);
        SquareWave {
            half_period: (period / 2).max(1),
            volume,
            sample_index: 0,
        }
    }

    pub fn restart(&mut self) {
        self.sample_index = 0;
    }

    /// Samples for exactly one period, suitable for a looping sound buffer.
    pub fn one_period(&self) -> Vec<i16> {
        let mut wave = self.clone();
        wave.restart();
        wave.take(self.half_period as usize * 2).collect()
    }
}

impl Iterator for SquareWave {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        let high = (self.sample_index / self.half_period) % 2 == 1;
        self.sample_index = self.sample_index.wrapping_add(1);
        Some(if high { self.volume } else { -self.volume })
    }
}
