use super::interface::{AudioGate, ControlSignal, Frontend, Palette};
use super::vm::{Fault, MachineState, RunState, StepOutcome};
use crate::config::Config;
use log::{debug, info};
use std::{
    thread,
    time::{Duration, Instant},
};

/// What happened during one frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct FrameReport {
    pub instructions: u32,
    pub presented: bool,
    pub gate: AudioGate,
    /// False once a quit request has been seen.
    pub keep_running: bool,
}

/// Drives a machine at a fixed frame rate: input, an instruction batch, one
/// timer tick and, if needed, a redraw per frame.
pub struct Executor {
    vm: MachineState,
    instructions_per_frame: u32,
    frame_budget: Duration,
    palette: Palette,
}

impl Executor {
    pub fn new(vm: MachineState, config: &Config) -> Executor {
        Executor {
            vm,
            instructions_per_frame: config.instructions_per_frame(),
            frame_budget: config.frame_budget(),
            palette: config.palette(),
        }
    }

    pub fn vm(&self) -> &MachineState {
        &self.vm
    }

    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_frame
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Clears the frontend to the background colour. Called once after load
    /// and again after each reset.
    pub fn start<F: Frontend>(&mut self, frontend: &mut F) {
        frontend.clear(&self.palette);
        frontend.set_gate(AudioGate::Off);
    }

    fn apply(&mut self, signal: ControlSignal, frontend: &mut impl Frontend) {
        match signal {
            ControlSignal::TogglePause => self.vm.toggle_pause(),
            ControlSignal::Reset => {
                self.vm.reset();
                self.start(frontend);
            }
            ControlSignal::Quit => {
                info!("quit requested");
                self.vm.halt();
            }
        }
    }

    /// Runs one frame without waiting for the frame budget.
    pub fn run_frame<F: Frontend>(&mut self, frontend: &mut F) -> Result<FrameReport, Fault> {
        let mut report = FrameReport {
            instructions: 0,
            presented: false,
            gate: self.vm.timers().gate(),
            keep_running: true,
        };

        for signal in frontend.sample(self.vm.keypad_mut()) {
            self.apply(signal, frontend);
            if self.vm.run_state() == RunState::Halted {
                break;
            }
        }
        match self.vm.run_state() {
            RunState::Halted => {
                report.keep_running = false;
                return Ok(report);
            }
            RunState::Paused => return Ok(report),
            RunState::Running => (),
        }

        for _ in 0..self.instructions_per_frame {
            // Input only changes between frames, so a blocked wait stays blocked.
            if self.vm.step()? == StepOutcome::Blocked {
                break;
            }
            report.instructions += 1;
        }

        report.gate = self.vm.tick_timers();
        frontend.set_gate(report.gate);

        if self.vm.take_redraw() {
            frontend.present(self.vm.display(), &self.palette);
            report.presented = true;
        }
        Ok(report)
    }

    /// Runs frames in real time until a quit request or a fault. Each frame
    /// sleeps for whatever is left of its budget; an overrun frame is followed
    /// immediately by the next one, with no catching up.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> Result<(), Fault> {
        self.start(frontend);
        loop {
            let started = Instant::now();
            if !self.run_frame(frontend)?.keep_running {
                return Ok(());
            }
            let elapsed = started.elapsed();
            match self.frame_budget.checked_sub(elapsed) {
                Some(remaining) => thread::sleep(remaining),
                None => debug!("frame overran its budget by {:?}", elapsed - self.frame_budget),
            }
        }
    }

    /// Runs at most `frames` frames as fast as possible. Returns how many ran.
    pub fn run_frames<F: Frontend>(&mut self, frontend: &mut F, frames: u64) -> Result<u64, Fault> {
        self.start(frontend);
        for frame in 0..frames {
            if !self.run_frame(frontend)?.keep_running {
                return Ok(frame);
            }
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::emulator::basics::{Register, Value};
    use crate::emulator::display::DisplayBuffer;
    use crate::emulator::interface::{AudioSink, InputSampler, Keypad, Presenter};

    #[derive(Default)]
    struct Recorder {
        signals: Vec<Vec<ControlSignal>>,
        presented: usize,
        cleared: usize,
        gates: Vec<AudioGate>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, _display: &DisplayBuffer, _palette: &Palette) {
            self.presented += 1;
        }

        fn clear(&mut self, _palette: &Palette) {
            self.cleared += 1;
        }
    }

    impl InputSampler for Recorder {
        fn sample(&mut self, _keypad: &mut Keypad) -> Vec<ControlSignal> {
            if self.signals.is_empty() {
                Vec::new()
            } else {
                self.signals.remove(0)
            }
        }
    }

    impl AudioSink for Recorder {
        fn set_gate(&mut self, gate: AudioGate) {
            self.gates.push(gate);
        }
    }

    fn executor(program: &[u16], ips: u32) -> Executor {
        let image: Vec<u8> = program.iter().flat_map(|op| op.to_be_bytes().to_vec()).collect();
        let vm = MachineState::load_with_seed(&image, 1).unwrap();
        let config = Config {
            instructions_per_second: ips,
            ..Config::default()
        };
        Executor::new(vm, &config)
    }

    #[test]
    fn test_instructions_per_frame() {
        assert_eq!(executor(&[], 700).instructions_per_frame(), 11);
        assert_eq!(executor(&[], 59).instructions_per_frame(), 0);
        let budget = executor(&[], 700).frame_budget();
        assert!(budget > Duration::from_millis(16) && budget < Duration::from_millis(17));
    }

    #[test]
    fn test_frame_runs_batch_then_timers() {
        // sound timer = 3, then V0 += 1 forever
        let mut exec = executor(&[0x6003, 0xF018, 0x7001, 0x1204], 600);
        let mut frontend = Recorder::default();
        let report = exec.run_frame(&mut frontend).unwrap();
        assert_eq!(report.instructions, 10);
        assert_eq!(report.gate, AudioGate::On);
        assert!(!report.presented);
        assert_eq!(exec.vm().timers().sound.0, 2);
        assert_eq!(frontend.gates, vec![AudioGate::On]);
    }

    #[test]
    fn test_redraw_presented_once() {
        let mut exec = executor(&[0xD005, 0x1202], 600);
        let mut frontend = Recorder::default();
        assert!(exec.run_frame(&mut frontend).unwrap().presented);
        assert!(!exec.run_frame(&mut frontend).unwrap().presented);
        assert_eq!(frontend.presented, 1);
    }

    #[test]
    fn test_quit_before_batch() {
        let mut exec = executor(&[0x7001, 0x1200], 600);
        let mut frontend = Recorder {
            signals: vec![vec![ControlSignal::Quit]],
            ..Recorder::default()
        };
        let report = exec.run_frame(&mut frontend).unwrap();
        assert!(!report.keep_running);
        assert_eq!(report.instructions, 0);
        assert_eq!(exec.vm().run_state(), RunState::Halted);
        assert_eq!(exec.vm().timers().sound.0, 0);
    }

    #[test]
    fn test_pause_skips_frame() {
        let mut exec = executor(&[0x6005, 0xF015, 0x1204], 600);
        let mut frontend = Recorder {
            signals: vec![vec![], vec![ControlSignal::TogglePause], vec![], vec![ControlSignal::TogglePause]],
            ..Recorder::default()
        };
        exec.run_frame(&mut frontend).unwrap();
        assert_eq!(exec.vm().timers().delay.0, 4);
        let paused = exec.run_frame(&mut frontend).unwrap();
        assert_eq!(paused.instructions, 0);
        assert!(paused.keep_running);
        exec.run_frame(&mut frontend).unwrap();
        assert_eq!(exec.vm().timers().delay.0, 4);
        exec.run_frame(&mut frontend).unwrap();
        assert_eq!(exec.vm().timers().delay.0, 3);
    }

    #[test]
    fn test_reset_clears_frontend() {
        let mut exec = executor(&[0x6042, 0x1202], 600);
        let mut frontend = Recorder {
            signals: vec![vec![], vec![ControlSignal::Reset]],
            ..Recorder::default()
        };
        exec.start(&mut frontend);
        exec.run_frame(&mut frontend).unwrap();
        exec.run_frame(&mut frontend).unwrap();
        assert_eq!(frontend.cleared, 2);
        assert_eq!(exec.vm().run_state(), RunState::Running);
    }

    #[test]
    fn test_blocked_ends_batch() {
        let mut exec = executor(&[0xF00A], 600);
        let mut frontend = Recorder::default();
        let report = exec.run_frame(&mut frontend).unwrap();
        assert_eq!(report.instructions, 0);
        assert!(exec.vm().is_awaiting_key());
    }

    #[test]
    fn test_fault_stops_run() {
        let mut exec = executor(&[0x00EE], 600);
        let mut frontend = Recorder::default();
        assert_eq!(exec.run(&mut frontend), Err(Fault::StackUnderflow { pc: 0x200 }));
        assert_eq!(exec.vm().run_state(), RunState::Halted);
    }

    #[test]
    fn test_run_sleeps_out_each_frame() {
        // two running frames, four paused ones, quit on the seventh
        let mut exec = executor(&[0x7001, 0x1200], 600);
        let mut frontend = Recorder {
            signals: vec![
                vec![],
                vec![],
                vec![ControlSignal::TogglePause],
                vec![],
                vec![],
                vec![],
                vec![ControlSignal::Quit],
            ],
            ..Recorder::default()
        };
        let started = Instant::now();
        exec.run(&mut frontend).unwrap();
        assert!(started.elapsed() >= exec.frame_budget() * 6);
        assert_eq!(exec.vm().register(Register(0)), Value(10));
        assert_eq!(frontend.gates.len(), 3);
    }

    #[test]
    fn test_run_frames_stops_on_quit() {
        let mut exec = executor(&[0x1200], 600);
        let mut frontend = Recorder {
            signals: vec![vec![], vec![], vec![ControlSignal::Quit]],
            ..Recorder::default()
        };
        assert_eq!(exec.run_frames(&mut frontend, 10).unwrap(), 2);
    }
}
