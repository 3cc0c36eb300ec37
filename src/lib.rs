//! An interpreter for the CHIP-8 virtual machine.
//!
//! [`emulator::vm::MachineState`] holds the machine and executes single
//! instructions; [`emulator::executor::Executor`] paces it at a fixed frame
//! rate against a [`emulator::interface::Frontend`].

pub mod config;
pub mod emulator;
#[cfg(feature = "sfml")]
pub mod visualizer;
