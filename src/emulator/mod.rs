pub mod ascii_display;
pub mod audio;
pub mod basics;
pub mod display;
pub mod executor;
pub mod interface;
pub mod memory;
pub mod program;
pub mod registers;
pub mod timers;
pub mod vm;
