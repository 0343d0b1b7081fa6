pub mod console;
pub mod exec;
pub mod image;
pub mod instruction;
pub mod memory;
pub mod register;
pub mod trap;

use thiserror::Error;

pub use console::{BufferConsole, Console, HostConsole, TerminalGuard};
pub use exec::Vm;
pub use image::{load_image, load_image_file};
pub use memory::{Memory, KBSR_READY, MR_KBDR, MR_KBSR};
pub use register::{CondFlag, Register, RegisterFile};
pub use trap::TrapVector;

/// Total number of addressable words: every 16-bit address is valid.
pub const MEMORY_SIZE: usize = 1 << 16;

/// Program counter value after reset.
pub const PC_START: u16 = 0x3000;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad image: {0}")]
    BadImage(String),
    #[error("reserved opcode 0x{opcode:X} at pc=0x{pc:04X}")]
    ReservedOpcode { opcode: u16, pc: u16 },
    #[error("unknown trap vector 0x{vector:02X} at pc=0x{pc:04X}")]
    UnknownTrap { vector: u16, pc: u16 },
    #[error("interrupted")]
    Interrupted,
}
