pub mod atomic;
pub mod error;
pub mod float;
pub mod layout;
pub mod opcode;
pub mod player;
pub mod rules;
pub mod skip;
pub mod sweep;
pub mod tape;

pub use atomic::{AtomicHandle, AtomicOp, AtomicState};
pub use error::SweepError;
pub use float::Float;
pub use layout::{TaylorBuffer, TaylorLayout, TaylorView};
pub use opcode::{CompareOp, OpCode};
pub use player::{OpInfo, Player};
pub use sweep::{forward_dir, forward_dir_with, SweepConfig};
pub use tape::{AtomicResult, Operand, Tape};

/// Coefficient buffer over `f64`.
pub type TaylorBuffer64 = TaylorBuffer<f64>;
/// Tape over `f64`.
pub type Tape64 = Tape<f64>;
