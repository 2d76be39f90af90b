//! Tick interpreter over compiled machines.

mod fsm;

pub use fsm::{Fsm, TickBranch, FINISHING_TARGET_NAME};
