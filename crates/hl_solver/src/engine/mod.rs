// crates/hl_solver/src/engine/mod.rs

//! 时间推进引擎
//!
//! - [`stepper`]: Euler 步进驱动与模拟循环
//! - [`cfl`]: CFL 稳定步长估计
//! - [`diagnostics`]: 水深场诊断（稳定性哨兵）

pub mod cfl;
pub mod diagnostics;
pub mod stepper;

pub use cfl::CflCalculator;
pub use diagnostics::DepthReport;
pub use stepper::{EulerStepper, RunPhase, SimulateStats, Simulation};
