// crates/hl_solver/src/lib.rs

//! HydroLax 求解层
//!
//! 提供二维浅水方程的 Lax-Friedrichs 有限体积求解，包括：
//! - 结构化网格与幽灵单元布局 (grid)
//! - 守恒量状态与双缓冲 (state)
//! - 数值格式抽象与 LxF 模板 (scheme)
//! - 幽灵单元填充策略 (boundary)
//! - 时间推进引擎：Euler 步进、模拟循环、CFL、诊断 (engine)
//! - wgpu GPU 执行路径 (gpu)
//! - 运行时配置 (config)
//!
//! # 执行模型
//!
//! 每个时间步内所有内部单元的更新相互独立（数据并行），
//! 步与步之间严格串行：第 k+1 步开始前第 k 步的写入必须完全可见。
//! CPU 路径通过 rayon 行并行实现，GPU 路径通过命令提交 + 轮询同步实现。

pub mod boundary;
pub mod config;
pub mod engine;
pub mod gpu;
pub mod grid;
pub mod scheme;
pub mod state;
pub mod types;

// 重导出常用类型
pub use boundary::HaloPolicy;
pub use config::{BackendKind, Scenario, SimulationConfig};
pub use engine::{
    CflCalculator, DepthReport, EulerStepper, RunPhase, SimulateStats, Simulation,
};
pub use gpu::{GpuContext, GpuSimulation};
pub use grid::StructuredGrid;
pub use scheme::{FluxScheme, LxfScheme, Neighborhood, StepContext};
pub use state::{ConservedState, FieldSet, StatePair};
pub use types::{NumericalParams, SafeVelocity};
