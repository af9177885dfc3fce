// crates/hl_solver/src/gpu/mod.rs

//! wgpu GPU 执行路径
//!
//! 将 LxF 模板搬到计算着色器上执行，单步时序与 CPU 路径一致：
//! 幽灵层填充 pass -> 模板 pass -> 缓冲区交换。两个 pass 编码进
//! 同一次提交，提交后以 `Maintain::Wait` 轮询作为步间同步点。
//!
//! GPU 路径固定使用 f32（存储减半，计算吞吐翻倍），
//! 初始条件与回读数据均为 f32；f64 精度验证走 CPU 路径。
//!
//! # 模块划分
//!
//! - [`context`]: 设备/队列获取
//! - [`buffer`]: 类型化缓冲区与双缓冲
//! - [`params`]: uniform 参数与绑定组布局
//! - [`shaders`]: WGSL 源码（编译期内嵌）
//! - [`solver`]: GPU 模拟器（实现 [`EulerStepper`]）
//!
//! [`EulerStepper`]: crate::engine::EulerStepper

pub mod buffer;
pub mod context;
pub mod params;
pub mod shaders;
pub mod solver;

pub use context::GpuContext;
pub use solver::{GpuError, GpuSimulation};
