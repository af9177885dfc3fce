// crates/hl_solver/src/scheme/mod.rs

//! 数值格式抽象
//!
//! 通过注入式策略对象选择格式：时间推进引擎只依赖 [`FluxScheme`] trait，
//! 格式实现（当前仅 LxF）作为组合成员注入，而非继承基类。
//!
//! # 每单元计算契约
//!
//! `update` 是纯函数：给定一个内部单元的十字邻域与步进上下文，
//! 返回更新后的守恒量。实现必须满足：
//! - 只读取传入的邻域（即"当前代"），不依赖任何跨单元可变状态
//! - 各单元间可任意顺序、完全并行地求值
//! - 数值保护（干单元）在实现内部静默完成，不返回错误

pub mod lxf;

pub use lxf::LxfScheme;

use crate::state::ConservedState;
use crate::types::NumericalParams;
use hl_core::RuntimeScalar;

/// 步进上下文
///
/// 以命名字段替代原生内核的打包位置参数签名，
/// 由绑定层翻译到具体执行后端（CPU 闭包或 GPU uniform）。
#[derive(Debug, Clone, Copy)]
pub struct StepContext<S: RuntimeScalar> {
    /// 时间步长 [s]
    pub dt: S,
    /// x 方向单元间距 [m]
    pub dx: S,
    /// y 方向单元间距 [m]
    pub dy: S,
    /// 数值参数（g, eps_h）
    pub params: NumericalParams<S>,
}

/// 单元十字邻域（中心 + 四个轴向邻居）
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<S: RuntimeScalar> {
    /// 中心单元 (i, j)
    pub center: ConservedState<S>,
    /// 西邻 (i-1, j)
    pub west: ConservedState<S>,
    /// 东邻 (i+1, j)
    pub east: ConservedState<S>,
    /// 南邻 (i, j-1)
    pub south: ConservedState<S>,
    /// 北邻 (i, j+1)
    pub north: ConservedState<S>,
}

/// 数值格式 trait
pub trait FluxScheme<S: RuntimeScalar>: Send + Sync {
    /// 格式名称
    fn name(&self) -> &'static str;

    /// 所需幽灵层宽度
    fn ghost_width(&self) -> usize;

    /// 计算一个内部单元的更新后守恒量
    fn update(&self, nb: &Neighborhood<S>, ctx: &StepContext<S>) -> ConservedState<S>;
}
