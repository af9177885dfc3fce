// crates/hl_solver/src/engine/stepper.rs

//! Euler 步进驱动与模拟循环
//!
//! 单步时序固定为三段：
//!
//! 1. 填充当前代幽灵层（边界策略）
//! 2. 对全部内部单元应用模板，写入下一代
//! 3. `swap()` 交换两代角色，时钟前进 `t += dt`
//!
//! 模拟循环在此之上做步长裁剪：`dt_step = min(dt, t_end - t)`，
//! 保证恰好终止于 `t_end`，不会越过。裁剪步之后时钟直接对齐到
//! `t_end`，消除浮点累加残差。
//!
//! # 并行模型
//!
//! CPU 路径按行切分下一代缓冲（rayon），每行内串行扫描。
//! 单元更新只读当前代、只写本行下一代，行间无共享可变状态。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::boundary::HaloPolicy;
use crate::grid::{StructuredGrid, GHOST_WIDTH};
use crate::scheme::{FluxScheme, Neighborhood, StepContext};
use crate::state::{FieldSet, StatePair};
use crate::types::NumericalParams;
use hl_core::{HlError, HlResult, RuntimeScalar};

// ============================================================
// 运行阶段
// ============================================================

/// 模拟器生命周期阶段
///
/// ```text
/// Idle --step--> Stepping --到达 t_end--> Done
/// ```
///
/// Done 之后仍可继续 `step_euler`（回到 Stepping），
/// 重置需重新构建模拟器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// 已初始化，尚未步进
    #[default]
    Idle,
    /// 至少执行过一步
    Stepping,
    /// 模拟循环已到达终止时刻
    Done,
}

/// 一次模拟循环的统计结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulateStats {
    /// 实际执行的步数
    pub steps: u64,
    /// 循环结束时的模拟时刻 [s]
    pub t: f64,
    /// 是否被外部停止标志中断
    pub interrupted: bool,
}

// ============================================================
// Euler 步进 trait
// ============================================================

/// Euler 步进器（CPU 与 GPU 路径的统一驱动接口）
///
/// `simulate` 为提供的默认实现，两条路径共享同一套
/// 裁剪/终止/中断语义。
pub trait EulerStepper {
    /// 推进一个 Euler 时间步
    ///
    /// # 错误
    /// `dt` 非正或非有限时返回 [`HlError::InvalidStepSize`]，
    /// 且不改变任何状态。
    fn step_euler(&mut self, dt: f64) -> HlResult<()>;

    /// 当前模拟时刻 [s]
    fn time(&self) -> f64;

    /// 将时钟对齐到指定时刻（裁剪步后消除浮点累加残差）
    fn align_time(&mut self, t: f64);

    /// 当前运行阶段
    fn phase(&self) -> RunPhase;

    /// 设置运行阶段（仅存储，不触发任何动作）
    fn set_phase(&mut self, phase: RunPhase);

    /// 外部是否请求停止（默认无停止源）
    fn stop_requested(&self) -> bool {
        false
    }

    /// 以固定步长推进到 `t_end`
    ///
    /// 末步裁剪为剩余时间，终止时刻精确等于 `t_end`。
    /// 每步之间检查停止标志，中断时返回部分统计且阶段保持 Stepping。
    ///
    /// # 错误
    /// `dt` 非正或非有限时返回 [`HlError::InvalidStepSize`]
    fn simulate(&mut self, t_end: f64, dt: f64) -> HlResult<SimulateStats> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(HlError::InvalidStepSize { dt });
        }

        let mut steps = 0u64;
        let mut interrupted = false;

        while self.time() < t_end {
            if self.stop_requested() {
                interrupted = true;
                break;
            }
            let remaining = t_end - self.time();
            if remaining <= dt {
                self.step_euler(remaining)?;
                self.align_time(t_end);
            } else {
                self.step_euler(dt)?;
            }
            steps += 1;
        }

        if !interrupted {
            self.set_phase(RunPhase::Done);
        }

        Ok(SimulateStats {
            steps,
            t: self.time(),
            interrupted,
        })
    }
}

// ============================================================
// CPU 模拟器
// ============================================================

/// CPU 路径的浅水方程模拟器
///
/// 组合网格、双缓冲状态、数值格式与边界策略。
/// 格式通过 [`FluxScheme`] 注入，引擎本身不含任何格式知识。
pub struct Simulation<S: RuntimeScalar, F: FluxScheme<S>> {
    grid: StructuredGrid<S>,
    state: StatePair<S>,
    scheme: F,
    halo: HaloPolicy,
    params: NumericalParams<S>,
    t: f64,
    step_count: u64,
    phase: RunPhase,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl<S: RuntimeScalar, F: FluxScheme<S>> Simulation<S, F> {
    /// 从初始条件构建模拟器
    ///
    /// 初始数组为行主序、含幽灵单元，长度须等于 `grid.total_cells()`。
    ///
    /// # 错误
    /// 任一初始数组维度不匹配时返回 [`HlError::DimensionMismatch`]
    pub fn new(
        grid: StructuredGrid<S>,
        scheme: F,
        halo: HaloPolicy,
        params: NumericalParams<S>,
        h0: &[S],
        hu0: &[S],
        hv0: &[S],
    ) -> HlResult<Self> {
        let state = StatePair::initialize(&grid, h0, hu0, hv0)?;
        Ok(Self {
            grid,
            state,
            scheme,
            halo,
            params,
            t: 0.0,
            step_count: 0,
            phase: RunPhase::Idle,
            stop_flag: None,
        })
    }

    /// 静水初始条件的便捷构造（均匀水深、零动量）
    pub fn still_water(
        grid: StructuredGrid<S>,
        scheme: F,
        halo: HaloPolicy,
        params: NumericalParams<S>,
        depth: S,
    ) -> HlResult<Self> {
        let n = grid.total_cells();
        let h0 = vec![depth; n];
        let zero = vec![S::ZERO; n];
        Self::new(grid, scheme, halo, params, &h0, &zero, &zero)
    }

    /// 注入外部停止标志（置位后在下一步边界生效）
    pub fn set_stop_flag(&mut self, flag: Arc<AtomicBool>) {
        self.stop_flag = Some(flag);
    }

    /// 网格
    pub fn grid(&self) -> &StructuredGrid<S> {
        &self.grid
    }

    /// 数值参数
    pub fn params(&self) -> &NumericalParams<S> {
        &self.params
    }

    /// 当前代字段（只读）
    pub fn current(&self) -> &FieldSet<S> {
        self.state.current()
    }

    /// 累计步数
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// 对全部内部单元应用模板，结果写入下一代
    fn sweep(&mut self, dt: S) {
        let ctx = StepContext {
            dt,
            dx: self.grid.dx(),
            dy: self.grid.dy(),
            params: self.params,
        };
        let stride = self.grid.stride();
        let nx = self.grid.nx();
        let ny = self.grid.ny();
        let scheme = &self.scheme;
        let (cur, next) = self.state.split();

        next.h
            .par_chunks_mut(stride)
            .zip(next.hu.par_chunks_mut(stride))
            .zip(next.hv.par_chunks_mut(stride))
            .enumerate()
            .skip(GHOST_WIDTH)
            .take(ny)
            .for_each(|(j, ((row_h, row_hu), row_hv))| {
                for i in GHOST_WIDTH..=nx {
                    let c = j * stride + i;
                    let nb = Neighborhood {
                        center: cur.get(c),
                        west: cur.get(c - 1),
                        east: cur.get(c + 1),
                        south: cur.get(c - stride),
                        north: cur.get(c + stride),
                    };
                    let out = scheme.update(&nb, &ctx);
                    row_h[i] = out.h;
                    row_hu[i] = out.hu;
                    row_hv[i] = out.hv;
                }
            });
    }
}

impl<S: RuntimeScalar, F: FluxScheme<S>> EulerStepper for Simulation<S, F> {
    fn step_euler(&mut self, dt: f64) -> HlResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(HlError::InvalidStepSize { dt });
        }
        let dt_s = S::from_f64(dt).ok_or(HlError::InvalidStepSize { dt })?;

        // 1. 当前代幽灵层填充
        self.halo.fill_halo(&self.grid, self.state.current_mut());

        // 2. 模板扫描：当前代 -> 下一代
        self.sweep(dt_s);

        // 3. 角色交换 + 时钟前进
        self.state.swap();
        self.t += dt;
        self.step_count += 1;
        self.phase = RunPhase::Stepping;
        Ok(())
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn align_time(&mut self, t: f64) {
        self.t = t;
    }

    fn phase(&self) -> RunPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
