// crates/hl_solver/src/state.rs

//! 守恒量状态管理
//!
//! 提供浅水方程求解所需的状态存储：
//! - [`ConservedState`]: 单个单元的守恒量 (h, hu, hv)
//! - [`FieldSet`]: 全网格 SoA 字段数组（含幽灵单元）
//! - [`StatePair`]: 双缓冲状态对（乒乓交换）
//!
//! # 布局设计
//!
//! 采用 SoA (Structure of Arrays) 布局：
//! ```text
//! h:  [h_0,  h_1,  h_2,  ...]
//! hu: [hu_0, hu_1, hu_2, ...]
//! hv: [hv_0, hv_1, hv_2, ...]
//! ```
//! 每个数组长度为 `grid.total_cells()`（含幽灵单元），行主序。
//!
//! # 双缓冲约束
//!
//! 任意时刻恰有一个"当前代"（步进只读输入）和一个"下一代"（步进只写输出）。
//! `swap()` 为 O(1) 角色交换，不复制数据、不重新分配。
//! 模板计算绝不读下一代、绝不写当前代，这是单步内无锁并行的前提。

use crate::grid::StructuredGrid;
use crate::types::SafeVelocity;
use hl_core::{HlError, HlResult, RuntimeScalar};

// ============================================================
// 守恒状态
// ============================================================

/// 单个单元的守恒状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConservedState<S: RuntimeScalar> {
    /// 水深 [m]
    pub h: S,
    /// x 方向动量 [m²/s]
    pub hu: S,
    /// y 方向动量 [m²/s]
    pub hv: S,
}

impl<S: RuntimeScalar> ConservedState<S> {
    /// 从守恒量创建
    #[inline]
    pub const fn new(h: S, hu: S, hv: S) -> Self {
        Self { h, hu, hv }
    }

    /// 从原始量 (h, u, v) 创建
    #[inline]
    pub fn from_primitive(h: S, u: S, v: S) -> Self {
        Self {
            h,
            hu: h * u,
            hv: h * v,
        }
    }

    /// 干单元安全的速度
    #[inline]
    pub fn velocity(&self, eps_h: S) -> SafeVelocity<S> {
        SafeVelocity::from_momentum(self.hu, self.hv, self.h, eps_h)
    }

    /// 所有分量是否有限
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.h.is_safe() && self.hu.is_safe() && self.hv.is_safe()
    }
}

// ============================================================
// 字段集
// ============================================================

/// 全网格守恒量字段（SoA，含幽灵单元）
#[derive(Debug, Clone)]
pub struct FieldSet<S: RuntimeScalar> {
    /// 水深
    pub h: Vec<S>,
    /// x 方向动量
    pub hu: Vec<S>,
    /// y 方向动量
    pub hv: Vec<S>,
}

impl<S: RuntimeScalar> FieldSet<S> {
    /// 创建零初始化字段集
    pub fn zeros(grid: &StructuredGrid<S>) -> Self {
        let n = grid.total_cells();
        Self {
            h: vec![S::ZERO; n],
            hu: vec![S::ZERO; n],
            hv: vec![S::ZERO; n],
        }
    }

    /// 从调用方提供的数组构建（含幽灵单元，行主序）
    ///
    /// # 错误
    /// 任一数组长度不等于 `grid.total_cells()` 时返回
    /// [`HlError::DimensionMismatch`]
    pub fn from_arrays(
        grid: &StructuredGrid<S>,
        h0: &[S],
        hu0: &[S],
        hv0: &[S],
    ) -> HlResult<Self> {
        let expected = grid.total_cells();
        for (data, context) in [(h0, "h0"), (hu0, "hu0"), (hv0, "hv0")] {
            if data.len() != expected {
                return Err(HlError::DimensionMismatch {
                    expected,
                    actual: data.len(),
                    context,
                });
            }
        }
        Ok(Self {
            h: h0.to_vec(),
            hu: hu0.to_vec(),
            hv: hv0.to_vec(),
        })
    }

    /// 读取单元状态
    #[inline]
    pub fn get(&self, idx: usize) -> ConservedState<S> {
        ConservedState::new(self.h[idx], self.hu[idx], self.hv[idx])
    }

    /// 写入单元状态
    #[inline]
    pub fn set(&mut self, idx: usize, state: ConservedState<S>) {
        self.h[idx] = state.h;
        self.hu[idx] = state.hu;
        self.hv[idx] = state.hv;
    }

    /// 内部单元水深总和（守恒性检验用）
    pub fn interior_depth_sum(&self, grid: &StructuredGrid<S>) -> S {
        let mut sum = S::ZERO;
        for j in grid.interior_y() {
            for i in grid.interior_x() {
                sum += self.h[grid.idx(i, j)];
            }
        }
        sum
    }
}

// ============================================================
// 双缓冲状态对
// ============================================================

/// 双缓冲状态对（乒乓式时间推进）
///
/// 状态对独占持有两代字段；任何组件都不得跨 `swap()` 保留视图
/// （由借用检查器强制）。
#[derive(Debug, Clone)]
pub struct StatePair<S: RuntimeScalar> {
    buf_a: FieldSet<S>,
    buf_b: FieldSet<S>,
    /// true 表示 buf_a 为当前代
    front_is_a: bool,
}

impl<S: RuntimeScalar> StatePair<S> {
    /// 从初始条件构建双缓冲
    ///
    /// 两代均从初始条件复制（与原地乒乓一致：下一代内容在首步被完全覆盖）。
    pub fn initialize(
        grid: &StructuredGrid<S>,
        h0: &[S],
        hu0: &[S],
        hv0: &[S],
    ) -> HlResult<Self> {
        let fields = FieldSet::from_arrays(grid, h0, hu0, hv0)?;
        Ok(Self {
            buf_b: fields.clone(),
            buf_a: fields,
            front_is_a: true,
        })
    }

    /// 当前代只读视图（到下一次 swap 前有效）
    #[inline]
    pub fn current(&self) -> &FieldSet<S> {
        if self.front_is_a {
            &self.buf_a
        } else {
            &self.buf_b
        }
    }

    /// 当前代可变视图（仅限幽灵单元填充使用）
    #[inline]
    pub fn current_mut(&mut self) -> &mut FieldSet<S> {
        if self.front_is_a {
            &mut self.buf_a
        } else {
            &mut self.buf_b
        }
    }

    /// 同时取得（当前代只读，下一代可写）视图
    ///
    /// 借用规则保证模板计算期间读写两代不混叠。
    #[inline]
    pub fn split(&mut self) -> (&FieldSet<S>, &mut FieldSet<S>) {
        if self.front_is_a {
            (&self.buf_a, &mut self.buf_b)
        } else {
            (&self.buf_b, &mut self.buf_a)
        }
    }

    /// 交换两代角色（O(1)，无数据复制）
    ///
    /// 使此前通过 `current()`/`split()` 取得的视图失效。
    #[inline]
    pub fn swap(&mut self) {
        self.front_is_a = !self.front_is_a;
    }

    /// 当前代是否为 A 缓冲（测试用）
    #[inline]
    pub fn front_is_a(&self) -> bool {
        self.front_is_a
    }
}
