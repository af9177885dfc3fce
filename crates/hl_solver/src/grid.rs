// crates/hl_solver/src/grid.rs

//! 结构化网格
//!
//! 定义带幽灵单元的矩形网格布局：`nx × ny` 个内部单元，
//! 每侧一层幽灵单元，总存储 `(nx+2) × (ny+2)`，行主序。
//!
//! # 索引约定
//!
//! ```text
//! j = ny+1  ┌──────────────────┐  幽灵行
//! j = ny    │ ghost  interior  │
//!   ...     │        (1..=nx,  │
//! j = 1     │         1..=ny)  │
//! j = 0     └──────────────────┘  幽灵行
//!           i=0            i=nx+1
//! ```
//!
//! LxF 格式为十字模板，一层幽灵单元即可使边界处模板完整。

use hl_core::{HlError, HlResult, RuntimeScalar};

/// 幽灵层宽度（LxF 十字模板只需一层）
pub const GHOST_WIDTH: usize = 1;

/// 结构化矩形网格
///
/// 网格几何在模拟运行期间不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredGrid<S: RuntimeScalar> {
    /// x 方向内部单元数
    nx: usize,
    /// y 方向内部单元数
    ny: usize,
    /// x 方向单元间距 [m]
    dx: S,
    /// y 方向单元间距 [m]
    dy: S,
}

impl<S: RuntimeScalar> StructuredGrid<S> {
    /// 创建网格
    ///
    /// # 错误
    /// `nx`/`ny` 为零或 `dx`/`dy` 非正时返回 [`HlError::Config`]
    pub fn new(nx: usize, ny: usize, dx: S, dy: S) -> HlResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(HlError::config(format!(
                "网格尺寸必须为正: nx={nx}, ny={ny}"
            )));
        }
        if dx <= S::ZERO || dy <= S::ZERO {
            return Err(HlError::config(format!(
                "单元间距必须为正: dx={dx}, dy={dy}"
            )));
        }
        Ok(Self { nx, ny, dx, dy })
    }

    /// x 方向内部单元数
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// y 方向内部单元数
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// x 方向单元间距
    #[inline]
    pub fn dx(&self) -> S {
        self.dx
    }

    /// y 方向单元间距
    #[inline]
    pub fn dy(&self) -> S {
        self.dy
    }

    /// 行步长（含幽灵单元的一行长度）
    #[inline]
    pub fn stride(&self) -> usize {
        self.nx + 2 * GHOST_WIDTH
    }

    /// 含幽灵单元的总行数
    #[inline]
    pub fn rows(&self) -> usize {
        self.ny + 2 * GHOST_WIDTH
    }

    /// 总存储单元数（含幽灵单元）
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.stride() * self.rows()
    }

    /// 内部单元数
    #[inline]
    pub fn interior_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// 行主序线性索引（i, j 含幽灵偏移）
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.stride() && j < self.rows());
        j * self.stride() + i
    }

    /// 内部单元 i 索引范围
    #[inline]
    pub fn interior_x(&self) -> std::ops::RangeInclusive<usize> {
        GHOST_WIDTH..=self.nx
    }

    /// 内部单元 j 索引范围
    #[inline]
    pub fn interior_y(&self) -> std::ops::RangeInclusive<usize> {
        GHOST_WIDTH..=self.ny
    }

    /// 判断 (i, j) 是否为内部单元
    #[inline]
    pub fn is_interior(&self, i: usize, j: usize) -> bool {
        i >= GHOST_WIDTH && i <= self.nx && j >= GHOST_WIDTH && j <= self.ny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let grid = StructuredGrid::<f64>::new(4, 3, 1.0, 2.0).unwrap();
        assert_eq!(grid.stride(), 6);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.total_cells(), 30);
        assert_eq!(grid.interior_cells(), 12);
    }

    #[test]
    fn test_idx_row_major() {
        let grid = StructuredGrid::<f64>::new(4, 4, 1.0, 1.0).unwrap();
        assert_eq!(grid.idx(0, 0), 0);
        assert_eq!(grid.idx(5, 0), 5);
        assert_eq!(grid.idx(0, 1), 6);
        assert_eq!(grid.idx(3, 2), 15);
    }

    #[test]
    fn test_interior_ranges() {
        let grid = StructuredGrid::<f64>::new(4, 4, 1.0, 1.0).unwrap();
        assert_eq!(grid.interior_x(), 1..=4);
        assert!(grid.is_interior(1, 1));
        assert!(grid.is_interior(4, 4));
        assert!(!grid.is_interior(0, 1));
        assert!(!grid.is_interior(5, 4));
        assert!(!grid.is_interior(2, 0));
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(StructuredGrid::<f64>::new(0, 4, 1.0, 1.0).is_err());
        assert!(StructuredGrid::<f64>::new(4, 0, 1.0, 1.0).is_err());
        assert!(StructuredGrid::<f64>::new(4, 4, 0.0, 1.0).is_err());
        assert!(StructuredGrid::<f64>::new(4, 4, 1.0, -1.0).is_err());
    }
}
