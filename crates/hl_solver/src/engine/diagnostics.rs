// crates/hl_solver/src/engine/diagnostics.rs

//! 水深场诊断
//!
//! 扫描内部单元给出稳定性概览：极值、总水量、非有限/负值计数。
//! 长时间运行中作为哨兵周期性调用，在 NaN 污染全场之前中止。

use crate::grid::StructuredGrid;
use crate::state::FieldSet;
use hl_core::{HlError, HlResult, RuntimeScalar};

/// 水深场诊断报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthReport {
    /// 内部单元最小水深 [m]
    pub min_h: f64,
    /// 内部单元最大水深 [m]
    pub max_h: f64,
    /// 内部水深总和（乘以单元面积即为水量体积）
    pub depth_sum: f64,
    /// 非有限（NaN/Inf）单元数
    pub invalid_cells: usize,
    /// 负水深单元数
    pub negative_cells: usize,
}

impl DepthReport {
    /// 扫描内部单元生成报告（幽灵单元不计入）
    pub fn scan<S: RuntimeScalar>(grid: &StructuredGrid<S>, fields: &FieldSet<S>) -> Self {
        let mut min_h = f64::MAX;
        let mut max_h = f64::MIN;
        let mut depth_sum = 0.0f64;
        let mut invalid_cells = 0usize;
        let mut negative_cells = 0usize;

        for j in grid.interior_y() {
            for i in grid.interior_x() {
                let idx = grid.idx(i, j);
                let h = fields.h[idx].to_f64().unwrap_or(f64::NAN);
                let momentum_ok = fields.hu[idx].is_safe() && fields.hv[idx].is_safe();
                if !h.is_finite() || !momentum_ok {
                    invalid_cells += 1;
                    continue;
                }
                if h < 0.0 {
                    negative_cells += 1;
                }
                min_h = min_h.min(h);
                max_h = max_h.max(h);
                depth_sum += h;
            }
        }

        Self {
            min_h,
            max_h,
            depth_sum,
            invalid_cells,
            negative_cells,
        }
    }

    /// 场中是否不含非有限值
    pub fn is_stable(&self) -> bool {
        self.invalid_cells == 0
    }

    /// 稳定性断言
    ///
    /// # 错误
    /// 存在非有限单元时返回 [`HlError::NumericalInstability`]
    pub fn ensure_stable(&self, step: u64) -> HlResult<()> {
        if self.is_stable() {
            Ok(())
        } else {
            Err(HlError::NumericalInstability {
                step,
                detail: format!(
                    "{} 个非有限单元, {} 个负水深单元, h 范围 [{}, {}]",
                    self.invalid_cells, self.negative_cells, self.min_h, self.max_h
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (StructuredGrid<f64>, FieldSet<f64>) {
        let grid = StructuredGrid::new(4, 4, 1.0, 1.0).unwrap();
        let mut fields = FieldSet::zeros(&grid);
        for j in grid.interior_y() {
            for i in grid.interior_x() {
                fields.h[grid.idx(i, j)] = 1.0;
            }
        }
        (grid, fields)
    }

    #[test]
    fn test_clean_field() {
        let (grid, fields) = setup();
        let report = DepthReport::scan(&grid, &fields);
        assert_eq!(report.min_h, 1.0);
        assert_eq!(report.max_h, 1.0);
        assert!((report.depth_sum - 16.0).abs() < 1e-12);
        assert!(report.is_stable());
        assert!(report.ensure_stable(0).is_ok());
    }

    #[test]
    fn test_nan_detected() {
        let (grid, mut fields) = setup();
        fields.h[grid.idx(2, 2)] = f64::NAN;
        fields.hu[grid.idx(3, 3)] = f64::INFINITY;
        let report = DepthReport::scan(&grid, &fields);
        assert_eq!(report.invalid_cells, 2);
        assert!(!report.is_stable());
        assert!(matches!(
            report.ensure_stable(42),
            Err(HlError::NumericalInstability { step: 42, .. })
        ));
    }

    #[test]
    fn test_ghost_cells_ignored() {
        let (grid, mut fields) = setup();
        // 幽灵单元中的 NaN 不影响报告
        fields.h[grid.idx(0, 0)] = f64::NAN;
        let report = DepthReport::scan(&grid, &fields);
        assert!(report.is_stable());
    }

    #[test]
    fn test_negative_depth_counted() {
        let (grid, mut fields) = setup();
        fields.h[grid.idx(1, 1)] = -0.5;
        let report = DepthReport::scan(&grid, &fields);
        assert_eq!(report.negative_cells, 1);
        assert_eq!(report.min_h, -0.5);
        // 负水深是警告而非不稳定
        assert!(report.is_stable());
    }
}
