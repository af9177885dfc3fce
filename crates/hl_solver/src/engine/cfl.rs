// crates/hl_solver/src/engine/cfl.rs

//! CFL 稳定步长估计
//!
//! 显式 LxF 格式的稳定性受 Courant-Friedrichs-Lewy 条件约束：
//! 一个时间步内信息传播不得超过一个单元。特征波速取
//! `|u| + sqrt(g·h)`，分方向估计后取最紧的约束：
//!
//! ```text
//! dt = C · min(dx / max|u|+c, dy / max|v|+c)
//! ```

use rayon::prelude::*;

use crate::grid::StructuredGrid;
use crate::state::FieldSet;
use crate::types::NumericalParams;
use hl_core::{HlError, HlResult, RuntimeScalar};

/// CFL 步长计算器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CflCalculator {
    /// Courant 数（0 < C <= 1）
    courant: f64,
}

impl Default for CflCalculator {
    fn default() -> Self {
        // 一阶格式的保守默认值
        Self { courant: 0.9 }
    }
}

impl CflCalculator {
    /// 指定 Courant 数创建
    ///
    /// # 错误
    /// Courant 数不在 (0, 1] 内时返回 [`HlError::Config`]
    pub fn new(courant: f64) -> HlResult<Self> {
        if !courant.is_finite() || courant <= 0.0 || courant > 1.0 {
            return Err(HlError::config(format!(
                "Courant 数必须在 (0, 1] 内: {courant}"
            )));
        }
        Ok(Self { courant })
    }

    /// Courant 数
    pub fn courant(&self) -> f64 {
        self.courant
    }

    /// 扫描内部单元，返回当前状态下的最大稳定步长
    ///
    /// 全场静止且干燥（波速处处为零）时无约束，返回 `None`。
    pub fn max_dt<S: RuntimeScalar>(
        &self,
        grid: &StructuredGrid<S>,
        fields: &FieldSet<S>,
        params: &NumericalParams<S>,
    ) -> Option<f64> {
        // 按行并行归约，每行内串行扫描
        let (lambda_x, lambda_y) = grid
            .interior_y()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|&j| {
                let mut lx = 0.0f64;
                let mut ly = 0.0f64;
                for i in grid.interior_x() {
                    let state = fields.get(grid.idx(i, j));
                    let vel = state.velocity(params.eps_h);
                    let c = params.wave_speed(state.h).to_f64().unwrap_or(f64::MAX);
                    let u = vel.u.abs().to_f64().unwrap_or(f64::MAX);
                    let v = vel.v.abs().to_f64().unwrap_or(f64::MAX);
                    lx = lx.max(u + c);
                    ly = ly.max(v + c);
                }
                (lx, ly)
            })
            .reduce(|| (0.0, 0.0), |a, b| (a.0.max(b.0), a.1.max(b.1)));

        if lambda_x <= 0.0 && lambda_y <= 0.0 {
            return None;
        }

        let dx = grid.dx().to_f64().unwrap_or(0.0);
        let dy = grid.dy().to_f64().unwrap_or(0.0);
        let dt_x = if lambda_x > 0.0 {
            dx / lambda_x
        } else {
            f64::INFINITY
        };
        let dt_y = if lambda_y > 0.0 {
            dy / lambda_y
        } else {
            f64::INFINITY
        };
        Some(self.courant * dt_x.min(dt_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(h: f64) -> (StructuredGrid<f64>, FieldSet<f64>) {
        let grid = StructuredGrid::new(4, 4, 2.0, 1.0).unwrap();
        let mut fields = FieldSet::zeros(&grid);
        for v in fields.h.iter_mut() {
            *v = h;
        }
        (grid, fields)
    }

    #[test]
    fn test_invalid_courant_rejected() {
        assert!(CflCalculator::new(0.0).is_err());
        assert!(CflCalculator::new(1.5).is_err());
        assert!(CflCalculator::new(f64::NAN).is_err());
        assert!(CflCalculator::new(1.0).is_ok());
    }

    #[test]
    fn test_still_water_dt() {
        // 静水：lambda = sqrt(g·h)，约束来自较小的 dy
        let (grid, fields) = setup(1.0);
        let params = NumericalParams::default();
        let calc = CflCalculator::new(0.5).unwrap();
        let dt = calc.max_dt(&grid, &fields, &params).unwrap();
        let c = (9.81f64).sqrt();
        assert!((dt - 0.5 * 1.0 / c).abs() < 1e-12);
    }

    #[test]
    fn test_dry_field_unconstrained() {
        let (grid, fields) = setup(0.0);
        let params = NumericalParams::default();
        let calc = CflCalculator::default();
        assert_eq!(calc.max_dt(&grid, &fields, &params), None);
    }

    #[test]
    fn test_advection_tightens_dt() {
        // 叠加 x 方向流速后 dt 必须变小
        let (grid, mut fields) = setup(1.0);
        let params = NumericalParams::default();
        let calc = CflCalculator::default();
        let dt_still = calc.max_dt(&grid, &fields, &params).unwrap();

        for j in grid.interior_y() {
            for i in grid.interior_x() {
                fields.hu[grid.idx(i, j)] = 5.0; // u = 5 m/s
            }
        }
        let dt_flow = calc.max_dt(&grid, &fields, &params).unwrap();
        assert!(dt_flow < dt_still);
    }
}
