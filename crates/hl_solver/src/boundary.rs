// crates/hl_solver/src/boundary.rs

//! 幽灵单元填充
//!
//! 每个时间步开始前，根据边界策略填充当前代的幽灵层，
//! 使边界处的十字模板无需特判。
//!
//! # 支持的策略
//!
//! - [`HaloPolicy::Periodic`]: 周期包绕，幽灵取对侧内部单元
//! - [`HaloPolicy::Reflective`]: 固壁镜像，水深复制、法向动量反号、切向保持
//! - [`HaloPolicy::Outflow`]: 零梯度外推，直接复制相邻内部单元
//!
//! LxF 为十字模板，四角幽灵单元不参与计算，此处不填充。

use crate::grid::StructuredGrid;
use crate::state::FieldSet;
use hl_core::RuntimeScalar;
use serde::{Deserialize, Serialize};

/// 幽灵单元填充策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaloPolicy {
    /// 周期边界（质量严格守恒）
    Periodic,
    /// 固壁反射（无穿透）
    #[default]
    Reflective,
    /// 自由出流（零梯度）
    Outflow,
}

impl HaloPolicy {
    /// 填充整个幽灵层
    pub fn fill_halo<S: RuntimeScalar>(
        &self,
        grid: &StructuredGrid<S>,
        fields: &mut FieldSet<S>,
    ) {
        match self {
            Self::Periodic => fill_periodic(grid, fields),
            Self::Reflective => fill_reflective(grid, fields),
            Self::Outflow => fill_outflow(grid, fields),
        }
    }
}

/// 周期包绕：ghost(0) <- interior(nx)，ghost(nx+1) <- interior(1)
fn fill_periodic<S: RuntimeScalar>(grid: &StructuredGrid<S>, fields: &mut FieldSet<S>) {
    let nx = grid.nx();
    let ny = grid.ny();
    for field in [&mut fields.h, &mut fields.hu, &mut fields.hv] {
        for j in 1..=ny {
            field[grid.idx(0, j)] = field[grid.idx(nx, j)];
            field[grid.idx(nx + 1, j)] = field[grid.idx(1, j)];
        }
        for i in 1..=nx {
            field[grid.idx(i, 0)] = field[grid.idx(i, ny)];
            field[grid.idx(i, ny + 1)] = field[grid.idx(i, 1)];
        }
    }
}

/// 固壁镜像：水深与切向动量复制，法向动量反号
fn fill_reflective<S: RuntimeScalar>(grid: &StructuredGrid<S>, fields: &mut FieldSet<S>) {
    let nx = grid.nx();
    let ny = grid.ny();
    // 左右边界：法向为 x
    for j in 1..=ny {
        let (west, east) = (grid.idx(1, j), grid.idx(nx, j));
        let (gw, ge) = (grid.idx(0, j), grid.idx(nx + 1, j));
        fields.h[gw] = fields.h[west];
        fields.hu[gw] = -fields.hu[west];
        fields.hv[gw] = fields.hv[west];
        fields.h[ge] = fields.h[east];
        fields.hu[ge] = -fields.hu[east];
        fields.hv[ge] = fields.hv[east];
    }
    // 上下边界：法向为 y
    for i in 1..=nx {
        let (south, north) = (grid.idx(i, 1), grid.idx(i, ny));
        let (gs, gn) = (grid.idx(i, 0), grid.idx(i, ny + 1));
        fields.h[gs] = fields.h[south];
        fields.hu[gs] = fields.hu[south];
        fields.hv[gs] = -fields.hv[south];
        fields.h[gn] = fields.h[north];
        fields.hu[gn] = fields.hu[north];
        fields.hv[gn] = -fields.hv[north];
    }
}

/// 零梯度外推：直接复制相邻内部单元
fn fill_outflow<S: RuntimeScalar>(grid: &StructuredGrid<S>, fields: &mut FieldSet<S>) {
    let nx = grid.nx();
    let ny = grid.ny();
    for field in [&mut fields.h, &mut fields.hu, &mut fields.hv] {
        for j in 1..=ny {
            field[grid.idx(0, j)] = field[grid.idx(1, j)];
            field[grid.idx(nx + 1, j)] = field[grid.idx(nx, j)];
        }
        for i in 1..=nx {
            field[grid.idx(i, 0)] = field[grid.idx(i, 1)];
            field[grid.idx(i, ny + 1)] = field[grid.idx(i, ny)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3 网格，内部单元填入可区分的值
    fn setup() -> (StructuredGrid<f64>, FieldSet<f64>) {
        let grid = StructuredGrid::new(3, 3, 1.0, 1.0).unwrap();
        let mut fields = FieldSet::zeros(&grid);
        for j in 1..=3usize {
            for i in 1..=3usize {
                let v = (10 * i + j) as f64;
                fields.h[grid.idx(i, j)] = v;
                fields.hu[grid.idx(i, j)] = v + 0.1;
                fields.hv[grid.idx(i, j)] = v + 0.2;
            }
        }
        (grid, fields)
    }

    #[test]
    fn test_periodic_wrap() {
        let (grid, mut fields) = setup();
        HaloPolicy::Periodic.fill_halo(&grid, &mut fields);

        // 西幽灵 <- 东内部列
        assert_eq!(fields.h[grid.idx(0, 2)], fields.h[grid.idx(3, 2)]);
        // 东幽灵 <- 西内部列
        assert_eq!(fields.h[grid.idx(4, 1)], fields.h[grid.idx(1, 1)]);
        // 南幽灵 <- 北内部行
        assert_eq!(fields.hu[grid.idx(2, 0)], fields.hu[grid.idx(2, 3)]);
        // 北幽灵 <- 南内部行
        assert_eq!(fields.hv[grid.idx(3, 4)], fields.hv[grid.idx(3, 1)]);
    }

    #[test]
    fn test_reflective_negates_normal_momentum() {
        let (grid, mut fields) = setup();
        HaloPolicy::Reflective.fill_halo(&grid, &mut fields);

        // 西边界：hu 反号，h/hv 复制
        let w = grid.idx(1, 2);
        let gw = grid.idx(0, 2);
        assert_eq!(fields.h[gw], fields.h[w]);
        assert_eq!(fields.hu[gw], -fields.hu[w]);
        assert_eq!(fields.hv[gw], fields.hv[w]);

        // 北边界：hv 反号，h/hu 复制
        let n = grid.idx(2, 3);
        let gn = grid.idx(2, 4);
        assert_eq!(fields.h[gn], fields.h[n]);
        assert_eq!(fields.hu[gn], fields.hu[n]);
        assert_eq!(fields.hv[gn], -fields.hv[n]);
    }

    #[test]
    fn test_outflow_zero_gradient() {
        let (grid, mut fields) = setup();
        HaloPolicy::Outflow.fill_halo(&grid, &mut fields);

        let e = grid.idx(3, 2);
        let ge = grid.idx(4, 2);
        assert_eq!(fields.h[ge], fields.h[e]);
        assert_eq!(fields.hu[ge], fields.hu[e]);
        assert_eq!(fields.hv[ge], fields.hv[e]);
    }
}
