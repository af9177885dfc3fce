// crates/hl_solver/src/scheme/lxf.rs

//! Lax-Friedrichs 格式
//!
//! 经典一阶显式有限体积格式，求解双曲守恒律：
//!
//! ```text
//! U_next[i,j] = 0.25·(U[i-1,j] + U[i+1,j] + U[i,j-1] + U[i,j+1])
//!             - dt/(2·dx)·(F(U[i+1,j]) - F(U[i-1,j]))
//!             - dt/(2·dy)·(G(U[i,j+1]) - G(U[i,j-1]))
//! ```
//!
//! 浅水方程通量：
//!
//! ```text
//! F = [hu, hu²/h + g·h²/2, hu·hv/h]
//! G = [hv, hu·hv/h,        hv²/h + g·h²/2]
//! ```
//!
//! # 干单元保护
//!
//! `h <= eps_h` 时动量/水深除法按零速度处理。此保护是强制性的：
//! 模板的空间耦合会使单个 NaN 在一步内污染整个网格。

use super::{FluxScheme, Neighborhood, StepContext};
use crate::state::ConservedState;
use crate::types::SafeVelocity;
use hl_core::RuntimeScalar;

/// 浅水方程通量向量
#[derive(Debug, Clone, Copy)]
struct FluxVector<S: RuntimeScalar> {
    f0: S,
    f1: S,
    f2: S,
}

/// x 方向通量 F(U)
#[inline]
fn flux_x<S: RuntimeScalar>(state: ConservedState<S>, g: S, eps_h: S) -> FluxVector<S> {
    let SafeVelocity { u, v } = state.velocity(eps_h);
    FluxVector {
        f0: state.hu,
        f1: state.hu * u + S::HALF * g * state.h * state.h,
        f2: state.hu * v,
    }
}

/// y 方向通量 G(U)
#[inline]
fn flux_y<S: RuntimeScalar>(state: ConservedState<S>, g: S, eps_h: S) -> FluxVector<S> {
    let SafeVelocity { u, v } = state.velocity(eps_h);
    FluxVector {
        f0: state.hv,
        f1: state.hv * u,
        f2: state.hv * v + S::HALF * g * state.h * state.h,
    }
}

/// Lax-Friedrichs 格式（无状态策略对象）
#[derive(Debug, Clone, Copy, Default)]
pub struct LxfScheme;

impl LxfScheme {
    /// 创建 LxF 格式
    pub fn new() -> Self {
        Self
    }
}

impl<S: RuntimeScalar> FluxScheme<S> for LxfScheme {
    fn name(&self) -> &'static str {
        "Lax-Friedrichs"
    }

    fn ghost_width(&self) -> usize {
        1
    }

    fn update(&self, nb: &Neighborhood<S>, ctx: &StepContext<S>) -> ConservedState<S> {
        let g = ctx.params.g;
        let eps_h = ctx.params.eps_h;

        let fw = flux_x(nb.west, g, eps_h);
        let fe = flux_x(nb.east, g, eps_h);
        let gs = flux_y(nb.south, g, eps_h);
        let gn = flux_y(nb.north, g, eps_h);

        let cx = ctx.dt / (S::TWO * ctx.dx);
        let cy = ctx.dt / (S::TWO * ctx.dy);

        let avg = |w: S, e: S, s: S, n: S| S::QUARTER * (w + e + s + n);

        ConservedState {
            h: avg(nb.west.h, nb.east.h, nb.south.h, nb.north.h)
                - cx * (fe.f0 - fw.f0)
                - cy * (gn.f0 - gs.f0),
            hu: avg(nb.west.hu, nb.east.hu, nb.south.hu, nb.north.hu)
                - cx * (fe.f1 - fw.f1)
                - cy * (gn.f1 - gs.f1),
            hv: avg(nb.west.hv, nb.east.hv, nb.south.hv, nb.north.hv)
                - cx * (fe.f2 - fw.f2)
                - cy * (gn.f2 - gs.f2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumericalParams;

    fn ctx(dt: f64) -> StepContext<f64> {
        StepContext {
            dt,
            dx: 1.0,
            dy: 1.0,
            params: NumericalParams::default(),
        }
    }

    fn uniform(h: f64, hu: f64, hv: f64) -> Neighborhood<f64> {
        let s = ConservedState::new(h, hu, hv);
        Neighborhood {
            center: s,
            west: s,
            east: s,
            south: s,
            north: s,
        }
    }

    #[test]
    fn test_flat_state_fixed_point() {
        // 静水不动点：均匀水深、零动量，一次模板应用不改变状态
        let scheme = LxfScheme::new();
        let out = scheme.update(&uniform(1.0, 0.0, 0.0), &ctx(0.01));
        assert!((out.h - 1.0).abs() < 1e-15);
        assert_eq!(out.hu, 0.0);
        assert_eq!(out.hv, 0.0);
    }

    #[test]
    fn test_uniform_flow_preserved() {
        // 均匀流动同样是不动点（所有通量差为零）
        let scheme = LxfScheme::new();
        let out = scheme.update(&uniform(2.0, 1.0, -0.5), &ctx(0.01));
        assert!((out.h - 2.0).abs() < 1e-14);
        assert!((out.hu - 1.0).abs() < 1e-14);
        assert!((out.hv + 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_zero_depth_guard() {
        // 干单元带非零动量不得产生 NaN/Inf
        let scheme = LxfScheme::new();
        let dry = ConservedState::new(0.0, 1.0, -1.0);
        let wet = ConservedState::new(1.0, 0.0, 0.0);
        let nb = Neighborhood {
            center: dry,
            west: dry,
            east: wet,
            south: dry,
            north: wet,
        };
        let out = scheme.update(&nb, &ctx(0.01));
        assert!(out.is_valid());
    }

    #[test]
    fn test_pressure_gradient_accelerates_flow() {
        // 东侧水深更高 => 压力梯度指向西，hu 应为负
        let scheme = LxfScheme::new();
        let lo = ConservedState::new(1.0, 0.0, 0.0);
        let hi = ConservedState::new(2.0, 0.0, 0.0);
        let nb = Neighborhood {
            center: lo,
            west: lo,
            east: hi,
            south: lo,
            north: lo,
        };
        let out = scheme.update(&nb, &ctx(0.01));
        assert!(out.hu < 0.0);
        assert!(out.h > 1.0); // 邻域平均抬升水深
    }

    #[test]
    fn test_flux_x_against_definition() {
        let g = 9.81;
        let s = ConservedState::new(2.0f64, 3.0, 1.0);
        let f = flux_x(s, g, 1e-6);
        assert!((f.f0 - 3.0).abs() < 1e-12);
        assert!((f.f1 - (3.0 * 3.0 / 2.0 + 0.5 * g * 4.0)).abs() < 1e-12);
        assert!((f.f2 - (3.0 * 1.0 / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_flux_y_against_definition() {
        let g = 9.81;
        let s = ConservedState::new(2.0f64, 3.0, 1.0);
        let f = flux_y(s, g, 1e-6);
        assert!((f.f0 - 1.0).abs() < 1e-12);
        assert!((f.f1 - (3.0 * 1.0 / 2.0)).abs() < 1e-12);
        assert!((f.f2 - (1.0 * 1.0 / 2.0 + 0.5 * g * 4.0)).abs() < 1e-12);
    }
}
