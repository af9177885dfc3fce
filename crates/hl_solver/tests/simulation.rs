// tests/simulation.rs

//! 模拟端到端验证测试
//!
//! # 测试覆盖
//!
//! - 静水不动点（平坦状态经完整循环保持不变）
//! - 时钟语义（单调推进、精确终止、末步裁剪）
//! - 错误路径（非法步长、维度不匹配）
//! - 溃坝冒烟测试（扰动扩散、全场有限）

use hl_solver::engine::{DepthReport, EulerStepper, RunPhase};
use hl_solver::{
    HaloPolicy, LxfScheme, NumericalParams, Simulation, SimulationConfig, StructuredGrid,
};
use hl_core::HlError;

// ============================================================================
// 测试辅助函数
// ============================================================================

fn still_sim(nx: usize, ny: usize, depth: f64) -> Simulation<f64, LxfScheme> {
    let grid = StructuredGrid::new(nx, ny, 1.0, 1.0).unwrap();
    Simulation::still_water(
        grid,
        LxfScheme::new(),
        HaloPolicy::Reflective,
        NumericalParams::default(),
        depth,
    )
    .unwrap()
}

// ============================================================================
// 静水不动点
// ============================================================================

#[test]
fn flat_state_single_step_end_to_end() {
    // 4x4 均匀水深，dt = 0.01 推进到 t_end = 0.01：恰好一步，状态不变
    let mut sim = still_sim(4, 4, 1.0);
    let stats = sim.simulate(0.01, 0.01).unwrap();

    assert_eq!(stats.steps, 1);
    assert_eq!(sim.time(), 0.01);
    assert_eq!(sim.phase(), RunPhase::Done);

    let grid = *sim.grid();
    let fields = sim.current();
    for j in grid.interior_y() {
        for i in grid.interior_x() {
            assert!((fields.h[grid.idx(i, j)] - 1.0).abs() < 1e-14);
            assert_eq!(fields.hu[grid.idx(i, j)], 0.0);
            assert_eq!(fields.hv[grid.idx(i, j)], 0.0);
        }
    }
}

#[test]
fn flat_state_long_run_stays_flat() {
    let mut sim = still_sim(16, 8, 2.5);
    sim.simulate(1.0, 0.005).unwrap();

    let report = DepthReport::scan(sim.grid(), sim.current());
    assert!(report.is_stable());
    assert!((report.min_h - 2.5).abs() < 1e-12);
    assert!((report.max_h - 2.5).abs() < 1e-12);
}

// ============================================================================
// 时钟语义
// ============================================================================

#[test]
fn clock_monotonic_and_exact_termination() {
    // 0.07 不是 0.02 的整数倍：3 个整步 + 1 个裁剪步
    let mut sim = still_sim(4, 4, 1.0);

    let mut last_t = 0.0;
    for _ in 0..3 {
        sim.step_euler(0.02).unwrap();
        assert!(sim.time() > last_t);
        last_t = sim.time();
    }

    let stats = sim.simulate(0.07, 0.02).unwrap();
    assert_eq!(stats.steps, 1);
    assert_eq!(sim.time(), 0.07); // 精确相等
    assert_eq!(sim.phase(), RunPhase::Done);
}

#[test]
fn done_phase_allows_further_stepping() {
    let mut sim = still_sim(4, 4, 1.0);
    sim.simulate(0.05, 0.01).unwrap();
    assert_eq!(sim.phase(), RunPhase::Done);

    // 继续推进到更远的终止时刻
    let stats = sim.simulate(0.1, 0.01).unwrap();
    assert_eq!(stats.steps, 5);
    assert_eq!(sim.time(), 0.1);
}

// ============================================================================
// 错误路径
// ============================================================================

#[test]
fn invalid_step_size_rejected_everywhere() {
    let mut sim = still_sim(4, 4, 1.0);

    for bad_dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            sim.step_euler(bad_dt),
            Err(HlError::InvalidStepSize { .. })
        ));
        assert!(sim.simulate(1.0, bad_dt).is_err());
    }
    // 状态未被污染
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.phase(), RunPhase::Idle);
}

#[test]
fn dimension_mismatch_rejected_at_construction() {
    let grid = StructuredGrid::new(4, 4, 1.0, 1.0).unwrap();
    let good = vec![1.0; grid.total_cells()];
    let bad = vec![1.0; 16]; // 缺少幽灵单元

    let result = Simulation::new(
        grid,
        LxfScheme::new(),
        HaloPolicy::Reflective,
        NumericalParams::default(),
        &good,
        &bad,
        &good,
    );
    assert!(matches!(
        result,
        Err(HlError::DimensionMismatch { context: "hu0", .. })
    ));
}

// ============================================================================
// 溃坝冒烟测试
// ============================================================================

#[test]
fn dam_break_diffuses_and_stays_finite() {
    let config = SimulationConfig {
        nx: 32,
        ny: 32,
        dt: 0.005,
        scenario: hl_solver::Scenario::DamBreak {
            h_inner: 2.0,
            h_outer: 1.0,
            radius: 4.0,
        },
        ..Default::default()
    };
    let grid = config.grid::<f64>().unwrap();
    let (h0, hu0, hv0) = config.initial_fields(&grid);

    let mut sim = Simulation::new(
        grid,
        LxfScheme::new(),
        config.halo,
        config.params().unwrap(),
        &h0,
        &hu0,
        &hv0,
    )
    .unwrap();

    sim.simulate(0.5, config.dt).unwrap();

    let report = DepthReport::scan(sim.grid(), sim.current());
    assert!(report.is_stable());
    assert_eq!(report.negative_cells, 0);
    // 台阶被抹平：峰值下降，水深保持良态
    assert!(report.max_h < 2.0);
    assert!(report.min_h > 0.5);
}
