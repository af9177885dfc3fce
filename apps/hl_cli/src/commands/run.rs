// apps/hl_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 按配置执行模拟：CPU 路径 f64，GPU 路径 f32。
//! 两条路径共享同一模拟循环语义，按进度间隔分段推进并输出诊断。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use hl_solver::engine::{CflCalculator, DepthReport, EulerStepper};
use hl_solver::{
    BackendKind, GpuContext, GpuSimulation, LxfScheme, Simulation, SimulationConfig,
};

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（省略时使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 覆盖终止时刻 [s]
    #[arg(short = 't', long)]
    pub t_end: Option<f64>,

    /// 覆盖时间步长 [s]
    #[arg(long)]
    pub dt: Option<f64>,

    /// 强制使用 GPU 后端
    #[arg(long)]
    pub gpu: bool,

    /// 按初始条件的 CFL 约束自动确定步长（覆盖 dt 与配置中的 cfl）
    #[arg(long)]
    pub auto_dt: Option<f64>,

    /// 进度报告间隔 [s]
    #[arg(long, default_value = "1.0")]
    pub progress_interval: f64,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== HydroLax 模拟启动 ===");

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("加载配置 {} 失败", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(t_end) = args.t_end {
        config.t_end = t_end;
    }
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if args.gpu {
        config.backend = BackendKind::Gpu;
    }
    config.validate().context("配置校验失败")?;

    // CFL 自动步长：按初始条件的特征波速估计（命令行优先于配置）
    if let Some(courant) = args.auto_dt.or(config.cfl) {
        let calc = CflCalculator::new(courant)?;
        let grid = config.grid::<f64>()?;
        let (h0, hu0, hv0) = config.initial_fields(&grid);
        let fields = hl_solver::FieldSet::from_arrays(&grid, &h0, &hu0, &hv0)?;
        match calc.max_dt(&grid, &fields, &config.params()?) {
            Some(dt) => {
                info!("CFL 步长估计: dt = {:.6} s (C = {})", dt, courant);
                config.dt = dt;
            }
            None => warn!("初始场无波速约束，保留 dt = {} s", config.dt),
        }
    }

    info!(
        "网格 {}x{}, dt={} s, t_end={} s, 边界 {:?}, 后端 {:?}",
        config.nx, config.ny, config.dt, config.t_end, config.halo, config.backend
    );

    let start = Instant::now();
    match config.backend {
        BackendKind::Cpu => run_cpu(&config, args.progress_interval)?,
        BackendKind::Gpu => run_gpu(&config, args.progress_interval)?,
    }

    info!("=== 模拟完成 ===");
    info!("计算时间: {:.2} s", start.elapsed().as_secs_f64());
    Ok(())
}

/// CPU 路径（f64）
fn run_cpu(config: &SimulationConfig, progress_interval: f64) -> Result<()> {
    let grid = config.grid::<f64>()?;
    let params = config.params::<f64>()?;
    let (h0, hu0, hv0) = config.initial_fields(&grid);

    let mut sim = Simulation::new(
        grid,
        LxfScheme::new(),
        config.halo,
        params,
        &h0,
        &hu0,
        &hv0,
    )
    .context("构建 CPU 模拟器失败")?;

    let mut total_steps = 0u64;
    while sim.time() < config.t_end {
        let target = (sim.time() + progress_interval).min(config.t_end);
        let stats = sim.simulate(target, config.dt)?;
        total_steps += stats.steps;

        let report = DepthReport::scan(sim.grid(), sim.current());
        report.ensure_stable(sim.step_count())?;
        info!(
            "t={:.3} s: 步数={}, h ∈ [{:.4}, {:.4}] m",
            sim.time(),
            sim.step_count(),
            report.min_h,
            report.max_h
        );
    }

    info!("总步数: {}", total_steps);
    Ok(())
}

/// GPU 路径（f32）
fn run_gpu(config: &SimulationConfig, progress_interval: f64) -> Result<()> {
    let context = GpuContext::new(wgpu::PowerPreference::HighPerformance)
        .context("GPU 上下文创建失败")?;
    info!("GPU 适配器: {}", context.adapter_info().name);

    let grid = config.grid::<f32>()?;
    let params = config.params::<f32>()?;
    let (h0, hu0, hv0) = config.initial_fields(&grid);

    let mut sim = GpuSimulation::new(context, grid, config.halo, params, &h0, &hu0, &hv0)
        .context("构建 GPU 模拟器失败")?;

    let mut total_steps = 0u64;
    while sim.time() < config.t_end {
        let target = (sim.time() + progress_interval).min(config.t_end);
        let stats = sim.simulate(target, config.dt)?;
        total_steps += stats.steps;

        let (h, _, _) = sim.read_state()?;
        let grid = *sim.grid();
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        let mut finite = true;
        for j in grid.interior_y() {
            for i in grid.interior_x() {
                let v = h[grid.idx(i, j)];
                if !v.is_finite() {
                    finite = false;
                }
                min_h = min_h.min(v);
                max_h = max_h.max(v);
            }
        }
        if !finite {
            anyhow::bail!("第 {} 步检出非有限水深，模拟中止", sim.step_count());
        }
        info!(
            "t={:.3} s: 步数={}, h ∈ [{:.4}, {:.4}] m",
            sim.time(),
            sim.step_count(),
            min_h,
            max_h
        );
    }

    info!("总步数: {}", total_steps);
    Ok(())
}
