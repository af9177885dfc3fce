// apps/hl_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析并校验配置文件，同时给出初始条件下的 CFL 稳定步长提示。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use hl_solver::engine::CflCalculator;
use hl_solver::{FieldSet, SimulationConfig};

/// 配置验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    let config = SimulationConfig::load(&args.config)
        .with_context(|| format!("加载配置 {} 失败", args.config.display()))?;

    info!("配置有效: {}", args.config.display());
    info!(
        "网格 {}x{} ({}x{} m), dt={} s, t_end={} s",
        config.nx,
        config.ny,
        config.nx as f64 * config.dx,
        config.ny as f64 * config.dy,
        config.dt,
        config.t_end
    );
    info!("边界 {:?}, 后端 {:?}", config.halo, config.backend);

    // CFL 稳定性提示（按初始条件估计，演化中波速可能增大）
    let grid = config.grid::<f64>()?;
    let (h0, hu0, hv0) = config.initial_fields(&grid);
    let fields = FieldSet::from_arrays(&grid, &h0, &hu0, &hv0)?;
    let calc = CflCalculator::default();
    match calc.max_dt(&grid, &fields, &config.params()?) {
        Some(dt_max) => {
            if config.dt > dt_max {
                warn!(
                    "dt={} s 超出初始条件的 CFL 稳定步长 {:.6} s，模拟可能发散",
                    config.dt, dt_max
                );
            } else {
                info!("CFL 检查通过: dt={} s <= {:.6} s", config.dt, dt_max);
            }
        }
        None => info!("初始场静止且干燥，无 CFL 约束"),
    }

    Ok(())
}
