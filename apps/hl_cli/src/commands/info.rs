// apps/hl_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示系统信息、默认配置与 GPU 适配器探测结果。

use anyhow::Result;
use clap::Args;
use tracing::info;

use hl_solver::{GpuContext, SimulationConfig};

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 探测 GPU 适配器
    #[arg(long)]
    pub gpu: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== HydroLax 信息 ===");

    let show_all = !args.system && !args.defaults && !args.gpu;

    if args.system || show_all {
        print_system_info();
        println!();
    }
    if args.defaults || show_all {
        print_default_config()?;
        println!();
    }
    if args.gpu || show_all {
        probe_gpu();
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("HydroLax CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("CPU 并行度: {}", std::thread::available_parallelism().map_or(1, |n| n.get()));

    println!("\n执行路径:");
    println!("  - cpu (f64, rayon 行并行)");
    println!("  - gpu (f32, wgpu 计算着色器)");
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = SimulationConfig::default();
    print!("{}", toml::to_string(&config)?);
    Ok(())
}

fn probe_gpu() {
    println!("=== GPU 探测 ===");
    match GpuContext::new(wgpu::PowerPreference::None) {
        Ok(context) => {
            let adapter = context.adapter_info();
            println!("适配器: {}", adapter.name);
            println!("后端: {:?}", adapter.backend);
            println!("设备类型: {:?}", adapter.device_type);
        }
        Err(e) => {
            println!("不可用: {e}");
        }
    }
}
