// crates/hl_solver/src/config.rs

//! 运行时配置
//!
//! TOML 格式的模拟配置：网格几何、物理参数、推进参数、边界策略、
//! 执行后端与初始条件场景。所有字段带默认值，空配置即静水基准。
//!
//! ```toml
//! nx = 128
//! ny = 128
//! dt = 0.005
//! t_end = 2.0
//! halo = "periodic"
//! backend = "gpu"
//!
//! [scenario]
//! type = "dam_break"
//! h_inner = 2.0
//! h_outer = 1.0
//! radius = 10.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boundary::HaloPolicy;
use crate::grid::StructuredGrid;
use crate::types::NumericalParams;
use hl_core::{HlError, HlResult, RuntimeScalar};

/// 执行后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU（rayon 行并行，f64 精度）
    #[default]
    Cpu,
    /// GPU（wgpu 计算着色器，f32 精度）
    Gpu,
}

/// 初始条件场景
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scenario {
    /// 静水（均匀水深、零动量）
    StillWater {
        /// 水深 [m]
        depth: f64,
    },
    /// 圆形溃坝（域中心圆内水深抬高）
    DamBreak {
        /// 圆内水深 [m]
        h_inner: f64,
        /// 圆外水深 [m]
        h_outer: f64,
        /// 圆半径 [m]
        radius: f64,
    },
}

impl Default for Scenario {
    fn default() -> Self {
        Self::StillWater { depth: 1.0 }
    }
}

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// x 方向内部单元数
    pub nx: usize,
    /// y 方向内部单元数
    pub ny: usize,
    /// x 方向单元间距 [m]
    pub dx: f64,
    /// y 方向单元间距 [m]
    pub dy: f64,
    /// 重力加速度 [m/s²]
    pub g: f64,
    /// 干单元判定阈值 [m]
    pub eps_h: f64,
    /// 时间步长 [s]
    pub dt: f64,
    /// Courant 数（设置后按初始条件的 CFL 约束覆盖 dt）
    pub cfl: Option<f64>,
    /// 终止时刻 [s]
    pub t_end: f64,
    /// 幽灵单元填充策略
    pub halo: HaloPolicy,
    /// 执行后端
    pub backend: BackendKind,
    /// 初始条件场景
    pub scenario: Scenario,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nx: 64,
            ny: 64,
            dx: 1.0,
            dy: 1.0,
            g: 9.81,
            eps_h: 1e-6,
            dt: 0.01,
            cfl: None,
            t_end: 1.0,
            halo: HaloPolicy::default(),
            backend: BackendKind::default(),
            scenario: Scenario::default(),
        }
    }
}

impl SimulationConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(s: &str) -> HlResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| HlError::config(format!("TOML 解析失败: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: &Path) -> HlResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HlError::config(format!("读取配置文件 {} 失败: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// 校验配置
    ///
    /// # 错误
    /// - 步长非法时返回 [`HlError::InvalidStepSize`]
    /// - 其余非法字段返回 [`HlError::Config`]
    pub fn validate(&self) -> HlResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(HlError::config(format!(
                "网格尺寸必须为正: nx={}, ny={}",
                self.nx, self.ny
            )));
        }
        if self.dx <= 0.0 || self.dy <= 0.0 {
            return Err(HlError::config(format!(
                "单元间距必须为正: dx={}, dy={}",
                self.dx, self.dy
            )));
        }
        if self.g <= 0.0 {
            return Err(HlError::config(format!("重力加速度必须为正: g={}", self.g)));
        }
        if self.eps_h < 0.0 {
            return Err(HlError::config(format!(
                "干单元阈值不得为负: eps_h={}",
                self.eps_h
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(HlError::InvalidStepSize { dt: self.dt });
        }
        if let Some(cfl) = self.cfl {
            if !cfl.is_finite() || cfl <= 0.0 || cfl > 1.0 {
                return Err(HlError::config(format!(
                    "Courant 数必须在 (0, 1] 内: cfl={cfl}"
                )));
            }
        }
        if !self.t_end.is_finite() || self.t_end < 0.0 {
            return Err(HlError::config(format!(
                "终止时刻必须非负: t_end={}",
                self.t_end
            )));
        }
        match self.scenario {
            Scenario::StillWater { depth } => {
                if depth < 0.0 {
                    return Err(HlError::config(format!("水深不得为负: depth={depth}")));
                }
            }
            Scenario::DamBreak {
                h_inner,
                h_outer,
                radius,
            } => {
                if h_inner < 0.0 || h_outer < 0.0 {
                    return Err(HlError::config(format!(
                        "水深不得为负: h_inner={h_inner}, h_outer={h_outer}"
                    )));
                }
                if radius <= 0.0 {
                    return Err(HlError::config(format!("溃坝半径必须为正: radius={radius}")));
                }
            }
        }
        Ok(())
    }

    /// 构建网格
    pub fn grid<S: RuntimeScalar>(&self) -> HlResult<StructuredGrid<S>> {
        let dx = S::from_f64(self.dx)
            .ok_or_else(|| HlError::config(format!("dx 超出精度范围: {}", self.dx)))?;
        let dy = S::from_f64(self.dy)
            .ok_or_else(|| HlError::config(format!("dy 超出精度范围: {}", self.dy)))?;
        StructuredGrid::new(self.nx, self.ny, dx, dy)
    }

    /// 构建数值参数
    pub fn params<S: RuntimeScalar>(&self) -> HlResult<NumericalParams<S>> {
        let g = S::from_f64(self.g)
            .ok_or_else(|| HlError::config(format!("g 超出精度范围: {}", self.g)))?;
        let eps_h = S::from_f64(self.eps_h)
            .ok_or_else(|| HlError::config(format!("eps_h 超出精度范围: {}", self.eps_h)))?;
        Ok(NumericalParams { g, eps_h })
    }

    /// 按场景生成初始条件数组 (h0, hu0, hv0)
    ///
    /// 数组为行主序、含幽灵单元；幽灵单元值无关紧要（首步填充覆盖），
    /// 此处按邻近内部值填充以保持场光滑。
    pub fn initial_fields<S: RuntimeScalar>(
        &self,
        grid: &StructuredGrid<S>,
    ) -> (Vec<S>, Vec<S>, Vec<S>) {
        let n = grid.total_cells();
        let zero = vec![S::ZERO; n];
        let mut h0 = vec![S::ZERO; n];

        match self.scenario {
            Scenario::StillWater { depth } => {
                let d = S::from_f64(depth).unwrap_or(S::ZERO);
                h0.fill(d);
            }
            Scenario::DamBreak {
                h_inner,
                h_outer,
                radius,
            } => {
                let cx = 0.5 * self.nx as f64 * self.dx;
                let cy = 0.5 * self.ny as f64 * self.dy;
                let r2 = radius * radius;
                for j in 0..grid.rows() {
                    for i in 0..grid.stride() {
                        // 单元中心坐标（幽灵单元取外推坐标）
                        let x = (i as f64 - 0.5) * self.dx;
                        let y = (j as f64 - 0.5) * self.dy;
                        let dist2 = (x - cx).powi(2) + (y - cy).powi(2);
                        let depth = if dist2 <= r2 { h_inner } else { h_outer };
                        h0[grid.idx(i, j)] = S::from_f64(depth).unwrap_or(S::ZERO);
                    }
                }
            }
        }

        (h0, zero.clone(), zero)
    }
}
