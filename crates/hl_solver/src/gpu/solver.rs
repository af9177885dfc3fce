// crates/hl_solver/src/gpu/solver.rs

//! GPU 模拟器
//!
//! 与 CPU 路径共享 [`EulerStepper`] 驱动接口，单步编码两个计算 pass：
//!
//! 1. 幽灵层填充（就地写当前代）
//! 2. LxF 模板（读当前代，写下一代）
//!
//! 两个 pass 在同一命令缓冲内提交，pass 间由 wgpu 的存储屏障保证
//! 顺序；提交后 `Maintain::Wait` 轮询作为步间同步点。绑定组按
//! 双缓冲的两个朝向预先构建，`swap()` 后仅切换索引，每步零分配。

use log::debug;
use thiserror::Error;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, CommandEncoderDescriptor,
    ComputePassDescriptor, ComputePipeline, Device, PipelineLayoutDescriptor, Queue,
    ShaderModuleDescriptor, ShaderSource,
};

use super::buffer::{read_staging_buffer, DoubleBuffer, GpuBufferUsage};
use super::context::GpuContext;
use super::params::{halo_mode_code, BindGroupLayouts, LxfParams, ParamsBuffer};
use super::shaders;
use crate::boundary::HaloPolicy;
use crate::engine::{EulerStepper, RunPhase};
use crate::grid::StructuredGrid;
use crate::types::NumericalParams;
use hl_core::{HlError, HlResult};

/// 模板内核工作组边长
const STENCIL_WORKGROUP: u32 = 16;
/// 幽灵层内核工作组大小
const HALO_WORKGROUP: u32 = 64;

/// GPU 错误类型
#[derive(Debug, Clone, Error)]
pub enum GpuError {
    /// 没有可用的适配器
    #[error("没有可用的 GPU 适配器")]
    NoAdapter,
    /// 设备创建失败
    #[error("GPU 设备创建失败: {0}")]
    DeviceCreation(String),
    /// 缓冲区操作失败
    #[error("缓冲区操作失败: {0}")]
    BufferOperation(String),
}

impl From<GpuError> for HlError {
    fn from(err: GpuError) -> Self {
        HlError::gpu(err.to_string())
    }
}

/// GPU 计算管线集合
struct GpuPipelines {
    /// LxF 模板
    lxf: ComputePipeline,
    /// 幽灵层填充
    halo: ComputePipeline,
}

impl GpuPipelines {
    /// 编译着色器并创建管线（显式布局，与预建绑定组配套）
    fn new(device: &Device, layouts: &BindGroupLayouts) -> Self {
        let lxf_module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("lxf"),
            source: ShaderSource::Wgsl(shaders::LXF.into()),
        });
        let halo_module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("halo"),
            source: ShaderSource::Wgsl(shaders::HALO.into()),
        });

        let lxf_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("lxf_layout"),
            bind_group_layouts: &[&layouts.params, &layouts.state_read, &layouts.state_rw],
            push_constant_ranges: &[],
        });
        let halo_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("halo_layout"),
            bind_group_layouts: &[&layouts.params, &layouts.state_rw],
            push_constant_ranges: &[],
        });

        let lxf = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("lxf"),
            layout: Some(&lxf_layout),
            module: &lxf_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let halo = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("halo"),
            layout: Some(&halo_layout),
            module: &halo_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self { lxf, halo }
    }
}

/// GPU 状态双缓冲 (h, hu, hv)
struct GpuStatePair {
    h: DoubleBuffer<f32>,
    hu: DoubleBuffer<f32>,
    hv: DoubleBuffer<f32>,
    n_cells: usize,
}

impl GpuStatePair {
    fn new(device: &Device, n_cells: usize) -> Self {
        Self {
            h: DoubleBuffer::new(device, n_cells, "h"),
            hu: DoubleBuffer::new(device, n_cells, "hu"),
            hv: DoubleBuffer::new(device, n_cells, "hv"),
            n_cells,
        }
    }

    /// 上传初始状态到当前代
    fn upload(&self, queue: &Queue, h: &[f32], hu: &[f32], hv: &[f32]) {
        self.h.read_buffer().write(queue, h);
        self.hu.read_buffer().write(queue, hu);
        self.hv.read_buffer().write(queue, hv);
    }

    fn swap(&mut self) {
        self.h.swap();
        self.hu.swap();
        self.hv.swap();
    }
}

/// GPU 路径的浅水方程模拟器（f32 精度）
///
/// 驱动接口与 CPU 路径一致；模拟循环、步长裁剪与终止语义
/// 全部来自 [`EulerStepper`] 的默认实现。
pub struct GpuSimulation {
    context: GpuContext,
    grid: StructuredGrid<f32>,
    state: GpuStatePair,
    params_buffer: ParamsBuffer,
    pipelines: GpuPipelines,
    params_group: BindGroup,
    /// 按槽位预建的只读绑定组（模板输入）
    read_groups: [BindGroup; 2],
    /// 按槽位预建的读写绑定组（幽灵层填充 / 模板输出）
    rw_groups: [BindGroup; 2],
    t: f64,
    step_count: u64,
    phase: RunPhase,
}

impl GpuSimulation {
    /// 从初始条件构建 GPU 模拟器
    ///
    /// 初始数组为行主序、含幽灵单元，长度须等于 `grid.total_cells()`。
    ///
    /// # 错误
    /// - 维度不匹配时返回 [`HlError::DimensionMismatch`]
    /// - GPU 资源创建失败时返回 [`HlError::Gpu`]
    pub fn new(
        context: GpuContext,
        grid: StructuredGrid<f32>,
        halo: HaloPolicy,
        params: NumericalParams<f32>,
        h0: &[f32],
        hu0: &[f32],
        hv0: &[f32],
    ) -> HlResult<Self> {
        let n_cells = grid.total_cells();
        for (data, context_name) in [(h0, "h0"), (hu0, "hu0"), (hv0, "hv0")] {
            if data.len() != n_cells {
                return Err(HlError::DimensionMismatch {
                    expected: n_cells,
                    actual: data.len(),
                    context: context_name,
                });
            }
        }

        let device = context.device();
        let layouts = BindGroupLayouts::new(device);
        let pipelines = GpuPipelines::new(device, &layouts);

        let params_buffer = ParamsBuffer::new(
            device,
            context.queue(),
            LxfParams {
                nx: grid.nx() as u32,
                ny: grid.ny() as u32,
                stride: grid.stride() as u32,
                halo_mode: halo_mode_code(halo),
                dx: grid.dx(),
                dy: grid.dy(),
                dt: 0.0,
                g: params.g,
                eps_h: params.eps_h,
                _padding: [0.0; 3],
            },
        );
        let params_group = params_buffer.create_bind_group(device, &layouts.params);

        let state = GpuStatePair::new(device, n_cells);
        state.upload(context.queue(), h0, hu0, hv0);

        let read_groups = [
            Self::state_bind_group(device, &layouts.state_read, "state_read_0", &state, 0),
            Self::state_bind_group(device, &layouts.state_read, "state_read_1", &state, 1),
        ];
        let rw_groups = [
            Self::state_bind_group(device, &layouts.state_rw, "state_rw_0", &state, 0),
            Self::state_bind_group(device, &layouts.state_rw, "state_rw_1", &state, 1),
        ];

        debug!(
            "GPU 模拟器就绪: {}x{} 网格, {} 单元, 适配器 {}",
            grid.nx(),
            grid.ny(),
            n_cells,
            context.adapter_info().name
        );

        Ok(Self {
            context,
            grid,
            state,
            params_buffer,
            pipelines,
            params_group,
            read_groups,
            rw_groups,
            t: 0.0,
            step_count: 0,
            phase: RunPhase::Idle,
        })
    }

    /// 按槽位构建状态绑定组 (h, hu, hv)
    fn state_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        label: &str,
        state: &GpuStatePair,
        slot: usize,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: state.h.slot(slot).as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: state.hu.slot(slot).as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: state.hv.slot(slot).as_entire_binding(),
                },
            ],
        })
    }

    /// 网格
    pub fn grid(&self) -> &StructuredGrid<f32> {
        &self.grid
    }

    /// GPU 上下文
    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// 累计步数
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// dispatch 大小（向上取整）
    fn dispatch_size(n: u32, workgroup: u32) -> u32 {
        (n + workgroup - 1) / workgroup
    }

    /// 回读当前代状态 (h, hu, hv)，含幽灵单元
    pub fn read_state(&self) -> HlResult<(Vec<f32>, Vec<f32>, Vec<f32>)> {
        let device = self.context.device();
        let n = self.state.n_cells;
        let size = (n * std::mem::size_of::<f32>()) as u64;

        let make_staging = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: GpuBufferUsage::Staging.to_wgpu_usage(),
                mapped_at_creation: false,
            })
        };
        let staging_h = make_staging("staging_h");
        let staging_hu = make_staging("staging_hu");
        let staging_hv = make_staging("staging_hv");

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("read_state"),
        });
        encoder.copy_buffer_to_buffer(self.state.h.read_buffer().buffer(), 0, &staging_h, 0, size);
        encoder.copy_buffer_to_buffer(
            self.state.hu.read_buffer().buffer(),
            0,
            &staging_hu,
            0,
            size,
        );
        encoder.copy_buffer_to_buffer(
            self.state.hv.read_buffer().buffer(),
            0,
            &staging_hv,
            0,
            size,
        );
        self.context.queue().submit(std::iter::once(encoder.finish()));

        let h = read_staging_buffer::<f32>(device, &staging_h)?;
        let hu = read_staging_buffer::<f32>(device, &staging_hu)?;
        let hv = read_staging_buffer::<f32>(device, &staging_hv)?;
        Ok((h, hu, hv))
    }

    /// 内部单元水深总和（守恒性检验用）
    pub fn interior_depth_sum(&self) -> HlResult<f64> {
        let (h, _, _) = self.read_state()?;
        let mut sum = 0.0f64;
        for j in self.grid.interior_y() {
            for i in self.grid.interior_x() {
                sum += f64::from(h[self.grid.idx(i, j)]);
            }
        }
        Ok(sum)
    }
}

impl EulerStepper for GpuSimulation {
    fn step_euler(&mut self, dt: f64) -> HlResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(HlError::InvalidStepSize { dt });
        }
        self.params_buffer.set_dt(self.context.queue(), dt as f32);

        let read = self.state.h.read_slot();
        let write = 1 - read;

        let nx = self.grid.nx() as u32;
        let ny = self.grid.ny() as u32;

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&CommandEncoderDescriptor {
                    label: Some("lxf_step"),
                });

        // 1. 幽灵层填充（就地写当前代）
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("halo"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.halo);
            pass.set_bind_group(0, &self.params_group, &[]);
            pass.set_bind_group(1, &self.rw_groups[read], &[]);
            pass.dispatch_workgroups(Self::dispatch_size(nx.max(ny), HALO_WORKGROUP), 1, 1);
        }

        // 2. LxF 模板（读当前代，写下一代）
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("lxf"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.lxf);
            pass.set_bind_group(0, &self.params_group, &[]);
            pass.set_bind_group(1, &self.read_groups[read], &[]);
            pass.set_bind_group(2, &self.rw_groups[write], &[]);
            pass.dispatch_workgroups(
                Self::dispatch_size(nx, STENCIL_WORKGROUP),
                Self::dispatch_size(ny, STENCIL_WORKGROUP),
                1,
            );
        }

        self.context.queue().submit(std::iter::once(encoder.finish()));

        // 步间同步：下一步编码前，本步写入必须完全可见
        self.context.synchronize();

        self.state.swap();
        self.t += dt;
        self.step_count += 1;
        self.phase = RunPhase::Stepping;
        Ok(())
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn align_time(&mut self, t: f64) {
        self.t = t;
    }

    fn phase(&self) -> RunPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_size_rounds_up() {
        assert_eq!(GpuSimulation::dispatch_size(16, 16), 1);
        assert_eq!(GpuSimulation::dispatch_size(17, 16), 2);
        assert_eq!(GpuSimulation::dispatch_size(1, 64), 1);
    }

    #[test]
    fn test_gpu_error_display() {
        let err = GpuError::NoAdapter;
        assert!(!err.to_string().is_empty());

        let err: HlError = GpuError::DeviceCreation("test".to_string()).into();
        assert!(matches!(err, HlError::Gpu(_)));
    }

    fn gpu_sim(nx: usize, ny: usize, halo: HaloPolicy, h0: Vec<f32>) -> GpuSimulation {
        let context = GpuContext::new(wgpu::PowerPreference::None).unwrap();
        let grid = StructuredGrid::new(nx, ny, 1.0f32, 1.0).unwrap();
        let zero = vec![0.0f32; grid.total_cells()];
        GpuSimulation::new(
            context,
            grid,
            halo,
            NumericalParams::default(),
            &h0,
            &zero,
            &zero,
        )
        .unwrap()
    }

    #[test]
    #[ignore = "Requires GPU hardware"]
    fn test_gpu_still_water_fixed_point() {
        let grid = StructuredGrid::<f32>::new(8, 8, 1.0f32, 1.0).unwrap();
        let h0 = vec![1.0f32; grid.total_cells()];
        let mut sim = gpu_sim(8, 8, HaloPolicy::Reflective, h0);

        let stats = sim.simulate(0.1, 0.01).unwrap();
        assert_eq!(stats.steps, 10);
        assert_eq!(sim.time(), 0.1);

        let (h, hu, hv) = sim.read_state().unwrap();
        let grid = *sim.grid();
        for j in grid.interior_y() {
            for i in grid.interior_x() {
                assert!((h[grid.idx(i, j)] - 1.0).abs() < 1e-5);
                assert!(hu[grid.idx(i, j)].abs() < 1e-5);
                assert!(hv[grid.idx(i, j)].abs() < 1e-5);
            }
        }
    }

    #[test]
    #[ignore = "Requires GPU hardware"]
    fn test_gpu_mass_conservation_periodic() {
        let grid = StructuredGrid::<f32>::new(16, 16, 1.0f32, 1.0).unwrap();
        let mut h0 = vec![1.0f32; grid.total_cells()];
        h0[grid.idx(8, 8)] = 2.0;
        let mut sim = gpu_sim(16, 16, HaloPolicy::Periodic, h0);

        let mass0 = sim.interior_depth_sum().unwrap();
        sim.simulate(0.5, 0.01).unwrap();
        let mass1 = sim.interior_depth_sum().unwrap();
        // f32 精度下的守恒容差
        assert!((mass1 - mass0).abs() < 1e-2);
    }
}
