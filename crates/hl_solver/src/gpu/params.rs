// crates/hl_solver/src/gpu/params.rs

//! GPU uniform 参数与绑定组布局
//!
//! [`LxfParams`] 是模板与幽灵层内核共用的 uniform 结构，
//! 字段顺序与 WGSL 侧声明严格一致，`#[repr(C)]` + `Pod` 保证
//! 可按字节直接上传。

use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BufferBindingType, Device, Queue, ShaderStages,
};

use crate::boundary::HaloPolicy;

/// 幽灵层填充模式编码（WGSL 侧 switch 分支值）
pub fn halo_mode_code(policy: HaloPolicy) -> u32 {
    match policy {
        HaloPolicy::Periodic => 0,
        HaloPolicy::Reflective => 1,
        HaloPolicy::Outflow => 2,
    }
}

/// GPU 计算参数 (Uniform Buffer)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LxfParams {
    /// x 方向内部单元数
    pub nx: u32,
    /// y 方向内部单元数
    pub ny: u32,
    /// 行步长（nx + 2）
    pub stride: u32,
    /// 幽灵层填充模式 (0=periodic, 1=reflective, 2=outflow)
    pub halo_mode: u32,
    /// x 方向单元间距
    pub dx: f32,
    /// y 方向单元间距
    pub dy: f32,
    /// 时间步长
    pub dt: f32,
    /// 重力加速度
    pub g: f32,
    /// 干单元判定阈值
    pub eps_h: f32,
    /// 填充到 16 字节对齐
    pub _padding: [f32; 3],
}

impl Default for LxfParams {
    fn default() -> Self {
        Self {
            nx: 0,
            ny: 0,
            stride: 2,
            halo_mode: halo_mode_code(HaloPolicy::default()),
            dx: 1.0,
            dy: 1.0,
            dt: 0.001,
            g: 9.81,
            eps_h: 1e-6,
            _padding: [0.0; 3],
        }
    }
}

/// 参数缓冲区管理
pub struct ParamsBuffer {
    buffer: wgpu::Buffer,
    params: LxfParams,
}

impl ParamsBuffer {
    /// 创建参数缓冲区并上传初始值
    pub fn new(device: &Device, queue: &Queue, params: LxfParams) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lxf_params"),
            size: std::mem::size_of::<LxfParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&params));

        Self { buffer, params }
    }

    /// 整体更新参数
    pub fn update(&mut self, queue: &Queue, params: LxfParams) {
        self.params = params;
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// 设置时间步长
    pub fn set_dt(&mut self, queue: &Queue, dt: f32) {
        self.params.dt = dt;
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// 获取缓冲区引用
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// 获取当前参数
    pub fn params(&self) -> &LxfParams {
        &self.params
    }

    /// 创建绑定组
    pub fn create_bind_group(&self, device: &Device, layout: &BindGroupLayout) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("params_bind_group"),
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: self.buffer.as_entire_binding(),
            }],
        })
    }
}

/// 绑定组布局集合
///
/// - `params`: uniform 参数
/// - `state_read`: 当前代 (h, hu, hv)，只读
/// - `state_rw`: 下一代或幽灵层填充目标 (h, hu, hv)，读写
pub struct BindGroupLayouts {
    /// 参数布局
    pub params: BindGroupLayout,
    /// 状态只读布局
    pub state_read: BindGroupLayout,
    /// 状态读写布局
    pub state_rw: BindGroupLayout,
}

impl BindGroupLayouts {
    /// 创建所有绑定组布局
    pub fn new(device: &Device) -> Self {
        let params = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("params_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let state_read = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("state_read_layout"),
            entries: &Self::storage_entries(&[0, 1, 2], true),
        });

        let state_rw = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("state_rw_layout"),
            entries: &Self::storage_entries(&[0, 1, 2], false),
        });

        Self {
            params,
            state_read,
            state_rw,
        }
    }

    /// 创建 Storage Buffer 布局条目
    fn storage_entries(bindings: &[u32], read_only: bool) -> Vec<BindGroupLayoutEntry> {
        bindings
            .iter()
            .map(|&binding| BindGroupLayoutEntry {
                binding,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Storage { read_only },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_size_and_alignment() {
        // uniform 结构体须为 16 字节倍数
        let size = std::mem::size_of::<LxfParams>();
        assert_eq!(size, 48);
        assert_eq!(size % 16, 0);
    }

    #[test]
    fn test_params_default() {
        let params = LxfParams::default();
        assert_eq!(params.g, 9.81);
        assert_eq!(params.eps_h, 1e-6);
        assert_eq!(params.halo_mode, halo_mode_code(HaloPolicy::Reflective));
    }

    #[test]
    fn test_halo_mode_codes_distinct() {
        let codes = [
            halo_mode_code(HaloPolicy::Periodic),
            halo_mode_code(HaloPolicy::Reflective),
            halo_mode_code(HaloPolicy::Outflow),
        ];
        assert_eq!(codes, [0, 1, 2]);
    }
}
