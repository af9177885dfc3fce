// crates/hl_solver/src/gpu/context.rs

//! GPU 上下文
//!
//! 封装 wgpu 实例/适配器/设备/队列的获取。设备与队列以 `Arc` 持有，
//! 便于在求解器与诊断工具间共享。

use std::sync::Arc;

use wgpu::{
    Adapter, AdapterInfo, Device, DeviceDescriptor, Features, Instance, InstanceDescriptor,
    Limits, PowerPreference, Queue, RequestAdapterOptions,
};

use super::solver::GpuError;

/// GPU 上下文
pub struct GpuContext {
    #[allow(dead_code)]
    instance: Instance,
    #[allow(dead_code)]
    adapter: Adapter,
    device: Arc<Device>,
    queue: Arc<Queue>,
    adapter_info: AdapterInfo,
}

impl GpuContext {
    /// 异步创建 GPU 上下文
    pub async fn new_async(power: PowerPreference) -> Result<Self, GpuError> {
        let instance = Instance::new(InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: power,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("HydroLax GPU Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// 同步创建 GPU 上下文（阻塞）
    pub fn new(power: PowerPreference) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(power))
    }

    /// 获取设备引用
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// 获取队列引用
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// 适配器信息（设备名、后端）
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }

    /// 克隆设备 Arc
    pub fn device_arc(&self) -> Arc<Device> {
        self.device.clone()
    }

    /// 克隆队列 Arc
    pub fn queue_arc(&self) -> Arc<Queue> {
        self.queue.clone()
    }

    /// 等待已提交命令全部完成（步间同步点）
    pub fn synchronize(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "Requires GPU hardware"]
    fn test_context_creation() {
        let context = GpuContext::new(PowerPreference::None);
        assert!(context.is_ok());
    }
}
