// crates/hl_solver/src/gpu/buffer.rs

//! GPU 缓冲区管理
//!
//! 提供类型安全的缓冲区包装与乒乓式双缓冲。

use std::marker::PhantomData;

use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, Queue};

use super::solver::GpuError;

/// GPU 缓冲区用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuBufferUsage {
    /// 存储缓冲区（可读写，可双向复制）
    Storage,
    /// 统一缓冲区（小型常量数据）
    Uniform,
    /// 暂存缓冲区（GPU -> CPU 回读）
    Staging,
}

impl GpuBufferUsage {
    /// 转换为 wgpu BufferUsages
    pub fn to_wgpu_usage(self) -> BufferUsages {
        match self {
            Self::Storage => {
                BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC
            }
            Self::Uniform => BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            Self::Staging => BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        }
    }
}

/// 类型化的 GPU 缓冲区
pub struct TypedBuffer<T> {
    buffer: Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// 创建新的缓冲区
    pub fn new(device: &Device, len: usize, usage: GpuBufferUsage, label: Option<&str>) -> Self {
        let size = (len * std::mem::size_of::<T>()) as u64;
        let buffer = device.create_buffer(&BufferDescriptor {
            label,
            size,
            usage: usage.to_wgpu_usage(),
            mapped_at_creation: false,
        });

        Self {
            buffer,
            len,
            _marker: PhantomData,
        }
    }

    /// 上传数据到缓冲区
    pub fn write(&self, queue: &Queue, data: &[T]) {
        assert!(data.len() <= self.len, "数据超出缓冲区容量");
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    /// 获取底层缓冲区引用
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// 获取元素数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取字节大小
    pub fn size_bytes(&self) -> u64 {
        (self.len * std::mem::size_of::<T>()) as u64
    }

    /// 创建绑定组条目资源
    pub fn as_entire_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// 映射暂存缓冲区并读回数据（阻塞轮询直至映射完成）
pub fn read_staging_buffer<T: bytemuck::Pod>(
    device: &Device,
    staging: &Buffer,
) -> Result<Vec<T>, GpuError> {
    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    receiver
        .recv()
        .map_err(|e| GpuError::BufferOperation(e.to_string()))?
        .map_err(|e| GpuError::BufferOperation(e.to_string()))?;

    let data = slice.get_mapped_range();
    let result: Vec<T> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();

    Ok(result)
}

/// 双缓冲区（乒乓式时间推进）
///
/// 与 CPU 路径的状态对语义一致：`swap()` 仅翻转角色标志，
/// 不移动任何 GPU 内存。
pub struct DoubleBuffer<T> {
    front: TypedBuffer<T>,
    back: TypedBuffer<T>,
    /// true 表示 front 为当前代
    front_active: bool,
}

impl<T: bytemuck::Pod> DoubleBuffer<T> {
    /// 创建双缓冲区
    pub fn new(device: &Device, len: usize, label: &str) -> Self {
        let front = TypedBuffer::new(
            device,
            len,
            GpuBufferUsage::Storage,
            Some(&format!("{label}_front")),
        );
        let back = TypedBuffer::new(
            device,
            len,
            GpuBufferUsage::Storage,
            Some(&format!("{label}_back")),
        );

        Self {
            front,
            back,
            front_active: true,
        }
    }

    /// 当前代缓冲区（模板只读输入）
    pub fn read_buffer(&self) -> &TypedBuffer<T> {
        if self.front_active {
            &self.front
        } else {
            &self.back
        }
    }

    /// 下一代缓冲区（模板只写输出）
    pub fn write_buffer(&self) -> &TypedBuffer<T> {
        if self.front_active {
            &self.back
        } else {
            &self.front
        }
    }

    /// 按固定槽位取缓冲区（0 = front, 1 = back），构建绑定组用
    pub fn slot(&self, index: usize) -> &TypedBuffer<T> {
        if index == 0 {
            &self.front
        } else {
            &self.back
        }
    }

    /// 当前代所在槽位
    pub fn read_slot(&self) -> usize {
        if self.front_active {
            0
        } else {
            1
        }
    }

    /// 交换缓冲区角色
    pub fn swap(&mut self) {
        self.front_active = !self.front_active;
    }

    /// 获取元素数量
    pub fn len(&self) -> usize {
        self.front.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_usage_flags() {
        let storage = GpuBufferUsage::Storage.to_wgpu_usage();
        assert!(storage.contains(BufferUsages::STORAGE));
        assert!(storage.contains(BufferUsages::COPY_SRC));

        let staging = GpuBufferUsage::Staging.to_wgpu_usage();
        assert!(staging.contains(BufferUsages::MAP_READ));
    }
}
