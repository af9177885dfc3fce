// crates/hl_core/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `HlError` 枚举和 `HlResult` 类型别名，用于整个项目的错误处理。
//!
//! # 传播策略
//!
//! - 构造期错误（维度不匹配、非法配置）：立即同步返回，不可重试
//! - 步进期数值异常：模板内静默修正（干单元保护），不抛出；
//!   调用方可通过诊断扫描主动检测 [`HlError::NumericalInstability`]
//! - GPU 错误：设备/管线/缓冲区失败统一归入 [`HlError::Gpu`]

use thiserror::Error;

/// 统一结果类型
pub type HlResult<T> = Result<T, HlError>;

/// HydroLax 错误类型
#[derive(Error, Debug)]
pub enum HlError {
    /// 初始条件数组尺寸与网格不匹配
    #[error("维度不匹配: 期望 {expected} 个单元, 实际 {actual} 个 ({context})")]
    DimensionMismatch {
        /// 期望的数组长度（含幽灵单元）
        expected: usize,
        /// 实际提供的数组长度
        actual: usize,
        /// 出错的字段名
        context: &'static str,
    },

    /// 非法时间步长（dt <= 0 或非有限值）
    #[error("非法时间步长: dt = {dt}")]
    InvalidStepSize {
        /// 被拒绝的步长值
        dt: f64,
    },

    /// 数值不稳定（诊断扫描检出 NaN 或持续负水深）
    #[error("数值不稳定 (第 {step} 步): {detail}")]
    NumericalInstability {
        /// 检出异常的步数
        step: u64,
        /// 异常描述
        detail: String,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// GPU 计算错误
    #[error("GPU 错误: {0}")]
    Gpu(String),
}

impl HlError {
    /// 便捷构造：配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 便捷构造：GPU 错误
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = HlError::DimensionMismatch {
            expected: 36,
            actual: 16,
            context: "h0",
        };
        let msg = err.to_string();
        assert!(msg.contains("36"));
        assert!(msg.contains("h0"));
    }

    #[test]
    fn test_invalid_step_size_display() {
        let err = HlError::InvalidStepSize { dt: -0.01 };
        assert!(err.to_string().contains("-0.01"));
    }

    #[test]
    fn test_convenience_constructors() {
        assert!(matches!(HlError::config("x"), HlError::Config(_)));
        assert!(matches!(HlError::gpu("y"), HlError::Gpu(_)));
    }
}
