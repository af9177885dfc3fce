// crates/hl_core/src/lib.rs

//! HydroLax 基础层
//!
//! 提供求解器各层共享的最底层抽象：
//! - [`RuntimeScalar`]: 密封的标量类型 trait（仅 f32/f64）
//! - [`HlError`] / [`HlResult`]: 统一错误类型
//!
//! 本 crate 不依赖任何计算框架，保持最小依赖面。

pub mod error;
pub mod scalar;

pub use error::{HlError, HlResult};
pub use scalar::RuntimeScalar;
