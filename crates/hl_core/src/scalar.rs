// crates/hl_core/src/scalar.rs

//! RuntimeScalar - 密封的标量类型抽象
//!
//! 提供编译期精度选择的唯一接口，使数值核心在 f32 与 f64 之间零成本切换。
//!
//! # 设计原则
//!
//! 1. **密封 Trait**: 只有 f32 和 f64 可以实现（通过 private::Sealed）
//! 2. **零成本抽象**: `#[inline]` + 编译期单态化
//! 3. **Pod 约束**: 保证可直接上传 GPU 缓冲区
//!
//! # 精度选择
//!
//! - `f32`: GPU 加速模式，内存占用减半
//! - `f64`: CPU 高精度模式（默认），适合科学验证

use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::Pod;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};

/// 密封模块，禁止外部实现
mod private {
    /// 密封 trait
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// 运行时标量类型（密封，仅 f32/f64 可实现）
///
/// 数值核心层的所有组件必须使用此 trait 作为泛型边界。
/// 应用层（CLI）不使用泛型，通过配置选择精度。
pub trait RuntimeScalar:
    private::Sealed
    + Pod
    + Float
    + FromPrimitive
    + ToPrimitive
    + NumAssign
    + Copy
    + Clone
    + Debug
    + Display
    + Send
    + Sync
    + Sum
    + Default
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// 零值
    const ZERO: Self;
    /// 一
    const ONE: Self;
    /// 二
    const TWO: Self;
    /// 二分之一
    const HALF: Self;
    /// 四分之一
    const QUARTER: Self;
    /// 机器精度
    const EPSILON: Self;
    /// 最大值
    const MAX: Self;

    /// 带阈值的安全除法
    ///
    /// 当除数绝对值小于 eps 时返回 fallback
    #[inline]
    fn safe_div_eps(self, rhs: Self, eps: Self, fallback: Self) -> Self {
        if rhs.abs() < eps {
            fallback
        } else {
            self / rhs
        }
    }

    /// 安全平方根（负数返回 0）
    ///
    /// 浮点舍入可能产生瞬时负水深，此处静默截断。
    #[inline]
    fn safe_sqrt(self) -> Self {
        if self < Self::ZERO {
            Self::ZERO
        } else {
            self.sqrt()
        }
    }

    /// 检查是否有限（非 NaN、非 Inf）
    #[inline]
    fn is_safe(self) -> bool {
        self.is_finite()
    }

    /// 近似相等判断
    #[inline]
    fn approx_eq(self, other: Self, epsilon: Self) -> bool {
        (self - other).abs() < epsilon
    }

    /// 批量验证切片中所有值是否有限
    ///
    /// 返回第一个非法值的位置与值
    fn validate_slice(data: &[Self]) -> Result<(), (usize, Self)> {
        for (i, &v) in data.iter().enumerate() {
            if !v.is_safe() {
                return Err((i, v));
            }
        }
        Ok(())
    }
}

// =============================================================================
// f32 实现
// =============================================================================

impl RuntimeScalar for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const TWO: f32 = 2.0;
    const HALF: f32 = 0.5;
    const QUARTER: f32 = 0.25;
    const EPSILON: f32 = f32::EPSILON;
    const MAX: f32 = f32::MAX;
}

// =============================================================================
// f64 实现
// =============================================================================

impl RuntimeScalar for f64 {
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
    const TWO: f64 = 2.0;
    const HALF: f64 = 0.5;
    const QUARTER: f64 = 0.25;
    const EPSILON: f64 = f64::EPSILON;
    const MAX: f64 = f64::MAX;
}
