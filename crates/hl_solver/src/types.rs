// crates/hl_solver/src/types.rs

//! 求解器核心类型定义
//!
//! - [`NumericalParams`]: 一次模拟运行内不可变的数值参数
//! - [`SafeVelocity`]: 干单元安全的速度计算
//!
//! 数值核心层全部使用 `S: RuntimeScalar` 泛型，应用层通过配置选择精度。

use hl_core::RuntimeScalar;
use num_traits::FromPrimitive;

// ============================================================
// 数值参数
// ============================================================

/// 数值参数（模拟运行期间不可变）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalParams<S: RuntimeScalar> {
    /// 重力加速度 [m/s²]
    pub g: S,
    /// 干单元判定阈值 [m]
    ///
    /// 水深低于此值时动量/水深除法被保护，速度按零处理。
    pub eps_h: S,
}

impl<S: RuntimeScalar> Default for NumericalParams<S> {
    fn default() -> Self {
        Self {
            g: S::from_f64(9.81).unwrap(),
            eps_h: S::from_f64(1e-6).unwrap(),
        }
    }
}

impl<S: RuntimeScalar> NumericalParams<S> {
    /// 指定重力加速度创建参数
    pub fn with_gravity(g: S) -> Self {
        Self {
            g,
            ..Self::default()
        }
    }

    /// 波速 sqrt(g·h)
    #[inline]
    pub fn wave_speed(&self, h: S) -> S {
        (self.g * h).safe_sqrt()
    }
}

// ============================================================
// 安全速度
// ============================================================

/// 安全速度（避免干单元除零导致的 NaN 扩散）
///
/// LxF 模板在空间上强耦合，单个 NaN 会在一步内污染整个网格，
/// 因此动量/水深除法必须在此处集中保护。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SafeVelocity<S: RuntimeScalar> {
    /// x 方向速度 [m/s]
    pub u: S,
    /// y 方向速度 [m/s]
    pub v: S,
}

impl<S: RuntimeScalar> SafeVelocity<S> {
    /// 零速度常量
    pub const ZERO: Self = Self {
        u: S::ZERO,
        v: S::ZERO,
    };

    /// 从动量和水深计算安全速度
    ///
    /// # 返回
    /// 当 `h <= eps_h` 时返回 ZERO，否则返回 `(hu/h, hv/h)`
    #[inline]
    pub fn from_momentum(hu: S, hv: S, h: S, eps_h: S) -> Self {
        if h <= eps_h {
            Self::ZERO
        } else {
            Self {
                u: hu / h,
                v: hv / h,
            }
        }
    }

    /// 速度大小（模长）
    #[inline]
    pub fn speed(&self) -> S {
        (self.u * self.u + self.v * self.v).sqrt()
    }

    /// 检查速度是否有效（非 NaN/Inf）
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.u.is_safe() && self.v.is_safe()
    }
}
