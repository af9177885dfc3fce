// crates/hl_solver/src/gpu/shaders.rs

//! WGSL 着色器源码（编译期内嵌）

/// LxF 模板内核
pub const LXF: &str = include_str!("shaders/lxf.wgsl");

/// 幽灵层填充内核
pub const HALO: &str = include_str!("shaders/halo.wgsl");
