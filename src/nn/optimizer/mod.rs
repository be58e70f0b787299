/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06
 * @Description  : 优化器模块：SGD（可选动量）与 Adam，按参数组维护状态
 */

mod adam;
mod base;
mod sgd;

pub use adam::Adam;
pub use base::{AnyOptimizer, Optimizer};
pub use sgd::SGD;
