/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : ANFIS 的四个固定层
 *
 * 前向顺序：模糊化 → 规则 → 归一化 → 后件（含求和输出）。
 * 各层本身不持有可学习参数，参数由 ParameterStore 统一管理，
 * 每次调用时以快照形式传入。
 */

mod consequent;
mod membership;
mod normalization;
mod rule;

pub use consequent::ConsequentLayer;
pub use membership::{BellMf, GaussianMf, MembershipFunction, MembershipKernel, MembershipLayer};
pub use normalization::{NORMALIZATION_EPSILON, NormalizationLayer};
pub use rule::{RuleLayer, RuleTable};
