/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 优化器基础trait
 */

use super::{Adam, SGD};
use crate::config::{OptimizerKind, ParameterSpec};
use crate::errors::{AnfisError, Result};
use crate::nn::params::{AnfisGrads, AnfisParams, ParamGroup};
use enum_dispatch::enum_dispatch;
use ndarray::{Array2, ArrayView2};
use std::collections::HashMap;

/// 优化器核心 trait
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// ```ignore
    /// let cache = model.forward_cached(&params, x);
    /// let grads = model.backward(&params, x, &cache, grad_output.view());
    /// let mut next = (*model.store().snapshot()).clone();
    /// optimizer.step(&mut next, &grads)?; // ← 只改私有副本，由调用方统一提交
    /// ```
    fn step(&mut self, params: &mut AnfisParams, grads: &AnfisGrads) -> Result<()>;

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f64;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f64);
}

/// 按配置选定的优化器
///
/// 可 `clone`：训练循环在每次更新前留一份副本，失败时整体回滚优化器状态。
#[enum_dispatch(Optimizer)]
#[derive(Debug, Clone)]
pub enum AnyOptimizer {
    SGD(SGD),
    Adam(Adam),
}

impl AnyOptimizer {
    pub fn from_spec(spec: &ParameterSpec) -> Self {
        let lr = spec.learning_rate();
        match spec.optimizer() {
            OptimizerKind::Sgd => SGD::new(lr).into(),
            OptimizerKind::Adam => Adam::new_default(lr).into(),
        }
    }
}

/// 取出某组参数对应的梯度；形状不一致时报错
pub(crate) fn matching_grad<'g>(
    group: ParamGroup,
    param: &ArrayView2<'_, f64>,
    grads: &'g AnfisGrads,
) -> Result<ArrayView2<'g, f64>> {
    let grad = grads.group(group).ok_or_else(|| {
        AnfisError::shape(param.shape(), &[], format!("缺少参数组 {} 的梯度", group.name()))
    })?;
    if grad.shape() != param.shape() {
        return Err(AnfisError::shape(param.shape(), grad.shape(), group.name()));
    }
    Ok(grad)
}

/// 累积状态是否仍与参数形状一致（换了结构不同的模型后需要重置）
pub(crate) fn state_fits(
    state: &HashMap<ParamGroup, Array2<f64>>,
    params: &AnfisParams,
) -> bool {
    params.groups().iter().all(|(group, param)| {
        state
            .get(group)
            .is_none_or(|buffer| buffer.shape() == param.shape())
    })
}
