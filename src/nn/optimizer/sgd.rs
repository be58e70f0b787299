/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06
 * @Description  : 梯度下降优化器实现
 */

use super::base::{Optimizer, matching_grad, state_fits};
use crate::errors::Result;
use crate::nn::params::{AnfisGrads, AnfisParams, ParamGroup};
use ndarray::{Array2, Zip};
use std::collections::HashMap;

/// SGD (随机梯度下降) 优化器
///
/// - 无动量：θ = θ - α * ∇θ
/// - 有动量：v = μ * v + ∇θ；θ = θ - α * v
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f64,
    momentum: f64,
    /// 每组参数的速度项（仅 momentum > 0 时使用）
    velocity: HashMap<ParamGroup, Array2<f64>>,
}

impl SGD {
    /// 创建新的SGD优化器
    pub fn new(learning_rate: f64) -> Self {
        Self::with_momentum(learning_rate, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: HashMap::new(),
        }
    }

    pub const fn momentum(&self) -> f64 {
        self.momentum
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut AnfisParams, grads: &AnfisGrads) -> Result<()> {
        if !state_fits(&self.velocity, params) {
            log::debug!("参数形状已变化，清空 SGD 速度项");
            self.velocity.clear();
        }
        let lr = self.learning_rate;
        for (group, mut param) in params.groups_mut() {
            let grad = matching_grad(group, &param.view(), grads)?;
            if self.momentum > 0.0 {
                let momentum = self.momentum;
                let v = self
                    .velocity
                    .entry(group)
                    .or_insert_with(|| Array2::zeros(grad.raw_dim()));
                Zip::from(&mut *v)
                    .and(&grad)
                    .for_each(|v, &g| *v = momentum * *v + g);
                param.scaled_add(-lr, &*v);
            } else {
                // 梯度下降更新：θ = θ - α * ∇θ
                param.scaled_add(-lr, &grad);
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}
