/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:30:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06
 * @Description  : Adam优化器实现
 */

use super::base::{Optimizer, matching_grad, state_fits};
use crate::errors::Result;
use crate::nn::params::{AnfisGrads, AnfisParams, ParamGroup};
use ndarray::{Array2, Zip};
use std::collections::HashMap;

/// Adam优化器
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// 一阶矩估计
    m: HashMap<ParamGroup, Array2<f64>>,
    /// 二阶矩估计
    v: HashMap<ParamGroup, Array2<f64>>,
    /// 时间步
    t: u64,
}

impl Adam {
    /// 创建新的Adam优化器
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器（β1=0.9, β2=0.999, ε=1e-7）
    pub fn new_default(learning_rate: f64) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-7)
    }

    /// 已执行的更新步数
    pub const fn steps(&self) -> u64 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut AnfisParams, grads: &AnfisGrads) -> Result<()> {
        if !(state_fits(&self.m, params) && state_fits(&self.v, params)) {
            log::debug!("参数形状已变化，重置 Adam 矩估计（已走 {} 步）", self.t);
            self.reset();
        }
        self.t = self.t.saturating_add(1);
        let (beta1, beta2, epsilon, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        // 步数超出 i32 后 β^t 早已为 0
        let exponent = i32::try_from(self.t).unwrap_or(i32::MAX);
        let bias1 = 1.0 - beta1.powi(exponent);
        let bias2 = 1.0 - beta2.powi(exponent);

        for (group, mut param) in params.groups_mut() {
            let grad = matching_grad(group, &param.view(), grads)?;
            let m = self
                .m
                .entry(group)
                .or_insert_with(|| Array2::zeros(grad.raw_dim()));
            let v = self
                .v
                .entry(group)
                .or_insert_with(|| Array2::zeros(grad.raw_dim()));

            Zip::from(&mut param)
                .and(&mut *m)
                .and(&mut *v)
                .and(&grad)
                .for_each(|theta, m, v, &g| {
                    // m = β1 * m + (1 - β1) * g
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    // v = β2 * v + (1 - β2) * g²
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    // 偏差修正后更新: θ = θ - α * m_hat / (√v_hat + ε)
                    let m_hat = *m / bias1;
                    let v_hat = *v / bias2;
                    *theta -= lr * m_hat / (v_hat.sqrt() + epsilon);
                });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}
