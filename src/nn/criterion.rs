/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 损失函数与评估指标
 *
 * 所有损失都对 batch 取平均（mean reduction），并给出对预测值的解析梯度。
 *
 * ```ignore
 * let criterion = LossFunction::from(LossKind::Huber);
 * let loss = criterion.forward(pred.view(), target.view());
 * let grad = criterion.backward(pred.view(), target.view());
 * ```
 */

use crate::config::{LossKind, MetricKind};
use enum_dispatch::enum_dispatch;
use ndarray::{Array1, ArrayView1, Zip};

/// 损失函数约定
#[enum_dispatch]
pub trait Loss {
    /// 标量损失值
    fn forward(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64;

    /// ∂L/∂prediction
    fn backward(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>)
    -> Array1<f64>;

    fn kind(&self) -> LossKind;
}

/// 按元素计算后取平均；空 batch 的损失为 0
fn mean_of<F>(prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    if prediction.is_empty() {
        return 0.0;
    }
    let sum = Zip::from(&prediction)
        .and(&target)
        .fold(0.0, |acc, &p, &t| acc + f(p - t));
    sum / prediction.len() as f64
}

fn scaled_grad<F>(
    prediction: ArrayView1<'_, f64>,
    target: ArrayView1<'_, f64>,
    f: F,
) -> Array1<f64>
where
    F: Fn(f64) -> f64,
{
    let n = prediction.len().max(1) as f64;
    Zip::from(&prediction)
        .and(&target)
        .map_collect(|&p, &t| f(p - t) / n)
}

// ==================== MseLoss ====================

/// 均方误差：`mean((p - t)²)`
///
/// 梯度：`2 (p - t) / N`
#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl Loss for MseLoss {
    fn forward(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
        mean_of(prediction, target, |d| d * d)
    }

    fn backward(
        &self,
        prediction: ArrayView1<'_, f64>,
        target: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        scaled_grad(prediction, target, |d| 2.0 * d)
    }

    fn kind(&self) -> LossKind {
        LossKind::Mse
    }
}

// ==================== MaeLoss ====================

/// 平均绝对误差：`mean(|p - t|)`
///
/// 梯度：`sign(p - t) / N`，p == t 处取 0
#[derive(Debug, Clone, Copy, Default)]
pub struct MaeLoss;

impl Loss for MaeLoss {
    fn forward(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
        mean_of(prediction, target, f64::abs)
    }

    fn backward(
        &self,
        prediction: ArrayView1<'_, f64>,
        target: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        scaled_grad(prediction, target, sign)
    }

    fn kind(&self) -> LossKind {
        LossKind::Mae
    }
}

// ==================== HuberLoss ====================

/// Huber 损失
///
/// - `|d| ≤ δ`: `0.5 d²`
/// - `|d| > δ`: `δ (|d| - 0.5 δ)`
///
/// 梯度在 `|d| ≤ δ` 时为 `d / N`，否则为 `δ·sign(d) / N`。
#[derive(Debug, Clone, Copy)]
pub struct HuberLoss {
    delta: f64,
}

impl HuberLoss {
    pub const fn new(delta: f64) -> Self {
        Self { delta }
    }

    pub const fn delta(&self) -> f64 {
        self.delta
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Loss for HuberLoss {
    fn forward(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
        let delta = self.delta;
        mean_of(prediction, target, |d| {
            let a = d.abs();
            if a <= delta {
                0.5 * d * d
            } else {
                delta * (a - 0.5 * delta)
            }
        })
    }

    fn backward(
        &self,
        prediction: ArrayView1<'_, f64>,
        target: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let delta = self.delta;
        scaled_grad(prediction, target, |d| {
            if d.abs() <= delta { d } else { delta * sign(d) }
        })
    }

    fn kind(&self) -> LossKind {
        LossKind::Huber
    }
}

fn sign(d: f64) -> f64 {
    if d > 0.0 {
        1.0
    } else if d < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 训练时使用的损失函数
#[enum_dispatch(Loss)]
#[derive(Debug, Clone, Copy)]
pub enum LossFunction {
    MseLoss,
    MaeLoss,
    HuberLoss,
}

impl From<LossKind> for LossFunction {
    fn from(kind: LossKind) -> Self {
        match kind {
            LossKind::Mse => MseLoss.into(),
            LossKind::Mae => MaeLoss.into(),
            LossKind::Huber => HuberLoss::default().into(),
        }
    }
}

// ==================== 评估指标 ====================

impl MetricKind {
    /// 计算指标值（不参与反向传播）
    pub fn evaluate(&self, prediction: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Mse => MseLoss.forward(prediction, target),
            Self::Mae => MaeLoss.forward(prediction, target),
        }
    }
}
