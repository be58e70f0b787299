/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 归一化层（第 3 层）：激活强度 → 和为 1 的规则权重
 */

use crate::nn::context::zip_for_each;
use crate::nn::ComputeContext;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

/// 总激活强度低于此值时视为"没有规则被激活"
pub const NORMALIZATION_EPSILON: f64 = 1e-12;

/// 归一化层
///
/// `w_r = f_r / Σ f`。若某个样本的总激活强度不超过 [`NORMALIZATION_EPSILON`]
/// （输入远离所有隶属度函数的支撑区），改为均匀权重 `1 / rule_count`，
/// 因此输出总是有限、非负且和为 1。
///
/// # 输入/输出形状
/// - 输入：[batch_size, rule_count]
/// - 输出：[batch_size, rule_count]，以及每个样本的总激活强度 [batch_size]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationLayer;

impl NormalizationLayer {
    pub fn forward(
        &self,
        ctx: ComputeContext,
        firing: ArrayView2<'_, f64>,
    ) -> (Array2<f64>, Array1<f64>) {
        let rule_count = firing.ncols();
        let uniform = 1.0 / rule_count as f64;
        let mut normalized = Array2::zeros(firing.raw_dim());
        let mut totals = Array1::zeros(firing.nrows());
        zip_for_each!(
            ctx,
            Zip::from(normalized.rows_mut())
                .and(&mut totals)
                .and(firing.rows()),
            |mut w, total, f| {
                let sum = f.sum();
                *total = sum;
                if sum > NORMALIZATION_EPSILON {
                    Zip::from(&mut w).and(&f).for_each(|w, &f| *w = f / sum);
                } else {
                    w.fill(uniform);
                }
            }
        );
        (normalized, totals)
    }

    /// 反向传播：∂L/∂f_r = (g_r - Σ_k g_k·w_k) / Σ f
    ///
    /// 走均匀兜底的样本梯度为 0。
    pub fn backward(
        &self,
        ctx: ComputeContext,
        normalized: ArrayView2<'_, f64>,
        totals: ArrayView1<'_, f64>,
        upstream: ArrayView2<'_, f64>,
    ) -> Array2<f64> {
        let mut grad = Array2::zeros(upstream.raw_dim());
        zip_for_each!(
            ctx,
            Zip::from(grad.rows_mut())
                .and(normalized.rows())
                .and(&totals)
                .and(upstream.rows()),
            |mut grad_f, w, &total, g| {
                if total > NORMALIZATION_EPSILON {
                    let weighted = g.dot(&w);
                    Zip::from(&mut grad_f)
                        .and(&g)
                        .for_each(|out, &g_r| *out = (g_r - weighted) / total);
                }
            }
        );
        grad
    }
}
