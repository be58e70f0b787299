/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 后件层（第 4 层）：Takagi-Sugeno 一阶去模糊化 + 求和输出
 */

use crate::nn::context::zip_for_each;
use crate::nn::ComputeContext;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip, s};

/// 后件层
///
/// 每条规则一个仿射函数 `r_k(x) = W_k · x + b_k`，
/// 输出为 `y = Σ_k w_k · r_k(x)`（w 为归一化后的规则权重）。
///
/// # 输入/输出形状
/// - 输入：x [batch_size, n_input]，w [batch_size, rule_count]
/// - 输出：y [batch_size]，以及每条规则的输出 [batch_size, rule_count]
///
/// 后件系数 [rule_count, n_input + 1]，最后一列为偏置。
#[derive(Debug, Clone)]
pub struct ConsequentLayer {
    n_input: usize,
    rule_count: usize,
}

impl ConsequentLayer {
    pub const fn new(n_input: usize, rule_count: usize) -> Self {
        Self {
            n_input,
            rule_count,
        }
    }

    /// 可学习参数个数
    pub const fn param_count(&self) -> usize {
        self.rule_count * (self.n_input + 1)
    }

    /// 后件系数初始化为 0
    pub fn init_params(&self) -> Array2<f64> {
        Array2::zeros((self.rule_count, self.n_input + 1))
    }

    pub fn forward(
        &self,
        ctx: ComputeContext,
        coefficients: ArrayView2<'_, f64>,
        x: ArrayView2<'_, f64>,
        normalized: ArrayView2<'_, f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let weights = coefficients.slice(s![.., ..self.n_input]);
        let bias = coefficients.column(self.n_input);
        let mut output = Array1::zeros(x.nrows());
        let mut rule_outputs = Array2::zeros((x.nrows(), self.rule_count));
        zip_for_each!(
            ctx,
            Zip::from(&mut output)
                .and(rule_outputs.rows_mut())
                .and(x.rows())
                .and(normalized.rows()),
            |y, mut r, x, w| {
                Zip::from(&mut r)
                    .and(weights.rows())
                    .and(&bias)
                    .for_each(|r_k, w_k, &b_k| *r_k = w_k.dot(&x) + b_k);
                *y = w.dot(&r);
            }
        );
        (output, rule_outputs)
    }

    /// 反向传播
    ///
    /// 返回 (∂L/∂coefficients [rule_count, n_input + 1], ∂L/∂w [batch_size, rule_count])：
    /// - ∂L/∂W_k = Σ_b g_b·w_bk·x_b，∂L/∂b_k = Σ_b g_b·w_bk
    /// - ∂L/∂w_bk = g_b·r_k(x_b)
    pub fn backward(
        &self,
        ctx: ComputeContext,
        x: ArrayView2<'_, f64>,
        normalized: ArrayView2<'_, f64>,
        rule_outputs: ArrayView2<'_, f64>,
        upstream: ArrayView1<'_, f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let g = upstream.insert_axis(Axis(1));
        let weighted = &normalized * &g;

        let mut grad_coefficients = Array2::zeros((self.rule_count, self.n_input + 1));
        grad_coefficients
            .slice_mut(s![.., ..self.n_input])
            .assign(&weighted.t().dot(&x));
        grad_coefficients
            .column_mut(self.n_input)
            .assign(&weighted.sum_axis(Axis(0)));

        let mut grad_normalized = Array2::zeros(rule_outputs.raw_dim());
        zip_for_each!(
            ctx,
            Zip::from(grad_normalized.rows_mut())
                .and(rule_outputs.rows())
                .and(&upstream),
            |mut grad_w, r, &g_b| {
                Zip::from(&mut grad_w)
                    .and(&r)
                    .for_each(|out, &r_k| *out = g_b * r_k);
            }
        );
        (grad_coefficients, grad_normalized)
    }
}
