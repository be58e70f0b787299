/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 规则层（第 2 层）：隶属度 → 规则激活强度（乘积 T-norm）
 *
 * 规则是各维度模糊集的笛卡尔积，共 n_memb^n_input 条，构建时一次性枚举成
 * 只读的索引表（RuleTable）。规则编号采用混合进制：第 0 维为最高位，
 * 与前向传播中逐维外积展开的顺序一致。
 */

use crate::errors::{AnfisError, Result};
use crate::nn::context::zip_for_each;
use crate::nn::ComputeContext;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};
use std::sync::Arc;

/// 规则索引表：第 r 行是第 r 条规则在每个输入维度上选中的模糊集下标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    /// [rule_count, n_input]
    indices: Array2<usize>,
    n_memb: usize,
}

impl RuleTable {
    /// 枚举全部规则
    ///
    /// 规则数超过 `max_rules`（或计算时溢出）时返回 `RuleExplosion`，
    /// 此时不会分配任何内存。
    pub fn build(n_input: usize, n_memb: usize, max_rules: usize) -> Result<Self> {
        let explosion = || AnfisError::RuleExplosion {
            n_memb,
            n_input,
            limit: max_rules,
        };
        let rule_count = u32::try_from(n_input)
            .ok()
            .and_then(|exp| n_memb.checked_pow(exp))
            .ok_or_else(explosion)?;
        if rule_count > max_rules {
            return Err(explosion());
        }

        // 混合进制计数器逐条生成
        let mut indices = Array2::zeros((rule_count, n_input));
        let mut digits = vec![0usize; n_input];
        for mut rule in indices.rows_mut() {
            rule.iter_mut().zip(&digits).for_each(|(slot, &d)| *slot = d);
            for digit in digits.iter_mut().rev() {
                *digit += 1;
                if *digit < n_memb {
                    break;
                }
                *digit = 0;
            }
        }

        Ok(Self { indices, n_memb })
    }

    pub fn rule_count(&self) -> usize {
        self.indices.nrows()
    }

    pub fn n_input(&self) -> usize {
        self.indices.ncols()
    }

    pub const fn n_memb(&self) -> usize {
        self.n_memb
    }

    /// 第 `rule` 条规则的模糊集下标
    pub fn rule(&self, rule: usize) -> Vec<usize> {
        self.indices.row(rule).to_vec()
    }

    pub fn indices(&self) -> ArrayView2<'_, usize> {
        self.indices.view()
    }
}

/// 规则层
///
/// # 输入/输出形状
/// - 输入：[batch_size, n_input, n_memb]
/// - 输出：[batch_size, rule_count]
#[derive(Debug, Clone)]
pub struct RuleLayer {
    table: Arc<RuleTable>,
}

impl RuleLayer {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn rule_count(&self) -> usize {
        self.table.rule_count()
    }

    /// 前向传播：激活强度 = 各维度所选隶属度之积
    ///
    /// 每个样本逐维做外积累乘：先放入第 0 维的 n_memb 个隶属度，
    /// 之后每一维把已有的 k 个部分积原地展开成 k·n_memb 个。
    pub fn forward(&self, ctx: ComputeContext, degrees: ArrayView3<'_, f64>) -> Array2<f64> {
        let m = self.table.n_memb();
        let mut firing = Array2::zeros((degrees.len_of(ndarray::Axis(0)), self.rule_count()));
        zip_for_each!(
            ctx,
            Zip::from(firing.rows_mut()).and(degrees.outer_iter()),
            |mut strengths, mu| {
                let mut len = m;
                for (j, &v) in mu.row(0).iter().enumerate() {
                    strengths[j] = v;
                }
                for mu_d in mu.rows().into_iter().skip(1) {
                    // 从后往前展开，尚未读取的部分积不会被覆盖
                    for i in (0..len).rev() {
                        let partial = strengths[i];
                        for j in (0..m).rev() {
                            strengths[i * m + j] = partial * mu_d[j];
                        }
                    }
                    len *= m;
                }
            }
        );
        firing
    }

    /// 反向传播：由 ∂L/∂firing [batch, rule_count] 得到 ∂L/∂μ [batch, n_input, n_memb]
    ///
    /// ∂firing_r/∂μ[d, j] 是规则 r 在其余维度上的隶属度之积（j 为规则 r 在第 d 维的选择），
    /// 用前缀积/后缀积求得，不做除法，隶属度为 0 时依然正确。
    pub fn backward(
        &self,
        ctx: ComputeContext,
        degrees: ArrayView3<'_, f64>,
        upstream: ArrayView2<'_, f64>,
    ) -> Array3<f64> {
        let table = self.table.indices();
        let n = self.table.n_input();
        let mut grad = Array3::zeros(degrees.raw_dim());
        zip_for_each!(
            ctx,
            Zip::from(grad.outer_iter_mut())
                .and(degrees.outer_iter())
                .and(upstream.rows()),
            |mut grad_mu, mu, g| {
                let mut prefix = vec![1.0; n + 1];
                let mut suffix = vec![1.0; n + 1];
                for (rule, &g_r) in table.rows().into_iter().zip(g.iter()) {
                    if g_r == 0.0 {
                        continue;
                    }
                    for d in 0..n {
                        prefix[d + 1] = prefix[d] * mu[[d, rule[d]]];
                    }
                    for d in (0..n).rev() {
                        suffix[d] = suffix[d + 1] * mu[[d, rule[d]]];
                    }
                    for d in 0..n {
                        grad_mu[[d, rule[d]]] += g_r * prefix[d] * suffix[d + 1];
                    }
                }
            }
        );
        grad
    }
}
