/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : 只读内省：隶属度张量、规则权重、隶属度曲线
 *
 * 供外部可视化使用，全部基于当前参数快照计算，不修改任何状态。
 */

use super::Anfis;
use crate::errors::{AnfisError, Result};
use crate::nn::params::MembershipParams;
use ndarray::{Array1, Array2, Array3, ArrayView2};
use serde::{Deserialize, Serialize};

/// 在一段输入区间上采样得到的隶属度曲线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipCurves {
    /// 采样点 [resolution]
    pub xs: Array1<f64>,
    /// [n_input, n_memb, resolution]
    pub degrees: Array3<f64>,
}

impl Anfis {
    /// 每个样本在每个 (维度, 模糊集) 上的隶属度：[batch, n_input, n_memb]
    pub fn get_memberships(&self, x: ArrayView2<'_, f64>) -> Result<Array3<f64>> {
        self.check_input(&x)?;
        let params = self.snapshot();
        Ok(self.membership.forward(self.context, &params.premise, x))
    }

    /// 归一化后的规则权重：[batch, rule_count]
    pub fn firing_strengths(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_input(&x)?;
        let params = self.snapshot();
        Ok(self.forward_cached(&params, x).normalized)
    }

    /// 在配置的 `input_range` 上采样各隶属度曲线
    pub fn membership_curves(&self, resolution: usize) -> Result<MembershipCurves> {
        let (low, high) = self.spec.input_range();
        self.membership_curves_in(low, high, resolution)
    }

    /// 在 [low, high] 上均匀取 `resolution` 个点采样各隶属度曲线
    ///
    /// 每个输入维度都用同一组采样点，曲线之间可以直接对比。
    pub fn membership_curves_in(
        &self,
        low: f64,
        high: f64,
        resolution: usize,
    ) -> Result<MembershipCurves> {
        if resolution < 2 {
            return Err(AnfisError::Configuration(format!(
                "曲线采样点数至少为 2，实际为 {resolution}"
            )));
        }
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(AnfisError::Configuration(format!(
                "采样区间须为有限值且下界小于上界，实际为({low}, {high})"
            )));
        }

        let xs = Array1::linspace(low, high, resolution);
        // 每个采样点复制到所有输入维度上：[resolution, n_input]
        let grid = Array2::from_shape_fn((resolution, self.spec.n_input()), |(i, _)| xs[i]);

        let params = self.snapshot();
        // [resolution, n_input, n_memb] → [n_input, n_memb, resolution]
        let degrees = self
            .membership
            .forward(self.context, &params.premise, grid.view())
            .permuted_axes([1, 2, 0])
            .as_standard_layout()
            .into_owned();
        Ok(MembershipCurves { xs, degrees })
    }

    /// 当前隶属度函数参数的拷贝
    pub fn membership_params(&self) -> MembershipParams {
        self.snapshot().premise.clone()
    }

    /// 当前后件系数的拷贝：[rule_count, n_input + 1]
    pub fn consequent_params(&self) -> Array2<f64> {
        self.snapshot().consequents.clone()
    }
}
