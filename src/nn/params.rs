/*
 * @Author       : 老董
 * @Date         : 2026-02-04
 * @Description  : 可学习参数、梯度与参数存储
 *
 * 参数分两组：
 * - 前件参数（premise）：每个 (输入维度, 模糊集) 上的中心、宽度、斜率（仅钟型）
 * - 后件参数（consequent）：每条规则一行 [w_1, ..., w_n, bias]
 *
 * ParameterStore 只有一个写者（训练循环），读者（predict、内省）总是拿到
 * 一份完整的快照，永远看不到更新到一半的参数。
 */

use crate::errors::{AnfisError, Result};
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 钟型隶属度函数斜率的下限
pub const MIN_SLOPE: f64 = 0.5;

/// 参数分组（优化器按组维护状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamGroup {
    Centers,
    Widths,
    Slopes,
    Consequents,
}

impl ParamGroup {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Centers => "centers",
            Self::Widths => "widths",
            Self::Slopes => "slopes",
            Self::Consequents => "consequents",
        }
    }
}

/// 隶属度函数参数，各矩阵形状均为 [n_input, n_memb]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipParams {
    pub centers: Array2<f64>,
    pub widths: Array2<f64>,
    /// 仅钟型隶属度函数有斜率
    pub slopes: Option<Array2<f64>>,
}

impl MembershipParams {
    /// 第 `dim` 维第 `set` 个模糊集的斜率（高斯型恒为 1）
    #[inline]
    pub fn slope(&self, dim: usize, set: usize) -> f64 {
        self.slopes.as_ref().map_or(1.0, |s| s[[dim, set]])
    }

    pub fn n_input(&self) -> usize {
        self.centers.nrows()
    }

    pub fn n_memb(&self) -> usize {
        self.centers.ncols()
    }
}

/// 模型的全部可学习参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnfisParams {
    pub premise: MembershipParams,
    /// [rule_count, n_input + 1]，最后一列为偏置
    pub consequents: Array2<f64>,
}

impl AnfisParams {
    /// 可训练参数总数
    pub fn param_count(&self) -> usize {
        let premise = &self.premise;
        premise.centers.len()
            + premise.widths.len()
            + premise.slopes.as_ref().map_or(0, |s| s.len())
            + self.consequents.len()
    }

    /// 所有参数是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.groups().iter().all(|(_, a)| a.iter().all(|v| v.is_finite()))
    }

    /// 按组列出参数的只读视图
    pub fn groups(&self) -> Vec<(ParamGroup, ArrayView2<'_, f64>)> {
        let mut groups = vec![
            (ParamGroup::Centers, self.premise.centers.view()),
            (ParamGroup::Widths, self.premise.widths.view()),
        ];
        if let Some(slopes) = &self.premise.slopes {
            groups.push((ParamGroup::Slopes, slopes.view()));
        }
        groups.push((ParamGroup::Consequents, self.consequents.view()));
        groups
    }

    /// 按组列出参数的可变视图（供优化器原地更新）
    pub fn groups_mut(&mut self) -> Vec<(ParamGroup, ArrayViewMut2<'_, f64>)> {
        let premise = &mut self.premise;
        let mut groups = vec![
            (ParamGroup::Centers, premise.centers.view_mut()),
            (ParamGroup::Widths, premise.widths.view_mut()),
        ];
        if let Some(slopes) = premise.slopes.as_mut() {
            groups.push((ParamGroup::Slopes, slopes.view_mut()));
        }
        groups.push((ParamGroup::Consequents, self.consequents.view_mut()));
        groups
    }

    /// 把宽度和斜率投影回合法区域（宽度不低于 `min_width`）
    pub fn project(&mut self, min_width: f64) {
        self.premise
            .widths
            .mapv_inplace(|w| if w.abs() < min_width { min_width } else { w.abs() });
        if let Some(slopes) = self.premise.slopes.as_mut() {
            slopes.mapv_inplace(|s| s.max(MIN_SLOPE));
        }
    }

    /// 校验参数形状与模型结构一致
    pub(crate) fn check_shapes(
        &self,
        n_input: usize,
        n_memb: usize,
        rule_count: usize,
        has_slopes: bool,
    ) -> Result<()> {
        let premise_shape = [n_input, n_memb];
        let premise = &self.premise;
        for (name, array) in [("centers", &premise.centers), ("widths", &premise.widths)] {
            if array.shape() != premise_shape {
                return Err(AnfisError::shape(&premise_shape, array.shape(), name));
            }
        }
        match (&premise.slopes, has_slopes) {
            (Some(slopes), true) if slopes.shape() != premise_shape => {
                return Err(AnfisError::shape(&premise_shape, slopes.shape(), "slopes"));
            }
            (None, true) => {
                return Err(AnfisError::shape(&premise_shape, &[], "钟型隶属度函数缺少 slopes"));
            }
            (Some(slopes), false) => {
                return Err(AnfisError::shape(&[], slopes.shape(), "高斯型隶属度函数不应有 slopes"));
            }
            _ => {}
        }
        let consequent_shape = [rule_count, n_input + 1];
        if self.consequents.shape() != consequent_shape {
            return Err(AnfisError::shape(
                &consequent_shape,
                self.consequents.shape(),
                "consequents",
            ));
        }
        Ok(())
    }
}

/// 与 [`AnfisParams`] 同构的梯度
#[derive(Debug, Clone, PartialEq)]
pub struct AnfisGrads {
    pub centers: Array2<f64>,
    pub widths: Array2<f64>,
    pub slopes: Option<Array2<f64>>,
    pub consequents: Array2<f64>,
}

impl AnfisGrads {
    /// 取某一组的梯度
    pub fn group(&self, group: ParamGroup) -> Option<ArrayView2<'_, f64>> {
        match group {
            ParamGroup::Centers => Some(self.centers.view()),
            ParamGroup::Widths => Some(self.widths.view()),
            ParamGroup::Slopes => self.slopes.as_ref().map(|s| s.view()),
            ParamGroup::Consequents => Some(self.consequents.view()),
        }
    }

    pub fn is_finite(&self) -> bool {
        let slopes_finite = self
            .slopes
            .as_ref()
            .is_none_or(|s| s.iter().all(|v| v.is_finite()));
        slopes_finite
            && [&self.centers, &self.widths, &self.consequents]
                .iter()
                .all(|a| a.iter().all(|v| v.is_finite()))
    }
}

/// 参数存储：一个写者，多个读者
///
/// 写者在私有副本上完成整次更新后调用 [`ParameterStore::commit`] 原子替换；
/// 读者通过 [`ParameterStore::snapshot`] 拿到当前版本的共享引用。
#[derive(Debug)]
pub struct ParameterStore {
    current: RwLock<Arc<AnfisParams>>,
    version: AtomicU64,
}

impl ParameterStore {
    pub fn new(params: AnfisParams) -> Self {
        Self {
            current: RwLock::new(Arc::new(params)),
            version: AtomicU64::new(0),
        }
    }

    /// 当前参数的一致快照
    pub fn snapshot(&self) -> Arc<AnfisParams> {
        Arc::clone(&self.current.read())
    }

    /// 发布新的参数版本
    pub(crate) fn commit(&self, params: AnfisParams) {
        *self.current.write() = Arc::new(params);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// 已提交的版本号（每次 commit 加一）
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
