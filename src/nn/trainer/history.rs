/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 训练历史：逐 epoch 的损失与指标
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一个 epoch 的训练记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 从 0 开始，跨多次 fit 连续编号
    pub epoch: usize,
    /// 按样本数加权的 batch 平均损失
    pub loss: f64,
    /// 指标名 → 值
    pub metrics: BTreeMap<String, f64>,
    pub val_loss: Option<f64>,
    pub val_metrics: Option<BTreeMap<String, f64>>,
}

/// 一次 fit 的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// 本次 fit 完整跑完的 epoch 数
    pub epochs_completed: usize,
    /// 是否因取消而提前结束
    pub cancelled: bool,
    pub final_loss: Option<f64>,
    pub final_val_loss: Option<f64>,
    /// 结束时参数存储的版本号
    pub parameter_version: u64,
}

/// 有序的训练历史
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<EpochRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// 逐 epoch 的训练损失
    pub fn losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.loss).collect()
    }

    /// 逐 epoch 的验证损失（没有验证集的 epoch 为 None）
    pub fn val_losses(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.val_loss).collect()
    }

    /// Keras 风格的历史字典：`loss`、各指标名、`val_loss`、`val_<指标名>`
    ///
    /// 每列长度都等于 epoch 数；某个 epoch 缺少验证结果时该位置为 NaN。
    /// 从未做过验证时不输出 `val_*` 列。
    pub fn to_map(&self) -> BTreeMap<String, Vec<f64>> {
        let mut map: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        map.insert("loss".to_string(), self.losses());

        let metric_names: Vec<&String> = self
            .records
            .iter()
            .flat_map(|r| r.metrics.keys())
            .collect();
        for name in metric_names {
            if map.contains_key(name) {
                continue;
            }
            let column = self
                .records
                .iter()
                .map(|r| r.metrics.get(name).copied().unwrap_or(f64::NAN))
                .collect();
            map.insert(name.clone(), column);
        }

        if self.records.iter().any(|r| r.val_loss.is_some()) {
            let column = self
                .records
                .iter()
                .map(|r| r.val_loss.unwrap_or(f64::NAN))
                .collect();
            map.insert("val_loss".to_string(), column);

            let val_names: Vec<&String> = self
                .records
                .iter()
                .filter_map(|r| r.val_metrics.as_ref())
                .flat_map(|m| m.keys())
                .collect();
            for name in val_names {
                let key = format!("val_{name}");
                if map.contains_key(&key) {
                    continue;
                }
                let column = self
                    .records
                    .iter()
                    .map(|r| {
                        r.val_metrics
                            .as_ref()
                            .and_then(|m| m.get(name).copied())
                            .unwrap_or(f64::NAN)
                    })
                    .collect();
                map.insert(key, column);
            }
        }
        map
    }
}
