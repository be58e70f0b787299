/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 训练循环：mini-batch 梯度下降、验证、历史、观察者与取消
 *
 * 每个 batch：
 * 1. 取参数快照，前向传播并保留中间结果
 * 2. 计算损失与 ∂L/∂y，逐层反向传播得到全部参数的梯度
 * 3. 检查损失与梯度是否有限
 * 4. 在私有副本上做优化器更新 + 宽度/斜率投影，再检查一次
 * 5. 原子提交到参数存储
 *
 * 任何一步失败都回滚优化器状态，参数存储停留在上一次提交的版本。
 */

mod cancel;
mod history;
mod observer;

pub use cancel::CancellationToken;
pub use history::{EpochRecord, FitReport, History};
pub use observer::{ChannelObserver, FnObserver, LogObserver, TrainingEvent, TrainingObserver};

use crate::config::{MetricKind, ParameterSpec};
use crate::data::{DataLoader, TensorDataset};
use crate::errors::{AnfisError, Result};
use crate::nn::criterion::{Loss, LossFunction};
use crate::nn::model::Anfis;
use crate::nn::optimizer::{AnyOptimizer, Optimizer};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单次 fit 的运行参数（默认取自配置）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    /// 第 e 个 epoch 用 `seed + e` 打乱
    pub seed: u64,
}

impl FitOptions {
    pub fn from_spec(spec: &ParameterSpec) -> Self {
        Self {
            epochs: spec.n_epochs(),
            batch_size: spec.batch_size(),
            shuffle: spec.shuffle(),
            seed: spec.seed(),
        }
    }

    pub const fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub const fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// 在某个数据集上的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub loss: f64,
    pub metrics: BTreeMap<String, f64>,
}

/// 单个 batch 的训练结果（指标基于更新前的预测）
struct BatchOutcome {
    loss: f64,
    metrics: Vec<f64>,
}

/// 训练器：持有优化器、损失函数、指标、历史和观察者
///
/// 不绑定具体模型：换一个结构不同的模型继续 fit 时，优化器的累积状态会被重置，
/// 宽度下限总是取自被训练模型的配置。
///
/// ```ignore
/// let model = Anfis::new(&spec, ComputeContext::Cpu)?;
/// let mut trainer = Trainer::new(&spec);
/// trainer.add_observer(LogObserver);
/// let options = FitOptions::from_spec(&spec);
/// let report = trainer.fit(&model, &train, Some(&val), &options, &CancellationToken::new())?;
/// println!("{:?}", trainer.history().to_map());
/// ```
pub struct Trainer {
    optimizer: AnyOptimizer,
    loss: LossFunction,
    metrics: Vec<MetricKind>,
    history: History,
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("optimizer", &self.optimizer)
            .field("loss", &self.loss)
            .field("metrics", &self.metrics)
            .field("epochs_recorded", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Trainer {
    /// 按配置选定优化器、损失函数和指标
    pub fn new(spec: &ParameterSpec) -> Self {
        Self {
            optimizer: AnyOptimizer::from_spec(spec),
            loss: LossFunction::from(spec.loss()),
            metrics: spec.metrics().to_vec(),
            history: History::new(),
            observers: Vec::new(),
        }
    }

    /// 替换优化器（例如使用带动量的 SGD）
    pub fn with_optimizer(mut self, optimizer: impl Into<AnyOptimizer>) -> Self {
        self.optimizer = optimizer.into();
        self
    }

    pub fn add_observer(&mut self, observer: impl TrainingObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub const fn optimizer(&self) -> &AnyOptimizer {
        &self.optimizer
    }

    pub const fn optimizer_mut(&mut self) -> &mut AnyOptimizer {
        &mut self.optimizer
    }

    pub const fn loss_function(&self) -> &LossFunction {
        &self.loss
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    /// 训练模型
    ///
    /// - 数据维度不符：`ShapeMismatch`，不做任何计算
    /// - 模型已在另一处训练：`InvalidState`
    /// - 出现 NaN/Inf：`Divergence`，参数停留在最后一次有效提交
    /// - 被取消：返回 `Ok`，`report.cancelled == true`，未完成的 epoch 不计入历史
    pub fn fit(
        &mut self,
        model: &Anfis,
        train: &TensorDataset,
        validation: Option<&TensorDataset>,
        options: &FitOptions,
        cancel: &CancellationToken,
    ) -> Result<FitReport> {
        check_dataset(model, train, "训练集")?;
        if train.is_empty() {
            return Err(AnfisError::Configuration("训练集为空".to_string()));
        }
        if let Some(validation) = validation {
            check_dataset(model, validation, "验证集")?;
        }
        if options.batch_size < 1 {
            return Err(AnfisError::Configuration(
                "batch_size 须至少为 1".to_string(),
            ));
        }

        let guard = model.begin_training()?;
        let start_epoch = self.history.len();
        let mut completed = 0;
        let mut cancelled = false;
        log::info!(
            "开始训练：{} 个样本，{} 个 epoch，batch_size={}",
            train.len(),
            options.epochs,
            options.batch_size
        );

        'epochs: for e in 0..options.epochs {
            let epoch = start_epoch + e;
            let loader = DataLoader::new(train, options.batch_size)
                .shuffle(options.shuffle)
                .seed(options.seed.wrapping_add(e as u64));

            let mut loss_sum = 0.0;
            let mut metric_sums = vec![0.0; self.metrics.len()];
            let mut seen = 0usize;
            for (batch, (x, y)) in loader.iter().enumerate() {
                if cancel.is_cancelled() {
                    log::warn!("训练在 epoch {epoch} / batch {batch} 之前被取消");
                    cancelled = true;
                    break 'epochs;
                }
                let outcome = match self.train_batch(model, x.view(), y.view(), epoch, batch) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        log::warn!("{err}");
                        if completed > 0 {
                            guard.finish();
                        }
                        return Err(err);
                    }
                };
                let n = y.len() as f64;
                loss_sum += outcome.loss * n;
                metric_sums
                    .iter_mut()
                    .zip(&outcome.metrics)
                    .for_each(|(sum, m)| *sum += m * n);
                seen += y.len();
            }

            let n = seen.max(1) as f64;
            let metrics = self
                .metrics
                .iter()
                .zip(&metric_sums)
                .map(|(kind, sum)| (kind.name().to_string(), sum / n))
                .collect();
            let (val_loss, val_metrics) = match validation {
                Some(v) => {
                    let eval = self.evaluate(model, v)?;
                    (Some(eval.loss), Some(eval.metrics))
                }
                None => (None, None),
            };
            let record = EpochRecord {
                epoch,
                loss: loss_sum / n,
                metrics,
                val_loss,
                val_metrics,
            };
            log::info!(
                "epoch {}/{}：loss={:.6}{}",
                e + 1,
                options.epochs,
                record.loss,
                record
                    .val_loss
                    .map_or_else(String::new, |v| format!(" val_loss={v:.6}"))
            );
            for observer in &mut self.observers {
                observer.on_epoch_end(&record);
            }
            self.history.push(record);
            completed += 1;
        }

        let last = (completed > 0).then(|| self.history.last()).flatten();
        let report = FitReport {
            epochs_completed: completed,
            cancelled,
            final_loss: last.map(|r| r.loss),
            final_val_loss: last.and_then(|r| r.val_loss),
            parameter_version: model.store().version(),
        };
        if completed > 0 {
            guard.finish();
        }
        for observer in &mut self.observers {
            observer.on_train_end(&report);
        }
        Ok(report)
    }

    /// 在数据集上计算损失和指标，不更新参数
    pub fn evaluate(&self, model: &Anfis, dataset: &TensorDataset) -> Result<Evaluation> {
        check_dataset(model, dataset, "评估集")?;
        let prediction = model.predict(dataset.features())?;
        let targets = dataset.targets();
        let loss = self.loss.forward(prediction.view(), targets);
        let metrics = self
            .metrics
            .iter()
            .map(|kind| {
                (
                    kind.name().to_string(),
                    kind.evaluate(prediction.view(), targets),
                )
            })
            .collect();
        Ok(Evaluation { loss, metrics })
    }

    fn train_batch(
        &mut self,
        model: &Anfis,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        epoch: usize,
        batch: usize,
    ) -> Result<BatchOutcome> {
        let diverged = |reason: &str| AnfisError::Divergence {
            epoch,
            batch,
            reason: reason.to_string(),
        };

        let params = model.snapshot();
        let cache = model.forward_cached(&params, x);
        let loss = self.loss.forward(cache.output.view(), y);
        if !loss.is_finite() {
            return Err(diverged("非有限的损失值"));
        }
        let grad_output = self.loss.backward(cache.output.view(), y);
        let grads = model.backward(&params, x, &cache, grad_output.view());
        if !grads.is_finite() {
            return Err(diverged("非有限的梯度"));
        }
        let metrics = self
            .metrics
            .iter()
            .map(|kind| kind.evaluate(cache.output.view(), y))
            .collect();

        // 在私有副本上更新，失败时整体回滚
        let mut next = (*params).clone();
        let checkpoint = self.optimizer.clone();
        let min_width = model.spec().min_width();
        let updated = self.optimizer.step(&mut next, &grads).and_then(|()| {
            next.project(min_width);
            if next.is_finite() {
                Ok(())
            } else {
                Err(diverged("更新后参数出现非有限值"))
            }
        });
        if let Err(err) = updated {
            self.optimizer = checkpoint;
            return Err(err);
        }
        model.store().commit(next);
        log::debug!("epoch {epoch} / batch {batch}：loss={loss:.6}");

        Ok(BatchOutcome { loss, metrics })
    }
}

fn check_dataset(model: &Anfis, dataset: &TensorDataset, what: &str) -> Result<()> {
    let n_input = model.spec().n_input();
    if dataset.n_features() != n_input {
        return Err(AnfisError::shape(
            &[dataset.len(), n_input],
            dataset.features().shape(),
            format!("{what}的特征维度与 n_input 不一致"),
        ));
    }
    Ok(())
}
