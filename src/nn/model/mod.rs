/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : ANFIS 模型：四层前向/反向传播、预测与训练状态
 *
 * 前向：x → 模糊化层 → 规则层 → 归一化层 → 后件层 → y
 *
 * 模型本身只持有结构（各层）和参数存储；训练循环是参数的唯一写者，
 * predict/内省随时可以并发调用，读到的总是某个完整提交的版本。
 */

mod describe;
mod introspection;
mod model_io;
mod serialization;

pub use introspection::MembershipCurves;

use crate::config::ParameterSpec;
use crate::errors::{AnfisError, Result};
use crate::nn::ComputeContext;
use crate::nn::layer::{
    ConsequentLayer, MembershipFunction, MembershipLayer, NormalizationLayer, RuleLayer, RuleTable,
};
use crate::nn::params::{AnfisGrads, AnfisParams, ParameterStore};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use parking_lot::Mutex;
use std::sync::Arc;

/// 模型所处的生命周期阶段
///
/// 构建成功即为 `Compiled`（参数已初始化，可以 predict）；
/// fit 期间为 `Training`；至少完成一个 epoch 后为 `Trained`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelStatus {
    Compiled,
    Training,
    Trained,
}

/// 一次前向传播的全部中间结果（反向传播需要）
#[derive(Debug, Clone)]
pub struct ForwardCache {
    /// [batch, n_input, n_memb]
    pub memberships: Array3<f64>,
    /// [batch, rule_count]
    pub firing: Array2<f64>,
    /// [batch, rule_count]
    pub normalized: Array2<f64>,
    /// [batch]
    pub totals: Array1<f64>,
    /// [batch, rule_count]
    pub rule_outputs: Array2<f64>,
    /// [batch]
    pub output: Array1<f64>,
}

/// 自适应神经模糊推理系统（ANFIS）
#[derive(Debug)]
pub struct Anfis {
    spec: ParameterSpec,
    context: ComputeContext,
    membership: MembershipLayer,
    rules: RuleLayer,
    normalization: NormalizationLayer,
    consequent: ConsequentLayer,
    store: Arc<ParameterStore>,
    status: Mutex<ModelStatus>,
}

impl Anfis {
    /// 构建模型：枚举规则表并初始化全部参数
    ///
    /// 规则数超过 `spec.max_rules()` 时返回 `RuleExplosion`，不分配规则表和参数。
    pub fn new(spec: &ParameterSpec, context: ComputeContext) -> Result<Self> {
        let (n_input, n_memb) = (spec.n_input(), spec.n_memb());
        let table = RuleTable::build(n_input, n_memb, spec.max_rules())?;
        let rule_count = table.rule_count();

        let membership = MembershipLayer::new(spec.memb_func(), n_input, n_memb);
        let consequent = ConsequentLayer::new(n_input, rule_count);
        let params = AnfisParams {
            premise: membership.init_params(spec),
            consequents: consequent.init_params(),
        };
        log::info!(
            "构建 ANFIS：{n_input} 个输入 × {n_memb} 个{}型模糊集，{rule_count} 条规则，{} 个可训练参数，{context:?}",
            spec.memb_func(),
            params.param_count()
        );

        Ok(Self {
            spec: spec.clone(),
            context,
            membership,
            rules: RuleLayer::new(table),
            normalization: NormalizationLayer,
            consequent,
            store: Arc::new(ParameterStore::new(params)),
            status: Mutex::new(ModelStatus::Compiled),
        })
    }

    pub const fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    pub const fn context(&self) -> ComputeContext {
        self.context
    }

    pub fn rule_count(&self) -> usize {
        self.rules.rule_count()
    }

    pub fn rule_table(&self) -> &RuleTable {
        self.rules.table()
    }

    pub const fn membership_layer(&self) -> &MembershipLayer {
        &self.membership
    }

    /// 参数存储（可在线程间共享，只读）
    pub fn store(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// 当前参数的一致快照
    pub fn snapshot(&self) -> Arc<AnfisParams> {
        self.store.snapshot()
    }

    pub fn param_count(&self) -> usize {
        self.store.snapshot().param_count()
    }

    pub fn status(&self) -> ModelStatus {
        *self.status.lock()
    }

    /// 进入训练状态；返回的守卫在 drop 时恢复原状态，除非调用了 [`TrainingGuard::finish`]
    ///
    /// 已在训练中时返回 `InvalidState`（参数只允许一个写者）。
    pub(crate) fn begin_training(&self) -> Result<TrainingGuard<'_>> {
        let mut status = self.status.lock();
        if *status == ModelStatus::Training {
            return Err(AnfisError::InvalidState(
                "模型正在训练中，不能同时开始另一次 fit".to_string(),
            ));
        }
        let previous = *status;
        *status = ModelStatus::Training;
        Ok(TrainingGuard {
            model: self,
            previous,
            finished: false,
        })
    }

    /// 发布一组新参数（须与模型结构一致且全部有限）
    ///
    /// fit 进行中返回 `InvalidState`：训练循环是参数训练期间唯一的写者。
    pub fn set_params(&self, params: AnfisParams) -> Result<()> {
        // 检查与提交期间持有状态锁，fit 无法在两者之间开始
        let status = self.status.lock();
        if *status == ModelStatus::Training {
            return Err(AnfisError::InvalidState(
                "模型正在训练中，不能从外部写入参数".to_string(),
            ));
        }
        self.check_params(&params)?;
        self.store.commit(params);
        Ok(())
    }

    pub(crate) fn check_params(&self, params: &AnfisParams) -> Result<()> {
        params.check_shapes(
            self.spec.n_input(),
            self.spec.n_memb(),
            self.rule_count(),
            self.membership.kernel().has_slope(),
        )?;
        if !params.is_finite() {
            return Err(AnfisError::persistence("参数中含有 NaN 或 Inf"));
        }
        Ok(())
    }

    /// 校验输入为 [batch, n_input]
    pub(crate) fn check_input(&self, x: &ArrayView2<'_, f64>) -> Result<()> {
        if x.ncols() != self.spec.n_input() {
            return Err(AnfisError::shape(
                &[x.nrows(), self.spec.n_input()],
                x.shape(),
                "输入特征维度与 n_input 不一致",
            ));
        }
        Ok(())
    }

    // ========== 前向/反向传播 ==========

    /// 在给定参数上做完整前向传播并保留中间结果
    pub fn forward_cached(&self, params: &AnfisParams, x: ArrayView2<'_, f64>) -> ForwardCache {
        let ctx = self.context;
        let memberships = self.membership.forward(ctx, &params.premise, x);
        let firing = self.rules.forward(ctx, memberships.view());
        let (normalized, totals) = self.normalization.forward(ctx, firing.view());
        let (output, rule_outputs) =
            self.consequent
                .forward(ctx, params.consequents.view(), x, normalized.view());
        ForwardCache {
            memberships,
            firing,
            normalized,
            totals,
            rule_outputs,
            output,
        }
    }

    /// 由 ∂L/∂y [batch] 反向传播得到全部参数的梯度
    pub fn backward(
        &self,
        params: &AnfisParams,
        x: ArrayView2<'_, f64>,
        cache: &ForwardCache,
        grad_output: ArrayView1<'_, f64>,
    ) -> AnfisGrads {
        let ctx = self.context;
        let (consequents, grad_normalized) = self.consequent.backward(
            ctx,
            x,
            cache.normalized.view(),
            cache.rule_outputs.view(),
            grad_output,
        );
        let grad_firing = self.normalization.backward(
            ctx,
            cache.normalized.view(),
            cache.totals.view(),
            grad_normalized.view(),
        );
        let grad_memberships =
            self.rules
                .backward(ctx, cache.memberships.view(), grad_firing.view());
        let (centers, widths, slopes) = self.membership.backward(
            ctx,
            &params.premise,
            x,
            grad_memberships.view(),
        );
        AnfisGrads {
            centers,
            widths,
            slopes,
            consequents,
        }
    }

    // ========== 预测 ==========

    /// 批量预测：[batch, n_input] → [batch]
    ///
    /// 只读当前参数快照，可与训练并发调用。
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        self.check_input(&x)?;
        let params = self.store.snapshot();
        Ok(self.forward_cached(&params, x).output)
    }

    /// 单样本预测
    pub fn predict_one(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.spec.n_input() {
            return Err(AnfisError::shape(
                &[self.spec.n_input()],
                &[x.len()],
                "输入特征维度与 n_input 不一致",
            ));
        }
        let x = ArrayView1::from(x).insert_axis(Axis(0));
        self.predict(x).map(|y| y[0])
    }
}

/// fit 期间持有的状态守卫
pub(crate) struct TrainingGuard<'m> {
    model: &'m Anfis,
    previous: ModelStatus,
    finished: bool,
}

impl TrainingGuard<'_> {
    /// 训练正常结束（至少完成一个 epoch）：状态置为 `Trained`
    pub(crate) fn finish(mut self) {
        *self.model.status.lock() = ModelStatus::Trained;
        self.finished = true;
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.model.status.lock() = self.previous;
        }
    }
}
