/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 原始配置记录与校验后的不可变配置
 */

use super::kinds::{LossKind, MembershipFamily, MetricKind, OptimizerKind};
use crate::errors::{AnfisError, ComparisonOperator, Result};
use serde::{Deserialize, Serialize};

/// 原始配置记录
///
/// 字段与训练脚本中的 `fis_parameters` 一一对应，另加若干可选项。
/// 所有字符串标识在 [`FisParameters::validate`] 时才解析，
/// 因此可以直接由外部的配置加载方（JSON 文件等）填充。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FisParameters {
    /// 输入维度（回归变量个数）
    pub n_input: usize,
    /// 每个输入维度上的模糊集个数
    pub n_memb: usize,
    pub batch_size: usize,
    /// "gaussian" / "bell"
    pub memb_func: String,
    /// "sgd" / "adam"
    pub optimizer: String,
    /// "mse" / "mae" / "huber_loss"
    pub loss: String,
    pub n_epochs: usize,
    /// 为空时使用优化器的默认学习率
    pub learning_rate: Option<f64>,
    pub metrics: Vec<String>,
    /// 规则数上限，n_memb^n_input 超过它时拒绝构建模型
    pub max_rules: usize,
    /// 初始化隶属度中心时假定的输入范围
    pub input_range: (f64, f64),
    /// 打乱 mini-batch 用的随机种子
    pub seed: u64,
    pub shuffle: bool,
    /// 宽度下限，防止梯度奇异
    pub min_width: f64,
}

impl Default for FisParameters {
    fn default() -> Self {
        Self {
            n_input: 3,
            n_memb: 3,
            batch_size: 16,
            memb_func: "gaussian".to_string(),
            optimizer: "adam".to_string(),
            loss: "huber_loss".to_string(),
            n_epochs: 30,
            learning_rate: None,
            metrics: vec!["mse".to_string()],
            max_rules: ParameterSpec::DEFAULT_MAX_RULES,
            input_range: (-3.0, 3.0),
            seed: 1,
            shuffle: true,
            min_width: 1e-3,
        }
    }
}

impl FisParameters {
    /// 以默认值创建配置，仅指定输入维度和模糊集个数
    pub fn new(n_input: usize, n_memb: usize) -> Self {
        Self {
            n_input,
            n_memb,
            ..Self::default()
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn memb_func(mut self, memb_func: &str) -> Self {
        self.memb_func = memb_func.to_string();
        self
    }

    pub fn optimizer(mut self, optimizer: &str) -> Self {
        self.optimizer = optimizer.to_string();
        self
    }

    pub fn loss(mut self, loss: &str) -> Self {
        self.loss = loss.to_string();
        self
    }

    pub fn n_epochs(mut self, n_epochs: usize) -> Self {
        self.n_epochs = n_epochs;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = Some(learning_rate);
        self
    }

    pub fn metrics(mut self, metrics: &[&str]) -> Self {
        self.metrics = metrics.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn max_rules(mut self, max_rules: usize) -> Self {
        self.max_rules = max_rules;
        self
    }

    pub fn input_range(mut self, low: f64, high: f64) -> Self {
        self.input_range = (low, high);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self
    }

    /// 从 JSON 字符串解析（缺省字段取默认值）
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AnfisError::Configuration(format!("解析配置 JSON 失败: {e}")))
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnfisError::Configuration(format!("序列化配置失败: {e}")))
    }

    /// 校验并生成不可变的 [`ParameterSpec`]
    pub fn validate(self) -> Result<ParameterSpec> {
        ParameterSpec::try_from(self)
    }
}

/// 校验后的不可变配置
///
/// 只能通过 [`FisParameters::validate`]（或 `TryFrom`）得到，之后不再改变。
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    n_input: usize,
    n_memb: usize,
    batch_size: usize,
    memb_func: MembershipFamily,
    optimizer: OptimizerKind,
    loss: LossKind,
    n_epochs: usize,
    learning_rate: f64,
    metrics: Vec<MetricKind>,
    max_rules: usize,
    input_range: (f64, f64),
    seed: u64,
    shuffle: bool,
    min_width: f64,
}

impl TryFrom<FisParameters> for ParameterSpec {
    type Error = AnfisError;

    fn try_from(raw: FisParameters) -> Result<Self> {
        at_least_one("n_input", raw.n_input)?;
        at_least_one("n_memb", raw.n_memb)?;
        at_least_one("batch_size", raw.batch_size)?;
        at_least_one("max_rules", raw.max_rules)?;

        let memb_func: MembershipFamily = raw.memb_func.parse()?;
        let optimizer: OptimizerKind = raw.optimizer.parse()?;
        let loss: LossKind = raw.loss.parse()?;
        let mut metrics = raw
            .metrics
            .iter()
            .map(|m| m.parse::<MetricKind>())
            .collect::<Result<Vec<_>>>()?;
        metrics.sort();
        metrics.dedup();

        let learning_rate = raw
            .learning_rate
            .unwrap_or_else(|| optimizer.default_learning_rate());
        positive_finite("learning_rate", learning_rate)?;
        positive_finite("min_width", raw.min_width)?;

        let (low, high) = raw.input_range;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(AnfisError::Configuration(format!(
                "input_range 须为有限值且下界小于上界，实际为({low}, {high})"
            )));
        }

        Ok(Self {
            n_input: raw.n_input,
            n_memb: raw.n_memb,
            batch_size: raw.batch_size,
            memb_func,
            optimizer,
            loss,
            n_epochs: raw.n_epochs,
            learning_rate,
            metrics,
            max_rules: raw.max_rules,
            input_range: (low, high),
            seed: raw.seed,
            shuffle: raw.shuffle,
            min_width: raw.min_width,
        })
    }
}

fn at_least_one(value_name: &str, value: usize) -> Result<()> {
    if value < 1 {
        return Err(AnfisError::ValueMustSatisfyComparison {
            value_name: value_name.to_string(),
            operator: ComparisonOperator::GreaterOrEqual,
            threshold: 1.0,
            actual: value as f64,
        });
    }
    Ok(())
}

fn positive_finite(value_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnfisError::ValueMustSatisfyComparison {
            value_name: value_name.to_string(),
            operator: ComparisonOperator::GreaterThan,
            threshold: 0.0,
            actual: value,
        });
    }
    Ok(())
}

impl ParameterSpec {
    /// 默认规则数上限
    pub const DEFAULT_MAX_RULES: usize = 4096;

    pub const fn n_input(&self) -> usize {
        self.n_input
    }

    pub const fn n_memb(&self) -> usize {
        self.n_memb
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub const fn memb_func(&self) -> MembershipFamily {
        self.memb_func
    }

    pub const fn optimizer(&self) -> OptimizerKind {
        self.optimizer
    }

    pub const fn loss(&self) -> LossKind {
        self.loss
    }

    pub const fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    pub const fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn metrics(&self) -> &[MetricKind] {
        &self.metrics
    }

    pub const fn max_rules(&self) -> usize {
        self.max_rules
    }

    pub const fn input_range(&self) -> (f64, f64) {
        self.input_range
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub const fn min_width(&self) -> f64 {
        self.min_width
    }

    /// 规则数 n_memb^n_input；溢出时返回 None
    pub fn rule_count(&self) -> Option<usize> {
        u32::try_from(self.n_input)
            .ok()
            .and_then(|exp| self.n_memb.checked_pow(exp))
    }

    /// 还原为原始配置记录（用于保存模型）
    pub fn to_parameters(&self) -> FisParameters {
        FisParameters {
            n_input: self.n_input,
            n_memb: self.n_memb,
            batch_size: self.batch_size,
            memb_func: self.memb_func.name().to_string(),
            optimizer: self.optimizer.name().to_string(),
            loss: self.loss.name().to_string(),
            n_epochs: self.n_epochs,
            learning_rate: Some(self.learning_rate),
            metrics: self.metrics.iter().map(|m| m.name().to_string()).collect(),
            max_rules: self.max_rules,
            input_range: self.input_range,
            seed: self.seed,
            shuffle: self.shuffle,
            min_width: self.min_width,
        }
    }
}
