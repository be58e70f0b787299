/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 配置中以字符串标识的封闭选项集合
 */

use crate::errors::{AnfisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 隶属度函数族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipFamily {
    /// 高斯型：exp(-(x-c)² / (2σ²))
    Gaussian,
    /// 广义钟型：1 / (1 + |(x-c)/a|^(2b))
    Bell,
}

impl MembershipFamily {
    const NAMES: &'static [&'static str] = &["gaussian", "bell"];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Bell => "bell",
        }
    }
}

impl FromStr for MembershipFamily {
    type Err = AnfisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gaussian" | "gauss" => Ok(Self::Gaussian),
            "bell" | "gbell" => Ok(Self::Bell),
            other => Err(AnfisError::UnknownIdentifier {
                field: "memb_func",
                value: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// 优化器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

impl OptimizerKind {
    const NAMES: &'static [&'static str] = &["sgd", "adam"];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sgd => "sgd",
            Self::Adam => "adam",
        }
    }

    /// 未显式指定学习率时的默认值
    pub const fn default_learning_rate(&self) -> f64 {
        match self {
            Self::Sgd => 0.01,
            Self::Adam => 0.001,
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = AnfisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sgd" => Ok(Self::Sgd),
            "adam" => Ok(Self::Adam),
            other => Err(AnfisError::UnknownIdentifier {
                field: "optimizer",
                value: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// 损失函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossKind {
    Mse,
    Mae,
    Huber,
}

impl LossKind {
    const NAMES: &'static [&'static str] = &["mse", "mae", "huber_loss"];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mse => "mse",
            Self::Mae => "mae",
            Self::Huber => "huber_loss",
        }
    }
}

impl FromStr for LossKind {
    type Err = AnfisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mse" | "mean_squared_error" => Ok(Self::Mse),
            "mae" | "mean_absolute_error" => Ok(Self::Mae),
            "huber_loss" | "huber" => Ok(Self::Huber),
            other => Err(AnfisError::UnknownIdentifier {
                field: "loss",
                value: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// 每个 epoch 额外记录的评估指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    Mse,
    Mae,
}

impl MetricKind {
    const NAMES: &'static [&'static str] = &["mse", "mae"];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mse => "mse",
            Self::Mae => "mae",
        }
    }
}

impl FromStr for MetricKind {
    type Err = AnfisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mse" | "mean_squared_error" => Ok(Self::Mse),
            "mae" | "mean_absolute_error" => Ok(Self::Mae),
            other => Err(AnfisError::UnknownIdentifier {
                field: "metrics",
                value: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

macro_rules! impl_display_by_name {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

impl_display_by_name!(MembershipFamily, OptimizerKind, LossKind, MetricKind);
