/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 统一错误类型：配置、形状、规则爆炸、发散、持久化
 */

use thiserror::Error;
mod comparison;
pub use self::comparison::*;

pub type Result<T> = std::result::Result<T, AnfisError>;

/// 错误的分类标签（供调用方按类别处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Shape,
    RuleExplosion,
    Divergence,
    Persistence,
    InvalidState,
}

#[derive(Error, Debug)]
pub enum AnfisError {
    // 配置校验
    #[error("配置无效：{0}")]
    Configuration(String),
    #[error("配置无效：{value_name}须{operator}{threshold}，实际为{actual}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: f64,
        actual: f64,
    },
    #[error("配置无效：未知的{field}标识`{value}`，可选值为{expected:?}")]
    UnknownIdentifier {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    // 输入形状
    #[error("形状不匹配（{message}）：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("规则数爆炸：n_memb^n_input = {n_memb}^{n_input} 超过上限{limit}")]
    RuleExplosion {
        n_memb: usize,
        n_input: usize,
        limit: usize,
    },

    #[error("训练发散：epoch {epoch} / batch {batch}（从 0 计）出现{reason}，参数停留在最后一次有效更新")]
    Divergence {
        epoch: usize,
        batch: usize,
        reason: String,
    },

    // 保存、加载
    #[error("参数持久化失败：{0}")]
    Persistence(String),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("状态无效：{0}")]
    InvalidState(String),
}

impl AnfisError {
    /// 获取错误的分类标签
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_)
            | Self::ValueMustSatisfyComparison { .. }
            | Self::UnknownIdentifier { .. } => ErrorKind::Configuration,
            Self::ShapeMismatch { .. } => ErrorKind::Shape,
            Self::RuleExplosion { .. } => ErrorKind::RuleExplosion,
            Self::Divergence { .. } => ErrorKind::Divergence,
            Self::Persistence(_) | Self::Io(_) => ErrorKind::Persistence,
            Self::InvalidState(_) => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn shape(expected: &[usize], got: &[usize], message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.into(),
        }
    }

    pub(crate) fn persistence(message: impl std::fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }
}
