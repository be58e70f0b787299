/*
 * @Author       : 老董
 * @Date         : 2025-12-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-07
 * @Description  : 模型描述符（Model Descriptor）
 *                 统一的中间表示（IR），用于序列化、摘要输出和调试
 */

use crate::config::FisParameters;
use serde::{Deserialize, Serialize};

/// 模型的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 构建模型所用的配置
    pub parameters: FisParameters,
    pub rule_count: usize,
    /// 按前向顺序排列的各层描述
    pub layers: Vec<LayerDescriptor>,
    /// 参数文件路径（相对于 JSON 文件），仅在保存完整模型时使用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

/// 层描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    pub layer_type: LayerTypeDescriptor,
    /// 输出形状，`None` 表示 batch 维（运行时决定）
    pub output_shape: Vec<Option<usize>>,
    pub param_count: usize,
}

/// 层类型描述（包含类型特定参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerTypeDescriptor {
    Input,
    Membership { family: String },
    Rule,
    Normalization,
    Consequent,
}

impl LayerTypeDescriptor {
    /// 摘要表格中显示的类型名称
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Membership { .. } => "Membership",
            Self::Rule => "Rule",
            Self::Normalization => "Normalization",
            Self::Consequent => "Consequent",
        }
    }
}

impl ModelDescriptor {
    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.param_count).sum()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl LayerDescriptor {
    pub fn new(
        name: &str,
        layer_type: LayerTypeDescriptor,
        output_shape: Vec<Option<usize>>,
        param_count: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            layer_type,
            output_shape,
            param_count,
        }
    }

    /// 形状的显示形式，batch 维写作 `?`
    pub fn shape_string(&self) -> String {
        let dims: Vec<String> = self
            .output_shape
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |d| d.to_string()))
            .collect();
        format!("[{}]", dims.join(", "))
    }
}
