/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Anfis describe/summary 相关方法
 */

use super::Anfis;
use crate::nn::descriptor::{LayerDescriptor, LayerTypeDescriptor, ModelDescriptor};
use crate::nn::layer::MembershipFunction;

impl Anfis {
    // ========== 模型描述（describe）==========

    /// 导出模型的描述符（用于序列化、摘要、调试）
    ///
    /// # 示例
    /// ```ignore
    /// let descriptor = model.describe();
    /// println!("{}", descriptor.to_json()?);
    /// ```
    pub fn describe(&self) -> ModelDescriptor {
        let n = self.spec.n_input();
        let m = self.spec.n_memb();
        let r = self.rule_count();
        let layers = vec![
            LayerDescriptor::new("input", LayerTypeDescriptor::Input, vec![None, Some(n)], 0),
            LayerDescriptor::new(
                "fuzzify",
                LayerTypeDescriptor::Membership {
                    family: self.membership.kernel().family().name().to_string(),
                },
                vec![None, Some(n), Some(m)],
                self.membership.param_count(),
            ),
            LayerDescriptor::new("rules", LayerTypeDescriptor::Rule, vec![None, Some(r)], 0),
            LayerDescriptor::new(
                "normalize",
                LayerTypeDescriptor::Normalization,
                vec![None, Some(r)],
                0,
            ),
            LayerDescriptor::new(
                "consequent",
                LayerTypeDescriptor::Consequent,
                vec![None],
                self.consequent.param_count(),
            ),
        ];

        ModelDescriptor {
            version: env!("CARGO_PKG_VERSION").to_string(),
            parameters: self.spec.to_parameters(),
            rule_count: r,
            layers,
            params_file: None,
        }
    }

    // ========== 模型摘要（summary）==========

    /// 打印模型摘要（类似 Keras 的 `model.summary()`）
    ///
    /// ```ignore
    /// model.summary();
    /// // ┌────────────┬───────────────┬──────────────┬────────────┐
    /// // │ 层名称     │ 类型          │ 输出形状     │ 参数量     │
    /// // ├────────────┼───────────────┼──────────────┼────────────┤
    /// // │ fuzzify    │ Membership    │ [?, 3, 3]    │         18 │
    /// // ...
    /// ```
    pub fn summary(&self) {
        println!("{}", self.summary_string());
    }

    /// 返回模型摘要字符串（Unicode 文本表格，用于控制台输出）
    pub fn summary_string(&self) -> String {
        let desc = self.describe();

        let name_width = column_width(desc.layers.iter().map(|l| display_width(&l.name)), 8);
        let type_width = column_width(desc.layers.iter().map(|l| l.layer_type.type_name().len()), 8);
        let shape_width = column_width(desc.layers.iter().map(|l| l.shape_string().len()), 8);
        let param_width = 10;
        // 边框和间距
        let total_width = name_width + type_width + shape_width + param_width + 13;

        let rule = |left: &str, mid: &str, right: &str| {
            format!(
                "{left}{}{mid}{}{mid}{}{mid}{}{right}\n",
                "─".repeat(name_width + 2),
                "─".repeat(type_width + 2),
                "─".repeat(shape_width + 2),
                "─".repeat(param_width + 2),
            )
        };

        let mut output = String::new();
        output.push_str(&rule("┌", "┬", "┐"));
        output.push_str(&format!(
            "│ {} │ {} │ {} │ {} │\n",
            pad("层名称", name_width),
            pad("类型", type_width),
            pad("输出形状", shape_width),
            pad("参数量", param_width),
        ));
        output.push_str(&rule("├", "┼", "┤"));

        for layer in &desc.layers {
            let param_str = if layer.param_count == 0 {
                "-".to_string()
            } else {
                format_number(layer.param_count)
            };
            output.push_str(&format!(
                "│ {} │ {:<type_w$} │ {:<shape_w$} │ {:>param_w$} │\n",
                pad(&layer.name, name_width),
                layer.layer_type.type_name(),
                layer.shape_string(),
                param_str,
                type_w = type_width,
                shape_w = shape_width,
                param_w = param_width,
            ));
        }

        output.push_str(&rule("├", "┴", "┤"));
        for line in [
            format!("规则数: {}", format_number(desc.rule_count)),
            format!("总参数量: {}", format_number(desc.total_params())),
            format!("可训练参数: {}", format_number(desc.total_params())),
        ] {
            output.push_str(&format!("│ {} │\n", pad(&line, total_width - 4)));
        }
        output.push_str(&format!("└{}┘\n", "─".repeat(total_width - 2)));

        output
    }
}

fn column_width(widths: impl Iterator<Item = usize>, min: usize) -> usize {
    widths.max().unwrap_or(min).max(min)
}

/// 按显示宽度左对齐补空格
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

/// 格式化数字为千分位分隔形式
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// 计算字符串显示宽度（考虑中文字符）
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}
