/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Anfis 高层模型 I/O（save_model/load_model）
 *
 * 职责：完整模型的保存/加载（配置与结构 JSON + 参数 bin）
 * 依赖：describe() + save_params()/load_params()
 */

use super::Anfis;
use crate::config::ParameterSpec;
use crate::errors::{AnfisError, Result};
use crate::nn::ComputeContext;
use crate::nn::descriptor::ModelDescriptor;
use std::path::{Path, PathBuf};

impl Anfis {
    /// 保存完整模型（配置 JSON + 参数 bin）
    ///
    /// 自动生成两个文件（后缀追加在文件名之后，不替换已有扩展名）：
    /// - `{path}.json`: 配置与各层描述（可读）
    /// - `{path}.bin`: 参数数据（紧凑）
    ///
    /// # 示例
    /// ```ignore
    /// model.save_model("models/anfis")?;
    /// // 生成：models/anfis.json + models/anfis.bin
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json_path = with_suffix(path, "json");
        let bin_path = with_suffix(path, "bin");

        // 1. 保存参数到 bin 文件
        self.save_params(&bin_path)?;

        // 2. 生成描述符并设置 params_file
        let mut descriptor = self.describe();
        descriptor.params_file = Some(bin_path.file_name().map_or_else(
            || "params.bin".to_string(),
            |s| s.to_string_lossy().to_string(),
        ));

        // 3. 保存 JSON
        let json = descriptor
            .to_json()
            .map_err(|e| AnfisError::persistence(format!("序列化模型描述失败: {e}")))?;
        std::fs::write(&json_path, json)?;

        log::info!("模型已保存：{} + {}", json_path.display(), bin_path.display());
        Ok(())
    }

    /// 加载完整模型：按 JSON 中的配置重建结构，再加载参数
    ///
    /// # 示例
    /// ```ignore
    /// let model = Anfis::load_model("models/anfis", ComputeContext::Cpu)?;
    /// let y = model.predict(x.view())?;
    /// ```
    pub fn load_model<P: AsRef<Path>>(path: P, context: ComputeContext) -> Result<Self> {
        let path = path.as_ref();
        let json_path = with_suffix(path, "json");

        // 1. 读取并解析 JSON
        let json = std::fs::read_to_string(&json_path)?;
        let descriptor = ModelDescriptor::from_json(&json)
            .map_err(|e| AnfisError::persistence(format!("解析模型描述失败: {e}")))?;

        // 2. 按配置重建模型
        let spec = ParameterSpec::try_from(descriptor.parameters)?;
        let model = Self::new(&spec, context)?;

        // 3. 确定参数文件路径并加载参数
        let bin_path = if let Some(ref params_file) = descriptor.params_file {
            path.parent().map_or_else(
                || Path::new(params_file).to_path_buf(),
                |p| p.join(params_file),
            )
        } else {
            with_suffix(path, "bin")
        };
        model.load_params(&bin_path)?;

        Ok(model)
    }
}

/// `models/anfis.v2` + `json` → `models/anfis.v2.json`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
