/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Anfis 底层参数序列化（save_params/load_params）
 *
 * 职责：纯二进制序列化，只处理参数的读写
 *
 * 文件格式：魔数 `OAFP` + 版本号（u32 小端）+ bincode 编码的 AnfisParams
 *
 * 与 model_io.rs 的区别：
 * - serialization.rs：底层二进制序列化（只处理参数的原始读写）
 * - model_io.rs：高层模型 I/O（生成/解析 ModelDescriptor + 调用底层序列化）
 */

use super::Anfis;
use crate::errors::{AnfisError, Result};
use crate::nn::params::AnfisParams;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

impl Anfis {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"OAFP";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 把当前参数快照编码为字节
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_params(&mut bytes)?;
        Ok(bytes)
    }

    /// 从字节解码参数并发布到模型（形状须与模型结构一致，fit 进行中拒绝写入）
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.read_params(bytes)
    }

    /// 保存所有可训练参数到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_params(&mut writer)?;
        writer.flush()?;
        log::debug!("参数已保存到 {}", path.as_ref().display());
        Ok(())
    }

    /// 从二进制文件加载参数
    ///
    /// 文件中的参数须与当前模型的结构一致且全部有限，否则模型参数保持不变。
    /// 与 [`Anfis::set_params`] 一样，fit 进行中返回 `InvalidState`。
    pub fn load_params<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::open(path.as_ref())?;
        self.read_params(BufReader::new(file))?;
        log::debug!("已从 {} 加载参数", path.as_ref().display());
        Ok(())
    }

    fn write_params<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(Self::PARAMS_MAGIC)?;
        writer.write_all(&Self::PARAMS_VERSION.to_le_bytes())?;
        let params = self.snapshot();
        bincode::serialize_into(&mut writer, &*params)
            .map_err(|e| AnfisError::persistence(format!("编码参数失败: {e}")))
    }

    fn read_params<R: Read>(&self, mut reader: R) -> Result<()> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| AnfisError::persistence(format!("读取魔数失败: {e}")))?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(AnfisError::persistence(
                "无效的参数文件：这不是 only_anfis 格式的参数文件。请确保使用 save_params() 保存的文件。",
            ));
        }

        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| AnfisError::persistence(format!("读取版本失败: {e}")))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != Self::PARAMS_VERSION {
            return Err(AnfisError::persistence(format!(
                "不支持的参数文件版本: {version}"
            )));
        }

        let params: AnfisParams = bincode::deserialize_from(&mut reader)
            .map_err(|e| AnfisError::persistence(format!("解码参数失败: {e}")))?;
        self.set_params(params)
    }
}
