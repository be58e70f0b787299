/*
 * @Author       : 老董
 * @Date         : 2026-02-04
 * @Description  : 计算上下文：显式传入每一层的计算资源句柄
 *
 * 模型构建时选定，之后贯穿所有层的 forward/backward 调用，
 * 不存在隐式的全局设备状态。
 */

use serde::{Deserialize, Serialize};

/// 计算上下文
///
/// - `Cpu`: 单线程逐样本计算
/// - `CpuParallel`: 按样本维度数据并行（rayon 全局线程池）
///
/// 两者数值结果完全一致，区别只在调度方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComputeContext {
    #[default]
    Cpu,
    CpuParallel,
}

impl ComputeContext {
    pub const fn is_parallel(&self) -> bool {
        matches!(self, Self::CpuParallel)
    }
}

/// 按计算上下文调度一个逐样本的 `Zip`
///
/// ```ignore
/// zip_for_each!(ctx, Zip::from(out.rows_mut()).and(x.rows()), |o, x| { ... });
/// ```
macro_rules! zip_for_each {
    ($ctx:expr, $zip:expr, $f:expr) => {
        match $ctx {
            $crate::nn::ComputeContext::Cpu => $zip.for_each($f),
            $crate::nn::ComputeContext::CpuParallel => $zip.par_for_each($f),
        }
    };
}
pub(crate) use zip_for_each;
