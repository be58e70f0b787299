/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 训练取消令牌
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 可跨线程共享的取消令牌
///
/// 训练循环在每个 batch 之前检查一次；已提交的参数不受影响。
///
/// ```ignore
/// let token = CancellationToken::new();
/// let remote = token.clone();
/// std::thread::spawn(move || remote.cancel());
/// let report = trainer.fit(&model, &train, None, &options, &token)?;
/// assert!(report.cancelled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// 清除取消标记，令牌可以重复使用
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
