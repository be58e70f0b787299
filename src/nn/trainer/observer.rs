/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 训练事件观察者
 *
 * 训练循环只依赖 TrainingObserver 这个 trait，不知道事件最终流向哪里
 * （日志、通道、仪表盘……）。
 */

use super::history::{EpochRecord, FitReport};
use std::sync::mpsc::Sender;

/// 训练事件观察者
pub trait TrainingObserver: Send {
    /// 每个 epoch 结束（含验证）后调用
    fn on_epoch_end(&mut self, record: &EpochRecord);

    /// fit 正常返回前调用（含被取消的情况）
    fn on_train_end(&mut self, _report: &FitReport) {}
}

/// 通过通道转发的训练事件
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    EpochEnd(EpochRecord),
    TrainEnd(FitReport),
}

/// 把事件发送到 `std::sync::mpsc` 通道，不阻塞训练循环
///
/// 接收端已关闭时事件被丢弃。
#[derive(Debug)]
pub struct ChannelObserver {
    sender: Sender<TrainingEvent>,
}

impl ChannelObserver {
    pub const fn new(sender: Sender<TrainingEvent>) -> Self {
        Self { sender }
    }

    fn emit(&self, event: TrainingEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("训练事件接收端已关闭，事件被丢弃");
        }
    }
}

impl TrainingObserver for ChannelObserver {
    fn on_epoch_end(&mut self, record: &EpochRecord) {
        self.emit(TrainingEvent::EpochEnd(record.clone()));
    }

    fn on_train_end(&mut self, report: &FitReport) {
        self.emit(TrainingEvent::TrainEnd(report.clone()));
    }
}

/// 把事件写入 `log`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_epoch_end(&mut self, record: &EpochRecord) {
        let metrics: Vec<String> = record
            .metrics
            .iter()
            .map(|(name, value)| format!("{name}={value:.6}"))
            .collect();
        match record.val_loss {
            Some(val_loss) => log::info!(
                "[epoch {}] loss={:.6} {} val_loss={val_loss:.6}",
                record.epoch,
                record.loss,
                metrics.join(" ")
            ),
            None => log::info!(
                "[epoch {}] loss={:.6} {}",
                record.epoch,
                record.loss,
                metrics.join(" ")
            ),
        }
    }

    fn on_train_end(&mut self, report: &FitReport) {
        log::info!(
            "训练结束：完成 {} 个 epoch，取消={}",
            report.epochs_completed,
            report.cancelled
        );
    }
}

/// 用闭包处理 epoch 事件
pub struct FnObserver<F>
where
    F: FnMut(&EpochRecord) + Send,
{
    callback: F,
}

impl<F> FnObserver<F>
where
    F: FnMut(&EpochRecord) + Send,
{
    pub const fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> TrainingObserver for FnObserver<F>
where
    F: FnMut(&EpochRecord) + Send,
{
    fn on_epoch_end(&mut self, record: &EpochRecord) {
        (self.callback)(record);
    }
}
