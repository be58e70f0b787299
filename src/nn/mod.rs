/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-08
 * @Description  : 负责 ANFIS 网络的构建、训练与内省
 */

mod context;
pub mod criterion;
mod descriptor;
pub mod layer;
mod model;
pub mod optimizer;
mod params;
pub mod trainer;

pub use context::ComputeContext;
pub use criterion::{HuberLoss, Loss, LossFunction, MaeLoss, MseLoss};
pub use descriptor::{LayerDescriptor, LayerTypeDescriptor, ModelDescriptor};
pub use model::{Anfis, ForwardCache, MembershipCurves, ModelStatus};
pub use optimizer::{Adam, AnyOptimizer, Optimizer, SGD};
pub use params::{
    AnfisGrads, AnfisParams, MIN_SLOPE, MembershipParams, ParamGroup, ParameterStore,
};
pub use trainer::{
    CancellationToken, ChannelObserver, EpochRecord, Evaluation, FitOptions, FitReport,
    FnObserver, History, LogObserver, Trainer, TrainingEvent, TrainingObserver,
};

#[cfg(test)]
mod tests;
