//! 模型配置模块
//!
//! - [`FisParameters`]: 原始配置记录（可直接由 JSON 反序列化，字段与训练脚本一致）
//! - [`ParameterSpec`]: 校验后的不可变配置，模型与训练器都只接受它
//!
//! ```ignore
//! let spec = FisParameters::new(3, 3)
//!     .batch_size(16)
//!     .memb_func("gaussian")
//!     .optimizer("adam")
//!     .loss("huber_loss")
//!     .n_epochs(30)
//!     .validate()?;
//! ```

mod kinds;
mod spec;

pub use kinds::{LossKind, MembershipFamily, MetricKind, OptimizerKind};
pub use spec::{FisParameters, ParameterSpec};
