//! # Only ANFIS
//!
//! `only_anfis`用纯rust实现自适应神经模糊推理系统（ANFIS）：
//! 输入经模糊化、规则激活、归一化和 Takagi-Sugeno 后件四层得到标量输出，
//! 隶属度函数参数与后件系数一起用梯度下降联合训练。
//!
//! ```ignore
//! use only_anfis::config::FisParameters;
//! use only_anfis::data::TensorDataset;
//! use only_anfis::nn::{Anfis, CancellationToken, ComputeContext, FitOptions, Trainer};
//!
//! let spec = FisParameters::new(2, 3).optimizer("adam").loss("mse").validate()?;
//! let model = Anfis::new(&spec, ComputeContext::Cpu)?;
//! let mut trainer = Trainer::new(&spec);
//! trainer.fit(&model, &train, Some(&val), &FitOptions::from_spec(&spec), &CancellationToken::new())?;
//! let y = model.predict(x.view())?;
//! ```

pub mod config;
pub mod data;
pub mod errors;
pub mod nn;

pub use errors::{AnfisError, ErrorKind, Result};
