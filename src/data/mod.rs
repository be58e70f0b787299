//! 数据加载模块
//!
//! 数据的生成与训练/验证集划分由外部负责，这里只提供：
//!
//! - [`TensorDataset`]: 持有特征矩阵和目标向量的数据集
//! - [`DataLoader`]: 带可选打乱的 mini-batch 迭代器
//!
//! # 使用示例
//!
//! ```ignore
//! use only_anfis::data::{DataLoader, TensorDataset};
//!
//! let dataset = TensorDataset::new(train_x, train_y)?;
//! let loader = DataLoader::new(&dataset, 16).shuffle(true).seed(42);
//! for (x_batch, y_batch) in loader.iter() {
//!     // ...
//! }
//! ```

mod dataloader;


pub use dataloader::{DataLoader, DataLoaderIterator, TensorDataset};
