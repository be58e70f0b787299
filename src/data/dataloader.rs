/*
 * @Author       : 老董
 * @Date         : 2026-02-04
 * @Description  : DataLoader - 回归数据集的 mini-batch 加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle，可固定种子)
 * - 丢弃不完整批次 (drop_last)
 */

use crate::errors::{AnfisError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand::seq::SliceRandom;

/// TensorDataset - 持有特征矩阵和标量目标的数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::new(features, targets)?;
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TensorDataset {
    /// [n_samples, n_input]
    features: Array2<f64>,
    /// [n_samples]
    targets: Array1<f64>,
}

impl TensorDataset {
    /// 创建新的 TensorDataset
    ///
    /// # 参数
    /// - `features`: 特征矩阵，第一维为样本数
    /// - `targets`: 目标向量，长度必须与 features 的样本数一致
    pub fn new(features: Array2<f64>, targets: Array1<f64>) -> Result<Self> {
        if features.nrows() != targets.len() {
            return Err(AnfisError::shape(
                &[features.nrows()],
                &[targets.len()],
                "features 和 targets 的样本数必须一致",
            ));
        }
        Ok(Self { features, targets })
    }

    /// 从 (特征行, 目标) 列表创建（便于测试和小数据集）
    pub fn from_rows(rows: &[(Vec<f64>, f64)]) -> Result<Self> {
        let n_input = rows.first().map_or(0, |(x, _)| x.len());
        let mut flat = Vec::with_capacity(rows.len() * n_input);
        for (x, _) in rows {
            if x.len() != n_input {
                return Err(AnfisError::shape(&[n_input], &[x.len()], "每行特征的长度必须一致"));
            }
            flat.extend_from_slice(x);
        }
        let features = Array2::from_shape_vec((rows.len(), n_input), flat)
            .map_err(|e| AnfisError::shape(&[rows.len(), n_input], &[], e.to_string()))?;
        let targets = rows.iter().map(|&(_, y)| y).collect();
        Self::new(features, targets)
    }

    /// 获取样本数量
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// 检查数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 每个样本的特征维度
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }
}

/// DataLoader - 按批次遍历 [`TensorDataset`]
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(&dataset, 16)
///     .shuffle(true)
///     .seed(42);
///
/// for (x_batch, y_batch) in loader.iter() {
///     // x_batch: [batch, n_input], y_batch: [batch]
/// }
/// ```
pub struct DataLoader<'a> {
    dataset: &'a TensorDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl<'a> DataLoader<'a> {
    /// 创建新的 DataLoader
    ///
    /// `batch_size` 为 0 时按 1 处理
    pub fn new(dataset: &'a TensorDataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// 创建迭代器
    pub fn iter(&self) -> DataLoaderIterator<'_, 'a> {
        let n = self.dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();

        if self.shuffle {
            if let Some(seed) = self.seed {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                indices.shuffle(&mut rng);
            } else {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
            }
        }

        DataLoaderIterator {
            loader: self,
            indices,
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器
pub struct DataLoaderIterator<'l, 'a> {
    loader: &'l DataLoader<'a>,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for DataLoaderIterator<'_, '_> {
    type Item = (Array2<f64>, Array1<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        let batch_size = self.loader.batch_size;
        let start = self.current_batch * batch_size;

        if start >= n {
            return None;
        }

        let end = (start + batch_size).min(n);

        // drop_last 时跳过不完整批次
        if self.loader.drop_last && end - start < batch_size {
            return None;
        }

        self.current_batch += 1;

        let batch_indices = &self.indices[start..end];
        let dataset = self.loader.dataset;
        Some((
            dataset.features.select(Axis(0), batch_indices),
            dataset.targets.select(Axis(0), batch_indices),
        ))
    }
}
