mod criterion;
mod layer_consequent;
mod model;
mod model_io;
mod optimizer;

use crate::config::{FisParameters, ParameterSpec};
use ndarray::Array2;

/// 测试用的小配置
pub(super) fn spec(n_input: usize, n_memb: usize, memb_func: &str) -> ParameterSpec {
    FisParameters::new(n_input, n_memb)
        .memb_func(memb_func)
        .validate()
        .unwrap()
}

/// 确定性的"伪随机"输入，落在 [-2.5, 2.5] 附近
pub(super) fn sample_inputs(batch: usize, n_input: usize) -> Array2<f64> {
    Array2::from_shape_fn((batch, n_input), |(i, d)| {
        ((i * 7 + d * 3) as f64 * 0.61).sin() * 2.5
    })
}

/// 逐元素比较两个同形状数组
pub(super) fn assert_close<D: ndarray::Dimension>(
    actual: &ndarray::Array<f64, D>,
    expected: &ndarray::Array<f64, D>,
    epsilon: f64,
) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.iter().zip(expected) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}
