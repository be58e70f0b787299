/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 后件层测试
 */

use crate::nn::ComputeContext;
use crate::nn::layer::ConsequentLayer;
use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, array};

#[test]
fn test_init_params_are_zero() {
    let layer = ConsequentLayer::new(2, 4);
    assert_eq!(layer.init_params(), Array2::<f64>::zeros((4, 3)));
    assert_eq!(layer.param_count(), 12);
}

#[test]
fn test_forward_single_rule_is_affine() {
    let layer = ConsequentLayer::new(1, 1);
    let coefficients = array![[2.0, 1.0]];
    let x = array![[3.0], [-0.5]];
    let w = array![[1.0], [1.0]];
    let (y, rule_outputs) = layer.forward(ComputeContext::Cpu, coefficients.view(), x.view(), w.view());
    assert_eq!(y, array![7.0, 0.0]);
    assert_eq!(rule_outputs, array![[7.0], [0.0]]);
}

#[test]
fn test_forward_blends_rules() {
    let layer = ConsequentLayer::new(2, 2);
    // r_0 = x1 + 2·x2，r_1 = -x1 + 3
    let coefficients = array![[1.0, 2.0, 0.0], [-1.0, 0.0, 3.0]];
    let x = array![[1.0, 1.0]];
    let w = array![[0.25, 0.75]];
    let (y, rule_outputs) = layer.forward(ComputeContext::Cpu, coefficients.view(), x.view(), w.view());
    assert_eq!(rule_outputs, array![[3.0, 2.0]]);
    assert_abs_diff_eq!(y[0], 0.25 * 3.0 + 0.75 * 2.0, epsilon = 1e-15);
}

#[test]
fn test_backward_matches_finite_difference() {
    const H: f64 = 1e-6;
    let layer = ConsequentLayer::new(2, 3);
    let coefficients = array![[0.5, -1.0, 0.2], [1.5, 0.3, -0.7], [-0.4, 0.9, 1.1]];
    let x = array![[0.3, -1.2], [2.0, 0.4]];
    let w = array![[0.2, 0.5, 0.3], [0.6, 0.1, 0.3]];
    let upstream = array![1.5, -0.8];
    let loss = |c: &Array2<f64>, w: &Array2<f64>| {
        let (y, _) = layer.forward(ComputeContext::Cpu, c.view(), x.view(), w.view());
        (&y * &upstream).sum()
    };

    let (_, rule_outputs) = layer.forward(ComputeContext::Cpu, coefficients.view(), x.view(), w.view());
    let (grad_c, grad_w) = layer.backward(
        ComputeContext::Cpu,
        x.view(),
        w.view(),
        rule_outputs.view(),
        upstream.view(),
    );

    for ((r, k), &g) in grad_c.indexed_iter() {
        let mut plus = coefficients.clone();
        let mut minus = coefficients.clone();
        plus[[r, k]] += H;
        minus[[r, k]] -= H;
        let numeric = (loss(&plus, &w) - loss(&minus, &w)) / (2.0 * H);
        assert_abs_diff_eq!(g, numeric, epsilon = 1e-6);
    }
    for ((b, r), &g) in grad_w.indexed_iter() {
        let mut plus = w.clone();
        let mut minus = w.clone();
        plus[[b, r]] += H;
        minus[[b, r]] -= H;
        let numeric = (loss(&coefficients, &plus) - loss(&coefficients, &minus)) / (2.0 * H);
        assert_abs_diff_eq!(g, numeric, epsilon = 1e-6);
    }
}

#[test]
fn test_parallel_context_matches_serial() {
    let layer = ConsequentLayer::new(2, 4);
    let coefficients = Array2::from_shape_fn((4, 3), |(r, k)| (r as f64 - k as f64) * 0.3);
    let x = Array2::from_shape_fn((20, 2), |(b, d)| (b as f64 * 0.2) - d as f64);
    let w = Array2::from_elem((20, 4), 0.25);
    let serial = layer.forward(ComputeContext::Cpu, coefficients.view(), x.view(), w.view());
    let parallel = layer.forward(ComputeContext::CpuParallel, coefficients.view(), x.view(), w.view());
    assert_eq!(serial, parallel);

    let upstream = Array1::linspace(-1.0, 1.0, 20);
    assert_eq!(
        layer.backward(ComputeContext::Cpu, x.view(), w.view(), serial.1.view(), upstream.view()),
        layer.backward(ComputeContext::CpuParallel, x.view(), w.view(), serial.1.view(), upstream.view())
    );
}
