/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 损失函数与评估指标测试
 */

use crate::config::{LossKind, MetricKind};
use crate::nn::{HuberLoss, Loss, LossFunction, MaeLoss, MseLoss};
use approx::assert_abs_diff_eq;
use ndarray::{Array1, array};

fn check_gradient(loss: &LossFunction, prediction: &Array1<f64>, target: &Array1<f64>) {
    const H: f64 = 1e-6;
    let grad = loss.backward(prediction.view(), target.view());
    for i in 0..prediction.len() {
        let mut plus = prediction.clone();
        let mut minus = prediction.clone();
        plus[i] += H;
        minus[i] -= H;
        let numeric = (loss.forward(plus.view(), target.view())
            - loss.forward(minus.view(), target.view()))
            / (2.0 * H);
        assert_abs_diff_eq!(grad[i], numeric, epsilon = 1e-6);
    }
}

#[test]
fn test_mse_loss() {
    let p = array![1.0, 2.0, 4.0];
    let t = array![1.0, 0.0, 1.0];
    // (0 + 4 + 9) / 3
    assert_abs_diff_eq!(MseLoss.forward(p.view(), t.view()), 13.0 / 3.0, epsilon = 1e-12);
    assert_eq!(MseLoss.backward(p.view(), t.view()), array![0.0, 4.0 / 3.0, 2.0]);
}

#[test]
fn test_mae_loss() {
    let p = array![1.0, 2.0, -4.0];
    let t = array![1.0, 0.0, 1.0];
    assert_abs_diff_eq!(MaeLoss.forward(p.view(), t.view()), 7.0 / 3.0, epsilon = 1e-12);
    assert_eq!(
        MaeLoss.backward(p.view(), t.view()),
        array![0.0, 1.0 / 3.0, -1.0 / 3.0]
    );
}

#[test]
fn test_huber_loss_both_regimes() {
    let huber = HuberLoss::default();
    assert_eq!(huber.delta(), 1.0);
    let p = array![0.5, 3.0];
    let t = array![0.0, 0.0];
    // 0.5·0.25 = 0.125；1·(3 - 0.5) = 2.5
    assert_abs_diff_eq!(huber.forward(p.view(), t.view()), (0.125 + 2.5) / 2.0, epsilon = 1e-12);
    assert_eq!(huber.backward(p.view(), t.view()), array![0.25, 0.5]);
}

#[test]
fn test_gradients_match_finite_difference() {
    let prediction = array![0.3, -1.7, 2.4, 0.05];
    let target = array![0.0, 0.2, -0.6, 1.3];
    for kind in [LossKind::Mse, LossKind::Mae, LossKind::Huber] {
        let loss = LossFunction::from(kind);
        assert_eq!(loss.kind(), kind);
        check_gradient(&loss, &prediction, &target);
    }
}

#[test]
fn test_empty_batch_loss_is_zero() {
    let empty = Array1::<f64>::zeros(0);
    assert_eq!(MseLoss.forward(empty.view(), empty.view()), 0.0);
    assert_eq!(MseLoss.backward(empty.view(), empty.view()).len(), 0);
}

#[test]
fn test_metric_evaluate() {
    let p = array![1.0, 3.0];
    let t = array![0.0, 0.0];
    assert_abs_diff_eq!(MetricKind::Mse.evaluate(p.view(), t.view()), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(MetricKind::Mae.evaluate(p.view(), t.view()), 2.0, epsilon = 1e-12);
}
