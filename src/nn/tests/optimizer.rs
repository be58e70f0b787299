/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : SGD / Adam 优化器测试
 */

use crate::config::FisParameters;
use crate::errors::ErrorKind;
use super::assert_close;
use crate::nn::{Adam, AnfisGrads, AnfisParams, AnyOptimizer, MembershipParams, Optimizer, SGD};
use approx::assert_abs_diff_eq;
use ndarray::{Array2, array};

fn params(with_slopes: bool) -> AnfisParams {
    AnfisParams {
        premise: MembershipParams {
            centers: array![[0.0, 1.0]],
            widths: array![[1.0, 1.0]],
            slopes: with_slopes.then(|| array![[2.0, 2.0]]),
        },
        consequents: array![[1.0, 0.0], [0.0, -1.0]],
    }
}

fn grads(with_slopes: bool) -> AnfisGrads {
    AnfisGrads {
        centers: array![[0.5, -1.0]],
        widths: array![[0.0, 2.0]],
        slopes: with_slopes.then(|| array![[1.0, -1.0]]),
        consequents: array![[1.0, 2.0], [-3.0, 0.5]],
    }
}

#[test]
fn test_sgd_learning_rate_modification() {
    let mut sgd = SGD::new(0.01);
    assert_eq!(sgd.learning_rate(), 0.01);
    sgd.set_learning_rate(0.001);
    assert_eq!(sgd.learning_rate(), 0.001);
}

#[test]
fn test_sgd_update_formula() {
    // θ_new = θ_old - α * ∇θ
    let mut sgd = SGD::new(0.1);
    let mut p = params(false);
    sgd.step(&mut p, &grads(false)).unwrap();
    assert_close(&p.premise.centers, &array![[-0.05, 1.1]], 1e-12);
    assert_close(&p.premise.widths, &array![[1.0, 0.8]], 1e-12);
    assert_close(&p.consequents, &array![[0.9, -0.2], [0.3, -1.05]], 1e-12);
}

#[test]
fn test_sgd_momentum_accumulates_velocity() {
    // v1 = g；v2 = μ·g + g
    let mut sgd = SGD::with_momentum(0.1, 0.9);
    assert_eq!(sgd.momentum(), 0.9);
    let mut p = params(false);
    let g = grads(false);
    sgd.step(&mut p, &g).unwrap();
    sgd.step(&mut p, &g).unwrap();
    // 中心 [0,0]：0 - 0.1·0.5 - 0.1·(0.9·0.5 + 0.5)
    assert_abs_diff_eq!(p.premise.centers[[0, 0]], -0.05 - 0.095, epsilon = 1e-12);

    sgd.reset();
    let mut fresh = params(false);
    sgd.step(&mut fresh, &g).unwrap();
    assert_abs_diff_eq!(fresh.premise.centers[[0, 0]], -0.05, epsilon = 1e-12);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    // 第一步 m_hat = g，v_hat = g²，更新量约为 α·sign(g)
    let mut adam = Adam::new_default(0.01);
    let mut p = params(true);
    let g = grads(true);
    adam.step(&mut p, &g).unwrap();
    assert_eq!(adam.steps(), 1);
    assert_close(&p.premise.centers, &array![[-0.01, 1.01]], 1e-6);
    // 梯度为 0 的位置不动
    assert_eq!(p.premise.widths[[0, 0]], 1.0);
    assert_close(&p.premise.slopes.unwrap(), &array![[1.99, 2.01]], 1e-6);
    assert_close(&p.consequents, &array![[0.99, -0.01], [0.01, -1.01]], 1e-6);

    adam.reset();
    assert_eq!(adam.steps(), 0);
}

#[test]
fn test_missing_gradient_group_is_shape_error() {
    let mut adam = Adam::new_default(0.01);
    let mut p = params(true);
    let err = adam.step(&mut p, &grads(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);

    let mut g = grads(false);
    g.consequents = Array2::zeros((3, 2));
    let err = SGD::new(0.1).step(&mut params(false), &g).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_any_optimizer_from_spec() {
    let spec = FisParameters::new(1, 1).optimizer("sgd").validate().unwrap();
    let optimizer = AnyOptimizer::from_spec(&spec);
    assert!(matches!(optimizer, AnyOptimizer::SGD(_)));
    assert_eq!(optimizer.learning_rate(), 0.01);

    let spec = FisParameters::new(1, 1)
        .optimizer("adam")
        .learning_rate(0.05)
        .validate()
        .unwrap();
    let optimizer = AnyOptimizer::from_spec(&spec);
    assert!(matches!(optimizer, AnyOptimizer::Adam(_)));
    assert_eq!(optimizer.learning_rate(), 0.05);
}

/// 结构更大的模型：2 个输入 × 2 个模糊集，4 条规则
fn wider_params() -> (AnfisParams, AnfisGrads) {
    let premise = array![[0.0, 1.0], [-1.0, 1.0]];
    let params = AnfisParams {
        premise: MembershipParams {
            centers: premise.clone(),
            widths: Array2::ones((2, 2)),
            slopes: None,
        },
        consequents: Array2::zeros((4, 3)),
    };
    let grads = AnfisGrads {
        centers: Array2::from_elem((2, 2), 0.5),
        widths: Array2::from_elem((2, 2), -0.5),
        slopes: None,
        consequents: Array2::ones((4, 3)),
    };
    (params, grads)
}

#[test]
fn test_state_resets_when_param_shapes_change() {
    let (mut wide, wide_grads) = wider_params();

    let mut adam = Adam::new_default(0.01);
    adam.step(&mut params(false), &grads(false)).unwrap();
    adam.step(&mut params(false), &grads(false)).unwrap();
    assert_eq!(adam.steps(), 2);
    adam.step(&mut wide, &wide_grads).unwrap();
    // 矩估计重新开始，第一步的更新量约为 α
    assert_eq!(adam.steps(), 1);
    assert_close(&wide.consequents, &Array2::from_elem((4, 3), -0.01), 1e-6);
    assert!(wide.is_finite());

    let (mut wide, wide_grads) = wider_params();
    let mut sgd = SGD::with_momentum(0.1, 0.9);
    sgd.step(&mut params(false), &grads(false)).unwrap();
    sgd.step(&mut wide, &wide_grads).unwrap();
    // 速度项被清空，等同于第一步：θ = 0 - 0.1·1
    assert_close(&wide.consequents, &Array2::from_elem((4, 3), -0.1), 1e-12);
}
