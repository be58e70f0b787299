/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Anfis 构建、预测、摘要与内省测试
 */

use super::{sample_inputs, spec};
use crate::config::FisParameters;
use crate::errors::ErrorKind;
use crate::nn::{Anfis, ComputeContext, LayerTypeDescriptor, ModelStatus};
use approx::assert_abs_diff_eq;
use ndarray::{Array2, Axis, array};

#[test]
fn test_new_model_is_compiled() {
    let model = Anfis::new(&spec(3, 3, "gaussian"), ComputeContext::Cpu).unwrap();
    assert_eq!(model.status(), ModelStatus::Compiled);
    assert_eq!(model.rule_count(), 27);
    // 前件 3·3·2 + 后件 27·4
    assert_eq!(model.param_count(), 18 + 108);
    assert_eq!(model.store().version(), 0);
}

#[test]
fn test_rule_explosion_at_construction() {
    let spec = FisParameters::new(5, 4).max_rules(1000).validate().unwrap();
    let err = Anfis::new(&spec, ComputeContext::Cpu).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuleExplosion);
}

#[test]
fn test_predict_rejects_wrong_width() {
    let model = Anfis::new(&spec(2, 2, "gaussian"), ComputeContext::Cpu).unwrap();
    let err = model.predict(Array2::zeros((4, 3)).view()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    let err = model.predict_one(&[1.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_untrained_prediction_is_zero() {
    // 后件系数初始为 0
    let model = Anfis::new(&spec(2, 3, "bell"), ComputeContext::Cpu).unwrap();
    let y = model.predict(sample_inputs(8, 2).view()).unwrap();
    assert_eq!(y, ndarray::Array1::<f64>::zeros(8));
}

#[test]
fn test_predict_is_deterministic() {
    let model = Anfis::new(&spec(2, 3, "gaussian"), ComputeContext::Cpu).unwrap();
    let mut params = (*model.snapshot()).clone();
    params.consequents = Array2::from_shape_fn((9, 3), |(r, k)| (r as f64 * 0.3 - k as f64).sin());
    model.set_params(params).unwrap();

    let x = sample_inputs(10, 2);
    let first = model.predict(x.view()).unwrap();
    let second = model.predict(x.view()).unwrap();
    assert_eq!(first, second);
    assert_eq!(model.predict_one(&[x[[3, 0]], x[[3, 1]]]).unwrap(), first[3]);
}

#[test]
fn test_parallel_context_matches_serial() {
    let spec = spec(3, 2, "bell");
    let serial = Anfis::new(&spec, ComputeContext::Cpu).unwrap();
    let parallel = Anfis::new(&spec, ComputeContext::CpuParallel).unwrap();
    let mut params = (*serial.snapshot()).clone();
    params.consequents = Array2::from_shape_fn((8, 4), |(r, k)| r as f64 * 0.1 - k as f64 * 0.2);
    serial.set_params(params.clone()).unwrap();
    parallel.set_params(params).unwrap();

    let x = sample_inputs(50, 3);
    assert_eq!(serial.predict(x.view()).unwrap(), parallel.predict(x.view()).unwrap());
}

#[test]
fn test_set_params_validates_shapes() {
    let model = Anfis::new(&spec(2, 2, "gaussian"), ComputeContext::Cpu).unwrap();
    let mut params = (*model.snapshot()).clone();
    params.consequents = Array2::zeros((3, 3));
    assert_eq!(model.set_params(params).unwrap_err().kind(), ErrorKind::Shape);

    let mut params = (*model.snapshot()).clone();
    params.premise.slopes = Some(Array2::ones((2, 2)));
    assert_eq!(model.set_params(params).unwrap_err().kind(), ErrorKind::Shape);
    assert_eq!(model.store().version(), 0);
}

#[test]
fn test_describe_and_summary() {
    let model = Anfis::new(&spec(2, 3, "bell"), ComputeContext::Cpu).unwrap();
    let desc = model.describe();
    assert_eq!(desc.rule_count, 9);
    assert_eq!(desc.layers.len(), 5);
    assert_eq!(
        desc.layers[1].layer_type,
        LayerTypeDescriptor::Membership {
            family: "bell".to_string()
        }
    );
    assert_eq!(desc.layers[1].output_shape, vec![None, Some(2), Some(3)]);
    assert_eq!(desc.layers[1].shape_string(), "[?, 2, 3]");
    assert_eq!(desc.total_params(), 2 * 3 * 3 + 9 * 3);
    assert_eq!(desc.total_params(), model.param_count());

    let summary = model.summary_string();
    assert!(summary.contains("fuzzify"));
    assert!(summary.contains("Consequent"));
    assert!(summary.contains("总参数量: 45"));
}

#[test]
fn test_memberships_and_firing_strengths() {
    let model = Anfis::new(&spec(2, 3, "gaussian"), ComputeContext::Cpu).unwrap();
    let x = sample_inputs(6, 2);
    let memberships = model.get_memberships(x.view()).unwrap();
    assert_eq!(memberships.shape(), &[6, 2, 3]);

    let weights = model.firing_strengths(x.view()).unwrap();
    assert_eq!(weights.shape(), &[6, 9]);
    for row in weights.axis_iter(Axis(0)) {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
    }
    assert_eq!(
        model.get_memberships(Array2::zeros((1, 5)).view()).unwrap_err().kind(),
        ErrorKind::Shape
    );
}

#[test]
fn test_far_away_inputs_stay_finite() {
    let model = Anfis::new(&spec(2, 2, "gaussian"), ComputeContext::Cpu).unwrap();
    let x = array![[1e6, -1e6], [f64::MAX / 4.0, 0.0]];
    let weights = model.firing_strengths(x.view()).unwrap();
    assert!(weights.iter().all(|w| w.is_finite()));
    assert!(model.predict(array![[1e6, -1e6]].view()).unwrap()[0].is_finite());
}

#[test]
fn test_membership_curves() {
    let model = Anfis::new(&spec(2, 3, "gaussian"), ComputeContext::Cpu).unwrap();
    let curves = model.membership_curves(61).unwrap();
    assert_eq!(curves.xs.len(), 61);
    assert_eq!(curves.xs[0], -3.0);
    assert_abs_diff_eq!(curves.xs[60], 3.0, epsilon = 1e-12);
    assert_eq!(curves.degrees.shape(), &[2, 3, 61]);
    // 中间的模糊集在 x = 0 处取到 1
    assert_abs_diff_eq!(curves.degrees[[0, 1, 30]], 1.0, epsilon = 1e-12);

    assert_eq!(model.membership_curves(1).unwrap_err().kind(), ErrorKind::Configuration);
    assert_eq!(
        model.membership_curves_in(1.0, -1.0, 10).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    assert_eq!(model.membership_params(), model.snapshot().premise);
}

#[test]
fn test_training_guard_restores_status() {
    let model = Anfis::new(&spec(1, 2, "gaussian"), ComputeContext::Cpu).unwrap();
    {
        let _guard = model.begin_training().unwrap();
        assert_eq!(model.status(), ModelStatus::Training);
        // 同一时间只允许一个写者
        let err = model.begin_training().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
    assert_eq!(model.status(), ModelStatus::Compiled);

    model.begin_training().unwrap().finish();
    assert_eq!(model.status(), ModelStatus::Trained);
}
