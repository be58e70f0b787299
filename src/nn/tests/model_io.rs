/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : 参数序列化与完整模型保存/加载测试
 */

use super::{sample_inputs, spec};
use crate::errors::ErrorKind;
use crate::nn::{Anfis, ComputeContext};
use ndarray::Array2;
use std::fs;

fn trained_like(family: &str) -> Anfis {
    let model = Anfis::new(&spec(2, 2, family), ComputeContext::Cpu).unwrap();
    let mut params = (*model.snapshot()).clone();
    params.premise.centers += 0.25;
    params.consequents = Array2::from_shape_fn((4, 3), |(r, k)| r as f64 - 0.5 * k as f64);
    model.set_params(params).unwrap();
    model
}

#[test]
fn test_bytes_round_trip() {
    let model = trained_like("bell");
    let bytes = model.to_bytes().unwrap();
    assert_eq!(&bytes[..4], b"OAFP");
    assert_eq!(&bytes[4..8], &1u32.to_le_bytes());

    let fresh = Anfis::new(model.spec(), ComputeContext::Cpu).unwrap();
    fresh.from_bytes(&bytes).unwrap();
    assert_eq!(*fresh.snapshot(), *model.snapshot());
    let x = sample_inputs(9, 2);
    assert_eq!(fresh.predict(x.view()).unwrap(), model.predict(x.view()).unwrap());
}

#[test]
fn test_bad_magic_is_rejected() {
    let model = trained_like("gaussian");
    let mut bytes = model.to_bytes().unwrap();
    bytes[0] = b'X';
    let err = model.from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);

    let mut bytes = model.to_bytes().unwrap();
    bytes[4] = 9;
    assert_eq!(model.from_bytes(&bytes).unwrap_err().kind(), ErrorKind::Persistence);

    assert_eq!(model.from_bytes(b"OA").unwrap_err().kind(), ErrorKind::Persistence);
}

#[test]
fn test_mismatched_structure_is_rejected() {
    let model = trained_like("gaussian");
    let bytes = model.to_bytes().unwrap();
    let version = model.store().version();

    let other = Anfis::new(&spec(2, 3, "gaussian"), ComputeContext::Cpu).unwrap();
    assert_eq!(other.from_bytes(&bytes).unwrap_err().kind(), ErrorKind::Shape);
    assert_eq!(other.store().version(), 0);

    // 族不同（缺少 slopes）
    let bell = Anfis::new(&spec(2, 2, "bell"), ComputeContext::Cpu).unwrap();
    assert_eq!(bell.from_bytes(&bytes).unwrap_err().kind(), ErrorKind::Shape);
    assert_eq!(model.store().version(), version);
}

#[test]
fn test_save_and_load_params_file() {
    let model = trained_like("bell");
    let path = std::env::temp_dir().join("only_anfis_unit_params.bin");
    model.save_params(&path).unwrap();

    let fresh = Anfis::new(model.spec(), ComputeContext::Cpu).unwrap();
    fresh.load_params(&path).unwrap();
    assert_eq!(*fresh.snapshot(), *model.snapshot());
    fs::remove_file(&path).unwrap();

    let err = fresh.load_params(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn test_save_and_load_model() {
    let model = trained_like("gaussian");
    let base = std::env::temp_dir().join("only_anfis_unit_model");
    model.save_model(&base).unwrap();

    let json = fs::read_to_string(base.with_extension("json")).unwrap();
    assert!(json.contains("\"params_file\": \"only_anfis_unit_model.bin\""));
    assert!(json.contains("\"memb_func\": \"gaussian\""));

    let loaded = Anfis::load_model(&base, ComputeContext::CpuParallel).unwrap();
    assert_eq!(loaded.spec(), model.spec());
    assert_eq!(loaded.context(), ComputeContext::CpuParallel);
    let x = sample_inputs(12, 2);
    assert_eq!(loaded.predict(x.view()).unwrap(), model.predict(x.view()).unwrap());

    fs::remove_file(base.with_extension("json")).unwrap();
    fs::remove_file(base.with_extension("bin")).unwrap();
}

/// 带点号的模型名：后缀追加在后面，不覆盖同目录下同名前缀的其他模型
#[test]
fn test_save_model_keeps_dotted_name() {
    let dir = std::env::temp_dir();
    let other = Anfis::new(&spec(2, 2, "gaussian"), ComputeContext::Cpu).unwrap();
    other.save_model(dir.join("only_anfis_dotted")).unwrap();

    let model = trained_like("bell");
    let base = dir.join("only_anfis_dotted.v2");
    model.save_model(&base).unwrap();
    let json_path = dir.join("only_anfis_dotted.v2.json");
    let bin_path = dir.join("only_anfis_dotted.v2.bin");
    assert!(json_path.exists());
    assert!(bin_path.exists());
    let json = fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"params_file\": \"only_anfis_dotted.v2.bin\""));

    // 先保存的模型没有被覆盖
    let untouched = Anfis::load_model(dir.join("only_anfis_dotted"), ComputeContext::Cpu).unwrap();
    assert_eq!(*untouched.snapshot(), *other.snapshot());
    let loaded = Anfis::load_model(&base, ComputeContext::Cpu).unwrap();
    assert_eq!(*loaded.snapshot(), *model.snapshot());

    for file in [
        json_path,
        bin_path,
        dir.join("only_anfis_dotted.json"),
        dir.join("only_anfis_dotted.bin"),
    ] {
        fs::remove_file(file).unwrap();
    }
}
