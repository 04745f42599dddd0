use std::io::{Cursor, ErrorKind};

use arbor::tensor::Tensor;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn test_indexing() {
    let mut t: Tensor<f32, usize, 3> = Tensor::new(0.0, [2, 3, 4]);
    assert_eq!(t.size(), 24);
    assert_eq!(t.size_at(0), 2);
    assert_eq!(t.size_at(1), 3);
    assert_eq!(t.size_at(2), 4);
    assert_eq!(t.shape(), &[2, 3, 4]);
    assert_eq!(*t.at([0, 0, 0]), 0.0);
    *t.at_mut([1, 2, 3]) = 7.0;
    *t.at_mut([0, 1, 2]) = -1.0;
    assert_eq!(*t.at([1, 2, 3]), 7.0);
    assert_eq!(*t.at([0, 1, 2]), -1.0);
    assert_eq!(*t.at([1, 2, 2]), 0.0);
}

#[test]
#[should_panic]
fn test_indexing_out_of_range() {
    let t: Tensor<f32, usize, 2> = Tensor::new(0.0, [2, 2]);
    t.at([0, 2]);
}

#[test]
fn test_resize_and_fill() {
    let mut t: Tensor<f32, u16, 2> = Tensor::new(1.0, [2, 2]);
    t.fill(3.0);
    assert_eq!(*t.at([1, 1]), 3.0);
    t.resize(0.0, [3, 5]);
    assert_eq!(t.size(), 15);
    assert_eq!(t.size_at(0), 3);
    assert_eq!(*t.at([2, 4]), 0.0);
}

#[test]
fn test_marginal_sum() {
    let mut t: Tensor<f32, usize, 2> = Tensor::new(0.0, [2, 3]);
    let mut value = 1.0;
    for i in 0..2 {
        for j in 0..3 {
            *t.at_mut([i, j]) = value;
            value += 1.0;
        }
    }
    assert!(close(t.marginal_sum(0, 0), 6.0));
    assert!(close(t.marginal_sum(0, 1), 15.0));
    assert!(close(t.marginal_sum(1, 0), 5.0));
    assert!(close(t.marginal_sum(1, 1), 7.0));
    assert!(close(t.marginal_sum(1, 2), 9.0));
}

fn counts() -> Tensor<f32, usize, 2> {
    let mut t = Tensor::new(0.0, [2, 2]);
    *t.at_mut([0, 0]) = 2.0;
    *t.at_mut([1, 0]) = 1.0;
    *t.at_mut([1, 1]) = 3.0;
    t
}

#[test]
fn test_normalize() {
    let mut t = counts();
    t.normalize(1.0, 0);
    assert!(close(*t.at([0, 0]), 0.75));
    assert!(close(*t.at([0, 1]), 0.25));
    assert!(close(*t.at([1, 0]), 2.0 / 6.0));
    assert!(close(*t.at([1, 1]), 4.0 / 6.0));
    assert!(close(t.marginal_sum(0, 0), 1.0));
    assert!(close(t.marginal_sum(0, 1), 1.0));

    let mut t = counts();
    t.normalize(1.0, 1);
    assert!(close(*t.at([0, 0]), 0.6));
    assert!(close(*t.at([1, 0]), 0.4));
    assert!(close(*t.at([0, 1]), 0.2));
    assert!(close(*t.at([1, 1]), 0.8));
    assert!(close(t.marginal_sum(1, 0), 1.0));
    assert!(close(t.marginal_sum(1, 1), 1.0));
}

#[test]
fn test_normalize_log() {
    let mut t = counts();
    t.normalize_log(1.0, 0);
    assert!(close(*t.at([0, 0]), (3.0f32).ln() - (4.0f32).ln()));
    assert!(close(*t.at([0, 1]), (1.0f32).ln() - (4.0f32).ln()));
    assert!(close(*t.at([1, 0]), (2.0f32).ln() - (6.0f32).ln()));
    assert!(close(*t.at([1, 1]), (4.0f32).ln() - (6.0f32).ln()));
    // each group exponentiates back to a distribution
    for i in 0..2 {
        let total: f32 = (0..2).map(|j| t.at([i, j]).exp()).sum();
        assert!(close(total, 1.0));
    }
}

#[test]
fn test_normalize_log_zero_counts() {
    let mut t: Tensor<f32, usize, 2> = Tensor::new(0.0, [2, 2]);
    t.normalize_log(0.5, 0);
    // uniform: ln(0.5) - ln(1.0)
    assert!(close(*t.at([0, 0]), (0.5f32).ln()));
    assert!(close(*t.at([1, 1]), (0.5f32).ln()));
}

#[test]
fn test_binary_roundtrip() {
    let mut t: Tensor<f32, u16, 2> = Tensor::new(0.0, [2, 2]);
    *t.at_mut([0, 1]) = 1.5;
    *t.at_mut([1, 0]) = -2.5;
    let mut bytes = Vec::new();
    t.save_binary(&mut bytes).unwrap();
    // arity byte, two u16 extents, four f32 cells
    assert_eq!(bytes.len(), 1 + 4 + 16);

    let mut restored: Tensor<f32, u16, 2> = Tensor::new(0.0, [1, 1]);
    restored.load_binary(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(restored, t);
}

#[test]
fn test_binary_extent_width_follows_index_type() {
    let t: Tensor<f32, usize, 1> = Tensor::new(0.0, [3]);
    let mut bytes = Vec::new();
    t.save_binary(&mut bytes).unwrap();
    // usize extents are stored as u64
    assert_eq!(bytes.len(), 1 + 8 + 12);
}

#[test]
fn test_binary_rejects_arity_mismatch() {
    let t: Tensor<f32, u16, 2> = Tensor::new(0.0, [2, 2]);
    let mut bytes = Vec::new();
    t.save_binary(&mut bytes).unwrap();
    let mut target: Tensor<f32, u16, 3> = Tensor::new(0.0, [1, 1, 1]);
    let err = target.load_binary(&mut Cursor::new(&bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_binary_rejects_zero_extent() {
    let t: Tensor<f32, u16, 2> = Tensor::new(0.0, [0, 2]);
    let mut bytes = Vec::new();
    t.save_binary(&mut bytes).unwrap();
    let mut target: Tensor<f32, u16, 2> = Tensor::new(0.0, [1, 1]);
    let err = target.load_binary(&mut Cursor::new(&bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_binary_rejects_truncation() {
    let t: Tensor<f32, u16, 2> = Tensor::new(1.0, [2, 2]);
    let mut bytes = Vec::new();
    t.save_binary(&mut bytes).unwrap();
    bytes.truncate(bytes.len() - 2);
    let mut target: Tensor<f32, u16, 2> = Tensor::new(0.0, [1, 1]);
    let err = target.load_binary(&mut Cursor::new(&bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}
