//! Vector distance utilities.
//!
//! Pure-Rust implementations of the metrics a precedent index can be built
//! with. Every metric is exposed as a *distance*: smaller is closer, so search
//! results are always ordered by non-decreasing distance.

use serde::{Deserialize, Serialize};

/// The metric an index was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Euclidean distance (flat L2 index)
    #[default]
    L2,
    /// Negated inner product (flat IP index)
    InnerProduct,
}

impl Metric {
    /// Distance between two equal-length vectors under this metric.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => squared_l2(a, b),
            Metric::InnerProduct => -dot(a, b),
        }
    }
}

/// Squared Euclidean distance, accumulated in f64.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>() as f32
}

/// Inner product, accumulated in f64.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum::<f64>() as f32
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm < 1e-10 {
        return;
    }
    for x in v.iter_mut() {
        *x = (*x as f64 / norm) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_l2_known_value() {
        // (1-4)^2 + (2-6)^2 = 9 + 16 = 25
        assert!((squared_l2(&[1.0, 2.0], &[4.0, 6.0]) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn l2_identical_is_zero() {
        let v = [0.3, -0.7, 1.5];
        assert_eq!(Metric::L2.distance(&v, &v), 0.0);
    }

    #[test]
    fn inner_product_distance_prefers_aligned_vectors() {
        let q = [1.0, 0.0];
        let aligned = Metric::InnerProduct.distance(&q, &[1.0, 0.0]);
        let orthogonal = Metric::InnerProduct.distance(&q, &[0.0, 1.0]);
        assert!(aligned < orthogonal);
    }

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector() {
        let mut v = vec![0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn metric_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Metric::InnerProduct).unwrap(), "\"inner_product\"");
        let m: Metric = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(m, Metric::L2);
    }
}
