//! Cosine similarity
//!
//! Scores are clamped to `[0, 1]`: the knowledge namespaces only care about
//! "how close", and downstream thresholds assume a non-negative score. A
//! zero-norm vector scores `0.0` instead of dividing by zero.

/// Clamped cosine similarity over vectors of equal width.
///
/// COMPAT: when the widths differ, similarity is computed over the shorter
/// common prefix of both vectors. Embeddings are occasionally re-generated
/// with a newer, differently-sized model without a migration pass, and a
/// mixed-width namespace must keep answering queries. Prefix truncation is
/// numerically questionable (embedding dimensions are not nested in
/// general) and exists for compatibility only; reject mixed widths here if
/// that compatibility is ever dropped.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }

    let a = &a[..len];
    let b = &b[..len];

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for i in 0..len {
        let (x, y) = (a[i] as f64, b[i] as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    cosine.clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn test_cosine_self_is_one() {
        let v = vec![0.3, -0.7, 0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cosine_negation_clamps_to_zero() {
        let v = vec![0.5, -0.1, 0.8];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();

        // Raw cosine would be -1.0; the clamping rule pins it at 0.0.
        assert_eq!(cosine_similarity(&v, &neg), 0.0);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < TOLERANCE);
    }

    #[test]
    fn test_zero_norm_yields_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let v = vec![1.0, 2.0, 3.0];

        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_empty_vectors_yield_zero() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_mixed_widths_use_common_prefix() {
        let short = vec![0.4, 0.6];
        let long = vec![0.4, 0.6, 0.9, -0.2];

        // Identical over the shared prefix, so the score is ~1.0.
        assert!((cosine_similarity(&short, &long) - 1.0).abs() < TOLERANCE);

        let expected = cosine_similarity(&short, &long[..2]);
        assert!((cosine_similarity(&long, &short) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_scaling_invariance() {
        let a = vec![0.1, 0.2, 0.3];
        let scaled: Vec<f32> = a.iter().map(|x| x * 7.5).collect();

        assert!((cosine_similarity(&a, &scaled) - 1.0).abs() < TOLERANCE);
    }
}
