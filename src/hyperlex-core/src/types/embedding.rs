//! Dense embedding vectors and the arithmetic shared by queries, coarsening
//! and message passing.
//!
//! Embeddings are stored as plain `Vec<f32>`; the arithmetic borrows them as
//! `ndarray` views.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;

use common_error::{HyperlexError, HyperlexResult};

/// Fixed-length real-valued node state.
pub type Embedding = Vec<f32>;

/// Added to norms before dividing, so zero vectors yield similarity 0.
const NORM_EPSILON: f32 = 1e-8;

/// Dot product over the common prefix of two vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    ArrayView1::from(&a[..n]).dot(&ArrayView1::from(&b[..n]))
}

/// Euclidean norm.
pub fn norm(a: &[f32]) -> f32 {
    let v = ArrayView1::from(a);
    v.dot(&v).sqrt()
}

/// Cosine similarity in `[-1, 1]`; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> HyperlexResult<f32> {
    if a.len() != b.len() {
        return Err(HyperlexError::dimension_mismatch(a.len(), b.len()));
    }
    let denom = norm(a) * norm(b);
    if denom < NORM_EPSILON {
        return Ok(0.0);
    }
    Ok((dot(a, b) / denom).clamp(-1.0, 1.0))
}

/// Check every vector has the same length and return it.
///
/// An empty slice is an `InvalidArgument`: there is no dimension to report.
pub fn ensure_same_dim<V: AsRef<[f32]>>(vectors: &[V]) -> HyperlexResult<usize> {
    let first = vectors
        .first()
        .ok_or_else(|| HyperlexError::invalid_argument("no embeddings supplied"))?;
    let dim = first.as_ref().len();
    for v in vectors {
        if v.as_ref().len() != dim {
            return Err(HyperlexError::dimension_mismatch(dim, v.as_ref().len()));
        }
    }
    Ok(dim)
}

/// Stack equally sized vectors as the rows of a matrix.
pub fn stack_rows<V: AsRef<[f32]>>(vectors: &[V]) -> HyperlexResult<Array2<f32>> {
    let dim = ensure_same_dim(vectors)?;
    Ok(Array2::from_shape_fn((vectors.len(), dim), |(i, j)| {
        vectors[i].as_ref()[j]
    }))
}

/// Elementwise mean of equally sized vectors.
pub fn mean<V: AsRef<[f32]>>(vectors: &[V]) -> HyperlexResult<Embedding> {
    stack_rows(vectors)?
        .mean_axis(Axis(0))
        .map(|m| m.to_vec())
        .ok_or_else(|| HyperlexError::invalid_argument("no embeddings supplied"))
}

/// `dim` samples from `N(0, std²)` drawn from `rng`.
///
/// A negative or non-finite `std` yields zeros.
pub fn random_normal<R: Rng + ?Sized>(dim: usize, std: f32, rng: &mut R) -> Embedding {
    match Normal::new(0.0f32, std) {
        Ok(normal) => Array1::random_using(dim, normal, rng).to_vec(),
        Err(_) => vec![0.0; dim],
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert_abs_diff_eq!(cosine_similarity(&a, &a).unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cosine_similarity(&a, &b).unwrap(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            cosine_similarity(&a, &[-2.0, 0.0]).unwrap(),
            -1.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            HyperlexError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_mean() {
        let m = mean(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m, vec![2.0, 3.0]);
        assert!(mean::<Vec<f32>>(&[]).is_err());
        assert!(mean(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_stack_rows_and_dot() {
        let m = stack_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[1, 0]], 4.0);
        assert!(stack_rows(&[vec![1.0], vec![]]).is_err());

        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        // only the common prefix contributes
        assert_eq!(dot(&[1.0, 2.0, 9.0], &[3.0, 4.0]), 11.0);
        assert_abs_diff_eq!(norm(&[3.0, 4.0]), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_random_normal_is_seeded() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let a = random_normal(16, 0.1, &mut ChaCha8Rng::seed_from_u64(5));
        let b = random_normal(16, 0.1, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| x.abs() < 1.0));
        assert_eq!(
            random_normal(4, -1.0, &mut ChaCha8Rng::seed_from_u64(5)),
            vec![0.0; 4]
        );
    }
}
