use num::Float;

/// dot積
/// d(a, b) = Σ(a_i * b_i)
#[inline]
pub fn dot<N: Float>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len(), "Vectors must be of the same length to compute dot product.");
    a.iter()
        .zip(b)
        .fold(N::zero(), |acc, (&x, &y)| acc + x * y)
}

/// L2 norm
/// ||a|| = sqrt(Σ(a_i^2))
#[inline]
pub fn norm<N: Float>(a: &[N]) -> N {
    dot(a, a).sqrt()
}

/// コサイン類似度
/// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
///
/// どちらかの norm が厳密に 0 なら定義されないので `None`
#[inline]
pub fn cosine_similarity<N: Float>(a: &[N], b: &[N]) -> Option<N> {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a.is_zero() || norm_b.is_zero() {
        return None;
    }
    Some(dot(a, b) / (norm_a * norm_b))
}

/// `acc += v`
#[inline]
pub fn add_assign<N: Float>(acc: &mut [N], v: &[N]) {
    debug_assert_eq!(acc.len(), v.len());
    for (a, &x) in acc.iter_mut().zip(v) {
        *a = *a + x;
    }
}
