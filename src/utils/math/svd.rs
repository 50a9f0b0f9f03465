use std::cmp::Ordering;

use tracing::warn;

use super::matrix::DenseMatrix;
use super::vector::{dot, norm};

/// 1 sweep で回転しない列ペアの判定に使う相対トレランス
const ORTHOGONALITY_TOLERANCE: f64 = 1e-15;
/// sweep 上限 (通常は 10 前後で収束する)
const MAX_SWEEPS: usize = 64;

/// Singular value decomposition `A = U * diag(s) * Vt`
///
/// Computed with one-sided Jacobi rotations, which is exact to working
/// precision and needs no random start. All `p = min(rows, cols)` singular
/// triplets are kept:
/// - `u`: rows x p, left singular vectors as columns
/// - `singular_values`: p values, non-negative, sorted descending
/// - `vt`: p x cols, right singular vectors as rows
///
/// A singular value below the numerical rank cutoff is stored as exactly
/// `0.0`. Its vector on the normalized side is filled in by Gram-Schmidt so
/// both `u` and `vt` keep orthonormal columns/rows. Only an all-zero input
/// produces all-zero factors.
#[derive(Debug, Clone)]
pub struct Svd {
    pub u: DenseMatrix<f64>,
    pub singular_values: Vec<f64>,
    pub vt: DenseMatrix<f64>,
    /// sweep 数 (診断用)
    pub sweeps: usize,
    pub converged: bool,
}

impl Svd {
    /// Decompose `a`
    pub fn decompose(a: &DenseMatrix<f64>) -> Self {
        let (m, n) = a.shape();
        let p = m.min(n);

        if p == 0 || a.is_zero() {
            return Self {
                u: DenseMatrix::zeros(m, p),
                singular_values: vec![0.0; p],
                vt: DenseMatrix::zeros(p, n),
                sweeps: 0,
                converged: true,
            };
        }

        // 縦長 (m >= n) はそのまま列を直交化、横長は転置して同じことをする
        let tall = m >= n;
        let work_src = if tall { a.clone() } else { a.transpose() };
        let (work_rows, work_cols) = work_src.shape();
        let columns: Vec<Vec<f64>> = (0..work_cols).map(|c| work_src.column(c).collect()).collect();

        let jacobi = one_sided_jacobi(columns, work_cols);
        if !jacobi.converged {
            warn!(sweeps = jacobi.sweeps, "jacobi svd hit the sweep limit before full convergence");
        }

        let mut sigma: Vec<f64> = jacobi.work.iter().map(|c| norm(c)).collect();
        let sigma_max = sigma.iter().cloned().fold(0.0_f64, f64::max);
        let cutoff = sigma_max * (m.max(n) as f64) * f64::EPSILON;
        for s in sigma.iter_mut() {
            if *s <= cutoff {
                *s = 0.0;
            }
        }

        // 降順に並べ替え (安定ソートなので同値は元の列順)
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&i, &j| sigma[j].partial_cmp(&sigma[i]).unwrap_or(Ordering::Equal));

        // normalized: work 列 / sigma, rotation: 回転行列 V の列
        let mut normalized = DenseMatrix::zeros(work_rows, p);
        let mut rotation = DenseMatrix::zeros(work_cols, p);
        let mut singular_values = Vec::with_capacity(p);
        for (dst, &src) in order.iter().enumerate() {
            let s = sigma[src];
            singular_values.push(s);
            if s > 0.0 {
                for (r, v) in jacobi.work[src].iter().enumerate() {
                    normalized[(r, dst)] = v / s;
                }
            }
            for (r, v) in jacobi.rotation[src].iter().enumerate() {
                rotation[(r, dst)] = *v;
            }
        }

        let null_columns: Vec<usize> = (0..p).filter(|&c| singular_values[c] == 0.0).collect();
        complete_orthonormal(&mut normalized, &null_columns);

        let (mut u, mut v) = if tall {
            (normalized, rotation)
        } else {
            (rotation, normalized)
        };
        canonicalize_signs(&mut u, &mut v);

        Self {
            u,
            singular_values,
            vt: v.transpose(),
            sweeps: jacobi.sweeps,
            converged: jacobi.converged,
        }
    }

    /// Number of stored singular triplets
    pub fn len(&self) -> usize {
        self.singular_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.singular_values.is_empty()
    }

    /// Leading `k` triplets: `(U_k, s_k, Vt_k)`
    pub fn truncate(&self, k: usize) -> (DenseMatrix<f64>, Vec<f64>, DenseMatrix<f64>) {
        let k = k.min(self.len());
        (
            self.u.sub_matrix(0, self.u.rows(), 0, k),
            self.singular_values[..k].to_vec(),
            self.vt.sub_matrix(0, k, 0, self.vt.cols()),
        )
    }

    /// `U * diag(s) * Vt`
    pub fn reconstruct(&self) -> DenseMatrix<f64> {
        self.u
            .scale_columns(&self.singular_values)
            .matmul(&self.vt)
    }
}

struct JacobiResult {
    work: Vec<Vec<f64>>,
    rotation: Vec<Vec<f64>>,
    sweeps: usize,
    converged: bool,
}

/// 列同士が直交するまで 2 列ずつ回転する
/// 回転は `rotation` (最初は単位行列) にも同じものを適用する
fn one_sided_jacobi(mut work: Vec<Vec<f64>>, n: usize) -> JacobiResult {
    let mut rotation: Vec<Vec<f64>> = (0..n)
        .map(|c| {
            let mut col = vec![0.0; n];
            col[c] = 1.0;
            col
        })
        .collect();

    for sweep in 1..=MAX_SWEEPS {
        let mut rotated = false;
        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                let alpha = dot(&work[i], &work[i]);
                let beta = dot(&work[j], &work[j]);
                let gamma = dot(&work[i], &work[j]);
                if gamma == 0.0 || gamma.abs() <= ORTHOGONALITY_TOLERANCE * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + zeta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = c * t;

                rotate_pair(&mut work, i, j, c, s);
                rotate_pair(&mut rotation, i, j, c, s);
            }
        }
        if !rotated {
            return JacobiResult { work, rotation, sweeps: sweep, converged: true };
        }
    }

    JacobiResult { work, rotation, sweeps: MAX_SWEEPS, converged: false }
}

#[inline]
fn rotate_pair(columns: &mut [Vec<f64>], i: usize, j: usize, c: f64, s: f64) {
    debug_assert!(i < j);
    let (left, right) = columns.split_at_mut(j);
    let ci = &mut left[i];
    let cj = &mut right[0];
    for (x, y) in ci.iter_mut().zip(cj.iter_mut()) {
        let (a, b) = (*x, *y);
        *x = c * a - s * b;
        *y = s * a + c * b;
    }
}

/// σ = 0 の列を、他の列と直交する単位ベクトルで埋める
/// 候補は標準基底 e_i で、既存列を 2 回射影して除いた残りが最も長いものを採る
fn complete_orthonormal(basis: &mut DenseMatrix<f64>, null_columns: &[usize]) {
    let rows = basis.rows();
    let mut filled: Vec<Vec<f64>> = (0..basis.cols())
        .filter(|c| !null_columns.contains(c))
        .map(|c| basis.column(c).collect())
        .collect();

    for &col in null_columns {
        let candidate = (0..rows)
            .map(|i| {
                let mut e = vec![0.0; rows];
                e[i] = 1.0;
                for _ in 0..2 {
                    for q in &filled {
                        let d = dot(&e, q);
                        for (x, &y) in e.iter_mut().zip(q) {
                            *x -= d * y;
                        }
                    }
                }
                let len = norm(&e);
                (e, len)
            })
            .fold(None, |best: Option<(Vec<f64>, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        let Some((mut e, len)) = candidate else {
            continue;
        };
        if len <= f64::EPSILON {
            continue;
        }
        for x in e.iter_mut() {
            *x /= len;
        }
        for (r, &x) in e.iter().enumerate() {
            basis[(r, col)] = x;
        }
        filled.push(e);
    }
}

/// 符号の任意性を消して出力を再現可能にする
/// 各 triplet で絶対値最大の成分が正になるよう u 列と v 列を同時に反転する
fn canonicalize_signs(u: &mut DenseMatrix<f64>, v: &mut DenseMatrix<f64>) {
    for c in 0..u.cols() {
        let pivot = u
            .column(c)
            .chain(v.column(c))
            .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
        if pivot < 0.0 {
            for r in 0..u.rows() {
                u[(r, c)] = -u[(r, c)];
            }
            for r in 0..v.rows() {
                v[(r, c)] = -v[(r, c)];
            }
        }
    }
}
