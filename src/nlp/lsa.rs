//! Latent semantic analysis: rank sentences by how strongly they load on the
//! main "topics" of a text.
//!
//! We build a term-by-sentence matrix of smoothed term frequencies, take its
//! singular value decomposition, and give each sentence the length of its
//! row of `V` weighted by the squared singular values. The SVD comes from a
//! Jacobi eigen-decomposition of the smaller of `AᵀA` and `AAᵀ`, which is
//! plenty for documents of a few thousand sentences.

use std::collections::HashMap;

use crate::prelude::*;

/// Always keep at least this many topic dimensions.
const MIN_DIMENSIONS: usize = 3;

/// Fraction of topic dimensions to keep.
const REDUCTION_RATIO: f64 = 1.0;

/// Weight given to a term merely appearing in a sentence.
const SMOOTHING: f64 = 0.4;

/// Give up on the eigen-decomposition after this many sweeps.
const MAX_SWEEPS: usize = 64;

/// Stop once the off-diagonal part is this small relative to the whole.
const TOLERANCE: f64 = 1e-12;

/// A dense row-major matrix.
#[derive(Clone, Debug, PartialEq)]
struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t[(c, r)] = self[(r, c)];
            }
        }
        t
    }

    /// `selfᵀ · self`.
    fn gram(&self) -> Self {
        let mut g = Self::zeros(self.cols, self.cols);
        for i in 0..self.cols {
            for j in i..self.cols {
                let dot: f64 = (0..self.rows).map(|r| self[(r, i)] * self[(r, j)]).sum();
                g[(i, j)] = dot;
                g[(j, i)] = dot;
            }
        }
        g
    }

    fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn off_diagonal_norm(&self) -> f64 {
        let mut sum = 0.0_f64;
        for r in 0..self.rows {
            for c in 0..self.cols {
                if r != c {
                    sum += self[(r, c)] * self[(r, c)];
                }
            }
        }
        sum.sqrt()
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.data[r * self.cols + c]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.data[r * self.cols + c]
    }
}

/// Rank each sentence, given the words of each sentence.
///
/// Returns one non-negative rank per sentence. Sentences without words rank
/// 0. Fails if there are no words at all, or if the decomposition does not
/// converge.
pub fn sentence_ranks(sentences: &[Vec<String>]) -> Result<Vec<f64>> {
    let matrix = term_frequencies(sentences)?;
    let (terms, sentence_count) = (matrix.rows, matrix.cols);
    trace!(terms, sentences = sentence_count, "Built term frequency matrix");

    let ranks = if sentence_count <= terms {
        // Eigenvectors of AᵀA are the right singular vectors V.
        let (values, vectors) = symmetric_eigen(matrix.gram())?;
        let dims = kept_dimensions(values.len());
        (0..sentence_count)
            .map(|s| {
                (0..dims)
                    .map(|i| values[i] * vectors[(s, i)] * vectors[(s, i)])
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    } else {
        // Eigenvectors of AAᵀ are the left singular vectors U, and
        // σᵢ·V[s][i] = (Aᵀuᵢ)[s].
        let transposed = matrix.transpose();
        let (values, vectors) = symmetric_eigen(transposed.gram())?;
        let dims = kept_dimensions(values.len());
        (0..sentence_count)
            .map(|s| {
                (0..dims)
                    .map(|i| {
                        let projection: f64 =
                            (0..terms).map(|t| matrix[(t, s)] * vectors[(t, i)]).sum();
                        projection * projection
                    })
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    };
    Ok(ranks)
}

/// How many of `singular_values` topic dimensions contribute to ranks.
fn kept_dimensions(singular_values: usize) -> usize {
    let reduced = (singular_values as f64 * REDUCTION_RATIO) as usize;
    reduced.max(MIN_DIMENSIONS).min(singular_values)
}

/// Build the smoothed term-by-sentence matrix.
///
/// Each column is scaled by its most frequent term, so a term appearing `n`
/// times in a sentence whose top term appears `max` times gets
/// `SMOOTHING + (1 - SMOOTHING) * n / max`. Columns of sentences without
/// words stay zero.
fn term_frequencies(sentences: &[Vec<String>]) -> Result<Matrix> {
    let mut vocabulary = HashMap::<&str, usize>::new();
    for word in sentences.iter().flatten() {
        let next = vocabulary.len();
        vocabulary.entry(word.as_str()).or_insert(next);
    }
    if vocabulary.is_empty() {
        bail!("no words to summarize");
    }

    let mut matrix = Matrix::zeros(vocabulary.len(), sentences.len());
    for (col, words) in sentences.iter().enumerate() {
        for word in words {
            matrix[(vocabulary[word.as_str()], col)] += 1.0;
        }
    }
    for col in 0..matrix.cols {
        let max = (0..matrix.rows)
            .map(|row| matrix[(row, col)])
            .fold(0.0, f64::max);
        if max > 0.0 {
            for row in 0..matrix.rows {
                let frequency = matrix[(row, col)] / max;
                matrix[(row, col)] = SMOOTHING + (1.0 - SMOOTHING) * frequency;
            }
        }
    }
    Ok(matrix)
}

/// Eigen-decomposition of a symmetric matrix using cyclic Jacobi rotations.
///
/// Returns the eigenvalues in decreasing order (negative round-off clamped to
/// zero), and a matrix whose columns are the matching unit eigenvectors.
fn symmetric_eigen(mut a: Matrix) -> Result<(Vec<f64>, Matrix)> {
    let n = a.rows;
    let mut v = Matrix::identity(n);
    let scale = a.frobenius_norm();
    if !scale.is_finite() {
        bail!("matrix contains non-finite values");
    }

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        if a.off_diagonal_norm() <= TOLERANCE * scale {
            converged = true;
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                if a[(p, q)] == 0.0 {
                    continue;
                }
                let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * a[(p, q)]);
                let t = if theta.abs() > 1e150 {
                    1.0 / (2.0 * theta)
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
    }
    if !converged {
        bail!("eigen-decomposition did not converge after {MAX_SWEEPS} sweeps");
    }

    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&i, &j| a[(j, j)].total_cmp(&a[(i, i)]));
    let values = order.iter().map(|&i| a[(i, i)].max(0.0)).collect();
    let mut vectors = Matrix::zeros(n, n);
    for (new, &old) in order.iter().enumerate() {
        for r in 0..n {
            vectors[(r, new)] = v[(r, old)];
        }
    }
    Ok((values, vectors))
}

/// Apply the rotation `Jᵀ·a·J` in the `(p, q)` plane, and accumulate `v·J`.
fn rotate(a: &mut Matrix, v: &mut Matrix, p: usize, q: usize, c: f64, s: f64) {
    let n = a.rows;
    for r in 0..n {
        let (arp, arq) = (a[(r, p)], a[(r, q)]);
        a[(r, p)] = c * arp - s * arq;
        a[(r, q)] = s * arp + c * arq;
    }
    for r in 0..n {
        let (apr, aqr) = (a[(p, r)], a[(q, r)]);
        a[(p, r)] = c * apr - s * aqr;
        a[(q, r)] = s * apr + c * aqr;
    }
    a[(p, q)] = 0.0;
    a[(q, p)] = 0.0;
    for r in 0..n {
        let (vrp, vrq) = (v[(r, p)], v[(r, q)]);
        v[(r, p)] = c * vrp - s * vrq;
        v[(r, q)] = s * vrp + c * vrq;
    }
}
