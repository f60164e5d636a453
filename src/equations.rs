/// Eigenvalue ratios characterizing the shape of a uniaxial Raman tensor.
///
/// `r1` and `r2` are two eigenvalues of the mode's polarizability tensor
/// normalized by a third, as produced by the `tensor` module or measured
/// upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorRatios {
    pub r1: f64,
    pub r2: f64,
}

/// Model intensity ratios at one orientation: I_cc/I_aa and I_ac/I_aa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioPair {
    pub cc_aa: f64,
    pub ac_aa: f64,
}

/// Denominators smaller than this count as degenerate orientations.
const DEGENERATE_EPS: f64 = 1e-12;

impl TensorRatios {
    pub fn new(r1: f64, r2: f64) -> Self {
        Self { r1, r2 }
    }

    /// Evaluate both model ratios at an orientation given in radians.
    ///
    /// Returns `None` when the shared denominator degenerates (or either
    /// ratio comes out non-finite), so callers never see a division fault
    /// or a NaN that could leak into a comparison.
    pub fn evaluate(&self, theta: f64, chi: f64) -> Option<RatioPair> {
        let sin2_t = theta.sin().powi(2);
        let cos2_t = theta.cos().powi(2);
        let sin2_c = chi.sin().powi(2);
        let cos2_c = chi.cos().powi(2);

        // Mixed in-plane eigenvalue term shared by both ratios.
        let mixed = self.r1 * cos2_c + self.r2 * sin2_c;

        let denom = cos2_t * mixed + (self.r1 * sin2_c + self.r2 * cos2_c) + sin2_t;
        if denom.abs() < DEGENERATE_EPS {
            return None;
        }
        let denom_sq = denom * denom;

        let cc_aa = 4.0 * (sin2_t * mixed + cos2_t).powi(2) / denom_sq;
        let ac_aa = 2.0
            * (sin2_t * cos2_t * (mixed - 1.0).powi(2)
                + sin2_t * sin2_c * cos2_c * (self.r1 - self.r2).powi(2))
            / denom_sq;

        if !cc_aa.is_finite() || !ac_aa.is_finite() {
            return None;
        }

        Some(RatioPair { cc_aa, ac_aa })
    }
}
