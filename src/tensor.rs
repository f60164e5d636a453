use clap::ValueEnum;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::equations::TensorRatios;
use crate::search::Targets;

/// The six independent components of one mode's symmetric Raman tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorComponents {
    pub axx: f64,
    pub axy: f64,
    pub ayy: f64,
    pub axz: f64,
    pub ayz: f64,
    pub azz: f64,
}

/// How eigenvalues are ordered before forming the r1/r2 ratios.
///
/// The decomposition's native order carries no physical meaning, so the
/// mapping from eigenvalues to r1/r2 is an explicit choice rather than an
/// accident of the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EigenOrder {
    /// Whatever order the eigen-decomposition yields.
    #[default]
    Solver,
    /// Ascending by value.
    Ascending,
    /// Ascending by absolute value.
    Magnitude,
}

/// Measured intensities for the aa, ac and cc polarization geometries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensities {
    pub aa: f64,
    pub ac: f64,
    pub cc: f64,
}

#[derive(Debug, Error)]
pub enum TensorError {
    #[error("tensor component {name} must be finite, got {value}")]
    NonFiniteComponent { name: &'static str, value: f64 },

    #[error("reference eigenvalue is zero; eigenvalue ratios are undefined")]
    ZeroReferenceEigenvalue,

    #[error("reference intensity I/aa is zero; intensity ratios are undefined")]
    ZeroReferenceIntensity,
}

impl TensorComponents {
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.axx, self.axy, self.axz, //
            self.axy, self.ayy, self.ayz, //
            self.axz, self.ayz, self.azz,
        )
    }

    /// Eigenvalues of the tensor in the requested order.
    pub fn eigenvalues(&self, order: EigenOrder) -> Result<[f64; 3], TensorError> {
        self.validate()?;
        let eigen = self.matrix().symmetric_eigen();
        let mut values = [
            eigen.eigenvalues[0],
            eigen.eigenvalues[1],
            eigen.eigenvalues[2],
        ];
        match order {
            EigenOrder::Solver => {}
            EigenOrder::Ascending => values.sort_by(f64::total_cmp),
            EigenOrder::Magnitude => values.sort_by(|a, b| a.abs().total_cmp(&b.abs())),
        }
        Ok(values)
    }

    /// Eigenvalue ratios r1 = l0/l2, r2 = l1/l2 under the given ordering.
    pub fn ratios(&self, order: EigenOrder) -> Result<TensorRatios, TensorError> {
        eigenvalue_ratios(self.eigenvalues(order)?)
    }

    fn validate(&self) -> Result<(), TensorError> {
        for (name, value) in [
            ("Axx", self.axx),
            ("Axy", self.axy),
            ("Ayy", self.ayy),
            ("Axz", self.axz),
            ("Ayz", self.ayz),
            ("Azz", self.azz),
        ] {
            if !value.is_finite() {
                return Err(TensorError::NonFiniteComponent { name, value });
            }
        }
        Ok(())
    }
}

/// Form r1 and r2 by normalizing the first two eigenvalues to the third.
pub fn eigenvalue_ratios(values: [f64; 3]) -> Result<TensorRatios, TensorError> {
    let reference = values[2];
    if reference == 0.0 {
        return Err(TensorError::ZeroReferenceEigenvalue);
    }
    let ratios = TensorRatios::new(values[0] / reference, values[1] / reference);
    if !ratios.r1.is_finite() || !ratios.r2.is_finite() {
        return Err(TensorError::ZeroReferenceEigenvalue);
    }
    Ok(ratios)
}

impl Intensities {
    /// Intensity ratios I_1 = I_cc/I_aa, I_2 = I_ac/I_aa.
    pub fn targets(&self) -> Result<Targets, TensorError> {
        if self.aa == 0.0 {
            return Err(TensorError::ZeroReferenceIntensity);
        }
        Ok(Targets {
            cc_aa: self.cc / self.aa,
            ac_aa: self.ac / self.aa,
        })
    }
}
