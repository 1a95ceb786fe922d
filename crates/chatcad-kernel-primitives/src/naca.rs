//! NACA 4-digit airfoil profile sampling.
//!
//! Standard open-trailing-edge thickness polynomial with the classic
//! coefficients (0.2969, -0.1260, -0.3516, 0.2843, -0.1015) and the
//! two-piece camber line keyed by the first two digits. Chordwise stations
//! use cosine spacing for leading/trailing edge resolution.

use crate::{invalid, PrimitiveError};
use std::f64::consts::PI;

/// Parsed NACA 4-digit parameters, as fractions of chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Naca4 {
    /// Maximum camber (first digit / 100).
    pub max_camber: f64,
    /// Chordwise position of maximum camber (second digit / 10).
    pub camber_position: f64,
    /// Maximum thickness (last two digits / 100).
    pub thickness: f64,
}

impl Naca4 {
    /// Parse a 4-digit designation like "0012" or "2412".
    pub fn parse(code: &str) -> Result<Self, PrimitiveError> {
        let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
        if code.len() != 4 || digits.len() != 4 {
            return Err(invalid(
                "naca_code",
                format!("expected 4 digits, got {code:?}"),
            ));
        }
        let thickness = (digits[2] * 10 + digits[3]) as f64 / 100.0;
        if thickness == 0.0 {
            return Err(invalid("naca_code", "zero thickness profile is degenerate"));
        }
        Ok(Self {
            max_camber: digits[0] as f64 / 100.0,
            camber_position: digits[1] as f64 / 10.0,
            thickness,
        })
    }

    /// True when the profile has no camber line.
    pub fn is_symmetric(&self) -> bool {
        self.max_camber == 0.0 || self.camber_position == 0.0
    }

    /// Half-thickness at chord fraction `xc` in [0, 1].
    pub fn half_thickness(&self, xc: f64) -> f64 {
        5.0 * self.thickness
            * (0.2969 * xc.sqrt() - 0.1260 * xc - 0.3516 * xc * xc + 0.2843 * xc.powi(3)
                - 0.1015 * xc.powi(4))
    }

    /// Camber line height and slope at chord fraction `xc`.
    pub fn camber(&self, xc: f64) -> (f64, f64) {
        if self.is_symmetric() {
            return (0.0, 0.0);
        }
        let (m, p) = (self.max_camber, self.camber_position);
        if xc <= p {
            (
                m * (2.0 * p * xc - xc * xc) / (p * p),
                2.0 * m * (p - xc) / (p * p),
            )
        } else {
            (
                m * ((1.0 - 2.0 * p) + 2.0 * p * xc - xc * xc) / ((1.0 - p) * (1.0 - p)),
                2.0 * m * (p - xc) / ((1.0 - p) * (1.0 - p)),
            )
        }
    }
}

/// Sample the closed profile polygon for a NACA 4-digit airfoil.
///
/// Returns a simple CCW polygon in chord/thickness coordinates: the lower
/// surface from leading to trailing edge, then the upper surface back from
/// trailing to leading edge. The open trailing edge closes across the
/// small TE gap, keeping the polygon (and any extrusion of it) watertight.
pub fn naca4_profile(
    code: &str,
    chord_length: f64,
    samples: usize,
) -> Result<Vec<(f64, f64)>, PrimitiveError> {
    let naca = Naca4::parse(code)?;

    let mut upper = Vec::with_capacity(samples);
    let mut lower = Vec::with_capacity(samples);
    for i in 0..samples {
        // Cosine spacing clusters stations at both edges.
        let beta = PI * i as f64 / (samples - 1) as f64;
        let xc = (1.0 - beta.cos()) / 2.0;
        let yt = naca.half_thickness(xc);
        let (yc, dyc) = naca.camber(xc);
        let theta = dyc.atan();
        upper.push((
            chord_length * (xc - yt * theta.sin()),
            chord_length * (yc + yt * theta.cos()),
        ));
        lower.push((
            chord_length * (xc + yt * theta.sin()),
            chord_length * (yc - yt * theta.cos()),
        ));
    }

    // CCW loop: lower LE→TE, upper TE→LE. The two surfaces meet exactly at
    // the leading edge (x = 0, yt = 0), so the duplicate LE point is
    // skipped.
    let mut polygon = lower;
    polygon.extend(upper.into_iter().skip(1).rev());
    Ok(polygon)
}
