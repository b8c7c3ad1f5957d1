//! Moment statistics for a numeric column
//!
//! Estimators:
//! - std: sample standard deviation (ddof = 1)
//! - skew: adjusted Fisher-Pearson coefficient (G1), needs n >= 3
//! - kurtosis: bias-corrected excess kurtosis (G2), needs n >= 4
//!
//! A constant column has zero spread, skew and kurtosis. The noise cutoff
//! only feeds skew and kurtosis; std always uses the raw second moment.

/// Central sums below this are treated as floating point noise
const FP_NOISE: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
}

pub fn describe(values: &[f64]) -> Moments {
    let n = values.len();
    if n == 0 {
        return Moments::default();
    }

    let count = n as f64;
    let mean = values.iter().sum::<f64>() / count;

    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for value in values {
        let d = value - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let std = (n >= 2).then(|| (m2 / (count - 1.0)).sqrt());

    let m2 = zero_noise(m2);
    let m3 = zero_noise(m3);

    let skew = (n >= 3).then(|| {
        if m2 == 0.0 {
            0.0
        } else {
            (count * (count - 1.0).sqrt() / (count - 2.0)) * (m3 / m2.powf(1.5))
        }
    });

    let kurtosis = (n >= 4).then(|| {
        let numerator = zero_noise(count * (count + 1.0) * (count - 1.0) * m4);
        let denominator = zero_noise((count - 2.0) * (count - 3.0) * m2 * m2);
        if denominator == 0.0 {
            0.0
        } else {
            let adjustment = 3.0 * (count - 1.0).powi(2) / ((count - 2.0) * (count - 3.0));
            numerator / denominator - adjustment
        }
    });

    Moments { mean: Some(mean), std, skew, kurtosis }
}

fn zero_noise(value: f64) -> f64 {
    if value.abs() < FP_NOISE {
        0.0
    } else {
        value
    }
}
