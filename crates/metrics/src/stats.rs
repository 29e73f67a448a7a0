//! Two-sample statistics for campaign comparison.
//!
//! Implements the standard independent two-sample t-test with pooled
//! variance and a two-tailed p-value from the regularized incomplete beta
//! function. Everything here is total: degenerate inputs yield `None`
//! rather than NaN or a panic.

use std::f64::consts::PI;

/// Result of an independent two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTTest {
    pub t: f64,
    pub p: f64,
    pub df: f64,
}

/// Student's two-sample t-test assuming equal variances.
///
/// Returns `None` when the statistic is undefined: an empty sample, fewer
/// than three observations in total, or zero pooled variance.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Option<TwoSampleTTest> {
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    if a.is_empty() || b.is_empty() || a.len() + b.len() < 3 {
        return None;
    }

    let m1 = mean(a);
    let m2 = mean(b);
    let v1 = sample_variance(a, m1);
    let v2 = sample_variance(b, m2);

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if !se.is_finite() || se == 0.0 {
        return None;
    }

    let t = (m1 - m2) / se;
    let p = incomplete_beta(0.5 * df, 0.5, df / (df + t * t));
    if !t.is_finite() || !p.is_finite() {
        return None;
    }

    Some(TwoSampleTTest { t, p, df })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (ddof = 1); zero for a single observation.
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Regularized incomplete beta function I_x(a, b), evaluated with the
/// continued-fraction expansion (Numerical Recipes 6.4).
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Lentz's method for the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 200;
    const EPS: f64 = 3.0e-12;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        // Even step of the recurrence.
        let numerator = m_f * (b - m_f) * x / ((qam + m2) * (a + m2));
        d = 1.0 + numerator * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + numerator / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step.
        let numerator = -(a + m_f) * (qab + m_f) * x / ((a + m2) * (qap + m2));
        d = 1.0 + numerator * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + numerator / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Natural log of the gamma function, Lanczos approximation (g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula for the left half-plane.
        return PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = COEFFICIENTS[0];
    for (i, coefficient) in COEFFICIENTS.iter().enumerate().skip(1) {
        acc += coefficient / (x + i as f64);
    }
    let t = x + 7.5;

    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}
