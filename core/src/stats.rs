//! Significance testing for 2×2 contingency tables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquaredTest {
    pub statistic: f64,
    pub p_value:   f64,
    pub dof:       usize,
}

/// Pearson chi-squared test of independence on a 2×2 table, with Yates'
/// continuity correction (each observed count moves up to 0.5 toward its
/// expected count).
///
/// A table with an all-zero row or column carries no evidence either way
/// and reports statistic 0, p-value 1.
pub fn chi2_contingency_2x2(table: [[f64; 2]; 2]) -> ChiSquaredTest {
    let rows = [table[0][0] + table[0][1], table[1][0] + table[1][1]];
    let cols = [table[0][0] + table[1][0], table[0][1] + table[1][1]];
    let total = rows[0] + rows[1];

    if rows.iter().chain(&cols).any(|&s| s <= 0.0) {
        log::warn!("chi-squared table {table:?} has an empty margin; reporting p = 1");
        return ChiSquaredTest { statistic: 0.0, p_value: 1.0, dof: 1 };
    }

    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let expected = rows[i] * cols[j] / total;
            let diff = expected - table[i][j];
            let corrected = table[i][j] + diff.signum() * diff.abs().min(0.5);
            statistic += (corrected - expected).powi(2) / expected;
        }
    }

    ChiSquaredTest {
        statistic,
        p_value: chi2_survival_dof1(statistic),
        dof: 1,
    }
}

/// P(X > x) for a chi-squared variable with one degree of freedom.
pub fn chi2_survival_dof1(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    erfc((x / 2.0).sqrt()).clamp(0.0, 1.0)
}

/// Complementary error function (Chebyshev fit, relative error < 1.2e-7).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}
