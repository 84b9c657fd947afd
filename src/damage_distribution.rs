//! Weapon damage PMF, optionally filtered through Feel No Pain.
//!
//! The base distribution comes from the damage dice expression (tolerant
//! parse: a bad string zeroes the weapon out rather than failing the
//! request). With Feel No Pain in play, each incoming damage value `n`
//! expands through the binomial B(n, p_fail): every point is independently
//! negated on a d6 roll of the FNP target or better.

use crate::dice_mechanics::parse_dice_expression_lenient;
use crate::types::Pmf;

/// PMF over damage actually suffered per unsaved wound.
pub fn damage_distribution(damage_string: &str, feel_no_pain: Option<i32>) -> Pmf {
    let base = parse_dice_expression_lenient(damage_string);
    match feel_no_pain {
        None => base,
        Some(fnp) => apply_feel_no_pain(&base, fnp),
    }
}

/// Chance that one Feel No Pain roll negates a damage point.
///
/// Targets of 1 or less always pass; targets past 6 never do.
fn fnp_negate_probability(fnp: i32) -> f64 {
    if fnp <= 1 {
        1.0
    } else if fnp >= 7 {
        0.0
    } else {
        (7 - fnp) as f64 / 6.0
    }
}

/// Expand every damage value through the per-point FNP binomial.
pub fn apply_feel_no_pain(base: &Pmf, fnp: i32) -> Pmf {
    let p_negate = fnp_negate_probability(fnp);
    let p_through = 1.0 - p_negate;

    let mut out = Pmf::new();
    for (&incoming, &p_incoming) in base {
        // k of the incoming points get through: P(X = k) under B(n, p_through).
        for k in 0..=incoming {
            let p_k = binomial_coefficient(incoming, k)
                * p_through.powi(k)
                * p_negate.powi(incoming - k);
            *out.entry(k).or_insert(0.0) += p_incoming * p_k;
        }
    }
    out
}

/// n choose k by the multiplicative formula, in f64 so large damage values
/// cannot overflow an integer factorial.
pub fn binomial_coefficient(n: i32, k: i32) -> f64 {
    if k < 0 || k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut c = 1.0;
    for i in 1..=k {
        c = c * (n - k + i) as f64 / i as f64;
    }
    c
}
