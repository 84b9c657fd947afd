//! Dice-expression parsing and PMF helpers.
//!
//! An expression is either a bare non-negative integer ("4") or a roll of the
//! form `[count]d<faces>[+modifier]`, case-insensitive, whitespace-tolerant
//! around the modifier. A roll expands to the convolution of `count`
//! independent uniform dice on `{1..faces}`, shifted by the modifier.
//!
//! Two entry points with different failure policies:
//! - [`parse_dice_expression`] rejects malformed input (the attacks context);
//! - [`parse_dice_expression_lenient`] degrades to `{0: 1.0}` (the damage
//!   context, where a bad string should zero out the weapon rather than fail
//!   the whole request).

use crate::error::CalcError;
use crate::types::Pmf;

/// Parse a dice expression into a PMF over non-negative outcomes.
///
/// `count` defaults to 1 ("d6" == "1d6"), the modifier to 0. A zero count
/// collapses to `{modifier: 1.0}` — accepted, unlike a malformed string.
pub fn parse_dice_expression(expr: &str) -> Result<Pmf, CalcError> {
    parse(expr).ok_or_else(|| CalcError::InvalidDiceExpression {
        expr: expr.trim().to_string(),
    })
}

/// Like [`parse_dice_expression`], but any unparseable string becomes a
/// degenerate zero distribution instead of an error.
pub fn parse_dice_expression_lenient(expr: &str) -> Pmf {
    parse(expr).unwrap_or_else(|| certain(0))
}

fn parse(expr: &str) -> Option<Pmf> {
    let s = expr.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }

    // Bare non-negative integer, e.g. "4".
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return Some(certain(s.parse().ok()?));
    }

    // `[count]d<faces>` with an optional `[+]modifier` tail.
    let d_pos = s.find('d')?;
    let count_str = &s[..d_pos];
    if !count_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count: i32 = if count_str.is_empty() {
        1
    } else {
        count_str.parse().ok()?
    };

    let rest = &s[d_pos + 1..];
    let faces_len = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if faces_len == 0 {
        return None;
    }
    let faces: i32 = rest[..faces_len].parse().ok()?;
    if faces == 0 {
        return None;
    }

    let mut tail = rest[faces_len..].trim_start();
    if let Some(stripped) = tail.strip_prefix('+') {
        tail = stripped.trim_start();
    }
    if !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let modifier: i32 = if tail.is_empty() { 0 } else { tail.parse().ok()? };

    if count == 0 {
        return Some(certain(modifier));
    }

    // Convolve `count` uniform dice, then shift by the modifier.
    let face_prob = 1.0 / faces as f64;
    let mut dist = certain(0);
    for _ in 0..count {
        let mut next = Pmf::new();
        for (&sum, &prob) in &dist {
            for roll in 1..=faces {
                *next.entry(sum + roll).or_insert(0.0) += prob * face_prob;
            }
        }
        dist = next;
    }

    if modifier != 0 {
        dist = dist.into_iter().map(|(k, p)| (k + modifier, p)).collect();
    }
    Some(dist)
}

/// Degenerate PMF: the given value with probability 1.
pub fn certain(value: i32) -> Pmf {
    let mut pmf = Pmf::new();
    pmf.insert(value, 1.0);
    pmf
}

/// Expected value, Σ k · pmf\[k\].
pub fn pmf_mean(pmf: &Pmf) -> f64 {
    pmf.iter().map(|(&k, &p)| k as f64 * p).sum()
}

/// Total probability mass; ~1.0 for any well-formed PMF.
pub fn pmf_total(pmf: &Pmf) -> f64 {
    pmf.values().sum()
}
