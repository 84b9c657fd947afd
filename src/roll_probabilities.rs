//! Per-die scalar probabilities for the hit, wound, and save stages.
//!
//! Each function reduces one stage of the sequence to the probabilities of
//! its mutually exclusive outcomes for a single die:
//! - hit roll → (normal hit, lethal hit)
//! - wound roll → (normal wound, devastating wound)
//! - save roll → failed save
//!
//! Rerolls fold into the base success chance; the special-rule outcome
//! (lethal/devastating) is carved out of the normal one so the pair can feed
//! a three-way trial convolution downstream.

use crate::types::RerollType;

const ONE_SIXTH: f64 = 1.0 / 6.0;
const FIVE_SIXTHS: f64 = 5.0 / 6.0;

/// Per-attack probabilities `(normal_hit, lethal_hit)`.
///
/// The raw target chance `(7 - bs + modifier) / 6` is clamped to
/// `[1/6, 5/6]`: a natural 1 always misses and a natural 6 always hits.
/// A torrent weapon skips the roll entirely.
pub fn hit_probabilities(
    bs: i32,
    reroll: RerollType,
    hit_modifier: i32,
    lethal_hits: bool,
    torrent: bool,
) -> (f64, f64) {
    if torrent {
        return (1.0, 0.0);
    }

    let raw = (7.0 - bs as f64 + hit_modifier as f64) / 6.0;
    let mut hit = raw.clamp(ONE_SIXTH, FIVE_SIXTHS);
    // Miss chance before rerolls; the lethal-hits math below needs it too.
    let miss = 1.0 - hit;

    match reroll {
        RerollType::Ones => hit += ONE_SIXTH * hit,
        RerollType::Fail => hit += miss * hit,
        RerollType::None => {}
    }

    let mut lethal = 0.0;
    if lethal_hits {
        lethal = ONE_SIXTH;
        match reroll {
            // A rerolled 1 lands on a 6 one time in six.
            RerollType::Ones => lethal += ONE_SIXTH * ONE_SIXTH,
            // Every original miss gets one more shot at a 6. Uses the
            // pre-reroll miss chance: the rerolled die is the one that
            // missed the first time.
            RerollType::Fail => lethal += miss * ONE_SIXTH,
            RerollType::None => {}
        }
        // Lethal hits skip the wound roll, so they leave the normal pool.
        hit = (hit - lethal).max(0.0);
    }

    (hit, lethal)
}

/// Per-hit probabilities `(normal_wound, devastating_wound)`.
///
/// The unmodified target comes from Strength vs Toughness; the modifier
/// shifts it within `[2, 6]`. Rerolls and \[DEVASTATING WOUNDS\] compose
/// exactly as rerolls and \[LETHAL HITS\] do on the hit roll.
pub fn wound_probabilities(
    s: i32,
    t: i32,
    reroll: RerollType,
    wound_modifier: i32,
    devastating_wounds: bool,
) -> (f64, f64) {
    let target = if s >= 2 * t {
        2
    } else if s > t {
        3
    } else if s == t {
        4
    } else if 2 * s > t {
        5
    } else {
        6
    };
    let final_target = (target - wound_modifier).clamp(2, 6);

    let mut wound = (7 - final_target) as f64 / 6.0;
    let miss = 1.0 - wound;

    match reroll {
        RerollType::Ones => wound += ONE_SIXTH * wound,
        RerollType::Fail => wound += miss * wound,
        RerollType::None => {}
    }

    let mut devastating = 0.0;
    if devastating_wounds {
        devastating = ONE_SIXTH;
        match reroll {
            RerollType::Ones => devastating += ONE_SIXTH * ONE_SIXTH,
            RerollType::Fail => devastating += miss * ONE_SIXTH,
            RerollType::None => {}
        }
        wound = (wound - devastating).max(0.0);
    }

    (wound, devastating)
}

/// Probability that the defender fails the save against one normal wound.
///
/// AP worsens the armor target, modifiers (cover) improve it; the
/// invulnerable save ignores both and wins whenever it is the lower target.
/// The final target is capped at 2+ (a natural 1 always fails) and anything
/// past 6 cannot be passed on a d6.
pub fn failed_save_probability(
    ap: i32,
    save: i32,
    invulnerable: Option<i32>,
    save_modifier: i32,
) -> f64 {
    let armor_target = save + ap - save_modifier;

    let mut target = armor_target;
    if let Some(invuln) = invulnerable {
        if invuln < target {
            target = invuln;
        }
    }

    if target < 2 {
        target = 2;
    }
    if target > 6 {
        return 1.0;
    }

    let pass = (7 - target) as f64 / 6.0;
    1.0 - pass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // ── Hit stage ───────────────────────────────────────────────────────

    #[test]
    fn bs4_plain() {
        let (hit, lethal) = hit_probabilities(4, RerollType::None, 0, false, false);
        assert_close(hit, 0.5);
        assert_close(lethal, 0.0);
    }

    #[test]
    fn hit_clamps_both_ends() {
        // BS 1 clamps at 5/6: a natural 1 still misses.
        let (hit, _) = hit_probabilities(1, RerollType::None, 0, false, false);
        assert_close(hit, 5.0 / 6.0);

        // BS 6 with -1 clamps at 1/6: a natural 6 still hits.
        let (hit, _) = hit_probabilities(6, RerollType::None, -1, false, false);
        assert_close(hit, 1.0 / 6.0);
    }

    #[test]
    fn hit_modifier_shifts_target() {
        let (hit, _) = hit_probabilities(4, RerollType::None, 1, false, false);
        assert_close(hit, 4.0 / 6.0);

        let (hit, _) = hit_probabilities(4, RerollType::None, -1, false, false);
        assert_close(hit, 2.0 / 6.0);
    }

    #[test]
    fn reroll_ones_adds_sixth_of_hit() {
        let (hit, _) = hit_probabilities(4, RerollType::Ones, 0, false, false);
        assert_close(hit, 0.5 + 0.5 / 6.0);
    }

    #[test]
    fn reroll_fail_adds_miss_times_hit() {
        let (hit, _) = hit_probabilities(4, RerollType::Fail, 0, false, false);
        assert_close(hit, 0.75);
    }

    #[test]
    fn lethal_carves_out_of_normal() {
        let (hit, lethal) = hit_probabilities(4, RerollType::None, 0, true, false);
        assert_close(lethal, 1.0 / 6.0);
        assert_close(hit, 0.5 - 1.0 / 6.0);
        // Total success chance is unchanged by the split.
        assert_close(hit + lethal, 0.5);
    }

    #[test]
    fn lethal_with_reroll_fail_uses_pre_reroll_miss() {
        // BS 4+: hit 0.75 after reroll, lethal 1/6 + 0.5/6 = 0.25.
        let (hit, lethal) = hit_probabilities(4, RerollType::Fail, 0, true, false);
        assert_close(lethal, 0.25);
        assert_close(hit, 0.5);
    }

    #[test]
    fn lethal_with_reroll_ones() {
        let (hit, lethal) = hit_probabilities(4, RerollType::Ones, 0, true, false);
        assert_close(lethal, 1.0 / 6.0 + 1.0 / 36.0);
        assert_close(hit, 0.5 + 0.5 / 6.0 - lethal);
    }

    #[test]
    fn torrent_auto_hits() {
        // Torrent wins over everything else, lethal hits included.
        let (hit, lethal) = hit_probabilities(6, RerollType::Fail, -1, true, true);
        assert_close(hit, 1.0);
        assert_close(lethal, 0.0);
    }

    // ── Wound stage ─────────────────────────────────────────────────────

    #[test]
    fn strength_vs_toughness_table() {
        let p = |s, t| wound_probabilities(s, t, RerollType::None, 0, false).0;
        assert_close(p(8, 4), 5.0 / 6.0); // S >= 2T: 2+
        assert_close(p(5, 4), 4.0 / 6.0); // S > T: 3+
        assert_close(p(4, 4), 3.0 / 6.0); // S == T: 4+
        assert_close(p(4, 5), 2.0 / 6.0); // S < T, 2S > T: 5+
        assert_close(p(3, 6), 1.0 / 6.0); // 2S <= T: 6+
    }

    #[test]
    fn wound_modifier_clamps() {
        // 2+ cannot get better.
        let (wound, _) = wound_probabilities(8, 4, RerollType::None, 1, false);
        assert_close(wound, 5.0 / 6.0);

        // 6+ cannot get worse.
        let (wound, _) = wound_probabilities(3, 6, RerollType::None, -1, false);
        assert_close(wound, 1.0 / 6.0);
    }

    #[test]
    fn devastating_mirrors_lethal_math() {
        let (wound, dev) = wound_probabilities(4, 4, RerollType::Fail, 0, true);
        // Same shape as BS 4+ lethal + reroll-fail.
        assert_close(dev, 0.25);
        assert_close(wound, 0.5);
    }

    // ── Save stage ──────────────────────────────────────────────────────

    #[test]
    fn plain_armor_save() {
        // 3+ save, AP-1: passes on 4+, fails half the time.
        assert_close(failed_save_probability(1, 3, None, 0), 0.5);
    }

    #[test]
    fn no_save_always_fails() {
        assert_close(failed_save_probability(0, 7, None, 0), 1.0);
        // AP cannot make it worse than certain failure.
        assert_close(failed_save_probability(3, 7, None, 0), 1.0);
    }

    #[test]
    fn invulnerable_ignores_ap_and_modifier() {
        // Armor 3+ with AP-3 and +1 cover is 5+; invulnerable 4+ is better
        // and stays 4+ regardless of the modifier.
        assert_close(failed_save_probability(3, 3, Some(4), 1), 0.5);
    }

    #[test]
    fn armor_used_when_better_than_invulnerable() {
        assert_close(failed_save_probability(0, 2, Some(5), 0), 1.0 / 6.0);
    }

    #[test]
    fn save_capped_at_two_up() {
        // 3+ with +2 of modifiers would be 1+; the cap holds it at 2+.
        assert_close(failed_save_probability(0, 3, None, 2), 1.0 / 6.0);
    }
}
