//! Sequential damage allocation: a Markov chain over defender health states.
//!
//! State is the pair `(killed, current_hp)` of models destroyed so far and
//! the hit points left on the model currently taking damage. Starting from
//! `{(0, max_hp): 1.0}`, one transition per unsaved wound pushes the
//! distribution forward; the chain is acyclic because `killed` never
//! decreases, so a single forward sweep per wound suffices.
//!
//! Normal and mortal wounds differ in what happens to excess damage:
//! - normal damage stops at the current model — anything past its remaining
//!   hit points is wasted;
//! - mortal damage spills over, cascading model to model until the damage
//!   runs out or the unit dies.
//!
//! All normal wounds are applied before any mortal wound. The orderings do
//! not commute once a model is on partial hit points, and the game resolves
//! saves (hence normal damage) first.

use std::collections::BTreeMap;

use crate::types::Pmf;

/// Distribution over `(killed, current_hp)` unit states.
///
/// Absorbing states (`killed == total_models`) canonicalize `current_hp` to
/// `max_hp` so their mass merges into a single key.
type UnitStates = BTreeMap<(i32, i32), f64>;

/// PMF over models destroyed after `n_normal` normal and `n_mortal` mortal
/// unsaved wounds, each dealing damage drawn independently from `damage_pmf`.
pub fn destroyed_distribution(
    n_normal: i32,
    n_mortal: i32,
    damage_pmf: &Pmf,
    max_hp: i32,
    total_models: i32,
) -> Pmf {
    let mut states = UnitStates::new();
    states.insert((0, max_hp), 1.0);

    for _ in 0..n_normal {
        states = apply_wound(&states, damage_pmf, max_hp, total_models, false);
    }
    for _ in 0..n_mortal {
        states = apply_wound(&states, damage_pmf, max_hp, total_models, true);
    }

    let mut destroyed = Pmf::new();
    for (&(killed, _), &p) in &states {
        *destroyed.entry(killed).or_insert(0.0) += p;
    }
    destroyed
}

/// One wound's transition: branch every live state over the damage PMF.
fn apply_wound(
    states: &UnitStates,
    damage_pmf: &Pmf,
    max_hp: i32,
    total_models: i32,
    spillover: bool,
) -> UnitStates {
    let mut next = UnitStates::new();
    for (&(killed, hp), &p) in states {
        if killed == total_models {
            *next.entry((killed, max_hp)).or_insert(0.0) += p;
            continue;
        }
        for (&damage, &q) in damage_pmf {
            let state = if spillover {
                spill(killed, hp, damage, max_hp, total_models)
            } else if damage >= hp {
                // The model dies; excess damage is wasted.
                (killed + 1, max_hp)
            } else {
                (killed, hp - damage)
            };
            *next.entry(state).or_insert(0.0) += p * q;
        }
    }
    next
}

/// Cascade mortal damage through successive models.
fn spill(
    mut killed: i32,
    mut hp: i32,
    mut damage: i32,
    max_hp: i32,
    total_models: i32,
) -> (i32, i32) {
    while damage >= hp {
        damage -= hp;
        killed += 1;
        hp = max_hp;
        if killed == total_models {
            return (total_models, max_hp);
        }
    }
    (killed, hp - damage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice_mechanics::{certain, parse_dice_expression, pmf_total};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn no_wounds_no_kills() {
        let pmf = destroyed_distribution(0, 0, &certain(3), 2, 5);
        assert_eq!(pmf.len(), 1);
        assert_close(pmf[&0], 1.0);
    }

    #[test]
    fn zero_damage_kills_nothing() {
        let pmf = destroyed_distribution(4, 4, &certain(0), 2, 5);
        assert_close(pmf[&0], 1.0);
    }

    #[test]
    fn normal_excess_is_wasted() {
        // Two 3-damage wounds into 2-wound models: one kill each, the spare
        // point discarded both times.
        let pmf = destroyed_distribution(2, 0, &certain(3), 2, 3);
        assert_eq!(pmf.len(), 1);
        assert_close(pmf[&2], 1.0);
    }

    #[test]
    fn mortal_excess_cascades() {
        // Same two 3-damage wounds as mortals: the first kills a model and
        // leaves the next on 1 hp, the second kills that model and the spare
        // 2 points finish a third.
        let pmf = destroyed_distribution(0, 2, &certain(3), 2, 3);
        assert_eq!(pmf.len(), 1);
        assert_close(pmf[&3], 1.0);
    }

    #[test]
    fn single_mortal_wipes_unit_when_damage_suffices() {
        let pmf = destroyed_distribution(0, 1, &certain(10), 2, 3);
        assert_close(pmf[&3], 1.0);
    }

    #[test]
    fn absorbing_state_holds_extra_wounds() {
        // Far more wounds than the unit can soak: everything lands on the
        // terminal state and mass is conserved.
        let pmf = destroyed_distribution(10, 5, &certain(2), 1, 2);
        assert_eq!(pmf.len(), 1);
        assert_close(pmf[&2], 1.0);
    }

    #[test]
    fn partial_damage_chips_before_killing() {
        // 1-damage wounds into 2-wound models: every second wound kills.
        let pmf = destroyed_distribution(3, 0, &certain(1), 2, 5);
        assert_close(pmf[&1], 1.0);

        let pmf = destroyed_distribution(4, 0, &certain(1), 2, 5);
        assert_close(pmf[&2], 1.0);
    }

    #[test]
    fn dice_damage_splits_outcomes() {
        // One d3 wound into a single 2-wound model: kills on 2 or 3.
        let d3 = parse_dice_expression("d3").unwrap();
        let pmf = destroyed_distribution(1, 0, &d3, 2, 1);
        assert_close(pmf[&0], 1.0 / 3.0);
        assert_close(pmf[&1], 2.0 / 3.0);
        assert_close(pmf_total(&pmf), 1.0);
    }

    #[test]
    fn support_stays_within_unit_size() {
        let d6 = parse_dice_expression("d6").unwrap();
        let pmf = destroyed_distribution(3, 3, &d6, 2, 3);
        assert_close(pmf_total(&pmf), 1.0);
        for &killed in pmf.keys() {
            assert!((0..=3).contains(&killed), "killed={killed}");
        }
    }

    #[test]
    fn normal_then_mortal_ordering() {
        // One 1-damage normal wound chips a 2-wound model to 1 hp; a 2-damage
        // mortal then kills it and spills 1 into the next model. Had the
        // mortal gone first, the normal wound would only chip the second
        // model instead — one kill either way here, but the surviving hp
        // differs, which the second mortal wound exposes.
        let one = certain(1);
        let two = certain(2);

        let mut states = UnitStates::new();
        states.insert((0, 2), 1.0);
        let states = apply_wound(&states, &one, 2, 3, false);
        let states = apply_wound(&states, &two, 2, 3, true);
        assert_close(states[&(1, 1)], 1.0);
    }
}
