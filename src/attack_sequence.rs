//! Attack-sequence resolution: the hit → wound → save → allocation cascade.
//!
//! [`calculate`] is the engine's single entry point. It validates the
//! request, reduces each stage to per-die outcome probabilities, then
//! enumerates the joint outcome tree: attacks PMF × hit outcomes × wound
//! outcomes × save outcomes, handing each leaf to the damage-allocation
//! chain. Four output PMFs accumulate along the way.
//!
//! Special-rule bookkeeping at the stage seams:
//! - lethal hits skip the wound roll and re-enter as automatic normal wounds;
//! - devastating wounds skip the save and re-enter allocation as mortals.
//!
//! The whole computation is synchronous, allocation-light, and reentrant;
//! nothing outlives the call.

use crate::damage_allocation::destroyed_distribution;
use crate::damage_distribution::damage_distribution;
use crate::dice_mechanics::{parse_dice_expression, pmf_mean};
use crate::error::CalcError;
use crate::roll_probabilities::{
    failed_save_probability, hit_probabilities, wound_probabilities,
};
use crate::types::{DamageRequest, DamageResponse, JointPmf, Pmf};

/// Joint PMF over `(a, b)` counts from `n` independent trials with per-trial
/// outcome probabilities `(p_a, p_b, 1 - p_a - p_b)`.
///
/// Iterative small-state update: each trial sends every `(a, b)` state to its
/// three successors. State count is O(n²), total work O(n³) — fine for the
/// tens of trials an attack sequence produces. Zero-probability branches are
/// skipped so the support stays minimal.
pub fn convolve_trials(n: i32, p_a: f64, p_b: f64) -> JointPmf {
    let p_miss = (1.0 - p_a - p_b).max(0.0);

    let mut dist = JointPmf::new();
    dist.insert((0, 0), 1.0);
    for _ in 0..n {
        let mut next = JointPmf::new();
        for (&(a, b), &p) in &dist {
            if p_miss > 0.0 {
                *next.entry((a, b)).or_insert(0.0) += p * p_miss;
            }
            if p_a > 0.0 {
                *next.entry((a + 1, b)).or_insert(0.0) += p * p_a;
            }
            if p_b > 0.0 {
                *next.entry((a, b + 1)).or_insert(0.0) += p * p_b;
            }
        }
        dist = next;
    }
    dist
}

/// Resolve one attack sequence into its outcome distributions.
pub fn calculate(req: &DamageRequest) -> Result<DamageResponse, CalcError> {
    validate(req)?;

    let attacks_pmf = parse_dice_expression(&req.attacks_string)?;
    let damage_pmf = damage_distribution(&req.d, req.feel_no_pain);
    let (p_hit, p_lethal) = hit_probabilities(
        req.bs,
        req.hit_reroll,
        req.hit_modifier,
        req.lethal_hits,
        req.torrent,
    );
    let (p_wound, p_devastating) = wound_probabilities(
        req.s,
        req.t,
        req.wound_reroll,
        req.wound_modifier,
        req.devastating_wounds,
    );
    let p_fail = failed_save_probability(req.ap, req.save, req.invulnerable, req.save_modifier);

    let mut hits = Pmf::new();
    let mut wounds = Pmf::new();
    let mut pens = Pmf::new();
    let mut destroyed = Pmf::new();

    for (&attacks, &p_attacks) in &attacks_pmf {
        let hit_outcomes = convolve_trials(attacks, p_hit, p_lethal);
        for (&(normal_hits, lethal_hits), &p_h) in &hit_outcomes {
            let p_after_hits = p_attacks * p_h;
            *hits.entry(normal_hits + lethal_hits).or_insert(0.0) += p_after_hits;

            // Only normal hits roll to wound; lethal hits wound automatically.
            let wound_outcomes = convolve_trials(normal_hits, p_wound, p_devastating);
            for (&(rolled_wounds, devastating), &p_w) in &wound_outcomes {
                let normal_wounds = rolled_wounds + lethal_hits;
                let p_after_wounds = p_after_hits * p_w;
                *wounds.entry(normal_wounds + devastating).or_insert(0.0) += p_after_wounds;

                // Only normal wounds face a save; devastating wounds convert
                // straight to mortal damage.
                let save_outcomes = convolve_trials(normal_wounds, p_fail, 0.0);
                for (&(unsaved, _), &p_s) in &save_outcomes {
                    let p_after_saves = p_after_wounds * p_s;
                    *pens.entry(unsaved + devastating).or_insert(0.0) += p_after_saves;

                    let kills = destroyed_distribution(
                        unsaved,
                        devastating,
                        &damage_pmf,
                        req.wounds_per_model,
                        req.num_models,
                    );
                    for (&killed, &p_k) in &kills {
                        *destroyed.entry(killed).or_insert(0.0) += p_after_saves * p_k;
                    }
                }
            }
        }
    }

    Ok(DamageResponse {
        average_hits: pmf_mean(&hits),
        average_destroyed: pmf_mean(&destroyed),
        hits_distribution: hits,
        wounds_distribution: wounds,
        pens_distribution: pens,
        destroyed_distribution: destroyed,
        message: "Calculation complete".to_string(),
        request_uuid: String::new(),
    })
}

/// Reject inputs the dice math is not defined for. Fields whose formulas
/// carry built-in caps (bs, modifiers, feel_no_pain) are clamped there
/// instead of rejected here.
fn validate(req: &DamageRequest) -> Result<(), CalcError> {
    if req.num_models <= 0 {
        return Err(CalcError::InvalidUnit {
            field: "num_models",
            value: req.num_models,
        });
    }
    if req.wounds_per_model <= 0 {
        return Err(CalcError::InvalidUnit {
            field: "wounds_per_model",
            value: req.wounds_per_model,
        });
    }
    if req.s < 1 {
        return Err(CalcError::OutOfRange {
            field: "s",
            value: req.s,
        });
    }
    if req.t < 1 {
        return Err(CalcError::OutOfRange {
            field: "t",
            value: req.t,
        });
    }
    if req.ap < 0 {
        return Err(CalcError::OutOfRange {
            field: "ap",
            value: req.ap,
        });
    }
    if !(2..=7).contains(&req.save) {
        return Err(CalcError::OutOfRange {
            field: "save",
            value: req.save,
        });
    }
    if let Some(invuln) = req.invulnerable {
        if !(2..=6).contains(&invuln) {
            return Err(CalcError::OutOfRange {
                field: "invulnerable",
                value: invuln,
            });
        }
    }
    Ok(())
}
