//! Core data structures: attack/defender profiles and probability mass functions.
//!
//! The central types are [`DamageRequest`] (everything the client tells us
//! about one attack sequence) and [`DamageResponse`] (the four outcome
//! distributions plus their expectations). Both are plain serde models; all
//! state is request-scoped and immutable after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sparse probability mass function over integer outcomes.
///
/// `BTreeMap` keeps iteration sorted and deterministic, so repeated runs
/// accumulate floating-point contributions in the same order and two calls on
/// the same input produce bitwise-identical results. Serializes as a JSON
/// object with integer-string keys.
pub type Pmf = BTreeMap<i32, f64>;

/// Joint PMF over a pair of per-trial success counts `(a, b)`.
pub type JointPmf = BTreeMap<(i32, i32), f64>;

/// Which dice may be re-thrown after the first roll of a stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerollType {
    /// No rerolls.
    #[default]
    None,
    /// Reroll natural 1s only.
    Ones,
    /// Reroll every failed die.
    Fail,
}

/// One attack sequence: attacker profile, defender profile, and the special
/// rules in play.
///
/// Optional saves (`invulnerable`, `feel_no_pain`) are absent-or-present
/// rather than sentinel-valued. Modifier, reroll, and flag fields default so
/// a minimal request only names the core characteristics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DamageRequest {
    /// Number of models in the defending unit.
    pub num_models: i32,
    /// Wounds characteristic of each defending model.
    #[serde(default = "default_wounds_per_model")]
    pub wounds_per_model: i32,
    /// Attacks characteristic as a dice expression, e.g. "2d6+1" or "4".
    pub attacks_string: String,
    /// Ballistic (or weapon) skill: the unmodified roll needed to hit.
    pub bs: i32,
    /// Weapon Strength.
    pub s: i32,
    /// Armor Penetration (non-negative; worsens the armor save).
    pub ap: i32,
    /// Damage characteristic as a dice expression, e.g. "d3" or "2".
    pub d: String,
    /// Defender Toughness.
    pub t: i32,
    /// Armor Save characteristic; 7 means no armor save.
    pub save: i32,
    /// Invulnerable Save characteristic, unaffected by AP and modifiers.
    #[serde(default)]
    pub invulnerable: Option<i32>,
    /// Feel No Pain target: each damage point is ignored on a roll of this or
    /// more.
    #[serde(default)]
    pub feel_no_pain: Option<i32>,

    #[serde(default)]
    pub hit_reroll: RerollType,
    #[serde(default)]
    pub wound_reroll: RerollType,

    #[serde(default)]
    pub hit_modifier: i32,
    #[serde(default)]
    pub wound_modifier: i32,
    #[serde(default)]
    pub save_modifier: i32,

    /// \[LETHAL HITS\]: a natural 6 to hit wounds automatically.
    #[serde(default)]
    pub lethal_hits: bool,
    /// \[DEVASTATING WOUNDS\]: a natural 6 to wound becomes mortal damage.
    #[serde(default)]
    pub devastating_wounds: bool,
    /// \[TORRENT\]: the weapon hits automatically.
    #[serde(default)]
    pub torrent: bool,

    /// Populated by server middleware; clients never need to send it.
    #[serde(default)]
    pub request_uuid: String,
}

fn default_wounds_per_model() -> i32 {
    1
}

/// Outcome distributions for one attack sequence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DamageResponse {
    /// Expected number of hits, Σ k · hits_distribution\[k\].
    pub average_hits: f64,
    /// Expected number of destroyed models.
    pub average_destroyed: f64,
    /// PMF over total hits (normal + lethal).
    pub hits_distribution: Pmf,
    /// PMF over total wounds (normal + devastating).
    pub wounds_distribution: Pmf,
    /// PMF over wounds that got through: failed saves plus mortal wounds.
    pub pens_distribution: Pmf,
    /// PMF over destroyed models, support within \[0, num_models\].
    pub destroyed_distribution: Pmf,
    pub message: String,
    /// Echoes the request UUID assigned by middleware.
    pub request_uuid: String,
}
