//! Mace bonus-damage rule.
//!
//! Fall distance past a threshold is split across a tier table, each tier
//! paying a fixed damage per block. The default table pays 8 per block for
//! the first 3 blocks, 2 per block for the next 5, and 1 per block beyond.
//! A hit with the weapon always spends the attacker's fall distance, even
//! when it was too short to earn any bonus.

use std::fmt;

use gv_core::host::FALL_DISTANCE_PROPERTY;
use gv_core::{EntityId, EquipmentSlot, HitEvent, Host, ItemType};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// One band of the damage table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTier {
    /// Blocks of fall covered by this band; `None` covers the remainder.
    pub blocks: Option<f64>,
    /// Damage per block in this band.
    pub damage_per_block: f64,
}

impl DamageTier {
    /// A band covering `blocks` blocks.
    pub const fn bounded(blocks: f64, damage_per_block: f64) -> Self {
        Self {
            blocks: Some(blocks),
            damage_per_block,
        }
    }

    /// A band covering everything left over.
    pub const fn rest(damage_per_block: f64) -> Self {
        Self {
            blocks: None,
            damage_per_block,
        }
    }
}

/// How much of a fall one tier consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierShare {
    /// Blocks of fall paid by this tier.
    pub blocks: f64,
    /// The tier's rate.
    pub damage_per_block: f64,
    /// `blocks * damage_per_block`.
    pub damage: f64,
}

impl fmt::Display for TierShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} blocks x {} = {:.2}",
            self.blocks, self.damage_per_block, self.damage
        )
    }
}

/// The result of a hit that triggered the rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaceStrike {
    /// The attacker.
    pub attacker: EntityId,
    /// The victim.
    pub victim: EntityId,
    /// Fall distance the hit consumed.
    pub fall_distance: f64,
    /// Bonus damage dealt; zero when the fall was too short.
    pub damage: f64,
}

/// Converts recorded fall distance into bonus damage on a weapon hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaceRule {
    /// Item type that triggers the rule when held in the main hand.
    pub weapon: String,
    /// Fall distance that earns nothing; only the excess is paid.
    pub threshold: f64,
    /// Damage bands, applied in order.
    pub tiers: Vec<DamageTier>,
    /// Animation played on the victim.
    pub hurt_animation: String,
    /// Sound played at the attacker.
    pub hit_sound: String,
}

impl Default for MaceRule {
    fn default() -> Self {
        Self {
            weapon: ItemType::MACE.to_string(),
            threshold: 1.5,
            tiers: vec![
                DamageTier::bounded(3.0, 8.0),
                DamageTier::bounded(5.0, 2.0),
                DamageTier::rest(1.0),
            ],
            hurt_animation: "animation.hurt".to_string(),
            hit_sound: "random.orb".to_string(),
        }
    }
}

impl MaceRule {
    /// Build a rule with a custom weapon, threshold, and tier table.
    pub fn new(
        weapon: impl Into<String>,
        threshold: f64,
        tiers: Vec<DamageTier>,
    ) -> MechResult<Self> {
        let rule = Self {
            weapon: weapon.into(),
            threshold,
            tiers,
            ..Self::default()
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check the threshold and tier table.
    ///
    /// Every band but the last must be bounded, and all widths and rates
    /// must be finite and non-negative.
    pub fn validate(&self) -> MechResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(MechError::InvalidThreshold(self.threshold));
        }
        if self.tiers.is_empty() {
            return Err(MechError::InvalidTiers("no tiers".into()));
        }
        let last = self.tiers.len() - 1;
        for (i, tier) in self.tiers.iter().enumerate() {
            match tier.blocks {
                None if i != last => {
                    return Err(MechError::InvalidTiers(format!(
                        "tier {i} is unbounded but is not the last tier"
                    )));
                }
                Some(blocks) if !blocks.is_finite() || blocks <= 0.0 => {
                    return Err(MechError::InvalidTiers(format!(
                        "tier {i} has invalid width {blocks}"
                    )));
                }
                _ => {}
            }
            if !tier.damage_per_block.is_finite() || tier.damage_per_block < 0.0 {
                return Err(MechError::InvalidTiers(format!(
                    "tier {i} has invalid rate {}",
                    tier.damage_per_block
                )));
            }
        }
        Ok(())
    }

    /// Per-tier breakdown of the bonus for a fall distance.
    ///
    /// Tiers the fall does not reach are omitted.
    pub fn breakdown(&self, fall_distance: f64) -> Vec<TierShare> {
        if !fall_distance.is_finite() || fall_distance < self.threshold {
            return Vec::new();
        }
        let mut remaining = fall_distance - self.threshold;
        let mut shares = Vec::new();
        for tier in &self.tiers {
            if remaining <= 0.0 {
                break;
            }
            let blocks = tier.blocks.map_or(remaining, |width| width.min(remaining));
            remaining -= blocks;
            shares.push(TierShare {
                blocks,
                damage_per_block: tier.damage_per_block,
                damage: blocks * tier.damage_per_block,
            });
        }
        shares
    }

    /// Bonus damage for a fall distance.
    pub fn bonus_damage(&self, fall_distance: f64) -> f64 {
        self.breakdown(fall_distance).iter().map(|s| s.damage).sum()
    }

    /// React to a melee hit.
    ///
    /// Returns `None` when the attacker is gone or not holding the weapon.
    /// Otherwise deals the bonus (if any) to the victim, zeroes the
    /// attacker's fall distance, and plays the hit feedback. Host failures
    /// on the damage or feedback calls are logged and skipped.
    pub fn on_hit<H: Host + ?Sized>(&self, host: &mut H, hit: HitEvent) -> Option<MaceStrike> {
        let attacker = host.entity(hit.attacker)?;
        if !attacker.has_equipped(EquipmentSlot::MainHand, &self.weapon) {
            return None;
        }

        let fall_distance = host
            .property(hit.attacker, FALL_DISTANCE_PROPERTY)
            .filter(|d| d.is_finite())
            .unwrap_or(0.0);
        let damage = self.bonus_damage(fall_distance);
        let dealt = if damage > 0.0 {
            host.apply_damage(hit.victim, damage)
        } else {
            Ok(())
        };
        if let Err(e) = dealt {
            warn!("mace bonus damage on {} rejected: {e}", hit.victim);
        }
        host.set_property(hit.attacker, FALL_DISTANCE_PROPERTY, Some(0.0));

        if let Err(e) = host.play_animation(hit.victim, &self.hurt_animation) {
            warn!("hurt animation on {} failed: {e}", hit.victim);
        }
        if let Err(e) = host.play_sound(hit.attacker, &self.hit_sound) {
            warn!("hit sound at {} failed: {e}", hit.attacker);
        }

        debug!(
            "mace strike {} -> {}: fell {fall_distance:.2}, bonus {damage:.2}",
            hit.attacker, hit.victim
        );
        Some(MaceStrike {
            attacker: hit.attacker,
            victim: hit.victim,
            fall_distance,
            damage,
        })
    }
}
