//! Victory rewards.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::BattleRng;
use crate::roster::{Enemy, Party, ACTIVE_MAX};

/// What a victory paid out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    /// Experience earned by the whole party before the split.
    pub total_exp: u32,
    /// Gold credited to the shared pool.
    pub total_gold: u32,
    /// Experience each recipient received.
    pub share: u32,
    /// Roster indices that received a share.
    pub recipients: SmallVec<[usize; ACTIVE_MAX]>,
}

/// Sum experience and roll gold once per enemy, dead or alive.
pub fn roll_rewards(enemies: &[Enemy], rng: &mut BattleRng) -> (u32, u32) {
    let exp = enemies.iter().map(|e| e.exp).fold(0u32, u32::saturating_add);
    let gold = enemies.iter().fold(0u32, |acc, e| {
        let lo = i32::try_from(e.gold_low).unwrap_or(i32::MAX);
        let hi = i32::try_from(e.gold_high).unwrap_or(i32::MAX);
        let roll = u32::try_from(rng.gen_range(lo..=hi)).unwrap_or(0);
        acc.saturating_add(roll)
    });
    (exp, gold)
}

/// Credit a victory.
///
/// Experience is divided evenly across the fighting members with integer
/// division; the remainder is dropped. Gold goes to the party pool whole.
pub fn split_rewards(party: &mut Party, total_exp: u32, total_gold: u32) -> Rewards {
    let recipients = party.fighting_indices();
    let share = match u32::try_from(recipients.len()) {
        Ok(n) if n > 0 => total_exp / n,
        _ => 0,
    };
    for &i in &recipients {
        if let Some(member) = party.member_mut(i) {
            member.exp = member.exp.saturating_add(share);
        }
    }
    party.gold = party.gold.saturating_add(total_gold);

    tracing::info!(total_exp, total_gold, share, recipients = recipients.len(), "rewards credited");
    Rewards {
        total_exp,
        total_gold,
        share,
        recipients,
    }
}
