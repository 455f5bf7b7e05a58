//! Turn order.
//!
//! Each round, every fighting party member and living enemy gets one token,
//! sorted by effective agility (highest first). Ties go to the party, then to
//! the lower index. There is no randomness, so the same roster always yields
//! the same order.
//!
//! Tokens are weak references. Combatants die between the time the order is
//! built and the time their token comes up, so [`TurnScheduler::current`]
//! re-validates every token and skips stale ones.

use std::cmp::Reverse;

use smallvec::SmallVec;

use crate::data::GameData;
use crate::roster::{Enemy, Party, Side};

use super::CombatantRef;

/// A `(side, index)` entry in the turn order.
pub type TurnToken = CombatantRef;

/// Round-based initiative queue with a cursor.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    order: SmallVec<[TurnToken; 8]>,
    cursor: usize,
    max_stale_skips: usize,
}

impl TurnScheduler {
    /// Create an empty scheduler. The first call to `current` builds the order.
    #[must_use]
    pub fn new(max_stale_skips: usize) -> Self {
        Self {
            order: SmallVec::new(),
            cursor: 0,
            max_stale_skips,
        }
    }

    /// Compute the turn order for the current roster.
    #[must_use]
    pub fn compute_order(data: &GameData, party: &Party, enemies: &[Enemy]) -> SmallVec<[TurnToken; 8]> {
        let party_tokens = party.fighting_indices().into_iter().filter_map(|i| {
            party
                .member(i)
                .map(|m| (m.effective_agility(data), TurnToken::party(i)))
        });
        let enemy_tokens = enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, e)| (e.agi, TurnToken::enemy(i)));

        let mut keyed: SmallVec<[(i32, TurnToken); 8]> = party_tokens.chain(enemy_tokens).collect();
        // Side orders Party before Enemy, then index ascending.
        keyed.sort_by_key(|&(agi, token)| (Reverse(agi), token.side, token.index));
        keyed.into_iter().map(|(_, token)| token).collect()
    }

    /// Whether a token still refers to a combatant that may act.
    #[must_use]
    pub fn is_actionable(token: TurnToken, party: &Party, enemies: &[Enemy]) -> bool {
        match token.side {
            Side::Party => party.is_fighting(token.index),
            Side::Enemy => enemies.get(token.index).is_some_and(Enemy::is_alive),
        }
    }

    /// Rebuild the order from scratch and reset the cursor.
    pub fn rebuild(&mut self, data: &GameData, party: &Party, enemies: &[Enemy]) {
        self.order = Self::compute_order(data, party, enemies);
        self.cursor = 0;
        tracing::debug!(order = ?self.order.as_slice(), "turn order rebuilt");
    }

    /// The token whose turn it is, after skipping stale entries.
    ///
    /// Rebuilds the order when the cursor has run past the end of the round.
    /// Stale tokens are skipped up to the configured bound; if that is not
    /// enough the order is rebuilt. Returns `None` only when nobody on either
    /// side can act.
    pub fn current(&mut self, data: &GameData, party: &Party, enemies: &[Enemy]) -> Option<TurnToken> {
        for _ in 0..=self.max_stale_skips {
            if self.cursor >= self.order.len() {
                self.rebuild(data, party, enemies);
            }
            let token = *self.order.get(self.cursor)?;
            if Self::is_actionable(token, party, enemies) {
                return Some(token);
            }
            tracing::debug!(%token, "skipping stale turn token");
            self.cursor += 1;
        }

        tracing::warn!("too many stale turn tokens, forcing rebuild");
        self.rebuild(data, party, enemies);
        self.order.first().copied()
    }

    /// Move past the current token.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// The current round's order.
    #[must_use]
    pub fn order(&self) -> &[TurnToken] {
        &self.order
    }

    /// Position in the current round.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
