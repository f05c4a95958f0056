//! What has been banned and picked so far.

use draftforge_protocol::{Action, BanEntry, EntityId, Side};

/// Selections recorded by a draft session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub bans: Vec<BanEntry>,
    /// Picks per side, indexed by [`Side::index`].
    pub picks: [Vec<EntityId>; 2],
    pub immunity_bans: Vec<EntityId>,
    /// Entities protected during the immunity phase.
    pub immunity_pool: Vec<EntityId>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn picks(&self, side: Side) -> &[EntityId] {
        &self.picks[side.index()]
    }

    pub fn is_banned(&self, entity: &EntityId) -> bool {
        self.bans.iter().any(|ban| &ban.entity_id == entity)
    }

    pub fn holds(&self, side: Side, entity: &EntityId) -> bool {
        self.picks(side).contains(entity)
    }

    pub fn is_picked(&self, entity: &EntityId) -> bool {
        Side::BOTH.into_iter().any(|side| self.holds(side, entity))
    }

    pub fn is_protected(&self, entity: &EntityId) -> bool {
        self.immunity_pool.contains(entity)
    }

    pub fn is_immunity_banned(&self, entity: &EntityId) -> bool {
        self.immunity_bans.contains(entity)
    }

    /// Appends `entity` to the list `action` writes to.
    pub fn record(&mut self, side: Side, action: Action, entity: EntityId) {
        match action {
            Action::Ban => self.bans.push(BanEntry {
                entity_id: entity,
                side,
            }),
            Action::Pick => self.picks[side.index()].push(entity),
            Action::ImmunityBan => self.immunity_bans.push(entity),
            Action::ImmunityPick => self.immunity_pool.push(entity),
        }
    }
}
