//! Whether a selection is allowed on the current turn.
//!
//! Legality is an ordered chain of small checks. The first one to fail
//! names the reason; later checks never run. The same chain decides both
//! player submissions and the candidate pool for forced selection, so the
//! two can't disagree.
//!
//! ```text
//! in catalog ─→ immunity phase: not immunity-banned, not protected
//!           └→ main phase:     not banned ─→ not own pick
//!                              ─→ protection guard ─→ available (or claim)
//! ```

use draftforge_protocol::{EntityId, Side};

use crate::{Board, Catalog, TurnStep};

/// Why a submission was refused. Refusals never change the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("draft has not started")]
    NotStarted,

    #[error("draft is finished")]
    Finished,

    #[error("connection does not hold a side")]
    NoSide,

    #[error("it is side {expected}'s turn")]
    OutOfTurn { expected: Side },

    #[error("{0} is not in the catalog")]
    UnknownEntity(EntityId),

    #[error("{0} is banned")]
    Banned(EntityId),

    #[error("{0} is already picked by this side")]
    AlreadyHeld(EntityId),

    /// Protected entities can't be banned, and can only be picked on an
    /// immunity-eligible step.
    #[error("{0} is protected on this step")]
    Protected(EntityId),

    #[error("{0} is already picked")]
    Taken(EntityId),

    #[error("{0} was already used in the immunity phase")]
    ImmunityUsed(EntityId),
}

/// Everything a check may look at.
#[derive(Debug, Clone, Copy)]
pub struct Proposal<'a> {
    pub board: &'a Board,
    pub step: &'a TurnStep,
    pub entity: &'a EntityId,
}

/// One link of the chain.
pub type Check = fn(&Proposal<'_>) -> Result<(), Rejection>;

/// Main-phase chain, in evaluation order.
pub const MAIN_CHECKS: [Check; 4] = [not_banned, not_own_pick, protection_guard, available];

/// Immunity-phase chain.
pub const IMMUNITY_CHECKS: [Check; 1] = [not_immunity_used];

/// Runs the chain for `step` against `entity`.
pub fn check(
    board: &Board,
    catalog: &Catalog,
    step: &TurnStep,
    entity: &EntityId,
) -> Result<(), Rejection> {
    if !catalog.contains(entity) {
        return Err(Rejection::UnknownEntity(entity.clone()));
    }
    let proposal = Proposal {
        board,
        step,
        entity,
    };
    let chain: &[Check] = if step.action.is_immunity() {
        &IMMUNITY_CHECKS
    } else {
        &MAIN_CHECKS
    };
    chain.iter().try_for_each(|check| check(&proposal))
}

/// Every catalog entity the chain accepts for `step`, in catalog order.
pub fn candidates<'a>(board: &Board, catalog: &'a Catalog, step: &TurnStep) -> Vec<&'a EntityId> {
    catalog
        .ids()
        .filter(|id| check(board, catalog, step, id).is_ok())
        .collect()
}

pub fn not_banned(p: &Proposal<'_>) -> Result<(), Rejection> {
    if p.board.is_banned(p.entity) {
        return Err(Rejection::Banned(p.entity.clone()));
    }
    Ok(())
}

pub fn not_own_pick(p: &Proposal<'_>) -> Result<(), Rejection> {
    if p.board.holds(p.step.side, p.entity) {
        return Err(Rejection::AlreadyHeld(p.entity.clone()));
    }
    Ok(())
}

pub fn protection_guard(p: &Proposal<'_>) -> Result<(), Rejection> {
    if p.board.is_protected(p.entity) && !p.step.immunity_eligible {
        // Covers bans too: a ban step is never eligible.
        return Err(Rejection::Protected(p.entity.clone()));
    }
    Ok(())
}

pub fn available(p: &Proposal<'_>) -> Result<(), Rejection> {
    let claim = p.step.immunity_eligible && p.board.is_protected(p.entity);
    if !claim && p.board.is_picked(p.entity) {
        return Err(Rejection::Taken(p.entity.clone()));
    }
    Ok(())
}

pub fn not_immunity_used(p: &Proposal<'_>) -> Result<(), Rejection> {
    if p.board.is_immunity_banned(p.entity) || p.board.is_protected(p.entity) {
        return Err(Rejection::ImmunityUsed(p.entity.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use draftforge_protocol::Action;

    use super::*;
    use crate::IMMUNITY_SEQUENCE;

    fn catalog() -> Catalog {
        Catalog::from_groups([("all".to_string(), vec!["x", "y", "z"])]).unwrap()
    }

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    #[test]
    fn test_check_unknown_entity_rejected_first() {
        let board = Board::new();
        let err = check(&board, &catalog(), &TurnStep::ban(Side::A), &id("w")).unwrap_err();
        assert_eq!(err, Rejection::UnknownEntity(id("w")));
    }

    #[test]
    fn test_check_banned_entity_rejected_before_ownership() {
        let mut board = Board::new();
        board.record(Side::A, Action::Ban, id("x"));
        board.record(Side::A, Action::Pick, id("x"));
        let err = check(&board, &catalog(), &TurnStep::pick(Side::A), &id("x")).unwrap_err();
        assert_eq!(err, Rejection::Banned(id("x")));
    }

    #[test]
    fn test_check_own_pick_rejected_even_on_claim_step() {
        let mut board = Board::new();
        board.record(Side::A, Action::ImmunityPick, id("x"));
        board.record(Side::A, Action::Pick, id("x"));
        let err = check(&board, &catalog(), &TurnStep::claim(Side::A), &id("x")).unwrap_err();
        assert_eq!(err, Rejection::AlreadyHeld(id("x")));
    }

    #[test]
    fn test_check_protected_entity_cannot_be_banned() {
        let mut board = Board::new();
        board.record(Side::B, Action::ImmunityPick, id("x"));
        let err = check(&board, &catalog(), &TurnStep::ban(Side::A), &id("x")).unwrap_err();
        assert_eq!(err, Rejection::Protected(id("x")));
    }

    #[test]
    fn test_check_protected_entity_needs_eligible_pick() {
        let mut board = Board::new();
        board.record(Side::B, Action::ImmunityPick, id("x"));
        assert_eq!(
            check(&board, &catalog(), &TurnStep::pick(Side::A), &id("x")),
            Err(Rejection::Protected(id("x")))
        );
        assert_eq!(
            check(&board, &catalog(), &TurnStep::claim(Side::A), &id("x")),
            Ok(())
        );
    }

    #[test]
    fn test_check_claim_ignores_opponent_pick() {
        let mut board = Board::new();
        board.record(Side::A, Action::ImmunityPick, id("x"));
        board.record(Side::B, Action::Pick, id("x"));
        assert_eq!(
            check(&board, &catalog(), &TurnStep::claim(Side::A), &id("x")),
            Ok(())
        );
    }

    #[test]
    fn test_check_unprotected_opponent_pick_is_taken() {
        let mut board = Board::new();
        board.record(Side::B, Action::Pick, id("y"));
        assert_eq!(
            check(&board, &catalog(), &TurnStep::claim(Side::A), &id("y")),
            Err(Rejection::Taken(id("y")))
        );
        assert_eq!(
            check(&board, &catalog(), &TurnStep::ban(Side::A), &id("y")),
            Err(Rejection::Taken(id("y")))
        );
    }

    #[test]
    fn test_check_immunity_phase_rejects_reuse() {
        let mut board = Board::new();
        board.record(Side::A, Action::ImmunityBan, id("x"));
        board.record(Side::A, Action::ImmunityPick, id("y"));
        let step = IMMUNITY_SEQUENCE[3];
        assert_eq!(
            check(&board, &catalog(), &step, &id("x")),
            Err(Rejection::ImmunityUsed(id("x")))
        );
        assert_eq!(
            check(&board, &catalog(), &step, &id("y")),
            Err(Rejection::ImmunityUsed(id("y")))
        );
        assert_eq!(check(&board, &catalog(), &step, &id("z")), Ok(()));
    }

    #[test]
    fn test_candidates_match_chain() {
        let mut board = Board::new();
        board.record(Side::A, Action::Ban, id("x"));
        board.record(Side::B, Action::Pick, id("y"));

        let catalog = catalog();
        let pool = candidates(&board, &catalog, &TurnStep::pick(Side::A));

        assert_eq!(pool, vec![&id("z")]);
    }

    #[test]
    fn test_candidates_empty_when_everything_used() {
        let mut board = Board::new();
        for e in ["x", "y", "z"] {
            board.record(Side::A, Action::Ban, id(e));
        }
        assert!(candidates(&board, &catalog(), &TurnStep::pick(Side::B)).is_empty());
    }
}
