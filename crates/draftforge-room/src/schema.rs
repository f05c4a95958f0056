//! Draft schemas: the ordered turns a session walks through.

use std::collections::HashMap;
use std::sync::Arc;

use draftforge_protocol::{Action, Side};

/// Schema used when `create` doesn't name one.
pub const DEFAULT_SCHEMA: &str = "gitcg";

// ---------------------------------------------------------------------------
// TurnStep
// ---------------------------------------------------------------------------

/// One turn of a draft: who acts, and what they do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStep {
    pub side: Side,
    pub action: Action,
    /// On an eligible pick, an entity from the immunity pool may be taken
    /// even if the opponent already holds it.
    pub immunity_eligible: bool,
}

impl TurnStep {
    pub const fn ban(side: Side) -> Self {
        Self {
            side,
            action: Action::Ban,
            immunity_eligible: false,
        }
    }

    pub const fn pick(side: Side) -> Self {
        Self {
            side,
            action: Action::Pick,
            immunity_eligible: false,
        }
    }

    /// An immunity-eligible pick.
    pub const fn claim(side: Side) -> Self {
        Self {
            side,
            action: Action::Pick,
            immunity_eligible: true,
        }
    }

    const fn immunity(side: Side, action: Action) -> Self {
        Self {
            side,
            action,
            immunity_eligible: false,
        }
    }
}

/// The four turns run before any schema that has an immunity-eligible
/// step. Shared by every session.
pub const IMMUNITY_SEQUENCE: [TurnStep; 4] = [
    TurnStep::immunity(Side::A, Action::ImmunityBan),
    TurnStep::immunity(Side::B, Action::ImmunityBan),
    TurnStep::immunity(Side::A, Action::ImmunityPick),
    TurnStep::immunity(Side::B, Action::ImmunityPick),
];

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Reasons a step list can't form a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema {0:?} has no steps")]
    Empty(String),

    /// Immunity actions belong to [`IMMUNITY_SEQUENCE`] only.
    #[error("schema {schema:?} step {index} uses an immunity action")]
    ImmunityAction { schema: String, index: usize },

    #[error("schema {schema:?} step {index} is an immunity-eligible ban")]
    EligibleBan { schema: String, index: usize },
}

/// A named, validated, immutable turn order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    steps: Vec<TurnStep>,
}

impl Schema {
    /// Validates `steps`: non-empty, only `ban`/`pick`, and only picks
    /// marked immunity-eligible.
    pub fn new(name: impl Into<String>, steps: Vec<TurnStep>) -> Result<Self, SchemaError> {
        let name = name.into();
        if steps.is_empty() {
            return Err(SchemaError::Empty(name));
        }
        for (index, step) in steps.iter().enumerate() {
            if step.action.is_immunity() {
                return Err(SchemaError::ImmunityAction {
                    schema: name,
                    index,
                });
            }
            if step.immunity_eligible && step.action != Action::Pick {
                return Err(SchemaError::EligibleBan {
                    schema: name,
                    index,
                });
            }
        }
        Ok(Self { name, steps })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[TurnStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&TurnStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `true` if the immunity sequence runs before this schema.
    pub fn requires_immunity(&self) -> bool {
        self.steps.iter().any(|step| step.immunity_eligible)
    }
}

// ---------------------------------------------------------------------------
// Built-in schemas
// ---------------------------------------------------------------------------

use Side::{A, B};

const CLASSIC: [TurnStep; 10] = [
    TurnStep::ban(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::pick(A),
    TurnStep::pick(A),
    TurnStep::pick(B),
];

const GITCG: [TurnStep; 28] = [
    TurnStep::ban(A),
    TurnStep::ban(A),
    TurnStep::ban(B),
    TurnStep::ban(B),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::pick(B),
    TurnStep::pick(B),
    TurnStep::pick(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::pick(B),
    TurnStep::pick(B),
    TurnStep::pick(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::pick(A),
    TurnStep::pick(A),
    TurnStep::pick(B),
    TurnStep::pick(B),
];

/// Steps of `gitcg` that become claims in `gitcg_cup_2`.
const CUP_2_CLAIMS: [usize; 4] = [13, 14, 25, 27];

const HEAVY_BAN: [TurnStep; 18] = [
    TurnStep::ban(A),
    TurnStep::ban(B),
    TurnStep::ban(A),
    TurnStep::ban(A),
    TurnStep::ban(B),
    TurnStep::ban(B),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::ban(A),
    TurnStep::ban(A),
    TurnStep::pick(A),
    TurnStep::ban(B),
    TurnStep::pick(B),
    TurnStep::pick(B),
    TurnStep::pick(A),
];

fn gitcg_cup_2() -> Vec<TurnStep> {
    let mut steps = GITCG.to_vec();
    for index in CUP_2_CLAIMS {
        steps[index].immunity_eligible = true;
    }
    steps
}

// ---------------------------------------------------------------------------
// SchemaBook
// ---------------------------------------------------------------------------

/// Schemas by name. Sessions hold an `Arc` to theirs, so a book can be
/// shared freely.
#[derive(Debug, Clone, Default)]
pub struct SchemaBook {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `classic`, `gitcg`, `gitcg_cup_2` and `heavy_ban`.
    pub fn builtin() -> Self {
        let mut book = Self::empty();
        for (name, steps) in [
            ("classic", CLASSIC.to_vec()),
            (DEFAULT_SCHEMA, GITCG.to_vec()),
            ("gitcg_cup_2", gitcg_cup_2()),
            ("heavy_ban", HEAVY_BAN.to_vec()),
        ] {
            // The tables above are valid by construction; see the tests.
            book.insert(Schema {
                name: name.to_string(),
                steps,
            });
        }
        book
    }

    /// Adds or replaces a schema under its own name.
    pub fn insert(&mut self, schema: Schema) {
        self.schemas
            .insert(schema.name.clone(), Arc::new(schema));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Looks up `name`, or [`DEFAULT_SCHEMA`] when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> Option<Arc<Schema>> {
        self.get(name.unwrap_or(DEFAULT_SCHEMA))
    }
}
