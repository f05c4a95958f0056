//! The roster of selectable entities.
//!
//! Loaded once from JSON shaped as group → ids:
//!
//! ```json
//! { "pyro": ["diluc", "klee"], "cryo": ["ganyu"] }
//! ```
//!
//! Groups are ordered by name; ids keep their order within a group.

use std::collections::{BTreeMap, HashSet};

use draftforge_protocol::{Entity, EntityId};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entity {0} is listed more than once")]
    Duplicate(EntityId),

    #[error("catalog contains a blank entity id")]
    BlankId,

    #[error("catalog is empty")]
    Empty,
}

/// Every entity a draft may ban or pick.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<Entity>,
    ids: HashSet<EntityId>,
}

impl Catalog {
    /// Builds a catalog from `(group, ids)` pairs.
    pub fn from_groups<G, I, S>(groups: G) -> Result<Self, CatalogError>
    where
        G: IntoIterator<Item = (String, I)>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entities = Vec::new();
        let mut ids = HashSet::new();
        for (group, members) in groups {
            for id in members {
                let id: String = id.into();
                if id.trim().is_empty() {
                    return Err(CatalogError::BlankId);
                }
                let id = EntityId::new(id);
                if !ids.insert(id.clone()) {
                    return Err(CatalogError::Duplicate(id));
                }
                entities.push(Entity {
                    id,
                    group: group.clone(),
                });
            }
        }
        if entities.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { entities, ids })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let groups: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::from_groups(groups)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|e| &e.id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
