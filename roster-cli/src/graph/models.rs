//! Normalized model of the roster graph.

use chrono::NaiveDate;

/// Level of an organizational entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Composante,
    Departement,
    Mention,
    Parcours,
    Niveau,
}

impl EntityType {
    /// Hierarchy order, root level first.
    pub const HIERARCHY: [EntityType; 5] = [
        EntityType::Composante,
        EntityType::Departement,
        EntityType::Mention,
        EntityType::Parcours,
        EntityType::Niveau,
    ];

    /// Tag stored in the entite_structure.type_entite column.
    pub fn as_sql(self) -> &'static str {
        match self {
            EntityType::Composante => "COMPOSANTE",
            EntityType::Departement => "DEPARTEMENT",
            EntityType::Mention => "MENTION",
            EntityType::Parcours => "PARCOURS",
            EntityType::Niveau => "NIVEAU",
        }
    }
}

/// One node of the organizational forest. Name and parent are fixed at
/// creation; later sightings of the same identity key reuse the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    pub id: i64,
    pub entity_type: EntityType,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// A deduplicated person. Contact fields hold the first non-empty
/// value seen across all sightings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub login: String,
    pub nom: String,
    pub prenom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub bureau: Option<String>,
}

/// Identity of an assignment: one row per (person, role, entity, year).
pub type AssignmentKey = (i64, String, i64, i64);

/// The binding of a person to a role at an entity for one academic year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub person_id: i64,
    pub role_id: String,
    pub entity_id: i64,
    pub year_id: i64,
    pub date_debut: NaiveDate,
    pub date_fin: Option<NaiveDate>,
}

impl Assignment {
    pub fn key(&self) -> AssignmentKey {
        (
            self.person_id,
            self.role_id.clone(),
            self.entity_id,
            self.year_id,
        )
    }
}

/// Functional mailbox attached to one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub assignment: AssignmentKey,
    pub email: String,
    pub email_type: &'static str,
}

/// Hierarchy fields of one source record, root to leaf. Empty levels
/// are skipped when the chain is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityChain {
    pub composante: String,
    pub departement: String,
    pub mention: String,
    pub parcours: String,
    pub niveau: String,
}
