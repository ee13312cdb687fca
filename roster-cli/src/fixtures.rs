//! Synthetic per-role fixtures: one placeholder person and assignment
//! for every role in the vocabulary, so downstream consumers always
//! have at least one holder per role to exercise.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::{BuildContext, EntityType, roles};

static FIXTURE_LOGIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9.\-]+").unwrap());

/// Manufacture the fixtures. Roles with no representative entity in
/// the graph are skipped.
pub fn add_role_fixtures(ctx: &mut BuildContext) {
    let mut role_ids: BTreeSet<String> = ctx.roles().keys().cloned().collect();
    role_ids.extend(roles::SEEDED.iter().map(|id| id.to_string()));
    role_ids.extend(roles::FIXTURE_EXTRAS.iter().map(|id| id.to_string()));

    for role_id in role_ids {
        let Some(entity_id) = pick_entity_for_role(ctx, &role_id) else {
            continue;
        };
        let nom = role_id.replace('-', " ").to_uppercase();
        let person_id = ctx.get_or_create_person("Test", &nom, None, None, None);
        ctx.recycle_login(person_id, &fixture_login(&role_id));
        ctx.record_assignment(person_id, &role_id, entity_id);
    }
}

/// Representative entity for a role: its natural hierarchy level when
/// one exists, otherwise the first root, otherwise the first entity of
/// any type.
fn pick_entity_for_role(ctx: &BuildContext, role_id: &str) -> Option<i64> {
    let preferred = match role_id {
        roles::RESPONSABLE_ANNEE => Some(EntityType::Niveau),
        roles::RESPONSABLE_FORMATION | roles::DIRECTEUR_SPECIALITE => Some(EntityType::Parcours),
        roles::DIRECTEUR_MENTION => Some(EntityType::Mention),
        roles::DIRECTEUR_DEPARTEMENT => Some(EntityType::Departement),
        roles::DIRECTEUR_COMPOSANTE => Some(EntityType::Composante),
        _ => None,
    };
    if let Some(entity_type) = preferred {
        if let Some(id) = ctx.first_entity_of_type(entity_type) {
            return Some(id);
        }
    }
    EntityType::HIERARCHY
        .iter()
        .find_map(|&entity_type| ctx.first_entity_of_type(entity_type))
}

/// Deterministic role-specific login: `test.<role-id>`.
fn fixture_login(role_id: &str) -> String {
    let login = format!("test.{role_id}").replace('_', "-").to_lowercase();
    FIXTURE_LOGIN_RE.replace_all(&login, "").into_owned()
}
