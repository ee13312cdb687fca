//! SQL rendering of the accumulated graph.
//!
//! Tables are rendered in dependency order so every foreign key
//! references a row emitted earlier in the document. Tables with no
//! rows are omitted entirely.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::graph::{AssignmentKey, BuildContext, EntityType, roles};

// Emission ids live in their own ranges, disjoint from the
// hand-authored seed rows and from each other's tables.
const ASSIGNMENT_ID_BASE: i64 = 2000;
const CONTACT_ID_BASE: i64 = 3000;

/// Quote a string literal, doubling embedded single quotes.
fn sql_str(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Nullable string literal.
fn sql_opt(value: Option<&str>) -> String {
    match value {
        Some(v) => sql_str(v),
        None => "null".to_string(),
    }
}

/// Nullable integer literal.
fn sql_opt_id(value: Option<i64>) -> String {
    match value {
        Some(id) => id.to_string(),
        None => "null".to_string(),
    }
}

/// Nullable date literal.
fn sql_opt_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(date) => format!("'{}'", date.format("%Y-%m-%d")),
        None => "null".to_string(),
    }
}

fn push_insert(lines: &mut Vec<String>, statement: &str, values: Vec<String>) {
    if values.is_empty() {
        return;
    }
    lines.push(statement.to_string());
    lines.push(format!("{};", values.join(",\n")));
    lines.push(String::new());
}

/// Render the full seed document: inserts in dependency order followed
/// by sequence recalibration.
pub fn render_sql(ctx: &BuildContext) -> String {
    let mut lines: Vec<String> = vec![
        "-- Seed responsables reelles (CSV + XLSX)".to_string(),
        "-- Genere automatiquement par roster-cli".to_string(),
        String::new(),
    ];

    // roles minted by this run; the seeded vocabulary already exists
    let role_values: Vec<String> = ctx
        .roles()
        .iter()
        .filter(|(id, _)| !roles::SEEDED.contains(&id.as_str()))
        .map(|(id, label)| {
            format!(
                "  ({}, {}, 'Import CSV/XLSX', 10, true)",
                sql_str(id),
                sql_str(label)
            )
        })
        .collect();
    push_insert(
        &mut lines,
        "insert into role (id_role, libelle, description, niveau_hierarchique, is_global) values",
        role_values,
    );

    let entity_values: Vec<String> = EntityType::HIERARCHY
        .iter()
        .flat_map(|&entity_type| {
            ctx.entities()
                .iter()
                .filter(move |node| node.entity_type == entity_type)
        })
        .map(|node| {
            format!(
                "  ({}, {}, {}, '{}', {})",
                node.id,
                ctx.year_id,
                sql_opt_id(node.parent_id),
                node.entity_type.as_sql(),
                sql_str(&node.name)
            )
        })
        .collect();
    push_insert(
        &mut lines,
        "insert into entite_structure (id_entite, id_annee, id_entite_parent, type_entite, nom) values",
        entity_values,
    );

    for (entity_type, statement) in [
        (EntityType::Composante, "insert into composante (id_entite, site_web) values"),
        (EntityType::Departement, "insert into departement (id_entite, code_interne) values"),
        (EntityType::Mention, "insert into mention (id_entite, type_diplome) values"),
        (EntityType::Parcours, "insert into parcours (id_entite, code_parcours) values"),
        (EntityType::Niveau, "insert into niveau (id_entite, libelle_court) values"),
    ] {
        let values: Vec<String> = ctx
            .entities()
            .iter()
            .filter(|node| node.entity_type == entity_type)
            .map(|node| format!("  ({}, null)", node.id))
            .collect();
        push_insert(&mut lines, statement, values);
    }

    let people_values: Vec<String> = ctx
        .people()
        .iter()
        .map(|person| {
            format!(
                "  ({}, {}, {}, {}, {}, {}, {}, 'ACTIF')",
                person.id,
                sql_str(&person.login),
                sql_str(&person.nom),
                sql_str(&person.prenom),
                sql_opt(person.email.as_deref()),
                sql_opt(person.telephone.as_deref()),
                sql_opt(person.bureau.as_deref()),
            )
        })
        .collect();
    push_insert(
        &mut lines,
        "insert into utilisateur (id_user, login, nom, prenom, email_institutionnel, telephone, bureau, statut) values",
        people_values,
    );

    // assignments get their final ids here; contact rows below resolve
    // through this map
    let mut assignment_ids: HashMap<AssignmentKey, i64> = HashMap::new();
    let assignment_values: Vec<String> = ctx
        .assignments()
        .iter()
        .enumerate()
        .map(|(offset, assignment)| {
            let id = ASSIGNMENT_ID_BASE + offset as i64;
            assignment_ids.insert(assignment.key(), id);
            format!(
                "  ({}, {}, {}, {}, {}, '{}', {})",
                id,
                assignment.person_id,
                sql_str(&assignment.role_id),
                assignment.entity_id,
                assignment.year_id,
                assignment.date_debut.format("%Y-%m-%d"),
                sql_opt_date(assignment.date_fin),
            )
        })
        .collect();
    push_insert(
        &mut lines,
        "insert into affectation (id_affectation, id_user, id_role, id_entite, id_annee, date_debut, date_fin) values",
        assignment_values,
    );

    let mut next_contact_id = CONTACT_ID_BASE;
    let mut contact_values = Vec::new();
    for contact in ctx.contacts() {
        let Some(&assignment_id) = assignment_ids.get(&contact.assignment) else {
            continue;
        };
        contact_values.push(format!(
            "  ({}, {}, {}, {})",
            next_contact_id,
            assignment_id,
            sql_str(&contact.email),
            sql_str(contact.email_type),
        ));
        next_contact_id += 1;
    }
    push_insert(
        &mut lines,
        "insert into contact_role (id_contact_role, id_affectation, email_fonctionnelle, type_email) values",
        contact_values,
    );

    lines.push("-- Recalage des sequences".to_string());
    for (table, column) in [
        ("entite_structure", "id_entite"),
        ("utilisateur", "id_user"),
        ("affectation", "id_affectation"),
        ("contact_role", "id_contact_role"),
    ] {
        lines.push(format!(
            "select setval(pg_get_serial_sequence('{table}','{column}'), (select max({column}) from {table}));"
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityChain;
    use chrono::NaiveDate;

    fn seeded_ctx() -> BuildContext {
        let mut ctx = BuildContext::new(3, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        let entity = ctx
            .build_chain(&EntityChain {
                composante: "Institut Galilée".into(),
                departement: "Département d'Informatique".into(),
                ..Default::default()
            })
            .unwrap();
        ctx.register_role("role-referent-handicap", "Référent handicap");
        ctx.register_role(roles::RESPONSABLE_FORMATION, "Responsable de formation");
        let person = ctx.get_or_create_person(
            "Jean",
            "D'ARC",
            Some("jd@example.org"),
            None,
            None,
        );
        ctx.record_assignment(person, "role-referent-handicap", entity);
        ctx.record_contact(person, "role-referent-handicap", entity, "jd@example.org");
        ctx
    }

    #[test]
    fn test_render_orders_tables_and_escapes_quotes() {
        let sql = render_sql(&seeded_ctx());

        // single quotes are doubled
        assert!(sql.contains("'Département d''Informatique'"));
        assert!(sql.contains("'D''ARC'"));

        // dependency order: roles before entities before people before
        // assignments before contacts
        let pos = |needle: &str| sql.find(needle).unwrap();
        assert!(pos("insert into role ") < pos("insert into entite_structure "));
        assert!(pos("insert into entite_structure ") < pos("insert into composante "));
        assert!(pos("insert into utilisateur ") < pos("insert into affectation "));
        assert!(pos("insert into affectation ") < pos("insert into contact_role "));
        assert!(pos("insert into contact_role ") < pos("-- Recalage des sequences"));
    }

    #[test]
    fn test_seeded_roles_are_not_reinserted() {
        let sql = render_sql(&seeded_ctx());
        assert!(sql.contains("'role-referent-handicap'"));
        assert!(!sql.contains("('responsable-formation',"));
    }

    #[test]
    fn test_assignment_ids_start_at_offset_and_contacts_reference_them() {
        let sql = render_sql(&seeded_ctx());
        assert!(sql.contains("  (2000, 1000, 'role-referent-handicap', 1001, 3, '2025-09-01', null);"));
        assert!(sql.contains("  (3000, 2000, 'jd@example.org', 'fonction');"));
    }

    #[test]
    fn test_empty_tables_are_omitted() {
        let ctx = BuildContext::new(3, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        let sql = render_sql(&ctx);
        assert!(!sql.contains("insert into"));
        // the recalibration statements are always present
        assert_eq!(sql.matches("select setval").count(), 4);
    }

    #[test]
    fn test_entity_rows_ordered_by_hierarchy_then_id() {
        let mut ctx = BuildContext::new(3, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        // create a niveau-rooted chain first, then a composante
        ctx.build_chain(&EntityChain {
            niveau: "M1".into(),
            ..Default::default()
        });
        ctx.build_chain(&EntityChain {
            composante: "Institut Galilée".into(),
            ..Default::default()
        });
        let sql = render_sql(&ctx);
        let composante = sql.find("'COMPOSANTE'").unwrap();
        let niveau = sql.find("'NIVEAU'").unwrap();
        // the composante row comes first even though the niveau was
        // created before it
        assert!(composante < niveau);
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render_sql(&seeded_ctx());
        let second = render_sql(&seeded_ctx());
        assert_eq!(first, second);
    }
}
