//! The build context: identity maps, id counters and accumulated rows
//! for one pipeline run. Both sources and the fixture generator fold
//! into the same context, so identities merge across inputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{
    Assignment, AssignmentKey, ContactRecord, EntityChain, EntityNode, EntityType, Person,
};
use super::roles;

// Synthetic ids start above the hand-authored seed rows of the
// destination schema.
const ENTITY_ID_BASE: i64 = 1000;
const PERSON_ID_BASE: i64 = 1000;

type EntityKey = (EntityType, String, Option<i64>);
type PersonKey = (Option<String>, String, String);

static LOGIN_SANITIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9.]+").unwrap());

/// Owns every identity map and counter of a run. No ambient state:
/// construct one per run (or per test) and pass it through the
/// pipeline stages.
pub struct BuildContext {
    pub year_id: i64,
    pub date_debut: NaiveDate,

    entities: Vec<EntityNode>,
    entity_index: HashMap<EntityKey, i64>,

    roles: BTreeMap<String, String>,

    people: Vec<Person>,
    person_index: HashMap<PersonKey, i64>,
    used_logins: HashSet<String>,

    assignments: Vec<Assignment>,
    assignment_keys: HashSet<AssignmentKey>,

    contacts: Vec<ContactRecord>,
}

impl BuildContext {
    pub fn new(year_id: i64, date_debut: NaiveDate) -> Self {
        Self {
            year_id,
            date_debut,
            entities: Vec::new(),
            entity_index: HashMap::new(),
            roles: BTreeMap::new(),
            people: Vec::new(),
            person_index: HashMap::new(),
            used_logins: HashSet::new(),
            assignments: Vec::new(),
            assignment_keys: HashSet::new(),
            contacts: Vec::new(),
        }
    }

    /// Existing id for the (type, name, parent) identity key, or a
    /// freshly allocated one. First-seen wins: later sightings never
    /// alter the node.
    pub fn get_or_create_entity(
        &mut self,
        entity_type: EntityType,
        name: &str,
        parent_id: Option<i64>,
    ) -> i64 {
        let key = (entity_type, name.to_string(), parent_id);
        if let Some(&id) = self.entity_index.get(&key) {
            return id;
        }
        let id = ENTITY_ID_BASE + self.entities.len() as i64;
        self.entity_index.insert(key, id);
        self.entities.push(EntityNode {
            id,
            entity_type,
            name: name.to_string(),
            parent_id,
        });
        id
    }

    /// Build the entity chain root to leaf, skipping empty levels, and
    /// return the deepest resolved id. The first non-empty level
    /// becomes a root. None when every level is empty.
    pub fn build_chain(&mut self, chain: &EntityChain) -> Option<i64> {
        let mut entity_id = None;
        for (entity_type, name) in [
            (EntityType::Composante, &chain.composante),
            (EntityType::Departement, &chain.departement),
            (EntityType::Mention, &chain.mention),
            (EntityType::Parcours, &chain.parcours),
            (EntityType::Niveau, &chain.niveau),
        ] {
            if name.is_empty() {
                continue;
            }
            entity_id = Some(self.get_or_create_entity(entity_type, name, entity_id));
        }
        entity_id
    }

    /// Resolve a person by (email, prenom, nom), creating them on
    /// first sight. Later sightings only fill contact fields that are
    /// still unset.
    pub fn get_or_create_person(
        &mut self,
        prenom: &str,
        nom: &str,
        email: Option<&str>,
        telephone: Option<&str>,
        bureau: Option<&str>,
    ) -> i64 {
        let key = (
            email.map(|e| e.trim().to_lowercase()),
            prenom.to_lowercase(),
            nom.to_lowercase(),
        );
        if let Some(&id) = self.person_index.get(&key) {
            let person = &mut self.people[(id - PERSON_ID_BASE) as usize];
            if person.email.is_none() {
                person.email = email.map(str::to_string);
            }
            if person.telephone.is_none() {
                person.telephone = telephone.map(str::to_string);
            }
            if person.bureau.is_none() {
                person.bureau = bureau.map(str::to_string);
            }
            return id;
        }
        let id = PERSON_ID_BASE + self.people.len() as i64;
        let login = self.claim_login(&derive_login_base(prenom, nom), id);
        self.person_index.insert(key, id);
        self.people.push(Person {
            id,
            login,
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            email: email.map(str::to_string),
            telephone: telephone.map(str::to_string),
            bureau: bureau.map(str::to_string),
        });
        id
    }

    /// Swap a person's login for a deterministic one, releasing the
    /// derived login for reuse. Only the fixture generator does this.
    pub fn recycle_login(&mut self, person_id: i64, login: &str) {
        let login = self.dedupe_login(login);
        let index = (person_id - PERSON_ID_BASE) as usize;
        let old = std::mem::replace(&mut self.people[index].login, login.clone());
        self.used_logins.remove(&old);
        self.used_logins.insert(login);
    }

    fn claim_login(&mut self, base: &str, person_id: i64) -> String {
        let base = if base.is_empty() {
            format!("user{person_id}")
        } else {
            base.to_string()
        };
        let login = self.dedupe_login(&base);
        self.used_logins.insert(login.clone());
        login
    }

    /// Numeric suffixes (`.2`, `.3`, ...) resolve login collisions.
    fn dedupe_login(&self, base: &str) -> String {
        if !self.used_logins.contains(base) {
            return base.to_string();
        }
        let mut suffix = 2;
        while self.used_logins.contains(&format!("{base}.{suffix}")) {
            suffix += 1;
        }
        format!("{base}.{suffix}")
    }

    /// First-seen label wins for a role id.
    pub fn register_role(&mut self, role_id: &str, label: &str) {
        self.roles
            .entry(role_id.to_string())
            .or_insert_with(|| label.to_string());
    }

    /// Record one assignment for the run's academic year. Duplicates
    /// of the (person, role, entity, year) key are discarded; returns
    /// whether the assignment was new.
    pub fn record_assignment(&mut self, person_id: i64, role_id: &str, entity_id: i64) -> bool {
        let key = (person_id, role_id.to_string(), entity_id, self.year_id);
        if !self.assignment_keys.insert(key) {
            return false;
        }
        self.assignments.push(Assignment {
            person_id,
            role_id: role_id.to_string(),
            entity_id,
            year_id: self.year_id,
            date_debut: self.date_debut,
            date_fin: None,
        });
        true
    }

    /// Attach a functional mailbox to an assignment key. Contacts are
    /// not deduplicated: one row per source record that carried an
    /// email.
    pub fn record_contact(&mut self, person_id: i64, role_id: &str, entity_id: i64, email: &str) {
        self.contacts.push(ContactRecord {
            assignment: (person_id, role_id.to_string(), entity_id, self.year_id),
            email: email.to_string(),
            email_type: "fonction",
        });
    }

    /// First created entity of the given type, if any.
    pub fn first_entity_of_type(&self, entity_type: EntityType) -> Option<i64> {
        self.entities
            .iter()
            .find(|node| node.entity_type == entity_type)
            .map(|node| node.id)
    }

    /// Role ids minted by this run, the seeded vocabulary excluded.
    pub fn new_role_count(&self) -> usize {
        self.roles
            .keys()
            .filter(|id| !roles::SEEDED.contains(&id.as_str()))
            .count()
    }

    pub fn entities(&self) -> &[EntityNode] {
        &self.entities
    }

    pub fn roles(&self) -> &BTreeMap<String, String> {
        &self.roles
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }
}

/// Login skeleton from the name pair: `prenom.nom`, lowercased, spaces
/// to dots, anything outside `[a-z0-9.]` dropped.
fn derive_login_base(prenom: &str, nom: &str) -> String {
    let base = format!("{prenom}.{nom}").to_lowercase().replace(' ', ".");
    LOGIN_SANITIZE_RE.replace_all(&base, "").into_owned()
}
