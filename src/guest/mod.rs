//! Guest-mode trial store.
//!
//! Unauthenticated users get a single-project trial backed by localStorage
//! instead of a server account. The store substitutes for the API client
//! entirely while logged out; the claim migration (see `claim`) hands its
//! contents to the server on login.

mod claim;

pub(crate) use claim::run_claim_migration;

use crate::models::GuestProjectRecord;
use crate::state::RefreshBus;
use crate::storage::{
    load_json_from_storage, remove_from_storage, save_json_to_storage, GUEST_PROJECTS_KEY,
    GUEST_TRIAL_FLAG_KEY,
};

/// Trial cap: guests get exactly one project, enforced before creation.
pub(crate) const GUEST_PROJECT_LIMIT: usize = 1;

/// String-coerced id equality.
///
/// Records written by older builds stored numeric ids; server ids are strings.
/// `5` and `"5"` must compare equal for removal and claim bookkeeping.
pub(crate) fn ids_match(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

pub(crate) fn contains_id(records: &[GuestProjectRecord], id: &str) -> bool {
    records.iter().any(|r| ids_match(&r.id, id))
}

/// Append iff the id is not already present. Returns the (possibly unchanged)
/// list and whether it changed.
pub(crate) fn append_if_absent(
    mut records: Vec<GuestProjectRecord>,
    rec: GuestProjectRecord,
) -> (Vec<GuestProjectRecord>, bool) {
    if contains_id(&records, &rec.id) {
        return (records, false);
    }
    records.push(rec);
    (records, true)
}

pub(crate) fn remove_by_id(
    mut records: Vec<GuestProjectRecord>,
    id: &str,
) -> Vec<GuestProjectRecord> {
    records.retain(|r| !ids_match(&r.id, id));
    records
}

pub(crate) fn set_category(
    mut records: Vec<GuestProjectRecord>,
    id: &str,
    category_id: Option<String>,
) -> Vec<GuestProjectRecord> {
    for r in records.iter_mut() {
        if ids_match(&r.id, id) {
            r.category_id = category_id.clone();
        }
    }
    records
}

/// localStorage-backed store; every mutation emits the refresh bus so other
/// components re-render.
#[derive(Clone, Copy)]
pub(crate) struct GuestStore {
    refresh: RefreshBus,
}

impl GuestStore {
    pub fn new(refresh: RefreshBus) -> Self {
        Self { refresh }
    }

    pub fn projects(&self) -> Vec<GuestProjectRecord> {
        // Corrupt or absent storage degrades to empty, never an error.
        load_json_from_storage::<Vec<GuestProjectRecord>>(GUEST_PROJECTS_KEY).unwrap_or_default()
    }

    pub fn project_ids(&self) -> Vec<String> {
        self.projects().into_iter().map(|r| r.id).collect()
    }

    /// The trial flag outlives the records: deleting the trial project does
    /// not grant a second one. Only the claim migration resets it.
    pub fn trial_used(&self) -> bool {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            if let Ok(Some(v)) = storage.get_item(GUEST_TRIAL_FLAG_KEY) {
                return v == "1" || v == "true";
            }
        }
        false
    }

    pub fn can_create(&self) -> bool {
        !self.trial_used() && self.projects().len() < GUEST_PROJECT_LIMIT
    }

    /// Idempotent by id; sets the trial flag either way.
    pub fn record_project(&self, rec: GuestProjectRecord) {
        let (records, changed) = append_if_absent(self.projects(), rec);
        if changed {
            save_json_to_storage(GUEST_PROJECTS_KEY, &records);
        }

        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(GUEST_TRIAL_FLAG_KEY, "1");
        }

        self.refresh.emit();
    }

    pub fn remove_project(&self, id: &str) {
        let records = remove_by_id(self.projects(), id);
        save_json_to_storage(GUEST_PROJECTS_KEY, &records);
        self.refresh.emit();
    }

    /// Local counterpart of the server's category reassignment; guest mode
    /// never calls the API for this.
    pub fn set_project_category(&self, id: &str, category_id: Option<String>) {
        let records = set_category(self.projects(), id, category_id);
        save_json_to_storage(GUEST_PROJECTS_KEY, &records);
        self.refresh.emit();
    }

    /// Removes all guest keys (records AND trial flag). Called only by the
    /// claim migration.
    pub fn clear(&self) {
        remove_from_storage(GUEST_PROJECTS_KEY);
        remove_from_storage(GUEST_TRIAL_FLAG_KEY);
        self.refresh.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> GuestProjectRecord {
        GuestProjectRecord {
            id: id.to_string(),
            title: format!("project {id}"),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            first_source_id: None,
            category_id: None,
            source_count: 1,
        }
    }

    #[test]
    fn ids_match_is_string_coerced() {
        // A numeric id deserializes to "5"; both spellings must be equal.
        assert!(ids_match("5", "5"));
        assert!(ids_match(" 5 ", "5"));
        assert!(!ids_match("5", "50"));
    }

    #[test]
    fn append_if_absent_is_idempotent() {
        let (list, changed) = append_if_absent(vec![], rec("a"));
        assert!(changed);
        assert_eq!(list.len(), 1);

        let (list, changed) = append_if_absent(list, rec("a"));
        assert!(!changed);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_by_id_uses_coerced_comparison() {
        let numeric = GuestProjectRecord {
            id: "5".to_string(),
            ..rec("5")
        };
        let list = vec![numeric, rec("b")];

        let list = remove_by_id(list, "5");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b");

        // Removing an unknown id is a no-op.
        let list = remove_by_id(list, "zzz");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn set_category_uses_coerced_comparison() {
        let numeric = GuestProjectRecord {
            id: "5".to_string(),
            ..rec("5")
        };
        let list = vec![numeric, rec("b")];

        let list = set_category(list, "5", Some("c1".to_string()));
        assert_eq!(list[0].category_id.as_deref(), Some("c1"));
        assert!(list[1].category_id.is_none());

        let list = set_category(list, "5", None);
        assert!(list[0].category_id.is_none());
    }

    #[test]
    fn corrupt_guest_list_parses_to_empty() {
        // Storage helpers return None on bad JSON; the store maps that to [].
        let parsed: Option<Vec<GuestProjectRecord>> = serde_json::from_str("not json").ok();
        assert!(parsed.is_none());
        assert!(parsed.unwrap_or_default().is_empty());
    }

    #[test]
    fn guest_limit_is_one() {
        assert_eq!(GUEST_PROJECT_LIMIT, 1);
        let (list, _) = append_if_absent(vec![], rec("only"));
        assert!(list.len() >= GUEST_PROJECT_LIMIT);
    }
}
