use crate::models::AccountInfo;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "recapio_token";
pub(crate) const USER_KEY: &str = "recapio_user";

// Guest trial state (see crate::guest).
pub(crate) const GUEST_PROJECTS_KEY: &str = "recapio_guest_projects";
pub(crate) const GUEST_TRIAL_FLAG_KEY: &str = "recapio_guest_trial_used";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn save_user_to_storage(user: &AccountInfo) {
    if let Ok(json) = serde_json::to_string(user) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(USER_KEY, &json);
        }
    }
}

pub(crate) fn load_user_from_storage() -> Option<AccountInfo> {
    if let Some(storage) = local_storage() {
        if let Ok(Some(json)) = storage.get_item(USER_KEY) {
            return serde_json::from_str(&json).ok();
        }
    }
    None
}

/// Unparseable or absent values degrade to `None`, never an error.
pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

fn last_tab_key(project_id: &str) -> String {
    format!("recapio_last_tab::{project_id}")
}

/// Remember which workspace tab (summary/chat/quiz/flashcards) was last open
/// for a project, so returning to it restores the same tab.
pub(crate) fn save_last_tab(project_id: &str, tab: &str) {
    if project_id.trim().is_empty() || tab.trim().is_empty() {
        return;
    }
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(&last_tab_key(project_id), tab);
    }
}

pub(crate) fn load_last_tab(project_id: &str) -> Option<String> {
    if project_id.trim().is_empty() {
        return None;
    }
    let storage = local_storage()?;
    storage.get_item(&last_tab_key(project_id)).ok().flatten()
}
