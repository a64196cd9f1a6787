mod api;
mod app;
mod components;
mod guest;
mod library;
mod models;
mod pages;
mod state;
mod storage;
mod util;

use app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::ApiClient;
    use crate::guest::GuestStore;
    use crate::models::{AccountInfo, GuestProjectRecord};
    use crate::state::RefreshBus;
    use crate::storage::{
        load_last_tab, load_user_from_storage, save_last_tab, save_user_to_storage,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

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

    #[wasm_bindgen_test]
    fn test_api_client_storage_roundtrip_token() {
        ApiClient::clear_storage();

        let mut c = ApiClient::load_from_storage();
        assert!(!c.is_authenticated());

        c.set_token("t1".to_string());
        c.save_to_storage();

        let c2 = ApiClient::load_from_storage();
        assert_eq!(c2.get_auth_token().as_deref(), Some("t1"));

        ApiClient::clear_storage();
        let c3 = ApiClient::load_from_storage();
        assert!(c3.get_auth_token().is_none());
    }

    #[wasm_bindgen_test]
    fn test_user_storage_roundtrip() {
        let user = AccountInfo {
            extra: serde_json::json!({"id": 1, "email": "u@example.com"}),
        };
        save_user_to_storage(&user);
        let loaded = load_user_from_storage().expect("should load user from localStorage");
        assert_eq!(loaded.extra["email"], "u@example.com");
    }

    #[wasm_bindgen_test]
    fn test_guest_store_trial_lifecycle() {
        let guest = GuestStore::new(RefreshBus::new());
        guest.clear();

        assert!(guest.can_create());
        guest.record_project(rec("g1"));

        assert_eq!(guest.project_ids(), vec!["g1".to_string()]);
        assert!(guest.trial_used());
        assert!(!guest.can_create());

        // Deleting the trial project does not grant a second one.
        guest.remove_project("g1");
        assert!(guest.projects().is_empty());
        assert!(guest.trial_used());
        assert!(!guest.can_create());

        // Only the claim migration clears the flag.
        guest.clear();
        assert!(guest.can_create());
    }

    #[wasm_bindgen_test]
    fn test_guest_move_resolves_in_local_store() {
        ApiClient::clear_storage();
        let guest = GuestStore::new(RefreshBus::new());
        guest.clear();
        guest.record_project(rec("g1"));

        // Guest recategorization is a pure localStorage write; the API client
        // holds no token and is never involved.
        assert!(!ApiClient::load_from_storage().is_authenticated());

        guest.set_project_category("g1", Some("c1".to_string()));
        assert_eq!(
            guest.projects()[0].category_id.as_deref(),
            Some("c1")
        );

        guest.set_project_category("g1", None);
        assert!(guest.projects()[0].category_id.is_none());

        guest.clear();
    }

    #[wasm_bindgen_test]
    fn test_last_tab_roundtrip() {
        save_last_tab("p1", "quiz");
        assert_eq!(load_last_tab("p1").as_deref(), Some("quiz"));

        // Per-project keys are independent.
        assert!(load_last_tab("p2").is_none());

        save_last_tab("p1", "chat");
        assert_eq!(load_last_tab("p1").as_deref(), Some("chat"));
    }
}
