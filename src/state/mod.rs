use crate::api::ApiClient;
use crate::models::{AccountInfo, Category, Project};
use crate::storage::load_user_from_storage;
use leptos::prelude::*;

/// Cross-component refresh signal.
///
/// Move, delete, claim and manual refresh all emit the same payload-less
/// signal; any component can subscribe by tracking the tick. This replaces an
/// implicit global DOM event with an explicit service passed via context.
#[derive(Clone, Copy)]
pub(crate) struct RefreshBus(RwSignal<u64>);

impl RefreshBus {
    pub fn new() -> Self {
        Self(RwSignal::new(0))
    }

    pub fn emit(&self) {
        self.0.update(|x| *x = x.saturating_add(1));
    }

    /// Tracked read; call inside an Effect/closure to re-run on every emit.
    pub fn subscribe(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,

    /// Loaded from backend (authenticated) or mirrored from the guest store.
    pub projects: RwSignal<Vec<Project>>,
    pub categories: RwSignal<Vec<Category>>,

    pub library_loading: RwSignal<bool>,
    pub library_error: RwSignal<Option<String>>,

    /// Load guard: ignore responses of superseded loads.
    pub library_request_id: RwSignal<u64>,

    /// Monotonic per-mutation sequence. Delayed reloads capture it when they
    /// are scheduled and are dropped if a newer mutation happened since.
    pub mutation_seq: RwSignal<u64>,

    /// Library search query (title substring, case-insensitive).
    pub search_query: RwSignal<String>,

    pub refresh: RefreshBus,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
            projects: RwSignal::new(vec![]),
            categories: RwSignal::new(vec![]),
            library_loading: RwSignal::new(false),
            library_error: RwSignal::new(None),
            library_request_id: RwSignal::new(0),
            mutation_seq: RwSignal::new(0),
            search_query: RwSignal::new(String::new()),
            refresh: RefreshBus::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
