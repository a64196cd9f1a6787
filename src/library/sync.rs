use crate::api::ApiErrorKind;
use crate::guest::GuestStore;
use crate::models::Project;
use crate::state::AppContext;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

/// Delay before the post-mutation reload. Lets server-side consistency settle
/// and lets previously-truncated items fill the vacated preview slot. A
/// debounce, not a correctness requirement.
pub(crate) const RELOAD_SETTLE_MS: i32 = 300;

/// Optimistic category reassignment, applied to the in-memory list before the
/// server confirms.
pub(crate) fn apply_category_move(
    mut projects: Vec<Project>,
    project_id: &str,
    category_id: Option<String>,
) -> Vec<Project> {
    for p in projects.iter_mut() {
        if p.id == project_id {
            p.category_id = category_id.clone();
        }
    }
    projects
}

pub(crate) fn remove_project(mut projects: Vec<Project>, project_id: &str) -> Vec<Project> {
    projects.retain(|p| p.id != project_id);
    projects
}

/// A reload scheduled at `scheduled_seq` must be dropped if a newer mutation
/// has been applied since; otherwise it would overwrite fresher optimistic
/// state with an older server snapshot.
pub(crate) fn reload_is_stale(scheduled_seq: u64, latest_seq: u64) -> bool {
    scheduled_seq < latest_seq
}

/// A load response may only be applied if no newer load started while it was
/// in flight. Loads are never rejected up front; the latest one always runs
/// and supersedes anything still pending.
pub(crate) fn load_is_current(my_request: u64, latest_request: u64) -> bool {
    my_request == latest_request
}

/// Orchestrates optimistic library mutations (move to category, delete) and
/// their reconciliation with the server.
///
/// Protocol per mutation: apply locally right away, close any selection UI,
/// then call the server. Success schedules a delayed canonical reload plus a
/// refresh broadcast; failure logs and reloads immediately, which reverts the
/// optimistic change. The visible list never shows a moved-away/deleted item
/// after the user confirms.
#[derive(Clone)]
pub(crate) struct LibrarySyncController {
    app_state: AppContext,
}

impl LibrarySyncController {
    pub fn new(app_state: AppContext) -> Self {
        Self { app_state }
    }

    fn guest(&self) -> GuestStore {
        GuestStore::new(self.app_state.0.refresh)
    }

    fn is_authenticated(&self) -> bool {
        self.app_state.0.api_client.get_untracked().is_authenticated()
    }

    fn bump_mutation(&self) -> u64 {
        let seq = self.app_state.0.mutation_seq;
        seq.update(|x| *x = x.saturating_add(1));
        seq.get_untracked()
    }

    fn latest_mutation(&self) -> u64 {
        self.app_state.0.mutation_seq.get_untracked()
    }

    /// Initial/manual library load. Guest mode reads the local store and
    /// never touches the network.
    pub fn load_library(&self) {
        if !self.is_authenticated() {
            let records = self.guest().projects();
            self.app_state
                .0
                .projects
                .set(records.into_iter().map(Project::from).collect());
            self.app_state.0.categories.set(vec![]);
            self.app_state.0.library_error.set(None);
            return;
        }

        // No in-flight gate here: a refresh emitted mid-load must still be
        // honored. The request id supersedes the older load instead.
        let request_id = self.app_state.0.library_request_id;
        request_id.update(|x| *x = x.saturating_add(1));
        let my_request = request_id.get_untracked();

        self.app_state.0.library_loading.set(true);
        self.app_state.0.library_error.set(None);

        let s = self.clone();
        spawn_local(async move {
            let api_client = s.app_state.0.api_client.get_untracked();

            let result = async {
                let categories = api_client.get_categories().await?;
                let projects = api_client.get_projects(None).await?;
                Ok::<_, crate::api::ApiError>((categories, projects))
            }
            .await;

            // A newer load superseded this one; drop the response.
            if !load_is_current(my_request, request_id.get_untracked()) {
                return;
            }

            match result {
                Ok((categories, projects)) => {
                    s.app_state.0.categories.set(categories);
                    s.app_state.0.projects.set(projects);
                }
                Err(e) if e.kind == ApiErrorKind::Unauthorized => {
                    // Token expired: drop to guest view.
                    let mut api_client = s.app_state.0.api_client.get_untracked();
                    api_client.logout();
                    s.app_state.0.api_client.set(api_client);
                    s.app_state.0.current_user.set(None);
                    s.app_state.0.library_loading.set(false);
                    s.load_library();
                    return;
                }
                Err(e) => {
                    s.app_state.0.library_error.set(Some(e.to_string()));
                }
            }
            s.app_state.0.library_loading.set(false);
        });
    }

    /// Recategorize a project. `category_id = None` moves it to uncategorized.
    /// The caller is responsible for closing its selection UI immediately.
    /// Guest mode resolves against the local store with no server call.
    pub fn move_project(&self, project_id: String, category_id: Option<String>) {
        self.app_state
            .0
            .projects
            .update(|list| *list = apply_category_move(std::mem::take(list), &project_id, category_id.clone()));

        let seq = self.bump_mutation();

        if !self.is_authenticated() {
            // set_project_category emits the refresh signal.
            self.guest().set_project_category(&project_id, category_id);
            return;
        }

        let s = self.clone();
        spawn_local(async move {
            let api_client = s.app_state.0.api_client.get_untracked();
            match api_client
                .update_project_category(&project_id, category_id)
                .await
            {
                Ok(()) => s.schedule_reload(seq),
                Err(e) => {
                    // Revert by reloading canonical state; no error state is
                    // set for other components.
                    warn!("move project failed, reloading: {e}");
                    s.reload_now();
                }
            }
        });
    }

    /// Delete a project. Guest mode resolves locally with no server call.
    pub fn delete_project(&self, project_id: String) {
        self.app_state
            .0
            .projects
            .update(|list| *list = remove_project(std::mem::take(list), &project_id));

        let seq = self.bump_mutation();

        if !self.is_authenticated() {
            // remove_project emits the refresh signal.
            self.guest().remove_project(&project_id);
            return;
        }

        let s = self.clone();
        spawn_local(async move {
            let api_client = s.app_state.0.api_client.get_untracked();
            match api_client.delete_project(&project_id).await {
                Ok(()) => s.schedule_reload(seq),
                Err(e) => {
                    warn!("delete project failed, reloading: {e}");
                    s.reload_now();
                }
            }
        });
    }

    /// Delayed canonical reload + refresh broadcast, dropped if a newer
    /// mutation lands before the timer fires.
    fn schedule_reload(&self, seq: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let s = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            if reload_is_stale(seq, s.latest_mutation()) {
                return;
            }
            s.reload_from_server(seq);
            s.app_state.0.refresh.emit();
        });

        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            RELOAD_SETTLE_MS,
        );
    }

    /// Immediate reload at the current sequence (failure/revert path).
    fn reload_now(&self) {
        self.reload_from_server(self.latest_mutation());
    }

    fn reload_from_server(&self, seq: u64) {
        if !self.is_authenticated() {
            self.load_library();
            return;
        }

        let s = self.clone();
        spawn_local(async move {
            let api_client = s.app_state.0.api_client.get_untracked();

            let categories = api_client.get_categories().await;
            let projects = api_client.get_projects(None).await;

            // A newer mutation was applied while this round-trip was in
            // flight; its own reload will bring the canonical state.
            if reload_is_stale(seq, s.latest_mutation()) {
                return;
            }

            match (categories, projects) {
                (Ok(categories), Ok(projects)) => {
                    s.app_state.0.categories.set(categories);
                    s.app_state.0.projects.set(projects);
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!("library reload failed: {e}");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, category_id: Option<&str>) -> Project {
        Project {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            category_id: category_id.map(|s| s.to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            source_count: 0,
            first_source_id: None,
            status: None,
        }
    }

    #[test]
    fn apply_category_move_rewrites_only_the_target() {
        let list = vec![project("p1", Some("work")), project("p2", Some("work"))];

        let moved = apply_category_move(list, "p1", None);
        assert!(moved[0].category_id.is_none());
        assert_eq!(moved[1].category_id.as_deref(), Some("work"));
    }

    #[test]
    fn apply_category_move_unknown_id_is_noop() {
        let list = vec![project("p1", Some("work"))];
        let moved = apply_category_move(list.clone(), "zzz", None);
        assert_eq!(moved, list);
    }

    #[test]
    fn remove_project_drops_the_target() {
        let list = vec![project("p1", None), project("p2", None)];
        let out = remove_project(list, "p1");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "p2");
    }

    #[test]
    fn stale_reloads_are_detected() {
        // Reload scheduled at mutation 3; a 4th mutation landed since.
        assert!(reload_is_stale(3, 4));
        // Reload for the latest mutation applies.
        assert!(!reload_is_stale(4, 4));
        // Sequences never run backwards, but tolerate it anyway.
        assert!(!reload_is_stale(5, 4));
    }

    #[test]
    fn superseded_loads_are_dropped_not_rejected() {
        // First load in flight (id 1), a refresh starts load 2: the stale
        // response must be discarded and the new one applied.
        assert!(!load_is_current(1, 2));
        assert!(load_is_current(2, 2));
    }

    #[test]
    fn move_then_move_keeps_last_write() {
        // Two rapid moves: the in-memory list must reflect the later one.
        let list = vec![project("p1", Some("a"))];
        let list = apply_category_move(list, "p1", Some("b".to_string()));
        let list = apply_category_move(list, "p1", None);
        assert!(list[0].category_id.is_none());
    }
}
