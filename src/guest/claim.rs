use super::GuestStore;
use crate::state::AppContext;
use leptos::logging::warn;
use leptos::prelude::*;

/// Transfer guest-held projects to the account that just logged in.
///
/// Runs once per login event, after the token is stored and before
/// navigation. Success clears the guest store entirely (records + trial
/// flag) and broadcasts a refresh. Failure leaves guest state untouched so
/// the trial project is not silently lost; a later login retries naturally.
pub(crate) async fn run_claim_migration(app_state: &AppContext) {
    let guest = GuestStore::new(app_state.0.refresh);

    let ids = guest.project_ids();
    if ids.is_empty() {
        return;
    }

    let api_client = app_state.0.api_client.get_untracked();
    match api_client.claim_projects(ids).await {
        Ok(()) => {
            // clear() emits the refresh signal itself.
            guest.clear();
        }
        Err(e) => {
            warn!("claim migration failed, keeping guest projects: {e}");
        }
    }
}
