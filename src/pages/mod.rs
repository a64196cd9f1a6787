use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::guest::{run_claim_migration, GuestStore};
use crate::library::{group_projects, LibrarySyncController};
use crate::models::{GuestProjectRecord, Project, ProjectGroup};
use crate::state::AppContext;
use crate::storage::{load_last_tab, save_last_tab, save_user_to_storage};
use crate::util::{new_guest_id, now_iso};
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;
use wasm_bindgen::JsCast;

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();
        let app_state = app_state.clone();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.account);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.account));

                    // Hand any guest trial project to this account before we
                    // leave the page. Failure keeps guest state for a later
                    // login; it never blocks sign-in.
                    run_claim_migration(&app_state).await;

                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Recapio"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Log in"</CardTitle>
                        <CardDescription class="text-xs">"Use your email and password to continue."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Continue" }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "No account? "
                                <a class="text-primary underline underline-offset-4" href="/signup">"Sign up"</a>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let confirm_password_val = confirm_password.get();
        let api_client = app_state.0.api_client.get_untracked();

        if password_val != confirm_password_val {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        if password_val.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.signup(&email_val, &password_val).await {
                Ok(_response) => {
                    // Backend returns a token on signup; we keep UX simple and ask user to sign in.
                    success.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Recapio"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Create account"</CardTitle>
                        <CardDescription class="text-xs">"Your guest project comes with you."</CardDescription>
                    </CardHeader>
                    <CardContent>
                        <Show
                            when=move || !success.get()
                            fallback=move || view! {
                                <Alert>
                                    <AlertDescription class="text-xs">
                                        "Account created. You can now "
                                        <a class="text-primary underline underline-offset-4" href="/login">"log in"</a>
                                        "."
                                    </AlertDescription>
                                </Alert>
                            }
                        >
                            <form class="flex flex-col gap-3" on:submit=on_submit>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="email" class="text-xs">"Email"</Label>
                                    <Input
                                        id="email"
                                        r#type="email"
                                        placeholder="you@example.com"
                                        bind_value=email
                                        required=true
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="password" class="text-xs">"Password"</Label>
                                    <Input
                                        id="password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=password
                                        required=true
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="confirm_password" class="text-xs">"Confirm password"</Label>
                                    <Input
                                        id="confirm_password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=confirm_password
                                        required=true
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                    {move || {
                                        error.get().map(|e| {
                                            view! {
                                                <Alert class="border-destructive/30">
                                                    <AlertDescription class="text-destructive text-xs">
                                                        {e}
                                                    </AlertDescription>
                                                </Alert>
                                            }
                                        })
                                    }}
                                </Show>

                                <Button
                                    class="w-full"
                                    size=ButtonSize::Sm
                                    attr:disabled=move || loading.get()
                                >
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || loading.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if loading.get() { "Creating..." } else { "Continue" }}
                                    </span>
                                </Button>

                                <div class="pt-1 text-xs text-muted-foreground">
                                    "Already have an account? "
                                    <a class="text-primary underline underline-offset-4" href="/login">"Log in"</a>
                                </div>
                            </form>
                        </Show>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        app_state.0.projects.set(vec![]);
        app_state.0.categories.set(vec![]);
        let _ = window().location().set_href("/");
    };

    let children = StoredValue::new(children);

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b border-border">
                <div class="mx-auto flex w-full max-w-5xl items-center justify-between px-4 py-3">
                    <a href="/" class="text-sm font-medium text-foreground">"Recapio"</a>

                    <div class="flex items-center gap-2">
                        <Show
                            when=is_authenticated
                            fallback=move || view! {
                                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm href="/login".to_string()>
                                    "Log in"
                                </Button>
                                <Button size=ButtonSize::Sm href="/signup".to_string()>
                                    "Sign up"
                                </Button>
                            }
                        >
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=on_logout
                            >
                                "Sign out"
                            </Button>
                        </Show>
                    </div>
                </div>
            </header>

            <main class="mx-auto w-full max-w-5xl px-4 py-6">
                {move || children.with_value(|c| c())}
            </main>
        </div>
    }
}

#[component]
fn ProjectCard(
    project: Project,
    controller: StoredValue<LibrarySyncController>,
    move_menu_for: RwSignal<Option<String>>,
    delete_target: RwSignal<Option<(String, String)>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    // Guests have no categories to move between; the store-level move path
    // exists for symmetry but gets no UI.
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    let id = project.id.clone();
    let title = project.title.clone();
    let description = project.description.clone().unwrap_or_default();
    let source_count = project.source_count;
    // Kept verbatim for the dropdown highlight, even when the id matches no
    // known category (grouping treats those as uncategorized separately).
    let selected_category = project.category_id.clone();

    let id_for_menu = id.clone();
    let id_for_menu_check = id.clone();
    let id_for_delete = id.clone();
    let title_for_delete = title.clone();
    let href = format!("/project/{id}");

    let menu_open = move || move_menu_for.get().as_deref() == Some(id_for_menu_check.as_str());

    view! {
        <Card class="relative gap-2 py-4">
            <CardHeader class="px-4">
                <a href=href class="min-w-0">
                    <CardTitle class="truncate text-sm hover:underline">{title}</CardTitle>
                </a>
                <CardDescription class="line-clamp-2 text-xs">{description}</CardDescription>
            </CardHeader>

            <CardContent class="px-4">
                <div class="flex items-center justify-between gap-2">
                    <div class="text-xs text-muted-foreground">
                        {format!("{source_count} source{}", if source_count == 1 { "" } else { "s" })}
                    </div>

                    <div class="flex items-center gap-1">
                        <Show when=is_authenticated fallback=|| ().into_view()>
                            {
                                let id_for_menu = id_for_menu.clone();
                                move || {
                                    let id = id_for_menu.clone();
                                    view! {
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            class="h-7 px-2 text-xs"
                                            attr:title="Move to category"
                                            on:click=move |ev: web_sys::MouseEvent| {
                                                ev.stop_propagation();
                                                let id = id.clone();
                                                move_menu_for.update(|open| {
                                                    *open = if open.as_deref() == Some(id.as_str()) {
                                                        None
                                                    } else {
                                                        Some(id)
                                                    };
                                                });
                                            }
                                        >
                                            "Move"
                                        </Button>
                                    }
                                }
                            }
                        </Show>

                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="h-7 px-2 text-xs text-destructive"
                            attr:title="Delete"
                            on:click=move |ev: web_sys::MouseEvent| {
                                ev.stop_propagation();
                                delete_target.set(Some((id_for_delete.clone(), title_for_delete.clone())));
                            }
                        >
                            "Delete"
                        </Button>
                    </div>
                </div>
            </CardContent>

            <Show when=menu_open fallback=|| ().into_view()>
                {
                    let id = id.clone();
                    let selected = selected_category.clone();
                    move || {
                        let id = id.clone();
                        let selected = selected.clone();
                        let categories = app_state.0.categories.get();

                        let uncat_selected = selected.is_none();
                        let id_for_uncat = id.clone();

                        view! {
                            <div class="absolute right-2 top-10 z-40 min-w-[160px] rounded-md border border-border bg-background p-1 shadow-lg">
                                <button
                                    class=move || format!(
                                        "w-full rounded-sm px-2 py-1.5 text-left text-xs hover:bg-accent {}",
                                        if uncat_selected { "font-semibold" } else { "" }
                                    )
                                    on:click=move |_| {
                                        // Close the menu first; the move is optimistic.
                                        move_menu_for.set(None);
                                        controller.with_value(|c| c.move_project(id_for_uncat.clone(), None));
                                    }
                                >
                                    "Uncategorized"
                                </button>

                                {categories
                                    .into_iter()
                                    .map(|cat| {
                                        let is_selected = selected.as_deref() == Some(cat.id.as_str());
                                        let id = id.clone();
                                        let cat_id = cat.id.clone();
                                        view! {
                                            <button
                                                class=move || format!(
                                                    "w-full rounded-sm px-2 py-1.5 text-left text-xs hover:bg-accent {}",
                                                    if is_selected { "font-semibold" } else { "" }
                                                )
                                                on:click=move |_| {
                                                    move_menu_for.set(None);
                                                    controller.with_value(|c| {
                                                        c.move_project(id.clone(), Some(cat_id.clone()))
                                                    });
                                                }
                                            >
                                                {cat.name}
                                            </button>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        }
                    }
                }
            </Show>
        </Card>
    }
}

#[component]
fn LibraryGroup(
    group: ProjectGroup,
    controller: StoredValue<LibrarySyncController>,
    move_menu_for: RwSignal<Option<String>>,
    delete_target: RwSignal<Option<(String, String)>>,
    rename_category: RwSignal<Option<(String, String)>>,
    delete_category: RwSignal<Option<(String, String)>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    let name = group.name.clone();
    let total = group.total_count;
    let overflow = group.overflow();
    let category_id = group.category_id.clone();
    let visible: Vec<Project> = group.visible().to_vec();

    let cat_for_rename = category_id.clone();
    let name_for_rename = name.clone();
    let cat_for_delete = category_id.clone();
    let name_for_delete = name.clone();
    let is_category = category_id.is_some();

    view! {
        <section class="space-y-2">
            <div class="flex items-center justify-between">
                <div class="flex items-baseline gap-2">
                    <h2 class="text-sm font-semibold">{name}</h2>
                    <span class="text-xs text-muted-foreground">{format!("{total}")}</span>
                </div>

                <Show when=move || is_category && is_authenticated() fallback=|| ().into_view()>
                    <div class="flex items-center gap-1">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="h-6 px-2 text-xs text-muted-foreground"
                            on:click={
                                let cat = cat_for_rename.clone();
                                let name = name_for_rename.clone();
                                move |_| {
                                    if let Some(id) = cat.clone() {
                                        rename_category.set(Some((id, name.clone())));
                                    }
                                }
                            }
                        >
                            "Rename"
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="h-6 px-2 text-xs text-destructive"
                            on:click={
                                let cat = cat_for_delete.clone();
                                let name = name_for_delete.clone();
                                move |_| {
                                    if let Some(id) = cat.clone() {
                                        delete_category.set(Some((id, name.clone())));
                                    }
                                }
                            }
                        >
                            "Delete"
                        </Button>
                    </div>
                </Show>
            </div>

            <div class="grid gap-3 sm:grid-cols-2">
                {visible
                    .into_iter()
                    .map(|p| view! {
                        <ProjectCard
                            project=p
                            controller=controller
                            move_menu_for=move_menu_for
                            delete_target=delete_target
                        />
                    })
                    .collect_view()}
            </div>

            <Show when={move || overflow > 0} fallback=|| ().into_view()>
                <div class="text-xs text-muted-foreground">
                    {format!("+{overflow} more")}
                </div>
            </Show>
        </section>
    }
}

#[component]
pub fn LibraryPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = StoredValue::new(LibrarySyncController::new(app_state.clone()));
    let guest = GuestStore::new(app_state.0.refresh);

    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    let search_query = app_state.0.search_query;
    let search_ref: NodeRef<html::Input> = NodeRef::new();

    // Selection/confirmation UI state.
    let move_menu_for: RwSignal<Option<String>> = RwSignal::new(None);
    let delete_target: RwSignal<Option<(String, String)>> = RwSignal::new(None);

    // Category management dialogs.
    let create_category_open: RwSignal<bool> = RwSignal::new(false);
    let create_category_name: RwSignal<String> = RwSignal::new(String::new());
    let create_category_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_category_loading: RwSignal<bool> = RwSignal::new(false);

    let rename_category: RwSignal<Option<(String, String)>> = RwSignal::new(None);
    let rename_value: RwSignal<String> = RwSignal::new(String::new());
    let rename_error: RwSignal<Option<String>> = RwSignal::new(None);
    let rename_loading: RwSignal<bool> = RwSignal::new(false);

    let delete_category: RwSignal<Option<(String, String)>> = RwSignal::new(None);
    let delete_category_loading: RwSignal<bool> = RwSignal::new(false);

    // Guest trial creation dialog.
    let guest_create_open: RwSignal<bool> = RwSignal::new(false);
    let guest_title: RwSignal<String> = RwSignal::new(String::new());
    let guest_error: RwSignal<Option<String>> = RwSignal::new(None);

    // Initial load + refresh bus subscription: move, delete, claim and guest
    // store mutations all funnel through the same signal.
    Effect::new(move |_| {
        let _tick = app_state.0.refresh.subscribe();
        controller.with_value(|c| c.load_library());
    });

    // Seed the rename input when a rename target is picked.
    Effect::new(move |_| {
        if let Some((_, name)) = rename_category.get() {
            rename_value.set(name);
            rename_error.set(None);
        }
    });

    // Keyboard shortcuts:
    // - Cmd/Ctrl+K: focus search
    // - Esc: blur search, close any open category menu
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let is_meta = ev.meta_key() || ev.ctrl_key();
        let key = ev.key().to_lowercase();

        // Avoid hijacking shortcuts while typing in inputs.
        let target_tag = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .map(|el| el.tag_name().to_lowercase());

        if let Some(tag) = target_tag {
            if tag == "input" || tag == "textarea" {
                // Allow Escape to still blur.
                if key != "escape" {
                    return;
                }
            }
        }

        if is_meta && key == "k" {
            ev.prevent_default();
            if let Some(input) = search_ref.get() {
                let _ = input.focus();
            }
            return;
        }

        if key == "escape" {
            move_menu_for.set(None);
            if let Some(input) = search_ref.get() {
                let _ = input.blur();
            }
        }
    });

    let on_confirm_delete = move |_: web_sys::MouseEvent| {
        if let Some((id, _)) = delete_target.get_untracked() {
            // Close the confirmation immediately; removal is optimistic.
            delete_target.set(None);
            controller.with_value(|c| c.delete_project(id));
        }
    };

    let submit_create_category = move |_: web_sys::MouseEvent| {
        if create_category_loading.get_untracked() {
            return;
        }

        let name = create_category_name.get_untracked();
        if name.trim().is_empty() {
            create_category_error.set(Some("Category name is required".to_string()));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        create_category_loading.set(true);
        create_category_error.set(None);

        spawn_local(async move {
            match api_client.create_category(name.trim()).await {
                Ok(_) => {
                    create_category_open.set(false);
                    create_category_name.set(String::new());
                    app_state.0.refresh.emit();
                }
                Err(e) => create_category_error.set(Some(e.to_string())),
            }
            create_category_loading.set(false);
        });
    };

    let submit_rename_category = move |_: web_sys::MouseEvent| {
        if rename_loading.get_untracked() {
            return;
        }

        let Some((id, _)) = rename_category.get_untracked() else {
            return;
        };
        let new_name = rename_value.get_untracked();
        if new_name.trim().is_empty() {
            rename_error.set(Some("Name cannot be empty".to_string()));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        rename_loading.set(true);
        rename_error.set(None);

        spawn_local(async move {
            match api_client.update_category(&id, new_name.trim()).await {
                Ok(_) => {
                    rename_category.set(None);
                    app_state.0.refresh.emit();
                }
                Err(e) => rename_error.set(Some(e.to_string())),
            }
            rename_loading.set(false);
        });
    };

    let submit_delete_category = move |_: web_sys::MouseEvent| {
        if delete_category_loading.get_untracked() {
            return;
        }

        let Some((id, _)) = delete_category.get_untracked() else {
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        delete_category_loading.set(true);

        spawn_local(async move {
            // The server reassigns the category's projects to uncategorized;
            // the refresh reload reflects that.
            match api_client.delete_category(&id).await {
                Ok(_) => {
                    delete_category.set(None);
                    app_state.0.refresh.emit();
                }
                Err(e) => {
                    leptos::logging::warn!("delete category failed: {e}");
                    delete_category.set(None);
                }
            }
            delete_category_loading.set(false);
        });
    };

    let open_guest_create = move |_: web_sys::MouseEvent| {
        // Trial gate: blocked here, before any storage or network call.
        if !guest.can_create() {
            return;
        }
        guest_title.set(String::new());
        guest_error.set(None);
        guest_create_open.set(true);
    };

    let submit_guest_create = move |_: web_sys::MouseEvent| {
        let title = guest_title.get_untracked();
        if title.trim().is_empty() {
            guest_error.set(Some("Give your project a title".to_string()));
            return;
        }
        if !guest.can_create() {
            guest_error.set(Some("The guest trial allows one project".to_string()));
            return;
        }

        guest.record_project(GuestProjectRecord {
            id: new_guest_id(),
            title: title.trim().to_string(),
            created_at: now_iso(),
            first_source_id: None,
            category_id: None,
            source_count: 1,
        });
        // record_project emits the refresh signal; the library reloads itself.
        guest_create_open.set(false);
    };

    let grouped = move || {
        group_projects(
            &app_state.0.projects.get(),
            &app_state.0.categories.get(),
            &app_state.0.search_query.get(),
        )
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-3">
                <div class="min-w-0 flex-1">
                    <div class="flex items-center gap-2">
                        <Input
                            node_ref=search_ref
                            r#type="search"
                            placeholder="Search projects…"
                            bind_value=search_query
                            class="h-8 max-w-xs text-sm"
                        />
                        <span class="hidden rounded-md border border-border px-2 py-1 font-mono text-[11px] text-muted-foreground sm:inline">
                            "⌘K"
                        </span>
                    </div>
                </div>

                <div class="flex items-center gap-2">
                    <Show
                        when=is_authenticated
                        fallback=move || view! {
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || !guest.can_create()
                                attr:title=move || {
                                    if guest.can_create() {
                                        "Add your trial project"
                                    } else {
                                        "Guest trial allows one project; sign up to add more"
                                    }
                                }
                                on:click=open_guest_create
                            >
                                {move || if guest.can_create() { "New project" } else { "Trial used" }}
                            </Button>
                        }
                    >
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| {
                                create_category_name.set(String::new());
                                create_category_error.set(None);
                                create_category_open.set(true);
                            }
                        >
                            "New category"
                        </Button>
                    </Show>
                </div>
            </div>

            <Show when=move || !is_authenticated() fallback=|| ().into_view()>
                <Alert>
                    <AlertDescription class="text-xs">
                        "You are browsing as a guest. "
                        <a class="text-primary underline underline-offset-4" href="/login">"Log in"</a>
                        " to keep your project and unlock unlimited uploads."
                    </AlertDescription>
                </Alert>
            </Show>

            <Show when=move || app_state.0.library_error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    app_state.0.library_error.get().map(|e| view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    })
                }}
            </Show>

            <Show
                when=move || !grouped().is_empty()
                fallback=move || view! {
                    <div class="rounded-md border border-dashed border-border px-4 py-10 text-center text-sm text-muted-foreground">
                        {move || {
                            if app_state.0.library_loading.get() {
                                "Loading library…".to_string()
                            } else if !app_state.0.search_query.get().trim().is_empty() {
                                "No projects match your search.".to_string()
                            } else {
                                "No projects yet. Add a link or file to get started.".to_string()
                            }
                        }}
                    </div>
                }
            >
                <div class="space-y-6">
                    {move || {
                        grouped()
                            .into_iter()
                            .map(|g| view! {
                                <LibraryGroup
                                    group=g
                                    controller=controller
                                    move_menu_for=move_menu_for
                                    delete_target=delete_target
                                    rename_category=rename_category
                                    delete_category=delete_category
                                />
                            })
                            .collect_view()
                    }}
                </div>
            </Show>

            // Delete project confirmation.
            <Show when=move || delete_target.get().is_some() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium text-destructive">"Delete project"</div>
                            <div class="text-xs text-muted-foreground">
                                {move || {
                                    delete_target
                                        .get()
                                        .map(|(_, title)| format!("\"{title}\" and its generated content will be removed."))
                                        .unwrap_or_default()
                                }}
                            </div>
                        </div>

                        <div class="flex items-center justify-end gap-2 pt-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| delete_target.set(None)
                            >
                                "Cancel"
                            </Button>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                class="border-destructive/40 text-destructive"
                                on:click=on_confirm_delete
                            >
                                "Delete"
                            </Button>
                        </div>
                    </div>
                </div>
            </Show>

            // Create category.
            <Show when=move || create_category_open.get() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 text-sm font-medium">"New category"</div>

                        <div class="space-y-2">
                            <div class="space-y-1">
                                <Label class="text-xs">"Name"</Label>
                                <Input bind_value=create_category_name class="h-8 text-sm" placeholder="e.g. Biology" />
                            </div>

                            <Show when=move || create_category_error.get().is_some() fallback=|| ().into_view()>
                                {move || create_category_error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })}
                            </Show>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || create_category_loading.get()
                                    on:click=move |_| create_category_open.set(false)
                                >
                                    "Cancel"
                                </Button>
                                <Button
                                    size=ButtonSize::Sm
                                    attr:disabled=move || create_category_loading.get()
                                    on:click=submit_create_category
                                >
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || create_category_loading.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if create_category_loading.get() { "Creating..." } else { "Create" }}
                                    </span>
                                </Button>
                            </div>
                        </div>
                    </div>
                </div>
            </Show>

            // Rename category.
            <Show when=move || rename_category.get().is_some() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 text-sm font-medium">"Rename category"</div>

                        <div class="space-y-2">
                            <div class="space-y-1">
                                <Label class="text-xs">"Name"</Label>
                                <Input bind_value=rename_value class="h-8 text-sm" />
                            </div>

                            <Show when=move || rename_error.get().is_some() fallback=|| ().into_view()>
                                {move || rename_error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })}
                            </Show>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || rename_loading.get()
                                    on:click=move |_| rename_category.set(None)
                                >
                                    "Cancel"
                                </Button>
                                <Button
                                    size=ButtonSize::Sm
                                    attr:disabled=move || rename_loading.get()
                                    on:click=submit_rename_category
                                >
                                    {move || if rename_loading.get() { "Saving..." } else { "Save" }}
                                </Button>
                            </div>
                        </div>
                    </div>
                </div>
            </Show>

            // Delete category (projects fall back to uncategorized server-side).
            <Show when=move || delete_category.get().is_some() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium text-destructive">"Delete category"</div>
                            <div class="text-xs text-muted-foreground">
                                {move || {
                                    delete_category
                                        .get()
                                        .map(|(_, name)| format!("Projects in \"{name}\" move to Uncategorized."))
                                        .unwrap_or_default()
                                }}
                            </div>
                        </div>

                        <div class="flex items-center justify-end gap-2 pt-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                attr:disabled=move || delete_category_loading.get()
                                on:click=move |_| delete_category.set(None)
                            >
                                "Cancel"
                            </Button>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                class="border-destructive/40 text-destructive"
                                attr:disabled=move || delete_category_loading.get()
                                on:click=submit_delete_category
                            >
                                "Delete"
                            </Button>
                        </div>
                    </div>
                </div>
            </Show>

            // Guest trial creation.
            <Show when=move || guest_create_open.get() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium">"Try Recapio"</div>
                            <div class="text-xs text-muted-foreground">
                                "One free project as a guest. It stays on this device until you sign up."
                            </div>
                        </div>

                        <div class="space-y-2">
                            <div class="space-y-1">
                                <Label class="text-xs">"Title"</Label>
                                <Input bind_value=guest_title class="h-8 text-sm" placeholder="Paste a link or name your upload" />
                            </div>

                            <Show when=move || guest_error.get().is_some() fallback=|| ().into_view()>
                                {move || guest_error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })}
                            </Show>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| guest_create_open.set(false)
                                >
                                    "Cancel"
                                </Button>
                                <Button size=ButtonSize::Sm on:click=submit_guest_create>
                                    "Create"
                                </Button>
                            </div>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}

const PROJECT_TABS: [(&str, &str); 4] = [
    ("summary", "Summary"),
    ("chat", "Chat"),
    ("quiz", "Quiz"),
    ("flashcards", "Flashcards"),
];

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ProjectRouteParams {
    pub project_id: Option<String>,
}

#[component]
pub fn ProjectPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<ProjectRouteParams>();

    let project_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.project_id)
            .unwrap_or_default()
    };

    let active_tab: RwSignal<String> = RwSignal::new("summary".to_string());

    // Restore the last active tab for this project; falls back to summary on
    // anything unknown (including stale storage values).
    Effect::new(move |_| {
        let id = project_id();
        if id.trim().is_empty() {
            return;
        }

        let stored = load_last_tab(&id);
        let restored = stored
            .filter(|t| PROJECT_TABS.iter().any(|(k, _)| *k == t.as_str()))
            .unwrap_or_else(|| "summary".to_string());
        active_tab.set(restored);
    });

    let project_title = move || {
        let id = project_id();
        app_state
            .0
            .projects
            .get()
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.title)
            .unwrap_or_else(|| "Project".to_string())
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-lg font-semibold">{project_title}</h1>
                    <a href="/" class="text-xs text-muted-foreground hover:underline">"← Library"</a>
                </div>
            </div>

            <div class="flex items-center gap-1 border-b border-border">
                {PROJECT_TABS
                    .iter()
                    .map(|(key, label)| {
                        let key = key.to_string();
                        let key_for_class = key.clone();
                        view! {
                            <button
                                class=move || format!(
                                    "border-b-2 px-3 py-2 text-sm transition-colors {}",
                                    if active_tab.get() == key_for_class {
                                        "border-primary font-medium text-foreground"
                                    } else {
                                        "border-transparent text-muted-foreground hover:text-foreground"
                                    }
                                )
                                on:click=move |_| {
                                    active_tab.set(key.clone());
                                    let id = project_id();
                                    save_last_tab(&id, &key);
                                }
                            >
                                {*label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            // Tab content is produced by the backend (summaries, chat, quiz,
            // flashcards); this shell only preserves navigation state.
            <Card>
                <CardContent>
                    <div class="py-8 text-center text-sm text-muted-foreground">
                        {move || {
                            match active_tab.get().as_str() {
                                "chat" => "Chat with this content once processing completes.",
                                "quiz" => "Quiz questions are generated from your sources.",
                                "flashcards" => "Flashcards are generated from your sources.",
                                _ => "A summary of this content will appear here.",
                            }
                        }}
                    </div>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <AppLayout>
            <LibraryPage />
        </AppLayout>
    }
}
