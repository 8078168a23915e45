//! Drive list component.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::LoadState;

use super::{CreateDrive, DriveCard};
use crate::app::AppContext;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/drives/drives.module.css");

/// Storage accounts of the connected wallet.
///
/// Shows the create form on demand, a loading line during the first fetch,
/// and the "create one" message when the wallet owns no accounts.
#[component]
pub fn DriveList() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let (form_open, set_form_open) = signal(false);

    let accounts = Signal::derive(move || ctx.drives.with(|d| d.accounts.clone()));
    let is_empty = Signal::derive(move || ctx.drives.with(|d| d.is_empty_state()));
    let first_load = Signal::derive(move || {
        ctx.drives
            .with(|d| d.accounts.is_empty() && (d.loading || d.load == LoadState::Unloaded))
    });
    let failed = Signal::derive(move || {
        ctx.drives.with(|d| match &d.load {
            LoadState::Failed(err) if d.accounts.is_empty() => Some(err.to_string()),
            _ => None,
        })
    });

    let on_refresh = move |_: leptos::ev::MouseEvent| ctx.refresh_drives();
    let on_toggle_form = move |_: leptos::ev::MouseEvent| set_form_open.update(|open| *open = !*open);

    view! {
        <section class=css::drives>
            <header class=css::header>
                <h2 class=css::title>"My Drives"</h2>
                <div class=css::actions>
                    <button class=css::iconButton on:click=on_refresh title="Refresh">
                        <Icon icon=ic::REFRESH />
                    </button>
                    <button class=css::primaryButton on:click=on_toggle_form>
                        {move || {
                            let icon = if form_open.get() { ic::CLOSE } else { ic::PLUS };
                            view! { <Icon icon=icon /> }
                        }}
                        <span>{move || if form_open.get() { "Cancel" } else { "New Drive" }}</span>
                    </button>
                </div>
            </header>

            <Show when=move || form_open.get()>
                <CreateDrive on_submit=Callback::new(move |_| set_form_open.set(false)) />
            </Show>

            <Show when=move || first_load.get()>
                <p class=css::placeholder>"Loading drives..."</p>
            </Show>

            {move || failed.get().map(|message| view! { <p class=css::failed>{message}</p> })}

            <Show when=move || is_empty.get()>
                <div class=css::empty>
                    <span class=css::emptyIcon><Icon icon=ic::DRIVE /></span>
                    <p>"Create a Storage Account to get started"</p>
                </div>
            </Show>

            <div class=css::grid>
                <For
                    each=move || accounts.get()
                    key=|account| (account.id.clone(), account.used_bytes, account.immutable)
                    children=move |account| view! { <DriveCard account=account /> }
                />
            </div>
        </section>
    }
}
