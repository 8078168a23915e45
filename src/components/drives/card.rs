//! Drive card component.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::StorageAccount;
use scoop_core::format::format_usage;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/drives/drives.module.css");

/// One storage account with its usage bar and actions.
#[component]
pub fn DriveCard(account: StorageAccount) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let usage = format_usage(account.used_bytes, account.quota_bytes);
    let percent = account.usage_percent();
    let bar_width = format!("width: {:.2}%", account.usage_ratio() * 100.0);
    let immutable = account.immutable;
    let name = account.display_name.clone();

    let open_id = account.id.clone();
    let on_open = move |_: leptos::ev::MouseEvent| ctx.open_drive(open_id.clone());

    let lock_id = account.id.clone();
    let lock_name = name.clone();
    let on_lock = move |ev: leptos::ev::MouseEvent| {
        ev.stop_propagation();
        let prompt = format!(
            "Make \"{}\" immutable? Files can no longer be added or removed.",
            lock_name
        );
        if dom::confirm(&prompt) {
            ctx.make_immutable(lock_id.clone());
        }
    };

    let delete_id = account.id.clone();
    let delete_name = name.clone();
    let on_delete = move |ev: leptos::ev::MouseEvent| {
        ev.stop_propagation();
        if dom::confirm(&format!("Delete storage account \"{}\"?", delete_name)) {
            ctx.delete_drive(delete_id.clone());
        }
    };

    view! {
        <article class=css::card on:click=on_open title="Open drive">
            <div class=css::cardHeader>
                <span class=css::cardIcon><Icon icon=ic::DRIVE /></span>
                <span class=css::cardName>{name}</span>
                <Show when=move || immutable>
                    <span class=css::badge title="Immutable">
                        <Icon icon=ic::LOCK />
                        "Immutable"
                    </span>
                </Show>
            </div>

            <code class=css::cardId>{account.id.to_string()}</code>

            <div class=css::usageBar>
                <div class=css::usageFill style=bar_width></div>
            </div>
            <div class=css::usageLine>
                <span>{usage}</span>
                <span class=css::usagePercent>{percent}</span>
            </div>

            <div class=css::cardActions>
                <Show when=move || !immutable>
                    <button class=css::iconButton on:click=on_lock.clone() title="Make immutable">
                        <Icon icon=ic::LOCK />
                    </button>
                </Show>
                <button class=css::dangerButton on:click=on_delete title="Delete drive">
                    <Icon icon=ic::TRASH />
                </button>
            </div>
        </article>
    }
}
