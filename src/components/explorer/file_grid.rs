//! File grid component for explorer view.
//!
//! Tiles in listing order; images render as thumbnails from the gateway.
//! Each tile carries copy-link and delete actions.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::FileEntry;
use scoop_core::format::format_file_size;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/explorer/file_grid.module.css");

#[component]
pub fn FileGrid() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let entries = Signal::derive(move || {
        ctx.files
            .with(|files| files.as_ref().map(|l| l.files.clone()).unwrap_or_default())
    });
    let immutable = Signal::derive(move || ctx.drive.with(|d| d.as_ref().is_some_and(|d| d.immutable)));

    view! {
        <div class=css::grid role="list" aria-label="Files">
            <For
                each=move || entries.get()
                key=|entry| (entry.name.clone(), entry.size)
                children=move |entry| view! { <FileTile entry=entry immutable=immutable /> }
            />
        </div>
    }
}

#[component]
fn FileTile(entry: FileEntry, immutable: Signal<bool>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let url = ctx.file_url(&entry.account, &entry.name);
    let size = format_file_size(entry.size);
    let icon = ic::for_file(entry.kind());

    let preview = if entry.is_image() {
        let alt = entry.name.clone();
        view! { <img class=css::thumbnail src=url.clone() alt=alt loading="lazy" /> }.into_any()
    } else {
        view! { <span class=css::tileIcon><Icon icon=icon /></span> }.into_any()
    };

    let on_copy = {
        let account = entry.account.clone();
        let name = entry.name.clone();
        move |_: leptos::ev::MouseEvent| ctx.copy_link(&account, &name)
    };

    let account = entry.account.clone();
    let name = entry.name.clone();
    let on_delete = move |_: leptos::ev::MouseEvent| {
        if dom::confirm(&format!("Delete \"{}\"?", name)) {
            ctx.delete_file(account.clone(), name.clone());
        }
    };

    view! {
        <div class=css::tile role="listitem">
            <a class=css::link href=url target="_blank" rel="noopener noreferrer">
                <div class=css::preview>{preview}</div>
                <span class=css::name title=entry.name.clone()>{entry.name.clone()}</span>
            </a>
            <div class=css::footer>
                <span class=css::size>{size}</span>
                <span class=css::actions>
                    <button class=css::action on:click=on_copy title="Copy link">
                        <Icon icon=ic::LINK />
                    </button>
                    <button
                        class=css::action
                        on:click=on_delete
                        disabled=move || immutable.get()
                        title="Delete file"
                    >
                        <Icon icon=ic::TRASH />
                    </button>
                </span>
            </div>
        </div>
    }
}
