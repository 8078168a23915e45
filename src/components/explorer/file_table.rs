//! File table component for explorer view.
//!
//! Search box, name and size headers that toggle sorting, and copy-link and
//! delete actions per row.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::format::format_file_size;
use scoop_core::{FileEntry, SortKey, SortOrder};

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/explorer/file_table.module.css");

#[component]
pub fn FileTable() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let rows = Signal::derive(move || ctx.table_rows());
    let immutable = Signal::derive(move || ctx.drive.with(|d| d.as_ref().is_some_and(|d| d.immutable)));
    let search = Signal::derive(move || ctx.query.with(|q| q.search.clone()));

    let on_search = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        ctx.query.update(|q| q.search = value);
    };

    view! {
        <div class=css::table>
            <label class=css::search>
                <span class=css::searchIcon><Icon icon=ic::SEARCH /></span>
                <input
                    class=css::searchInput
                    type="search"
                    placeholder="Search files"
                    prop:value=search
                    on:input=on_search
                />
            </label>

            <div class=css::headerRow role="row">
                <SortHeader label="Name" key=SortKey::Name />
                <SortHeader label="Size" key=SortKey::Size />
                <span class=css::headerAction></span>
            </div>

            <For
                each=move || rows.get()
                key=|entry| (entry.name.clone(), entry.size)
                children=move |entry| view! { <FileRow entry=entry immutable=immutable /> }
            />

            <Show when=move || rows.with(|r| r.is_empty())>
                <p class=css::noMatch>"No files"</p>
            </Show>
        </div>
    }
}

/// Column header; clicking flips the order or switches the key.
#[component]
fn SortHeader(label: &'static str, key: SortKey) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let indicator = move || {
        ctx.query.with(|q| {
            (q.sort == key).then(|| match q.order {
                SortOrder::Ascending => view! { <Icon icon=ic::SORT_ASC /> },
                SortOrder::Descending => view! { <Icon icon=ic::SORT_DESC /> },
            })
        })
    };

    view! {
        <button
            class=css::headerCell
            role="columnheader"
            on:click=move |_| ctx.query.update(|q| q.sort_by(key))
        >
            <span>{label}</span>
            <span class=css::sortIcon>{indicator}</span>
        </button>
    }
}

#[component]
fn FileRow(entry: FileEntry, immutable: Signal<bool>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let url = ctx.file_url(&entry.account, &entry.name);
    let size = format_file_size(entry.size);
    let icon = ic::for_file(entry.kind());

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
        <div class=css::row role="row">
            <a class=css::nameCell href=url target="_blank" rel="noopener noreferrer">
                <span class=css::rowIcon><Icon icon=icon /></span>
                <span class=css::name>{entry.name.clone()}</span>
                <span class=css::linkIcon><Icon icon=ic::EXTERNAL_LINK /></span>
            </a>
            <span class=css::sizeCell>{size}</span>
            <span class=css::actionCell>
                <button class=css::copyButton on:click=on_copy title="Copy link">
                    <Icon icon=ic::LINK />
                </button>
                <button
                    class=css::deleteButton
                    on:click=on_delete
                    disabled=move || immutable.get()
                    title="Delete file"
                >
                    <Icon icon=ic::TRASH />
                </button>
            </span>
        </div>
    }
}
