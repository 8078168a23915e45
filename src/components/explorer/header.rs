//! Explorer header component.
//!
//! Contains the back button, drive title, and the drive and file actions.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::models::FileView;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/explorer/explorer.module.css");

/// Explorer header with navigation and actions.
#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let input_ref = NodeRef::<leptos::html::Input>::new();

    // Derived signals
    let title = Signal::derive(move || {
        ctx.drive
            .with(|d| d.as_ref().map(|d| d.display_name.clone()))
            .or_else(|| ctx.selected.with(|s| s.as_ref().map(|id| id.to_string())))
            .unwrap_or_default()
    });
    let immutable = Signal::derive(move || ctx.drive.with(|d| d.as_ref().is_some_and(|d| d.immutable)));
    let view_type = Signal::derive(move || ctx.view.get());

    let on_back = move |_: leptos::ev::MouseEvent| ctx.close_drive();
    let on_refresh = move |_: leptos::ev::MouseEvent| ctx.refresh_files();

    let on_upload_click = move |_: leptos::ev::MouseEvent| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };
    let on_file_picked = move |ev: leptos::ev::Event| {
        let Some(input) = dom::event_input(&ev) else {
            return;
        };
        if let (Some(file), Some(id)) = (dom::selected_file(&input), ctx.selected.get_untracked()) {
            ctx.upload(id, file);
        }
        dom::reset_input(&input);
    };

    let on_lock = move |_: leptos::ev::MouseEvent| {
        let Some(id) = ctx.selected.get_untracked() else {
            return;
        };
        if dom::confirm("Make this drive immutable? Files can no longer be added or removed.") {
            ctx.make_immutable(id);
        }
    };

    let on_delete = move |_: leptos::ev::MouseEvent| {
        let Some(id) = ctx.selected.get_untracked() else {
            return;
        };
        if dom::confirm(&format!("Delete storage account \"{}\"?", title.get_untracked())) {
            ctx.delete_drive(id);
        }
    };

    let on_toggle_view = move |_: leptos::ev::MouseEvent| ctx.view.update(|v| *v = v.toggled());

    view! {
        <header class=css::header>
            <button class=css::navButton on:click=on_back title="All drives">
                <Icon icon=ic::DRIVE />
            </button>

            <div class=css::title>
                <span class=css::titleLabel>{title}</span>
                <Show when=move || immutable.get()>
                    <span class=css::badge title="Immutable"><Icon icon=ic::LOCK /></span>
                </Show>
            </div>

            <div class=css::actions>
                <button class=css::actionButton on:click=on_refresh title="Refresh">
                    <Icon icon=ic::REFRESH />
                </button>

                <input
                    node_ref=input_ref
                    type="file"
                    class=css::hiddenInput
                    on:change=on_file_picked
                />
                <button
                    class=css::actionButton
                    on:click=on_upload_click
                    title="Upload file"
                >
                    <Icon icon=ic::UPLOAD />
                </button>

                <button
                    class=css::actionButton
                    on:click=on_lock
                    disabled=move || immutable.get()
                    title="Make immutable"
                >
                    <Icon icon=ic::LOCK />
                </button>

                <button class=css::dangerButton on:click=on_delete title="Delete drive">
                    <Icon icon=ic::TRASH />
                </button>

                <button
                    class=css::actionButton
                    on:click=on_toggle_view
                    title=move || match view_type.get() {
                        FileView::Grid => "Table view",
                        FileView::Table => "Grid view",
                    }
                >
                    {move || match view_type.get() {
                        FileView::Grid => view! { <Icon icon=ic::LIST /> },
                        FileView::Table => view! { <Icon icon=ic::GRID /> },
                    }}
                </button>
            </div>
        </header>
    }
}
