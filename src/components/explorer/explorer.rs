//! Main explorer component.
//!
//! The open drive with its header and either the grid or the table of files.

use leptos::prelude::*;

use scoop_core::LoadState;

use super::{FileGrid, FileTable, Header};
use crate::app::AppContext;
use crate::models::FileView;

stylance::import_crate_style!(css, "src/components/explorer/explorer.module.css");

/// File explorer view component.
#[component]
pub fn Explorer() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let is_table = Signal::derive(move || ctx.view.get() == FileView::Table);

    // Status line under the header; files stay visible when a refresh fails
    let status = Signal::derive(move || {
        ctx.files.with(|files| {
            let listing = files.as_ref()?;
            match &listing.load {
                _ if listing.loading && listing.files.is_empty() => {
                    Some("Loading files...".to_string())
                }
                LoadState::Empty => Some("This drive has no files yet.".to_string()),
                LoadState::Failed(err) => Some(err.to_string()),
                _ => None,
            }
        })
    });

    view! {
        <div class=css::explorer>
            <Header />

            {move || status.get().map(|text| view! { <p class=css::status>{text}</p> })}

            <div class=css::body>
                <Show when=move || is_table.get() fallback=|| view! { <FileGrid /> }>
                    <FileTable />
                </Show>
            </div>
        </div>
    }
}
