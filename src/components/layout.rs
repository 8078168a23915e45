//! Page layout.
//!
//! Picks the main view from the wallet and selection state: a landing card
//! while disconnected, the drive list, or the explorer of the open drive.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::drives::DriveList;
use crate::components::explorer::Explorer;
use crate::components::icons as ic;
use crate::components::navbar::Navbar;
use crate::components::toast::Toast;
use crate::config::{APP_NAME, APP_TAGLINE};

stylance::import_crate_style!(css, "src/components/layout.module.css");

#[component]
pub fn Layout() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    let connected = Signal::derive(move || ctx.wallet.with(|w| w.is_connected()));
    let drive_open = Signal::derive(move || ctx.selected.with(|s| s.is_some()));

    view! {
        <div class=css::layout>
            <Navbar />
            <main class=css::main>
                <Show when=move || connected.get() fallback=|| view! { <Landing /> }>
                    <Show when=move || drive_open.get() fallback=|| view! { <DriveList /> }>
                        <Explorer />
                    </Show>
                </Show>
            </main>
            <Toast />
        </div>
    }
}

/// Shown until a wallet is connected.
#[component]
fn Landing() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    view! {
        <section class=css::landing>
            <span class=css::landingIcon><Icon icon=ic::DRIVE /></span>
            <h1 class=css::landingTitle>{APP_NAME}</h1>
            <p class=css::landingTagline>{APP_TAGLINE}</p>
            <button class=css::connectButton on:click=move |_| ctx.connect_wallet()>
                <Icon icon=ic::WALLET />
                <span>"Connect Wallet"</span>
            </button>
        </section>
    }
}
