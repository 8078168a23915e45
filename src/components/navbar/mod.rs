//! Navigation bar component.
//!
//! Displays the app name, cluster selection, pending transactions and the
//! wallet button.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::{APP_NAME, Cluster};
use crate::models::WalletState;

stylance::import_crate_style!(css, "src/components/navbar/navbar.module.css");

/// Navigation bar.
///
/// ## Responsive behavior
///
/// | Breakpoint | Display |
/// |------------|---------|
/// | Desktop (> 768px) | `Scoop · mainnet-beta · 2 pending · AbCd...WxYz` |
/// | Mobile (< 480px) | Cluster label hidden, wallet shows its icon only |
#[component]
pub fn Navbar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    let session_name = Signal::derive(move || ctx.wallet.with(|w| w.display_name()));
    let busy = Signal::derive(move || ctx.busy.get());

    let on_wallet = move |_: leptos::ev::MouseEvent| match ctx.wallet.get_untracked() {
        WalletState::Connected { .. } => ctx.disconnect_wallet(),
        WalletState::Connecting => {}
        WalletState::Disconnected => ctx.connect_wallet(),
    };
    let wallet_title = Signal::derive(move || {
        if ctx.wallet.with(|w| w.is_connected()) {
            "Disconnect wallet"
        } else {
            "Connect wallet"
        }
    });

    let on_cluster = move |ev: leptos::ev::Event| {
        let cluster = match event_target_value(&ev).as_str() {
            "devnet" => Cluster::Devnet,
            _ => Cluster::MainnetBeta,
        };
        ctx.set_cluster(cluster);
    };

    let on_home = move |_: leptos::ev::MouseEvent| ctx.close_drive();

    view! {
        <header class=css::bar>
            <button class=css::brand on:click=on_home title="My drives">
                <span class=css::brandIcon><Icon icon=ic::DRIVE /></span>
                <span class=css::brandName>{APP_NAME}</span>
            </button>

            <div class=css::section>
                <label class=css::cluster>
                    <span class=css::labelIcon><Icon icon=ic::NETWORK /></span>
                    <select
                        class=css::clusterSelect
                        on:change=on_cluster
                        prop:value=move || ctx.cluster.get().name()
                    >
                        <option value=Cluster::MainnetBeta.name()>{Cluster::MainnetBeta.name()}</option>
                        <option value=Cluster::Devnet.name()>{Cluster::Devnet.name()}</option>
                    </select>
                </label>

                <Show when=move || { busy.get() > 0 }>
                    <span class=css::pending title="Transactions awaiting confirmation">
                        <span class=css::spinner><Icon icon=ic::LOADING /></span>
                        {move || format!("{} pending", busy.get())}
                    </span>
                </Show>

                <button class=css::walletButton on:click=on_wallet title=wallet_title>
                    <Icon icon=ic::WALLET />
                    <span class=css::walletLabel>{session_name}</span>
                </button>
            </div>
        </header>
    }
}
