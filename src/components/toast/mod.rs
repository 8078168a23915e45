//! Toast component for the notifier's single notice.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::NoticeKind;

use crate::app::AppContext;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/toast/toast.module.css");

#[component]
pub fn Toast() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    move || {
        ctx.notice.get().map(|notice| {
            let (icon, tone) = match notice.kind {
                NoticeKind::Info => (ic::INFO, css::info),
                NoticeKind::Loading => (ic::LOADING, css::loading),
                NoticeKind::Success => (ic::SUCCESS, css::success),
                NoticeKind::Error => (ic::ERROR, css::error),
            };
            let id = notice.id;

            view! {
                <div class=format!("{} {}", css::toast, tone) role="status" aria-live="polite">
                    <span class=css::icon><Icon icon=icon /></span>
                    <div class=css::body>
                        <span class=css::title>{notice.kind.title()}</span>
                        <span class=css::message>{notice.message}</span>
                    </div>
                    <button
                        class=css::close
                        title="Dismiss"
                        on:click=move |_| ctx.dismiss_notice(id)
                    >
                        <Icon icon=ic::CLOSE />
                    </button>
                </div>
            }
        })
    }
}
