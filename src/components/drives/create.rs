//! Create-drive form.

use leptos::prelude::*;
use leptos_icons::Icon;

use scoop_core::SizeUnit;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::{DEFAULT_DRIVE_AMOUNT, MAX_DRIVE_NAME_LEN};

stylance::import_crate_style!(css, "src/components/drives/drives.module.css");

/// Name, amount and unit of a new storage account.
///
/// The size is sent as `"<amount><unit>"`; validation happens in the
/// coordinator so the form and programmatic callers agree.
#[component]
pub fn CreateDrive(#[prop(into)] on_submit: Callback<()>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let name = RwSignal::new(String::new());
    let amount = RwSignal::new(DEFAULT_DRIVE_AMOUNT.to_string());
    let unit = RwSignal::new(SizeUnit::Mb.as_str().to_string());

    let can_submit = Signal::derive(move || {
        !name.with(|n| n.trim().is_empty()) && amount.with(|a| a.parse::<u64>().is_ok_and(|a| a > 0))
    });

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if !can_submit.get_untracked() {
            return;
        }
        let size = format!("{}{}", amount.get_untracked().trim(), unit.get_untracked());
        ctx.create_drive(name.get_untracked().trim().to_string(), size);
        name.set(String::new());
        on_submit.run(());
    };

    view! {
        <form class=css::createForm on:submit=submit>
            <input
                class=css::textInput
                type="text"
                placeholder="Drive name"
                maxlength=MAX_DRIVE_NAME_LEN.to_string()
                prop:value=name
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <input
                class=css::amountInput
                type="number"
                min="1"
                prop:value=amount
                on:input=move |ev| amount.set(event_target_value(&ev))
            />
            <select
                class=css::unitSelect
                prop:value=unit
                on:change=move |ev| unit.set(event_target_value(&ev))
            >
                {SizeUnit::ALL
                    .into_iter()
                    .map(|u| view! { <option value=u.as_str()>{u.as_str()}</option> })
                    .collect::<Vec<_>>()}
            </select>
            <button class=css::primaryButton type="submit" disabled=move || !can_submit.get()>
                <Icon icon=ic::PLUS />
                <span>"Create"</span>
            </button>
        </form>
    }
}
