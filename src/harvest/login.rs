//! Scripted portal login up to the document list.
//!
//! The login widgets are web components: the real `<input>` sits in the
//! shadow root of `#login-form_username` / `#login-form_password`, so the
//! value is set by script and `input`/`change` events are dispatched for the
//! widget to notice it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::info;

use super::HarvestError;
use crate::browser::{BrowserError, BrowserSession, ReadinessWaiter, WaitCondition, js_string};
use crate::config::{Credentials, HarvestTimings};

pub(crate) const USERNAME_FIELD: &str = "#login-form_username";
pub(crate) const USERNAME_SUBMIT: &str = "#verifUseridBtn";
pub(crate) const PASSWORD_FIELD: &str = "#login-form_password";
pub(crate) const PASSWORD_SUBMIT: &str = "#signBtn";

/// Label of the dashboard tile leading to the full document list.
pub(crate) const ALL_DOCUMENTS_LABEL: &str = "Alle Dokumente";

#[allow(clippy::expect_used)]
static DASHBOARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Alle Dokumente \(\d+\)").expect("dashboard pattern is valid")
});

/// Logs in and opens the "Alle Dokumente" list.
///
/// # Errors
///
/// Returns [`HarvestError::Browser`] when a step times out, a click fails,
/// or a login field / the document tile cannot be found.
pub(crate) async fn log_in(
    session: &dyn BrowserSession,
    portal_url: &str,
    credentials: &Credentials,
    timings: &HarvestTimings,
) -> Result<(), HarvestError> {
    let waiter = ReadinessWaiter::new(timings.poll_interval);

    info!("Navigating to login page");
    session.navigate(portal_url).await?;

    waiter
        .wait_for(
            session,
            &WaitCondition::visible(USERNAME_FIELD),
            timings.wait_timeout,
        )
        .await?;
    info!("Entering username");
    fill_shadow_input(session, USERNAME_FIELD, credentials.username(), timings).await?;
    session.click(USERNAME_SUBMIT).await?;

    waiter
        .wait_for(
            session,
            &WaitCondition::visible(PASSWORD_FIELD),
            timings.wait_timeout,
        )
        .await?;
    info!("Entering password");
    fill_shadow_input(session, PASSWORD_FIELD, credentials.password(), timings).await?;
    session.click(PASSWORD_SUBMIT).await?;
    info!("Logged in successfully");

    info!("Waiting for dashboard to load");
    waiter
        .wait_for(
            session,
            &WaitCondition::text_matches(DASHBOARD_PATTERN.clone()),
            timings.wait_timeout,
        )
        .await?;

    // The tile is rendered before its click handler is attached.
    tokio::time::sleep(timings.dashboard_settle).await;

    info!("Navigating to All Documents page");
    let clicked = session.evaluate(&open_all_documents_script()).await?;
    if clicked != Value::Bool(true) {
        return Err(BrowserError::interaction(
            ALL_DOCUMENTS_LABEL,
            "no button or link with this label",
        )
        .into());
    }
    tokio::time::sleep(timings.navigation_settle).await;

    Ok(())
}

/// Sets the shadow-DOM input of `host_selector` to `value`, with settle pauses
/// before the fill and before the caller's submit click.
async fn fill_shadow_input(
    session: &dyn BrowserSession,
    host_selector: &str,
    value: &str,
    timings: &HarvestTimings,
) -> Result<(), HarvestError> {
    tokio::time::sleep(timings.field_settle).await;

    let filled = session
        .evaluate(&fill_shadow_input_script(host_selector, value))
        .await?;
    if filled != Value::Bool(true) {
        return Err(BrowserError::interaction(host_selector, "input field not found").into());
    }

    tokio::time::sleep(timings.field_settle).await;
    Ok(())
}

/// Script filling the shadow-root `#input` of `host_selector`.
///
/// Both arguments are embedded as JSON string literals, so quotes and
/// backslashes in a password cannot break out of the script.
pub(crate) fn fill_shadow_input_script(host_selector: &str, value: &str) -> String {
    format!(
        r##"(function() {{
            const host = document.querySelector({host});
            if (host && host.shadowRoot) {{
                const input = host.shadowRoot.querySelector("#input");
                if (input) {{
                    input.focus();
                    input.value = {value};
                    input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    input.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return true;
                }}
            }}
            return false;
        }})()"##,
        host = js_string(host_selector),
        value = js_string(value),
    )
}

fn open_all_documents_script() -> String {
    format!(
        r#"(function() {{
            const elements = document.querySelectorAll('button, a, [role="button"]');
            for (const el of elements) {{
                if (el.textContent.includes({label})) {{
                    el.click();
                    return true;
                }}
            }}
            return false;
        }})()"#,
        label = js_string(ALL_DOCUMENTS_LABEL),
    )
}
