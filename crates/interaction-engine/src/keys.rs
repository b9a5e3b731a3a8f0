//! Native keyboard helpers shared by the type and key-chord operations.

use cdp_session::{KeyEventSpec, PageSession};

use crate::errors::InteractError;
use crate::model::KeyMod;
use crate::policy::InteractPolicy;

/// Dispatch one key chord as native protocol events (down then up).
pub(crate) async fn press_chord(
    session: &dyn PageSession,
    key: &str,
    modifiers: KeyMod,
) -> Result<(), InteractError> {
    let bits = modifiers.protocol_bits();
    let mut down = KeyEventSpec::down(key, bits);
    if key == "Enter" {
        down.text = Some("\r".to_string());
    }
    session.dispatch_key(down).await?;
    session.dispatch_key(KeyEventSpec::up(key, bits)).await?;
    Ok(())
}

/// Select-all plus delete. Covers both standard inputs and content-editable
/// hosts: the platform primary modifier selects everything the focused
/// element owns, and the deletion collapses the selection.
pub(crate) async fn clear_field(
    session: &dyn PageSession,
    policy: &InteractPolicy,
) -> Result<(), InteractError> {
    press_chord(session, "a", KeyMod::primary()).await?;
    tokio::time::sleep(policy.key_delay()).await;
    press_chord(session, "Backspace", KeyMod::empty()).await?;
    Ok(())
}

/// Type character by character. Bulk value-sets bypass framework change
/// detection; controlled inputs only notice individual keystrokes.
pub(crate) async fn type_characters(
    session: &dyn PageSession,
    policy: &InteractPolicy,
    text: &str,
) -> Result<(), InteractError> {
    for ch in text.chars() {
        if ch == '\n' {
            press_chord(session, "Enter", KeyMod::empty()).await?;
        } else {
            let key = ch.to_string();
            session.dispatch_key(KeyEventSpec::down(key.clone(), 0)).await?;
            session.dispatch_key(KeyEventSpec::char(key.clone())).await?;
            session.dispatch_key(KeyEventSpec::up(key, 0)).await?;
        }
        tokio::time::sleep(policy.key_delay()).await;
    }
    Ok(())
}
