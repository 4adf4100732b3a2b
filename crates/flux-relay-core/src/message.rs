//! Rendering of alerts into Pushover message text.

use crate::alert::FluxAlert;

/// Render an alert into the notification body.
///
/// Layout:
///
/// ```text
/// {reason} [{SEVERITY}]
/// {message}
///
/// Controller: {controller}
/// Object: {kind}/{name}
/// Revision: {revision}
/// ```
///
/// Severity is upper-cased and kind lower-cased regardless of input. The text
/// always ends with a newline.
pub fn format_message(alert: &FluxAlert) -> String {
    format!(
        "{reason} [{severity}]\n\
         {message}\n\
         \n\
         Controller: {controller}\n\
         Object: {kind}/{name}\n\
         Revision: {revision}\n",
        reason = alert.reason(),
        severity = alert.severity().to_uppercase(),
        message = alert.message(),
        controller = alert.controller(),
        kind = alert.object_kind().to_lowercase(),
        name = alert.object_name(),
        revision = alert.revision(),
    )
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
