//! User-facing wording for retry warnings and terminal failures.

use std::time::Duration;

use generation_client::ErrorKind;
use messages_api::MessagesApiError;

/// Warning shown before attempt `attempt + 1` starts.
pub fn retry_warning(kind: ErrorKind, attempt: u32, delay: Duration) -> String {
    let seconds = delay.as_secs();
    match kind {
        ErrorKind::ConnectTimeout => {
            format!("Connection timeout on attempt {attempt}. Retrying in {seconds} seconds...")
        }
        ErrorKind::ReadTimeout => {
            format!("Read timeout on attempt {attempt}. Retrying in {seconds} seconds...")
        }
        ErrorKind::ConnectionFailed => {
            format!("Network error on attempt {attempt}. Retrying in {seconds} seconds...")
        }
        other => format!("Error on attempt {attempt}: {other}. Retrying..."),
    }
}

/// Terminal message with remediation advice for `kind`.
pub fn failure_message(kind: ErrorKind, error: &MessagesApiError) -> String {
    match kind {
        ErrorKind::Configuration => "API key not found. Set ANTHROPIC_API_KEY in the environment \
             or api_key in the config file."
            .to_string(),
        ErrorKind::Authentication => {
            "Authentication Error: Invalid API key. Please verify your ANTHROPIC_API_KEY.".to_string()
        }
        ErrorKind::RateLimited => {
            "Rate Limit: Too many requests. Please wait a moment and try again.".to_string()
        }
        ErrorKind::ConnectTimeout => "Connection Timeout: The request took too long to connect. \
             This might be a network restriction of the hosting environment. Please try:\n\n\
             1. Try again in a moment\n\
             2. Check that the Anthropic API is reachable from your region\n\
             3. Ask your hosting provider about outbound API access"
            .to_string(),
        ErrorKind::ReadTimeout => "Read Timeout: The API took too long to respond. \
             Your files might be too large. Try:\n\n\
             1. Reducing file sizes\n\
             2. Removing the error log temporarily\n\
             3. Trying again in a moment"
            .to_string(),
        ErrorKind::ConnectionFailed => format!(
            "Network Connection Failed: Cannot reach the Anthropic API.\n\n\
             Workarounds:\n\
             1. Run from a different network or host\n\
             2. Run locally\n\
             3. Use a proxy service\n\n\
             Technical details: {}",
            error.root()
        ),
        ErrorKind::Unclassified => format!(
            "Error: {}\n\nIf this persists, the hosting environment may be blocking external \
             API calls. Consider running locally or deploying elsewhere.",
            error.root()
        ),
    }
}
