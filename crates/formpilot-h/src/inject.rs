use chromiumoxide::Page;
use formpilot_engine::error::DomError;
use formpilot_engine::error_mapping::map_page_error;
use formpilot_engine::protocol::{PageRequest, PageResponse};
use formpilot_scanner::{PAGE_RUNTIME_JS, RUNTIME_GLOBAL};
use std::time::Duration;

/// Default timeout for JavaScript evaluation (10 seconds).
/// This prevents hanging when dialogs (alert/confirm/prompt) block the JS thread.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

impl From<EvalError> for DomError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Timeout => DomError::Timeout,
            EvalError::Context(message) => DomError::ContextLost(message),
            EvalError::Other(message) => DomError::Script(message),
        }
    }
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    let eval_result = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await;

    match eval_result {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(remote_object)) => Ok(remote_object
            .into_value::<serde_json::Value>()
            // `undefined` results carry no value.
            .unwrap_or(serde_json::Value::Null)),
    }
}

/// Install the page runtime unless this document already has it.
async fn ensure_runtime(page: &Page) -> Result<(), EvalError> {
    let probe = format!("typeof window.{} !== 'undefined'", RUNTIME_GLOBAL);
    let installed = evaluate_with_timeout(page, &probe).await?;
    if installed.as_bool() != Some(true) {
        tracing::debug!("Injecting page runtime");
        evaluate_with_timeout(page, PAGE_RUNTIME_JS).await?;
    }
    Ok(())
}

/// Evaluate one request through the page runtime.
///
/// The runtime is (re)injected as needed and context loss during navigation
/// is retried; structured page errors map onto [`DomError`].
pub async fn process(page: &Page, request: &PageRequest) -> Result<serde_json::Value, DomError> {
    let request_json = serde_json::to_string(request)?;
    let expression = format!("window.{}.process({})", RUNTIME_GLOBAL, request_json);
    tracing::trace!("Evaluating {}", request.op_name());

    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        let outcome = match ensure_runtime(page).await {
            Ok(()) => evaluate_with_timeout(page, &expression).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => return into_result(serde_json::from_value(value)?),
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during {} (attempt {}/{}), retrying...",
                    request.op_name(),
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(other) => return Err(other.into()),
        }
    }

    Err(DomError::ContextLost(last_error.unwrap_or_else(|| {
        format!("{} failed after retries", request.op_name())
    })))
}

fn into_result(response: PageResponse) -> Result<serde_json::Value, DomError> {
    match response {
        PageResponse::Ok { value } => Ok(value),
        PageResponse::Error {
            code,
            message,
            details,
        } => Err(map_page_error(&code, &message, details.as_ref())),
    }
}
