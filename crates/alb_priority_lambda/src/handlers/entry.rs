use alb_priority_core::allocator::PriorityDraw;
use alb_priority_core::contract::{LifecycleRequest, RequestType, ResponseStatus};
use serde_json::{json, Value};

use crate::handlers::callback::{send_response, CallbackDelivery};
use crate::handlers::resource::{
    handle_lifecycle_request, resolve_physical_resource_id, HandlerConfig, HandlerDependencies,
    HandlerError,
};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "entry_point";

/// Top-level invocation handler.
///
/// Any error escaping the lifecycle dispatch triggers one more callback
/// (FAILED, or SUCCESS for Delete so stack teardown is never blocked) carrying
/// the error message, after which the original error is returned so the
/// platform marks the invocation failed.
pub fn handle_event(
    event: Value,
    config: &HandlerConfig,
    deps: &HandlerDependencies<'_>,
    draw: &mut dyn PriorityDraw,
) -> Result<CallbackDelivery, HandlerError> {
    log_info(COMPONENT, "event_received", json!({ "event": event.clone() }));

    let request: LifecycleRequest = serde_json::from_value(event).map_err(|error| {
        HandlerError::new(format!("invalid custom resource request: {error}"))
    })?;

    match handle_lifecycle_request(&request, config, deps, draw) {
        Ok(delivery) => Ok(delivery),
        Err(error) => {
            report_failure(&request, &error, config, deps);
            Err(error)
        }
    }
}

pub fn failure_status(request_type: &RequestType) -> ResponseStatus {
    match request_type {
        RequestType::Delete => ResponseStatus::Success,
        _ => ResponseStatus::Failed,
    }
}

fn report_failure(
    request: &LifecycleRequest,
    error: &HandlerError,
    config: &HandlerConfig,
    deps: &HandlerDependencies<'_>,
) {
    let status = failure_status(&request.request_type);
    let physical_resource_id = resolve_physical_resource_id(request);
    log_error(
        COMPONENT,
        "invocation_failed",
        json!({
            "request_type": request.request_type.as_str(),
            "request_id": request.request_id.clone(),
            "reported_status": status.as_str(),
            "error": error.message.clone(),
        }),
    );

    if let Err(callback_error) = send_response(
        request,
        status,
        None,
        &physical_resource_id,
        Some(error.message.as_str()),
        config,
        deps.transport,
    ) {
        log_error(
            COMPONENT,
            "failure_callback_failed",
            json!({
                "request_id": request.request_id.clone(),
                "error": callback_error,
            }),
        );
    }
}
