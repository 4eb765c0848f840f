use alb_priority_core::allocator::{
    allocate_priorities, allocate_priority, join_priorities, AllocationContext, PriorityDraw,
    RulePrioritySource,
};
use alb_priority_core::contract::{
    batch_priority_data, single_priority_data, LifecycleRequest, RequestType, ResponseData,
    ResponseStatus, NO_RESPONSE_DATA_REASON,
};
use serde_json::{json, Value};

use crate::adapters::callback::CallbackTransport;
use crate::handlers::callback::{send_response, CallbackDelivery};
use crate::logging::log_info;

const COMPONENT: &str = "resource_handler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub log_stream_name: String,
}

/// External collaborators for one invocation.
pub struct HandlerDependencies<'a> {
    pub rules: &'a dyn RulePrioritySource,
    pub transport: &'a dyn CallbackTransport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

pub fn resolve_physical_resource_id(request: &LifecycleRequest) -> String {
    request
        .physical_resource_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Dispatches one custom-resource lifecycle request and reports the outcome.
///
/// Validation gaps are answered with a FAILED callback and `Ok`. Listener
/// query and callback transport failures are returned for the entry point
/// to report.
pub fn handle_lifecycle_request(
    request: &LifecycleRequest,
    config: &HandlerConfig,
    deps: &HandlerDependencies<'_>,
    draw: &mut dyn PriorityDraw,
) -> Result<CallbackDelivery, HandlerError> {
    let physical_resource_id = resolve_physical_resource_id(request);
    let mut context = AllocationContext::new();

    log_info(
        COMPONENT,
        "request_dispatched",
        json!({
            "request_type": request.request_type.as_str(),
            "request_id": request.request_id.clone(),
            "physical_resource_id": physical_resource_id.clone(),
        }),
    );

    let (status, data, reason) = match request.request_type {
        RequestType::Create | RequestType::Update => {
            match allocation_response(request, deps.rules, draw, &mut context)? {
                Some(data) => (ResponseStatus::Success, data, None),
                None => (
                    ResponseStatus::Failed,
                    ResponseData::new(),
                    Some(NO_RESPONSE_DATA_REASON),
                ),
            }
        }
        RequestType::Delete => (
            ResponseStatus::Success,
            request.resource_properties.clone(),
            None,
        ),
        RequestType::Other(_) => (
            ResponseStatus::Failed,
            ResponseData::new(),
            Some(NO_RESPONSE_DATA_REASON),
        ),
    };

    send_response(
        request,
        status,
        Some(data),
        &physical_resource_id,
        reason,
        config,
        deps.transport,
    )
    .map_err(HandlerError::from)
}

/// `None` when the request carries no listener to allocate for.
fn allocation_response(
    request: &LifecycleRequest,
    rules: &dyn RulePrioritySource,
    draw: &mut dyn PriorityDraw,
    context: &mut AllocationContext,
) -> Result<Option<ResponseData>, HandlerError> {
    let Some(listener_arn) = request.listener_arn() else {
        return Ok(None);
    };

    match request.priority_count()? {
        Some(count) => {
            let priorities = allocate_priorities(listener_arn, count, rules, draw, context)?;
            let joined = join_priorities(&priorities);
            log_info(
                COMPONENT,
                "priorities_allocated",
                allocation_details(listener_arn, count, &joined, context),
            );
            Ok(Some(batch_priority_data(&joined, listener_arn)))
        }
        None => {
            let priority = allocate_priority(listener_arn, rules, draw, context)?;
            log_info(
                COMPONENT,
                "priorities_allocated",
                allocation_details(listener_arn, 1, &priority, context),
            );
            Ok(Some(single_priority_data(&priority, listener_arn)))
        }
    }
}

/// Log details for an allocation, including every priority claimed so far in
/// this invocation.
fn allocation_details(
    listener_arn: &str,
    requested: usize,
    priorities: &str,
    context: &AllocationContext,
) -> Value {
    json!({
        "listener_arn": listener_arn,
        "requested": requested,
        "priorities": priorities,
        "claimed": context.claimed().collect::<Vec<_>>(),
    })
}
