use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const NO_RESPONSE_DATA_REASON: &str = "No response data";
pub const LOG_STREAM_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

pub const LISTENER_ARN_PROPERTY: &str = "ListenerArn";
pub const PRIORITY_COUNT_PROPERTY: &str = "PriorityCount";
pub const PRIORITY_DATA_KEY: &str = "Priority";
pub const PRIORITIES_DATA_KEY: &str = "Priorities";

pub type ResponseData = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// Inbound CloudFormation custom-resource event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resource_properties: ResponseData,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub old_resource_properties: ResponseData,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<ResponseData, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<ResponseData>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl LifecycleRequest {
    /// Listener to allocate for; empty or non-string values count as absent.
    pub fn listener_arn(&self) -> Option<&str> {
        self.resource_properties
            .get(LISTENER_ARN_PROPERTY)
            .and_then(Value::as_str)
            .filter(|arn| !arn.is_empty())
    }

    /// Requested batch size. CloudFormation delivers every property as a
    /// string, so both decimal strings and plain integers are accepted.
    pub fn priority_count(&self) -> Result<Option<usize>, String> {
        match self.resource_properties.get(PRIORITY_COUNT_PROPERTY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) if raw.is_empty() => Ok(None),
            Some(Value::String(raw)) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
                format!("{PRIORITY_COUNT_PROPERTY} must be a non-negative integer, got '{raw}'")
            }),
            Some(value) => value
                .as_u64()
                .and_then(|count| usize::try_from(count).ok())
                .map(Some)
                .ok_or_else(|| {
                    format!("{PRIORITY_COUNT_PROPERTY} must be a non-negative integer, got {value}")
                }),
        }
    }
}

/// Body PUT to the pre-signed `ResponseURL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseDocument {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: Option<ResponseData>,
}

impl ResponseDocument {
    pub fn for_request(
        request: &LifecycleRequest,
        status: ResponseStatus,
        data: Option<ResponseData>,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status,
            reason: reason.into(),
            physical_resource_id: physical_resource_id.into(),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data,
        }
    }
}

pub fn default_reason(log_stream_name: &str) -> String {
    format!("{LOG_STREAM_REASON_PREFIX}{log_stream_name}")
}

pub fn single_priority_data(priority: &str, listener_arn: &str) -> ResponseData {
    let mut data = ResponseData::new();
    data.insert(PRIORITY_DATA_KEY.to_string(), Value::from(priority));
    data.insert(LISTENER_ARN_PROPERTY.to_string(), Value::from(listener_arn));
    data
}

pub fn batch_priority_data(priorities: &str, listener_arn: &str) -> ResponseData {
    let mut data = ResponseData::new();
    data.insert(PRIORITIES_DATA_KEY.to_string(), Value::from(priorities));
    data.insert(LISTENER_ARN_PROPERTY.to_string(), Value::from(listener_arn));
    data
}
