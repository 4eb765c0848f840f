use alb_priority_core::contract::{
    default_reason, LifecycleRequest, ResponseData, ResponseDocument, ResponseStatus,
};
use serde_json::{json, Value};

use crate::adapters::callback::{CallbackReply, CallbackTransport};
use crate::handlers::resource::HandlerConfig;
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "callback_reporter";
const ACCEPTED_STATUS_CODE: u16 = 200;

/// Result of a callback PUT that reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackDelivery {
    Accepted,
    Rejected { status_code: u16, body: String },
}

impl CallbackDelivery {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

pub fn rejection_message(status_code: u16) -> String {
    format!("Failed to send message to CloudFormation. HTTP status code: {status_code}")
}

pub fn rejection_details(request: &LifecycleRequest, reply: &CallbackReply) -> Value {
    json!({
        "message": rejection_message(reply.status_code),
        "status_code": reply.status_code,
        "response": reply.body.clone(),
        "request_id": request.request_id.clone(),
    })
}

pub fn build_response_document(
    request: &LifecycleRequest,
    status: ResponseStatus,
    data: Option<ResponseData>,
    physical_resource_id: &str,
    reason: Option<&str>,
    config: &HandlerConfig,
) -> ResponseDocument {
    let reason = match reason {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default_reason(&config.log_stream_name),
    };
    ResponseDocument::for_request(request, status, data, physical_resource_id, reason)
}

/// PUTs the response document to the request's `ResponseURL`.
///
/// A reply other than 200 is logged and reported as
/// [`CallbackDelivery::Rejected`]; only transport failures are returned as
/// errors.
pub fn send_response(
    request: &LifecycleRequest,
    status: ResponseStatus,
    data: Option<ResponseData>,
    physical_resource_id: &str,
    reason: Option<&str>,
    config: &HandlerConfig,
    transport: &dyn CallbackTransport,
) -> Result<CallbackDelivery, String> {
    let document =
        build_response_document(request, status, data, physical_resource_id, reason, config);
    let body = serde_json::to_vec(&document)
        .map_err(|error| format!("failed to serialize response document: {error}"))?;

    let reply = transport.put_response(&request.response_url, &body)?;
    if reply.status_code != ACCEPTED_STATUS_CODE {
        log_error(COMPONENT, "callback_rejected", rejection_details(request, &reply));
        return Ok(CallbackDelivery::Rejected {
            status_code: reply.status_code,
            body: reply.body,
        });
    }

    log_info(
        COMPONENT,
        "callback_sent",
        json!({
            "status": status.as_str(),
            "physical_resource_id": physical_resource_id,
            "request_id": request.request_id.clone(),
            "body_bytes": body.len(),
        }),
    );
    Ok(CallbackDelivery::Accepted)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingTransport {
        status_code: u16,
        puts: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingTransport {
        fn replying(status_code: u16) -> Self {
            Self {
                status_code,
                puts: Mutex::new(Vec::new()),
            }
        }

        fn puts(&self) -> Vec<(String, Vec<u8>)> {
            self.puts.lock().expect("poisoned mutex").clone()
        }

        fn sent_body(&self) -> Value {
            let puts = self.puts();
            assert_eq!(puts.len(), 1);
            serde_json::from_slice(&puts[0].1).expect("body should be json")
        }
    }

    impl CallbackTransport for RecordingTransport {
        fn put_response(&self, url: &str, body: &[u8]) -> Result<CallbackReply, String> {
            self.puts
                .lock()
                .expect("poisoned mutex")
                .push((url.to_string(), body.to_vec()));
            Ok(CallbackReply {
                status_code: self.status_code,
                body: if self.status_code == 200 {
                    String::new()
                } else {
                    "Internal Server Error".to_string()
                },
            })
        }
    }

    struct UnreachableTransport;

    impl CallbackTransport for UnreachableTransport {
        fn put_response(&self, _url: &str, _body: &[u8]) -> Result<CallbackReply, String> {
            Err("failed to send callback: connection refused".to_string())
        }
    }

    fn sample_request() -> LifecycleRequest {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/response?X-Amz-Signature=abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/test-stack/test-stack-id",
            "RequestId": "test-request-id",
            "LogicalResourceId": "ListenerRuleAllocation",
            "ResourceProperties": {"ListenerArn": "arn:listener"}
        }))
        .expect("request should parse")
    }

    fn sample_config() -> HandlerConfig {
        HandlerConfig {
            log_stream_name: "test-log-stream".to_string(),
        }
    }

    #[test]
    fn puts_success_document_to_response_url() {
        let transport = RecordingTransport::replying(200);
        let request = sample_request();
        let mut data = ResponseData::new();
        data.insert("Priority".to_string(), Value::from("12345"));

        let delivery = send_response(
            &request,
            ResponseStatus::Success,
            Some(data),
            "physical-1",
            None,
            &sample_config(),
            &transport,
        )
        .expect("callback should be delivered");

        assert!(delivery.is_accepted());
        assert_eq!(transport.puts()[0].0, request.response_url);
        assert_eq!(
            transport.sent_body(),
            json!({
                "Status": "SUCCESS",
                "Reason": "See the details in CloudWatch Log Stream: test-log-stream",
                "PhysicalResourceId": "physical-1",
                "StackId": request.stack_id,
                "RequestId": "test-request-id",
                "LogicalResourceId": "ListenerRuleAllocation",
                "Data": {"Priority": "12345"}
            })
        );
    }

    #[test]
    fn explicit_reason_overrides_log_stream_default() {
        let transport = RecordingTransport::replying(200);

        send_response(
            &sample_request(),
            ResponseStatus::Failed,
            Some(ResponseData::new()),
            "physical-1",
            Some("Test failure reason"),
            &sample_config(),
            &transport,
        )
        .expect("callback should be delivered");

        let body = transport.sent_body();
        assert_eq!(body["Status"], "FAILED");
        assert_eq!(body["Reason"], "Test failure reason");
        assert_eq!(body["Data"], json!({}));
    }

    #[test]
    fn body_is_compact_json() {
        let transport = RecordingTransport::replying(200);

        send_response(
            &sample_request(),
            ResponseStatus::Success,
            None,
            "physical-1",
            None,
            &sample_config(),
            &transport,
        )
        .expect("callback should be delivered");

        let raw = String::from_utf8(transport.puts()[0].1.clone()).expect("body should be utf-8");
        assert!(raw.starts_with("{\"Status\":\"SUCCESS\",\"Reason\":"));
        assert!(!raw.contains(": "));
    }

    #[test]
    fn non_200_reply_is_reported_not_raised() {
        let transport = RecordingTransport::replying(500);

        let delivery = send_response(
            &sample_request(),
            ResponseStatus::Success,
            None,
            "physical-1",
            None,
            &sample_config(),
            &transport,
        )
        .expect("rejected callback should not raise");

        assert_eq!(
            delivery,
            CallbackDelivery::Rejected {
                status_code: 500,
                body: "Internal Server Error".to_string(),
            }
        );
    }

    #[test]
    fn rejection_log_names_status_code() {
        let reply = CallbackReply {
            status_code: 500,
            body: "Internal Server Error".to_string(),
        };

        let details = rejection_details(&sample_request(), &reply);

        assert_eq!(
            details["message"],
            "Failed to send message to CloudFormation. HTTP status code: 500"
        );
        assert_eq!(details["status_code"], 500);
        assert_eq!(details["response"], "Internal Server Error");
        assert_eq!(details["request_id"], "test-request-id");
    }

    #[test]
    fn transport_failure_propagates() {
        let error = send_response(
            &sample_request(),
            ResponseStatus::Success,
            None,
            "physical-1",
            None,
            &sample_config(),
            &UnreachableTransport,
        )
        .expect_err("transport failure should propagate");

        assert!(error.contains("connection refused"));
    }
}
