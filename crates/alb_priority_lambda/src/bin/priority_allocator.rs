use alb_priority_core::allocator::{RandomDraw, RulePrioritySource};
use alb_priority_lambda::adapters::callback::HttpCallbackTransport;
use alb_priority_lambda::handlers::entry::handle_event;
use alb_priority_lambda::handlers::resource::{HandlerConfig, HandlerDependencies};
use aws_sdk_elasticloadbalancingv2::error::DisplayErrorContext;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

struct ElbRulePrioritySource {
    elb_client: aws_sdk_elasticloadbalancingv2::Client,
}

impl RulePrioritySource for ElbRulePrioritySource {
    fn rule_priorities(&self, listener_arn: &str) -> Result<Vec<String>, String> {
        let client = self.elb_client.clone();
        let listener_arn = listener_arn.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(async move { describe_rule_priorities(&client, &listener_arn).await })
        })
    }
}

async fn describe_rule_priorities(
    client: &aws_sdk_elasticloadbalancingv2::Client,
    listener_arn: &str,
) -> Result<Vec<String>, String> {
    let mut priorities = Vec::new();
    let mut marker: Option<String> = None;
    loop {
        let page = client
            .describe_rules()
            .listener_arn(listener_arn)
            .set_marker(marker.take())
            .send()
            .await
            .map_err(|error| {
                format!(
                    "failed to describe listener rules: {}",
                    DisplayErrorContext(&error)
                )
            })?;

        priorities.extend(
            page.rules()
                .iter()
                .filter_map(|rule| rule.priority().map(str::to_string)),
        );

        match page.next_marker() {
            Some(next) if !next.is_empty() => marker = Some(next.to_string()),
            _ => return Ok(priorities),
        }
    }
}

struct RuntimeDependencies {
    rules: ElbRulePrioritySource,
    transport: HttpCallbackTransport,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let config = HandlerConfig {
        log_stream_name: event.context.env_config.log_stream.clone(),
    };
    let handler_deps = HandlerDependencies {
        rules: &deps.rules,
        transport: &deps.transport,
    };
    let mut draw = RandomDraw::new(StdRng::from_entropy());

    handle_event(event.payload, &config, &handler_deps, &mut draw)
        .map(|_| Value::Null)
        .map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        rules: ElbRulePrioritySource {
            elb_client: aws_sdk_elasticloadbalancingv2::Client::new(&aws_config),
        },
        transport: HttpCallbackTransport::new(reqwest::Client::new()),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
