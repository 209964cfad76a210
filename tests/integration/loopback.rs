//! Protocol tests over the loopback transport

use super::*;
use futures::future::join_all;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

use http_task_integration::{
    AttemptOutcome, ExecutionId, ExecutionLedger, HttpCredentialIssuer, HttpMethod, HttpRequest,
    HttpTaskInvoker, HttpTransport, NetworkError, RetryConfig, RetryOrchestrator, RetryPolicy,
    TaskError, TaskOutcome, TaskRequest, SOCKET_FAILURE_CODE,
};

type Issuer = HttpCredentialIssuer<LoopbackTransport<Ledger>>;
type Invoker = HttpTaskInvoker<LoopbackTransport<Ledger>>;

fn orchestrator(
    transport: &Arc<LoopbackTransport<Ledger>>,
    policy: RetryPolicy,
) -> RetryOrchestrator<Issuer, Invoker> {
    let issuer = HttpCredentialIssuer::new("http://loopback/token", transport.clone());
    let invoker = HttpTaskInvoker::new(transport.clone());
    RetryOrchestrator::new(Arc::new(issuer), Arc::new(invoker), policy)
}

fn task(id: &str, simulate_failure: bool) -> TaskRequest {
    TaskRequest::new(
        "http://loopback/",
        HttpMethod::Get,
        ExecutionId::new(id),
        simulate_failure,
    )
    .with_field("hello", json!("world"))
}

fn raw_task_request(id: &str, token: &str) -> HttpRequest {
    let mut headers = HashMap::new();
    headers.insert("authorization".to_string(), format!("Bearer {}", token));
    HttpRequest {
        method: HttpMethod::Get,
        url: "http://loopback/".to_string(),
        headers,
        body: Some(json!({"executionId": id, "set401": true}).to_string()),
        timeout: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_protocol_recovers_with_fresh_credential() {
    let (transport, target) = loopback();
    let orchestrator = orchestrator(&transport, RetryPolicy::default());

    let report = orchestrator.run(&task("exec-1", true)).await;

    assert!(matches!(report.outcome, TaskOutcome::Success { attempts_used: 2 }));
    assert_eq!(report.backoffs(), vec![std::time::Duration::from_secs(2)]);
    assert_eq!(transport.token_requests().len(), 2);

    let task_requests = transport.task_requests();
    assert_eq!(task_requests.len(), 2);
    let first = task_requests[0].bearer_token().unwrap();
    let second = task_requests[1].bearer_token().unwrap();
    assert_ne!(first, second);

    assert!(target.ledger().contains(&ExecutionId::new("exec-1")));
    assert_eq!(target.ledger().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_without_simulation_single_attempt() {
    let (transport, _) = loopback();
    let orchestrator = orchestrator(&transport, RetryPolicy::default());

    let report = orchestrator.run(&task("exec-1", false)).await;

    assert!(matches!(report.outcome, TaskOutcome::Success { attempts_used: 1 }));
    assert_eq!(transport.task_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_exhausts() {
    let (transport, _) = loopback();
    let policy = RetryPolicy::from_config(&RetryConfig {
        max_attempts: 1,
        ..Default::default()
    })
    .unwrap();
    let orchestrator = orchestrator(&transport, policy);

    let report = orchestrator.run(&task("exec-1", true)).await;

    assert!(matches!(report.outcome, TaskOutcome::Exhausted { attempts_used: 1 }));
    assert!(report.backoffs().is_empty());
    assert_eq!(report.attempts[0].outcome, AttemptOutcome::AuthorizationFailure);
}

#[tokio::test(start_paused = true)]
async fn test_rerun_of_seen_execution_succeeds_immediately() {
    let (transport, _) = loopback();
    let orchestrator = orchestrator(&transport, RetryPolicy::default());

    let first = orchestrator.run(&task("exec-1", true)).await;
    let second = orchestrator.run(&task("exec-1", true)).await;

    assert!(matches!(first.outcome, TaskOutcome::Success { attempts_used: 2 }));
    assert!(matches!(second.outcome, TaskOutcome::Success { attempts_used: 1 }));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_of_distinct_executions() {
    let (transport, target) = loopback();
    let orchestrator = orchestrator(&transport, RetryPolicy::default());

    let requests: Vec<TaskRequest> = (0..16).map(|i| task(&format!("exec-{}", i), true)).collect();
    let reports = join_all(requests.iter().map(|r| orchestrator.run(r))).await;

    for report in &reports {
        assert!(
            matches!(report.outcome, TaskOutcome::Success { attempts_used: 2 }),
            "{}: {:?}",
            report.execution_id,
            report.outcome
        );
    }
    assert_eq!(target.ledger().len(), 16);
    assert_eq!(orchestrator.stats().successful_retries, 16);
}

#[tokio::test]
async fn test_concurrent_first_contact_fails_exactly_once() {
    let (transport, _) = loopback();

    let sends = (0..8).map(|i| transport.send(raw_task_request("shared", &format!("t{}", i))));
    let responses = join_all(sends).await;

    let unauthorized = responses
        .iter()
        .filter(|r| r.as_ref().map(|r| r.status == 401).unwrap_or(false))
        .count();
    let ok = responses
        .iter()
        .filter(|r| r.as_ref().map(|r| r.status == 200).unwrap_or(false))
        .count();

    assert_eq!(unauthorized, 1);
    assert_eq!(ok, 7);
}

#[tokio::test]
async fn test_token_endpoint_failure_is_fatal() {
    let (transport, target) = loopback();
    transport.fail_next(TaskError::Network(NetworkError::ConnectionFailed {
        message: "connection refused".to_string(),
    }));
    let orchestrator = orchestrator(&transport, RetryPolicy::default());

    let report = orchestrator.run(&task("exec-1", true)).await;

    match report.outcome {
        TaskOutcome::FatalError {
            attempts_used,
            error,
        } => {
            assert_eq!(attempts_used, 0);
            assert_eq!(error.failure_code(), SOCKET_FAILURE_CODE);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(target.ledger().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_run_leaves_execution_marked() {
    let (transport, target) = loopback();
    let orchestrator = orchestrator(&transport, RetryPolicy::default());
    let cancel = CancellationToken::new();
    let request = task("exec-1", true);

    let canceller = async {
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        cancel.cancel();
    };
    let (report, _) = tokio::join!(orchestrator.run_task(&request, &cancel), canceller);

    assert!(matches!(report.outcome, TaskOutcome::Cancelled { attempts_used: 1 }));
    assert_eq!(transport.task_requests().len(), 1);
    assert!(target.ledger().contains(&ExecutionId::new("exec-1")));

    // A later run of the same execution is not failed again.
    let resumed = orchestrator.run(&request).await;
    assert!(matches!(resumed.outcome, TaskOutcome::Success { attempts_used: 1 }));
}
