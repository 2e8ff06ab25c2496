use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use hyperdispatch::mock::{EchoDispatcher, MockDispatcher};
use hyperdispatch::{
    with_async_dispatcher, AsyncDispatcher, AsyncDispatcherExt, ClientCert, DispatchOptions,
    Error, RequestArgs, Threaded, Unimplemented,
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

async fn json(response: hyperdispatch::Response) -> serde_json::Value {
    let body = response.into_body().collect_bytes().await.expect("body");
    serde_json::from_slice(&body).expect("json")
}

#[tokio::test]
async fn request_builds_one_request_and_sends_once() -> Result<(), BoxError> {
    let mock = MockDispatcher::new();

    mock.request(
        Method::POST,
        "http://example.com/upload".parse()?,
        RequestArgs::new()
            .data("payload")
            .param("chunk", "1")
            .cert(ClientCert::new("client.pem").with_password("secret")),
    )
    .await?;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].uri, "http://example.com/upload?chunk=1");
    assert_eq!(requests[0].body, "payload");
    assert_eq!(
        requests[0].options,
        DispatchOptions::new().cert(ClientCert::new("client.pem").with_password("secret"))
    );
    Ok(())
}

#[tokio::test]
async fn echo_example() -> Result<(), BoxError> {
    let response = EchoDispatcher::new()
        .request(
            Method::GET,
            "https://example.com/".parse()?,
            RequestArgs::new().header(
                HeaderName::from_static("x-test"),
                HeaderValue::from_static("1"),
            ),
        )
        .await?;

    let document = json(response).await;
    assert_eq!(document["method"], "GET");
    assert_eq!(document["url"], "https://example.com/");
    assert_eq!(document["headers"], serde_json::json!([["x-test", "1"]]));
    assert_eq!(document["body"], "");
    Ok(())
}

#[tokio::test]
async fn concurrent_sends_are_independent() -> Result<(), BoxError> {
    let echo = EchoDispatcher::new();

    let first = echo.request(
        Method::PUT,
        "http://example.com/one".parse()?,
        RequestArgs::new()
            .data("first body")
            .header(HeaderName::from_static("x-id"), HeaderValue::from_static("1")),
    );
    let second = echo.request(
        Method::POST,
        "http://example.com/two".parse()?,
        RequestArgs::new()
            .data("second body")
            .header(HeaderName::from_static("x-id"), HeaderValue::from_static("2")),
    );

    let (first, second) = tokio::join!(first, second);
    let (first, second) = (json(first?).await, json(second?).await);

    assert_eq!(first["method"], "PUT");
    assert_eq!(first["headers"], serde_json::json!([["x-id", "1"]]));
    assert_eq!(first["body"], "first body");

    assert_eq!(second["method"], "POST");
    assert_eq!(second["headers"], serde_json::json!([["x-id", "2"]]));
    assert_eq!(second["body"], "second body");
    Ok(())
}

#[tokio::test]
async fn concurrent_sends_from_spawned_tasks() {
    let mock = std::sync::Arc::new(MockDispatcher::new());

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let mock = mock.clone();
            tokio::spawn(async move {
                let uri = format!("http://example.com/{n}").parse().unwrap();
                mock.get(uri).await.map(|response| response.status())
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), StatusCode::OK);
    }

    let mut paths: Vec<_> = mock
        .requests()
        .into_iter()
        .map(|request| request.uri.path().to_owned())
        .collect();
    paths.sort();
    assert_eq!(paths.len(), 8);
    paths.dedup();
    assert_eq!(paths.len(), 8);
}

#[tokio::test]
async fn base_dispatcher_is_not_a_transport() {
    let base = Unimplemented::new();
    let error = base
        .get("http://example.com/".parse().unwrap())
        .await
        .unwrap_err();
    assert!(error.is_not_implemented());

    AsyncDispatcher::close(&base).await;
    AsyncDispatcher::close(&base).await;
}

#[tokio::test]
async fn scope_closes_once_after_success() {
    let mock = MockDispatcher::new();

    let status = with_async_dispatcher(mock.clone(), |dispatcher| {
        Box::pin(async move {
            let response = dispatcher.get("http://example.com/".parse().unwrap()).await?;
            Ok::<_, Error>(response.status())
        })
    })
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(mock.close_count(), 1);
}

#[tokio::test]
async fn scope_closes_once_after_failure() {
    let mock = MockDispatcher::failing();

    let result = mock
        .clone()
        .scope(|dispatcher| {
            Box::pin(async move { dispatcher.get("http://example.com/".parse().unwrap()).await })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(mock.send_count(), 1);
    assert_eq!(mock.close_count(), 1);
}

#[tokio::test]
async fn scope_closes_once_after_panic() {
    let mock = MockDispatcher::new();

    let outcome = AssertUnwindSafe(with_async_dispatcher(mock.clone(), |dispatcher| {
        Box::pin(async move {
            let _ = dispatcher.get("http://example.com/".parse().unwrap()).await;
            panic!("caller failed");
        })
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(mock.close_count(), 1);
}

#[tokio::test]
async fn guarded_rejects_send_after_close() {
    let mock = MockDispatcher::new();
    let guarded = mock.clone().guarded();

    AsyncDispatcher::close(&guarded).await;
    AsyncDispatcher::close(&guarded).await;

    let error = guarded
        .get("http://example.com/".parse().unwrap())
        .await
        .unwrap_err();
    assert!(error.is_closed());
    assert_eq!(mock.send_count(), 0);
    assert_eq!(mock.close_count(), 1);
}

#[tokio::test]
async fn threaded_adapter_runs_blocking_transport() -> Result<(), BoxError> {
    let mock = MockDispatcher::with_status(StatusCode::CREATED);
    let dispatcher = Threaded::new(mock.clone());

    let response = dispatcher
        .request(
            Method::POST,
            "http://example.com/".parse()?,
            RequestArgs::new().data("from a thread"),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    AsyncDispatcher::close(&dispatcher).await;
    assert_eq!(mock.requests()[0].body, "from a thread");
    assert_eq!(mock.close_count(), 1);
    Ok(())
}
