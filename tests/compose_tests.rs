//! Pipeline composition properties: execution order, short-circuiting,
//! context propagation, response transforms, failure containment.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use strata::{
    Error, ErrorMiddleware, Middleware, Next, Principal, Request, RequestContext, Response,
    Result, StatusCode, TraceMiddleware, compose,
};

type EventLog = Arc<Mutex<Vec<&'static str>>>;

fn context() -> RequestContext {
    RequestContext::new(Request::builder().uri("http://localhost:3000/test").finish())
}

fn body_json(response: &Response) -> Value {
    serde_json::from_slice(response.body()).expect("response body is JSON")
}

/// A middleware that records one event before and one after its
/// continuation.
fn recording(log: &EventLog, before: &'static str, after: &'static str) -> Arc<dyn Middleware> {
    let log = Arc::clone(log);
    Arc::new(move |cx: RequestContext, next: Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(before);
            let response = next.run(cx).await?;
            log.lock().unwrap().push(after);
            Ok(response)
        }
    })
}

async fn data_x(_cx: RequestContext) -> Result<Response> {
    Ok(Response::json(r#"{"data":"x"}"#))
}

async fn count_zero(_cx: RequestContext) -> Result<Response> {
    Ok(Response::json(r#"{"count":0}"#))
}

async fn failing(_cx: RequestContext) -> Result<Response> {
    Err(Error::handler("boom"))
}

#[tokio::test]
async fn executes_middlewares_in_list_order() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let handler_log = Arc::clone(&log);
    let handler = move |_cx: RequestContext| {
        let log = Arc::clone(&handler_log);
        async move {
            log.lock().unwrap().push("handler");
            Ok::<_, Error>(Response::json(r#"{"data":"test"}"#))
        }
    };

    let pipeline = compose(handler, vec![
        recording(&log, "m1-before", "m1-after"),
        recording(&log, "m2-before", "m2-after"),
    ]);

    let response = pipeline.call(context()).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["m1-before", "m2-before", "handler", "m2-after", "m1-after"],
    );
}

#[tokio::test]
async fn empty_middleware_list_returns_the_handler_response_unchanged() {
    let pipeline = compose(data_x, Vec::new());

    let response = pipeline.call(context()).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(body_json(&response), json!({"data": "x"}));
}

#[tokio::test]
async fn short_circuit_skips_the_handler_and_all_inner_layers() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let handler_log = Arc::clone(&log);
    let handler = move |_cx: RequestContext| {
        let log = Arc::clone(&handler_log);
        async move {
            log.lock().unwrap().push("handler");
            Ok::<_, Error>(Response::json(r#"{"data":"handler"}"#))
        }
    };

    // Returns without touching its continuation.
    let reject: Arc<dyn Middleware> = Arc::new(|_cx: RequestContext, _next: Next| async move {
        Ok::<_, Error>(
            Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .json(r#"{"error":"Unauthorized"}"#),
        )
    });

    let pipeline = compose(handler, vec![reject, recording(&log, "inner-before", "inner-after")]);

    let response = pipeline.call(context()).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(&response), json!({"error": "Unauthorized"}));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn context_replacement_flows_inward_and_the_original_survives() {
    let observed: Arc<Mutex<Option<(Option<String>, Option<String>)>>> =
        Arc::new(Mutex::new(None));

    let observed_by_handler = Arc::clone(&observed);
    let handler = move |cx: RequestContext| {
        let observed = Arc::clone(&observed_by_handler);
        async move {
            *observed.lock().unwrap() = Some((
                cx.param("stage").map(str::to_owned),
                cx.principal().map(|p| p.id.clone()),
            ));
            Ok::<_, Error>(Response::json(r#"{"data":"test"}"#))
        }
    };

    let replace: Arc<dyn Middleware> = Arc::new(|cx: RequestContext, next: Next| async move {
        let original = cx.clone();

        let mut params = HashMap::new();
        params.insert("stage".to_owned(), "replaced".to_owned());
        let replaced = cx
            .with_params(params)
            .with_principal(Principal::new("user1", "admin"));

        let response = next.run(replaced).await?;

        // Post-processing: the pre-replacement context is intact.
        assert_eq!(original.param("stage"), Some("initial"));
        assert!(original.principal().is_none());
        Ok(response)
    });

    let mut params = HashMap::new();
    params.insert("stage".to_owned(), "initial".to_owned());
    let cx = context().with_params(params);

    compose(handler, vec![replace]).call(cx).await.unwrap();

    assert_eq!(
        *observed.lock().unwrap(),
        Some((Some("replaced".to_owned()), Some("user1".to_owned()))),
    );
}

#[tokio::test]
async fn params_and_principal_pass_through_untouched_layers() {
    type SeenLog = Arc<Mutex<Vec<(&'static str, Option<String>, Option<String>)>>>;

    fn observer(seen: &SeenLog, label: &'static str) -> Arc<dyn Middleware> {
        let seen = Arc::clone(seen);
        Arc::new(move |cx: RequestContext, next: Next| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push((
                    label,
                    cx.param("id").map(str::to_owned),
                    cx.principal().map(|p| p.id.clone()),
                ));
                next.run(cx).await
            }
        })
    }

    let seen: SeenLog = Arc::new(Mutex::new(Vec::new()));

    let seen_by_handler = Arc::clone(&seen);
    let handler = move |cx: RequestContext| {
        let seen = Arc::clone(&seen_by_handler);
        async move {
            seen.lock().unwrap().push((
                "handler",
                cx.param("id").map(str::to_owned),
                cx.principal().map(|p| p.id.clone()),
            ));
            Ok::<_, Error>(Response::json(r#"{"data":"test"}"#))
        }
    };

    let mut params = HashMap::new();
    params.insert("id".to_owned(), "123".to_owned());
    let cx = context()
        .with_params(params)
        .with_principal(Principal::new("user1", "admin"));

    let pipeline = compose(handler, vec![observer(&seen, "m1"), observer(&seen, "m2")]);
    pipeline.call(cx).await.unwrap();

    let expected = |label| (label, Some("123".to_owned()), Some("user1".to_owned()));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![expected("m1"), expected("m2"), expected("handler")],
    );
}

#[tokio::test]
async fn three_increment_layers_transform_the_response_in_turn() {
    let increment: Arc<dyn Middleware> = Arc::new(|cx: RequestContext, next: Next| async move {
        let response = next.run(cx).await?;
        let mut data: Value = serde_json::from_slice(response.body()).map_err(Error::handler)?;
        data["count"] = json!(data["count"].as_i64().unwrap_or(0) + 1);
        Ok(Response::json(data.to_string()))
    });

    let pipeline = compose(count_zero, vec![increment.clone(), increment.clone(), increment]);

    let response = pipeline.call(context()).await.unwrap();

    assert_eq!(body_json(&response), json!({"count": 3}));
}

#[tokio::test]
async fn a_trapped_failure_surfaces_as_a_500_to_outer_layers() {
    let outer_saw: Arc<Mutex<Option<u16>>> = Arc::new(Mutex::new(None));

    let outer_saw_in = Arc::clone(&outer_saw);
    let outer: Arc<dyn Middleware> = Arc::new(move |cx: RequestContext, next: Next| {
        let outer_saw = Arc::clone(&outer_saw_in);
        async move {
            let response = next.run(cx).await?;
            *outer_saw.lock().unwrap() = Some(response.status_code().as_u16());
            Ok(response)
        }
    });

    let pipeline = compose(failing, vec![outer, Arc::new(ErrorMiddleware)]);

    let response = pipeline.call(context()).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(&response),
        json!({"error": "Internal Server Error", "message": "boom"}),
    );
    // The outer layer saw a normal response, never the failure.
    assert_eq!(*outer_saw.lock().unwrap(), Some(500));
}

#[tokio::test]
async fn a_failure_with_no_trap_reaches_the_caller() {
    let pipeline = compose(failing, vec![Arc::new(TraceMiddleware)]);

    let err = pipeline.call(context()).await.unwrap_err();

    assert_eq!(err.message(), "boom");
}

#[tokio::test]
async fn pipeline_invocations_are_independent() {
    let increment: Arc<dyn Middleware> = Arc::new(|cx: RequestContext, next: Next| async move {
        let response = next.run(cx).await?;
        let mut data: Value = serde_json::from_slice(response.body()).map_err(Error::handler)?;
        data["count"] = json!(data["count"].as_i64().unwrap_or(0) + 1);
        Ok(Response::json(data.to_string()))
    });

    let pipeline = compose(count_zero, vec![increment]);

    // No per-call state leaks between invocations.
    for _ in 0..3 {
        let response = pipeline.call(context()).await.unwrap();
        assert_eq!(body_json(&response), json!({"count": 1}));
    }
}
