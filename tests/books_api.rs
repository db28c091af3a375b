use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::App;
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let mut settings = Settings::default();
    settings.database.url = "sqlite::memory:".to_string();
    App::bootstrap(settings).await.unwrap().router()
}

async fn send(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes)
}

async fn send_json(router: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, Body::from(body.to_string())).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Bytes) {
    send(router, Method::GET, uri, Body::empty()).await
}

async fn create(router: &Router, book: Value) -> Value {
    let (status, created) = send_json(router, Method::POST, "/books", book).await;
    assert_eq!(status, StatusCode::OK, "{created}");
    created
}

fn id_of(book: &Value) -> i64 {
    book["id"].as_i64().expect("book has an id")
}

#[tokio::test]
async fn list_starts_empty_and_grows() {
    let router = app().await;

    let (status, body) = get(&router, "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));

    create(&router, json!({"title": "One", "publish_date": "2001-Jan-20"})).await;
    create(&router, json!({"title": "Two", "publish_date": "2001-Jan-21"})).await;

    let (status, body) = get(&router, "/books").await;
    assert_eq!(status, StatusCode::OK);
    let books: Vec<Value> = serde_json::from_slice(&body).unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[tokio::test]
async fn create_returns_book_with_assigned_id() {
    let router = app().await;

    let created = create(
        &router,
        json!({"title": "A Tale of Two Code Challenges", "publish_date": "2010-Dec-26"}),
    )
    .await;

    assert_eq!(created["title"], "A Tale of Two Code Challenges");
    assert_eq!(created["publish_date"], "2010-Dec-26");
    assert_eq!(created["checked_out"], false);
    assert_eq!(created["rating"], 0);
    assert!(id_of(&created) > 0);
    assert!(created["created_at"].is_string());
    assert!(created["deleted_at"].is_null());
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let router = app().await;

    let created = create(
        &router,
        json!({"id": 999, "title": "Mine", "publish_date": "2010-Dec-26"}),
    )
    .await;

    assert_ne!(id_of(&created), 999);
    let (status, _) = get(&router, "/books/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn null_fields_are_treated_as_absent() {
    let router = app().await;

    let created = create(
        &router,
        json!({
            "title": "x",
            "author": null,
            "publish_date": "2010-Dec-26",
            "rating": null,
            "checked_out": null
        }),
    )
    .await;
    assert_eq!(created["author"], "");
    assert_eq!(created["rating"], 0);
    assert_eq!(created["checked_out"], false);

    let uri = format!("/books/{}", id_of(&created));
    let (status, updated) = send_json(
        &router,
        Method::PUT,
        &uri,
        json!({"title": null, "author": "Someone", "rating": null}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "x");
    assert_eq!(updated["author"], "Someone");
}

#[tokio::test]
async fn create_then_get_round_trips_fields() {
    let router = app().await;
    let book = json!({
        "title": "Foo",
        "author": "Bar",
        "publisher": "Foobar Publishing",
        "publish_date": "1981-Sep-26",
        "rating": 1,
        "checked_out": true
    });

    let created = create(&router, book.clone()).await;
    let (status, body) = get(&router, &format!("/books/{}", id_of(&created))).await;
    assert_eq!(status, StatusCode::OK);

    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched, created);
    for field in ["title", "author", "publisher", "publish_date", "rating", "checked_out"] {
        assert_eq!(fetched[field], book[field], "{field}");
    }
}

#[tokio::test]
async fn create_rejects_bad_dates() {
    let router = app().await;
    let bad_dates = [
        "2012-12-26",
        "2012-September-30",
        "December 21st, 2001",
        "{\"json\": \"structure\"}",
        "2001-Jan-35",
        "2012/06/16",
        "10/Jan/2008",
        "+2010-Dec-26",
        "-2010-Dec-26",
    ];

    for (index, date) in bad_dates.iter().enumerate() {
        let (status, body) = send_json(
            &router,
            Method::POST,
            "/books",
            json!({"title": format!("The Future {index}"), "publish_date": date}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"publish_date": date}));
    }
}

#[tokio::test]
async fn create_rejects_bad_ratings() {
    let router = app().await;

    for (index, rating) in [-2, 20, 4, 203003, -49849, 9999999].into_iter().enumerate() {
        let (status, body) = send_json(
            &router,
            Method::POST,
            "/books",
            json!({
                "title": format!("The Past {index}"),
                "publish_date": "2001-Jan-20",
                "rating": rating
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"rating": rating}));
    }
}

#[tokio::test]
async fn create_rejects_rating_four() {
    let router = app().await;

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/books",
        json!({"title": "Too Good", "publish_date": "2001-Jan-20", "rating": 4}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["rating"], 4);
}

#[tokio::test]
async fn create_rejects_strings_too_long() {
    let router = app().await;
    let cases = [
        ("title", json!({"title": "t".repeat(256), "publish_date": "2001-Jan-20"})),
        (
            "author",
            json!({
                "title": "A Tale of Two Code Challenges",
                "author": "a".repeat(1000),
                "publish_date": "2001-Jan-20"
            }),
        ),
        (
            "publisher",
            json!({
                "title": "A Tale of Two Code Challenges",
                "author": "Charles Dickens",
                "publisher": "p".repeat(10000),
                "publish_date": "2001-Jan-20"
            }),
        ),
    ];

    for (field, book) in cases {
        let (status, body) = send_json(&router, Method::POST, "/books", book).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ field: "too long" }));
    }

    let (_, body) = get(&router, "/books").await;
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn create_rejects_malformed_bodies() {
    let router = app().await;
    let bodies = [
        "{[jks1\nkdk",
        "{[}",
        "{\"title\": \"foo\"}",
        "{\"title\": \"A-Bar\", \"author\": \"",
        "{}",
        "",
        "[1, 2, 3]",
        "{\"rating\": \"three\"}",
    ];

    for raw in bodies {
        let (status, bytes) = send(&router, Method::POST, "/books", Body::from(raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");

        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.is_object(), "{raw}");
    }

    // A well-formed body without a date is rejected for the empty date.
    let (_, body) = send_json(&router, Method::POST, "/books", json!({"title": "foo"})).await;
    assert_eq!(body, json!({"publish_date": ""}));
}

#[tokio::test]
async fn get_unknown_book_is_empty_404() {
    let router = app().await;

    let (status, body) = get(&router, "/books/12345").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn unmatched_uris_are_404() {
    let router = app().await;
    create(&router, json!({"title": "Present", "publish_date": "2001-Jan-20"})).await;

    for uri in [
        "/books/",
        "/books/*",
        "/books/%0A",
        "/books/all%20books",
        "/books/get/1/",
        "/books/1/get",
        "/booksx",
        "/",
    ] {
        let (status, _) = get(&router, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    let (status, _) = send(&router, Method::DELETE, "/books/?id=1", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::PATCH, "/books/1", Body::from("{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::PUT, "/books", Body::from("{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_merges_and_persists() {
    let router = app().await;
    let created = create(
        &router,
        json!({
            "title": "crUdz",
            "author": "Ghost",
            "rating": 3,
            "publish_date": "2001-Dec-01"
        }),
    )
    .await;
    assert_eq!(created["checked_out"], false);
    let uri = format!("/books/{}", id_of(&created));

    let (status, updated) = send_json(
        &router,
        Method::PUT,
        &uri,
        json!({"title": "Beef", "checked_out": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["checked_out"], true);
    assert_eq!(updated["title"], "Beef");
    assert_eq!(updated["author"], "Ghost");
    assert_eq!(updated["rating"], 3);
    assert_eq!(updated["id"], created["id"]);

    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched["checked_out"], true);
    assert_eq!(fetched["title"], "Beef");
    assert_eq!(fetched["created_at"], created["created_at"]);
}

#[tokio::test]
async fn update_checks_supplied_date_and_rating() {
    let router = app().await;
    let created = create(
        &router,
        json!({"title": "crUdz", "author": "Ghost", "rating": 3, "publish_date": "2001-Dec-01"}),
    )
    .await;
    let uri = format!("/books/{}", id_of(&created));

    for (patch, field) in [
        (json!({"title": "Vacation", "rating": 50000000}), "rating"),
        (json!({"title": "Vouchers", "rating": -50000000}), "rating"),
        (json!({"title": "BringDollars", "publish_date": "10/10/2001"}), "publish_date"),
    ] {
        let (status, body) = send_json(&router, Method::PUT, &uri, patch).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get(field).is_some(), "{body}");
    }

    // A valid rating on its own still runs the full rule set, including
    // the date check against the patch's empty date.
    let (status, body) = send_json(&router, Method::PUT, &uri, json!({"rating": 2})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"publish_date": ""}));

    let (status, updated) = send_json(
        &router,
        Method::PUT,
        &uri,
        json!({"rating": 2, "publish_date": "2002-Feb-02"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 2);
    assert_eq!(updated["publish_date"], "2002-Feb-02");
    assert_eq!(updated["title"], "crUdz");
}

// Text-only updates skip validation, so over-long text gets through.
#[tokio::test]
async fn update_without_date_or_rating_skips_validation() {
    let router = app().await;
    let created = create(&router, json!({"title": "Short", "publish_date": "2001-Jan-20"})).await;
    let uri = format!("/books/{}", id_of(&created));

    let long_title = "x".repeat(300);
    let (status, updated) =
        send_json(&router, Method::PUT, &uri, json!({"title": long_title})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], long_title);
}

// `checked_out` cannot be told apart from "omitted" when false, so an
// update that leaves it out returns a checked-out book.
#[tokio::test]
async fn update_omitting_checked_out_returns_book() {
    let router = app().await;
    let created = create(
        &router,
        json!({"title": "Borrowed", "publish_date": "2001-Jan-20", "checked_out": true}),
    )
    .await;
    let uri = format!("/books/{}", id_of(&created));

    let (status, updated) =
        send_json(&router, Method::PUT, &uri, json!({"author": "Someone"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["checked_out"], false);
    assert_eq!(updated["author"], "Someone");
}

#[tokio::test]
async fn update_unknown_book_is_404_before_body_is_read() {
    let router = app().await;

    let (status, body) = send(&router, Method::PUT, "/books/77", Body::from("{[}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, _) = send_json(&router, Method::PUT, "/books/77", json!({"title": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_malformed_body_is_400() {
    let router = app().await;
    let created = create(&router, json!({"title": "Intact", "publish_date": "2001-Jan-20"})).await;
    let uri = format!("/books/{}", id_of(&created));

    let (status, _) = send(&router, Method::PUT, &uri, Body::from("{\"title\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&router, &uri).await;
    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched["title"], "Intact");
}

#[tokio::test]
async fn delete_returns_book_then_hides_it() {
    let router = app().await;
    let created = create(
        &router,
        json!({
            "title": "Not Long For This Position",
            "author": "David Dennison",
            "rating": 3,
            "publish_date": "2016-Jan-01"
        }),
    )
    .await;
    let uri = format!("/books/{}", id_of(&created));

    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let (status, deleted) = send_json(&router, Method::DELETE, &uri, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, created);

    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&router, Method::DELETE, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, _) = send_json(&router, Method::PUT, &uri, json!({"title": "Zombie"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&router, "/books").await;
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let router = app().await;

    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, body) = get(&router, "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec: Value = serde_json::from_slice(&body).unwrap();
    assert!(spec["paths"]["/books/{id}"]["put"].is_object());
}
