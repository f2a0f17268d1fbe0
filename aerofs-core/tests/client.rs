use aerofs_core::{AeroClient, Api, ApiErrorClass, EntityTag, File, Folder};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn file_body(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "parent": "root",
        "last_modified": "2013-12-17T23:09:11Z",
        "size": 5,
        "mime_type": "text/plain",
        "content_state": "AVAILABLE"
    })
}

fn without_if_match(request: &Request) -> bool {
    !request.headers.contains_key("if-match")
}

#[tokio::test]
async fn get_file_sends_bearer_token_and_returns_etag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.2/files/f1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(file_body("f1", "notes.txt")),
        )
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let response = client.get_file("f1").await.unwrap();

    assert_eq!(response.body["name"], "notes.txt");
    assert_eq!(
        response.etag().unwrap(),
        EntityTag::Known("\"v1\"".to_string())
    );
}

#[tokio::test]
async fn get_file_content_returns_raw_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.2/files/f1/content"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_raw(b"hello".to_vec(), "text/plain"),
        )
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let response = client.get_file_content("f1").await.unwrap();

    assert_eq!(response.body, b"hello");
    assert_eq!(response.content_type().unwrap(), "text/plain");
}

#[tokio::test]
async fn create_folder_posts_parent_and_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.2/folders"))
        .and(body_json(json!({"parent": "root", "name": "Docs"})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(json!({"id": "d1", "name": "Docs", "parent": "root", "is_shared": false})),
        )
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let response = client.create_folder("root", "Docs").await.unwrap();

    assert_eq!(response.body["id"], "d1");
}

#[tokio::test]
async fn move_file_sends_if_match_for_known_tag() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1.2/files/f1"))
        .and(header("if-match", "\"v1\""))
        .and(body_json(json!({"parent": "archive", "name": "notes.txt"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_json(file_body("f1", "notes.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    client
        .move_file(
            "f1",
            "archive",
            "notes.txt",
            &EntityTag::Known("\"v1\"".to_string()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn move_file_omits_if_match_when_unconditional() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1.2/files/f1"))
        .and(without_if_match)
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_json(file_body("f1", "notes.txt")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    for tag in [EntityTag::Unknown, EntityTag::Unconditional] {
        client
            .move_file("f1", "root", "notes.txt", &tag)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn upload_file_content_puts_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1.2/files/f1/content"))
        .and(header("if-match", "\"v1\""))
        .and(header("content-type", "application/octet-stream"))
        .and(body_string("new body"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    client
        .upload_file_content(
            "f1",
            b"new body",
            &EntityTag::Known("\"v1\"".to_string()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_folder_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1.2/folders/d1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    client
        .delete_folder("d1", &EntityTag::Unknown)
        .await
        .unwrap();
}

#[tokio::test]
async fn stale_tag_is_reported_as_precondition_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1.2/files/f1"))
        .respond_with(ResponseTemplate::new(412).set_body_string("etag mismatch"))
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client
        .delete_file("f1", &EntityTag::Known("\"old\"".to_string()))
        .await
        .unwrap_err();

    assert!(err.is_precondition_failed());
    assert_eq!(
        err.classification(),
        Some(ApiErrorClass::PreconditionFailed)
    );
}

#[tokio::test]
async fn renaming_a_file_round_trips_through_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.2/files/f1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(file_body("f1", "notes.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1.2/files/f1"))
        .and(header("if-match", "\"v1\""))
        .and(body_json(json!({"parent": "root", "name": "renamed.txt"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_json(file_body("f1", "renamed.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let mut file = File::referenced(&client, "f1");
    assert_eq!(file.name().await.unwrap(), Some("notes.txt"));

    file.set_name("renamed.txt".to_string());
    file.save_name().await.unwrap();

    assert_eq!(file.name().await.unwrap(), Some("renamed.txt"));
    assert_eq!(
        file.etag().await.unwrap(),
        &EntityTag::Known("\"v2\"".to_string())
    );
}

#[tokio::test]
async fn sharing_a_folder_reloads_it_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1.2/folders/d1/is_shared"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.2/folders/d1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v3\"")
                .set_body_json(json!({
                    "id": "d1",
                    "name": "Team",
                    "parent": "root",
                    "is_shared": true,
                    "sid": "s-9"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AeroClient::with_base_url(&server.uri(), "test-token").unwrap();
    let mut folder = Folder::referenced(&client, "d1");
    folder.share().await.unwrap();

    assert_eq!(folder.is_shared().await.unwrap(), Some(true));
    assert_eq!(
        folder.shared_folder().await.unwrap().map(|s| s.id()),
        Some("s-9")
    );
}
