use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use folio_core::auth::Credentials;
use folio_core::graph::Graph;
use folio_core::media::LocalImageStore;
use folio_db::TaskDir;
use folio_web::create_router;
use folio_web::state::AppState;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "hunter2";

struct TestApp {
    _dir: TempDir,
    router: Router,
    tasks: PathBuf,
    uploads: PathBuf,
}

fn setup(password: Option<&str>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(folio_db::init_memory_pool().unwrap());
    let tasks = TaskDir::open(dir.path().join("task")).unwrap();
    let task_root = tasks.root().to_path_buf();
    let graph = Arc::new(Graph::new(db.clone(), tasks));
    let uploads = dir.path().join("uploads");
    let images = Arc::new(LocalImageStore::new(&uploads));

    let state = AppState::new(
        graph,
        db,
        images,
        Credentials::new(password),
        Some(uploads.clone()),
    );
    TestApp {
        _dir: dir,
        router: create_router(state),
        tasks: task_root,
        uploads,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn create_node(&self, title: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/content",
                Some(json!({
                    "title": title,
                    "content": "body",
                    "position": {"x": 10.0, "y": 20.0},
                    "Password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["contentId"].as_str().unwrap().to_string()
    }
}

fn multipart(boundary: &str, parts: &[(&str, Option<(&str, &str)>, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    name, file_name, content_type
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
    let boundary = "folio-test-boundary";
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(multipart(boundary, parts)))
        .unwrap()
}

#[tokio::test]
async fn test_empty_graph() {
    let app = setup(Some(PASSWORD));
    let (status, body) = app.send("GET", "/api/content", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contentData"], json!([]));
    assert_eq!(body["edgeData"], json!([]));
    assert_eq!(body["staticCount"], 0);
    assert_eq!(body["filesCount"], 0);
}

#[tokio::test]
async fn test_create_requires_password() {
    let app = setup(Some(PASSWORD));
    let (status, body) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({"title": "x", "position": {"x": 1, "y": 2}, "Password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid password");
}

#[tokio::test]
async fn test_unconfigured_password_refuses_writes() {
    let app = setup(None);
    let (status, _) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({"title": "x", "position": {"x": 1, "y": 2}, "Password": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_then_fetch_by_id_and_slug() {
    let app = setup(Some(PASSWORD));
    let id = app.create_node("Hello Rust").await;

    let (status, by_id) = app.send("GET", &format!("/api/content/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["slug"], "hello-rust");

    let (status, by_slug) = app.send("GET", "/api/content/hello-rust", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["id"], id.as_str());

    let (status, _) = app.send("GET", "/api/content/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_with_nothing_is_bad_request() {
    let app = setup(Some(PASSWORD));
    let (status, _) = app
        .send("POST", "/api/content", Some(json!({"title": "x", "Password": PASSWORD})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_connect_via_post_and_missing_endpoint() {
    let app = setup(Some(PASSWORD));
    let a = app.create_node("A").await;
    let b = app.create_node("B").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({"source": a, "target": b, "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edge"]["id"], format!("{}-{}", a, b));

    let (status, _) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({"source": a, "target": "9999", "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, graph) = app.send("GET", "/api/content", None).await;
    assert_eq!(graph["edgeData"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_put_position_is_open_but_body_edit_is_protected() {
    let app = setup(Some(PASSWORD));
    let id = app.create_node("Draft").await;

    let (status, _) = app
        .send("PUT", "/api/content", Some(json!({"id": id, "position": {"x": 5, "y": 6}})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("PUT", "/api/content", Some(json!({"id": id, "content": "changed"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            "PUT",
            "/api/content",
            Some(json!({"id": id, "content": "changed", "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["content"], "changed");
    assert_eq!(body["content"]["position"], json!({"x": 5.0, "y": 6.0}));
}

#[tokio::test]
async fn test_delete_content_and_invalid_type() {
    let app = setup(Some(PASSWORD));
    let a = app.create_node("A").await;
    let b = app.create_node("B").await;
    app.send(
        "POST",
        "/api/content",
        Some(json!({"source": a, "target": b, "Password": PASSWORD})),
    )
    .await;

    let (status, _) = app
        .send(
            "DELETE",
            "/api/content",
            Some(json!({"id": a, "type": "widget", "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "DELETE",
            "/api/content",
            Some(json!({"id": a, "type": "content", "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edgesRemoved"], 1);

    let (_, graph) = app.send("GET", "/api/content", None).await;
    assert_eq!(graph["staticCount"], 1);
    assert_eq!(graph["edgeData"], json!([]));
}

#[tokio::test]
async fn test_view_counter() {
    let app = setup(Some(PASSWORD));
    let id = app.create_node("Counted").await;

    app.send("POST", &format!("/api/content/{}/view", id), None).await;
    let (status, body) = app.send("POST", &format!("/api/content/{}/view", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], 2);
}

#[tokio::test]
async fn test_batch_positions_across_files_and_contents() {
    let app = setup(Some(PASSWORD));
    let id = app.create_node("A").await;
    std::fs::write(app.tasks.join("todo.txt"), r#"{"title":"Todo","content":"x"}"#).unwrap();

    let (status, body) = app
        .send(
            "PUT",
            "/api/content/batch/positions",
            Some(json!({"updates": {
                (id.clone()): {"position_x": 1.0, "position_y": 2.0},
                "file-todo": {"position_x": 3.0, "position_y": 4.0},
                "file-missing": {"position_x": 5.0, "position_y": 6.0},
            }})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contentUpdateCount"], 1);
    assert_eq!(body["fileUpdateCount"], 1);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/content/{}/position", id),
            Some(json!({"position_x": 9.0, "position_y": 9.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, graph) = app.send("GET", "/api/content", None).await;
    assert_eq!(graph["filesCount"], 1);
    let todo = graph["contentData"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "file-todo")
        .unwrap();
    assert_eq!(todo["position"], json!({"x": 3.0, "y": 4.0}));
}

#[tokio::test]
async fn test_replace_edges() {
    let app = setup(Some(PASSWORD));
    let a = app.create_node("A").await;
    let b = app.create_node("B").await;

    let (status, body) = app
        .send(
            "PUT",
            "/api/edges",
            Some(json!({"edges": [
                {"id": "e1", "source": a, "target": b},
                {"id": "e2", "source": a, "target": "ghost"},
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_task_files_flow() {
    let app = setup(Some(PASSWORD));

    let (status, _) = app
        .send("POST", "/api/save-txt", Some(json!({"title": "", "content": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, saved) = app
        .send(
            "POST",
            "/api/save-txt",
            Some(json!({"title": "Weekly plan!", "content": "- ship", "keywords": "plan"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["fileName"], "Weekly plan.txt");

    let (status, files) = app.send("GET", "/api/txt-files", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files[0]["name"], "Weekly plan.txt");
    assert_eq!(files[0]["title"], "Weekly plan!");

    let (status, file) = app.send("GET", "/api/txt-file/Weekly%20plan.txt", None).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(file["content"].as_str().unwrap()).unwrap();
    assert_eq!(doc["content"], "- ship");

    let (status, _) = app.send("GET", "/api/txt-file/missing.txt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", "/api/txt-file/notes.md", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_lifecycle_with_local_image() {
    let app = setup(Some(PASSWORD));

    let (status, _) = app
        .dispatch(multipart_request(
            "/api/projects",
            &[
                ("projectName", None, "Portfolio"),
                ("password", None, "wrong"),
                ("image", Some(("shot.png", "image/png")), "PNGDATA"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!app.uploads.exists() || std::fs::read_dir(&app.uploads).unwrap().next().is_none());

    let (status, body) = app
        .dispatch(multipart_request(
            "/project/api",
            &[
                ("projectName", None, "Portfolio"),
                ("company", None, "Acme"),
                ("link", None, "https://acme.dev"),
                ("password", None, PASSWORD),
                ("image", Some(("shot.png", "image/png")), "PNGDATA"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let id = body["insertedId"].as_i64().unwrap();
    let image_url = body["project"]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with("-shot.png"));

    let served = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&image_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = to_bytes(served.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"PNGDATA");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/projects/{}", id),
            Some(json!({"projectName": "Renamed", "company": "Acme", "link": "", "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["name"], "Renamed");

    let (_, list) = app.send("GET", "/api/projects", None).await;
    assert_eq!(list["projects"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .send("DELETE", &format!("/api/projects/{}", id), Some(json!({"Password": PASSWORD})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("DELETE", &format!("/api/projects/{}", id), Some(json!({"Password": PASSWORD})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_editor_image_upload() {
    let app = setup(Some(PASSWORD));
    let (status, body) = app
        .dispatch(multipart_request(
            "/api/content/image",
            &[("file", Some(("diagram one.png", "image/png")), "IMG")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["imageUrl"].as_str().unwrap().ends_with("-diagram-one.png"));

    let (status, _) = app
        .dispatch(multipart_request("/api/content/image", &[("other", None, "x")]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_layout_roundtrip() {
    let app = setup(Some(PASSWORD));
    let (status, body) = app.send("GET", "/api/layout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let layout = json!({"lg": [{"i": "views", "x": 0, "y": 0, "w": 6, "h": 3}]});
    let (status, _) = app.send("PUT", "/api/layout", Some(layout.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send("GET", "/api/layout", None).await;
    assert_eq!(body, layout);
}

#[tokio::test]
async fn test_legacy_content_alias() {
    let app = setup(Some(PASSWORD));
    app.create_node("A").await;
    let (status, body) = app.send("GET", "/content/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["staticCount"], 1);
}

#[tokio::test]
async fn test_create_with_bad_edge_stores_nothing() {
    let app = setup(Some(PASSWORD));
    let a = app.create_node("A").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({
                "title": "Orphan",
                "position": {"x": 1, "y": 2},
                "source": a,
                "target": "9999",
                "Password": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, graph) = app.send("GET", "/api/content", None).await;
    assert_eq!(graph["staticCount"], 1);
    assert_eq!(graph["edgeData"], json!([]));
}

#[tokio::test]
async fn test_edge_to_zero_padded_id_is_rejected() {
    let app = setup(Some(PASSWORD));
    let a = app.create_node("A").await;
    let b = app.create_node("B").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/content",
            Some(json!({"source": format!("0{}", a), "target": b, "Password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            "PUT",
            "/api/edges",
            Some(json!({"edges": [{"id": "alias", "source": format!("0{}", a), "target": b}]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, graph) = app.send("GET", "/api/content", None).await;
    assert_eq!(graph["edgeData"], json!([]));
}
