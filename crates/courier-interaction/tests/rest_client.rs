use courier_core::identity::IdentityContext;
use courier_core::message::{MessageApi, SendReceipt, Target, TargetKind};
use courier_core::profile::ProfileApi;
use courier_interaction::RestApiClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the fake server.
struct RecordedRequest {
    request_line: String,
    head: String,
    body: String,
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

/// Serves exactly one HTTP request with a canned response, then stops listening.
async fn serve_once(
    status_line: &'static str,
    response_body: &'static str,
) -> (String, JoinHandle<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_header_end(&buf) {
                break end;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body =
            String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            response_body.len(),
            response_body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;

        RecordedRequest {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            head,
            body,
        }
    });

    (format!("http://{}/api", addr), handle)
}

fn client(base_url: &str, auth_token: Option<&str>) -> RestApiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RestApiClient::new(base_url, auth_token.map(str::to_string))
        .unwrap()
        .with_http_client(http)
}

/// A base URL nothing listens on.
async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

#[tokio::test]
async fn test_fetch_messages_sends_target_query_and_cookie() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"messages":[{"id":"m-1","content":"hello team","creator_name":"alice","creator_email":"alice@example.com","create_date":1700000000000}]}"#,
    )
    .await;
    let client = client(&base_url, Some("secret"));

    let conversation = client
        .fetch_messages(&Target::group("engineering"))
        .await
        .unwrap();

    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation[0].author, "alice");
    assert_eq!(conversation[0].content, "hello team");

    let request = server.await.unwrap();
    assert_eq!(
        request.request_line,
        "GET /api/message?target_name=engineering&type=GROUP HTTP/1.1"
    );
    assert!(
        request
            .head
            .to_ascii_lowercase()
            .contains("cookie: auth_token=secret")
    );
}

#[tokio::test]
async fn test_send_message_puts_trimmed_form_body() {
    let (base_url, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
    let client = client(&base_url, None);

    let receipt = client
        .send_message(&Target::group("engineering"), "  hello team \n")
        .await
        .unwrap();
    assert_eq!(receipt, SendReceipt::Acknowledged);

    let request = server.await.unwrap();
    assert!(request.request_line.starts_with("PUT /api/message "));
    assert!(
        request
            .head
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded")
    );
    assert_eq!(
        request.body,
        "target_name=engineering&type=GROUP&content=hello+team"
    );
}

#[tokio::test]
async fn test_send_empty_content_never_reaches_the_server() {
    let client = client(&closed_base_url().await, None);

    let err = client
        .send_message(&Target::user("bob"), "   ")
        .await
        .unwrap_err();
    assert!(err.is_validation(), "got {err:?}");
}

#[tokio::test]
async fn test_delete_forbidden_maps_to_authorization() {
    let (base_url, server) = serve_once(
        "403 Forbidden",
        r#"{"type":"ForbiddenError","message":"You don't have access to this resource"}"#,
    )
    .await;
    let client = client(&base_url, None);

    let err = client.delete_message("m-1").await.unwrap_err();
    assert!(err.is_authorization(), "got {err:?}");

    let request = server.await.unwrap();
    assert!(request.request_line.starts_with("DELETE /api/message/m-1 "));
}

#[tokio::test]
async fn test_unknown_target_maps_to_not_found() {
    let (base_url, _server) = serve_once(
        "400 Bad Request",
        r#"{"type":"ValidationError","message":"Target not found: ghost"}"#,
    )
    .await;
    let client = client(&base_url, None);

    let err = client
        .fetch_messages(&Target::user("ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn test_fetch_group_profile() {
    let (base_url, server) = serve_once("200 OK", r#"{"name":"engineering","members":[]}"#).await;
    let client = client(&base_url, None);

    let profile = client
        .fetch_profile(TargetKind::Group, "engineering")
        .await
        .unwrap();
    assert_eq!(profile.target(), Target::group("engineering"));

    let request = server.await.unwrap();
    assert!(request.request_line.starts_with("GET /api/group/engineering "));
}

#[tokio::test]
async fn test_viewer_username_is_looked_up_once() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"anonymous":false,"username":"alice"}"#).await;
    let client = client(&base_url, None);

    assert_eq!(client.viewer_username().await.unwrap(), "alice");
    server.await.unwrap();

    // The fake server is gone; a second lookup must come from the cache
    assert_eq!(client.viewer_username().await.unwrap(), "alice");
}

#[tokio::test]
async fn test_anonymous_viewer_is_unauthorized() {
    let (base_url, _server) = serve_once("200 OK", r#"{"anonymous":true}"#).await;
    let client = client(&base_url, None);

    assert!(client.viewer_username().await.unwrap_err().is_authorization());
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let client = client(&closed_base_url().await, None);

    let err = client
        .fetch_messages(&Target::group("engineering"))
        .await
        .unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}
