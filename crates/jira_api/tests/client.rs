use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use jira_api::{JiraApiError, JiraClient, JiraConfig};
use time::{Date, Month};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn allow_local_integration() -> bool {
    std::env::var("SECRETARY_ALLOW_LOCAL_INTEGRATION")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

#[derive(Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
}

fn ok(body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status: 200,
        body: body.to_string(),
    }
}

fn status(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status,
        body: body.to_string(),
    }
}

/// A request as seen by the server: request line plus body.
#[derive(Debug, Clone)]
struct SeenRequest {
    line: String,
    headers: String,
    body: String,
}

struct ScriptedServer {
    base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");

        let handle = tokio::spawn({
            let seen = Arc::clone(&seen);
            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let scripts = Arc::clone(&scripts);
                    let counter = Arc::clone(&counter);
                    let seen = Arc::clone(&seen);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, counter, seen).await;
                    });
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
            handle,
        }
    }

    fn client(&self) -> JiraClient {
        JiraClient::new(JiraConfig::new(format!("{}/", self.base_url), "secret-token"))
            .expect("client")
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    fn shutdown(&self) {
        self.handle.abort();
    }
}

fn date(day: u8) -> Date {
    Date::from_calendar_date(2026, Month::March, day).expect("valid date")
}

#[tokio::test]
async fn search_follows_pagination_until_total() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![
        ok(r#"{"total":3,"issues":[
            {"key":"PROJ-1","fields":{"summary":"One","status":{"name":"In Progress"}}},
            {"key":"PROJ-2","fields":{"summary":"Two","status":null}}]}"#),
        ok(r#"{"total":3,"issues":[{"key":"PROJ-3","fields":{"summary":"Three"}}]}"#),
    ])
    .await;

    let issues = server
        .client()
        .open_issues()
        .await
        .expect("search should succeed");

    assert_eq!(
        issues.iter().map(|issue| issue.key.as_str()).collect::<Vec<_>>(),
        vec!["PROJ-1", "PROJ-2", "PROJ-3"]
    );
    assert_eq!(issues[0].status, "In Progress");
    assert_eq!(issues[1].status, "");

    let seen = server.seen();
    assert!(seen[0].line.starts_with("GET /rest/api/2/search?jql="));
    assert!(seen[0].line.contains("startAt=0"));
    assert!(seen[1].line.contains("startAt=2"));
    assert!(seen[0]
        .headers
        .to_ascii_lowercase()
        .contains("authorization: bearer secret-token"));

    server.shutdown();
}

#[tokio::test]
async fn add_worklog_posts_seconds_comment_and_optional_start() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![status(201, "{}"), status(201, "{}")]).await;
    let client = server.client();

    client
        .add_worklog("PROJ-7", 5400, "Code review", Some(date(2)))
        .await
        .expect("dated worklog should succeed");
    client
        .add_worklog("PROJ-7", 600, "Standup", None)
        .await
        .expect("undated worklog should succeed");

    let seen = server.seen();
    assert!(seen[0].line.starts_with("POST /rest/api/2/issue/PROJ-7/worklog"));
    let dated: serde_json::Value = serde_json::from_str(&seen[0].body).expect("json body");
    assert_eq!(dated["timeSpentSeconds"], 5400);
    assert_eq!(dated["comment"], "Code review");
    assert_eq!(dated["started"], "2026-03-02T09:00:00.000+0000");

    let undated: serde_json::Value = serde_json::from_str(&seen[1].body).expect("json body");
    assert!(undated.get("started").is_none());

    server.shutdown();
}

#[tokio::test]
async fn rejected_worklog_reports_status_and_body() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![status(403, "forbidden")]).await;

    let error = server
        .client()
        .add_worklog("PROJ-7", 60, "x", None)
        .await
        .expect_err("403 should fail");

    assert_eq!(error.status(), Some(403));
    assert_eq!(error.to_string(), "jira returned 403: forbidden");

    server.shutdown();
}

#[tokio::test]
async fn logged_seconds_aggregate_per_day_and_skip_unreadable_issues() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![
        ok(r#"{"accountId":"acc-1","name":"jdoe"}"#),
        ok(r#"{"total":2,"issues":[{"key":"PROJ-1","fields":{}},{"key":"PROJ-2","fields":{}}]}"#),
        ok(r#"{"worklogs":[
            {"author":{"accountId":"acc-1"},"started":"2026-03-02T09:00:00.000+0000","timeSpentSeconds":3600},
            {"author":{"accountId":"acc-2"},"started":"2026-03-02T09:00:00.000+0000","timeSpentSeconds":7200},
            {"author":{"accountId":"acc-1"},"started":"2026-03-03T10:00:00.000+0000","timeSpentSeconds":28800}]}"#),
        status(500, "boom"),
    ])
    .await;

    let totals = server
        .client()
        .logged_seconds_by_day(date(2), date(3))
        .await
        .expect("aggregation should succeed");

    assert_eq!(totals.get(&date(2)), Some(&3600));
    assert_eq!(totals.get(&date(3)), Some(&28800));

    let seen = server.seen();
    assert!(seen[0].line.starts_with("GET /rest/api/2/myself"));
    assert!(seen[1].line.contains("worklogDate"));

    server.shutdown();
}

#[tokio::test]
async fn myself_without_identity_is_an_error() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![ok("{}")]).await;
    let error = server.client().myself().await.expect_err("empty identity");
    assert!(matches!(error, JiraApiError::MissingIdentity));

    server.shutdown();
}

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        403 => "Forbidden",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<ScriptedResponse>>,
    counter: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
) {
    let Ok(request) = read_request(&mut socket).await else {
        return;
    };
    let index = counter.fetch_add(1, Ordering::AcqRel);
    seen.lock().expect("seen lock").push(request);

    let response = scripts
        .get(index)
        .cloned()
        .unwrap_or_else(|| status(500, "unexpected request"));
    let payload = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        status_reason(response.status),
        response.body.len(),
        response.body,
    );
    let _ = socket.write_all(payload.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<SeenRequest> {
    let mut raw = Vec::new();
    let mut buffer = [0_u8; 2048];

    let header_end = loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while raw.len() < header_end + content_length {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buffer[..n]);
    }

    let mut lines = head.lines();
    let line = lines.next().unwrap_or_default().to_string();
    let headers = lines.collect::<Vec<_>>().join("\n");
    let body = String::from_utf8_lossy(&raw[header_end..]).to_string();

    Ok(SeenRequest {
        line,
        headers,
        body,
    })
}
