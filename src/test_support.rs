//! Shared fixtures for unit tests: a canned-response HTTP server and a
//! tracing layer that records events.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone)]
struct Route {
    status: u16,
    body: String,
}

/// Holds every response of a gated [`FixtureServer`] until released.
#[derive(Clone, Default)]
pub struct Gate {
    arrived: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Wait until a request has reached the server.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Let one held response go out.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn hold(&self) {
        self.arrived.notify_one();
        self.release.notified().await;
    }
}

#[derive(Clone, Default)]
struct Behaviour {
    gate: Option<Gate>,
    truncate: bool,
}

/// Serves fixed bodies by request path. Unknown paths get a 404.
pub struct FixtureServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureServer {
    pub async fn start(routes: &[(&str, u16, &str)]) -> Self {
        Self::serve(routes, Behaviour::default()).await
    }

    /// Like [`FixtureServer::start`], but each response waits on the returned gate.
    pub async fn start_gated(routes: &[(&str, u16, &str)]) -> (Self, Gate) {
        let gate = Gate::default();
        let behaviour = Behaviour {
            gate: Some(gate.clone()),
            ..Behaviour::default()
        };
        (Self::serve(routes, behaviour).await, gate)
    }

    /// Like [`FixtureServer::start`], but every response closes the connection
    /// before the advertised body length has been sent.
    pub async fn start_truncated(routes: &[(&str, u16, &str)]) -> Self {
        let behaviour = Behaviour {
            truncate: true,
            ..Behaviour::default()
        };
        Self::serve(routes, behaviour).await
    }

    async fn serve(routes: &[(&str, u16, &str)], behaviour: Behaviour) -> Self {
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .iter()
                .map(|(path, status, body)| {
                    (
                        path.to_string(),
                        Route {
                            status: *status,
                            body: body.to_string(),
                        },
                    )
                })
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                let behaviour = behaviour.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, &routes, &seen, &behaviour).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}/", addr),
            requests,
        }
    }

    /// Base URL with a trailing slash, e.g. `http://127.0.0.1:4312/`.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Paths requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    seen: &Mutex<Vec<String>>,
    behaviour: &Behaviour,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    seen.lock().unwrap().push(path.clone());
    if let Some(gate) = &behaviour.gate {
        gate.hold().await;
    }

    let route = routes.get(&path).cloned().unwrap_or(Route {
        status: 404,
        body: "not found".to_string(),
    });
    let length = route.body.len() + if behaviour.truncate { 64 } else { 0 };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        if route.status < 400 { "OK" } else { "Error" },
        length,
        route.body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

/// Tracing layer that keeps every event it sees.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn named(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message == message)
            .collect()
    }

    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value = format!("{:?}", value);
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Route this thread's tracing events into a fresh [`CapturedLogs`] until the
/// guard drops. `#[tokio::test]` runs on one thread, so async code is covered.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
