//! Shared utilities for integration tests.

use std::net::SocketAddr;

use greeting_cors::config::ServiceConfig;
use greeting_cors::greeting::GreetingService;
use greeting_cors::http::HttpServer;
use greeting_cors::lifecycle::Shutdown;
use tokio::net::TcpListener;

pub const LOCAL_ORIGIN: &str = "http://localhost:9000";

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub greetings: GreetingService,
    pub shutdown: Shutdown,
    handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Start a server for `config` on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(config: ServiceConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let greetings = server.greetings().clone();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, receiver).await });

    TestServer {
        addr,
        greetings,
        shutdown,
        handle,
    }
}

/// Client that never pools connections, so every request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
