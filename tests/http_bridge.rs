// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end checks over a real TCP connection: raw HTTP in, command
//! envelopes out.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use proteus::doc::fixtures::demo_document;
use proteus::server::serve;
use proteus::uithread::DocThread;

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Value,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

async fn start_server() -> (SocketAddr, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let thread = DocThread::spawn(demo_document()).expect("doc thread");
    let handle = tokio::spawn(serve(listener, thread));
    (addr, handle)
}

async fn roundtrip(addr: SocketAddr, request: String) -> Reply {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(request.as_bytes()).await.expect("write");
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read");
    let text = String::from_utf8_lossy(&raw);
    let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.lines();
    let status_line = lines.next().expect("status line");
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .expect("status code")
        .parse()
        .expect("numeric status");
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();
    let body = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body.trim()).expect("json body")
    };
    Reply {
        status,
        headers,
        body,
    }
}

async fn post(addr: SocketAddr, command: Value) -> Reply {
    let body = command.to_string();
    let request = format!(
        "POST / HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    roundtrip(addr, request).await
}

#[tokio::test]
async fn test_command_round_trips_with_cors_headers() {
    let (addr, _handle) = start_server().await;
    let reply = post(addr, json!({ "type": "test_command", "n": 1 })).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["status"], json!("success"));
    assert_eq!(reply.body["result"]["received_command"]["n"], json!(1));
    assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
    assert_eq!(reply.header("connection"), Some("close"));
}

#[tokio::test]
async fn get_context_returns_the_graph_in_execution_order() {
    let (addr, _handle) = start_server().await;
    let reply = post(addr, json!({ "type": "get_context" })).await;
    assert_eq!(reply.status, 200);
    let keys: Vec<&str> = reply.body["result"]
        .as_object()
        .expect("snapshot object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec!["slider-radius", "script-circle", "comp-area", "panel-out"]
    );
}

#[tokio::test]
async fn client_errors_map_to_400() {
    let (addr, _handle) = start_server().await;
    let reply = post(addr, json!({ "instance_guid": "x" })).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["status"], json!("error"));

    let reply = post(addr, json!({ "type": "get_object" })).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["result"], json!("No instance GUID(s) provided."));
}

#[tokio::test]
async fn unknown_commands_map_to_500() {
    let (addr, _handle) = start_server().await;
    let reply = post(addr, json!({ "type": "mystery" })).await;
    assert_eq!(reply.status, 500);
    assert_eq!(
        reply.body["result"],
        json!("Unknown command type received: mystery")
    );
}

#[tokio::test]
async fn preflight_advertises_methods_and_headers() {
    let (addr, _handle) = start_server().await;
    let request = format!(
        "OPTIONS / HTTP/1.1\r\nHost: {addr}\r\nOrigin: http://localhost\r\nAccess-Control-Request-Method: POST\r\nConnection: close\r\n\r\n"
    );
    let reply = roundtrip(addr, request).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        reply.header("access-control-allow-methods"),
        Some("POST, OPTIONS, GET")
    );
    assert_eq!(
        reply.header("access-control-allow-headers"),
        Some("Content-Type")
    );
}

#[tokio::test]
async fn mutations_persist_across_requests() {
    let (addr, _handle) = start_server().await;
    let reply = post(
        addr,
        json!({
            "type": "update_script",
            "instance_guid": "script-circle",
            "code": "output = x + 1"
        }),
    )
    .await;
    assert_eq!(reply.status, 200);

    let reply = post(
        addr,
        json!({ "type": "get_object", "instance_guid": "script-circle" }),
    )
    .await;
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body["result"]["script-circle"]["Code"],
        json!("output = x + 1")
    );
}

#[tokio::test]
async fn stop_acknowledges_then_shuts_the_server_down() {
    let (addr, handle) = start_server().await;
    let reply = post(addr, json!({ "type": "stop" })).await;
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body["result"],
        json!("Stop signal received. Server shutting down.")
    );

    let served = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server must exit after stop")
        .expect("join");
    served.expect("clean shutdown");
}
