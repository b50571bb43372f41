//! Fakes shared by the unit tests of this crate

use crate::probes::{Probe, ProbeFactory};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use waitready_core::{PollPolicy, ProbeOutcome, Target};

/// Serve `HTTP/1.1 <status_line>` to every connection; returns port and hit count
pub async fn spawn_http_server(status_line: &str) -> (u16, Arc<AtomicU32>) {
    spawn_http_server_with(status_line, &[]).await
}

pub async fn spawn_http_server_with(
    status_line: &str,
    headers: &[(&str, &str)],
) -> (u16, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicU32::new(0));

    let mut response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n", status_line);
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");

    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (port, hits)
}

/// Accept connections but never answer
pub async fn spawn_silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    port
}

/// Replays a fixed script of outcomes; the last one repeats forever
pub struct ScriptedProbe {
    script: Vec<ProbeOutcome>,
    calls: Arc<AtomicU32>,
}

impl ScriptedProbe {
    pub fn new(script: Vec<ProbeOutcome>) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn always(outcome: ProbeOutcome) -> Self {
        Self::new(vec![outcome])
    }

    pub fn calls(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn check(&self) -> ProbeOutcome {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        self.script[n.min(self.script.len() - 1)]
    }
}

/// Hands out an always-ready or never-ready probe per target name
#[derive(Default)]
pub struct ScriptedFactory {
    ready: HashMap<String, bool>,
    calls: HashMap<String, Arc<AtomicU32>>,
}

impl ScriptedFactory {
    pub fn with(mut self, name: &str, ready: bool) -> Self {
        self.ready.insert(name.to_string(), ready);
        self.calls
            .insert(name.to_string(), Arc::new(AtomicU32::new(0)));
        self
    }

    pub fn calls(&self, name: &str) -> u32 {
        self.calls[name].load(Ordering::SeqCst)
    }
}

struct CountingProbe {
    ready: bool,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl Probe for CountingProbe {
    async fn check(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.ready {
            ProbeOutcome::from_http_status(200)
        } else {
            ProbeOutcome::from_http_status(500)
        }
    }
}

impl ProbeFactory for ScriptedFactory {
    fn build(&self, target: &Target, _policy: &PollPolicy) -> Result<Box<dyn Probe>> {
        Ok(Box::new(CountingProbe {
            ready: self.ready[target.name()],
            calls: self.calls[target.name()].clone(),
        }))
    }
}
