// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Scripted HTTP/1.1 responder standing in for the GitHub REST API.
//!
//! Each scripted response answers exactly one connection, closed after the
//! reply, and every request is recorded for later assertions.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

use octocrab::Octocrab;

use crate::github::build_client;

/// Canned reply for one request.
pub(crate) struct StubResponse
{
    status:  u16,
    headers: Vec<(String, String,),>,
    body:    String,
}

impl StubResponse
{
    pub(crate) fn json(status: u16, body: impl Into<String,>,) -> Self
    {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub(crate) fn with_header(mut self, name: &str, value: impl Into<String,>,) -> Self
    {
        self.headers.push((name.to_owned(), value.into(),),);
        self
    }
}

/// Request as seen by the stub.
#[derive(Debug, Clone,)]
pub(crate) struct RecordedRequest
{
    pub method:        String,
    pub target:        String,
    pub authorization: Option<String,>,
    pub body:          String,
}

pub(crate) struct ApiStub
{
    listener: TcpListener,
    base_url: String,
}

impl ApiStub
{
    pub(crate) fn bind() -> Self
    {
        let listener = TcpListener::bind("127.0.0.1:0",).expect("bind local listener",);
        let address = listener.local_addr().expect("listener address",);
        Self {
            listener,
            base_url: format!("http://{address}"),
        }
    }

    pub(crate) fn base_url(&self,) -> &str
    {
        &self.base_url
    }

    pub(crate) fn client(&self,) -> Octocrab
    {
        build_client("ghp_stub_token", Some(&self.base_url,),).expect("client for stub",)
    }

    /// Answers one connection per response, in order, and returns the
    /// recorded requests once the script is exhausted.
    pub(crate) fn serve(self, script: Vec<StubResponse,>,) -> JoinHandle<Vec<RecordedRequest,>,>
    {
        thread::spawn(move || {
            script
                .into_iter()
                .map(|response| {
                    let (stream, _,) = self.listener.accept().expect("accept connection",);
                    answer(stream, &response,)
                },)
                .collect()
        },)
    }
}

fn answer(mut stream: TcpStream, response: &StubResponse,) -> RecordedRequest
{
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream",),);

    let mut request_line = String::new();
    reader.read_line(&mut request_line,).expect("request line",);
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line,).expect("header line",);
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value,),) = line.split_once(':',) {
            let value = value.trim();
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().expect("numeric length",),
                "authorization" => authorization = Some(value.to_owned(),),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body,).expect("request body",);

    let mut reply = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.body.len()
    );
    for (name, value,) in &response.headers {
        reply.push_str(&format!("{name}: {value}\r\n"),);
    }
    reply.push_str("\r\n",);
    reply.push_str(&response.body,);

    stream.write_all(reply.as_bytes(),).expect("write response",);
    stream.flush().expect("flush response",);

    RecordedRequest {
        method,
        target,
        authorization,
        body: String::from_utf8(body,).expect("utf-8 body",),
    }
}
