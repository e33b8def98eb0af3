use crate::model::link::CurriculumSubjectLink;

use anyhow::Context;
use reqwest::blocking::Client;
use serde_json::{json, Value};

use std::time::Duration;

pub trait HttpTransport {
    /// POSTs to `path` (relative to the server root) and returns the status code.
    fn post(&self, path: &str, body: Option<&Value>) -> anyhow::Result<u16>;
}

pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl Confirmation for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Receives the "server state changed, re-read it" signal.
pub trait RefreshListener {
    fn refresh(&mut self);
}

impl<F: FnMut()> RefreshListener for F {
    fn refresh(&mut self) {
        self()
    }
}

pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        // reqwest's blocking client defaults to 30s; no timeout unless asked for.
        builder = match timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder.timeout(None),
        };

        let client = builder.build().context("failed to build http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(&self, path: &str, body: Option<&Value>) -> anyhow::Result<u16> {
        let url = format!("{}{}", self.base_url, path);

        let req = self.client.post(&url);
        let req = match body {
            Some(b) => req.json(b),
            None => req,
        };

        let resp = req.send().with_context(|| format!("POST {url} failed"))?;
        Ok(resp.status().as_u16())
    }
}

fn is_ok_status(status: u16) -> bool {
    (200..300).contains(&status)
}

pub struct CurriculumMutator<'a, T: HttpTransport> {
    transport: &'a T,
    confirm_prompt: &'a str,
}

impl<'a, T: HttpTransport> CurriculumMutator<'a, T> {
    pub fn new(transport: &'a T, confirm_prompt: &'a str) -> Self {
        Self {
            transport,
            confirm_prompt,
        }
    }

    pub fn add_subject(
        &self,
        curriculum_id: u64,
        subject_id: u64,
        listener: &mut dyn RefreshListener,
    ) {
        let link = CurriculumSubjectLink::new(curriculum_id, subject_id);
        let body = json!({ "subject_id": link.subject_id });

        self.send(&link.add_path(), Some(&body), listener);
    }

    pub fn remove_subject(
        &self,
        curriculum_id: u64,
        subject_id: u64,
        confirmation: &dyn Confirmation,
        listener: &mut dyn RefreshListener,
    ) {
        if !confirmation.confirm(self.confirm_prompt) {
            return;
        }

        let link = CurriculumSubjectLink::new(curriculum_id, subject_id);
        self.send(&link.remove_path(), None, listener);
    }

    fn send(&self, path: &str, body: Option<&Value>, listener: &mut dyn RefreshListener) {
        match self.transport.post(path, body) {
            Ok(status) if is_ok_status(status) => listener.refresh(),
            // Error bodies are not inspected; a non-ok answer is a silent no-op.
            Ok(status) => eprintln!("[curriculum] POST {path} returned HTTP {status}"),
            Err(e) => eprintln!("[curriculum] POST {path}: {e:#}"),
        }
    }
}
