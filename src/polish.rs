use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use eframe::egui;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::PolishError;

pub const SYSTEM_INSTRUCTION: &str =
    "You are an assistant for a whimsical diary app. Use emojis and soft, friendly language.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn build_prompt(content: &str) -> String {
    format!(
        "Please make the following journal entry text more beautiful and poetic, while keeping the tone \"cute\" and \"whimsical\":\n\n{content}"
    )
}

/// Anything that can turn a prompt into rewritten text.
pub trait TextGenerator: Send {
    fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String, PolishError>;
}

/// The page a polish was requested for, captured when the request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishRequest {
    pub notebook_id: String,
    pub page_id: String,
    pub content: String,
}

#[derive(Debug)]
pub struct PolishOutcome {
    pub request: PolishRequest,
    pub result: Result<String, PolishError>,
}

pub struct GeminiGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(config: &AiConfig) -> Result<Self, PolishError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String, PolishError> {
        let api_key = self.api_key.as_deref().ok_or(PolishError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest::new(system_instruction, prompt);

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(PolishError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|err| PolishError::Parse(err.to_string()))?;
        extract_text(parsed)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

impl GenerateContentRequest {
    fn new(system_instruction: &str, prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        }
    }
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, PolishError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PolishError::EmptyResponse);
    }
    Ok(text)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{status}: {msg}"),
                _ => msg,
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

/// Runs polish requests off the UI thread, one at a time.
pub struct PolishWorker {
    request_tx: Sender<PolishRequest>,
    outcome_rx: Receiver<PolishOutcome>,
}

impl PolishWorker {
    pub fn spawn(ctx: egui::Context, generator: Box<dyn TextGenerator>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<PolishRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<PolishOutcome>();
        std::thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                tracing::debug!(page_id = %request.page_id, "sending polish request");
                let prompt = build_prompt(&request.content);
                let result = generator.generate(SYSTEM_INSTRUCTION, &prompt);
                if outcome_tx.send(PolishOutcome { request, result }).is_err() {
                    break;
                }
                ctx.request_repaint();
            }
        });

        Self {
            request_tx,
            outcome_rx,
        }
    }

    pub fn submit(&self, request: PolishRequest) -> Result<(), PolishError> {
        self.request_tx
            .send(request)
            .map_err(|_| PolishError::WorkerGone)
    }

    /// `Err(WorkerGone)` once the worker thread has exited, e.g. after a panic.
    pub fn try_recv(&self) -> Result<Option<PolishOutcome>, PolishError> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PolishError::WorkerGone),
        }
    }
}
