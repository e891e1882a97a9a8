#![allow(dead_code)]

use async_trait::async_trait;
use pulse_client::{
    ApiClient, ClientConfig, Jitter, MemoryLogger, RawResponse, RecordingSleeper,
    RequestDescriptor, RetryExecutor, Transport, TransportError,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted transport outcome.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(RawResponse),
    Fail(&'static str),
    /// Never completes; only a deadline ends the attempt.
    Hang,
}

/// In-memory transport replaying a script. The final step repeats once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self { steps: Mutex::new(steps.into()), seen: Mutex::new(Vec::new()) })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new(vec![step])
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(Step::Fail("script is empty"))
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        match self.next_step() {
            Step::Respond(response) => Ok(response),
            Step::Fail(cause) => Err(TransportError::new(cause)),
            Step::Hang => std::future::pending().await,
        }
    }
}

pub fn status(code: u16) -> Step {
    Step::Respond(RawResponse::new(code))
}

pub fn json(code: u16, body: Value) -> Step {
    Step::Respond(RawResponse::new(code).with_body(body.to_string()))
}

/// Executor with recorded waits, captured logs, and no jitter.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub executor: RetryExecutor,
    pub sleeper: RecordingSleeper,
    pub logger: Arc<MemoryLogger>,
}

pub fn harness(steps: Vec<Step>) -> Harness {
    let transport = ScriptedTransport::new(steps);
    let sleeper = RecordingSleeper::new();
    let logger = Arc::new(MemoryLogger::new());
    let executor = RetryExecutor::new(transport.clone())
        .with_sleeper(sleeper.clone())
        .with_logger(logger.clone())
        .with_jitter(Jitter::None);
    Harness { transport, executor, sleeper, logger }
}

pub fn client(steps: Vec<Step>) -> (ApiClient, Harness) {
    let h = harness(steps);
    let client = ApiClient::with_executor(ClientConfig::new("http://backend"), h.executor.clone());
    (client, h)
}
