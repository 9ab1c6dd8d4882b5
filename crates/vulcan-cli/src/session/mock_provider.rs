use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vulcan::models::message::Message;
use vulcan::models::tool::Tool;
use vulcan::providers::base::{Provider, Usage};
use vulcan::providers::streaming::FragmentStream;

/// Replays canned assistant messages. The library's own mock provider is only compiled
/// for its unit tests, so the session tests carry this one.
#[derive(Clone)]
pub struct ScriptedProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(answers: Vec<&str>) -> Self {
        Self::with_messages(
            answers
                .into_iter()
                .map(|answer| Message::assistant().with_text(answer))
                .collect(),
        )
    }

    pub fn with_messages(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many requests reached the provider
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Message {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Message::assistant().with_text("")
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, _messages: &[Message], _tools: &[Tool]) -> Result<(Message, Usage)> {
        Ok((self.next_response(), Usage::default()))
    }

    async fn stream(&self, _messages: &[Message]) -> Result<FragmentStream> {
        let text = self.next_response().text();
        let fragments: Vec<Result<String>> = text
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}
