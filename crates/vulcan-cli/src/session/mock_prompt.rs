use anyhow::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vulcan::models::message::Message;

use crate::prompt::{Input, Prompt};

#[derive(Default)]
struct Recorded {
    inputs: VecDeque<Input>,
    rendered: Vec<String>,
    streamed: String,
    farewells: usize,
}

/// What a [`MockPrompt`] was asked to show, readable after the prompt moved into a session
#[derive(Clone, Default)]
pub struct Output {
    recorded: Arc<Mutex<Recorded>>,
}

impl Output {
    pub fn rendered(&self) -> Vec<String> {
        self.recorded.lock().unwrap().rendered.clone()
    }

    pub fn streamed(&self) -> String {
        self.recorded.lock().unwrap().streamed.clone()
    }

    pub fn farewells(&self) -> usize {
        self.recorded.lock().unwrap().farewells
    }

    pub fn remaining_inputs(&self) -> usize {
        self.recorded.lock().unwrap().inputs.len()
    }
}

/// A prompt that replays scripted input lines and records everything it renders.
/// Running out of input behaves like end of file.
pub struct MockPrompt {
    output: Output,
}

impl MockPrompt {
    pub fn new(lines: Vec<&str>) -> Self {
        Self::with_inputs(lines.into_iter().map(Input::message).collect())
    }

    pub fn with_inputs(inputs: Vec<Input>) -> Self {
        let output = Output::default();
        output.recorded.lock().unwrap().inputs = inputs.into();
        Self { output }
    }

    pub fn output(&self) -> Output {
        self.output.clone()
    }
}

impl Prompt for MockPrompt {
    fn render(&mut self, message: Box<Message>) {
        let text = message.text();
        if !text.is_empty() {
            self.output.recorded.lock().unwrap().rendered.push(text);
        }
    }

    fn render_fragment(&mut self, fragment: &str) {
        self.output.recorded.lock().unwrap().streamed.push_str(fragment);
    }

    fn end_fragments(&mut self) {}

    fn get_input(&mut self) -> Result<Input> {
        let next = self.output.recorded.lock().unwrap().inputs.pop_front();
        Ok(next.unwrap_or_else(Input::exit))
    }

    fn show_busy(&mut self) {}

    fn hide_busy(&self) {}

    fn close(&self) {}

    fn greet(&self, _banner: &str) {}

    fn farewell(&self) {
        self.output.recorded.lock().unwrap().farewells += 1;
    }
}
