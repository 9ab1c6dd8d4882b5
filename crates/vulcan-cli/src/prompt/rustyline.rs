use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use vulcan::models::message::{Message, MessageContent, ToolRequest, ToolResponse};

use super::{thinking::get_random_thinking_message, Input, Prompt, Theme};

const PROMPT: &str = "🤖 (type 'bye' to exit):> ";
const MAX_STRING_LENGTH: usize = 40;
const INDENT: &str = "    ";

pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: spinner(),
            theme: Theme::Dark,
        })
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();

    if printed.is_err() {
        println!("{}", content);
    }
}

fn print_tool_request(tool_request: &ToolRequest, theme: &str) {
    match &tool_request.tool_call {
        Ok(call) => {
            print_newline();
            println!(
                "─── {} | {} ──────────────────────────",
                style(&call.name),
                style("tool").magenta().dim(),
            );
            print_params(&call.arguments, 0);
            print_newline();
        }
        Err(e) => print_markdown(&e.to_string(), theme),
    }
}

fn print_tool_response(tool_response: &ToolResponse, theme: &str) {
    match &tool_response.tool_result {
        Value::String(text) => print_markdown(text, theme),
        other => print_params(other, 0),
    }
}

/// Format and print parameters recursively with proper indentation and colors
fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    Value::Array(arr) => {
                        println!("{}{}:", indent, style(key).dim());
                        for item in arr.iter() {
                            println!("{}{}- ", indent, INDENT);
                            print_params(item, depth + 2);
                        }
                    }
                    Value::String(s) => {
                        if s.len() > MAX_STRING_LENGTH {
                            println!("{}{}: {}", indent, style(key).dim(), style("...").dim());
                        } else {
                            println!("{}{}: {}", indent, style(key).dim(), style(s).green());
                        }
                    }
                    Value::Number(n) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(n).blue());
                    }
                    Value::Bool(b) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(b).blue());
                    }
                    Value::Null => {
                        println!("{}{}: {}", indent, style(key).dim(), style("null").dim());
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}.", indent, i + 1);
                print_params(item, depth + 1);
            }
        }
        Value::String(s) => println!("{}{}", indent, style(s).green()),
        Value::Number(n) => println!("{}{}", indent, style(n).yellow()),
        Value::Bool(b) => println!("{}{}", indent, style(b).yellow()),
        Value::Null => println!("{}{}", indent, style("null").dim()),
    }
}

fn print_newline() {
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("bye - Exit the session");
    println!("/t - Toggle Light/Dark theme");
    println!("/? | /help - Display this help message");
    println!("Ctrl+C - Interrupt the answer in progress");
    println!("Ctrl+D - Exit the session");
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = self.theme_name();

        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => {
                    if !text.text.trim().is_empty() {
                        print_markdown(&text.text, theme)
                    }
                }
                MessageContent::ToolRequest(tool_request) => print_tool_request(tool_request, theme),
                MessageContent::ToolResponse(tool_response) => {
                    print_tool_response(tool_response, theme)
                }
            }
        }

        print_newline();
        let _ = io::stdout().flush();
    }

    fn render_fragment(&mut self, fragment: &str) {
        print!("{}", fragment);
        let _ = io::stdout().flush();
    }

    fn end_fragments(&mut self) {
        println!("\n");
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner
            .start(format!("{}...", get_random_thinking_message()));
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text = match self.editor.readline(PROMPT) {
            Ok(text) => text,
            Err(ReadlineError::Interrupted) => return Ok(Input::ask_again()),
            Err(ReadlineError::Eof) => return Ok(Input::exit()),
            Err(e) => return Err(e.into()),
        };
        let message_text = message_text.trim().to_string();
        if message_text.is_empty() {
            return Ok(Input::ask_again());
        }
        let _ = self.editor.add_history_entry(message_text.as_str());

        if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            Ok(Input::ask_again())
        } else if message_text.eq_ignore_ascii_case("/?")
            || message_text.eq_ignore_ascii_case("/help")
        {
            print_help();
            Ok(Input::ask_again())
        } else {
            Ok(Input::message(message_text))
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
