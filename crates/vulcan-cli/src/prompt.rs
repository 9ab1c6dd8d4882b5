use anyhow::Result;
use vulcan::models::message::Message;

pub mod rustyline;
pub mod thinking;

pub trait Prompt {
    /// Render a complete message: text as markdown, tool traffic as a summary
    fn render(&mut self, message: Box<Message>);
    /// Print one streamed fragment as-is
    fn render_fragment(&mut self, fragment: &str);
    /// Finish a streamed answer
    fn end_fragments(&mut self);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
    fn greet(&self, banner: &str) {
        println!("{}", banner);
        println!();
    }
    fn farewell(&self) {
        println!("👋 Goodbye!");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

impl Input {
    pub fn message<S: Into<String>>(content: S) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn exit() -> Self {
        Self {
            input_type: InputType::Exit,
            content: None,
        }
    }

    pub fn ask_again() -> Self {
        Self {
            input_type: InputType::AskAgain,
            content: None,
        }
    }
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
