use anyhow::Result;
use futures::StreamExt;

use crate::prompt::{InputType, Prompt};

use vulcan::agent::Agent;
use vulcan::chat::ChatSession;
use vulcan::models::message::Message;

#[cfg(test)]
mod mock_prompt;
#[cfg(test)]
mod mock_provider;

/// What answers the user's input
pub enum Responder {
    Chat(ChatSession),
    Agent(Agent),
}

/// The user typed the word that ends the conversation
pub fn is_farewell(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("bye")
}

pub struct Session<'a> {
    responder: Responder,
    prompt: Box<dyn Prompt + 'a>,
    banner: String,
}

impl<'a> Session<'a> {
    pub fn new(responder: Responder, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            responder,
            prompt,
            banner: String::new(),
        }
    }

    pub fn with_banner<S: Into<String>>(mut self, banner: S) -> Self {
        self.banner = banner.into();
        self
    }

    /// Read inputs until `bye` or end of input; each input is answered independently
    pub async fn start(&mut self) -> Result<()> {
        self.prompt.greet(&self.banner);

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        if is_farewell(content) {
                            break;
                        }
                        self.respond(content).await?;
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }

        self.prompt.farewell();
        self.prompt.close();
        Ok(())
    }

    async fn respond(&mut self, text: &str) -> Result<()> {
        let Session {
            responder, prompt, ..
        } = self;

        match responder {
            Responder::Chat(chat) if chat.is_streaming() => {
                let stream = chat.stream(text).await?;
                stream_fragments(prompt.as_mut(), stream).await
            }
            Responder::Chat(chat) => {
                prompt.show_busy();
                let answer = chat.complete(text).await;
                prompt.hide_busy();
                prompt.render(Box::new(Message::assistant().with_text(answer?)));
                Ok(())
            }
            Responder::Agent(agent) => {
                prompt.show_busy();
                let result = agent_process_message(prompt.as_mut(), agent, text).await;
                prompt.hide_busy();
                result
            }
        }
    }
}

async fn stream_fragments(
    prompt: &mut (dyn Prompt + '_),
    mut stream: vulcan::providers::streaming::FragmentStream,
) -> Result<()> {
    loop {
        tokio::select! {
            fragment = stream.next() => {
                match fragment {
                    Some(Ok(fragment)) => prompt.render_fragment(&fragment),
                    Some(Err(e)) => {
                        prompt.end_fragments();
                        return Err(e);
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                drop(stream);
                prompt.end_fragments();
                prompt.render(raw_message("Interrupt: the answer was cancelled.\n"));
                return Ok(());
            }
        }
    }
    prompt.end_fragments();
    Ok(())
}

async fn agent_process_message(
    prompt: &mut (dyn Prompt + '_),
    agent: &Agent,
    text: &str,
) -> Result<()> {
    let mut stream = agent.reply(&[Message::user().with_text(text)]).await?;
    loop {
        tokio::select! {
            response = stream.next() => {
                match response {
                    Some(Ok(message)) => {
                        prompt.hide_busy();
                        prompt.render(Box::new(message));
                        prompt.show_busy();
                    }
                    Some(Err(e)) => return Err(e),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                drop(stream);
                prompt.hide_busy();
                prompt.render(raw_message("Interrupt: the exchange was cancelled.\n"));
                prompt.show_busy();
                break;
            }
        }
    }
    Ok(())
}

fn raw_message(content: &str) -> Box<Message> {
    Box::new(Message::assistant().with_text(content))
}

#[cfg(test)]
mod tests {
    use super::mock_prompt::MockPrompt;
    use super::mock_provider::ScriptedProvider;
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use vulcan::models::tool::ToolCall;
    use vulcan::personas::{bob_agent, spock_chat};
    use vulcan::pizza::{Catalog, PizzaOrder};

    #[test]
    fn test_is_farewell() {
        for text in ["bye", "Bye", "BYE", "  bye\n"] {
            assert!(is_farewell(text), "{:?} should end the session", text);
        }
        for text in ["goodbye", "bye now", ""] {
            assert!(!is_farewell(text));
        }
    }

    #[tokio::test]
    async fn test_bye_ends_the_session_once() -> Result<()> {
        for bye in ["bye", "Bye", "BYE"] {
            let provider = ScriptedProvider::new(vec!["never asked"]);
            let prompt = MockPrompt::new(vec![bye, "still here?"]);
            let output = prompt.output();

            let mut session = Session::new(
                Responder::Chat(spock_chat(Box::new(provider.clone()))),
                Box::new(prompt),
            );
            session.start().await?;

            assert_eq!(output.farewells(), 1);
            assert_eq!(provider.calls(), 0);
            assert_eq!(output.remaining_inputs(), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_streaming_chat_prints_fragments() -> Result<()> {
        let provider = ScriptedProvider::new(vec!["Spock is Kirk's best friend."]);
        let prompt = MockPrompt::new(vec!["Who is Kirk's best friend?", "bye"]);
        let output = prompt.output();

        let mut session = Session::new(
            Responder::Chat(spock_chat(Box::new(provider.clone()))),
            Box::new(prompt),
        );
        session.start().await?;

        assert_eq!(output.streamed(), "Spock is Kirk's best friend.");
        assert_eq!(output.farewells(), 1);
        assert_eq!(provider.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_chat_renders_answer() -> Result<()> {
        let provider = ScriptedProvider::new(vec!["Fascinating."]);
        let prompt = MockPrompt::new(vec!["Thoughts?"]);
        let output = prompt.output();

        let chat = spock_chat(Box::new(provider)).with_streaming(false);
        let mut session = Session::new(Responder::Chat(chat), Box::new(prompt));
        session.start().await?;

        // End of input exits as well
        assert_eq!(output.rendered(), vec!["Fascinating."]);
        assert_eq!(output.farewells(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_agent_session_updates_order() -> Result<()> {
        let provider = ScriptedProvider::with_messages(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new(
                    "add_ingredient",
                    json!({"ingredient_name": "pepperoni", "quantity": 2}),
                )),
            ),
            Message::assistant().with_text("Two pepperoni, coming up."),
        ]);
        let order = Arc::new(Mutex::new(PizzaOrder::new(Arc::new(Catalog::pizza()))));
        let agent = bob_agent(Box::new(provider), Arc::clone(&order))?;

        let prompt = MockPrompt::new(vec!["Add two pepperoni", "bye"]);
        let output = prompt.output();
        let mut session = Session::new(Responder::Agent(agent), Box::new(prompt));
        session.start().await?;

        assert_eq!(
            output.rendered().last().map(String::as_str),
            Some("Two pepperoni, coming up.")
        );
        assert_eq!(order.lock().unwrap().get("pepperoni").unwrap().quantity, 2.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_agent_error_ends_the_session() -> Result<()> {
        let provider = ScriptedProvider::with_messages(vec![Message::assistant()
            .with_tool_request("1", Ok(ToolCall::new("warp_drive", json!({}))))]);
        let agent = bob_agent(
            Box::new(provider),
            Arc::new(Mutex::new(PizzaOrder::new(Arc::new(Catalog::pizza())))),
        )?;

        let prompt = MockPrompt::new(vec!["Engage", "bye"]);
        let output = prompt.output();
        let mut session = Session::new(Responder::Agent(agent), Box::new(prompt));

        let err = session.start().await.unwrap_err();
        assert!(err.to_string().contains("warp_drive"));
        assert_eq!(output.farewells(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_ask_again_is_skipped() -> Result<()> {
        let provider = ScriptedProvider::new(vec![]);
        let prompt = MockPrompt::with_inputs(vec![
            crate::prompt::Input::ask_again(),
            crate::prompt::Input::exit(),
        ]);
        let output = prompt.output();

        let mut session = Session::new(
            Responder::Chat(spock_chat(Box::new(provider.clone()))),
            Box::new(prompt),
        );
        session.start().await?;

        assert_eq!(provider.calls(), 0);
        assert_eq!(output.farewells(), 1);
        Ok(())
    }
}
