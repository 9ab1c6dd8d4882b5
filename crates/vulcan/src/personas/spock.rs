use anyhow::Result;
use indoc::indoc;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

use crate::agent::Agent;
use crate::chat::ChatSession;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;

pub const CHAT_INSTRUCTIONS: &str = indoc! {"
    You are an expert of the StarTrek universe.
    Your name is Spock.
    Make only short answers. Speak like a Vulcan"};

pub const KIRK_CONTEXT: &str = indoc! {"
    James Tiberius Kirk is a fictional character in the Star Trek media franchise.
    Kirk was first played by William Shatner as the captain of the USS Enterprise in the Star Trek: The Original Series.

    The best friends of James T. Kirk are:
    - Spock: The Vulcan science officer of the USS Enterprise.
    - Leonard McCoy: The ship's chief medical officer.

    Here are some of main adversaries/enemies of James T. Kirk:
    - Klingons: The warrior race was often at odds with the Federation and Kirk personally.
    - Khan Noonien Singh: A genetically engineered superhuman and Kirk's most famous nemesis.
    - Romulans: Another major alien race often in conflict with the Federation.
"};

pub const AGENT_NAME: &str = "spock_agent";

pub const AGENT_DESCRIPTION: &str = indoc! {"
    Spock agent that can say hello to someone or greet them with a Vulcan salute.
    It can also answer questions about the Star Trek universe.
"};

pub const AGENT_INSTRUCTIONS: &str = indoc! {"
    You are Spock, a Vulcan science officer.
    You are logical and precise in your responses.
    Use the tools provided to interact with users.
    You can say hello to someone or greet them with a Vulcan salute.
    You can also answer questions about the Star Trek universe.
"};

#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
}

pub fn say_hello(name: &str) -> String {
    format!("Hello, {}! 👋", name)
}

pub fn vulcan_salute(name: &str) -> String {
    format!("Live long and prosper, {}! 🖖", name)
}

fn name_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "Who to greet"}
        },
        "required": ["name"]
    })
}

/// The Star Trek expert chat, primed with the Kirk briefing
pub fn spock_chat(provider: Box<dyn Provider>) -> ChatSession {
    ChatSession::new(provider)
        .with_instruction(CHAT_INSTRUCTIONS)
        .with_context(KIRK_CONTEXT)
}

/// Spock as an agent with the `say_hello` and `vulcan_salute` tools
pub fn spock_agent(provider: Box<dyn Provider>) -> Result<Agent> {
    let registry = ToolRegistry::new()
        .with_tool(
            Tool::new("say_hello", "A tool that says hello to someone.", name_schema()),
            |args: GreetArgs| Ok::<_, Infallible>(say_hello(&args.name)),
        )?
        .with_tool(
            Tool::new(
                "vulcan_salute",
                "A tool that greets someone with a Vulcan salute.",
                name_schema(),
            ),
            |args: GreetArgs| Ok::<_, Infallible>(vulcan_salute(&args.name)),
        )?;

    Ok(Agent::new(AGENT_NAME, provider)
        .with_description(AGENT_DESCRIPTION)
        .with_instruction(AGENT_INSTRUCTIONS)
        .with_tools(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use crate::models::tool::ToolCall;
    use crate::providers::mock::MockProvider;

    #[test]
    fn test_greetings() {
        assert_eq!(say_hello("Bob"), "Hello, Bob! 👋");
        assert_eq!(vulcan_salute("Jim"), "Live long and prosper, Jim! 🖖");
    }

    #[test]
    fn test_spock_chat_messages() {
        let chat = spock_chat(Box::new(MockProvider::new(vec![])));
        let messages = chat.request_messages("Who is Khan?");
        assert_eq!(messages.len(), 3);
        assert!(messages[0].text().ends_with("Speak like a Vulcan"));
        assert!(messages[1].text().contains("Leonard McCoy"));
    }

    #[tokio::test]
    async fn test_spock_agent_salutes() -> Result<()> {
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "call_1",
                Ok(ToolCall::new("vulcan_salute", json!({"name": "Bob"}))),
            ),
            Message::assistant().with_text("Live long and prosper, Bob! 🖖"),
        ]);
        let agent = spock_agent(Box::new(provider.clone()))?;

        let names: Vec<String> = agent.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["say_hello", "vulcan_salute"]);

        let answer = agent.handle("Greet Bob the Vulcan way").await?;
        assert_eq!(answer, "Live long and prosper, Bob! 🖖");

        let tool_message = &provider.requests()[1][3];
        let response = tool_message.content[0].as_tool_response().unwrap();
        assert_eq!(response.tool_result, json!("Live long and prosper, Bob! 🖖"));
        Ok(())
    }
}
