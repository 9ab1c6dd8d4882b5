use anyhow::Result;
use futures::TryStreamExt;
use std::io::{self, Write};

use vulcan::chat::{ChatResponse, ChatSession};
use vulcan::providers::factory::ProviderType;

use crate::config::build_provider;
use crate::ProviderArgs;

/// One question, no persona: print the answer and exit
pub async fn run_ask(args: &ProviderArgs, prompt: &str, stream: bool) -> Result<()> {
    let provider = build_provider(args, ProviderType::OpenAi)?;
    let chat = ChatSession::new(provider).with_streaming(stream);

    match chat.send(prompt).await? {
        ChatResponse::Complete(answer) => println!("{}", answer),
        ChatResponse::Streaming(mut fragments) => {
            let mut stdout = io::stdout();
            while let Some(fragment) = fragments.try_next().await? {
                write!(stdout, "{}", fragment)?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
    }

    Ok(())
}
