use anyhow::Result;
use console::style;

use vulcan::personas::spock_chat;
use vulcan::providers::factory::ProviderType;

use crate::config::build_provider;
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::{Responder, Session};
use crate::ProviderArgs;

pub async fn run_chat(args: &ProviderArgs, streaming: bool) -> Result<()> {
    let provider = build_provider(args, ProviderType::Ollama)?;
    let chat = spock_chat(provider).with_streaming(streaming);

    let banner = format!(
        "Spock is listening {}",
        style("- type 'bye' to end the session, /help for commands").dim()
    );
    let mut session =
        Session::new(Responder::Chat(chat), Box::new(RustylinePrompt::new()?)).with_banner(banner);
    session.start().await
}
