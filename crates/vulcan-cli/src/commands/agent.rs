use anyhow::Result;
use console::style;
use std::sync::{Arc, Mutex};

use vulcan::pizza::{Catalog, PizzaOrder};
use vulcan::personas::{bob_agent, spock_agent};
use vulcan::providers::factory::ProviderType;

use crate::config::build_provider;
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::{Responder, Session};
use crate::ProviderArgs;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentPersona {
    /// Spock, who says hello or gives the Vulcan salute
    Spock,
    /// Bob, the pizza expert who builds your order
    Bob,
}

pub async fn run_agent(args: &ProviderArgs, persona: AgentPersona) -> Result<()> {
    let provider = build_provider(args, ProviderType::OpenAi)?;
    let prompt = Box::new(RustylinePrompt::new()?);

    match persona {
        AgentPersona::Spock => {
            let agent = spock_agent(provider)?;
            let mut session = Session::new(Responder::Agent(agent), prompt)
                .with_banner(banner("Spock agent is ready"));
            session.start().await
        }
        AgentPersona::Bob => {
            let order = Arc::new(Mutex::new(PizzaOrder::new(Arc::new(Catalog::pizza()))));
            let agent = bob_agent(provider, Arc::clone(&order))?;
            let mut session = Session::new(Responder::Agent(agent), prompt)
                .with_banner(banner("Bob is ready to build your pizza"));
            session.start().await?;

            let order = order
                .lock()
                .map_err(|_| anyhow::anyhow!("pizza order lock poisoned"))?;
            print_order(&order);
            Ok(())
        }
    }
}

fn banner(title: &str) -> String {
    format!(
        "{} {}",
        title,
        style("- type 'bye' to end the session, /help for commands").dim()
    )
}

fn print_order(order: &PizzaOrder) {
    if order.is_empty() {
        return;
    }

    println!("{}", style("Your pizza:").bold());
    for (name, line) in order.lines() {
        println!(
            "  {} x {} @ {:.2} = {:.2}",
            line.quantity, name, line.unit_price, line.total_price
        );
    }
    println!("{}", style(format!("Total: {:.2}", order.total())).bold());
}
