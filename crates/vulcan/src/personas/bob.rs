use anyhow::{anyhow, Result};
use indoc::indoc;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::agent::Agent;
use crate::models::tool::Tool;
use crate::pizza::PizzaOrder;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;

pub const AGENT_NAME: &str = "bob_agent";

pub const AGENT_DESCRIPTION: &str = "Bob agent is a pizza expert.";

pub const AGENT_INSTRUCTIONS: &str = indoc! {"
    You are Bob, a pizza expert.
    Use the tools provided to interact with users.
    You can search for ingredients by name and add them to the pizza being ordered.
"};

#[derive(Debug, Deserialize)]
struct SearchArgs {
    name: String,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct AddArgs {
    ingredient_name: String,
    #[serde(default = "default_quantity")]
    quantity: f64,
}

/// Bob, with catalog search and order tools bound to `order`
pub fn bob_agent(provider: Box<dyn Provider>, order: Arc<Mutex<PizzaOrder>>) -> Result<Agent> {
    let catalog = Arc::clone(
        order
            .lock()
            .map_err(|_| anyhow!("pizza order lock poisoned"))?
            .catalog(),
    );
    let registry = ToolRegistry::new()
        .with_tool(
            Tool::new(
                "search_ingredient_by_name",
                "Search for an ingredient by exact name match. Returns the price if found, null if not found.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Ingredient name, e.g. mozzarella_cheese"}
                    },
                    "required": ["name"]
                }),
            ),
            move |args: SearchArgs| {
                Ok::<_, String>(catalog.search_ingredient_by_name(&args.name))
            },
        )?
        .with_tool(
            Tool::new(
                "add_ingredient",
                "Add an ingredient to the pizza. Returns `added` (false if the ingredient is not found) and a `message` describing the change.",
                json!({
                    "type": "object",
                    "properties": {
                        "ingredient_name": {"type": "string", "description": "Name of the ingredient"},
                        "quantity": {"type": "number", "description": "Quantity to add (default: 1.0)"}
                    },
                    "required": ["ingredient_name"]
                }),
            ),
            move |args: AddArgs| {
                let mut order = order
                    .lock()
                    .map_err(|_| "pizza order lock poisoned".to_string())?;
                Ok::<_, String>(
                    order.add_ingredient_with_report(&args.ingredient_name, args.quantity),
                )
            },
        )?;

    Ok(Agent::new(AGENT_NAME, provider)
        .with_description(AGENT_DESCRIPTION)
        .with_instruction(AGENT_INSTRUCTIONS)
        .with_tools(registry))
}
