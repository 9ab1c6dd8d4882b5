//! Ingredient catalog and the running pizza order the Bob agent manipulates.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const PIZZA_INGREDIENTS: &[(&str, f64)] = &[
    // Base ingredients
    ("pizza_dough", 2.50),
    ("pizza_sauce", 1.80),
    ("tomato_sauce", 1.50),
    ("white_sauce", 2.20),
    ("pesto_sauce", 3.50),
    ("bbq_sauce", 2.00),
    // Cheeses
    ("mozzarella_cheese", 4.50),
    ("parmesan_cheese", 6.80),
    ("cheddar_cheese", 4.20),
    ("goat_cheese", 7.50),
    ("ricotta_cheese", 3.80),
    ("feta_cheese", 5.20),
    ("gorgonzola_cheese", 6.50),
    ("provolone_cheese", 5.80),
    // Meats
    ("pepperoni", 5.50),
    ("italian_sausage", 6.20),
    ("ground_beef", 7.80),
    ("ham", 6.50),
    ("bacon", 7.20),
    ("chicken_breast", 8.50),
    ("prosciutto", 12.00),
    ("salami", 6.80),
    ("chorizo", 7.50),
    ("turkey", 7.00),
    // Vegetables
    ("mushrooms", 3.20),
    ("bell_peppers", 2.80),
    ("red_onions", 1.50),
    ("black_olives", 3.50),
    ("green_olives", 3.80),
    ("tomatoes", 2.50),
    ("cherry_tomatoes", 3.80),
    ("spinach", 2.20),
    ("arugula", 4.50),
    ("basil", 3.50),
    ("oregano", 2.80),
    ("garlic", 1.20),
    ("red_pepper_flakes", 2.50),
    ("jalapenos", 2.80),
    ("pineapple", 3.20),
    ("artichokes", 4.80),
    ("sun_dried_tomatoes", 5.50),
    ("roasted_peppers", 4.20),
    ("capers", 6.20),
    ("corn", 2.50),
    ("broccoli", 3.00),
    ("zucchini", 2.80),
    ("eggplant", 3.50),
    // Specialty items
    ("anchovies", 5.80),
    ("pine_nuts", 8.50),
    ("fresh_mozzarella", 6.80),
    ("buffalo_mozzarella", 9.50),
    ("truffle_oil", 15.00),
    ("balsamic_glaze", 4.50),
    ("olive_oil", 3.80),
    ("eggs", 2.50),
    ("avocado", 4.20),
    ("cilantro", 2.80),
    ("lime", 1.50),
    ("lemon", 1.80),
    ("thyme", 3.20),
    ("rosemary", 3.50),
    ("sage", 4.00),
];

/// Ingredient names are matched case-insensitively, ignoring surrounding whitespace
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only mapping from ingredient name to unit price
#[derive(Debug, Clone)]
pub struct Catalog {
    prices: HashMap<String, f64>,
}

impl Catalog {
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            prices: prices
                .into_iter()
                .map(|(name, price)| (normalize_name(name.as_ref()), price))
                .collect(),
        }
    }

    /// The fixed pizza ingredient catalog
    pub fn pizza() -> Self {
        Self::new(PIZZA_INGREDIENTS.iter().copied())
    }

    /// Price of an ingredient, or `None` when the catalog does not carry it
    pub fn search_ingredient_by_name(&self, name: &str) -> Option<f64> {
        self.prices.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' not found in ingredients list")]
    UnknownIngredient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderLine {
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// What an accepted `add_ingredient` call did to the order
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added {
        name: String,
        quantity: f64,
    },
    Increased {
        name: String,
        added: f64,
        old_quantity: f64,
        new_quantity: f64,
    },
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Added { name, quantity } => write!(f, "Added {:?} {}", quantity, name),
            AddOutcome::Increased {
                name,
                added,
                new_quantity,
                ..
            } => write!(f, "Added {:?} more {} (total: {:?})", added, name, new_quantity),
        }
    }
}

/// Result of an `add_ingredient` call together with the line it reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddReport {
    pub added: bool,
    pub message: String,
}

/// A pizza under construction: ingredient name to accumulated quantity and price
#[derive(Debug, Clone)]
pub struct PizzaOrder {
    catalog: Arc<Catalog>,
    lines: BTreeMap<String, OrderLine>,
}

impl PizzaOrder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            lines: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Add `quantity` of an ingredient, accumulating onto an existing line
    pub fn try_add_ingredient(
        &mut self,
        name: &str,
        quantity: f64,
    ) -> Result<AddOutcome, ValidationError> {
        let name = normalize_name(name);
        let unit_price = self
            .catalog
            .search_ingredient_by_name(&name)
            .ok_or_else(|| ValidationError::UnknownIngredient(name.clone()))?;

        let outcome = match self.lines.get_mut(&name) {
            Some(line) => {
                let old_quantity = line.quantity;
                let new_quantity = old_quantity + quantity;
                *line = OrderLine {
                    quantity: new_quantity,
                    unit_price,
                    total_price: unit_price * new_quantity,
                };
                AddOutcome::Increased {
                    name,
                    added: quantity,
                    old_quantity,
                    new_quantity,
                }
            }
            None => {
                self.lines.insert(
                    name.clone(),
                    OrderLine {
                        quantity,
                        unit_price,
                        total_price: unit_price * quantity,
                    },
                );
                AddOutcome::Added { name, quantity }
            }
        };

        Ok(outcome)
    }

    /// Add an ingredient, failing soft: unknown ingredients are reported and yield `false`
    pub fn add_ingredient(&mut self, name: &str, quantity: f64) -> bool {
        self.add_ingredient_with_report(name, quantity).added
    }

    /// Same as [`PizzaOrder::add_ingredient`], also returning the line describing the change
    pub fn add_ingredient_with_report(&mut self, name: &str, quantity: f64) -> AddReport {
        match self.try_add_ingredient(name, quantity) {
            Ok(outcome) => {
                info!("{}", outcome);
                AddReport {
                    added: true,
                    message: outcome.to_string(),
                }
            }
            Err(e) => {
                warn!("Error: {}", e);
                AddReport {
                    added: false,
                    message: format!("Error: {}", e),
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&OrderLine> {
        self.lines.get(&normalize_name(name))
    }

    pub fn lines(&self) -> &BTreeMap<String, OrderLine> {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.lines.values().map(|line| line.total_price).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
