use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Computing the odds",
    "Consulting the ship's computer",
    "Raising an eyebrow",
    "Calibrating the deflector array",
    "Running a logic analysis",
    "Scanning for life signs",
    "Reviewing Starfleet regulations",
    "Recalibrating the tricorder",
    "Contemplating the needs of the many",
    "Checking the pantry",
    "Kneading the dough",
    "Grating the mozzarella",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Thinking")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_comes_from_the_list() {
        let message = get_random_thinking_message();
        assert!(THINKING_MESSAGES.contains(&message));
    }
}
