use anyhow::Result;

use vulcan::providers::base::Provider;
use vulcan::providers::configs::ProviderConfig;
use vulcan::providers::factory::{get_provider, ProviderType};

use crate::{CliProviderVariant, ProviderArgs};

impl From<CliProviderVariant> for ProviderType {
    fn from(variant: CliProviderVariant) -> Self {
        match variant {
            CliProviderVariant::OpenAi => ProviderType::OpenAi,
            CliProviderVariant::Ollama => ProviderType::Ollama,
        }
    }
}

/// Layer command line overrides on top of the configuration read from the environment
fn apply_overrides(config: &mut ProviderConfig, args: &ProviderArgs) {
    match config {
        ProviderConfig::OpenAi(config) => {
            if let Some(model) = &args.model {
                config.model = model.clone();
            }
            if let Some(temperature) = args.temperature {
                config.temperature = Some(temperature);
            }
            if let Some(api_key) = &args.api_key {
                config.api_key = Some(api_key.clone());
            }
        }
        ProviderConfig::Ollama(config) => {
            if let Some(model) = &args.model {
                config.model = model.clone();
            }
            if let Some(temperature) = args.temperature {
                config.temperature = Some(temperature);
            }
        }
    }
}

pub fn provider_config(args: &ProviderArgs, default: ProviderType) -> Result<ProviderConfig> {
    let provider_type = args.provider.map(ProviderType::from).unwrap_or(default);
    let mut config = ProviderConfig::from_env_with_host(provider_type, args.host.clone())?;
    apply_overrides(&mut config, args);
    Ok(config)
}

pub fn build_provider(args: &ProviderArgs, default: ProviderType) -> Result<Box<dyn Provider>> {
    let config = provider_config(args, default)?;
    tracing::debug!(model = %config.model(), "using {:?} backend", config.provider_type());
    get_provider(config)
}
