use crate::cli::ConfigAction;
use crate::config::{AppConfig, mask_api_key};
use crate::console::console;

pub fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            console().plain(&format!("default_backend = \"{}\"", config.default_backend));
            if let Some(ref api_key) = config.api_key {
                console().plain(&format!("api_key = \"{}\"", mask_api_key(api_key)));
            }
            console().plain(&format!("base_url = \"{}\"", config.base_url));
            console().plain(&format!(
                "ledger_dir = \"{}\"",
                config.ledger_dir()?.display()
            ));
            if let Some(ref verbosity) = config.verbosity {
                console().plain(&format!("verbosity = \"{}\"", verbosity));
            }

            console().newline();
            console().plain("[cache]");
            console().plain(&format!("capacity = {}", config.cache.capacity));
            if let Some(ttl) = config.cache.ttl_secs {
                console().plain(&format!("ttl_secs = {}", ttl));
            }

            for (tier, model) in &config.models {
                if let Some(ref id) = model.model {
                    console().newline();
                    console().plain(&format!("[models.{}]", tier));
                    console().plain(&format!("model = \"{}\"", id));
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            match config.update_setting(&key, value) {
                Ok(()) => {
                    config.save()?;
                    console().success("Configuration updated successfully");
                }
                Err(e) => {
                    console().error(&format!(
                        "{}. Known keys: default_backend, api_key, base_url, ledger_dir, verbosity, cache.capacity, cache.ttl_secs, models.<tier>.model",
                        e
                    ));
                }
            }
        }
    }

    Ok(())
}
