use anyhow::{Context, Result, anyhow};

use crate::{
    config::{
        config_model::{ClickMerchant, Database, DotEnvyConfig, Server},
        stage::Stage,
    },
    domain::value_objects::enums::cancellation_scopes::CancellationScope,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let secret_key = required("CLICK_SECRET_KEY")?;
    if secret_key.trim().is_empty() {
        return Err(anyhow!("CLICK_SECRET_KEY is empty"));
    }

    let click = ClickMerchant {
        secret_key,
        cancellation_scope: parse_cancellation_scope(
            std::env::var("CLICK_CANCELLATION_SCOPE").ok().as_deref(),
        )?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        click,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn parse_cancellation_scope(raw: Option<&str>) -> Result<CancellationScope> {
    match raw {
        None => Ok(CancellationScope::default()),
        Some(value) if value.trim().is_empty() => Ok(CancellationScope::default()),
        Some(value) => CancellationScope::from_str(value)
            .ok_or_else(|| anyhow!("CLICK_CANCELLATION_SCOPE is invalid: {value}")),
    }
}
