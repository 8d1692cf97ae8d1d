use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use anyhow::anyhow;
use reqwest::Url;

pub(super) fn get_env_mandatory_value<T, E>(key: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = E>,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)
        .map_err(|_| anyhow!("{key} environment variable must be set!"))?
        .parse()
        .map_err(|e: E| anyhow!(e))
}

pub(super) fn get_env_value_or_default<T, E>(key: &str, default: T) -> T
where
    T: FromStr<Err = E> + Display,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)
        .map_err(|e| {
            log::warn!("no value was found for an optional environment variable {key}, using the default value {default}");
            anyhow!(e)
        })
        .and_then(|v| v.parse()
            .map_err(|e: E| {
                log::warn!("invalid value of the {key} environment variable, using the default value {default}");
                anyhow!(e)
            }))
        .unwrap_or(default)
}

pub(super) fn get_optional_env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub(super) fn get_optional_env_url(key: &str) -> Option<Url> {
    get_optional_env_string(key)
        .and_then(|v| v.parse()
            .inspect_err(|e| log::warn!("{key} is disabled due to the invalid URL: {e}"))
            .ok())
}
