use super::AppConfig;
use crate::errors::ConfigError;
use std::fs;
use tracing::info;

/// Loads the service configuration from a YAML file, resolving `${VAR}`
/// placeholders from the environment so secrets can stay in `.env`.
pub fn load_config(file_path: &str) -> Result<AppConfig, ConfigError> {
    let yaml_str = fs::read_to_string(file_path)?;
    let yaml_str = expand_env_vars(&yaml_str);
    let config: AppConfig = serde_yaml::from_str(&yaml_str)?;
    info!("Loaded configuration from {}", file_path);
    Ok(config)
}

/// Replaces every `${NAME}` occurrence with the value of the environment
/// variable `NAME`, or the empty string when unset; `validate` then
/// reports the resulting hole as a missing field.
fn expand_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                output.push_str(&std::env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_resolve_from_the_environment() {
        std::env::set_var("CHATSUITE_TEST_TOKEN", "secret");
        let expanded = expand_env_vars("auth_token: \"${CHATSUITE_TEST_TOKEN}\"");
        assert_eq!(expanded, "auth_token: \"secret\"");
    }

    #[test]
    fn unset_placeholders_expand_to_nothing() {
        std::env::remove_var("CHATSUITE_TEST_UNSET");
        let expanded = expand_env_vars("key: \"${CHATSUITE_TEST_UNSET}\"");
        assert_eq!(expanded, "key: \"\"");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        assert_eq!(expand_env_vars("key: ${OOPS"), "key: ${OOPS");
    }
}
