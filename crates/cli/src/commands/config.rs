use std::fs;
use std::path::Path;

use sweetshop_core::config::{
    latency_env_key, read_env, resolve_config_path, AppConfig, LoadOptions, LATENCY_ENV,
};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let seed_path = config
        .catalog
        .seed_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in fixtures>".to_string());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (step, ms) in config.catalog.latency.steps() {
        let key_path = format!("catalog.latency.{step}_ms");
        let step_env = latency_env_key(step);
        let env_keys = [step_env.as_str(), LATENCY_ENV];
        lines.push(render_line(&key_path, &ms.to_string(), source(&key_path, &env_keys)));
    }
    lines.extend([
        render_line(
            "catalog.seed_path",
            &seed_path,
            source("catalog.seed_path", &["SWEETSHOP_CATALOG_SEED_PATH"]),
        ),
        render_line(
            "catalog.currency",
            &config.catalog.currency,
            source("catalog.currency", &["SWEETSHOP_CATALOG_CURRENCY"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["SWEETSHOP_LOGGING_LEVEL", "SWEETSHOP_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            source("logging.format", &["SWEETSHOP_LOGGING_FORMAT", "SWEETSHOP_LOG_FORMAT"]),
        ),
    ]);

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path.split('.').try_fold(root, |node, key| node.get(key)).is_some()
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_file_doc() {
        let doc: Value = "[catalog]\ncurrency = \"EUR\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "catalog.currency"));
        assert!(!contains_path(&doc, "catalog.seed_path"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn file_source_names_the_file() {
        let doc: Value = "[logging]\nlevel = \"debug\"\n".parse().expect("valid toml");

        let source = field_source(
            "logging.level",
            &["SWEETSHOP_TEST_NEVER_SET_LEVEL"],
            Some(&doc),
            Some(Path::new("config/sweetshop.toml")),
        );

        assert_eq!(source, "file (config/sweetshop.toml)");
    }

    #[test]
    fn unset_everywhere_is_default() {
        let source = field_source("catalog.currency", &["SWEETSHOP_TEST_NEVER_SET"], None, None);

        assert_eq!(source, "default");
    }

    #[test]
    fn blank_env_value_is_not_reported_as_source() {
        std::env::set_var("SWEETSHOP_TEST_BLANK_CURRENCY", "  ");
        let doc: Value = "[catalog]\ncurrency = \"EUR\"\n".parse().expect("valid toml");

        let source = field_source(
            "catalog.currency",
            &["SWEETSHOP_TEST_BLANK_CURRENCY"],
            Some(&doc),
            Some(Path::new("sweetshop.toml")),
        );
        std::env::remove_var("SWEETSHOP_TEST_BLANK_CURRENCY");

        assert_eq!(source, "file (sweetshop.toml)");
    }
}
