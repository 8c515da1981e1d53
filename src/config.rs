use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::{PilotError, Result};

/// 配置文件 testpilot.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PilotConfig {
    /// 全局请求超时（秒）
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

/// 单个环境的配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Environment {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// 每个请求默认携带的请求头
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl PilotConfig {
    pub fn get_environment(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }
}

/// 应用到测试计划上的运行设置
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub default_headers: Vec<(String, String)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(ConfigLoader::DEFAULT_TIMEOUT_SECS),
            default_headers: Vec::new(),
        }
    }
}

impl Settings {
    /// 以 `/` 开头的 URL 加上 base_url 前缀，其他 URL 原样返回
    pub fn apply_base(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url.to_string(),
        }
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "testpilot.toml";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<PilotConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        toml::from_str(&content).map_err(|e| {
            PilotError::Config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// 查找配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/testpilot/
    pub fn find() -> Option<PathBuf> {
        Self::find_in_ancestors().or_else(Self::find_in_user_dir)
    }

    /// 查找并加载配置文件，找不到时返回 None
    pub fn find_and_load() -> Result<Option<PilotConfig>> {
        match Self::find() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load_from_path(path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find_in_ancestors() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home
            .join(".config")
            .join("testpilot")
            .join(Self::CONFIG_FILE);

        config_path.exists().then_some(config_path)
    }

    /// 构建运行设置
    /// env_name: 环境名称（如 "dev", "prod"），未知环境返回错误
    pub fn settings(config: Option<&PilotConfig>, env_name: Option<&str>) -> Result<Settings> {
        let mut settings = Settings::default();
        if let Some(secs) = config.and_then(|c| c.timeout_secs) {
            settings.timeout = Duration::from_secs(secs);
        }

        let Some(name) = env_name else {
            return Ok(settings);
        };
        let env = config
            .and_then(|c| c.get_environment(name))
            .ok_or_else(|| PilotError::Config(format!("unknown environment: {}", name)))?;

        settings.base_url = env.base_url.as_deref().map(expand_env_vars);
        if let Some(secs) = env.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        settings.default_headers = env
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), expand_env_vars(v)))
            .collect();

        Ok(settings)
    }
}

/// 展开 `${VAR}` 形式的系统环境变量，未定义的变量保持原样
pub fn expand_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(text, |caps: &Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
timeout_secs = 10

[environments.dev]
base_url = "http://localhost:8080/"

[environments.dev.headers]
Accept = "application/json"

[environments.prod]
base_url = "https://api.example.com"
timeout_secs = 5

[environments.prod.headers]
Authorization = "Bearer ${TESTPILOT_CONFIG_TEST_TOKEN}"
X-Missing = "${TESTPILOT_CONFIG_TEST_UNSET}"
"#;

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.timeout_secs, Some(10));
        assert!(config.get_environment("dev").is_some());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"timeout_secs = [").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, PilotError::Config(_)));
    }

    #[test]
    fn test_settings_for_environment() {
        // SAFETY: 变量名只在本测试中使用
        unsafe { std::env::set_var("TESTPILOT_CONFIG_TEST_TOKEN", "s3cret") };
        let config: PilotConfig = toml::from_str(CONFIG).unwrap();

        let dev = ConfigLoader::settings(Some(&config), Some("dev")).unwrap();
        assert_eq!(dev.timeout, Duration::from_secs(10));
        assert_eq!(dev.apply_base("/users/1"), "http://localhost:8080/users/1");
        assert_eq!(
            dev.default_headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );

        let prod = ConfigLoader::settings(Some(&config), Some("prod")).unwrap();
        assert_eq!(prod.timeout, Duration::from_secs(5));
        assert_eq!(
            prod.default_headers,
            vec![
                ("Authorization".to_string(), "Bearer s3cret".to_string()),
                (
                    "X-Missing".to_string(),
                    "${TESTPILOT_CONFIG_TEST_UNSET}".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_environment() {
        let config: PilotConfig = toml::from_str(CONFIG).unwrap();
        let err = ConfigLoader::settings(Some(&config), Some("qa")).unwrap_err();
        assert_eq!(err.to_string(), "配置错误: unknown environment: qa");

        assert!(ConfigLoader::settings(None, Some("dev")).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = ConfigLoader::settings(None, None).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.apply_base("/users"), "/users");
        assert_eq!(
            settings.apply_base("http://example.com/users"),
            "http://example.com/users"
        );
    }
}
