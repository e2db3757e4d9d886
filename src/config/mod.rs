pub mod cli;
pub mod openai;

use crate::utils::duration::parse_flexible_duration;
use crate::utils::error::{HostError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use openai::{OpenAiSettings, TemperatureSettings};

/// 組合主機的完整設定，對應 mealhost.toml 的三個區段。
///
/// 所有欄位都有預設值，空的設定檔也是合法的；載入後可再以
/// `SECTION__FIELD` 形式的環境變數覆寫個別欄位。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub openai: OpenAiSettings,

    #[serde(default)]
    pub postgres: PostgresSettings,

    #[serde(default)]
    pub services: ServiceSettings,
}

/// 資料庫容器的參數。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSettings {
    #[serde(default = "default_postgres_host")]
    pub host: String,

    #[serde(default = "default_postgres_port")]
    pub port: u16,

    #[serde(default = "default_postgres_user")]
    pub user: String,

    #[serde(default = "default_postgres_password")]
    pub password: String,

    #[serde(default = "default_postgres_database")]
    pub database: String,

    /// 資料持久化使用的 volume 名稱
    #[serde(default = "default_postgres_volume")]
    pub volume: String,

    /// 資料庫遷移的逾時時間，接受 "HH:mm:ss" 或 "HH:mm" 格式
    #[serde(default)]
    pub command_timeout: Option<String>,
}

/// 各服務專案的位置與對外端點。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_services_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_web_port")]
    pub web_port: u16,

    #[serde(default = "default_api_path")]
    pub api_path: String,

    #[serde(default = "default_web_path")]
    pub web_path: String,

    #[serde(default = "default_migrator_path")]
    pub migrator_path: String,
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

const fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_user() -> String {
    "postgres".to_string()
}

fn default_postgres_password() -> String {
    "postgres".to_string()
}

fn default_postgres_database() -> String {
    "mealplanner".to_string()
}

fn default_postgres_volume() -> String {
    "mealhost-pgdata".to_string()
}

fn default_services_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_api_port() -> u16 {
    8000
}

const fn default_web_port() -> u16 {
    3000
}

fn default_api_path() -> String {
    "./mealplanner-api".to_string()
}

fn default_web_path() -> String {
    "./mealplanner-web".to_string()
}

fn default_migrator_path() -> String {
    "./mealplanner-migrator".to_string()
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: default_postgres_host(),
            port: default_postgres_port(),
            user: default_postgres_user(),
            password: default_postgres_password(),
            database: default_postgres_database(),
            volume: default_postgres_volume(),
            command_timeout: None,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            host: default_services_host(),
            api_port: default_api_port(),
            web_port: default_web_port(),
            api_path: default_api_path(),
            web_path: default_web_path(),
            migrator_path: default_migrator_path(),
        }
    }
}

impl AppSettings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HostError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HostError::ConfigParseError {
            source_name: "manifest".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以環境變數覆寫設定欄位。
    ///
    /// 變數名稱採 `SECTION__FIELD` 形式（巢狀欄位再加一層底線），
    /// 無法解析成目標型別的值會被忽略並留下 debug 紀錄。
    pub fn apply_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "OPENAI__API_KEY" => self.openai.api_key = Some(value),
                "OPENAI__MODEL" => self.openai.model = value,
                "OPENAI__MAX_DISHES_PER_BATCH" => {
                    apply_parsed(&key, &value, &mut self.openai.max_dishes_per_batch)
                }
                "OPENAI__TEMPERATURES__MENU" => {
                    apply_parsed(&key, &value, &mut self.openai.temperatures.menu)
                }
                "OPENAI__TEMPERATURES__DETAILED_RECIPE" => {
                    apply_parsed(&key, &value, &mut self.openai.temperatures.detailed_recipe)
                }
                "OPENAI__TEMPERATURES__RECIPE_REPLACEMENT" => {
                    apply_parsed(&key, &value, &mut self.openai.temperatures.recipe_replacement)
                }
                "OPENAI__TEMPERATURES__SHOPPING_LIST" => {
                    apply_parsed(&key, &value, &mut self.openai.temperatures.shopping_list)
                }
                "POSTGRES__HOST" => self.postgres.host = value,
                "POSTGRES__PORT" => apply_parsed(&key, &value, &mut self.postgres.port),
                "POSTGRES__USER" => self.postgres.user = value,
                "POSTGRES__PASSWORD" => self.postgres.password = value,
                "POSTGRES__DATABASE" => self.postgres.database = value,
                "POSTGRES__VOLUME" => self.postgres.volume = value,
                "POSTGRES__COMMAND_TIMEOUT" => self.postgres.command_timeout = Some(value),
                "SERVICES__HOST" => self.services.host = value,
                "SERVICES__API_PORT" => apply_parsed(&key, &value, &mut self.services.api_port),
                "SERVICES__WEB_PORT" => apply_parsed(&key, &value, &mut self.services.web_port),
                "SERVICES__API_PATH" => self.services.api_path = value,
                "SERVICES__WEB_PATH" => self.services.web_path = value,
                "SERVICES__MIGRATOR_PATH" => self.services.migrator_path = value,
                // 其餘環境變數與設定無關，直接略過
                _ => {}
            }
        }
    }

    /// 套用目前程序的環境變數
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("postgres.host", &self.postgres.host)?;
        validate_non_empty_string("postgres.user", &self.postgres.user)?;
        validate_non_empty_string("postgres.database", &self.postgres.database)?;
        validate_non_empty_string("postgres.volume", &self.postgres.volume)?;
        validate_positive_number("postgres.port", self.postgres.port as usize, 1)?;

        validate_non_empty_string("services.host", &self.services.host)?;
        validate_positive_number("services.api_port", self.services.api_port as usize, 1)?;
        validate_positive_number("services.web_port", self.services.web_port as usize, 1)?;
        validate_path("services.api_path", &self.services.api_path)?;
        validate_path("services.web_path", &self.services.web_path)?;
        validate_path("services.migrator_path", &self.services.migrator_path)?;

        // 服務端點組成的 URL 必須是合法的 http 位址
        validate_url("services.api_base_url", &self.services.api_base_url())?;
        validate_url("services.web_base_url", &self.services.web_base_url())?;

        Ok(())
    }
}

impl PostgresSettings {
    /// 將 command_timeout 換算成秒數；未設定或無法解讀時回傳 `None`
    pub fn command_timeout_seconds(&self) -> Option<i64> {
        parse_flexible_duration(self.command_timeout.as_deref()).map(|d| d.num_seconds())
    }
}

impl ServiceSettings {
    pub fn api_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.api_port)
    }

    pub fn web_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.web_port)
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn apply_parsed<T: std::str::FromStr>(key: &str, raw: &str, slot: &mut T) {
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::debug!("⏭️ Ignoring override {}={}: not a valid value", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let settings = AppSettings::from_toml_str("").unwrap();

        assert_eq!(settings.postgres.host, "localhost");
        assert_eq!(settings.postgres.port, 5432);
        assert_eq!(settings.postgres.database, "mealplanner");
        assert_eq!(settings.postgres.volume, "mealhost-pgdata");
        assert_eq!(settings.postgres.command_timeout, None);
        assert_eq!(settings.services.api_port, 8000);
        assert_eq!(settings.services.web_port, 3000);
        assert_eq!(settings.openai.model, "gpt-4o-mini");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_full_manifest() {
        let toml_content = r#"
[openai]
api_key = "sk-local"
model = "gpt-4o"

[openai.temperatures]
menu = 0.5

[postgres]
host = "db.internal"
port = 15432
database = "meals"
command_timeout = "00:05:00"

[services]
host = "0.0.0.0"
api_port = 9000
api_path = "../api"
"#;

        let settings = AppSettings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.openai.api_key.as_deref(), Some("sk-local"));
        assert_eq!(settings.openai.model, "gpt-4o");
        assert_eq!(settings.openai.temperatures.menu, 0.5);
        assert_eq!(settings.openai.temperatures.detailed_recipe, 0.4);
        assert_eq!(settings.postgres.host, "db.internal");
        assert_eq!(settings.postgres.port, 15432);
        assert_eq!(settings.postgres.command_timeout_seconds(), Some(300));
        assert_eq!(settings.services.api_port, 9000);
        assert_eq!(settings.services.api_path, "../api");
        assert_eq!(settings.services.web_path, "./mealplanner-web");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_MEALHOST_DB_HOST", "pg.example.com");

        let toml_content = r#"
[postgres]
host = "${TEST_MEALHOST_DB_HOST}"
"#;

        let settings = AppSettings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.postgres.host, "pg.example.com");

        std::env::remove_var("TEST_MEALHOST_DB_HOST");
    }

    #[test]
    fn test_unresolved_placeholder_is_kept() {
        let toml_content = r#"
[postgres]
host = "${MEALHOST_UNSET_VARIABLE_FOR_TEST}"
"#;

        let settings = AppSettings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.postgres.host, "${MEALHOST_UNSET_VARIABLE_FOR_TEST}");
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = AppSettings::default();

        settings.apply_overrides(vec![
            ("OPENAI__API_KEY".to_string(), "sk-from-env".to_string()),
            ("POSTGRES__PORT".to_string(), "15432".to_string()),
            ("SERVICES__WEB_PORT".to_string(), "8080".to_string()),
            (
                "OPENAI__TEMPERATURES__MENU".to_string(),
                "0.95".to_string(),
            ),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ]);

        assert_eq!(settings.openai.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(settings.postgres.port, 15432);
        assert_eq!(settings.services.web_port, 8080);
        assert_eq!(settings.openai.temperatures.menu, 0.95);
    }

    #[test]
    fn test_uncoercible_override_is_ignored() {
        let mut settings = AppSettings::default();

        settings.apply_overrides(vec![
            ("POSTGRES__PORT".to_string(), "not-a-port".to_string()),
            ("OPENAI__TEMPERATURES__MENU".to_string(), "warm".to_string()),
        ]);

        assert_eq!(settings.postgres.port, 5432);
        assert_eq!(settings.openai.temperatures.menu, 0.7);
    }

    #[test]
    fn test_out_of_range_override_is_accepted() {
        let mut settings = AppSettings::default();

        settings.apply_overrides(vec![(
            "OPENAI__TEMPERATURES__MENU".to_string(),
            "5.0".to_string(),
        )]);

        assert_eq!(settings.openai.temperatures.menu, 5.0);
    }

    #[test]
    fn test_command_timeout_is_best_effort() {
        let mut settings = AppSettings::default();
        assert_eq!(settings.postgres.command_timeout_seconds(), None);

        settings.postgres.command_timeout = Some("00:10".to_string());
        assert_eq!(settings.postgres.command_timeout_seconds(), Some(600));

        settings.postgres.command_timeout = Some("25:99".to_string());
        assert_eq!(
            settings.postgres.command_timeout_seconds(),
            Some(26 * 3600 + 39 * 60)
        );

        settings.postgres.command_timeout = Some("soon".to_string());
        assert_eq!(settings.postgres.command_timeout_seconds(), None);
    }

    #[test]
    fn test_validation_rejects_empty_host() {
        let mut settings = AppSettings::default();
        settings.services.host = "   ".to_string();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_skips_openai_section() {
        let mut settings = AppSettings::default();
        settings.openai.temperatures.menu = 42.0;
        settings.openai.max_dishes_per_batch = 0;

        assert!(settings.validate().is_ok());
    }
}
