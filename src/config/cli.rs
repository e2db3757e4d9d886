use crate::core::{SecretSource, Storage};
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 從程序環境變數讀取機密值。
///
/// 邏輯名稱以 `SECTION__FIELD` 慣例對應環境變數，例如
/// `openai.api_key` 對應 `OPENAI__API_KEY`。
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets;

impl EnvSecrets {
    pub fn new() -> Self {
        Self
    }

    fn env_var_name(key: &str) -> String {
        key.to_uppercase().replace('.', "__").replace('-', "_")
    }
}

impl SecretSource for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_var_name(key))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}
