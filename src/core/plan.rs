use crate::domain::model::{ServicePlan, StartupPlan};
use crate::domain::ports::Storage;
use crate::utils::error::{HostError, Result};

/// 匯出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Dotenv,
    All,
}

impl std::str::FromStr for ExportFormat {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "dotenv" => Ok(ExportFormat::Dotenv),
            "all" => Ok(ExportFormat::All),
            other => Err(HostError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "expected one of: json, dotenv, all".to_string(),
            }),
        }
    }
}

impl StartupPlan {
    /// 人類可讀的計畫摘要；標記為機密的值只顯示遮罩
    pub fn render_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("📋 Startup Plan: {}\n", self.execution_id));
        summary.push_str(&format!("  Generated: {}\n", self.generated_at.to_rfc3339()));
        summary.push_str(&format!(
            "  Startup order: {}\n",
            self.startup_order.join(" -> ")
        ));
        summary.push('\n');

        for (index, service) in self.services.iter().enumerate() {
            summary.push_str(&format!(
                "  [{}] {} ({}) {}\n",
                index + 1,
                service.name,
                service.kind,
                service.detail
            ));

            for entry in &service.env {
                let shown = if entry.secret {
                    "********"
                } else {
                    entry.value.as_str()
                };
                summary.push_str(&format!("      {} = {}\n", entry.key, shown));
            }
        }

        summary
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get_service(&self, name: &str) -> Option<&ServicePlan> {
        self.services.iter().find(|s| s.name == name)
    }

    /// 單一服務的 dotenv 內容（完整的值，供實際啟動使用）
    pub fn dotenv_for(&self, name: &str) -> Result<String> {
        let service = self
            .get_service(name)
            .ok_or_else(|| HostError::UnknownServiceError {
                name: name.to_string(),
            })?;

        let mut content = String::new();
        for entry in &service.env {
            content.push_str(&format!("{}={}\n", entry.key, entry.value));
        }

        Ok(content)
    }

    /// 將計畫寫到儲存端，回傳寫出的檔名清單。
    ///
    /// dotenv 檔只會為有環境變數的服務產生。
    pub async fn export<S: Storage>(&self, storage: &S, format: ExportFormat) -> Result<Vec<String>> {
        let mut written = Vec::new();

        if matches!(format, ExportFormat::Json | ExportFormat::All) {
            let json = self.to_pretty_json()?;
            storage.write_file("plan.json", json.as_bytes()).await?;
            written.push("plan.json".to_string());
        }

        if matches!(format, ExportFormat::Dotenv | ExportFormat::All) {
            for service in &self.services {
                if service.env.is_empty() {
                    continue;
                }

                let filename = format!("{}.env", service.name);
                let content = self.dotenv_for(&service.name)?;
                storage.write_file(&filename, content.as_bytes()).await?;
                written.push(filename);
            }
        }

        Ok(written)
    }
}
