use crate::config::cli::EnvSecrets;
use crate::config::AppSettings;
use crate::core::env::project_service;
use crate::core::graph::AppGraph;
use crate::domain::model::StartupPlan;
use crate::domain::ports::SecretSource;
use crate::utils::error::Result;

/// 組合主機引擎：驗證組合圖、解析啟動順序、產生啟動計畫。
pub struct HostEngine {
    graph: AppGraph,
    settings: AppSettings,
    secrets: Box<dyn SecretSource>,
}

impl HostEngine {
    pub fn new(graph: AppGraph, settings: AppSettings) -> Self {
        Self {
            graph,
            settings,
            secrets: Box::new(EnvSecrets::new()),
        }
    }

    /// 替換外部機密來源（測試或嵌入情境使用）
    pub fn with_secret_source(mut self, secrets: impl SecretSource + 'static) -> Self {
        self.secrets = Box::new(secrets);
        self
    }

    pub fn graph(&self) -> &AppGraph {
        &self.graph
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 驗證組合圖；必要機密的檢查排在所有其他步驟之前
    pub fn check(&self) -> Result<()> {
        tracing::info!(
            "🔍 Validating composition graph ({} resources, {} wires)",
            self.graph.resources().len(),
            self.graph.wires().len()
        );

        self.graph.validate(&self.resolver())?;

        tracing::info!("✅ Composition graph is valid");
        Ok(())
    }

    /// 驗證、排序、投影，組出完整的啟動計畫
    pub fn plan(&self) -> Result<StartupPlan> {
        self.check()?;

        let startup_order = self.graph.startup_order()?;
        tracing::info!("📋 Startup order resolved: {}", startup_order.join(" -> "));

        let resolver = self.resolver();
        let mut services = Vec::new();

        for name in &startup_order {
            let service = project_service(&self.graph, name, &self.settings, &resolver)?;
            tracing::debug!(
                "🔄 Projected {} environment entries for {}",
                service.env.len(),
                name
            );
            services.push(service);
        }

        let plan = StartupPlan {
            execution_id: format!("host_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")),
            generated_at: chrono::Utc::now(),
            startup_order,
            services,
        };

        tracing::info!("✅ Startup plan assembled for {} services", plan.services.len());
        Ok(plan)
    }

    fn resolver(&self) -> SettingsFirstSecrets<'_> {
        SettingsFirstSecrets {
            settings: &self.settings,
            fallback: self.secrets.as_ref(),
        }
    }
}

/// 機密解析順序：先查設定，再查外部來源
struct SettingsFirstSecrets<'a> {
    settings: &'a AppSettings,
    fallback: &'a dyn SecretSource,
}

impl SecretSource for SettingsFirstSecrets<'_> {
    fn get(&self, key: &str) -> Option<String> {
        settings_secret(self.settings, key).or_else(|| self.fallback.get(key))
    }
}

fn settings_secret(settings: &AppSettings, key: &str) -> Option<String> {
    match key {
        "openai.api_key" => settings
            .openai
            .api_key
            .clone()
            .filter(|value| !value.trim().is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnvValue, ResourceSpec};
    use crate::utils::error::HostError;
    use std::collections::HashMap;

    struct MapSecrets(HashMap<String, String>);

    impl MapSecrets {
        fn empty() -> Self {
            Self(HashMap::new())
        }

        fn with(key: &str, value: &str) -> Self {
            let mut map = HashMap::new();
            map.insert(key.to_string(), value.to_string());
            Self(map)
        }
    }

    impl SecretSource for MapSecrets {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    fn graph_with_secret_entry() -> AppGraph {
        let mut graph = AppGraph::new();
        graph.add_resource(ResourceSpec::project("api", "./api", Some(8000)));
        graph.add_env(
            "api",
            "OpenAI__ApiKey",
            EnvValue::Secret("openai.api_key".to_string()),
        );
        graph
    }

    #[test]
    fn test_secret_from_settings_satisfies_check() {
        let mut settings = AppSettings::default();
        settings.openai.api_key = Some("sk-manifest".to_string());

        let engine = HostEngine::new(graph_with_secret_entry(), settings)
            .with_secret_source(MapSecrets::empty());

        assert!(engine.check().is_ok());
    }

    #[test]
    fn test_secret_from_fallback_satisfies_check() {
        let engine = HostEngine::new(graph_with_secret_entry(), AppSettings::default())
            .with_secret_source(MapSecrets::with("openai.api_key", "sk-env"));

        assert!(engine.check().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_before_planning() {
        let engine = HostEngine::new(graph_with_secret_entry(), AppSettings::default())
            .with_secret_source(MapSecrets::empty());

        let err = engine.plan().unwrap_err();
        assert!(matches!(err, HostError::MissingSecretError { .. }));
    }

    #[test]
    fn test_blank_settings_secret_falls_back_to_source() {
        let mut settings = AppSettings::default();
        settings.openai.api_key = Some("   ".to_string());

        let engine = HostEngine::new(graph_with_secret_entry(), settings)
            .with_secret_source(MapSecrets::with("openai.api_key", "sk-env"));

        let plan = engine.plan().unwrap();
        let api = plan.get_service("api").unwrap();
        let entry = api.env.iter().find(|e| e.key == "OpenAI__ApiKey").unwrap();
        assert_eq!(entry.value, "sk-env");
    }

    #[test]
    fn test_plan_assembles_services_in_startup_order() {
        let mut graph = AppGraph::new();
        graph.add_resource(ResourceSpec::project("web", "./web", Some(3000)));
        graph.add_resource(ResourceSpec::project("api", "./api", Some(8000)));
        graph.add_reference("web", "api");

        let engine = HostEngine::new(graph, AppSettings::default())
            .with_secret_source(MapSecrets::empty());

        let plan = engine.plan().unwrap();

        assert!(plan.execution_id.starts_with("host_"));
        assert_eq!(plan.startup_order, vec!["api", "web"]);
        assert_eq!(plan.services.len(), 2);
        assert_eq!(plan.services[0].name, "api");

        let web = plan.get_service("web").unwrap();
        let base_url = web
            .env
            .iter()
            .find(|e| e.key == "Services__Api__BaseUrl")
            .unwrap();
        assert_eq!(base_url.value, "http://127.0.0.1:8000");
    }
}
