use crate::config::AppSettings;
use crate::core::graph::AppGraph;
use crate::domain::model::{EnvValue, ResourceKind, ResourceSpec};

/// 餐點規劃應用的組合根：宣告全部資源與它們之間的接線。
///
/// 這裡只建立描述資料，不啟動任何東西；檢查與投影交給
/// `AppGraph::validate` 和引擎。
pub fn mealplanner_app(settings: &AppSettings) -> AppGraph {
    let mut graph = AppGraph::new();

    // 資料庫容器，掛上具名 volume 讓資料跨次啟動保留
    graph.add_resource(ResourceSpec {
        name: "postgres".to_string(),
        kind: ResourceKind::Postgres {
            host: settings.postgres.host.clone(),
            port: settings.postgres.port,
            user: settings.postgres.user.clone(),
            password: settings.postgres.password.clone(),
            database: settings.postgres.database.clone(),
            volume: settings.postgres.volume.clone(),
        },
    });

    // 遷移工具：先於其他服務把資料庫結構帶到最新狀態
    graph.add_resource(ResourceSpec::project(
        "migrator",
        &settings.services.migrator_path,
        None,
    ));
    graph.add_reference("migrator", "postgres");
    if let Some(seconds) = settings.postgres.command_timeout_seconds() {
        graph.add_env(
            "migrator",
            "MIGRATOR__COMMAND_TIMEOUT_SECONDS",
            EnvValue::Literal(seconds.to_string()),
        );
    }

    // API 服務：需要資料庫連線與 OpenAI 金鑰，且等遷移完成
    graph.add_resource(ResourceSpec::project(
        "api",
        &settings.services.api_path,
        Some(settings.services.api_port),
    ));
    graph.add_reference("api", "postgres");
    graph.add_reference("api", "migrator");
    graph.add_env(
        "api",
        "OpenAI__ApiKey",
        EnvValue::Secret("openai.api_key".to_string()),
    );

    // 前端只跟 API 溝通
    graph.add_resource(ResourceSpec::project(
        "webfrontend",
        &settings.services.web_path,
        Some(settings.services.web_port),
    ));
    graph.add_reference("webfrontend", "api");

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Wire;

    #[test]
    fn test_app_declares_four_resources() {
        let graph = mealplanner_app(&AppSettings::default());

        let names: Vec<&str> = graph.resources().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["postgres", "migrator", "api", "webfrontend"]);
    }

    #[test]
    fn test_api_requires_openai_secret() {
        let graph = mealplanner_app(&AppSettings::default());

        assert_eq!(graph.required_secrets(), vec!["openai.api_key"]);
    }

    #[test]
    fn test_startup_order_is_database_first() {
        let graph = mealplanner_app(&AppSettings::default());

        let order = graph.startup_order().unwrap();
        assert_eq!(order, vec!["postgres", "migrator", "api", "webfrontend"]);
    }

    #[test]
    fn test_command_timeout_becomes_migrator_env() {
        let mut settings = AppSettings::default();
        settings.postgres.command_timeout = Some("00:05:00".to_string());

        let graph = mealplanner_app(&settings);

        let timeout_wire = graph.wires().iter().find(|wire| {
            matches!(
                wire,
                Wire::Env { target, key, .. }
                    if target == "migrator" && key == "MIGRATOR__COMMAND_TIMEOUT_SECONDS"
            )
        });

        match timeout_wire {
            Some(Wire::Env {
                value: EnvValue::Literal(seconds),
                ..
            }) => assert_eq!(seconds, "300"),
            other => panic!("expected literal timeout entry, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_command_timeout_is_omitted() {
        let mut settings = AppSettings::default();
        settings.postgres.command_timeout = Some("whenever".to_string());

        let graph = mealplanner_app(&settings);

        let has_timeout = graph.wires().iter().any(|wire| {
            matches!(wire, Wire::Env { key, .. } if key == "MIGRATOR__COMMAND_TIMEOUT_SECONDS")
        });
        assert!(!has_timeout);
    }

    #[test]
    fn test_ports_follow_settings() {
        let mut settings = AppSettings::default();
        settings.services.api_port = 9000;
        settings.services.web_port = 4000;

        let graph = mealplanner_app(&settings);

        let api = graph.get_resource("api").unwrap();
        assert_eq!(api.kind.http_port(), Some(9000));

        let web = graph.get_resource("webfrontend").unwrap();
        assert_eq!(web.kind.http_port(), Some(4000));
    }
}
