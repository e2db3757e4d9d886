use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub name: String,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone)]
pub enum ResourceKind {
    Postgres {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
        volume: String,
    },
    Project {
        path: String,
        http_port: Option<u16>,
    },
}

impl ResourceSpec {
    pub fn project(name: &str, path: &str, http_port: Option<u16>) -> Self {
        Self {
            name: name.to_string(),
            kind: ResourceKind::Project {
                path: path.to_string(),
                http_port,
            },
        }
    }
}

impl ResourceKind {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ResourceKind::Postgres { .. } => "postgres",
            ResourceKind::Project { .. } => "project",
        }
    }

    /// 資料庫資源的連線字串；非資料庫資源回傳 `None`。
    pub fn connection_string(&self) -> Option<String> {
        match self {
            ResourceKind::Postgres {
                host,
                port,
                user,
                password,
                database,
                ..
            } => Some(format!(
                "postgres://{}:{}@{}:{}/{}",
                user, password, host, port, database
            )),
            ResourceKind::Project { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ResourceKind::Postgres {
                database, volume, ..
            } => format!("database={} volume={}", database, volume),
            ResourceKind::Project { path, http_port } => match http_port {
                Some(port) => format!("path={} port={}", path, port),
                None => format!("path={}", path),
            },
        }
    }

    pub fn http_port(&self) -> Option<u16> {
        match self {
            ResourceKind::Postgres { .. } => None,
            ResourceKind::Project { http_port, .. } => *http_port,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Wire {
    /// 啟動順序依賴；投影時依目標資源種類注入對應的環境變數
    Reference { from: String, to: String },
    /// 對單一服務直接注入一個環境變數
    Env {
        target: String,
        key: String,
        value: EnvValue,
    },
}

#[derive(Debug, Clone)]
pub enum EnvValue {
    Literal(String),
    Secret(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
    pub secret: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicePlan {
    pub name: String,
    pub kind: String,
    pub detail: String,
    pub env: Vec<EnvEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartupPlan {
    pub execution_id: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub startup_order: Vec<String>,
    pub services: Vec<ServicePlan>,
}
