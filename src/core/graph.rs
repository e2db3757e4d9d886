use crate::domain::model::{EnvValue, ResourceSpec, Wire};
use crate::domain::ports::SecretSource;
use crate::utils::error::{HostError, Result};
use std::collections::HashSet;

/// 應用程式的組合圖：資源宣告加上它們之間的接線。
///
/// 由組合根一次建好，之後只讀。宣告順序會反映在啟動順序的
/// 同位次排序，因此圖的走訪結果是確定性的。
#[derive(Debug, Clone, Default)]
pub struct AppGraph {
    resources: Vec<ResourceSpec>,
    wires: Vec<Wire>,
}

impl AppGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 宣告一個資源
    pub fn add_resource(&mut self, resource: ResourceSpec) {
        self.resources.push(resource);
    }

    /// 宣告 `from` 依賴 `to`，投影時注入對應的連線資訊
    pub fn add_reference(&mut self, from: &str, to: &str) {
        self.wires.push(Wire::Reference {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    /// 對 `target` 注入一個環境變數
    pub fn add_env(&mut self, target: &str, key: &str, value: EnvValue) {
        self.wires.push(Wire::Env {
            target: target.to_string(),
            key: key.to_string(),
            value,
        });
    }

    pub fn resources(&self) -> &[ResourceSpec] {
        &self.resources
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// 獲取指定名稱的資源宣告
    pub fn get_resource(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// 圖中所有以機密注入的環境變數所需要的機密名稱（去重、依宣告順序）
    pub fn required_secrets(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();

        for wire in &self.wires {
            if let Wire::Env {
                value: EnvValue::Secret(key),
                ..
            } = wire
            {
                if seen.insert(key.clone()) {
                    keys.push(key.clone());
                }
            }
        }

        keys
    }

    /// 驗證整張圖。
    ///
    /// 機密檢查排在最前面：缺少必要機密時立即失敗，任何後續的
    /// 計畫物件都不會被產生。
    pub fn validate(&self, secrets: &dyn SecretSource) -> Result<()> {
        self.validate_secrets(secrets)?;
        self.validate_names()?;
        self.validate_wires()?;
        self.validate_acyclic()?;
        Ok(())
    }

    fn validate_secrets(&self, secrets: &dyn SecretSource) -> Result<()> {
        for key in self.required_secrets() {
            let present = secrets
                .get(&key)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false);

            if !present {
                let env_name = key.to_uppercase().replace('.', "__").replace('-', "_");
                return Err(HostError::MissingSecretError {
                    key,
                    hint: format!(
                        "Set the {} environment variable or provide the value in the manifest",
                        env_name
                    ),
                });
            }
        }

        Ok(())
    }

    fn validate_names(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for resource in &self.resources {
            validate_resource_name(&resource.name)?;

            if !seen.insert(resource.name.clone()) {
                return Err(HostError::DuplicateResourceError {
                    name: resource.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_wires(&self) -> Result<()> {
        for wire in &self.wires {
            match wire {
                Wire::Reference { from, to } => {
                    let context = format!("reference {} -> {}", from, to);

                    if self.get_resource(from).is_none() {
                        return Err(HostError::UnknownResourceError {
                            name: from.clone(),
                            context,
                        });
                    }
                    if self.get_resource(to).is_none() {
                        return Err(HostError::UnknownResourceError {
                            name: to.clone(),
                            context,
                        });
                    }
                    if from == to {
                        return Err(HostError::CircularReferenceError {
                            path: format!("{} -> {}", from, to),
                        });
                    }
                }
                Wire::Env { target, key, .. } => {
                    if self.get_resource(target).is_none() {
                        return Err(HostError::UnknownResourceError {
                            name: target.clone(),
                            context: format!("environment entry '{}'", key),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_acyclic(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for resource in &self.resources {
            if !visited.contains(&resource.name) {
                self.walk_references(&resource.name, &mut visited, &mut rec_stack, &mut path)?;
            }
        }

        Ok(())
    }

    fn walk_references(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Result<()> {
        visited.insert(name.to_string());
        rec_stack.insert(name.to_string());
        path.push(name.to_string());

        for dep in self.references_of(name) {
            if !visited.contains(dep) {
                self.walk_references(dep, visited, rec_stack, path)?;
            } else if rec_stack.contains(dep) {
                // 回到遞迴堆疊上的節點，擷取環的那一段路徑
                let start = path.iter().position(|n| n == dep).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(dep.to_string());
                return Err(HostError::CircularReferenceError {
                    path: cycle.join(" -> "),
                });
            }
        }

        rec_stack.remove(name);
        path.pop();
        Ok(())
    }

    fn references_of(&self, name: &str) -> Vec<&str> {
        self.wires
            .iter()
            .filter_map(|wire| match wire {
                Wire::Reference { from, to } if from == name => Some(to.as_str()),
                _ => None,
            })
            .collect()
    }

    /// 解析啟動順序：被依賴者在前，宣告順序作為同位次的排序依據
    pub fn startup_order(&self) -> Result<Vec<String>> {
        let mut order = Vec::with_capacity(self.resources.len());
        let mut placed: HashSet<String> = HashSet::new();

        while order.len() < self.resources.len() {
            let mut progressed = false;

            for resource in &self.resources {
                if placed.contains(&resource.name) {
                    continue;
                }

                let ready = self
                    .references_of(&resource.name)
                    .iter()
                    .all(|dep| placed.contains(*dep));

                if ready {
                    placed.insert(resource.name.clone());
                    order.push(resource.name.clone());
                    progressed = true;
                    break;
                }
            }

            if !progressed {
                let stuck: Vec<&str> = self
                    .resources
                    .iter()
                    .map(|r| r.name.as_str())
                    .filter(|name| !placed.contains(*name))
                    .collect();
                return Err(HostError::CircularReferenceError {
                    path: stuck.join(" -> "),
                });
            }
        }

        Ok(order)
    }
}

fn validate_resource_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 {
        return Err(HostError::InvalidResourceNameError {
            name: name.to_string(),
            reason: "name must be between 1 and 63 characters".to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(HostError::InvalidResourceNameError {
            name: name.to_string(),
            reason: "only lowercase letters, digits and hyphens are allowed".to_string(),
        });
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(HostError::InvalidResourceNameError {
            name: name.to_string(),
            reason: "name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}
