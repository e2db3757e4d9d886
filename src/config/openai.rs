use serde::{Deserialize, Serialize};

/// OpenAI 相關設定。
///
/// 這組設定由組合主機原封轉交給 API 服務，主機本身只讀取
/// `api_key`。除了 serde 的型別轉換之外不做任何驗證：超出慣例
/// 範圍的取樣溫度會原樣保留，由下游服務自行決定如何處理。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// API 金鑰。屬於機密，通常不寫在設定檔而是由環境變數提供。
    #[serde(default)]
    pub api_key: Option<String>,

    /// 使用的模型名稱
    #[serde(default = "default_model")]
    pub model: String,

    /// 單一批次最多產生的菜色數量
    #[serde(default = "default_max_dishes_per_batch")]
    pub max_dishes_per_batch: u32,

    /// 各種產生情境的取樣溫度
    #[serde(default)]
    pub temperatures: TemperatureSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureSettings {
    #[serde(default = "default_menu_temperature")]
    pub menu: f32,

    #[serde(default = "default_detailed_recipe_temperature")]
    pub detailed_recipe: f32,

    #[serde(default = "default_recipe_replacement_temperature")]
    pub recipe_replacement: f32,

    #[serde(default = "default_shopping_list_temperature")]
    pub shopping_list: f32,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_max_dishes_per_batch() -> u32 {
    8
}

const fn default_menu_temperature() -> f32 {
    0.7
}

const fn default_detailed_recipe_temperature() -> f32 {
    0.4
}

const fn default_recipe_replacement_temperature() -> f32 {
    0.8
}

const fn default_shopping_list_temperature() -> f32 {
    0.2
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_dishes_per_batch: default_max_dishes_per_batch(),
            temperatures: TemperatureSettings::default(),
        }
    }
}

impl Default for TemperatureSettings {
    fn default() -> Self {
        Self {
            menu: default_menu_temperature(),
            detailed_recipe: default_detailed_recipe_temperature(),
            recipe_replacement: default_recipe_replacement_temperature(),
            shopping_list: default_shopping_list_temperature(),
        }
    }
}
