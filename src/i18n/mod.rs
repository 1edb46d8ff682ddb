//! Interface labels
//!
//! Labels for `pt-BR` and `en` are built in. YAML or JSON files named after a
//! language tag (`languages/pt-BR.yml`) override or extend them. Lookups fall
//! back to English, then to the key itself.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const FALLBACK_LANGUAGE: &str = "en";

const PT_BR: &[(&str, &str)] = &[
    ("list.title", "Home"),
    ("list.load_more", "Carregar mais posts"),
    ("list.empty", "Nenhum post publicado ainda."),
    ("list.load_failed", "Não foi possível carregar mais posts."),
    ("post.loading", "Carregando..."),
    ("post.loading_hint", "Esta página será atualizada automaticamente."),
    ("post.reading_time", "Tempo de leitura"),
    ("post.back", "Voltar para a lista"),
    ("not_found.title", "Página não encontrada"),
    ("not_found.message", "O post que você procura não existe."),
];

const EN: &[(&str, &str)] = &[
    ("list.title", "Home"),
    ("list.load_more", "Load more posts"),
    ("list.empty", "No posts published yet."),
    ("list.load_failed", "Could not load more posts."),
    ("post.loading", "Loading..."),
    ("post.loading_hint", "This page refreshes automatically."),
    ("post.reading_time", "Reading time"),
    ("post.back", "Back to the list"),
    ("not_found.title", "Page not found"),
    ("not_found.message", "The post you are looking for does not exist."),
];

/// Label lookup for one site language
#[derive(Debug, Clone)]
pub struct I18n {
    language: String,
    /// lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in tables
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        translations.insert("pt-BR".to_string(), builtin(PT_BR));
        translations.insert(FALLBACK_LANGUAGE.to_string(), builtin(EN));
        Self {
            language: normalize_tag(language),
            translations,
        }
    }

    /// Load language files from a directory, merging over the built-in labels
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("yml") | Some("yaml") | Some("json")) {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)?;
            let data: Option<HashMap<String, serde_yaml::Value>> = if ext == Some("json") {
                match serde_json::from_str::<serde_json::Value>(&content) {
                    Ok(json) => Some(convert_json_to_yaml(json)),
                    Err(e) => {
                        tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                        None
                    }
                }
            } else {
                match serde_yaml::from_str(&content) {
                    Ok(data) => Some(data),
                    Err(e) => {
                        tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                        None
                    }
                }
            };

            if let Some(data) = data {
                let mut flat = HashMap::new();
                flatten_translations(&data, "", &mut flat);
                let table = self.translations.entry(normalize_tag(lang)).or_default();
                for (key, value) in flat {
                    table.insert(key, serde_yaml::Value::String(value));
                }
                tracing::debug!("Loaded language file: {:?}", path);
            }
        }

        Ok(())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Translation for a dotted key such as `post.loading`
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        if let Some(value) = self.lookup(lang, key) {
            return value;
        }
        if lang != FALLBACK_LANGUAGE {
            if let Some(value) = self.lookup(FALLBACK_LANGUAGE, key) {
                return value;
            }
        }
        key.to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<String> {
        let data = self.translations.get(lang)?;
        get_nested_value(data, key).map(yaml_value_to_string)
    }

    /// All labels for the current language, English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(lang_data) = self.translations.get(&self.language) {
            flatten_translations(lang_data, "", &mut result);
        }

        if self.language != FALLBACK_LANGUAGE {
            if let Some(en_data) = self.translations.get(FALLBACK_LANGUAGE) {
                let mut en_result = HashMap::new();
                flatten_translations(en_data, "", &mut en_result);
                for (k, v) in en_result {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("pt-BR")
    }
}

fn builtin(table: &[(&str, &str)]) -> HashMap<String, serde_yaml::Value> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), serde_yaml::Value::String(v.to_string())))
        .collect()
}

/// `pt_br` and `pt-br` both map to `pt-BR`
fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim().replace('_', "-");
    match tag.split_once('-') {
        Some((lang, region)) => format!("{}-{}", lang.to_lowercase(), region.to_uppercase()),
        None => tag.to_lowercase(),
    }
}

/// Flat dotted keys win over nested maps
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    if let Some(value) = data.get(key) {
        return Some(value);
    }

    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);
    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }
    current
}

fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Tagged(_) => {}
            scalar => {
                result.insert(full_key, yaml_value_to_string(scalar));
            }
        }
    }
}

fn convert_json_to_yaml(json: serde_json::Value) -> HashMap<String, serde_yaml::Value> {
    match json {
        serde_json::Value::Object(obj) => obj
            .into_iter()
            .map(|(key, value)| (key, json_value_to_yaml(value)))
            .collect(),
        _ => HashMap::new(),
    }
}

fn json_value_to_yaml(json: serde_json::Value) -> serde_yaml::Value {
    match json {
        serde_json::Value::Null => serde_yaml::Value::Null,
        serde_json::Value::Bool(b) => serde_yaml::Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_yaml::Value::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(f))
            } else {
                serde_yaml::Value::Null
            }
        }
        serde_json::Value::String(s) => serde_yaml::Value::String(s),
        serde_json::Value::Array(arr) => {
            serde_yaml::Value::Sequence(arr.into_iter().map(json_value_to_yaml).collect())
        }
        serde_json::Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(serde_yaml::Value::String(k), json_value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}
