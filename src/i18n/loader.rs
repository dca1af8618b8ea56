//! Translation loader and i18n management
//!
//! Catalogues are nested JSON objects keyed by dotted paths
//! (`checkin.token_expired`). Files in the configured translations directory
//! take precedence; the catalogues compiled into the binary are used for any
//! supported language whose file is missing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde_json::{Value, Map};
use tokio::fs;
use tracing::{info, warn, error, debug};
use crate::utils::errors::{DashboardError, Result};
use crate::config::I18nConfig;

const BUNDLED: &[(&str, &str)] = &[
    ("id", include_str!("../../translations/id.json")),
    ("en", include_str!("../../translations/en.json")),
];

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    translations: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
    translations_dir: PathBuf,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create an empty instance; call [`I18n::load_translations`] or use [`I18n::bundled`]
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
            translations_dir: PathBuf::from(&config.translations_dir),
        }
    }

    /// Instance holding only the compiled-in catalogues
    pub fn bundled(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self::new(config);
        for lang_code in config.supported_languages.clone() {
            i18n.load_bundled(&lang_code)?;
        }
        Ok(i18n)
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = self.translations_dir.join(format!("{}.json", lang_code));

            if file_path.exists() {
                match self.load_language_file(&file_path, lang_code).await {
                    Ok(_) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => {
                        error!("Failed to load translations for {}: {}", lang_code, e);
                        if lang_code == &self.default_language {
                            return Err(DashboardError::Config(
                                format!("Failed to load default language translations: {}", e)
                            ));
                        }
                    }
                }
            } else {
                warn!("Translation file not found: {}, using bundled catalogue", file_path.display());
                if !self.load_bundled(lang_code)? && lang_code == &self.default_language {
                    return Err(DashboardError::Config(
                        format!("Default language translation file not found: {}", file_path.display())
                    ));
                }
            }
        }

        Ok(())
    }

    /// Returns false when no catalogue is compiled in for the language
    fn load_bundled(&mut self, lang_code: &str) -> Result<bool> {
        match BUNDLED.iter().find(|(code, _)| *code == lang_code) {
            Some((_, content)) => {
                self.insert_catalogue(lang_code, serde_json::from_str(content)?)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        self.insert_catalogue(lang_code, serde_json::from_str(&content)?)
    }

    fn insert_catalogue(&mut self, lang_code: &str, catalogue: Value) -> Result<()> {
        match catalogue {
            Value::Object(map) => {
                debug!("Loaded {} translation keys for {}", map.len(), lang_code);
                self.translations.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(DashboardError::Config(
                format!("Invalid translation file format for {}", lang_code)
            )),
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let found = self
            .get_translation_value(key, effective_lang)
            .or_else(|| self.get_translation_value(key, &self.default_language));

        match found {
            Some(translation) => {
                let text = self.extract_text_from_value(translation);
                self.format_message(&text, params)
            }
            None => {
                warn!("Translation key '{}' not found in any language", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with pluralization support
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = format!("{}.{}", key, self.get_plural_form(count, effective_lang));

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        self.t(&plural_key, effective_lang, Some(&final_params))
    }

    /// User-facing message for an error
    pub fn error_message(&self, error: &DashboardError, lang: &str) -> String {
        self.t(error.message_key(), lang, None)
    }

    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.iter().any(|l| l == lang)
    }

    fn get_effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Walk a dotted key through the nested catalogue
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.translations.get(lang)?.get(parts.next()?)?;

        for part in parts {
            current = current.get(part)?;
        }

        Some(current)
    }

    fn extract_text_from_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                if let Some(other) = obj.get("other") {
                    self.extract_text_from_value(other)
                } else if let Some((_, first_value)) = obj.iter().next() {
                    self.extract_text_from_value(first_value)
                } else {
                    String::new()
                }
            }
            _ => value.to_string(),
        }
    }

    fn format_message(&self, template: &str, params: Option<&TranslationParams>) -> String {
        match params {
            Some(params) => params.iter().fold(template.to_string(), |text, (key, value)| {
                text.replace(&format!("{{{}}}", key), value)
            }),
            None => template.to_string(),
        }
    }

    fn get_plural_form(&self, count: i64, lang: &str) -> &'static str {
        match lang {
            // Indonesian nouns do not inflect for number
            "id" => "other",
            _ => {
                if count == 1 { "one" } else { "other" }
            }
        }
    }

    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Pick a supported language from a locale tag such as `en-US`
    pub fn resolve_language(&self, locale: Option<&str>) -> String {
        if let Some(locale) = locale {
            let lang_code = locale.split(['-', '_']).next().unwrap_or(locale);

            if self.is_language_supported(lang_code) {
                return lang_code.to_string();
            }
        }

        self.default_language.clone()
    }

    pub fn get_stats(&self) -> TranslationStats {
        let mut stats = TranslationStats {
            languages: Vec::new(),
            total_keys: 0,
        };

        for (lang, translations) in &self.translations {
            let key_count = count_keys(translations);
            stats.languages.push(LanguageStats {
                code: lang.clone(),
                key_count,
            });
            if lang == &self.default_language {
                stats.total_keys = key_count;
            }
        }

        stats
    }
}

fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

/// Translation statistics
#[derive(Debug, Clone)]
pub struct TranslationStats {
    pub languages: Vec<LanguageStats>,
    pub total_keys: usize,
}

/// Language-specific statistics
#[derive(Debug, Clone)]
pub struct LanguageStats {
    pub code: String,
    pub key_count: usize,
}
