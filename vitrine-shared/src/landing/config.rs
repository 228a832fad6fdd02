//! Canonical landing page configuration
//!
//! A stored page has two overlapping shapes: nested JSON sections
//! (`content`, `integrations`, `seo`, `pixels`) and a set of flattened legacy
//! columns. [`LandingPageConfig`] is the single canonical form used while
//! editing:
//!
//! - **Load**: [`LandingPageConfig::from_record`] seeds defaults, overlays the
//!   legacy columns and then the nested sections, so every field is defined.
//! - **Edit**: [`LandingPageConfig::set_section_field`] and
//!   [`LandingPageConfig::set_top_level_field`] change exactly one field or
//!   fail without touching anything.
//! - **Save**: [`LandingPageConfig::to_payload`] emits the canonical state plus
//!   every legacy column recomputed from it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use thiserror::Error;
use validator::Validate;

use super::links::{format_whatsapp_link, validate_email_link, validate_whatsapp_link};
use super::slug::{is_valid_digital_name, normalize_digital_name};
use super::templates::{default_content, find_template, templates};
use super::Objective;
use crate::models::landing_page::LandingPageRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feature {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// The person presenting the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultantPersona {
    pub name: String,
    pub role: String,
    pub message: String,
    /// Public URL of an uploaded photo
    pub photo: String,
    pub instagram: String,
    pub facebook: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub headline: String,
    pub subheadline: String,
    pub video_url: String,
    pub cta_text: String,
    pub features: Vec<Feature>,
    pub how_it_works: Vec<Step>,
    pub faq: Vec<FaqItem>,
    pub consultant: ConsultantPersona,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Integrations {
    pub whatsapp_number: String,
    pub whatsapp_link: String,
    pub email_link: String,
    pub webhook_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub og_image: String,
}

/// Tracking pixel ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pixels {
    pub facebook_pixel_id: String,
    pub google_analytics_id: String,
    pub google_tag_manager_id: String,
    pub tiktok_pixel_id: String,
}

/// Nested sections of a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Content,
    Integrations,
    Seo,
    Pixels,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Content,
        Section::Integrations,
        Section::Seo,
        Section::Pixels,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Content => "content",
            Section::Integrations => "integrations",
            Section::Seo => "seo",
            Section::Pixels => "pixels",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editing errors; messages are shown to the page owner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Campo desconhecido: {0}")]
    UnknownField(String),

    #[error("Valor inválido para {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("{message}")]
    InvalidLink { field: &'static str, message: String },
}

/// A single field that blocks an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

/// Lifecycle of a page as seen by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandingPageState {
    /// Exists only in the editor
    UnsavedDraft,
    SavedUnpublished,
    Published,
}

/// Public base URLs, one per objective
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrlBases {
    pub client: String,
    pub consultant: String,
}

/// Public URL of a page: `<base for objective>/<digital name>`
pub fn page_url(bases: &PageUrlBases, objective: Objective, digital_name: &str) -> String {
    let base = match objective {
        Objective::Client => &bases.client,
        Objective::Consultant => &bases.consultant,
    };
    format!("{}/{}", base.trim_end_matches('/'), digital_name)
}

/// Body of `POST /landpages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateLandingPageRequest {
    #[validate(length(min = 1, max = 100, message = "Informe um nome digital"))]
    pub digital_name: String,

    pub objective: Objective,

    /// Falls back to the objective's first template
    #[serde(default)]
    pub template_id: Option<String>,
}

/// Canonical editor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageConfig {
    /// `None` until the page has been saved once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub digital_name: String,
    #[serde(default)]
    pub objective: Objective,
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub integrations: Integrations,
    #[serde(default)]
    pub seo: Seo,
    #[serde(default)]
    pub pixels: Pixels,
}

/// Flattened columns kept for older readers, derived from the canonical state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyColumns {
    pub digital_name: String,
    pub whatsapp_number: String,
    pub whatsapp_link: String,
    pub email_link: String,
    pub consultant_name: String,
    pub consultant_role: String,
    pub consultant_message: String,
    pub consultant_photo: String,
    pub instagram_url: String,
    pub facebook_url: String,
}

impl LegacyColumns {
    pub fn from_config(config: &LandingPageConfig) -> Self {
        let integrations = &config.integrations;
        let persona = &config.content.consultant;

        let whatsapp_link = if integrations.whatsapp_number.trim().is_empty() {
            integrations.whatsapp_link.clone()
        } else {
            format_whatsapp_link(&integrations.whatsapp_number)
        };

        Self {
            digital_name: config.digital_name.clone(),
            whatsapp_number: integrations.whatsapp_number.clone(),
            whatsapp_link,
            email_link: integrations.email_link.clone(),
            consultant_name: persona.name.clone(),
            consultant_role: persona.role.clone(),
            consultant_message: persona.message.clone(),
            consultant_photo: persona.photo.clone(),
            instagram_url: persona.instagram.clone(),
            facebook_url: persona.facebook.clone(),
        }
    }
}

/// Save-path body: canonical state plus legacy columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingPagePayload {
    #[serde(flatten)]
    pub config: LandingPageConfig,
    #[serde(flatten)]
    pub legacy: LegacyColumns,
}

impl LandingPageConfig {
    /// Fresh unsaved page seeded from a template
    pub fn draft(objective: Objective, digital_name: &str, template_id: Option<&str>) -> Self {
        let template = template_id
            .and_then(|id| find_template(objective, id))
            .or_else(|| templates(objective).first());

        let template_id = template.map(|t| t.id.clone()).unwrap_or_default();
        let content = template
            .map(|t| t.default_content.clone())
            .unwrap_or_default();

        Self {
            id: None,
            digital_name: normalize_digital_name(digital_name),
            objective,
            template_id,
            published: false,
            content,
            integrations: Integrations::default(),
            seo: Seo::default(),
            pixels: Pixels::default(),
        }
    }

    /// Builds the canonical state from a stored row
    ///
    /// Precedence per field: nested section, then legacy column, then the
    /// template/section default. JSON `null` and unknown keys are skipped;
    /// a stored key with the wrong type is logged and skipped.
    pub fn from_record(record: &LandingPageRecord) -> Self {
        let mut content = default_content(record.objective, &record.template_id);
        {
            let persona = &mut content.consultant;
            overlay_legacy(&mut persona.name, &record.consultant_name);
            overlay_legacy(&mut persona.role, &record.consultant_role);
            overlay_legacy(&mut persona.message, &record.consultant_message);
            overlay_legacy(&mut persona.photo, &record.consultant_photo);
            overlay_legacy(&mut persona.instagram, &record.instagram_url);
            overlay_legacy(&mut persona.facebook, &record.facebook_url);
        }

        let mut integrations = Integrations::default();
        overlay_legacy(&mut integrations.whatsapp_number, &record.whatsapp_number);
        overlay_legacy(&mut integrations.whatsapp_link, &record.whatsapp_link);
        overlay_legacy(&mut integrations.email_link, &record.email_link);

        let mut content = merge_section(content, stored(&record.content), Section::Content);
        let mut integrations =
            merge_section(integrations, stored(&record.integrations), Section::Integrations);

        // a nested leaf stored as "" still falls back to its legacy column
        {
            let persona = &mut content.consultant;
            fill_empty(&mut persona.name, &record.consultant_name);
            fill_empty(&mut persona.role, &record.consultant_role);
            fill_empty(&mut persona.message, &record.consultant_message);
            fill_empty(&mut persona.photo, &record.consultant_photo);
            fill_empty(&mut persona.instagram, &record.instagram_url);
            fill_empty(&mut persona.facebook, &record.facebook_url);
        }
        fill_empty(&mut integrations.whatsapp_number, &record.whatsapp_number);
        fill_empty(&mut integrations.whatsapp_link, &record.whatsapp_link);
        fill_empty(&mut integrations.email_link, &record.email_link);

        Self {
            id: Some(record.id),
            digital_name: record.digital_name.clone(),
            objective: record.objective,
            template_id: record.template_id.clone(),
            published: record.published,
            content,
            integrations,
            seo: merge_section(Seo::default(), stored(&record.seo), Section::Seo),
            pixels: merge_section(Pixels::default(), stored(&record.pixels), Section::Pixels),
        }
    }

    /// Sets one field of a section
    ///
    /// `field` uses the camelCase JSON name; nested persona fields are
    /// reached with a dotted path such as `consultant.name`. The two link
    /// fields go through [`Self::set_whatsapp_link`] and
    /// [`Self::set_email_link`].
    pub fn set_section_field(
        &mut self,
        section: Section,
        field: &str,
        value: Value,
    ) -> Result<(), ConfigError> {
        match (section, field) {
            (Section::Integrations, "whatsappLink") => {
                let raw: String = typed("integrations.whatsappLink", value)?;
                self.set_whatsapp_link(&raw)
            }
            (Section::Integrations, "emailLink") => {
                let raw: String = typed("integrations.emailLink", value)?;
                self.set_email_link(&raw)
            }
            (Section::Content, _) => set_field(&mut self.content, section, field, value),
            (Section::Integrations, _) => set_field(&mut self.integrations, section, field, value),
            (Section::Seo, _) => set_field(&mut self.seo, section, field, value),
            (Section::Pixels, _) => set_field(&mut self.pixels, section, field, value),
        }
    }

    /// Sets one top-level scalar (`digitalName`, `objective`, `templateId`, `published`)
    pub fn set_top_level_field(&mut self, field: &str, value: Value) -> Result<(), ConfigError> {
        match field {
            "digitalName" => self.digital_name = typed(field, value)?,
            "objective" => self.objective = typed(field, value)?,
            "templateId" => self.template_id = typed(field, value)?,
            "published" => self.published = typed(field, value)?,
            other => return Err(ConfigError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Formats then validates a WhatsApp link before storing it
    pub fn set_whatsapp_link(&mut self, raw: &str) -> Result<(), ConfigError> {
        let link = format_whatsapp_link(raw);
        let validation = validate_whatsapp_link(&link);
        if !validation.is_valid {
            return Err(ConfigError::InvalidLink {
                field: "integrations.whatsappLink",
                message: validation.message,
            });
        }
        self.integrations.whatsapp_link = link;
        Ok(())
    }

    pub fn set_email_link(&mut self, raw: &str) -> Result<(), ConfigError> {
        let link = raw.trim();
        let validation = validate_email_link(link);
        if !validation.is_valid {
            return Err(ConfigError::InvalidLink {
                field: "integrations.emailLink",
                message: validation.message,
            });
        }
        self.integrations.email_link = link.to_string();
        Ok(())
    }

    /// Applies a JSON update body field by field, all or nothing
    ///
    /// Section objects are walked down to their leaves so a partial body
    /// never resets siblings. `id` and the flattened legacy keys are
    /// ignored: they are derived, not edited.
    pub fn apply_update(&mut self, body: &Value) -> Result<(), ConfigError> {
        let Value::Object(body) = body else {
            return Err(ConfigError::InvalidValue {
                field: "body".to_string(),
                message: "esperado um objeto JSON".to_string(),
            });
        };

        let mut next = self.clone();
        for (key, value) in body {
            if value.is_null() {
                continue;
            }

            if let Some(section) = Section::parse(key) {
                let mut leaves = Vec::new();
                collect_leaves(String::new(), value, &mut leaves);
                for (path, leaf) in leaves {
                    if path.is_empty() {
                        return Err(ConfigError::InvalidValue {
                            field: section.to_string(),
                            message: "esperado um objeto JSON".to_string(),
                        });
                    }
                    next.set_section_field(section, &path, leaf)?;
                }
                continue;
            }

            match key.as_str() {
                "digitalName" | "objective" | "templateId" | "published" => {
                    next.set_top_level_field(key, value.clone())?
                }
                _ => tracing::trace!(key = %key, "ignoring derived or unknown key"),
            }
        }

        *self = next;
        Ok(())
    }

    pub fn to_payload(&self) -> LandingPagePayload {
        LandingPagePayload {
            config: self.clone(),
            legacy: LegacyColumns::from_config(self),
        }
    }

    pub fn state(&self) -> LandingPageState {
        match (self.id, self.published) {
            (None, _) => LandingPageState::UnsavedDraft,
            (Some(_), false) => LandingPageState::SavedUnpublished,
            (Some(_), true) => LandingPageState::Published,
        }
    }

    pub fn page_url(&self, bases: &PageUrlBases) -> String {
        page_url(bases, self.objective, &self.digital_name)
    }

    /// Fields that must be fixed before the page can be published
    pub fn publish_problems(&self) -> Vec<FieldProblem> {
        let mut problems = Vec::new();

        if !is_valid_digital_name(&self.digital_name) {
            problems.push(FieldProblem {
                field: "digitalName".to_string(),
                message: "Nome digital inválido".to_string(),
            });
        }
        if self.content.headline.trim().is_empty() {
            problems.push(FieldProblem {
                field: "content.headline".to_string(),
                message: "Informe o título da página".to_string(),
            });
        }

        let whatsapp = validate_whatsapp_link(&self.integrations.whatsapp_link);
        if !whatsapp.is_valid {
            problems.push(FieldProblem {
                field: "integrations.whatsappLink".to_string(),
                message: whatsapp.message,
            });
        }
        let email = validate_email_link(&self.integrations.email_link);
        if !email.is_valid {
            problems.push(FieldProblem {
                field: "integrations.emailLink".to_string(),
                message: email.message,
            });
        }

        problems
    }
}

fn stored(section: &Option<Json<Value>>) -> Option<&Value> {
    section.as_ref().map(|json| &json.0)
}

fn overlay_legacy(target: &mut String, legacy: &Option<String>) {
    if let Some(value) = legacy.as_deref().filter(|v| !v.is_empty()) {
        *target = value.to_string();
    }
}

fn fill_empty(target: &mut String, legacy: &Option<String>) {
    if target.is_empty() {
        overlay_legacy(target, legacy);
    }
}

/// Recursive merge in JSON space: objects merge key by key, `null` is absent,
/// keys unknown to `slot` are dropped, anything else replaces
fn merge_value(slot: &mut Value, incoming: &Value) {
    match (slot, incoming) {
        (_, Value::Null) => {}
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, value) in incoming {
                if let Some(inner) = current.get_mut(key) {
                    merge_value(inner, value);
                }
            }
        }
        (slot, incoming) => *slot = incoming.clone(),
    }
}

fn merge_section<T>(base: T, stored: Option<&Value>, section: Section) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(Value::Object(stored)) = stored else {
        return base;
    };

    let mut merged = base;
    for (field, value) in stored {
        let mut candidate = match serde_json::to_value(&merged) {
            Ok(Value::Object(map)) => map,
            _ => return merged,
        };
        let Some(slot) = candidate.get_mut(field) else {
            continue;
        };
        merge_value(slot, value);

        match serde_json::from_value(Value::Object(candidate)) {
            Ok(next) => merged = next,
            Err(e) => tracing::warn!(
                section = %section,
                field = %field,
                error = %e,
                "Skipping stored landing page field with unexpected type"
            ),
        }
    }
    merged
}

fn set_path(object: &mut Map<String, Value>, path: &[&str], value: Value) -> bool {
    match path {
        [last] => match object.get_mut(*last) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
        [head, rest @ ..] => match object.get_mut(*head) {
            Some(Value::Object(inner)) => set_path(inner, rest, value),
            _ => false,
        },
        [] => false,
    }
}

fn set_field<T>(target: &mut T, section: Section, field: &str, value: Value) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let qualified = format!("{section}.{field}");

    let mut object = match serde_json::to_value(&*target) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ConfigError::UnknownField(qualified)),
    };

    let path: Vec<&str> = field.split('.').collect();
    if !set_path(&mut object, &path, value) {
        return Err(ConfigError::UnknownField(qualified));
    }

    *target = serde_json::from_value(Value::Object(object)).map_err(|e| {
        ConfigError::InvalidValue {
            field: qualified,
            message: e.to_string(),
        }
    })?;
    Ok(())
}

fn typed<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Flattens nested objects into dotted `(path, leaf)` pairs; arrays are leaves
fn collect_leaves(prefix: String, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, inner) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(path, inner, out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}
