// src/ui/wizard.rs
use anyhow::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use super::{radio_mark, row_rect, run_form, Form, FormEvent, FormStatus, Theme};
use crate::config::{Config, ConfigStore, ConfigUpdate};
use crate::provider::{Provider, OLLAMA_SERVICE};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid URL pattern"));

const LABEL_COLUMN: u16 = 2;
const INPUT_COLUMN: u16 = 25;
const PROVIDER_ROW: u16 = 1;
const FIELD_SPACING: u16 = 2;

// =============================================================================
// FIELDS
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Credential,
    Model,
    ResultCount,
    CustomUrl,
    CustomApiKey,
}

impl FieldId {
    /// Declaration order; also the order of the focus cycle.
    pub const ALL: [FieldId; 5] = [
        FieldId::Credential,
        FieldId::Model,
        FieldId::ResultCount,
        FieldId::CustomUrl,
        FieldId::CustomApiKey,
    ];

    fn is_secret(self, provider: Provider) -> bool {
        match self {
            FieldId::Credential => !provider.credential_is_url(),
            FieldId::CustomApiKey => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub label: String,
    /// Row inside the form body, recomputed whenever visibility changes.
    pub row: u16,
    pub value: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Provider(usize),
    Field(FieldId),
    Submit,
}

// =============================================================================
// STATE
// =============================================================================
/// Provider settings form. Exactly one provider is checked at all times.
#[derive(Debug, Clone)]
pub struct SettingsWizard {
    provider: Provider,
    fields: Vec<FieldDescriptor>,
    focus: Focus,
    error: Option<String>,
}

impl SettingsWizard {
    /// Prefills every field from the stored config.
    pub fn new(config: &Config) -> Self {
        let provider = Provider::from_name(&config.provider).unwrap_or(
            if config.provider_api_key.trim().is_empty() {
                Provider::OpenAi
            } else {
                Provider::Gemini
            },
        );

        let credential = match provider {
            Provider::Ollama => {
                let url = config.provider_url.trim().trim_end_matches('/');
                let url = url.strip_suffix("/v1").unwrap_or(url);
                let url = if url.is_empty() { OLLAMA_SERVICE } else { url };
                url.to_string()
            }
            Provider::Custom => String::new(),
            _ => config.provider_api_key.clone(),
        };
        let (custom_url, custom_key) = if provider == Provider::Custom {
            (config.provider_url.clone(), config.provider_api_key.clone())
        } else {
            (String::new(), String::new())
        };
        let model = if config.model.trim().is_empty() {
            provider.default_model().unwrap_or_default().to_string()
        } else {
            config.model.clone()
        };

        let field = |id, label: &str, value: String| FieldDescriptor {
            id,
            label: label.to_string(),
            row: 0,
            value,
            visible: true,
        };

        let mut wizard = Self {
            provider,
            fields: vec![
                field(FieldId::Credential, "", credential),
                field(FieldId::Model, "Model:", model),
                field(FieldId::ResultCount, "Result Count:", config.result_count().to_string()),
                field(FieldId::CustomUrl, "Custom URL:", custom_url),
                field(FieldId::CustomApiKey, "Custom API Key:", custom_key),
            ],
            focus: Focus::Provider(provider_index(provider)),
            error: None,
        };
        wizard.refresh_fields();
        wizard
    }

    /// Shows the form; on submit persists the update. `true` when saved.
    pub fn run(store: &ConfigStore) -> Result<bool> {
        let mut wizard = Self::new(&store.load());
        let submitted = run_form(&mut wizard)?;
        persist(store, submitted)
    }

    #[cfg(test)]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[cfg(test)]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // `fields` is kept in `FieldId` declaration order.
    pub fn field(&self, id: FieldId) -> &FieldDescriptor {
        &self.fields[id as usize]
    }

    fn field_mut(&mut self, id: FieldId) -> &mut FieldDescriptor {
        &mut self.fields[id as usize]
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.visible)
    }

    // -------------------------------------------------------------------------
    // transitions
    // -------------------------------------------------------------------------

    /// Checks `provider`, re-evaluates visibility and labels, and loads the
    /// provider's default model.
    pub fn select_provider(&mut self, provider: Provider) {
        let previous = self.provider;
        self.provider = provider;
        self.error = None;

        if let Some(model) = provider.default_model() {
            self.field_mut(FieldId::Model).value = model.to_string();
        }
        // The credential box means something else after a URL/key switch.
        if previous.credential_is_url() != provider.credential_is_url() {
            self.field_mut(FieldId::Credential).value = if provider.credential_is_url() {
                OLLAMA_SERVICE.to_string()
            } else {
                String::new()
            };
        }
        self.refresh_fields();
    }

    fn refresh_fields(&mut self) {
        let provider = self.provider;
        let custom = provider == Provider::Custom;
        let mut row = PROVIDER_ROW + Provider::ALL.len() as u16 + 1;

        for field in &mut self.fields {
            field.visible = match field.id {
                FieldId::Credential => !custom,
                FieldId::CustomUrl | FieldId::CustomApiKey => custom,
                FieldId::Model | FieldId::ResultCount => true,
            };
            if field.id == FieldId::Credential {
                field.label = provider.credential_label();
            }
            if field.visible {
                field.row = row;
                row += FIELD_SPACING;
            }
        }

        if let Focus::Field(id) = self.focus {
            if !self.field(id).visible {
                self.focus = self.next_after(Focus::Field(id));
            }
        }
    }

    /// Provider radios, visible fields in declaration order, then submit.
    pub fn focus_ring(&self) -> Vec<Focus> {
        (0..Provider::ALL.len())
            .map(Focus::Provider)
            .chain(self.visible_fields().map(|f| Focus::Field(f.id)))
            .chain(std::iter::once(Focus::Submit))
            .collect()
    }

    fn next_after(&self, from: Focus) -> Focus {
        let ring = self.focus_ring();
        match ring.iter().position(|f| *f == from) {
            Some(i) => ring[(i + 1) % ring.len()],
            None => {
                // `from` is a field that was just hidden: next visible one in declaration order.
                let Focus::Field(id) = from else {
                    return Focus::Submit;
                };
                self.next_visible_field(id)
            }
        }
    }

    fn prev_before(&self, from: Focus) -> Focus {
        let ring = self.focus_ring();
        let i = ring.iter().position(|f| *f == from).unwrap_or(0);
        ring[(i + ring.len() - 1) % ring.len()]
    }

    /// Next visible field after `id`, or submit when none remain.
    pub fn next_visible_field(&self, id: FieldId) -> Focus {
        let start = FieldId::ALL.iter().position(|f| *f == id).unwrap_or(0);
        FieldId::ALL[start + 1..]
            .iter()
            .find(|f| self.field(**f).visible)
            .map(|f| Focus::Field(*f))
            .unwrap_or(Focus::Submit)
    }

    fn submit(&mut self) -> FormStatus<ConfigUpdate> {
        match self.submission() {
            Ok(update) => FormStatus::Submitted(update),
            Err(message) => {
                self.error = Some(message);
                FormStatus::Active
            }
        }
    }

    /// Config update for the current form contents.
    pub fn submission(&self) -> Result<ConfigUpdate, String> {
        let value = |id| self.field(id).value.trim().to_string();

        let model = value(FieldId::Model);
        if model.is_empty() {
            return Err("Model cannot be empty.".into());
        }
        let size = value(FieldId::ResultCount)
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .unwrap_or(1);

        let (provider_url, provider_api_key) = match self.provider {
            Provider::Ollama => {
                let url = value(FieldId::Credential);
                let url = if url.is_empty() { OLLAMA_SERVICE.to_string() } else { url };
                check_url(&url, "Ollama URL")?;
                let base = url.trim_end_matches('/');
                let base = base.strip_suffix("/v1").unwrap_or(base);
                (format!("{}/v1", base), "ollama".to_string())
            }
            Provider::Custom => {
                let url = value(FieldId::CustomUrl);
                check_url(&url, "Custom URL")?;
                (url, value(FieldId::CustomApiKey))
            }
            builtin => {
                let key = value(FieldId::Credential);
                if key.is_empty() {
                    return Err(format!("{} API key cannot be empty.", builtin.label()));
                }
                (builtin.base_url().unwrap_or_default().to_string(), key)
            }
        };

        Ok(ConfigUpdate {
            provider: Some(self.provider.label().to_string()),
            provider_api_key: Some(provider_api_key),
            provider_url: Some(provider_url),
            model: Some(model),
            message_spec: None,
            size_option: Some(size),
        })
    }

    // -------------------------------------------------------------------------
    // layout
    // -------------------------------------------------------------------------

    fn body(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        })
    }

    fn submit_row(&self) -> u16 {
        self.visible_fields()
            .map(|f| f.row)
            .max()
            .unwrap_or(PROVIDER_ROW + Provider::ALL.len() as u16)
            + FIELD_SPACING
    }
}

/// Writes a submitted update through the store. A cancelled form (`None`)
/// leaves the file untouched.
pub fn persist(store: &ConfigStore, submitted: Option<ConfigUpdate>) -> Result<bool> {
    let Some(update) = submitted else {
        return Ok(false);
    };
    let saved = store.update(update)?;
    info!(provider = %saved.provider, model = %saved.model, "provider settings saved");
    Ok(true)
}

fn provider_index(provider: Provider) -> usize {
    Provider::ALL
        .iter()
        .position(|p| *p == provider)
        .unwrap_or(0)
}

fn check_url(url: &str, what: &str) -> Result<(), String> {
    if URL_PATTERN.is_match(url) {
        Ok(())
    } else {
        Err(format!("{} must look like http(s)://host[:port][/path].", what))
    }
}

// =============================================================================
// FORM
// =============================================================================
impl Form for SettingsWizard {
    type Output = ConfigUpdate;

    fn update(&mut self, event: FormEvent) -> FormStatus<ConfigUpdate> {
        match event {
            FormEvent::Cancel => return FormStatus::Cancelled,
            FormEvent::Tab => {
                self.focus = self.next_after(self.focus);
                return FormStatus::Active;
            }
            FormEvent::BackTab => {
                self.focus = self.prev_before(self.focus);
                return FormStatus::Active;
            }
            FormEvent::Click(slot) => {
                let Some(target) = self.focus_ring().get(slot).copied() else {
                    return FormStatus::Active;
                };
                self.focus = target;
                return match target {
                    Focus::Provider(i) => {
                        self.select_provider(Provider::ALL[i]);
                        FormStatus::Active
                    }
                    Focus::Field(_) => FormStatus::Active,
                    Focus::Submit => self.submit(),
                };
            }
            _ => {}
        }

        match self.focus {
            Focus::Provider(i) => match event {
                FormEvent::Up => self.focus = Focus::Provider(i.saturating_sub(1)),
                FormEvent::Down => {
                    self.focus = Focus::Provider((i + 1).min(Provider::ALL.len() - 1))
                }
                FormEvent::Confirm | FormEvent::Char(' ') => {
                    self.select_provider(Provider::ALL[i])
                }
                _ => {}
            },
            Focus::Field(id) => match event {
                FormEvent::Char(c) => self.field_mut(id).value.push(c),
                FormEvent::Backspace => {
                    self.field_mut(id).value.pop();
                }
                FormEvent::Confirm => self.focus = self.next_visible_field(id),
                FormEvent::Down => self.focus = self.next_after(self.focus),
                FormEvent::Up => self.focus = self.prev_before(self.focus),
                _ => {}
            },
            Focus::Submit => match event {
                FormEvent::Confirm | FormEvent::Char(' ') => return self.submit(),
                FormEvent::Up => self.focus = self.prev_before(self.focus),
                _ => {}
            },
        }
        FormStatus::Active
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        if let Some(header) = row_rect(area, 0, 0) {
            frame.render_widget(
                Paragraph::new(" AI Provider Configuration").style(Theme::HEADER),
                header,
            );
        }
        let outer = Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        };
        frame.render_widget(Block::default().borders(Borders::ALL), outer);
        let body = Self::body(area);

        if let Some(rect) = row_rect(body, LABEL_COLUMN, PROVIDER_ROW) {
            frame.render_widget(Paragraph::new("Provider:"), rect);
        }
        for (i, provider) in Provider::ALL.iter().enumerate() {
            let Some(rect) = row_rect(body, INPUT_COLUMN, PROVIDER_ROW + i as u16) else {
                break;
            };
            let checked = *provider == self.provider;
            let mut line = Line::from(vec![
                Span::styled(
                    radio_mark(checked),
                    if checked { Theme::CHECKED } else { Default::default() },
                ),
                Span::raw(provider.label()),
            ]);
            if self.focus == Focus::Provider(i) {
                line = line.style(Theme::FOCUS);
            }
            frame.render_widget(Paragraph::new(line), rect);
        }

        for field in self.visible_fields() {
            if let Some(rect) = row_rect(body, LABEL_COLUMN, field.row) {
                frame.render_widget(Paragraph::new(field.label.as_str()), rect);
            }
            let Some(rect) = row_rect(body, INPUT_COLUMN, field.row) else {
                continue;
            };
            let shown = if field.id.is_secret(self.provider) {
                "*".repeat(field.value.chars().count())
            } else {
                field.value.clone()
            };
            let focused = self.focus == Focus::Field(field.id);
            let style = if focused { Theme::FOCUS } else { Default::default() };
            let width = rect.width.saturating_sub(LABEL_COLUMN);
            let input = Rect { width, ..rect };
            frame.render_widget(Paragraph::new(shown.as_str()).style(style), input);
            if focused {
                let cursor = (shown.chars().count() as u16).min(width.saturating_sub(1));
                frame.set_cursor_position((input.x + cursor, input.y));
            }
        }

        let submit_row = self.submit_row();
        if let Some(rect) = row_rect(body, INPUT_COLUMN, submit_row) {
            let style = if self.focus == Focus::Submit { Theme::FOCUS } else { Default::default() };
            frame.render_widget(Paragraph::new("[ Submit ]").style(style), rect);
        }
        if let Some(error) = &self.error {
            if let Some(rect) = row_rect(body, LABEL_COLUMN, submit_row + 2) {
                frame.render_widget(Paragraph::new(error.as_str()).style(Theme::ERROR), rect);
            }
        }
        if let Some(rect) = row_rect(body, LABEL_COLUMN, body.height.saturating_sub(1)) {
            frame.render_widget(
                Paragraph::new("Tab: next field  Enter: select/next/submit  Esc: cancel")
                    .style(Theme::HINT),
                rect,
            );
        }
    }

    fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<FormEvent> {
        let body = Self::body(area);
        if column < body.x + LABEL_COLUMN || row < body.y {
            return None;
        }
        let (x, y) = (column - body.x, row - body.y);
        let ring = self.focus_ring();
        let slot = |focus: Focus| ring.iter().position(|f| *f == focus);

        if x >= INPUT_COLUMN && (PROVIDER_ROW..PROVIDER_ROW + Provider::ALL.len() as u16).contains(&y) {
            return slot(Focus::Provider((y - PROVIDER_ROW) as usize)).map(FormEvent::Click);
        }
        if let Some(field) = self.visible_fields().find(|f| f.row == y) {
            return slot(Focus::Field(field.id)).map(FormEvent::Click);
        }
        if x >= INPUT_COLUMN && y == self.submit_row() {
            return slot(Focus::Submit).map(FormEvent::Click);
        }
        None
    }
}
