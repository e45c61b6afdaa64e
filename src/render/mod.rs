use colored::Colorize;

use crate::store::Record;

/// Display collaborator. Implementations have no write access to core state;
/// the session hands them final record lists.
pub trait Renderer {
    /// Replaces the currently displayed cards.
    fn render_list(&mut self, records: &[Record]);
    /// Opens a detail view for one record.
    fn render_detail(&mut self, record: &Record);
    fn render_error(&mut self, message: &str);
    fn render_empty(&mut self, message: &str);
}

/// Category a record falls back to when none of its categories have a tint.
pub const DEFAULT_CATEGORY: &str = "normal";

/// Category tints, in lookup priority order.
const CATEGORY_TINTS: &[(&str, (u8, u8, u8))] = &[
    ("fire", (253, 223, 223)),
    ("grass", (222, 253, 224)),
    ("electric", (252, 247, 222)),
    ("water", (222, 243, 253)),
    ("ground", (244, 231, 218)),
    ("rock", (213, 213, 212)),
    ("fairy", (252, 234, 255)),
    ("poison", (152, 215, 165)),
    ("bug", (248, 213, 163)),
    ("dragon", (151, 179, 230)),
    ("psychic", (234, 237, 161)),
    ("flying", (245, 245, 245)),
    ("fighting", (230, 224, 212)),
    ("normal", (245, 245, 245)),
];

pub fn category_tint(category: &str) -> Option<(u8, u8, u8)> {
    CATEGORY_TINTS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, tint)| *tint)
}

/// The first palette category the record carries, or [`DEFAULT_CATEGORY`].
/// Priority follows the palette order, not the record's own category order.
pub fn primary_category(record: &Record) -> &'static str {
    CATEGORY_TINTS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| record.categories.iter().any(|c| c == name))
        .unwrap_or(DEFAULT_CATEGORY)
}

pub fn display_name(record: &Record) -> String {
    let mut chars = record.name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Renders record cards as colored terminal lines.
#[derive(Debug, Default)]
pub struct TermRenderer;

impl TermRenderer {
    pub fn new() -> Self {
        Self
    }

    fn card_line(record: &Record) -> String {
        let category = primary_category(record);
        let tag = match category_tint(category) {
            Some((r, g, b)) => format!(" {} ", category).black().on_truecolor(r, g, b),
            None => category.normal(),
        };
        format!(
            "  {}  {:<14} {}",
            format!("#{:03}", record.id).bold(),
            display_name(record),
            tag
        )
    }
}

impl Renderer for TermRenderer {
    fn render_list(&mut self, records: &[Record]) {
        println!();
        for record in records {
            println!("{}", Self::card_line(record));
        }
        println!();
        println!(":: {} record(s) shown", records.len());
    }

    fn render_detail(&mut self, record: &Record) {
        println!();
        println!("{}", Self::card_line(record));
        println!(":: {:<16}: {}", "id", record.id);
        println!(":: {:<16}: {}", "name", display_name(record));
        println!(":: {:<16}: {}", "categories", record.categories.join(", "));
        if let Some(height) = record.height {
            println!(":: {:<16}: {}", "height", height);
        }
        if let Some(weight) = record.weight {
            println!(":: {:<16}: {}", "weight", weight);
        }
        if let Some(xp) = record.base_experience {
            println!(":: {:<16}: {}", "base experience", xp);
        }
    }

    fn render_error(&mut self, message: &str) {
        eprintln!("{} {}", "error ::".bold().red(), message);
    }

    fn render_empty(&mut self, message: &str) {
        println!("{} {}", "::".bold(), message.italic());
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    List(Vec<Record>),
    Detail(Record),
    Error(String),
    Empty(String),
}

/// Test double that records every call it receives.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn render_list(&mut self, records: &[Record]) {
        self.events.push(RenderEvent::List(records.to_vec()));
    }

    fn render_detail(&mut self, record: &Record) {
        self.events.push(RenderEvent::Detail(record.clone()));
    }

    fn render_error(&mut self, message: &str) {
        self.events.push(RenderEvent::Error(message.to_string()));
    }

    fn render_empty(&mut self, message: &str) {
        self.events.push(RenderEvent::Empty(message.to_string()));
    }
}
