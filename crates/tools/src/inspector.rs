use quill_common::EntityKey;
use quill_compose::Tracked;
use quill_history::HistorySeries;
use quill_model::Entity;
use std::fmt::Write as _;

/// Entity inspector for developer tooling.
///
/// Read-only queries over a composed entity, for the CLI and for debugging.
pub struct EntityInspector;

impl EntityInspector {
    /// Produce a summary of a tracked entity.
    pub fn summary(entity: &Tracked) -> EntitySummary {
        EntitySummary {
            type_name: entity.type_name().to_string(),
            key: entity.key(),
            attributes: entity.record().len(),
            declared: entity.schema().len(),
            versions: entity.history().len(),
            journal_entries: entity.journal().len(),
            latest_action: entity
                .history()
                .latest()
                .map(|snap| snap.action().to_string()),
        }
    }

    /// Declared attributes with their current values, in schema order.
    /// Unset attributes show as `-`.
    pub fn attributes<E: Entity + ?Sized>(entity: &E) -> Vec<(String, String)> {
        entity
            .schema()
            .attribute_names()
            .map(|name| {
                let shown = entity
                    .value_of(name)
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                (name.to_string(), shown)
            })
            .collect()
    }

    /// One numbered line per version, each followed by the attributes changed
    /// since the previous version when there are any.
    pub fn history_report(series: &HistorySeries) -> String {
        let mut out = String::new();
        for change in series.changelog() {
            let _ = writeln!(
                out,
                "{}. [{}] {}",
                change.index + 1,
                change.timestamp.display_seconds(),
                change.action
            );
            if !change.changed.is_empty() {
                let names: Vec<&str> = change.changed.iter().map(String::as_str).collect();
                let _ = writeln!(out, "   Changes: {}", names.join(", "));
            }
        }
        out
    }
}

/// Summary of a tracked entity for the inspector.
#[derive(Debug, Clone)]
pub struct EntitySummary {
    pub type_name: String,
    pub key: EntityKey,
    /// Attributes currently set.
    pub attributes: usize,
    /// Attributes the schema declares.
    pub declared: usize,
    pub versions: usize,
    pub journal_entries: usize,
    pub latest_action: Option<String>,
}

impl std::fmt::Display for EntitySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] attributes={}/{} versions={} journal={} latest={}",
            self.type_name,
            self.key.short(),
            self.attributes,
            self.declared,
            self.versions,
            self.journal_entries,
            self.latest_action.as_deref().unwrap_or("-"),
        )
    }
}
