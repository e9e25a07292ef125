use crate::json::compact;
use quill_history::HistorySeries;
use quill_model::{Entity, Value};

/// Compact XML document rooted at the entity's type name.
///
/// One child element per declared attribute; unset attributes give an empty
/// element. A non-empty history adds `<history>` with one `entry_N` per
/// snapshot.
pub fn to_xml<E: Entity + ?Sized>(entity: &E, history: Option<&HistorySeries>) -> String {
    let mut out = String::new();
    let root = entity.type_name();
    out.push('<');
    out.push_str(root);
    out.push('>');
    write_attributes(&mut out, entity);
    if let Some(series) = history.filter(|s| !s.is_empty()) {
        out.push_str("<history>");
        for (i, snap) in series.snapshots().iter().enumerate() {
            let tag = format!("entry_{i}");
            open(&mut out, &tag);
            element(&mut out, "timestamp", &snap.timestamp().to_iso8601());
            element(&mut out, "action", snap.action());
            close(&mut out, &tag);
        }
        out.push_str("</history>");
    }
    close(&mut out, root);
    out
}

fn write_attributes<E: Entity + ?Sized>(out: &mut String, entity: &E) {
    for name in entity.schema().attribute_names() {
        match entity.value_of(name) {
            None => {
                out.push('<');
                out.push_str(name);
                out.push_str(" />");
            }
            Some(Value::Record(nested)) => {
                open(out, name);
                write_attributes(out, &**nested);
                close(out, name);
            }
            Some(value @ Value::List(_)) => element(out, name, &compact(value)),
            Some(value) => element(out, name, &value.to_string()),
        }
    }
}

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn element(out: &mut String, tag: &str, text: &str) {
    open(out, tag);
    escape_into(out, text);
    close(out, tag);
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
