//! Editable-field tags for in-context editing.
//!
//! Each tagged object gains a `$` map from field name to a `data-cslp` path
//! (`<content_type>.<uid>.<locale>.<field path>`), which the live-preview
//! bridge in the browser uses to locate the field being edited. Array items
//! get `field__<index>` tags plus a `field__parent` tag, and referenced
//! entries inside arrays restart the path at their own content type and uid.

use serde_json::{Map, Value};

use pagestack_shared::{EDITABLE_TAGS_KEY, Entry};

/// Locale used in tag paths when none is configured.
pub const DEFAULT_LOCALE: &str = "en-us";

const FIELD_ATTR: &str = "data-cslp";
const PARENT_ATTR: &str = "data-cslp-parent-field";

/// How tag values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// `{"data-cslp": "<path>"}`, spread as props by component renderers.
    #[default]
    Object,
    /// `"data-cslp=<path>"`, for string-templated HTML.
    Attribute,
}

impl std::str::FromStr for TagStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "object" => Ok(Self::Object),
            "attr" | "attribute" => Ok(Self::Attribute),
            other => Err(format!("unknown tag style '{other}': expected 'object' or 'attr'")),
        }
    }
}

/// Return a copy of `entry` annotated with editable-field tags.
///
/// The input is left untouched. Existing `$` maps are replaced.
pub fn add_editable_tags(
    entry: &Entry,
    content_type_uid: &str,
    locale: &str,
    style: TagStyle,
) -> Entry {
    let mut fields = entry.0.clone();
    let prefix = format!(
        "{content_type_uid}.{}.{locale}",
        entry.uid().unwrap_or_default()
    );

    let tags = tag_object(&mut fields, &prefix, locale, style);
    fields.insert(EDITABLE_TAGS_KEY.to_string(), Value::Object(tags));
    Entry(fields)
}

fn tag_object(
    object: &mut Map<String, Value>,
    prefix: &str,
    locale: &str,
    style: TagStyle,
) -> Map<String, Value> {
    let mut tags = Map::new();

    for (key, value) in object.iter_mut() {
        if key == EDITABLE_TAGS_KEY {
            continue;
        }
        let path = format!("{prefix}.{key}");

        match value {
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    let item_path = format!("{path}.{index}");
                    tags.insert(
                        format!("{key}__{index}"),
                        tag_value(FIELD_ATTR, &item_path, style),
                    );
                    tags.insert(format!("{key}__parent"), tag_value(PARENT_ATTR, &path, style));

                    if let Value::Object(child) = item {
                        let child_prefix = reference_prefix(child, locale).unwrap_or(item_path);
                        attach(child, &child_prefix, locale, style);
                    }
                }
            }
            Value::Object(child) => attach(child, &path, locale, style),
            _ => {}
        }

        tags.insert(key.clone(), tag_value(FIELD_ATTR, &path, style));
    }

    tags
}

fn attach(object: &mut Map<String, Value>, prefix: &str, locale: &str, style: TagStyle) {
    let tags = tag_object(object, prefix, locale, style);
    object.insert(EDITABLE_TAGS_KEY.to_string(), Value::Object(tags));
}

/// Tag prefix for a referenced entry embedded in an array.
fn reference_prefix(object: &Map<String, Value>, locale: &str) -> Option<String> {
    let content_type = object.get("_content_type_uid")?.as_str()?;
    let uid = object.get("uid")?.as_str()?;
    let locale = object
        .get("locale")
        .and_then(Value::as_str)
        .unwrap_or(locale);
    Some(format!("{content_type}.{uid}.{locale}"))
}

fn tag_value(attr: &str, path: &str, style: TagStyle) -> Value {
    match style {
        TagStyle::Object => {
            let mut map = Map::new();
            map.insert(attr.to_string(), Value::String(path.to_string()));
            Value::Object(map)
        }
        TagStyle::Attribute => Value::String(format!("{attr}={path}")),
    }
}
