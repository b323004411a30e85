/// Replace typographic characters the engine's parsers reject with ASCII:
/// en dash (U+2013) becomes `-` and right single quote (U+2019) becomes `'`.
#[must_use]
pub fn normalize_source(source: &str) -> String {
    source.replace('\u{2013}', "-").replace('\u{2019}', "'")
}
