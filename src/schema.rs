//! Exact-key-set validation for loosely typed objects.
//!
//! A [`Schema`] names every field an object must carry and a pattern each
//! value must match. Config objects and upload arguments are both checked
//! through it before anything typed is built from them.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static ENVIRONMENT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(&[
        ("envName", r"(?s)^.+$"),
        ("confluenceBaseUrl", r"^(https?)://[^\s$.?#].[^\s]*[^/]$"),
        ("username", r"(?s)^.+$"),
        ("password", r"(?s)^.+$"),
        ("scope", r"(?s)^.+$"),
    ])
    .expect("environment schema patterns are valid")
});

static UPLOAD: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(&[
        ("targetPath", r"^(\w+/)*$"),
        ("sourcePath", r"^(\w+/)*$"),
        ("globString", r"(?s)^.+$"),
    ])
    .expect("upload schema patterns are valid")
});

#[derive(Debug)]
pub struct Schema {
    fields: Vec<(String, Regex)>,
}

impl Schema {
    pub fn new(fields: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let fields = fields
            .iter()
            .map(|(name, pattern)| Ok(((*name).to_string(), Regex::new(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { fields })
    }

    /// Schema of an environment configuration object.
    pub fn environment() -> &'static Schema {
        &ENVIRONMENT
    }

    /// Schema of the argument object passed to an upload.
    pub fn upload() -> &'static Schema {
        &UPLOAD
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// True iff `candidate` has exactly this schema's keys and every value
    /// is a string matching its field's pattern.
    pub fn validate(&self, candidate: &Map<String, Value>) -> bool {
        self.mismatch(candidate).is_none()
    }

    /// Describes the first violation found, or `None` if the candidate is valid.
    pub fn mismatch(&self, candidate: &Map<String, Value>) -> Option<String> {
        let missing: Vec<&str> = self
            .field_names()
            .filter(|name| !candidate.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Some(format!("missing fields: {}", missing.join(", ")));
        }

        let extra: Vec<&str> = candidate
            .keys()
            .map(String::as_str)
            .filter(|key| !self.fields.iter().any(|(name, _)| name == key))
            .collect();
        if !extra.is_empty() {
            return Some(format!("unexpected fields: {}", extra.join(", ")));
        }

        self.fields.iter().find_map(|(name, pattern)| {
            match candidate.get(name).and_then(Value::as_str) {
                Some(value) if pattern.is_match(value) => None,
                Some(_) => Some(format!("field '{name}' does not match {}", pattern.as_str())),
                None => Some(format!("field '{name}' must be a string")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn environment(base_url: &str) -> Map<String, Value> {
        object(json!({
            "envName": "DEV",
            "confluenceBaseUrl": base_url,
            "username": "admin",
            "password": "secret",
            "scope": "docs",
        }))
    }

    #[rstest]
    #[case("https://wiki.example.com", true)]
    #[case("http://localhost:8090/confluence", true)]
    #[case("https://wiki.example.com/", false)]
    #[case("ftp://wiki.example.com", false)]
    #[case("wiki.example.com", false)]
    #[case("https://wiki example.com", false)]
    fn environment_base_url_pattern(#[case] base_url: &str, #[case] expected: bool) {
        assert_eq!(Schema::environment().validate(&environment(base_url)), expected);
    }

    #[test]
    fn environment_rejects_missing_field() {
        let mut candidate = environment("https://wiki.example.com");
        candidate.remove("scope");

        let schema = Schema::environment();
        assert!(!schema.validate(&candidate));
        assert_eq!(
            schema.mismatch(&candidate).as_deref(),
            Some("missing fields: scope")
        );
    }

    #[test]
    fn environment_rejects_extra_field() {
        let mut candidate = environment("https://wiki.example.com");
        candidate.insert("token".into(), json!("abc"));

        assert_eq!(
            Schema::environment().mismatch(&candidate).as_deref(),
            Some("unexpected fields: token")
        );
    }

    #[test]
    fn opaque_fields_accept_multiline_values() {
        let mut candidate = environment("https://wiki.example.com");
        candidate.insert("password".into(), json!("first\nsecond"));
        assert!(Schema::environment().validate(&candidate));

        candidate.insert("password".into(), json!(""));
        assert!(!Schema::environment().validate(&candidate));
    }

    #[test]
    fn non_string_values_never_match() {
        let mut candidate = environment("https://wiki.example.com");
        candidate.insert("password".into(), json!(1234));

        assert_eq!(
            Schema::environment().mismatch(&candidate).as_deref(),
            Some("field 'password' must be a string")
        );
    }

    #[rstest]
    #[case("", true)]
    #[case("dist/", true)]
    #[case("dist/assets/", true)]
    #[case("dist", false)]
    #[case("/dist/", false)]
    #[case("dist//", false)]
    #[case("../dist/", false)]
    fn upload_path_pattern(#[case] path: &str, #[case] expected: bool) {
        let candidate = object(json!({
            "targetPath": path,
            "sourcePath": "src/",
            "globString": "src/**/*.css",
        }));
        assert_eq!(Schema::upload().validate(&candidate), expected);
    }

    #[test]
    fn upload_requires_glob_string() {
        let candidate = object(json!({ "targetPath": "dist/", "sourcePath": "src/" }));
        assert!(!Schema::upload().validate(&candidate));
    }

    #[test]
    fn custom_schema_reports_bad_pattern() {
        assert!(Schema::new(&[("a", "(")]).is_err());
    }
}
