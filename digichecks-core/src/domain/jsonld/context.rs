// digichecks-core/src/domain/jsonld/context.rs

use std::collections::{BTreeSet, HashMap};

use oxiri::Iri;
use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// Remote context documents, keyed by URL, fetched before expansion starts.
pub type RemoteContexts = HashMap<String, Value>;

const MAX_CONTEXT_DEPTH: usize = 16;

// Context-level entries that never define a term.
const CONTEXT_KEYWORDS: [&str; 8] = [
    "@base",
    "@vocab",
    "@language",
    "@version",
    "@protected",
    "@propagate",
    "@import",
    "@direction",
];

pub fn is_keyword(value: &str) -> bool {
    matches!(
        value,
        "@base"
            | "@container"
            | "@context"
            | "@direction"
            | "@graph"
            | "@id"
            | "@import"
            | "@included"
            | "@index"
            | "@json"
            | "@language"
            | "@list"
            | "@nest"
            | "@none"
            | "@prefix"
            | "@propagate"
            | "@protected"
            | "@reverse"
            | "@set"
            | "@type"
            | "@value"
            | "@version"
            | "@vocab"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMapping {
    Id,
    Vocab,
    Datatype(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    None,
    List,
    Set,
    Language,
    Index,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermDefinition {
    pub iri: String,
    pub reverse: bool,
    pub type_mapping: Option<TypeMapping>,
    /// `Some(None)` explicitly removes the default language for this term.
    pub language: Option<Option<String>>,
    pub container: Container,
    pub scoped_context: Option<Value>,
}

/// What a key of a node object means under the active context.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyMeaning {
    Keyword(String),
    Property(String, Option<TermDefinition>),
    Ignored,
}

/// Term definitions and defaults in effect at one point of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveContext {
    terms: HashMap<String, Option<TermDefinition>>,
    pub vocab: Option<String>,
    pub base: Option<String>,
    pub language: Option<String>,
}

impl ActiveContext {
    pub fn with_base(base: Option<String>) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    pub fn term(&self, key: &str) -> Option<&TermDefinition> {
        self.terms.get(key).and_then(Option::as_ref)
    }

    /// Applies a local context (`@context` value) on top of this one.
    pub fn process(
        &self,
        local: &Value,
        remote: &RemoteContexts,
    ) -> Result<ActiveContext, DomainError> {
        self.process_at(local, remote, 0)
    }

    fn process_at(
        &self,
        local: &Value,
        remote: &RemoteContexts,
        depth: usize,
    ) -> Result<ActiveContext, DomainError> {
        if depth > MAX_CONTEXT_DEPTH {
            return Err(DomainError::MalformedData(
                "JSON-LD contexts are nested too deeply (recursive context inclusion?)"
                    .to_string(),
            ));
        }

        let items: Vec<&Value> = match local {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut result = self.clone();
        for item in items {
            result = match item {
                Value::Null => ActiveContext::with_base(result.base.clone()),
                Value::String(url) => {
                    let inner = load_remote(url, remote)?;
                    result.process_at(inner, remote, depth + 1)?
                }
                Value::Object(map) => result.apply_local(map, remote, depth)?,
                other => {
                    return Err(DomainError::MalformedData(format!(
                        "Invalid @context entry: {}",
                        other
                    )));
                }
            };
        }
        Ok(result)
    }

    fn apply_local(
        mut self,
        local: &Map<String, Value>,
        remote: &RemoteContexts,
        depth: usize,
    ) -> Result<Self, DomainError> {
        if let Some(import) = local.get("@import") {
            let Value::String(url) = import else {
                return Err(DomainError::MalformedData(
                    "@import must be a string".to_string(),
                ));
            };
            let imported = load_remote(url, remote)?;
            let Value::Object(imported) = imported else {
                return Err(DomainError::MalformedData(format!(
                    "Imported context '{}' is not an object",
                    url
                )));
            };
            let mut merged = imported.clone();
            merged.remove("@import");
            for (k, v) in local {
                merged.insert(k.clone(), v.clone());
            }
            merged.remove("@import");
            return self.apply_local(&merged, remote, depth + 1);
        }

        if let Some(base) = local.get("@base") {
            self.base = match base {
                Value::Null => None,
                Value::String(b) => Some(resolve_iri(self.base.as_deref(), b).ok_or_else(|| {
                    DomainError::MalformedData(format!(
                        "@base '{}' is relative and there is no base IRI to resolve it against",
                        b
                    ))
                })?),
                _ => {
                    return Err(DomainError::MalformedData(
                        "@base must be a string or null".to_string(),
                    ));
                }
            };
        }

        if let Some(vocab) = local.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(v) => self.expand_iri(v, true, true),
                _ => {
                    return Err(DomainError::MalformedData(
                        "@vocab must be a string or null".to_string(),
                    ));
                }
            };
        }

        if let Some(language) = local.get("@language") {
            self.language = match language {
                Value::Null => None,
                Value::String(l) => Some(l.to_lowercase()),
                _ => {
                    return Err(DomainError::MalformedData(
                        "@language must be a string or null".to_string(),
                    ));
                }
            };
        }

        let mut builder = TermBuilder {
            ctx: &mut self,
            local,
            defined: HashMap::new(),
        };
        for term in local.keys() {
            if CONTEXT_KEYWORDS.contains(&term.as_str()) {
                continue;
            }
            builder.define(term)?;
        }
        Ok(self)
    }

    /// IRI expansion. `vocab` enables term and `@vocab` lookups, `relative`
    /// enables resolution against `@base`. Returns `None` when the value
    /// cannot become an IRI under this context.
    pub fn expand_iri(&self, value: &str, vocab: bool, relative: bool) -> Option<String> {
        if is_keyword(value) {
            return Some(value.to_string());
        }
        if value.starts_with('@') {
            return None;
        }
        if vocab && let Some(entry) = self.terms.get(value) {
            return entry.as_ref().map(|d| d.iri.clone());
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_string());
            }
            if let Some(Some(def)) = self.terms.get(prefix) {
                return Some(format!("{}{}", def.iri, suffix));
            }
            return Some(value.to_string());
        }
        if vocab && let Some(v) = &self.vocab {
            return Some(format!("{}{}", v, value));
        }
        if relative {
            return resolve_iri(self.base.as_deref(), value);
        }
        None
    }

    pub fn resolve_key(&self, key: &str) -> KeyMeaning {
        if is_keyword(key) {
            return KeyMeaning::Keyword(key.to_string());
        }
        match self.terms.get(key) {
            Some(None) => KeyMeaning::Ignored,
            Some(Some(def)) if is_keyword(&def.iri) => KeyMeaning::Keyword(def.iri.clone()),
            Some(Some(def)) => KeyMeaning::Property(def.iri.clone(), Some(def.clone())),
            None => match self.expand_iri(key, true, false) {
                Some(iri) if iri.contains(':') && !iri.starts_with('@') => {
                    KeyMeaning::Property(iri, None)
                }
                _ => KeyMeaning::Ignored,
            },
        }
    }
}

fn load_remote<'r>(url: &str, remote: &'r RemoteContexts) -> Result<&'r Value, DomainError> {
    let document = remote.get(url).ok_or_else(|| {
        DomainError::MalformedData(format!("JSON-LD context '{}' could not be loaded", url))
    })?;
    Ok(document.get("@context").unwrap_or(document))
}

/// Creates term definitions of one local context, resolving dependencies
/// between its terms (a compact IRI needs its prefix defined first).
struct TermBuilder<'a> {
    ctx: &'a mut ActiveContext,
    local: &'a Map<String, Value>,
    defined: HashMap<String, bool>,
}

impl TermBuilder<'_> {
    fn define(&mut self, term: &str) -> Result<(), DomainError> {
        match self.defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => {
                return Err(DomainError::MalformedData(format!(
                    "Cyclic IRI mapping for JSON-LD term '{}'",
                    term
                )));
            }
            None => {}
        }
        let Some(value) = self.local.get(term) else {
            return Ok(());
        };
        if term.is_empty() || is_keyword(term) {
            self.defined.insert(term.to_string(), true);
            return Ok(());
        }
        self.defined.insert(term.to_string(), false);

        let definition = match value {
            Value::Null => None,
            Value::String(id) => Some(TermDefinition {
                iri: self.iri_for(term, Some(id))?,
                ..Default::default()
            }),
            Value::Object(entry) => self.expanded_definition(term, entry)?,
            other => {
                return Err(DomainError::MalformedData(format!(
                    "Invalid definition for JSON-LD term '{}': {}",
                    term, other
                )));
            }
        };

        self.ctx.terms.insert(term.to_string(), definition);
        self.defined.insert(term.to_string(), true);
        Ok(())
    }

    fn expanded_definition(
        &mut self,
        term: &str,
        entry: &Map<String, Value>,
    ) -> Result<Option<TermDefinition>, DomainError> {
        let mut def = TermDefinition::default();

        if let Some(reverse) = entry.get("@reverse") {
            let Value::String(reverse) = reverse else {
                return Err(self.invalid(term, "@reverse must be a string"));
            };
            def.iri = self.iri_for(term, Some(reverse))?;
            def.reverse = true;
        } else {
            match entry.get("@id") {
                Some(Value::Null) => return Ok(None),
                Some(Value::String(id)) => def.iri = self.iri_for(term, Some(id))?,
                None => def.iri = self.iri_for(term, None)?,
                Some(_) => return Err(self.invalid(term, "@id must be a string")),
            }
        }

        if let Some(type_mapping) = entry.get("@type") {
            let Value::String(t) = type_mapping else {
                return Err(self.invalid(term, "@type must be a string"));
            };
            def.type_mapping = match t.as_str() {
                "@id" => Some(TypeMapping::Id),
                "@vocab" => Some(TypeMapping::Vocab),
                "@json" | "@none" => None,
                datatype => {
                    let iri = self.expand(datatype)?.ok_or_else(|| {
                        self.invalid(term, "datatype does not expand to an IRI")
                    })?;
                    Some(TypeMapping::Datatype(iri))
                }
            };
        }

        if let Some(language) = entry.get("@language") {
            def.language = match language {
                Value::Null => Some(None),
                Value::String(l) => Some(Some(l.to_lowercase())),
                _ => return Err(self.invalid(term, "@language must be a string or null")),
            };
        }

        if let Some(container) = entry.get("@container") {
            let values: Vec<&Value> = match container {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            for value in values {
                def.container = match value.as_str() {
                    Some("@list") => Container::List,
                    Some("@set") if def.container == Container::None => Container::Set,
                    Some("@language") => Container::Language,
                    Some("@index") => Container::Index,
                    Some(_) | None => def.container,
                };
            }
        }

        def.scoped_context = entry.get("@context").cloned();
        Ok(Some(def))
    }

    fn iri_for(&mut self, term: &str, id: Option<&str>) -> Result<String, DomainError> {
        if let Some(id) = id {
            if id == term && !id.contains(':') {
                return self
                    .ctx
                    .vocab
                    .as_ref()
                    .map(|v| format!("{}{}", v, term))
                    .ok_or_else(|| self.invalid(term, "self-referencing term without @vocab"));
            }
            return self
                .expand(id)?
                .ok_or_else(|| self.invalid(term, "IRI mapping does not expand to an IRI"));
        }

        if let Some((prefix, suffix)) = term.split_once(':') {
            if self.local.contains_key(prefix) {
                self.define(prefix)?;
            }
            return Ok(match self.ctx.term(prefix) {
                Some(def) => format!("{}{}", def.iri, suffix),
                None => term.to_string(),
            });
        }

        self.ctx
            .vocab
            .as_ref()
            .map(|v| format!("{}{}", v, term))
            .ok_or_else(|| self.invalid(term, "no IRI mapping and no @vocab"))
    }

    /// Vocabulary-relative expansion that first defines any local term the
    /// value depends on.
    fn expand(&mut self, value: &str) -> Result<Option<String>, DomainError> {
        if self.local.contains_key(value) && !is_keyword(value) {
            self.define(value)?;
        }
        if let Some((prefix, _)) = value.split_once(':')
            && self.local.contains_key(prefix)
        {
            self.define(prefix)?;
        }
        Ok(self.ctx.expand_iri(value, true, false))
    }

    fn invalid(&self, term: &str, reason: &str) -> DomainError {
        DomainError::MalformedData(format!("Invalid JSON-LD term '{}': {}", term, reason))
    }
}

/// RFC 3986 reference resolution. Absolute IRIs pass through; relative
/// references need a base and yield `None` without one.
pub fn resolve_iri(base: Option<&str>, value: &str) -> Option<String> {
    if Iri::parse(value).is_ok() {
        return Some(value.to_string());
    }
    let base = Iri::parse(base?).ok()?;
    base.resolve(value).ok().map(Iri::into_inner)
}

/// Every remote context URL a document (or a context document) refers to.
pub fn context_urls(value: &Value) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();
    collect_urls(value, false, &mut urls);
    urls
}

fn collect_urls(value: &Value, in_context: bool, urls: &mut BTreeSet<String>) {
    match value {
        Value::String(url) if in_context => {
            urls.insert(url.clone());
        }
        Value::Array(items) => {
            for item in items {
                collect_urls(item, in_context, urls);
            }
        }
        Value::Object(map) => {
            for (key, inner) in map {
                match key.as_str() {
                    "@context" | "@import" => collect_urls(inner, true, urls),
                    _ if in_context => {
                        // Only scoped contexts inside term definitions hold URLs.
                        if let Value::Object(def) = inner
                            && let Some(scoped) = def.get("@context")
                        {
                            collect_urls(scoped, true, urls);
                        }
                    }
                    _ => collect_urls(inner, false, urls),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn process(local: Value) -> ActiveContext {
        ActiveContext::default()
            .process(&local, &RemoteContexts::new())
            .unwrap()
    }

    #[test]
    fn test_compact_iri_terms_resolve_their_prefix() {
        let ctx = process(json!({
            "hasUnit": {"@id": "sml:hasUnit", "@type": "@id"},
            "sml": "https://w3id.org/sml/def#"
        }));
        let def = ctx.term("hasUnit").unwrap();
        assert_eq!(def.iri, "https://w3id.org/sml/def#hasUnit");
        assert_eq!(def.type_mapping, Some(TypeMapping::Id));
    }

    #[test]
    fn test_keyword_aliases() {
        let ctx = process(json!({"relations": "@nest", "id": "@id"}));
        assert_eq!(ctx.resolve_key("relations"), KeyMeaning::Keyword("@nest".into()));
        assert_eq!(ctx.resolve_key("id"), KeyMeaning::Keyword("@id".into()));
    }

    #[test]
    fn test_vocab_and_unmapped_keys() {
        let ctx = process(json!({"@vocab": "http://example.org/", "skip": null}));
        assert_eq!(
            ctx.resolve_key("name"),
            KeyMeaning::Property("http://example.org/name".into(), None)
        );
        assert_eq!(ctx.resolve_key("skip"), KeyMeaning::Ignored);
        assert_eq!(process(json!({})).resolve_key("name"), KeyMeaning::Ignored);
    }

    #[test]
    fn test_remote_context_lookup() {
        let remote = RemoteContexts::from([(
            "https://ctx.example.org/c.jsonld".to_string(),
            json!({"@context": {"ex": "http://example.org/"}}),
        )]);
        let ctx = ActiveContext::default()
            .process(&json!("https://ctx.example.org/c.jsonld"), &remote)
            .unwrap();
        assert_eq!(ctx.expand_iri("ex:a", true, false).unwrap(), "http://example.org/a");

        let missing = ActiveContext::default().process(&json!("https://nowhere/x"), &remote);
        assert!(matches!(missing, Err(DomainError::MalformedData(_))));
    }

    #[test]
    fn test_recursive_remote_context_is_bounded() {
        let remote = RemoteContexts::from([(
            "https://loop/".to_string(),
            json!({"@context": "https://loop/"}),
        )]);
        let result = ActiveContext::default().process(&json!("https://loop/"), &remote);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_urls_are_collected() {
        let doc = json!({
            "@context": ["https://a/ctx", {"term": {"@id": "x:y", "@context": "https://b/ctx"}}],
            "@graph": [{"@context": "https://c/ctx", "label": "not a url"}]
        });
        let urls: Vec<_> = context_urls(&doc).into_iter().collect();
        assert_eq!(urls, vec!["https://a/ctx", "https://b/ctx", "https://c/ctx"]);
    }

    #[test]
    fn test_relative_resolution() {
        let base = Some("http://example.org/a/b");
        let cases = [
            ("c", "http://example.org/a/c"),
            ("/root", "http://example.org/root"),
            ("../c", "http://example.org/c"),
            ("./c", "http://example.org/a/c"),
            ("?q=1", "http://example.org/a/b?q=1"),
            ("#frag", "http://example.org/a/b#frag"),
            ("//other.org/x", "http://other.org/x"),
        ];
        for (reference, expected) in cases {
            assert_eq!(resolve_iri(base, reference).as_deref(), Some(expected), "{reference}");
        }
        assert_eq!(resolve_iri(None, "urn:x").as_deref(), Some("urn:x"));
        assert_eq!(resolve_iri(None, "s1"), None);
    }

    #[test]
    fn test_relative_base_without_document_base_is_rejected() {
        let err = ActiveContext::default()
            .process(&json!({"@base": "docs/"}), &RemoteContexts::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::MalformedData(_)));

        let ctx = process(json!({"@base": "http://example.org/docs/", "ex": "http://example.org/"}));
        assert_eq!(
            ctx.expand_iri("item-1", false, true).as_deref(),
            Some("http://example.org/docs/item-1")
        );
    }
}
