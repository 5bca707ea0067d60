//! In-memory Typst world for report compilation
//!
//! The template is the only source file; report data reaches it through
//! `sys.inputs`. Fonts come from the embedded asset set and are loaded
//! once per process.

use std::sync::OnceLock;

use chrono::{Datelike, Timelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Array, Bytes, Datetime, Dict, Value};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use crate::error::ReportError;

static FONT_CACHE: OnceLock<FontCache> = OnceLock::new();

/// Get the global font cache, initializing it on first use.
pub fn global_font_cache() -> &'static FontCache {
    FONT_CACHE.get_or_init(FontCache::new)
}

/// Fonts embedded in the binary, shared across compilations.
pub struct FontCache {
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl FontCache {
    fn new() -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();

        for data in typst_assets::fonts() {
            let buffer = Bytes::from_static(data);
            for font in Font::iter(buffer) {
                book.push(font.info().clone());
                fonts.push(font);
            }
        }

        tracing::info!(fonts = fonts.len(), "font cache initialized");
        Self {
            book: LazyHash::new(book),
            fonts,
        }
    }

    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// A world with a single main source and JSON-derived inputs.
pub struct ReportWorld {
    source: Source,
    font_cache: &'static FontCache,
    time: chrono::DateTime<Utc>,
    library: LazyHash<Library>,
}

impl ReportWorld {
    /// Mount the template with the report object bound to
    /// `sys.inputs.report`.
    pub fn new(template: &str, report: serde_json::Value) -> Result<Self, ReportError> {
        let mut inputs = Dict::new();
        inputs.insert("report".into(), json_to_typst_value(&report)?);

        let library = Library::builder().with_inputs(inputs).build();
        let id = FileId::new(None, VirtualPath::new("/main.typ"));

        Ok(Self {
            source: Source::new(id, template.to_string()),
            font_cache: global_font_cache(),
            time: Utc::now(),
            library: LazyHash::new(library),
        })
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.font_cache.book()
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        // No assets beyond the main source are mounted.
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.font_cache.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let offset_hours = offset.unwrap_or(0);
        let adjusted = self.time + chrono::Duration::hours(offset_hours);

        Datetime::from_ymd_hms(
            adjusted.year(),
            adjusted.month() as u8,
            adjusted.day() as u8,
            adjusted.hour() as u8,
            adjusted.minute() as u8,
            adjusted.second() as u8,
        )
    }
}

/// Convert a JSON value into its Typst counterpart.
fn json_to_typst_value(json: &serde_json::Value) -> Result<Value, ReportError> {
    match json {
        serde_json::Value::Null => Ok(Value::None),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(ReportError::InvalidInput(format!("invalid number: {n}")))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s.as_str().into())),
        serde_json::Value::Array(arr) => {
            let items: Vec<Value> = arr
                .iter()
                .map(json_to_typst_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(Array::from(items.as_slice())))
        }
        serde_json::Value::Object(obj) => {
            let mut dict = Dict::new();
            for (k, v) in obj {
                dict.insert(k.as_str().into(), json_to_typst_value(v)?);
            }
            Ok(Value::Dict(dict))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_mounts_template() {
        let world = ReportWorld::new("Hello", serde_json::json!({})).unwrap();
        let main_id = world.main();
        assert!(world.source(main_id).is_ok());
    }

    #[test]
    fn test_unknown_file_is_not_found() {
        let world = ReportWorld::new("Hello", serde_json::json!({})).unwrap();
        let other = FileId::new(None, VirtualPath::new("/missing.typ"));
        assert!(world.source(other).is_err());
        assert!(world.file(other).is_err());
    }

    #[test]
    fn test_nested_input_conversion() {
        let value = json_to_typst_value(&serde_json::json!({
            "clauses": [{ "id": 1, "rewrite": null }],
            "risk_score": 40,
        }))
        .unwrap();
        assert!(matches!(value, Value::Dict(_)));
    }

    #[test]
    fn test_font_cache_singleton() {
        let a = global_font_cache();
        let b = global_font_cache();
        assert!(std::ptr::eq(a, b));
        assert!(!a.is_empty());
    }

    #[test]
    fn test_today_resolves() {
        let world = ReportWorld::new("x", serde_json::json!({})).unwrap();
        assert!(world.today(None).is_some());
    }
}
