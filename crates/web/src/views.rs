//! View registry.
//!
//! Every template source in the views directory is compiled once at startup and stored under
//! its file stem (`hasta_ekle.html` → `hasta_ekle`). A template that does not compile aborts
//! loading; the registry is immutable afterwards and shared by every request.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use hastane_core::constants::VIEW_EXTENSION;
use hastane_core::{QueryError, Rows};
use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to read views directory {path}: {source}", path = path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read view {path}: {source}", path = path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile view {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("missing views: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("failed to render view {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Context handed to a view after a statement ran.
///
/// `result` is empty when the statement failed or returned no rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewContext {
    pub error: Option<QueryError>,
    pub result: Rows,
}

impl From<Result<Rows, QueryError>> for ViewContext {
    fn from(outcome: Result<Rows, QueryError>) -> Self {
        match outcome {
            Ok(result) => Self {
                error: None,
                result,
            },
            Err(error) => Self {
                error: Some(error),
                result: Rows::default(),
            },
        }
    }
}

/// Compiled templates keyed by view name.
pub struct ViewRegistry {
    env: Environment<'static>,
    names: BTreeSet<String>,
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("names", &self.names)
            .finish()
    }
}

impl ViewRegistry {
    /// Compile every `.html` file in `dir`.
    ///
    /// # Errors
    /// Returns a `ViewError` if the directory or a file cannot be read, or if any template fails
    /// to compile.
    pub fn load(dir: &Path) -> Result<Self, ViewError> {
        let read_dir = |source| ViewError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir)? {
            let path = entry.map_err(read_dir)?.path();
            let is_view = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(VIEW_EXTENSION);
            if is_view {
                paths.push(path);
            }
        }
        paths.sort();

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        let mut names = BTreeSet::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = name.to_string();
            let source = fs::read_to_string(&path).map_err(|source| ViewError::ReadFile {
                path: path.clone(),
                source,
            })?;
            env.add_template_owned(name.clone(), source)
                .map_err(|source| ViewError::Compile {
                    name: name.clone(),
                    source,
                })?;
            names.insert(name);
        }

        tracing::debug!("compiled {} views from {}", names.len(), dir.display());
        Ok(Self { env, names })
    }

    /// Fail unless every required view was compiled.
    pub fn ensure_complete<I, S>(&self, required: I) -> Result<(), ViewError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let missing: Vec<String> = required
            .into_iter()
            .filter(|name| !self.contains(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ViewError::Missing(missing))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render a view. Without a context the template falls back to its own defaults.
    pub fn render(&self, name: &str, ctx: Option<&ViewContext>) -> Result<String, ViewError> {
        let render_err = |source| ViewError::Render {
            name: name.to_string(),
            source,
        };
        let template = self.env.get_template(name).map_err(render_err)?;
        let rendered = match ctx {
            Some(ctx) => template.render(ctx),
            None => template.render(context! {}),
        };
        rendered.map_err(render_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hastane_core::rows::{Cell, OpaqueRow};
    use tempfile::TempDir;

    fn write_view(dir: &Path, name: &str, source: &str) {
        fs::write(dir.join(name), source).expect("Failed to write view");
    }

    #[test]
    fn loads_views_by_file_stem() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_view(temp_dir.path(), "layout.html", "<p>{% block content %}{% endblock %}</p>");
        write_view(
            temp_dir.path(),
            "hasta_sil.html",
            r#"{% extends "layout" %}{% block content %}sil{% endblock %}"#,
        );
        write_view(temp_dir.path(), "notes.txt", "{% broken");

        let views = ViewRegistry::load(temp_dir.path()).expect("views should load");
        assert_eq!(views.names().collect::<Vec<_>>(), vec!["hasta_sil", "layout"]);
        assert_eq!(views.render("hasta_sil", None).unwrap(), "<p>sil</p>");
    }

    #[test]
    fn compile_failure_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_view(temp_dir.path(), "layout.html", "ok");
        write_view(temp_dir.path(), "hasta_ekle.html", "{% if error %}unterminated");

        let err = ViewRegistry::load(temp_dir.path()).expect_err("load should fail");
        assert!(matches!(err, ViewError::Compile { ref name, .. } if name == "hasta_ekle"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = ViewRegistry::load(&temp_dir.path().join("nope")).expect_err("load should fail");
        assert!(matches!(err, ViewError::ReadDir { .. }));
    }

    #[test]
    fn completeness_lists_missing_views() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_view(temp_dir.path(), "layout.html", "ok");
        let views = ViewRegistry::load(temp_dir.path()).unwrap();

        assert!(views.ensure_complete(["layout"]).is_ok());
        let err = views
            .ensure_complete(["layout", "hasta_ekle", "kullanici_ara"])
            .expect_err("views are missing");
        match err {
            ViewError::Missing(missing) => assert_eq!(missing, vec!["hasta_ekle", "kullanici_ara"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn renders_context_and_escapes_values() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_view(
            temp_dir.path(),
            "kullanici_ara.html",
            "{% if error %}E:{{ error.message }}{% endif %}\
             {% for row in result %}[{{ row.cells[0].value }}]{% endfor %}",
        );
        let views = ViewRegistry::load(temp_dir.path()).unwrap();

        let ctx = ViewContext::from(Ok(Rows::Opaque(vec![OpaqueRow {
            cells: vec![Cell {
                column: "isim".into(),
                value: Some("<b>Ayşe".into()),
            }],
        }])));
        assert_eq!(
            views.render("kullanici_ara", Some(&ctx)).unwrap(),
            "[&lt;b&gt;Ayşe]"
        );

        let ctx = ViewContext::from(Err(QueryError::new("boom")));
        assert_eq!(views.render("kullanici_ara", Some(&ctx)).unwrap(), "E:boom");
        assert_eq!(views.render("kullanici_ara", None).unwrap(), "");
    }

    #[test]
    fn unknown_view_fails_to_render() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let views = ViewRegistry::load(temp_dir.path()).unwrap();
        assert!(views.is_empty());
        assert!(matches!(
            views.render("layout", None),
            Err(ViewError::Render { .. })
        ));
    }
}
