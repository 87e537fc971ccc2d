//! Loads the page templates. Each page template is composed by concatenating
//! template files (layout, partials, then the page body) and parsing the
//! result as a single Go-style template, so a layout can `{{ template }}` a
//! block the page defines.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use gtmpl::{Context, Template};
use gtmpl_value::Value;

/// The extension of every template file. A template file's identity is its
/// path relative to the templates directory with this extension dropped
/// (e.g., `layouts/default`).
pub const EXTENSION: &str = "html";

/// The closed set of page templates the route renderers use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateName {
    Home,
    BlogPost,
    BlogCollection,
    Experience,
    Projects,
    Slides,
}

impl TemplateName {
    pub const ALL: [TemplateName; 6] = [
        TemplateName::Home,
        TemplateName::BlogPost,
        TemplateName::BlogCollection,
        TemplateName::Experience,
        TemplateName::Projects,
        TemplateName::Slides,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::Home => "home",
            TemplateName::BlogPost => "blog-post",
            TemplateName::BlogCollection => "blog-collection",
            TemplateName::Experience => "experience",
            TemplateName::Projects => "projects",
            TemplateName::Slides => "slides",
        }
    }

    /// The identities of the files composed into this template, in order.
    pub fn files(self) -> &'static [&'static str] {
        match self {
            TemplateName::Home => &["home"],
            TemplateName::BlogPost => &["layouts/default", "partials/toc", "blog-post"],
            TemplateName::BlogCollection => {
                &["layouts/default", "partials/tags", "blog-collection"]
            }
            TemplateName::Experience => &["layouts/default", "partials/tags", "experience"],
            TemplateName::Projects => &["layouts/default", "partials/tags", "projects"],
            TemplateName::Slides => &["slides"],
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed page templates.
pub struct Templates {
    templates: HashMap<TemplateName, Template>,
}

impl Templates {
    /// Loads and parses every page template from `directory`. Fails if any
    /// template file is missing or doesn't parse.
    pub fn load(directory: &Path) -> Result<Templates> {
        let mut templates = HashMap::new();
        for name in TemplateName::ALL {
            let files = name.files().iter().map(|id| file_path(directory, id));
            templates.insert(name, parse_template(name, files)?);
        }
        Ok(Templates { templates })
    }

    /// Renders the template `name` against `value`.
    pub fn render(&self, name: TemplateName, value: Value) -> Result<String> {
        let template = self
            .templates
            .get(&name)
            .ok_or(Error::NotLoaded(name))?;
        let context = Context::from(value).map_err(|err| Error::Execute { name, err })?;
        let mut out: Vec<u8> = Vec::new();
        template
            .execute(&mut out, &context)
            .map_err(|err| Error::Execute { name, err })?;
        String::from_utf8(out).map_err(|err| Error::Execute {
            name,
            err: err.to_string(),
        })
    }
}

/// The on-disk location of the template file with identity `id`.
pub fn file_path(directory: &Path, id: &str) -> PathBuf {
    let mut path = directory.to_owned();
    path.extend(id.split('/'));
    path.set_extension(EXTENSION);
    path
}

/// The identity of the template file at `path`, or `None` if `path` isn't a
/// template file under `directory`.
pub fn identity(directory: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(directory).ok()?;
    if relative.extension()?.to_str()? != EXTENSION {
        return None;
    }
    let relative = relative.with_extension("");
    let segments = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    Some(segments.join("/"))
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template(name: TemplateName, files: impl Iterator<Item = PathBuf>) -> Result<Template> {
    let mut contents = String::new();
    for path in files {
        let text = std::fs::read_to_string(&path)
            .map_err(|err| Error::OpenTemplateFile { path, err })?;
        contents.push_str(&text);
        contents.push(' ');
    }

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|err| Error::Parse { name, err })?;
    Ok(template)
}

/// Represents the result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the composed template doesn't parse.
    #[error("parsing template `{name}`: {err}")]
    Parse { name: TemplateName, err: String },

    /// Returned when executing a template fails.
    #[error("executing template `{name}`: {err}")]
    Execute { name: TemplateName, err: String },

    /// Returned when rendering a template that was never loaded.
    #[error("template `{0}` is not loaded")]
    NotLoaded(TemplateName),
}
