//! Translates template edits into the route kinds that must be re-rendered.
//! The mapping is derived from the fixed template composition table
//! ([`TemplateName::files`]); a template file that no page template composes
//! affects nothing. Adding a template file means adding it to that table.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::route::RouteKind;
use crate::template::{self, TemplateName};

/// The route kinds rendered with `name`. The feed and the raw slide
/// markdown are rendered without templates.
pub fn route_kinds(name: TemplateName) -> &'static [RouteKind] {
    match name {
        TemplateName::Home => &[RouteKind::Home],
        TemplateName::BlogPost => &[RouteKind::Post],
        TemplateName::BlogCollection => &[RouteKind::BlogCollection],
        TemplateName::Experience => &[RouteKind::Experience],
        TemplateName::Projects => &[RouteKind::Projects],
        TemplateName::Slides => &[RouteKind::Slides],
    }
}

/// The route kinds affected by the template file with identity `id` (e.g.,
/// `layouts/default`).
pub fn impacted_by(id: &str) -> BTreeSet<RouteKind> {
    TemplateName::ALL
        .iter()
        .filter(|name| name.files().contains(&id))
        .flat_map(|name| route_kinds(*name).iter().copied())
        .collect()
}

/// The route kinds affected by edits to `files`, which are paths under
/// `template_directory`. Paths that aren't template files are ignored.
pub fn impacted_kinds(template_directory: &Path, files: &[PathBuf]) -> BTreeSet<RouteKind> {
    files
        .iter()
        .filter_map(|path| template::identity(template_directory, path))
        .flat_map(|id| impacted_by(&id))
        .collect()
}
