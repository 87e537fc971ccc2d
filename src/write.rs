//! Applies route changes to the output directory: renders updated routes to
//! files and deletes removed ones.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use futures::future::join_all;
use gtmpl_value::Value;
use tracing::{error, info};

use crate::config::SiteConfig;
use crate::item::ContentType;
use crate::markdown::{self, Options};
use crate::route::{Route, RouteData, RouteKind};
use crate::template::{self, TemplateName, Templates};
use crate::value::{self, object, string};
use crate::feed;

/// What a call to [`Writer::apply`] did.
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Files written, in no particular order.
    pub written: Vec<PathBuf>,

    /// Files deleted, in no particular order. Targets that were already
    /// absent aren't counted.
    pub removed: Vec<PathBuf>,

    /// Routes that couldn't be rendered, written, or deleted.
    pub failures: Vec<Error>,
}

/// Renders routes and writes them below the output directory. The writer
/// holds no state between routes, so routes are written concurrently.
pub struct Writer<'a> {
    pub output_directory: &'a Path,
    pub templates: &'a Templates,
    pub site: &'a SiteConfig,

    /// The maximum number of posts in the feed.
    pub feed_limit: usize,
}

impl Writer<'_> {
    /// Deletes the files of `removed`, then renders and writes `updated`.
    /// Deletions go first so a directory pruned by one doesn't swallow a file
    /// written by the other.
    pub async fn apply(&self, updated: &[Route], removed: &[Route]) -> WriteReport {
        let mut report = WriteReport::default();

        for result in join_all(removed.iter().map(|route| self.remove(route))).await {
            match result {
                Ok(Some(path)) => report.removed.push(path),
                Ok(None) => {}
                Err(err) => {
                    error!(%err, "removing route");
                    report.failures.push(err);
                }
            }
        }

        for result in join_all(updated.iter().map(|route| self.write(route))).await {
            match result {
                Ok(path) => report.written.push(path),
                Err(err) => {
                    error!(%err, "writing route");
                    report.failures.push(err);
                }
            }
        }
        report
    }

    async fn write(&self, route: &Route) -> Result<PathBuf> {
        let contents = self.render(route)?;
        let path = route.output_path(self.output_directory);
        let io_err = |err| Error::Write {
            path: path.clone(),
            err,
        };
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, contents).await.map_err(io_err)?;
        info!(route = %route.route_path, kind = %route.kind, "wrote");
        Ok(path)
    }

    // Deletes the route's file, then each enclosing directory left empty,
    // up to but excluding the output directory. Returns the deleted path, or
    // `None` if the file was already gone.
    async fn remove(&self, route: &Route) -> Result<Option<PathBuf>> {
        let path = route.output_path(self.output_directory);
        let removed = match tokio::fs::remove_file(&path).await {
            Ok(()) => Some(path.clone()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(Error::Remove { path, err }),
        };

        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.output_directory
                || !current.starts_with(self.output_directory)
                || !is_empty_dir(current).await
            {
                break;
            }
            // A sibling removal may have got there first.
            if tokio::fs::remove_dir(current).await.is_err() {
                break;
            }
            dir = current.parent();
        }
        info!(route = %route.route_path, kind = %route.kind, "removed");
        Ok(removed)
    }

    /// Produces the bytes of `route`.
    pub fn render(&self, route: &Route) -> Result<Vec<u8>> {
        let unsupported = || Error::UnsupportedRoute {
            route_path: route.route_path.clone(),
            kind: route.kind,
        };
        let html = |name: TemplateName, fields: Vec<(&str, Value)>| {
            self.render_template(route, name, fields)
        };

        match (route.kind, &route.data) {
            (RouteKind::Home, RouteData::Home) => html(TemplateName::Home, Vec::new()),
            (RouteKind::Post, RouteData::Post(post)) => {
                let rendered =
                    markdown::to_html(&post.body, Options::for_content(ContentType::Post));
                html(
                    TemplateName::BlogPost,
                    vec![("post", value::post_page(post, &rendered))],
                )
            }
            (RouteKind::BlogCollection, RouteData::Collection(collection)) => html(
                TemplateName::BlogCollection,
                vec![("collection", Value::from(collection.as_ref()))],
            ),
            (RouteKind::Rss, RouteData::Feed(posts)) => {
                feed::render(self.site, posts, self.feed_limit)
                    .map(String::into_bytes)
                    .map_err(|err| Error::Feed {
                        route_path: route.route_path.clone(),
                        err,
                    })
            }
            (RouteKind::Experience, RouteData::Experiences(experiences)) => {
                let options = Options::for_content(ContentType::Experience);
                let entries = experiences
                    .iter()
                    .map(|e| value::experience(e, &markdown::to_html(&e.body, options).html))
                    .collect();
                html(
                    TemplateName::Experience,
                    vec![("experiences", Value::Array(entries))],
                )
            }
            (RouteKind::Projects, RouteData::Projects(projects)) => {
                let options = Options::for_content(ContentType::Project);
                let entries = projects
                    .iter()
                    .map(|p| value::project(p, &markdown::to_html(&p.body, options).html))
                    .collect();
                html(
                    TemplateName::Projects,
                    vec![("projects", Value::Array(entries))],
                )
            }
            (
                RouteKind::Slides,
                RouteData::Slides {
                    slide,
                    markdown_route_path,
                },
            ) => html(
                TemplateName::Slides,
                vec![("slide", value::slide(slide, markdown_route_path))],
            ),
            (RouteKind::SlidesMarkdown, RouteData::SlidesMarkdown(slide)) => {
                Ok(slide.body.clone().into_bytes())
            }
            _ => Err(unsupported()),
        }
    }

    fn render_template(
        &self,
        route: &Route,
        name: TemplateName,
        fields: Vec<(&str, Value)>,
    ) -> Result<Vec<u8>> {
        let mut fields = fields;
        fields.push(("site", self.site_value()));
        fields.push(("route_path", string(route.route_path.as_str())));
        self.templates
            .render(name, object(fields))
            .map(String::into_bytes)
            .map_err(|err| Error::Template {
                route_path: route.route_path.clone(),
                err,
            })
    }

    fn site_value(&self) -> Value {
        object([
            ("title", string(self.site.title.as_str())),
            ("description", value::optional(self.site.description.as_deref())),
            ("author", value::optional(self.site.author.as_deref())),
            ("origin", string(self.site.origin.as_str().trim_end_matches('/'))),
            ("language", string(self.site.language.as_str())),
            ("year", Value::from(Utc::now().year() as i64)),
        ])
    }
}

async fn is_empty_dir(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => false,
    }
}

/// The result of a fallible route-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to render, write, or delete one route.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a route's kind and payload don't belong together.
    #[error("route `{route_path}` of kind `{kind}` has no renderer for its payload")]
    UnsupportedRoute { route_path: String, kind: RouteKind },

    /// Returned when templating a route fails.
    #[error("rendering `{route_path}`: {err}")]
    Template {
        route_path: String,
        #[source]
        err: template::Error,
    },

    /// Returned when building the feed fails.
    #[error("rendering `{route_path}`: {err}")]
    Feed {
        route_path: String,
        #[source]
        err: feed::Error,
    },

    /// Returned when an output file can't be written.
    #[error("writing `{}`: {err}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when an output file can't be deleted.
    #[error("removing `{}`: {err}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}
