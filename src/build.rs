//! Exports [`Site`], which stitches the stages together: the content store
//! ([`crate::content`]) turns file changes into page ids, the page store
//! ([`crate::page`]) turns page ids into routes, and the writer
//! ([`crate::write`]) turns routes into files. Template edits skip the first
//! two stages ([`crate::tracker`]).

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::content::{self, ContentStore};
use crate::page::{self, FixedPage, PageId, PageStore, RouteChanges};
use crate::template::{self, Templates};
use crate::tracker;
use crate::write::{self, Writer};

/// The per-item outcome of one build cycle. A cycle never aborts half way;
/// everything that failed is listed here.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub content_failures: Vec<content::Error>,
    pub page_failures: Vec<page::Error>,
    pub template_failures: Vec<template::Error>,
    pub write_failures: Vec<write::Error>,
    pub written: usize,
    pub removed: usize,
}

impl BuildReport {
    /// Whether every item in the cycle succeeded.
    pub fn is_success(&self) -> bool {
        self.content_failures.is_empty()
            && self.page_failures.is_empty()
            && self.template_failures.is_empty()
            && self.write_failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.content_failures.len()
            + self.page_failures.len()
            + self.template_failures.len()
            + self.write_failures.len()
    }
}

/// A site being built. Each cycle takes `&mut self`, so cycles never overlap;
/// the work within a cycle runs concurrently.
pub struct Site {
    config: Config,
    content: ContentStore,
    pages: PageStore,
    templates: Templates,
}

impl Site {
    /// Prepares a site from `config`, loading its templates.
    pub fn new(config: Config) -> Result<Site> {
        let templates = Templates::load(&config.template_directory)?;
        Ok(Site {
            content: ContentStore::new(
                &config.content_directory,
                config.environment.include_drafts(),
            ),
            pages: PageStore::new(config.page_size),
            templates,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    /// Builds the whole site from scratch: forgets all content and routes,
    /// cleans the output directory, then ingests every content file in a
    /// single cycle.
    pub async fn build(&mut self) -> Result<BuildReport> {
        self.content = ContentStore::new(
            &self.config.content_directory,
            self.config.environment.include_drafts(),
        );
        self.pages = PageStore::new(self.config.page_size);
        rmdir(&self.config.output_directory).await?;
        let files = scan(&self.config.content_directory)?;
        info!(
            files = files.len(),
            content = %self.config.content_directory.display(),
            "building site"
        );

        let mut changes = self.content.refresh(&files, &[]).await;
        changes
            .pages_updated
            .extend(FixedPage::ALL.iter().map(|page| PageId::Fixed(*page)));
        let mut report = BuildReport {
            content_failures: changes.failures,
            ..BuildReport::default()
        };
        let routes = self.pages.recompute(
            &self.content,
            &changes.pages_updated,
            &changes.pages_removed,
        );
        self.write(routes, &mut report).await;
        Ok(report)
    }

    /// Runs one cycle for a batch of content file changes.
    pub async fn content_changed(&mut self, updated: &[PathBuf], removed: &[PathBuf]) -> BuildReport {
        let changes = self.content.refresh(updated, removed).await;
        let mut report = BuildReport {
            content_failures: changes.failures,
            ..BuildReport::default()
        };
        let routes = self.pages.recompute(
            &self.content,
            &changes.pages_updated,
            &changes.pages_removed,
        );
        self.write(routes, &mut report).await;
        report
    }

    /// Reloads the templates and re-renders every route a change to `files`
    /// can affect. If the templates no longer load, the previous ones stay
    /// active and nothing is re-rendered.
    pub async fn templates_changed(&mut self, files: &[PathBuf]) -> BuildReport {
        let mut report = BuildReport::default();
        match Templates::load(&self.config.template_directory) {
            Ok(templates) => self.templates = templates,
            Err(err) => {
                warn!(%err, "keeping previous templates");
                report.template_failures.push(err);
                return report;
            }
        }

        let kinds = tracker::impacted_kinds(&self.config.template_directory, files);
        let routes = self.pages.routes_of_kinds(&kinds);
        info!(?kinds, routes = routes.len(), "re-rendering after template change");
        self.write(
            RouteChanges {
                updated: routes,
                ..RouteChanges::default()
            },
            &mut report,
        )
        .await;
        report
    }

    async fn write(&self, routes: RouteChanges, report: &mut BuildReport) {
        report.page_failures.extend(routes.failures);
        let writer = Writer {
            output_directory: &self.config.output_directory,
            templates: &self.templates,
            site: &self.config.site,
            feed_limit: self.config.feed_limit,
        };
        let written = writer.apply(&routes.updated, &routes.removed).await;
        report.written += written.written.len();
        report.removed += written.removed.len();
        report.write_failures.extend(written.failures);
    }
}

/// Every regular file under `dir`. A missing directory has no files.
fn scan(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

async fn rmdir(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for the steps of a build that can't be isolated to one
/// item.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the templates can't be loaded.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned for I/O problems while cleaning the output directory.
    #[error("cleaning directory `{}`: {err}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the content directory can't be walked.
    #[error("scanning content: {0}")]
    Scan(#[from] walkdir::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Environment, SiteConfig};
    use std::collections::BTreeSet;
    use crate::route::RouteKind;
    use crate::template::test::write_templates;
    use std::fs;
    use tempfile::TempDir;
    use url::Url;

    struct Fixture {
        dir: TempDir,
        site: Site,
    }

    impl Fixture {
        fn new() -> Fixture {
            let dir = tempfile::tempdir().unwrap();
            write_templates(&dir.path().join("templates"));
            let config = Config {
                project_directory: dir.path().to_owned(),
                content_directory: dir.path().join("content"),
                template_directory: dir.path().join("templates"),
                output_directory: dir.path().join("dist"),
                site: SiteConfig {
                    title: "Raven".to_owned(),
                    description: None,
                    origin: Url::parse("https://example.org").unwrap(),
                    author: None,
                    language: "en-GB".to_owned(),
                },
                page_size: 5,
                feed_limit: 500,
                environment: Environment::Production,
            };
            let site = Site::new(config).unwrap();
            Fixture { dir, site }
        }

        fn write(&self, relative: &str, contents: &str) -> PathBuf {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        fn output(&self, relative: &str) -> PathBuf {
            self.dir.path().join("dist").join(relative)
        }
    }

    #[tokio::test]
    async fn test_full_build_of_empty_site_renders_fixed_pages() {
        let mut f = Fixture::new();
        let report = f.site.build().await.unwrap();
        assert!(report.is_success(), "{:?}", report);
        for file in [
            "index.html",
            "blog/index.html",
            "feed.xml",
            "experience/index.html",
            "projects/index.html",
        ] {
            assert!(f.output(file).exists(), "{}", file);
        }
    }

    #[tokio::test]
    async fn test_full_build_cleans_stale_output() {
        let mut f = Fixture::new();
        f.write("dist/stale.html", "old");
        f.site.build().await.unwrap();
        assert!(!f.output("stale.html").exists());
    }

    #[tokio::test]
    async fn test_rebuild_starts_from_current_content() {
        let mut f = Fixture::new();
        f.write(
            "content/blog/2024/05/01/a.md",
            "---\ntitle: A\nlanguages: [Go]\n---\n",
        );
        let gone = f.write("content/blog/2024/05/02/b.md", "---\ntitle: B\n---\n");
        f.site.build().await.unwrap();

        fs::remove_file(gone).unwrap();
        let report = f.site.build().await.unwrap();
        assert!(report.is_success(), "{:?}", report);
        assert!(f.output("blog/languages/Go/index.html").exists());
        assert!(f.output("blog/2024/05/01/a/index.html").exists());
        assert!(!f.output("blog/2024/05/02/b/index.html").exists());
        assert_eq!(1, f.site.content().posts().len());
    }

    #[tokio::test]
    async fn test_bad_template_edit_keeps_previous_templates() {
        let mut f = Fixture::new();
        f.write("content/blog/2024/05/01/hello.md", "---\ntitle: Hello\n---\n# Hi\n");
        f.site.build().await.unwrap();

        let toc = f.write("templates/partials/toc.html", "{{ define \"toc\" }}{{ range . }}");
        let report = f.site.templates_changed(&[toc]).await;
        assert_eq!(1, report.template_failures.len());
        assert_eq!(0, report.written);
    }

    #[tokio::test]
    async fn test_post_template_edit_rerenders_only_posts() {
        let mut f = Fixture::new();
        f.write("content/blog/2024/05/01/a.md", "---\ntitle: A\n---\n");
        f.write("content/blog/2024/05/02/b.md", "---\ntitle: B\n---\n");
        f.site.build().await.unwrap();

        let blog_before = fs::read_to_string(f.output("blog/index.html")).unwrap();
        let post = f.write(
            "templates/blog-post.html",
            "{{ define \"main\" }}<article>{{ .post.title }}</article>{{ end }}{{ template \"layout\" . }}",
        );
        let report = f.site.templates_changed(&[post]).await;
        assert!(report.is_success(), "{:?}", report);
        assert_eq!(2, report.written);
        assert!(fs::read_to_string(f.output("blog/2024/05/01/a/index.html"))
            .unwrap()
            .contains("<article>A</article>"));
        assert_eq!(
            blog_before,
            fs::read_to_string(f.output("blog/index.html")).unwrap()
        );
        assert_eq!(
            2,
            f.site
                .pages()
                .routes_of_kinds(&BTreeSet::from([RouteKind::Post]))
                .len()
        );
    }
}
