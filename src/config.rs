//! Loads the project configuration from `ravensite.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use url::Url;

/// The name of the project file. Its directory is the project root.
pub const PROJECT_FILE: &str = "ravensite.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(5)
    }
}

#[derive(Deserialize)]
struct FeedLimit(usize);
impl Default for FeedLimit {
    fn default() -> Self {
        FeedLimit(500)
    }
}

fn default_language() -> String {
    "en-GB".to_owned()
}

/// Selects whether draft content is published.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Drafts are excluded.
    Production,

    /// Drafts are included.
    Development,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Production
    }
}

impl Environment {
    pub fn include_drafts(self) -> bool {
        self == Environment::Development
    }
}

/// Site-wide values made available to every template as `.site`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,

    /// The scheme and host the site is served from (e.g.,
    /// `https://example.org`). Feed links are absolute against it.
    pub origin: Url,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Deserialize)]
struct Project {
    site: SiteConfig,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default)]
    feed_limit: FeedLimit,

    #[serde(default)]
    environment: Environment,
}

/// The resolved configuration for one build.
#[derive(Clone, Debug)]
pub struct Config {
    pub project_directory: PathBuf,
    pub content_directory: PathBuf,
    pub template_directory: PathBuf,
    pub output_directory: PathBuf,
    pub site: SiteConfig,
    pub page_size: usize,
    pub feed_limit: usize,
    pub environment: Environment,
}

impl Config {
    /// Finds `ravensite.yaml` in `dir` or the nearest parent directory and
    /// loads it. A relative `output_directory` is resolved against the
    /// project root.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
        if project.page_size.0 < 1 {
            bail!("`page_size` must be at least 1");
        }
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Ok(Config {
            content_directory: project_root.join("content"),
            template_directory: project_root.join("templates"),
            output_directory: project_root.join(output_directory),
            project_directory: project_root.to_owned(),
            site: project.site,
            page_size: project.page_size.0,
            feed_limit: project.feed_limit.0,
            environment: project.environment,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "site:\n  title: Raven\n  origin: https://example.org\n")?;
        let config = Config::from_project_file(&path, Path::new("dist"))?;
        assert_eq!(5, config.page_size);
        assert_eq!(500, config.feed_limit);
        assert_eq!(Environment::Production, config.environment);
        assert_eq!("en-GB", config.site.language);
        assert_eq!(dir.path().join("content"), config.content_directory);
        assert_eq!(dir.path().join("dist"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_found_from_nested_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "site:\n  title: Raven\n  origin: https://example.org\nenvironment: development\npage_size: 10\n",
        )?;
        let nested = dir.path().join("content").join("blog");
        fs::create_dir_all(&nested)?;
        let config = Config::from_directory(&nested, Path::new("/tmp/out"))?;
        assert_eq!(dir.path(), config.project_directory);
        assert_eq!(PathBuf::from("/tmp/out"), config.output_directory);
        assert_eq!(10, config.page_size);
        assert!(config.environment.include_drafts());
        Ok(())
    }

    #[test]
    fn test_zero_page_size_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "site:\n  title: Raven\n  origin: https://example.org\npage_size: 0\n",
        )?;
        assert!(Config::from_project_file(&path, Path::new("dist")).is_err());
        Ok(())
    }
}
