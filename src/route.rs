//! Defines [`Route`], one concrete output file, and its render payload
//! [`RouteData`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::item::{Experience, Post, Project, Slide};
use crate::tag::TagKind;

/// The closed set of renderers a route can be dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteKind {
    Home,
    Post,
    BlogCollection,
    Rss,
    Experience,
    Projects,
    Slides,
    SlidesMarkdown,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Home => "home",
            RouteKind::Post => "post",
            RouteKind::BlogCollection => "blog-collection",
            RouteKind::Rss => "rss",
            RouteKind::Experience => "experience",
            RouteKind::Projects => "projects",
            RouteKind::Slides => "slides",
            RouteKind::SlidesMarkdown => "slides-markdown",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a paginated post collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    /// `Blog` for the main index, otherwise the raw tag.
    pub title: String,

    /// The tag the collection is filtered by, if any.
    pub tag: Option<TagKind>,
    pub page_number: usize,
    pub page_count: usize,
    pub prev_route_path: Option<String>,
    pub next_route_path: Option<String>,
    pub posts: Vec<Arc<Post>>,
}

/// The immutable payload a renderer needs to produce a route's bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteData {
    Home,
    Post(Arc<Post>),
    Collection(Arc<Collection>),

    /// Every post, newest first.
    Feed(Arc<[Arc<Post>]>),
    Experiences(Arc<[Arc<Experience>]>),
    Projects(Arc<[Arc<Project>]>),
    Slides {
        slide: Arc<Slide>,

        /// Route path of the deck's raw-markdown mirror.
        markdown_route_path: String,
    },
    SlidesMarkdown(Arc<Slide>),
}

/// A concrete output file.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub kind: RouteKind,

    /// The canonical URL path. Unique across all routes.
    pub route_path: String,

    /// Overrides the on-disk location when URL escaping and file-system
    /// escaping diverge.
    pub file_path: Option<String>,
    pub data: RouteData,
}

impl Route {
    pub fn new(kind: RouteKind, route_path: impl Into<String>, data: RouteData) -> Route {
        Route {
            kind,
            route_path: route_path.into(),
            file_path: None,
            data,
        }
    }

    /// The route's file location under `output_directory`. `file_path` takes
    /// precedence over `route_path`; either way a trailing `/` maps to
    /// `index.html` inside that directory.
    pub fn output_path(&self, output_directory: &Path) -> PathBuf {
        let path = self.file_path.as_deref().unwrap_or(&self.route_path);
        let mut out = output_directory.to_owned();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out.push(segment);
        }
        if path.ends_with('/') {
            out.push("index.html");
        }
        out
    }
}
