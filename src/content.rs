//! The content store: the current snapshot of every parsed content item, and
//! the logic that translates a batch of file changes into the set of pages
//! that must be recomputed ([`ContentStore::refresh`]).
//!
//! A refresh runs in two phases. Files are read and parsed concurrently
//! without touching the store, then the results are applied to the store one
//! at a time. The store is only ever mutated through `&mut self`, so two
//! refreshes can't interleave.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::item::{
    self, location_page_id, select_tags, ContentItem, ContentType, Experience, Location, Post,
    PostId, Project, Slide,
};
use crate::page::{FixedPage, PageId};
use crate::tag::TagKind;

/// The pages a refresh invalidated, plus the files that couldn't be
/// ingested.
#[derive(Debug, Default)]
pub struct ContentChanges {
    /// Pages whose routes must be recomputed.
    pub pages_updated: BTreeSet<PageId>,

    /// Pages whose routes must be deleted. Disjoint from `pages_updated`.
    pub pages_removed: BTreeSet<PageId>,

    /// Files that failed to parse. Each is treated as absent.
    pub failures: Vec<Error>,
}

/// Holds the parsed content items, keyed by content-relative path.
pub struct ContentStore {
    content_directory: PathBuf,
    include_drafts: bool,
    posts: HashMap<String, Arc<Post>>,
    experiences: HashMap<String, Arc<Experience>>,
    projects: HashMap<String, Arc<Project>>,
    slides: HashMap<String, Arc<Slide>>,
    languages: BTreeSet<String>,
    technologies: BTreeSet<String>,
}

impl ContentStore {
    /// Creates an empty store for the content under `content_directory`.
    /// Items marked `draft: true` are ingested only if `include_drafts` is
    /// set.
    pub fn new(content_directory: impl Into<PathBuf>, include_drafts: bool) -> ContentStore {
        ContentStore {
            content_directory: content_directory.into(),
            include_drafts,
            posts: HashMap::new(),
            experiences: HashMap::new(),
            projects: HashMap::new(),
            slides: HashMap::new(),
            languages: BTreeSet::new(),
            technologies: BTreeSet::new(),
        }
    }

    /// Ingests a batch of file changes. `updated` holds files that were
    /// created or modified, `removed` holds files that were deleted. A path
    /// listed in both ends up removed. Removals of other paths are applied
    /// before the updates, so a file moved within one batch (e.g.,
    /// `hello.md` to `hello/index.md`) is a delete followed by an add.
    pub async fn refresh(&mut self, updated: &[PathBuf], removed: &[PathBuf]) -> ContentChanges {
        let mut changes = ContentChanges::default();
        let previous_tags = self.tag_snapshot();

        // Read and parse everything first; nothing below this point awaits.
        let parsed = join_all(updated.iter().map(|path| self.load(path))).await;

        let (removed_last, removed_first): (Vec<&PathBuf>, Vec<&PathBuf>) =
            removed.iter().partition(|path| updated.contains(*path));
        for path in removed_first {
            self.remove_path(path, &mut changes);
        }

        for (path, result) in updated.iter().zip(parsed) {
            match result {
                Ok(Loaded::Item(item)) => {
                    if item.draft() && !self.include_drafts {
                        debug!(path = %path.display(), "skipping draft");
                        self.remove(&item.location(), &mut changes);
                    } else if let Err(err) = self.upsert(item, &mut changes) {
                        self.fail(path, err, &mut changes);
                    }
                }
                Ok(Loaded::Unlocated(err @ item::Error::NotMarkdown(_))) => {
                    debug!(path = %path.display(), %err, "ignoring non-content file");
                }
                Ok(Loaded::Unlocated(err)) => self.fail(path, err, &mut changes),
                Err((location, err)) => {
                    self.remove(&location, &mut changes);
                    self.fail(path, err, &mut changes);
                }
            }
        }

        for path in removed_last {
            self.remove_path(path, &mut changes);
        }

        self.recompute_tags();
        for (kind, tags) in previous_tags {
            for tag in tags.difference(self.tags(kind)) {
                let id = PageId::Tag(kind, tag.clone());
                changes.pages_updated.remove(&id);
                changes.pages_removed.insert(id);
            }
        }
        for id in changes.pages_removed.iter() {
            changes.pages_updated.remove(id);
        }
        changes
    }

    async fn load(
        &self,
        path: &Path,
    ) -> std::result::Result<Loaded, (Location, item::Error)> {
        let location = match item::locate(&self.content_directory, path) {
            Ok(location) => location,
            Err(err) => return Ok(Loaded::Unlocated(err)),
        };
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) => return Err((location, item::Error::from(err))),
        };
        match item::parse(&location, &contents) {
            Ok(item) => Ok(Loaded::Item(item)),
            Err(err) => Err((location, err)),
        }
    }

    fn remove_path(&mut self, path: &Path, changes: &mut ContentChanges) {
        match item::locate(&self.content_directory, path) {
            Ok(location) => self.remove(&location, changes),
            Err(err) => debug!(path = %path.display(), %err, "ignoring removal"),
        }
    }

    fn fail(&self, path: &Path, err: item::Error, changes: &mut ContentChanges) {
        warn!(path = %path.display(), %err, "excluding content file");
        changes.failures.push(Error {
            path: path.to_owned(),
            source: err,
        });
    }

    fn upsert(
        &mut self,
        item: ContentItem,
        changes: &mut ContentChanges,
    ) -> std::result::Result<(), item::Error> {
        let page_id = item.page_id();
        let previous = match &item {
            ContentItem::Post(post) => {
                if let Some(other) = self
                    .posts
                    .values()
                    .find(|p| p.id == post.id && p.key != post.key)
                {
                    return Err(item::Error::DuplicatePage {
                        key: post.key.clone(),
                        other: other.key.clone(),
                    });
                }
                let previous = self.posts.insert(post.key.clone(), post.clone());
                changes.pages_updated.insert(PageId::Fixed(FixedPage::Blog));
                let relisted = match &previous {
                    None => true,
                    Some(previous) => previous.listing_differs(post),
                };
                if relisted {
                    for kind in TagKind::ALL {
                        for tag in item.tags(kind) {
                            changes.pages_updated.insert(PageId::Tag(kind, tag.clone()));
                        }
                    }
                }
                previous.map(ContentItem::Post)
            }
            ContentItem::Slide(slide) => {
                if let Some(other) = self
                    .slides
                    .values()
                    .find(|s| s.slug == slide.slug && s.key != slide.key)
                {
                    return Err(item::Error::DuplicatePage {
                        key: slide.key.clone(),
                        other: other.key.clone(),
                    });
                }
                self.slides
                    .insert(slide.key.clone(), slide.clone())
                    .map(ContentItem::Slide)
            }
            ContentItem::Experience(experience) => self
                .experiences
                .insert(experience.key.clone(), experience.clone())
                .map(ContentItem::Experience),
            ContentItem::Project(project) => self
                .projects
                .insert(project.key.clone(), project.clone())
                .map(ContentItem::Project),
        };

        // An earlier removal in this batch may have claimed the same page.
        changes.pages_removed.remove(&page_id);
        changes.pages_updated.insert(page_id);
        if !has_tag_pages(&item) {
            return Ok(());
        }
        for kind in TagKind::ALL {
            let old: &[String] = match &previous {
                Some(previous) => previous.tags(kind),
                None => &[],
            };
            let new = item.tags(kind);
            let changed = old
                .iter()
                .filter(|t| !new.contains(t))
                .chain(new.iter().filter(|t| !old.contains(t)));
            for tag in changed {
                changes.pages_updated.insert(PageId::Tag(kind, tag.clone()));
            }
        }
        Ok(())
    }

    fn remove(&mut self, location: &Location, changes: &mut ContentChanges) {
        let removed = match location.content_type() {
            ContentType::Post => self.posts.remove(&location.key).map(ContentItem::Post),
            ContentType::Experience => self
                .experiences
                .remove(&location.key)
                .map(ContentItem::Experience),
            ContentType::Project => self
                .projects
                .remove(&location.key)
                .map(ContentItem::Project),
            ContentType::Slide => self.slides.remove(&location.key).map(ContentItem::Slide),
        };
        let removed = match removed {
            Some(removed) => removed,
            None => return,
        };

        match removed.content_type() {
            ContentType::Post => {
                changes.pages_removed.insert(location_page_id(location));
                changes.pages_updated.insert(PageId::Fixed(FixedPage::Blog));
            }
            ContentType::Slide => {
                changes.pages_removed.insert(location_page_id(location));
            }
            // The page is shared with the remaining entries; it shrinks.
            ContentType::Experience | ContentType::Project => {
                changes.pages_updated.insert(location_page_id(location));
            }
        }
        if has_tag_pages(&removed) {
            for kind in TagKind::ALL {
                for tag in removed.tags(kind) {
                    changes.pages_updated.insert(PageId::Tag(kind, tag.clone()));
                }
            }
        }
    }

    fn tag_snapshot(&self) -> Vec<(TagKind, BTreeSet<String>)> {
        TagKind::ALL
            .iter()
            .map(|kind| (*kind, self.tags(*kind).clone()))
            .collect()
    }

    fn recompute_tags(&mut self) {
        for kind in TagKind::ALL {
            let tags: BTreeSet<String> = self
                .posts
                .values()
                .map(|p| p.tags(kind))
                .chain(
                    self.experiences
                        .values()
                        .map(|e| select_tags(&e.languages, &e.technologies, kind)),
                )
                .chain(
                    self.projects
                        .values()
                        .map(|p| select_tags(&p.languages, &p.technologies, kind)),
                )
                .flatten()
                .cloned()
                .collect();
            match kind {
                TagKind::Language => self.languages = tags,
                TagKind::Technology => self.technologies = tags,
            }
        }
    }

    /// Every post, newest first. Posts sharing a date are ordered by key.
    pub fn posts(&self) -> Vec<Arc<Post>> {
        let mut posts: Vec<Arc<Post>> = self.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.key.cmp(&b.key)));
        posts
    }

    /// Posts carrying `tag`, newest first.
    pub fn posts_tagged(&self, kind: TagKind, tag: &str) -> Vec<Arc<Post>> {
        self.posts()
            .into_iter()
            .filter(|p| p.tags(kind).iter().any(|t| t == tag))
            .collect()
    }

    pub fn post(&self, id: &PostId) -> Option<Arc<Post>> {
        self.posts.values().find(|p| &p.id == id).cloned()
    }

    /// Every experience entry, most recent start first.
    pub fn experiences(&self) -> Vec<Arc<Experience>> {
        let mut experiences: Vec<Arc<Experience>> = self.experiences.values().cloned().collect();
        experiences.sort_by(|a, b| b.started.cmp(&a.started).then_with(|| a.key.cmp(&b.key)));
        experiences
    }

    /// Every project, by ascending `order`.
    pub fn projects(&self) -> Vec<Arc<Project>> {
        let mut projects: Vec<Arc<Project>> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.key.cmp(&b.key)));
        projects
    }

    pub fn slide(&self, slug: &str) -> Option<Arc<Slide>> {
        self.slides.values().find(|s| s.slug == slug).cloned()
    }

    /// The distinct tags of `kind` across all ingested items.
    pub fn tags(&self, kind: TagKind) -> &BTreeSet<String> {
        match kind {
            TagKind::Language => &self.languages,
            TagKind::Technology => &self.technologies,
        }
    }

}

// Slide decks carry tags for their own page but don't feed the tag
// collections.
fn has_tag_pages(item: &ContentItem) -> bool {
    item.content_type() != ContentType::Slide
}

enum Loaded {
    Item(ContentItem),

    /// The path doesn't denote a content item at all, so there is nothing to
    /// remove from the store.
    Unlocated(item::Error),
}

/// A content file that couldn't be ingested.
#[derive(Debug, thiserror::Error)]
#[error("ingesting `{}`: {source}", path.display())]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub source: item::Error,
}
