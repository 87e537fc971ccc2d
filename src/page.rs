//! Maps page ids onto concrete routes. [`PageStore`] remembers the routes
//! each page produced last time so that a recompute can report which routes
//! went away.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error};

use crate::content::ContentStore;
use crate::item::{Post, PostId};
use crate::paginate::{page_route_path, paginate};
use crate::route::{Collection, Route, RouteData, RouteKind};
use crate::tag::{self, TagKind};

const BLOG_PATH: &str = "/blog/";
const FEED_PATH: &str = "/feed.xml";
const BLOG_TITLE: &str = "Blog";

/// Pages that exist exactly once per site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixedPage {
    Home,
    Blog,
    Experience,
    Projects,
}

impl FixedPage {
    pub const ALL: [FixedPage; 4] = [
        FixedPage::Home,
        FixedPage::Blog,
        FixedPage::Experience,
        FixedPage::Projects,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FixedPage::Home => "home",
            FixedPage::Blog => "blog",
            FixedPage::Experience => "experience",
            FixedPage::Projects => "projects",
        }
    }
}

/// Identifies a logical page. The identity never depends on an item's
/// contents, only on its type and location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageId {
    Fixed(FixedPage),
    Post(PostId),
    Slides(String),
    Tag(TagKind, String),
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageId::Fixed(page) => f.write_str(page.as_str()),
            PageId::Post(id) => write!(f, "post:{}", id),
            PageId::Slides(slug) => write!(f, "slides:{}", slug),
            PageId::Tag(kind, name) => write!(f, "{}:{}", kind, name),
        }
    }
}

impl FromStr for PageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::UnknownPageId(s.to_owned());
        if let Some(page) = FixedPage::ALL.iter().find(|p| p.as_str() == s) {
            return Ok(PageId::Fixed(*page));
        }
        let (prefix, rest) = s.split_once(':').ok_or_else(unknown)?;
        if rest.is_empty() {
            return Err(unknown());
        }
        match prefix {
            "post" => {
                let mut parts = rest.splitn(4, ':');
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(year), Some(month), Some(day), Some(slug)) => {
                        let id = PostId::new(year, month, day, slug).map_err(|_| unknown())?;
                        Ok(PageId::Post(id))
                    }
                    _ => Err(unknown()),
                }
            }
            "slides" => Ok(PageId::Slides(rest.to_owned())),
            prefix => {
                let kind: TagKind = prefix.parse().map_err(|_| unknown())?;
                Ok(PageId::Tag(kind, rest.to_owned()))
            }
        }
    }
}

/// The outcome of [`PageStore::recompute`].
#[derive(Debug, Default)]
pub struct RouteChanges {
    /// Every route of every successfully rebuilt page, changed or not.
    pub updated: Vec<Route>,

    /// Routes that no longer belong to any page.
    pub removed: Vec<Route>,

    /// Pages that couldn't be built. Their previous routes are kept.
    pub failures: Vec<Error>,
}

/// Holds the route set each page produced on its last successful build.
pub struct PageStore {
    page_size: usize,
    pages: BTreeMap<PageId, Vec<Route>>,

    /// Which page currently owns each route path.
    owners: HashMap<String, PageId>,
}

impl PageStore {
    /// Creates an empty store. Collections are split into pages of
    /// `page_size` posts.
    pub fn new(page_size: usize) -> PageStore {
        PageStore {
            page_size: page_size.max(1),
            pages: BTreeMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Rebuilds the pages in `updated` from the current `content` snapshot
    /// and drops the pages in `removed`, reporting the routes to write and
    /// the routes to delete.
    pub fn recompute(
        &mut self,
        content: &ContentStore,
        updated: &BTreeSet<PageId>,
        removed: &BTreeSet<PageId>,
    ) -> RouteChanges {
        let mut changes = RouteChanges::default();

        for id in removed {
            if let Some(routes) = self.pages.remove(id) {
                debug!(page = %id, routes = routes.len(), "dropping page");
                for route in &routes {
                    self.release(&route.route_path, id);
                }
                changes.removed.extend(routes);
            }
        }

        for id in updated {
            let routes = match self.build(content, id) {
                Ok(routes) => routes,
                Err(err) => {
                    error!(page = %id, %err, "failed to build page");
                    changes.failures.push(err);
                    continue;
                }
            };

            let previous = self.pages.insert(id.clone(), routes.clone());
            for old in previous.unwrap_or_default() {
                if !routes.iter().any(|r| r.route_path == old.route_path) {
                    self.release(&old.route_path, id);
                    changes.removed.push(old);
                }
            }
            for route in &routes {
                self.owners.insert(route.route_path.clone(), id.clone());
            }
            changes.updated.extend(routes);
        }
        changes
    }

    fn release(&mut self, route_path: &str, id: &PageId) {
        if self.owners.get(route_path) == Some(id) {
            self.owners.remove(route_path);
        }
    }

    /// Every route currently held whose kind is in `kinds`, in page order.
    pub fn routes_of_kinds(&self, kinds: &BTreeSet<RouteKind>) -> Vec<Route> {
        self.pages
            .values()
            .flatten()
            .filter(|route| kinds.contains(&route.kind))
            .cloned()
            .collect()
    }

    /// The routes `id` produced on its last successful build.
    pub fn routes(&self, id: &PageId) -> Option<&[Route]> {
        self.pages.get(id).map(Vec::as_slice)
    }

    pub fn page_ids(&self) -> impl Iterator<Item = &PageId> {
        self.pages.keys()
    }

    fn build(&self, content: &ContentStore, id: &PageId) -> Result<Vec<Route>> {
        let routes = match id {
            PageId::Fixed(FixedPage::Home) => {
                vec![Route::new(RouteKind::Home, "/", RouteData::Home)]
            }
            PageId::Fixed(FixedPage::Blog) => self.build_blog(content),
            PageId::Fixed(FixedPage::Experience) => vec![Route::new(
                RouteKind::Experience,
                "/experience/",
                RouteData::Experiences(content.experiences().into()),
            )],
            PageId::Fixed(FixedPage::Projects) => vec![Route::new(
                RouteKind::Projects,
                "/projects/",
                RouteData::Projects(content.projects().into()),
            )],
            PageId::Post(post_id) => {
                let post = content
                    .post(post_id)
                    .ok_or_else(|| Error::MissingContent(id.clone()))?;
                vec![Route::new(
                    RouteKind::Post,
                    post.route_path(),
                    RouteData::Post(post),
                )]
            }
            PageId::Slides(slug) => {
                let slide = content
                    .slide(slug)
                    .ok_or_else(|| Error::MissingContent(id.clone()))?;
                let route_path = format!("/slides/{}/", slug);
                let markdown_route_path = format!("{}index.md", route_path);
                vec![
                    Route::new(
                        RouteKind::Slides,
                        route_path,
                        RouteData::Slides {
                            slide: slide.clone(),
                            markdown_route_path: markdown_route_path.clone(),
                        },
                    ),
                    Route::new(
                        RouteKind::SlidesMarkdown,
                        markdown_route_path,
                        RouteData::SlidesMarkdown(slide),
                    ),
                ]
            }
            PageId::Tag(kind, name) => {
                if !content.tags(*kind).contains(name) {
                    return Err(Error::MissingContent(id.clone()));
                }
                self.build_tag(content, *kind, name)
            }
        };

        for route in &routes {
            if let Some(owner) = self.owners.get(&route.route_path) {
                if owner != id {
                    return Err(Error::DuplicateRoute {
                        route_path: route.route_path.clone(),
                        page: id.clone(),
                        owner: owner.clone(),
                    });
                }
            }
        }
        Ok(routes)
    }

    fn build_blog(&self, content: &ContentStore) -> Vec<Route> {
        let posts = content.posts();
        let mut routes = self.collection_routes(&posts, BLOG_PATH, None, BLOG_TITLE, None);
        routes.push(Route::new(
            RouteKind::Rss,
            FEED_PATH,
            RouteData::Feed(posts.into()),
        ));
        routes
    }

    fn build_tag(&self, content: &ContentStore, kind: TagKind, name: &str) -> Vec<Route> {
        let segment = kind.collection_segment();
        let route_base = format!("{}{}/{}/", BLOG_PATH, segment, tag::url_safe(name));
        let file_base = format!("{}{}/{}/", BLOG_PATH, segment, tag::file_safe(name));
        let file_base = if file_base != route_base {
            Some(file_base.as_str())
        } else {
            None
        };
        let posts = content.posts_tagged(kind, name);
        self.collection_routes(&posts, &route_base, file_base, name, Some(kind))
    }

    fn collection_routes(
        &self,
        posts: &[Arc<Post>],
        route_base: &str,
        file_base: Option<&str>,
        title: &str,
        tag: Option<TagKind>,
    ) -> Vec<Route> {
        paginate(posts, route_base, self.page_size)
            .into_iter()
            .map(|page| {
                let mut route = Route::new(
                    RouteKind::BlogCollection,
                    page.route_path,
                    RouteData::Collection(Arc::new(Collection {
                        title: title.to_owned(),
                        tag,
                        page_number: page.number,
                        page_count: page.count,
                        prev_route_path: page.prev_route_path,
                        next_route_path: page.next_route_path,
                        posts: page.items.to_vec(),
                    })),
                );
                route.file_path =
                    file_base.and_then(|base| page_route_path(base, page.number, page.count));
                route
            })
            .collect()
    }
}

/// Represents the result of a page-store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to build a page's routes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when parsing a page id from a string that doesn't match any
    /// page shape.
    #[error("unknown page id `{0}`")]
    UnknownPageId(String),

    /// Returned when a page's backing content (a post, a slide deck, or any
    /// item carrying a tag) isn't in the content store.
    #[error("no content backs page `{0}`")]
    MissingContent(PageId),

    /// Returned when a page would produce a route path already owned by a
    /// different page.
    #[error("page `{page}` produces `{route_path}`, which belongs to `{owner}`")]
    DuplicateRoute {
        route_path: String,
        page: PageId,
        owner: PageId,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        content: ContentStore,
        pages: PageStore,
    }

    impl Fixture {
        fn new() -> Fixture {
            let dir = tempfile::tempdir().unwrap();
            let content = ContentStore::new(dir.path(), false);
            Fixture {
                dir,
                content,
                pages: PageStore::new(5),
            }
        }

        fn post(&self, day: u32, slug: &str, frontmatter: &str) -> PathBuf {
            let path = self
                .dir
                .path()
                .join(format!("blog/2024/05/{:02}/{}.md", day, slug));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("---\n{}\n---\nBody.\n", frontmatter)).unwrap();
            path
        }

        async fn cycle(&mut self, updated: &[PathBuf], removed: &[PathBuf]) -> RouteChanges {
            let changes = self.content.refresh(updated, removed).await;
            assert!(changes.failures.is_empty(), "{:?}", changes.failures);
            self.pages
                .recompute(&self.content, &changes.pages_updated, &changes.pages_removed)
        }
    }

    fn paths(routes: &[Route]) -> BTreeSet<&str> {
        routes.iter().map(|r| r.route_path.as_str()).collect()
    }

    fn id(s: &str) -> PageId {
        s.parse().unwrap()
    }

    #[test]
    fn test_page_id_strings() {
        for s in [
            "home",
            "blog",
            "experience",
            "projects",
            "post:2024:05:01:hello",
            "slides:intro",
            "language:C#",
            "technology:a:b",
        ] {
            assert_eq!(s, id(s).to_string());
        }
        assert_eq!(
            PageId::Tag(TagKind::Technology, "a:b".to_owned()),
            id("technology:a:b")
        );
        for s in ["", "about", "post:2024:05", "language:", "color:red", "post:2024:13:01:x"] {
            assert!(matches!(s.parse::<PageId>(), Err(Error::UnknownPageId(_))), "{}", s);
        }
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let mut f = Fixture::new();
        let path = f.post(1, "hello", "title: Hello\nlanguages: [Go]");
        let first = f.cycle(&[path], &[]).await;
        assert_eq!(
            BTreeSet::from([
                "/blog/",
                "/feed.xml",
                "/blog/2024/05/01/hello/",
                "/blog/languages/Go/",
            ]),
            paths(&first.updated)
        );

        let ids: BTreeSet<PageId> = f.pages.page_ids().cloned().collect();
        let second = f.pages.recompute(&f.content, &ids, &BTreeSet::new());
        assert!(second.removed.is_empty());
        assert!(second.failures.is_empty());
        assert_eq!(paths(&first.updated), paths(&second.updated));
        assert_eq!(first.updated.len(), second.updated.len());
        for route in &second.updated {
            assert!(first.updated.contains(route));
        }
    }

    #[tokio::test]
    async fn test_pagination_shrinks_when_posts_are_removed() {
        let mut f = Fixture::new();
        let posts: Vec<PathBuf> = (1..=6)
            .map(|day| f.post(day, &format!("p{}", day), "title: P\nlanguages: [Go]"))
            .collect();
        let changes = f.cycle(&posts, &[]).await;
        assert!(paths(&changes.updated).contains("/blog/languages/Go/page/2/"));
        assert!(paths(&changes.updated).contains("/blog/page/2/"));

        fs::remove_file(&posts[0]).unwrap();
        let changes = f.cycle(&[], &posts[..1]).await;
        assert_eq!(
            BTreeSet::from([
                "/blog/page/2/",
                "/blog/languages/Go/page/2/",
                "/blog/2024/05/01/p1/",
            ]),
            paths(&changes.removed)
        );
        assert_eq!(
            BTreeSet::from(["/blog/", "/feed.xml", "/blog/languages/Go/"]),
            paths(&changes.updated)
        );
    }

    #[tokio::test]
    async fn test_collection_payload() {
        let mut f = Fixture::new();
        let posts: Vec<PathBuf> = (1..=7)
            .map(|day| f.post(day, &format!("p{}", day), &format!("title: P{}", day)))
            .collect();
        let changes = f.cycle(&posts, &[]).await;
        let page_two = changes
            .updated
            .iter()
            .find(|r| r.route_path == "/blog/page/2/")
            .unwrap();
        let collection = match &page_two.data {
            RouteData::Collection(collection) => collection,
            other => panic!("expected a collection, got {:?}", other),
        };
        assert_eq!(2, collection.page_number);
        assert_eq!(2, collection.page_count);
        assert_eq!(Some("/blog/".to_owned()), collection.prev_route_path);
        assert_eq!(None, collection.next_route_path);
        let titles: Vec<&str> = collection.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(vec!["P2", "P1"], titles);
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let mut f = Fixture::new();
        let path = f.post(1, "hello", "title: Hello\nlanguages: [Zig]");
        f.cycle(&[path.clone()], &[]).await;
        assert!(f.pages.routes(&id("language:Zig")).is_some());

        f.post(1, "hello", "title: Hello");
        let changes = f.cycle(&[path], &[]).await;
        assert_eq!(BTreeSet::from(["/blog/languages/Zig/"]), paths(&changes.removed));
        assert!(f.pages.routes(&id("language:Zig")).is_none());
    }

    #[tokio::test]
    async fn test_tag_routes_escape_paths() {
        let mut f = Fixture::new();
        let path = f.post(1, "hello", "title: Hello\nlanguages: [\"C#\", \"C++\"]");
        f.cycle(&[path], &[]).await;

        let sharp = &f.pages.routes(&id("language:C#")).unwrap()[0];
        assert_eq!("/blog/languages/C~sharp~/", sharp.route_path);
        assert_eq!(None, sharp.file_path);

        let plus = &f.pages.routes(&id("language:C++")).unwrap()[0];
        assert_eq!("/blog/languages/C%2B%2B/", plus.route_path);
        assert_eq!(Some("/blog/languages/C++/".to_owned()), plus.file_path);
    }

    #[tokio::test]
    async fn test_drafts_produce_no_routes() {
        let mut f = Fixture::new();
        let path = f.post(1, "wip", "title: WIP\ndraft: true\nlanguages: [Go]");
        let changes = f.cycle(&[path.clone()], &[]).await;
        assert!(changes.updated.is_empty());

        f.post(1, "wip", "title: WIP\nlanguages: [Go]");
        let changes = f.cycle(&[path], &[]).await;
        assert_eq!(
            BTreeSet::from([
                "/blog/",
                "/feed.xml",
                "/blog/2024/05/01/wip/",
                "/blog/languages/Go/",
            ]),
            paths(&changes.updated)
        );
    }

    #[tokio::test]
    async fn test_slides_have_html_and_markdown_routes() {
        let mut f = Fixture::new();
        let path = f.dir.path().join("slides/intro.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "---\ntitle: Intro\n---\n# One\n---\n# Two\n").unwrap();
        let changes = f.cycle(&[path.clone()], &[]).await;
        assert_eq!(
            BTreeSet::from(["/slides/intro/", "/slides/intro/index.md"]),
            paths(&changes.updated)
        );

        fs::remove_file(&path).unwrap();
        let changes = f.cycle(&[], &[path]).await;
        assert_eq!(
            BTreeSet::from(["/slides/intro/", "/slides/intro/index.md"]),
            paths(&changes.removed)
        );
    }

    #[tokio::test]
    async fn test_failed_page_keeps_previous_routes() {
        let mut f = Fixture::new();
        let path = f.post(1, "hello", "title: Hello");
        f.cycle(&[path], &[]).await;

        let ghost = id("post:2024:05:02:ghost");
        let changes = f.pages.recompute(
            &f.content,
            &BTreeSet::from([ghost, id("blog")]),
            &BTreeSet::new(),
        );
        assert_eq!(1, changes.failures.len());
        assert!(matches!(changes.failures[0], Error::MissingContent(_)));
        assert!(paths(&changes.updated).contains("/blog/"));
        assert!(f.pages.routes(&id("post:2024:05:01:hello")).is_some());
    }

    #[tokio::test]
    async fn test_removing_unknown_page_is_a_no_op() {
        let mut f = Fixture::new();
        let changes = f.pages.recompute(
            &f.content,
            &BTreeSet::new(),
            &BTreeSet::from([id("slides:nope"), id("language:Go")]),
        );
        assert!(changes.removed.is_empty());
        assert!(changes.failures.is_empty());
    }

    #[tokio::test]
    async fn test_routes_of_kinds_selects_only_requested_kinds() {
        let mut f = Fixture::new();
        let a = f.post(1, "a", "title: A\nlanguages: [Go]");
        let b = f.post(2, "b", "title: B");
        f.cycle(&[a, b], &[]).await;
        f.pages.recompute(
            &f.content,
            &BTreeSet::from([id("home")]),
            &BTreeSet::new(),
        );

        let routes = f.pages.routes_of_kinds(&BTreeSet::from([RouteKind::Post]));
        assert_eq!(
            BTreeSet::from(["/blog/2024/05/01/a/", "/blog/2024/05/02/b/"]),
            paths(&routes)
        );
        assert!(routes.iter().all(|r| r.kind == RouteKind::Post));
    }
}
