//! Support for creating an RSS 2.0 feed from a list of posts.

use std::sync::Arc;

use rss::validation::{Validate, ValidationError};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use url::Url;

use crate::config::SiteConfig;
use crate::item::Post;

/// Renders the newest `limit` of `posts` (which must be sorted newest first)
/// as an RSS document. Item links are absolute against the site origin.
pub fn render(site: &SiteConfig, posts: &[Arc<Post>], limit: usize) -> Result<String> {
    let items = posts
        .iter()
        .take(limit)
        .map(|post| item(&site.origin, post))
        .collect::<Result<Vec<Item>>>()?;

    let channel = ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.origin.to_string())
        .description(site.description.clone().unwrap_or_else(|| site.title.clone()))
        .language(Some(site.language.clone()))
        .generator(Some(format!("ravensite {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();
    channel.validate()?;
    Ok(channel.to_string())
}

fn item(origin: &Url, post: &Post) -> Result<Item> {
    let link = origin.join(&post.route_path())?.to_string();
    let categories = post
        .languages
        .iter()
        .chain(post.technologies.iter())
        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
        .collect::<Vec<_>>();

    Ok(ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(post.description.clone())
        .pub_date(Some(post.date.to_rfc2822()))
        .categories(categories)
        .build())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post's link can't be made absolute.
    #[error("joining post link: {0}")]
    Url(#[from] url::ParseError),

    /// Returned when the assembled channel isn't valid RSS.
    #[error("invalid feed: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::item::PostId;
    use chrono::{TimeZone, Utc};

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Raven".to_owned(),
            description: Some("Notes".to_owned()),
            origin: Url::parse("https://example.org").unwrap(),
            author: None,
            language: "en-GB".to_owned(),
        }
    }

    fn post(day: u32, slug: &str, languages: &[&str]) -> Arc<Post> {
        Arc::new(Post {
            key: format!("blog/2024/05/{:02}/{}.md", day, slug),
            id: PostId::new("2024", "05", &format!("{:02}", day), slug).unwrap(),
            title: slug.to_uppercase(),
            description: Some(format!("About {}", slug)),
            date: Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap(),
            draft: false,
            languages: languages.iter().map(|s| s.to_string()).collect(),
            technologies: vec!["Docker".to_owned()],
            body: String::new(),
        })
    }

    #[test]
    fn test_items_are_absolute_and_categorized() -> Result<()> {
        let xml = render(&site(), &[post(2, "hello", &["Go"])], 500)?;
        assert!(xml.contains("<link>https://example.org/blog/2024/05/02/hello/</link>"), "{}", xml);
        assert!(xml.contains("<category>Go</category>"), "{}", xml);
        assert!(xml.contains("<category>Docker</category>"), "{}", xml);
        assert!(xml.contains("May 2024 09:30:00 +0000</pubDate>"), "{}", xml);
        assert!(xml.contains("About hello"), "{}", xml);
        Ok(())
    }

    #[test]
    fn test_limit_keeps_newest() -> Result<()> {
        let posts = [post(3, "newest", &[]), post(2, "middle", &[]), post(1, "oldest", &[])];
        let xml = render(&site(), &posts, 2)?;
        assert!(xml.contains("NEWEST"));
        assert!(xml.contains("MIDDLE"));
        assert!(!xml.contains("OLDEST"));
        Ok(())
    }
}
