//! Conversions from content and route payloads into [`Value`]s for the
//! templates. Field names are the ones templates refer to (e.g.,
//! `{{ .post.title }}`).

use std::collections::HashMap;

use gtmpl_value::Value;

use crate::item::{Experience, Post, Project, Slide};
use crate::markdown::{Rendered, TocEntry};
use crate::route::Collection;
use crate::tag::{self, TagKind};

/// Builds a [`Value::Object`] from `(name, value)` pairs.
pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect::<HashMap<String, Value>>(),
    )
}

pub fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

pub fn optional(s: Option<&str>) -> Value {
    match s {
        Some(s) => string(s),
        None => Value::Nil,
    }
}

pub fn number(n: usize) -> Value {
    Value::from(n as i64)
}

/// The route path of the first page of a tag's collection.
pub fn tag_route_path(kind: TagKind, tag: &str) -> String {
    format!("/blog/{}/{}/", kind.collection_segment(), tag::url_safe(tag))
}

/// An array of `{tag, url}` objects.
pub fn tags(kind: TagKind, tags: &[String]) -> Value {
    Value::Array(
        tags.iter()
            .map(|t| object([("tag", string(t.as_str())), ("url", string(tag_route_path(kind, t)))]))
            .collect(),
    )
}

fn tag_fields(languages: &[String], technologies: &[String]) -> [(&'static str, Value); 2] {
    [
        ("languages", tags(TagKind::Language, languages)),
        ("technologies", tags(TagKind::Technology, technologies)),
    ]
}

impl From<&Post> for Value {
    /// The fields shown wherever a post is listed. The body isn't included.
    fn from(post: &Post) -> Value {
        let mut fields = vec![
            ("title", string(post.title.as_str())),
            ("description", optional(post.description.as_deref())),
            ("date", string(post.date.format("%Y-%m-%d").to_string())),
            ("display_date", string(post.date.format("%B %-d, %Y").to_string())),
            ("url", string(post.route_path())),
        ];
        fields.extend(tag_fields(&post.languages, &post.technologies));
        object(fields)
    }
}

impl From<&TocEntry> for Value {
    fn from(entry: &TocEntry) -> Value {
        object([
            ("level", Value::from(entry.level as i64)),
            ("id", string(entry.id.as_str())),
            ("title", string(entry.title.as_str())),
            ("children", Value::Array(entry.children.iter().map(Value::from).collect())),
        ])
    }
}

/// A post plus its rendered body.
pub fn post_page(post: &Post, rendered: &Rendered) -> Value {
    let mut value = Value::from(post);
    if let Value::Object(fields) = &mut value {
        fields.insert("content".to_owned(), string(rendered.html.as_str()));
        fields.insert("reading_time".to_owned(), number(rendered.reading_time));
        fields.insert(
            "toc".to_owned(),
            Value::Array(rendered.toc.iter().map(Value::from).collect()),
        );
    }
    value
}

impl From<&Collection> for Value {
    fn from(collection: &Collection) -> Value {
        object([
            ("title", string(collection.title.as_str())),
            (
                "kind",
                match collection.tag {
                    Some(kind) => string(kind.page_prefix()),
                    None => Value::Nil,
                },
            ),
            ("page_number", number(collection.page_number)),
            ("page_count", number(collection.page_count)),
            ("prev", optional(collection.prev_route_path.as_deref())),
            ("next", optional(collection.next_route_path.as_deref())),
            (
                "posts",
                Value::Array(collection.posts.iter().map(|p| Value::from(p.as_ref())).collect()),
            ),
        ])
    }
}

/// An experience entry with its rendered body.
pub fn experience(experience: &Experience, content: &str) -> Value {
    let mut fields = vec![
        ("title", string(experience.title.as_str())),
        ("start", string(experience.start.as_str())),
        ("end", optional(experience.end.as_deref())),
        ("website", optional(experience.website.as_deref())),
        ("content", string(content)),
    ];
    fields.extend(tag_fields(&experience.languages, &experience.technologies));
    object(fields)
}

/// A project entry with its rendered body.
pub fn project(project: &Project, content: &str) -> Value {
    let mut fields = vec![
        ("title", string(project.title.as_str())),
        ("description", optional(project.description.as_deref())),
        ("order", Value::from(project.order)),
        ("website", optional(project.website.as_deref())),
        ("content", string(content)),
    ];
    fields.extend(tag_fields(&project.languages, &project.technologies));
    object(fields)
}

/// A slide deck. The deck's markdown is rendered client-side from
/// `markdown_url`.
pub fn slide(slide: &Slide, markdown_route_path: &str) -> Value {
    let mut fields = vec![
        ("title", string(slide.title.as_str())),
        ("description", optional(slide.description.as_deref())),
        ("markdown_url", string(markdown_route_path)),
    ];
    fields.extend(tag_fields(&slide.languages, &slide.technologies));
    object(fields)
}
