use crate::ApiError;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    json,
    Value,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `name=value` (or just `name`).
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
        let tag = Self::new(name.trim(), value.trim());
        if tag.name.is_empty() {
            return Err(ApiError::validation(format!("tag {raw:?} has no name")));
        }
        Ok(tag)
    }
}

/// Page body, either HTML or Markdown. BookStack renders the other format itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageContent {
    Html(String),
    Markdown(String),
}

impl PageContent {
    /// Exactly one of `html` and `markdown` must be given.
    pub fn from_parts(html: Option<String>, markdown: Option<String>) -> Result<Self, ApiError> {
        match (html, markdown) {
            (Some(html), None) => Ok(PageContent::Html(html)),
            (None, Some(markdown)) => Ok(PageContent::Markdown(markdown)),
            (Some(_), Some(_)) => Err(ApiError::validation("provide either html or markdown, not both")),
            (None, None) => Err(ApiError::validation("provide html or markdown content")),
        }
    }

    fn field(&self) -> (&'static str, &str) {
        match self {
            PageContent::Html(html) => ("html", html),
            PageContent::Markdown(markdown) => ("markdown", markdown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub shelf_id: u64,
    pub name: String,
    pub description: String,
    pub tags: Vec<Tag>,
}

impl NewBook {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive_id("shelf_id", self.shelf_id)?;
        non_blank("name", &self.name)
    }

    pub(crate) fn body(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description,
            "tags": self.tags,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub book_id: u64,
    /// Places the page inside this chapter instead of at the top level of the book.
    pub chapter_id: Option<u64>,
    pub name: String,
    pub content: PageContent,
    pub tags: Vec<Tag>,
}

impl NewPage {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive_id("book_id", self.book_id)?;
        if let Some(chapter_id) = self.chapter_id {
            positive_id("chapter_id", chapter_id)?;
        }
        non_blank("name", &self.name)
    }

    pub(crate) fn body(&self) -> Value {
        let (field, content) = self.content.field();
        let mut body = json!({
            "name": self.name.trim(),
            "tags": self.tags,
        });
        body[field] = content.into();
        match self.chapter_id {
            Some(chapter_id) => body["chapter_id"] = chapter_id.into(),
            None => body["book_id"] = self.book_id.into(),
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAppend {
    pub page_id: u64,
    /// Must be the same kind the page is edited in.
    pub content: PageContent,
    /// Added to the page's existing tags.
    pub tags: Vec<Tag>,
}

impl PageAppend {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive_id("page_id", self.page_id)
    }

    /// Update body for a page that currently holds `existing` (the page detail response).
    pub(crate) fn body(&self, existing: &Value) -> Result<Value, ApiError> {
        let (field, addition) = self.content.field();
        let page_kind = if is_markdown_page(existing) { "markdown" } else { "html" };
        if field != page_kind {
            return Err(ApiError::validation(format!(
                "page {} holds {page_kind} content, cannot append {field}",
                self.page_id
            )));
        }

        let current = existing[field].as_str().unwrap_or_default();
        let combined = match (&self.content, current.is_empty()) {
            (_, true) => addition.to_string(),
            (PageContent::Html(_), false) => format!("{current}{addition}"),
            (PageContent::Markdown(_), false) => format!("{current}\n\n{addition}"),
        };

        let name = existing["name"].as_str().unwrap_or_default();
        let mut body = json!({ "name": name });
        body[field] = combined.into();
        if !self.tags.is_empty() {
            let mut tags = existing_tags(existing);
            for tag in &self.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
            body["tags"] = json!(tags);
        }
        Ok(body)
    }
}

/// BookStack reports the page's editor; older instances leave it empty, then a
/// stored markdown source decides.
fn is_markdown_page(page: &Value) -> bool {
    match page["editor"].as_str() {
        Some(editor) if !editor.is_empty() => editor == "markdown",
        _ => page["markdown"].as_str().is_some_and(|markdown| !markdown.is_empty()),
    }
}

fn existing_tags(page: &Value) -> Vec<Tag> {
    page["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| Some(Tag::new(tag["name"].as_str()?, tag["value"].as_str().unwrap_or_default())))
                .collect()
        })
        .unwrap_or_default()
}

fn positive_id(field: &str, id: u64) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::validation(format!("{field} must be a positive integer")));
    }
    Ok(())
}

fn non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_requires_exactly_one_kind() {
        assert_eq!(
            PageContent::from_parts(Some("<p>x</p>".into()), None).unwrap(),
            PageContent::Html("<p>x</p>".into())
        );
        assert!(PageContent::from_parts(None, None).is_err());
        assert!(PageContent::from_parts(Some("a".into()), Some("b".into())).is_err());
    }

    #[test]
    fn tag_parsing() {
        assert_eq!(Tag::parse("status=draft").unwrap(), Tag::new("status", "draft"));
        assert_eq!(Tag::parse("reviewed").unwrap(), Tag::new("reviewed", ""));
        assert!(Tag::parse("=oops").is_err());
    }

    #[test]
    fn book_validation() {
        let mut book = NewBook {
            shelf_id: 1,
            name: "Runbooks".into(),
            description: String::new(),
            tags: vec![],
        };
        assert!(book.validate().is_ok());
        book.name = "   ".into();
        assert!(book.validate().is_err());
        book.name = "Runbooks".into();
        book.shelf_id = 0;
        assert!(book.validate().is_err());
    }

    #[test]
    fn page_body_prefers_chapter() {
        let page = NewPage {
            book_id: 2,
            chapter_id: Some(9),
            name: " Incident log ".into(),
            content: PageContent::Markdown("# Log".into()),
            tags: vec![],
        };
        assert_eq!(
            page.body(),
            json!({ "name": "Incident log", "tags": [], "markdown": "# Log", "chapter_id": 9 })
        );
    }

    #[test]
    fn append_concatenates_existing_content() {
        let html_page = json!({ "id": 5, "name": "Notes", "editor": "wysiwyg", "html": "<p>a</p>", "markdown": "" });
        let html = PageAppend {
            page_id: 5,
            content: PageContent::Html("<p>b</p>".into()),
            tags: vec![],
        };
        assert_eq!(
            html.body(&html_page).unwrap(),
            json!({ "name": "Notes", "html": "<p>a</p><p>b</p>" })
        );

        let markdown_page = json!({ "id": 6, "name": "Log", "editor": "markdown", "html": "<p>a</p>", "markdown": "a" });
        let markdown = PageAppend {
            page_id: 6,
            content: PageContent::Markdown("b".into()),
            tags: vec![Tag::new("appended", "yes")],
        };
        assert_eq!(
            markdown.body(&markdown_page).unwrap(),
            json!({ "name": "Log", "markdown": "a\n\nb", "tags": [{ "name": "appended", "value": "yes" }] })
        );
    }

    #[test]
    fn append_must_match_the_page_editor() {
        let markdown_page = json!({ "id": 6, "name": "Log", "editor": "markdown", "markdown": "a" });
        let html = PageAppend {
            page_id: 6,
            content: PageContent::Html("<p>b</p>".into()),
            tags: vec![],
        };
        assert!(matches!(html.body(&markdown_page), Err(ApiError::Validation(_))));

        // Without an editor field the stored markdown source decides.
        let legacy_html_page = json!({ "id": 7, "name": "Old", "html": "<p>a</p>", "markdown": "" });
        let markdown = PageAppend {
            page_id: 7,
            content: PageContent::Markdown("b".into()),
            tags: vec![],
        };
        assert!(matches!(markdown.body(&legacy_html_page), Err(ApiError::Validation(_))));
    }

    #[test]
    fn append_adds_to_existing_tags() {
        let page = json!({
            "id": 5,
            "name": "Notes",
            "editor": "wysiwyg",
            "html": "<p>a</p>",
            "tags": [
                { "id": 1, "name": "keep", "value": "me", "order": 0 },
                { "id": 2, "name": "new", "value": "1", "order": 1 },
            ],
        });
        let append = PageAppend {
            page_id: 5,
            content: PageContent::Html("<p>b</p>".into()),
            tags: vec![Tag::new("new", "1"), Tag::new("reviewed", "")],
        };

        let body = append.body(&page).unwrap();
        assert_eq!(
            body["tags"],
            json!([
                { "name": "keep", "value": "me" },
                { "name": "new", "value": "1" },
                { "name": "reviewed", "value": "" },
            ])
        );
    }
}
