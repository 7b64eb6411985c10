use super::{collapse_whitespace, FeedSource};
use crate::types::{AppError, Paper, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv export API (Atom).
pub struct ArxivSource {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivSource {
    pub fn new(http: reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or(DEFAULT_ARXIV_URL).to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for ArxivSource {
    fn name(&self) -> &'static str {
        "arXiv"
    }

    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search_query", format!("all:{}", query).as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Feed(format!("arXiv request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Feed(format!(
                "arXiv returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Feed(format!("Failed to read arXiv response: {}", e)))?;

        let entries = parse_atom(&body)?;
        let total = entries.len();
        let papers: Vec<Paper> = entries
            .into_iter()
            .filter(|p| p.published.is_some_and(|published| published > cutoff))
            .collect();

        tracing::debug!(total, recent = papers.len(), "Parsed arXiv feed");
        Ok(papers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Summary,
    Published,
    Id,
    AuthorName,
}

fn field_for(name: &[u8], in_author: bool) -> Option<Field> {
    match name {
        b"title" if !in_author => Some(Field::Title),
        b"summary" if !in_author => Some(Field::Summary),
        b"published" if !in_author => Some(Field::Published),
        b"id" if !in_author => Some(Field::Id),
        b"name" if in_author => Some(Field::AuthorName),
        _ => None,
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    summary: String,
    published: String,
    id: String,
    authors: Vec<String>,
    alternate_link: Option<String>,
    first_link: Option<String>,
}

impl EntryBuilder {
    fn link(&mut self, e: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let value = attr.unescape_value().map(|v| v.into_owned()).unwrap_or_default();
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }
        let Some(href) = href else { return };
        if rel.as_deref().unwrap_or("alternate") == "alternate" && self.alternate_link.is_none() {
            self.alternate_link = Some(href.clone());
        }
        if self.first_link.is_none() {
            self.first_link = Some(href);
        }
    }

    fn push_text(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Summary => self.summary.push_str(text),
            Field::Published => self.published.push_str(text),
            Field::Id => self.id.push_str(text),
            Field::AuthorName => {
                if let Some(last) = self.authors.last_mut() {
                    last.push_str(text);
                }
            }
        }
    }

    fn build(self) -> Paper {
        let published = DateTime::parse_from_rfc3339(self.published.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok();
        let link = self
            .alternate_link
            .or(self.first_link)
            .unwrap_or_else(|| self.id.trim().to_string());

        Paper {
            source: "arXiv".to_string(),
            title: collapse_whitespace(&self.title),
            authors: self
                .authors
                .iter()
                .map(|a| collapse_whitespace(a))
                .filter(|a| !a.is_empty())
                .collect(),
            summary: collapse_whitespace(&self.summary),
            link,
            published,
        }
    }
}

/// Parse the entries of an arXiv Atom feed, newest first as served.
pub fn parse_atom(xml: &str) -> Result<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut buf = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => entry = Some(EntryBuilder::default()),
                    b"author" if entry.is_some() => in_author = true,
                    b"link" => {
                        if let Some(builder) = entry.as_mut() {
                            builder.link(&e);
                        }
                    }
                    other if entry.is_some() => {
                        field = field_for(other, in_author);
                        if field == Some(Field::AuthorName) {
                            if let Some(builder) = entry.as_mut() {
                                builder.authors.push(String::new());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(builder) = entry.as_mut() {
                        builder.link(&e);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(builder), Some(f)) = (entry.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    builder.push_text(f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(builder), Some(f)) = (entry.as_mut(), field) {
                    builder.push_text(f, &String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(builder) = entry.take() {
                        papers.push(builder.build());
                    }
                    field = None;
                    in_author = false;
                }
                b"author" => in_author = false,
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::Feed(format!(
                    "Malformed arXiv feed at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
        buf.clear();
    }

    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-02T10:00:00Z</published>
    <title>Attention
      Is Still All You Need</title>
    <summary>  We revisit   the transformer &amp; friends.
    </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2312.99999v1</id>
    <published>2023-12-01T08:30:00Z</published>
    <title>Older Paper</title>
    <summary>Old.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_atom() {
        let papers = parse_atom(FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.source, "arXiv");
        assert_eq!(first.title, "Attention Is Still All You Need");
        assert_eq!(first.summary, "We revisit the transformer & friends.");
        assert_eq!(first.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(first.link, "http://arxiv.org/abs/2401.00001v1");
        assert_eq!(
            first.published.unwrap().to_rfc3339(),
            "2024-01-02T10:00:00+00:00"
        );

        // No <link>: falls back to the entry id
        assert_eq!(papers[1].link, "http://arxiv.org/abs/2312.99999v1");
    }

    #[test]
    fn test_feed_title_is_not_an_entry() {
        let papers = parse_atom(FEED).unwrap();
        assert!(papers.iter().all(|p| p.title != "ArXiv Query"));
    }

    #[test]
    fn test_malformed_feed() {
        assert!(parse_atom("<feed><entry><title>x</entry>").is_err());
    }

    #[test]
    fn test_empty_feed() {
        assert!(parse_atom("<feed></feed>").unwrap().is_empty());
    }
}
