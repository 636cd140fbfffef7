use chrono::Utc;
use chrono_tz::Tz;

use crate::arxiv::{abs_url, html_url, pdf_url, MetadataCache, PaperMetadata};
use crate::discussion::DiscussionRow;

pub const TIME_MARKER: &str = "<!-- TIME -->";
pub const ENTRIES_MARKER: &str = "<!-- ENTRIES -->";

/// Self-contained page with the style and the `toggle` script inlined.
pub const EMBEDDED_TEMPLATE: &str = include_str!("template.html");

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape each line and join the lines with `<br>`.
pub fn str_to_html(s: &str) -> String {
    s.lines().map(html_escape).collect::<Vec<_>>().join("<br>")
}

/// Current time in `tz`, formatted for the page header.
pub fn generation_timestamp(tz: Tz) -> String {
    Utc::now()
        .with_timezone(&tz)
        .format("%m/%d/%Y %H:%M:%S")
        .to_string()
}

fn render_entry(row: &DiscussionRow, meta: Option<&PaperMetadata>, parts: &mut Vec<String>) {
    let id = &row.arxiv_id;
    let index = row.index;

    parts.push(r#"      <div class="t1 entry">"#.to_string());

    parts.push(r#"        <div class="t2 entry-links">"#.to_string());
    parts.push(format!(
        r#"          <div class="t3 entry-id"><a href="{abs}">{id}</a></div><div class="t3">[<a href="{pdf}">pdf</a>][<a href="{html}">html</a>]</div>"#,
        abs = abs_url(id),
        id = id,
        pdf = pdf_url(id),
        html = html_url(id),
    ));
    parts.push("        </div>".to_string());

    let (title, authors, more, abstract_text) = match meta {
        Some(m) => (
            str_to_html(&m.title),
            str_to_html(&m.authors.join(", ")),
            if m.has_more_authors { " et al." } else { "" },
            str_to_html(&m.abstract_text),
        ),
        None => (String::new(), String::new(), "", String::new()),
    };

    parts.push(r#"        <div class="t2 entry-paper">"#.to_string());
    parts.push(format!(r#"          <div class="t3 entry-title">{}</div>"#, title));
    parts.push(format!(
        r#"          <div class="t3 entry-authors">{}{}</div>"#,
        authors, more
    ));
    parts.push("        </div>".to_string());

    parts.push(format!(
        r#"        <div class="t2 entry-control"><a class="t3" href="javascript:toggle('abs-{i}')">📖</a><a class="t3" href="javascript:toggle('cm-{i}')">💬</a></div>"#,
        i = index
    ));

    parts.push(format!(
        r#"        <div class="t2 entry-abstract hide" id="abs-{}">{}</div>"#,
        index, abstract_text
    ));

    parts.push(format!(
        r#"        <div class="t2 entry-comments-all" id="cm-{}">"#,
        index
    ));
    for c in &row.comments {
        let comment = if c.comment.is_empty() {
            String::new()
        } else {
            format!(": {}", str_to_html(&c.comment))
        };
        parts.push(format!(
            r#"          <div class="t3 entry-comments"><b>{}</b> ({}){}</div>"#,
            str_to_html(&c.name),
            str_to_html(&c.date),
            comment
        ));
    }
    parts.push("        </div>".to_string());

    parts.push("      </div>".to_string());
}

/// Markup for all rows, in the order given.
pub fn render_entries(rows: &[DiscussionRow], metadata: &MetadataCache) -> String {
    let mut parts = Vec::new();
    for row in rows {
        render_entry(row, metadata.get(&row.arxiv_id), &mut parts);
    }
    parts.join("\n")
}

/// Fill the template's time and entries markers.
pub fn build_html(
    rows: &[DiscussionRow],
    metadata: &MetadataCache,
    template: &str,
    generated_at: &str,
) -> String {
    let entries = render_entries(rows, metadata);
    template
        .replace(TIME_MARKER, generated_at)
        .replace(ENTRIES_MARKER, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::NamedComment;

    fn row(id: &str, index: usize, comments: &[(&str, &str)]) -> DiscussionRow {
        DiscussionRow {
            arxiv_id: id.to_string(),
            index,
            date: "1/2".to_string(),
            comments: comments
                .iter()
                .map(|(name, comment)| NamedComment {
                    name: name.to_string(),
                    date: "1/2".to_string(),
                    comment: comment.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
        assert_eq!(html_escape("Tom & Jerry's"), "Tom &amp; Jerry&#x27;s");
    }

    #[test]
    fn test_str_to_html_line_breaks() {
        assert_eq!(str_to_html("a < b\nc > d\r\ne"), "a &lt; b<br>c &gt; d<br>e");
        assert_eq!(str_to_html(""), "");
    }

    #[test]
    fn test_entry_with_metadata() {
        let mut metadata = MetadataCache::new();
        metadata.insert(
            "2101.01234".to_string(),
            PaperMetadata {
                title: "Deep\nThoughts".to_string(),
                authors: vec!["Ada".to_string(), "Alan".to_string()],
                has_more_authors: true,
                abstract_text: "We think.".to_string(),
            },
        );
        let html = render_entries(&[row("2101.01234", 4, &[("Ada", "cool")])], &metadata);

        assert!(html.contains(r#"<a href="https://arxiv.org/abs/2101.01234">2101.01234</a>"#));
        assert!(html.contains(r#"<a href="https://arxiv.org/pdf/2101.01234">pdf</a>"#));
        assert!(html.contains(r#"<a href="https://arxiv.org/html/2101.01234">html</a>"#));
        assert!(html.contains(r#"<div class="t3 entry-title">Deep<br>Thoughts</div>"#));
        assert!(html.contains(r#"<div class="t3 entry-authors">Ada, Alan et al.</div>"#));
        assert!(html.contains(r#"id="abs-4">We think.</div>"#));
        assert!(html.contains("toggle('cm-4')"));
        assert!(html.contains("<b>Ada</b> (1/2): cool</div>"));
    }

    #[test]
    fn test_missing_metadata_renders_empty_blocks() {
        let html = render_entries(&[row("2101.09999", 0, &[("Ada", "")])], &MetadataCache::new());
        assert!(html.contains(r#"<div class="t3 entry-title"></div>"#));
        assert!(html.contains(r#"<div class="t3 entry-authors"></div>"#));
        assert!(html.contains("<b>Ada</b> (1/2)</div>"));
    }

    #[test]
    fn test_build_html_fills_markers() {
        let template = "<p><!-- TIME --></p>\n<!-- ENTRIES -->\n";
        let html = build_html(
            &[row("2101.00001", 1, &[("<i>Eve</i>", "")])],
            &MetadataCache::new(),
            template,
            "01/02/2025 03:04:05",
        );
        assert!(html.starts_with("<p>01/02/2025 03:04:05</p>"));
        assert!(!html.contains(ENTRIES_MARKER));
        assert!(html.contains("<b>&lt;i&gt;Eve&lt;/i&gt;</b>"));
    }

    #[test]
    fn test_embedded_template_has_markers() {
        assert!(EMBEDDED_TEMPLATE.contains(TIME_MARKER));
        assert!(EMBEDDED_TEMPLATE.contains(ENTRIES_MARKER));
        assert!(EMBEDDED_TEMPLATE.contains("function toggle"));
    }

    #[test]
    fn test_generation_timestamp_format() {
        let ts = generation_timestamp(chrono_tz::US::Mountain);
        assert_eq!(ts.len(), "01/02/2025 03:04:05".len());
        assert_eq!(&ts[2..3], "/");
    }
}
