//! Static HTML summary report
//!
//! Rendering is a pure function of the result and the run timestamp. Every
//! value taken from the result is escaped before it reaches the document;
//! the only raw markup is the fixed page skeleton and stylesheet.

use crate::error::Result;
use crate::model::{AuditResult, Finding, Impact};
use crate::reporter::ReportTimestamp;

pub const NO_VIOLATIONS_MESSAGE: &str = "No accessibility violations found.";
pub const NO_INCOMPLETE_MESSAGE: &str = "No checks need manual review.";
pub const NO_PASSES_MESSAGE: &str = "No checks passed.";

const REPORT_TITLE: &str = "Accessibility Report";

const STYLESHEET: &str = "\
body { font-family: system-ui, -apple-system, sans-serif; margin: 0 auto; max-width: 960px; padding: 2rem; color: #1f2328; }
header .meta { color: #57606a; margin: 0.25rem 0; }
.summary { display: flex; gap: 1rem; margin: 1.5rem 0; }
.card { flex: 1; border-radius: 8px; padding: 1rem; text-align: center; background: #f6f8fa; }
.card .count { display: block; font-size: 2rem; font-weight: 700; }
.card-violations { background: #ffebe9; }
.card-passes { background: #dafbe1; }
.card-incomplete { background: #fff8c5; }
article { border: 1px solid #d0d7de; border-radius: 8px; padding: 1rem; margin: 1rem 0; }
article h3 { margin-top: 0; }
.badge { border-radius: 4px; color: #fff; font-size: 0.8rem; padding: 0.1rem 0.5rem; text-transform: uppercase; }
.badge-critical { background: #a40e26; }
.badge-serious { background: #cf222e; }
.badge-moderate { background: #bc4c00; }
.badge-minor { background: #6e7781; }
.node { border-top: 1px solid #d0d7de; padding-top: 0.5rem; }
pre { background: #f6f8fa; overflow-x: auto; padding: 0.5rem; white-space: pre-wrap; }
.empty { color: #1a7f37; font-weight: 600; }
";

/// HTML format reporter
pub struct HtmlReporter;

impl HtmlReporter {
    /// Render the summary document
    ///
    /// Fails with [`AuditError::Render`](crate::error::AuditError::Render)
    /// before producing any output if a violation carries an impact outside
    /// the four known severities.
    pub fn format(result: &AuditResult, timestamp: &ReportTimestamp) -> Result<String> {
        let impacts = result
            .violations
            .iter()
            .map(Finding::impact_level)
            .collect::<Result<Vec<Impact>>>()?;

        let mut html = HtmlBuilder::new();
        html.raw("<!DOCTYPE html>\n")
            .raw("<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n")
            .raw("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n")
            .element("title", &[], REPORT_TITLE)
            .raw("\n<style>\n")
            .raw(STYLESHEET)
            .raw("</style>\n</head>\n<body>\n");

        Self::header(&mut html, result, timestamp);
        Self::summary(&mut html, result);
        Self::violations(&mut html, result, &impacts);
        Self::incomplete(&mut html, result);
        Self::passes(&mut html, result);

        html.raw("</body>\n</html>\n");
        Ok(html.finish())
    }

    fn header(html: &mut HtmlBuilder, result: &AuditResult, timestamp: &ReportTimestamp) {
        let iso = timestamp.iso();
        html.open("header", &[])
            .element("h1", &[], REPORT_TITLE)
            .open("p", &[("class", "meta")])
            .text("Generated ")
            .element("time", &[("datetime", &iso)], &iso)
            .close("p");
        if let Some(url) = result.page_url() {
            html.open("p", &[("class", "meta")])
                .text("Page: ")
                .element("code", &[], url)
                .close("p");
        }
        html.close("header");
    }

    fn summary(html: &mut HtmlBuilder, result: &AuditResult) {
        let counts = result.counts();
        html.open("section", &[("class", "summary")]);
        for (key, label, count) in [
            ("violations", "Violations", counts.violations),
            ("passes", "Passes", counts.passes),
            ("incomplete", "Incomplete", counts.incomplete),
            ("inapplicable", "Not Applicable", counts.inapplicable),
        ] {
            let class = format!("card card-{}", key);
            html.raw(&format!("<div class=\"{}\">", class))
                .element("span", &[("class", "count")], &count.to_string())
                .element("span", &[("class", "label")], label)
                .raw("</div>\n");
        }
        html.close("section");
    }

    fn violations(html: &mut HtmlBuilder, result: &AuditResult, impacts: &[Impact]) {
        html.open("section", &[("class", "violations")])
            .element("h2", &[], "Violations");

        if result.violations.is_empty() {
            html.element("p", &[("class", "empty")], NO_VIOLATIONS_MESSAGE);
        }

        for (finding, impact) in result.violations.iter().zip(impacts) {
            html.open("article", &[("class", "violation")])
                .open("h3", &[])
                .element("code", &[], &finding.id)
                .raw(" ")
                .element(
                    "span",
                    &[("class", &format!("badge {}", impact.badge_class()))],
                    impact.as_str(),
                )
                .close("h3")
                .element("p", &[], &finding.description);
            help_link(html, finding);

            for node in &finding.nodes {
                html.open("div", &[("class", "node")])
                    .open("p", &[])
                    .element("strong", &[], "Target: ")
                    .element("code", &[], &node.target_display())
                    .close("p")
                    .element("pre", &[], &node.html);
                if let Some(summary) = &node.failure_summary {
                    html.element("pre", &[("class", "failure-summary")], summary);
                }
                html.close("div");
            }

            html.close("article");
        }

        html.close("section");
    }

    fn incomplete(html: &mut HtmlBuilder, result: &AuditResult) {
        html.open("section", &[("class", "incomplete")])
            .element("h2", &[], "Needs Review");

        if result.incomplete.is_empty() {
            html.element("p", &[("class", "empty")], NO_INCOMPLETE_MESSAGE);
        }

        for finding in &result.incomplete {
            html.open("article", &[("class", "incomplete-item")])
                .open("h3", &[])
                .element("code", &[], &finding.id)
                .close("h3")
                .element("p", &[], &finding.description);
            help_link(html, finding);
            html.close("article");
        }

        html.close("section");
    }

    fn passes(html: &mut HtmlBuilder, result: &AuditResult) {
        html.open("section", &[("class", "passes")])
            .element("h2", &[], "Passes");
        match result.passes.len() {
            0 => html.element("p", &[("class", "empty")], NO_PASSES_MESSAGE),
            1 => html.element("p", &[], "1 check passed."),
            n => html.element("p", &[], &format!("{} checks passed.", n)),
        };
        html.close("section");
    }
}

fn help_link(html: &mut HtmlBuilder, finding: &Finding) {
    let url = finding.help_url.as_str();
    if url.is_empty() {
        return;
    }
    html.open("p", &[]);
    if url.starts_with("https://") || url.starts_with("http://") {
        html.element(
            "a",
            &[("href", url), ("target", "_blank"), ("rel", "noopener noreferrer")],
            "Learn more",
        );
    } else {
        html.text("Learn more: ").element("code", &[], url);
    }
    html.close("p");
}

/// Escape text content
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Append-only document builder
///
/// `text`, `element` and attribute values are escaped; `raw` is reserved for
/// fixed markup.
struct HtmlBuilder {
    out: String,
}

impl HtmlBuilder {
    fn new() -> Self {
        Self {
            out: String::with_capacity(8 * 1024),
        }
    }

    fn raw(&mut self, markup: &str) -> &mut Self {
        self.out.push_str(markup);
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        self.out.push_str(&escape_text(text));
        self
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.open_inline(tag, attrs);
        if is_block(tag) {
            self.out.push('\n');
        }
        self
    }

    fn close(&mut self, tag: &str) -> &mut Self {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        if is_block(tag) || tag == "p" || tag == "h3" {
            self.out.push('\n');
        }
        self
    }

    fn element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> &mut Self {
        let block = is_block(tag);
        self.open_inline(tag, attrs).text(text);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        if block || matches!(tag, "p" | "h1" | "h2" | "pre" | "title") {
            self.out.push('\n');
        }
        self
    }

    fn open_inline(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(value));
            self.out.push('"');
        }
        self.out.push('>');
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

fn is_block(tag: &str) -> bool {
    matches!(tag, "header" | "section" | "article" | "div")
}
