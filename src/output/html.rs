// src/output/html.rs
//! Standalone HTML casefile

use super::{render_casefile, ReportContext};

const STYLE: &str = r#"
  :root { --bg:#0b0e11; --fg:#e6e6e6; --muted:#9aa3ac; --card:#12161c; --accent:#4ea1ff; }
  html, body { background: var(--bg); color: var(--fg); font: 16px/1.6 system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, Cantarell, Noto Sans, sans-serif; }
  a { color: var(--accent); }
  .container { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
  h1, h2, h3 { line-height: 1.25; }
  table { width: 100%; border-collapse: collapse; margin: 1rem 0; }
  th, td { border: 1px solid #2a2f36; padding: .5rem .6rem; }
  code { background: #1a1f26; padding: .15rem .3rem; border-radius: .25rem; }
  pre code, pre { display: block; padding: 1rem; overflow-x: auto; }
  .muted { color: var(--muted); }
"#;

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Markdown shown verbatim inside `<pre>`
pub fn preformatted(markdown: &str) -> String {
    format!("<pre>{}</pre>", escape_html(markdown))
}

#[cfg(feature = "markdown")]
pub fn markdown_to_html(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);
    body
}

/// Without a Markdown converter the report falls back to preformatted text
#[cfg(not(feature = "markdown"))]
pub fn markdown_to_html(markdown: &str) -> String {
    tracing::debug!("Built without Markdown support, embedding casefile as preformatted text");
    preformatted(markdown)
}

/// Wrap an HTML body in the styled casefile page
pub fn html_document(org: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ReconPilot Casefile - {title}</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>{style}</style>
</head>
<body>
  <div class="container">
    {body}
  </div>
</body>
</html>
"#,
        title = escape_html(org),
        style = STYLE,
        body = body,
    )
}

/// Render the casefile as a standalone HTML document
pub fn render_casefile_html(ctx: &ReportContext) -> String {
    let markdown = render_casefile(ctx);
    html_document(&ctx.org, &markdown_to_html(&markdown))
}
