//! Sitemap XML rendering.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` of a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
}

fn format_lastmod(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn render_urlset(urls: &[SitemapUrl], changefreq: &str, priority: f32) -> String {
    let mut out = String::with_capacity(128 + urls.len() * 160);
    out.push_str(XML_DECL);
    let _ = write!(out, "\n<urlset xmlns=\"{}\">\n", SITEMAP_NS);
    for url in urls {
        out.push_str("  <url>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape(url.loc.as_str()));
        if let Some(lastmod) = &url.lastmod {
            let _ = writeln!(out, "    <lastmod>{}</lastmod>", format_lastmod(lastmod));
        }
        let _ = writeln!(out, "    <changefreq>{}</changefreq>", escape(changefreq));
        let _ = writeln!(out, "    <priority>{:.2}</priority>", priority);
        out.push_str("  </url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

/// Sitemap index listing section documents by absolute URL.
pub fn render_index(section_urls: &[String]) -> String {
    let mut out = String::with_capacity(128 + section_urls.len() * 96);
    out.push_str(XML_DECL);
    let _ = write!(out, "\n<sitemapindex xmlns=\"{}\">\n", SITEMAP_NS);
    for loc in section_urls {
        let _ = writeln!(out, "  <sitemap><loc>{}</loc></sitemap>", escape(loc.as_str()));
    }
    out.push_str("</sitemapindex>\n");
    out
}
