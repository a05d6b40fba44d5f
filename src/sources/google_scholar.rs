//! Google Scholar citation source.
//!
//! Google Scholar does not have an official public API. This source reads the
//! public profile page of one author and the "Cited by" result pages of each
//! publication. Scholar answers aggressive clients with CAPTCHA pages; those
//! surface as [`SourceError::Blocked`] and never as empty results.
//!
//! This source is primarily intended for research/educational purposes.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use url::Url;

use crate::config::ScholarConfig;
use crate::models::{CitationHandle, RawCitingWork, RawPublication};
use crate::sources::{CitationSource, SourceError};
use crate::utils::{scholar_retry_config, with_retry, HttpClient, RetryConfig};

/// Rows per profile page (the largest page size Scholar accepts)
const PROFILE_PAGE_SIZE: usize = 100;

/// Results per "Cited by" page
const CITING_PAGE_SIZE: usize = 10;

/// Upper bound on profile pages, in case pagination never terminates
const MAX_PROFILE_PAGES: usize = 50;

/// Elements of Scholar's and Google's bot-detection interstitials
const CAPTCHA_SELECTOR: &str =
    "#gs_captcha_ccl, #gs_captcha_f, #captcha-form, form[action*='/sorry/'], div.g-recaptcha";

/// Content that only a genuine profile, detail or results page carries
const CONTENT_SELECTOR: &str = "div.gs_ri, tr.gsc_a_tr, #gsc_oci_table";

static RESULT_TAGS: OnceLock<Regex> = OnceLock::new();

/// Leading "[PDF]", "[HTML]", "[CITATION][C]" badges in result titles
fn result_tags() -> &'static Regex {
    RESULT_TAGS.get_or_init(|| Regex::new(r"^(?:\s*\[[^\]]*\])+\s*").expect("result tag pattern is valid"))
}

/// Extract a Scholar author id from a profile URL or a bare id.
///
/// ```rust
/// use scholar_selfcite::sources::parse_author_id;
///
/// let id = parse_author_id("https://scholar.google.com/citations?user=AbC123xyz&hl=en").unwrap();
/// assert_eq!(id, "AbC123xyz");
/// assert_eq!(parse_author_id("AbC123xyz").unwrap(), "AbC123xyz");
/// ```
pub fn parse_author_id(input: &str) -> Result<String, SourceError> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        return url
            .query_pairs()
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                SourceError::InvalidRequest(format!("No user= parameter in profile URL: {}", input))
            });
    }

    let is_id = !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_id {
        Ok(input.to_string())
    } else {
        Err(SourceError::InvalidRequest(format!(
            "Not a Google Scholar profile URL or author id: {}",
            input
        )))
    }
}

/// One row of a profile's publication table
#[derive(Debug, Clone, PartialEq)]
struct ProfileRow {
    title: String,
    authors: String,
    year: Option<i32>,
    citations: u32,
    cites_id: Option<String>,
    detail_path: Option<String>,
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("Invalid selector {}: {}", css, e)))
}

fn element_text(elem: &ElementRef) -> String {
    elem.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A CAPTCHA form on a page without any parsed content
fn is_blocked(html: &str) -> Result<bool, SourceError> {
    let document = Html::parse_document(html);
    if document.select(&selector(CONTENT_SELECTOR)?).next().is_some() {
        return Ok(false);
    }
    Ok(document.select(&selector(CAPTCHA_SELECTOR)?).next().is_some())
}

fn is_sorry_url(url: &Url) -> bool {
    url.path().starts_with("/sorry/")
}

/// Pull the `cites=` cluster id out of a "Cited by" link
fn cites_id_from_href(base: &Url, href: &str) -> Option<String> {
    base.join(href)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "cites")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn parse_profile_page(html: &str, base: &Url) -> Result<Vec<ProfileRow>, SourceError> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr.gsc_a_tr")?;
    let title_selector = selector("a.gsc_a_at")?;
    let gray_selector = selector("div.gs_gray")?;
    let cited_selector = selector("a.gsc_a_ac")?;
    let year_selector = selector("span.gsc_a_h")?;

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let Some(title_elem) = row.select(&title_selector).next() else {
            continue;
        };
        let title = element_text(&title_elem);
        if title.is_empty() {
            continue;
        }

        let detail_path = title_elem
            .value()
            .attr("href")
            .or_else(|| title_elem.value().attr("data-href"))
            .map(|href| href.to_string());

        let authors = row
            .select(&gray_selector)
            .next()
            .map(|elem| element_text(&elem))
            .unwrap_or_default();

        let cited = row.select(&cited_selector).next();
        let citations = cited
            .as_ref()
            .and_then(|elem| element_text(elem).parse::<u32>().ok())
            .unwrap_or(0);
        let cites_id = cited
            .as_ref()
            .and_then(|elem| elem.value().attr("href"))
            .and_then(|href| cites_id_from_href(base, href));

        let year = row
            .select(&year_selector)
            .next()
            .and_then(|elem| element_text(&elem).parse::<i32>().ok());

        rows.push(ProfileRow {
            title,
            authors,
            year,
            citations,
            cites_id,
            detail_path,
        });
    }

    Ok(rows)
}

/// Full author list from a publication detail page
fn parse_detail_authors(html: &str) -> Result<Option<String>, SourceError> {
    let document = Html::parse_document(html);
    let field_row = selector("div.gs_scl")?;
    let field_name = selector("div.gsc_oci_field")?;
    let field_value = selector("div.gsc_oci_value")?;

    Ok(document.select(&field_row).find_map(|row| {
        let name = row.select(&field_name).next().map(|e| element_text(&e))?;
        if !name.eq_ignore_ascii_case("authors") && !name.eq_ignore_ascii_case("inventors") {
            return None;
        }
        row.select(&field_value).next().map(|e| element_text(&e))
    }))
}

fn parse_citing_page(html: &str) -> Result<Vec<RawCitingWork>, SourceError> {
    let document = Html::parse_document(html);
    let result_selector = selector("div.gs_ri")?;
    let title_selector = selector("h3.gs_rt")?;
    let byline_selector = selector("div.gs_a")?;

    let mut works = Vec::new();
    for result in document.select(&result_selector) {
        let (Some(title_elem), Some(byline_elem)) = (
            result.select(&title_selector).next(),
            result.select(&byline_selector).next(),
        ) else {
            continue;
        };

        let title = result_tags()
            .replace(&element_text(&title_elem), "")
            .trim()
            .to_string();

        // "J Smith, A Doe - Journal of Things, 2020 - publisher.com"
        let byline = element_text(&byline_elem);
        let authors = byline
            .split(" - ")
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        works.push(RawCitingWork { title, authors });
    }

    Ok(works)
}

/// Google Scholar citation source for one author profile
#[derive(Debug, Clone)]
pub struct GoogleScholarSource {
    client: Arc<HttpClient>,
    base_url: Url,
    author_id: String,
    request_delay: Duration,
    expand_truncated_authors: bool,
    retry: RetryConfig,
}

impl GoogleScholarSource {
    /// Create a source for the profile given as URL or author id
    pub fn new(profile: &str, config: &ScholarConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_settings(
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )?;
        Self::with_client(profile, config, Arc::new(client))
    }

    /// Create with a custom HTTP client (for testing)
    pub fn with_client(
        profile: &str,
        config: &ScholarConfig,
        client: Arc<HttpClient>,
    ) -> Result<Self, SourceError> {
        let author_id = parse_author_id(profile)?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SourceError::InvalidRequest(format!("Invalid Scholar base URL {}: {}", config.base_url, e))
        })?;

        Ok(Self {
            client,
            base_url,
            author_id,
            request_delay: Duration::from_millis(config.request_delay_ms),
            expand_truncated_authors: config.expand_truncated_authors,
            retry: scholar_retry_config(),
        })
    }

    /// Override the retry policy
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidRequest(format!("Invalid Scholar URL {}: {}", path, e)))
    }

    /// Fetch one page, mapping throttling and CAPTCHA pages to errors
    async fn fetch_page(&self, url: Url) -> Result<String, SourceError> {
        let client = Arc::clone(&self.client);
        let url_for_retry = url.to_string();

        let html = with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let url = url_for_retry.clone();
            async move {
                tracing::debug!("GET {}", url);
                let response = client.get(&url).send().await.map_err(|e| {
                    if e.is_timeout() {
                        SourceError::Network(format!("Request timed out: {}", e))
                    } else {
                        SourceError::Network(format!("Failed to fetch Google Scholar page: {}", e))
                    }
                })?;

                if is_sorry_url(response.url()) {
                    return Err(SourceError::Blocked("Google Scholar".to_string()));
                }

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(SourceError::RateLimit);
                }
                if !status.is_success() {
                    return Err(SourceError::Api(format!(
                        "Google Scholar returned status: {}",
                        status
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|e| SourceError::Parse(format!("Failed to read response: {}", e)))
            }
        })
        .await?;

        if is_blocked(&html)? {
            return Err(SourceError::Blocked(self.name().to_string()));
        }
        Ok(html)
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Replace a truncated profile author list with the one from the detail page
    async fn expand_authors(&self, row: &ProfileRow) -> String {
        let truncated = row.authors.ends_with("...") || row.authors.ends_with('…');
        let Some(detail_path) = row.detail_path.as_deref() else {
            return row.authors.clone();
        };
        if !self.expand_truncated_authors || !truncated {
            return row.authors.clone();
        }

        self.pause().await;
        let detail = match self.endpoint(detail_path) {
            Ok(url) => self.fetch_page(url).await,
            Err(e) => Err(e),
        };

        match detail.and_then(|html| parse_detail_authors(&html)) {
            Ok(Some(authors)) if !authors.is_empty() => authors,
            Ok(_) => row.authors.clone(),
            Err(e) => {
                tracing::warn!("Keeping truncated author list for \"{}\": {}", row.title, e);
                row.authors.clone()
            }
        }
    }
}

#[async_trait]
impl CitationSource for GoogleScholarSource {
    fn id(&self) -> &str {
        "google_scholar"
    }

    fn name(&self) -> &str {
        "Google Scholar"
    }

    async fn list_publications(&self) -> Result<Vec<RawPublication>, SourceError> {
        let mut rows = Vec::new();

        for page in 0..MAX_PROFILE_PAGES {
            if page > 0 {
                self.pause().await;
            }

            let mut url = self.endpoint("citations")?;
            url.query_pairs_mut()
                .append_pair("user", &self.author_id)
                .append_pair("hl", "en")
                .append_pair("cstart", &(page * PROFILE_PAGE_SIZE).to_string())
                .append_pair("pagesize", &PROFILE_PAGE_SIZE.to_string());

            let html = self.fetch_page(url).await?;
            let page_rows = parse_profile_page(&html, &self.base_url)?;
            let page_len = page_rows.len();
            rows.extend(page_rows);

            if page_len < PROFILE_PAGE_SIZE {
                break;
            }
        }

        if rows.is_empty() {
            tracing::warn!("No publications found on profile {}", self.author_id);
        } else {
            tracing::info!("Found {} publications on profile {}", rows.len(), self.author_id);
        }

        let mut publications = Vec::with_capacity(rows.len());
        for row in rows {
            let authors = self.expand_authors(&row).await;
            publications.push(RawPublication {
                title: row.title,
                authors,
                year: row.year,
                total_citations: row.citations,
                citation_handle: row.cites_id.map(CitationHandle::new),
            });
        }

        Ok(publications)
    }

    async fn list_citing_works(
        &self,
        handle: &CitationHandle,
        max_results: usize,
    ) -> Result<Vec<RawCitingWork>, SourceError> {
        let mut works = Vec::new();

        while works.len() < max_results {
            self.pause().await;

            let mut url = self.endpoint("scholar")?;
            url.query_pairs_mut()
                .append_pair("cites", handle.as_str())
                .append_pair("hl", "en")
                .append_pair("start", &works.len().to_string());

            let html = self.fetch_page(url).await?;
            let page = parse_citing_page(&html)?;
            let page_len = page.len();
            works.extend(page);

            if page_len < CITING_PAGE_SIZE {
                break;
            }
        }

        works.truncate(max_results);
        tracing::debug!("Fetched {} citing works for cluster {}", works.len(), handle);
        Ok(works)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_HTML: &str = r##"
        <html><body><table id="gsc_a_t"><tbody id="gsc_a_b">
          <tr class="gsc_a_tr">
            <td class="gsc_a_t">
              <a href="/citations?view_op=view_citation&amp;citation_for_view=AbC:one" class="gsc_a_at">Graph Kernels for Molecules</a>
              <div class="gs_gray">K Lee, S Patel</div>
              <div class="gs_gray">Journal of Chemistry 12, 2019</div>
            </td>
            <td class="gsc_a_c"><a href="https://scholar.google.com/scholar?oi=bibs&amp;hl=en&amp;cites=111,222" class="gsc_a_ac gs_ibl">3</a></td>
            <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">2019</span></td>
          </tr>
          <tr class="gsc_a_tr">
            <td class="gsc_a_t">
              <a href="/citations?view_op=view_citation&amp;citation_for_view=AbC:two" class="gsc_a_at">Uncited Note</a>
              <div class="gs_gray">K Lee</div>
            </td>
            <td class="gsc_a_c"><a class="gsc_a_ac gs_ibl"></a></td>
            <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl"></span></td>
          </tr>
        </tbody></table></body></html>
    "##;

    const CITING_HTML: &str = r##"
        <html><body>
          <div class="gs_r gs_or gs_scl"><div class="gs_ri">
            <h3 class="gs_rt"><span class="gs_ctg2">[PDF]</span> <a href="#">Kernel Methods Revisited</a></h3>
            <div class="gs_a">K Lee, T Nguyen&nbsp;- Machine Learning, 2021&nbsp;- springer.com</div>
          </div></div>
          <div class="gs_r gs_or gs_scl"><div class="gs_ri">
            <h3 class="gs_rt"><a href="#">An Independent Study</a></h3>
            <div class="gs_a">R Gomez, M Chen… - arXiv preprint, 2022 - arxiv.org</div>
          </div></div>
        </body></html>
    "##;

    const DETAIL_HTML: &str = r##"
        <div id="gsc_oci_table">
          <div class="gs_scl"><div class="gsc_oci_field">Authors</div><div class="gsc_oci_value">Kim Lee, Sara Patel, Tuan Nguyen, Rosa Gomez</div></div>
          <div class="gs_scl"><div class="gsc_oci_field">Publication date</div><div class="gsc_oci_value">2019/5/1</div></div>
        </div>
    "##;

    fn test_config(base_url: &str) -> ScholarConfig {
        ScholarConfig {
            base_url: base_url.to_string(),
            request_delay_ms: 0,
            ..ScholarConfig::default()
        }
    }

    fn base() -> Url {
        Url::parse("https://scholar.google.com/").unwrap()
    }

    #[test]
    fn test_parse_author_id() {
        assert_eq!(
            parse_author_id("https://scholar.google.com/citations?hl=en&user=q-Xy_9AAAAJ").unwrap(),
            "q-Xy_9AAAAJ"
        );
        assert_eq!(parse_author_id("  q-Xy_9AAAAJ ").unwrap(), "q-Xy_9AAAAJ");
        assert!(parse_author_id("https://scholar.google.com/citations?hl=en").is_err());
        assert!(parse_author_id("not an id").is_err());
        assert!(parse_author_id("").is_err());
    }

    #[test]
    fn test_parse_profile_page() {
        let rows = parse_profile_page(PROFILE_HTML, &base()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].title, "Graph Kernels for Molecules");
        assert_eq!(rows[0].authors, "K Lee, S Patel");
        assert_eq!(rows[0].year, Some(2019));
        assert_eq!(rows[0].citations, 3);
        assert_eq!(rows[0].cites_id.as_deref(), Some("111,222"));
        assert!(rows[0].detail_path.as_deref().unwrap().contains("citation_for_view=AbC:one"));

        assert_eq!(rows[1].citations, 0);
        assert_eq!(rows[1].cites_id, None);
        assert_eq!(rows[1].year, None);
    }

    #[test]
    fn test_parse_citing_page_strips_venue_and_badges() {
        let works = parse_citing_page(CITING_HTML).unwrap();
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].title, "Kernel Methods Revisited");
        assert_eq!(works[0].authors, "K Lee, T Nguyen");
        assert_eq!(works[1].title, "An Independent Study");
        assert_eq!(works[1].authors, "R Gomez, M Chen…");
    }

    #[test]
    fn test_parse_detail_authors() {
        assert_eq!(
            parse_detail_authors(DETAIL_HTML).unwrap().as_deref(),
            Some("Kim Lee, Sara Patel, Tuan Nguyen, Rosa Gomez")
        );
        assert_eq!(parse_detail_authors("<html></html>").unwrap(), None);
    }

    #[test]
    fn test_blocked_page_detection() {
        assert!(is_blocked(r#"<div id="gs_captcha_ccl">Please show you're not a robot</div>"#).unwrap());
        assert!(is_blocked(
            r#"<p>Our systems have detected unusual traffic from your computer network.</p>
               <form id="captcha-form" action="index" method="post"><div class="g-recaptcha"></div></form>"#
        )
        .unwrap());
        assert!(!is_blocked(CITING_HTML).unwrap());
        assert!(!is_blocked(PROFILE_HTML).unwrap());
    }

    #[test]
    fn test_results_mentioning_captcha_words_are_not_blocked() {
        let html = r##"
            <div class="gs_r gs_or gs_scl"><div class="gs_ri">
              <h3 class="gs_rt"><a href="#">Detecting Unusual Traffic in Backbone Networks</a></h3>
              <div class="gs_a">R Gomez - Networking, 2020 - acm.org</div>
              <div class="gs_rs">We compare recaptcha solvers against unusual traffic detectors.</div>
            </div></div>
        "##;

        assert!(!is_blocked(html).unwrap());
        let works = parse_citing_page(html).unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].title, "Detecting Unusual Traffic in Backbone Networks");
    }

    #[test]
    fn test_sorry_url_detection() {
        assert!(is_sorry_url(&Url::parse("https://www.google.com/sorry/index?continue=x").unwrap()));
        assert!(!is_sorry_url(&Url::parse("https://scholar.google.com/scholar?cites=1").unwrap()));
    }

    #[tokio::test]
    async fn test_list_publications_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/citations")
            .match_query(mockito::Matcher::UrlEncoded("user".into(), "AbC".into()))
            .with_status(200)
            .with_body(PROFILE_HTML)
            .create_async()
            .await;

        let source = GoogleScholarSource::new("AbC", &test_config(&server.url())).unwrap();
        let publications = source.list_publications().await.unwrap();

        mock.assert_async().await;
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].total_citations, 3);
        assert_eq!(
            publications[0].citation_handle,
            Some(CitationHandle::new("111,222"))
        );
        assert!(publications[1].citation_handle.is_none());
    }

    #[tokio::test]
    async fn test_list_citing_works_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/scholar")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("cites".into(), "111,222".into()),
                mockito::Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(CITING_HTML)
            .expect(1)
            .create_async()
            .await;

        let source = GoogleScholarSource::new("AbC", &test_config(&server.url())).unwrap();
        let works = source
            .list_citing_works(&CitationHandle::new("111,222"), 50)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].authors, "K Lee, T Nguyen");
    }

    #[tokio::test]
    async fn test_captcha_page_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/scholar")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"<form id="gs_captcha_f"></form>"#)
            .create_async()
            .await;

        let source = GoogleScholarSource::new("AbC", &test_config(&server.url())).unwrap();
        let result = source
            .list_citing_works(&CitationHandle::new("111"), 10)
            .await;

        assert!(matches!(result, Err(SourceError::Blocked(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/citations")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let source = GoogleScholarSource::new("AbC", &test_config(&server.url())).unwrap();
        let result = source.list_publications().await;

        assert!(matches!(result, Err(SourceError::Api(msg)) if msg.contains("404")));
    }
}
