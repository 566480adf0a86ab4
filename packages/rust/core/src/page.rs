//! Page lookup by URL.

use tracing::{debug, info, instrument};

use pagestack_delivery::{DEFAULT_LOCALE, EntryQuery, add_editable_tags};
use pagestack_shared::{Entry, LivePreviewQuery, PAGE_CONTENT_TYPE, PAGE_URL_FIELD, Result};

use crate::stack::Stack;

impl Stack {
    /// Fetch the `page` entry whose `url` field equals `url`.
    ///
    /// Returns `Ok(None)` when no entry matches; transport and API failures
    /// are returned as errors. With live preview enabled, `preview` selects the
    /// preview session to read from and the returned entry is an annotated
    /// copy carrying editable-field tags. With live preview disabled, `preview`
    /// is ignored and entries come back untouched.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn get_page(
        &self,
        url: &str,
        preview: Option<&LivePreviewQuery>,
    ) -> Result<Option<Entry>> {
        let preview_enabled = self.config.preview_enabled();
        if !preview_enabled && preview.is_some_and(LivePreviewQuery::is_active) {
            debug!("live preview disabled, ignoring preview parameters");
        }

        let query = EntryQuery::new()
            .where_eq(PAGE_URL_FIELD, url)
            .locale(self.config.locale.as_deref());

        let Some(entry) = self
            .client
            .find_one(PAGE_CONTENT_TYPE, &query, preview)
            .await?
        else {
            info!("page not found");
            return Ok(None);
        };

        if !preview_enabled {
            return Ok(Some(entry));
        }

        let locale = self.config.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        Ok(Some(add_editable_tags(
            &entry,
            PAGE_CONTENT_TYPE,
            locale,
            self.tag_style,
        )))
    }
}

#[cfg(test)]
mod tests {
    use pagestack_delivery::TagStyle;
    use pagestack_preview::PreviewOptions;
    use pagestack_shared::{
        HttpConfig, LivePreviewQuery, LivePreviewSettings, Region, RegionSetting, StackConfig,
    };
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::Stack;

    const ENTRIES_PATH: &str = "/v3/content_types/page/entries";

    fn stack(delivery: &MockServer, preview: Option<&MockServer>) -> Stack {
        let config = StackConfig {
            api_key: "blt_api".into(),
            delivery_token: "cs_delivery".into(),
            environment: "production".into(),
            region: RegionSetting::Known(Region::Us),
            delivery_host: Some(delivery.uri()),
            live_preview: LivePreviewSettings {
                enable: preview.is_some(),
                preview_token: Some("cs_preview".into()),
                host: preview.map(MockServer::uri),
            },
            application_host: Some("app.contentstack.com".into()),
            locale: None,
        };
        Stack::new(config, &HttpConfig::default(), PreviewOptions::default()).expect("stack")
    }

    fn home_entry() -> serde_json::Value {
        json!({ "uid": "blt_home", "url": "/home", "title": "Home" })
    }

    #[tokio::test]
    async fn missing_page_is_absent_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENTRIES_PATH))
            .and(query_param("query", r#"{"url":"/no-such-url"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let page = stack(&server, None).get_page("/no-such-url", None).await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn page_without_preview_is_untagged() {
        let server = MockServer::start().await;
        Mock::given(path(ENTRIES_PATH))
            .and(query_param("query", r#"{"url":"/home"}"#))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "entries": [home_entry()] })),
            )
            .mount(&server)
            .await;

        let params = LivePreviewQuery::with_hash("hash123");
        let page = stack(&server, None)
            .get_page("/home", Some(&params))
            .await
            .unwrap()
            .expect("page");

        assert_eq!(page.uid(), Some("blt_home"));
        assert!(!page.has_editable_tags());
    }

    #[tokio::test]
    async fn page_with_preview_is_tagged() {
        let delivery = MockServer::start().await;
        let preview = MockServer::start().await;
        Mock::given(path(ENTRIES_PATH))
            .and(query_param("query", r#"{"url":"/home"}"#))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "entries": [home_entry()] })),
            )
            .mount(&delivery)
            .await;

        let page = stack(&delivery, Some(&preview))
            .get_page("/home", None)
            .await
            .unwrap()
            .expect("page");

        assert!(page.has_editable_tags());
        assert_eq!(
            page.get("$").expect("tags")["title"],
            json!({ "data-cslp": "page.blt_home.en-us.title" })
        );
    }

    #[tokio::test]
    async fn preview_params_reach_the_query() {
        let delivery = MockServer::start().await;
        let preview = MockServer::start().await;
        Mock::given(path(ENTRIES_PATH))
            .and(header("live_preview", "hash123"))
            .and(header("preview_token", "cs_preview"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{ "uid": "blt_home", "url": "/home", "title": "Unsaved draft" }]
            })))
            .expect(1)
            .mount(&preview)
            .await;

        let stack = stack(&delivery, Some(&preview)).with_tag_style(TagStyle::Attribute);
        let params = LivePreviewQuery::from_query_str("live_preview=hash123&content_type_uid=page");
        let page = stack
            .get_page("/home", Some(&params))
            .await
            .unwrap()
            .expect("page");

        assert_eq!(page.title(), Some("Unsaved draft"));
        assert_eq!(
            page.get("$").expect("tags")["title"],
            json!("data-cslp=page.blt_home.en-us.title")
        );
    }

    #[tokio::test]
    async fn concurrent_sessions_do_not_interfere() {
        let delivery = MockServer::start().await;
        let preview = MockServer::start().await;
        for (hash, title) in [("hash_a", "Draft A"), ("hash_b", "Draft B")] {
            Mock::given(path(ENTRIES_PATH))
                .and(header("live_preview", hash))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "entries": [{ "uid": "blt_home", "title": title }]
                })))
                .mount(&preview)
                .await;
        }

        let stack = stack(&delivery, Some(&preview));
        let a = LivePreviewQuery::with_hash("hash_a");
        let b = LivePreviewQuery::with_hash("hash_b");
        let (page_a, page_b) = tokio::join!(
            stack.get_page("/home", Some(&a)),
            stack.get_page("/home", Some(&b)),
        );

        assert_eq!(page_a.unwrap().expect("a").title(), Some("Draft A"));
        assert_eq!(page_b.unwrap().expect("b").title(), Some("Draft B"));
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(path(ENTRIES_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error_message": "The api_key is invalid.",
                "error_code": 104
            })))
            .mount(&server)
            .await;

        let err = stack(&server, None)
            .get_page("/home", None)
            .await
            .expect_err("should fail");
        assert!(err.is_auth_failure());
    }
}
