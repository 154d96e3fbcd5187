// tests/provider_select.rs
//
// Construction-time provider resolution: env-driven selection, the two
// construction errors, and the keyless-call failure mode.

use serial_test::serial;
use survey_insights::types::Entry;
use survey_insights::{
    EntityInsight, InsightConfig, InsightError, KeyPhraseInsight, SentimentInsight,
};

#[test]
#[serial]
fn env_provider_is_normalized_and_selected() {
    std::env::set_var("INSIGHT_PROVIDER", " OpenAI ");
    let cfg = InsightConfig::from_env();
    std::env::remove_var("INSIGHT_PROVIDER");

    assert_eq!(cfg.provider.as_deref(), Some("openai"));
    let insight = SentimentInsight::new(&cfg).expect("openai sentiment insight");
    assert_eq!(insight.provider_name(), "openai");
}

#[test]
#[serial]
fn unset_provider_falls_back_to_local_for_sentiment_only() {
    std::env::remove_var("INSIGHT_PROVIDER");
    let cfg = InsightConfig::from_env();

    let sentiment = SentimentInsight::new(&cfg).expect("local fallback");
    assert_eq!(sentiment.provider_name(), "local");

    // No local fallback for extraction: refused at construction.
    let err = KeyPhraseInsight::new(&cfg).unwrap_err();
    assert!(matches!(err, InsightError::Unsupported { provider: "local", .. }));
    let err = EntityInsight::new(&cfg).unwrap_err();
    assert!(matches!(err, InsightError::Unsupported { provider: "local", .. }));
}

#[test]
fn unknown_provider_is_refused_at_construction() {
    let cfg = InsightConfig {
        provider: Some("aws".to_string()),
        ..Default::default()
    };
    let err = SentimentInsight::new(&cfg).unwrap_err();
    assert!(matches!(err, InsightError::UnknownProvider(ref s) if s == "aws"));
    let err = KeyPhraseInsight::new(&cfg).unwrap_err();
    assert!(matches!(err, InsightError::UnknownProvider(_)));
}

#[tokio::test]
#[serial]
async fn keyless_hosted_call_fails_fast_with_missing_key() {
    std::env::remove_var("OPENAI_API_KEY");
    let cfg = InsightConfig {
        provider: Some("openai".to_string()),
        ..Default::default()
    };
    // Construction succeeds; the missing key surfaces on the call, without
    // burning retries.
    let insight = SentimentInsight::new(&cfg).expect("constructs without a key");
    let err = insight
        .analyze(&[Entry::new("hello")], None)
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::MissingApiKey("OPENAI_API_KEY")));
}

#[test]
#[serial]
fn top_count_env_override_applies() {
    std::env::set_var("INSIGHT_TOP_COUNT", "2");
    let cfg = InsightConfig::from_env();
    std::env::remove_var("INSIGHT_TOP_COUNT");
    assert_eq!(cfg.top_count, 2);
}
