mod common;

use std::fs;

use common::{dir_entries, settings_in, FakeHub, F_DEC, F_ENC, Q_DEC, Q_ENC};
use hubfetch::fetch::{ArtifactRole, AttemptOutcome, FetchError, Fetcher, TokenizerOutcome, TokenizerSource};

fn moonshine_hub() -> FakeHub {
    FakeHub::new()
        .with_file("README.md", "readme")
        .with_file(F_ENC, "float encoder")
        .with_file(F_DEC, "float decoder")
        .with_file(Q_ENC, "int8 encoder")
        .with_file(Q_DEC, "int8 decoder")
        .with_file("tokenizers/tiny-ar/tokenizer.json", "{\"lang\":\"ar\"}")
        .with_file("tokenizers/tiny/tokenizer.json", "{\"lang\":\"en\"}")
}

#[tokio::test]
async fn test_fetches_quantized_models_and_tiny_tokenizer() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let models = settings.models.directory.clone();
    let fetcher = Fetcher::new(moonshine_hub(), settings);

    let summary = fetcher.run().await.unwrap();

    assert_eq!(summary.selection.variant.name, "quantized");
    assert!(!summary.selection.is_fallback);
    assert_eq!(summary.selection.tokenizer, "tokenizers/tiny/tokenizer.json");
    assert_eq!(summary.selection.tokenizer_source, TokenizerSource::Preferred);

    assert_eq!(summary.encoder, models.join("encoder_model.onnx"));
    assert_eq!(summary.decoder, models.join("decoder_model_merged.onnx"));
    assert_eq!(summary.tokenizer.path(), Some(models.join("tokenizer.json").as_path()));

    assert_eq!(fs::read_to_string(models.join("encoder_model.onnx")).unwrap(), "int8 encoder");
    assert_eq!(fs::read_to_string(models.join("decoder_model_merged.onnx")).unwrap(), "int8 decoder");
    assert_eq!(fs::read_to_string(models.join("tokenizer.json")).unwrap(), "{\"lang\":\"en\"}");

    // nested download directories are cleaned up
    assert_eq!(
        dir_entries(&models),
        vec!["decoder_model_merged.onnx", "encoder_model.onnx", "tokenizer.json"]
    );
    assert_eq!(summary.report.entries.len(), 3);
}

#[tokio::test]
async fn test_rerun_overwrites_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let models = settings_in(dir.path()).models.directory;

    Fetcher::new(moonshine_hub(), settings_in(dir.path())).run().await.unwrap();

    let updated = FakeHub::new()
        .with_file(Q_ENC, "int8 encoder v2")
        .with_file(Q_DEC, "int8 decoder v2")
        .with_file("tokenizers/tiny/tokenizer.json", "{\"v\":2}");
    Fetcher::new(updated, settings_in(dir.path())).run().await.unwrap();

    assert_eq!(
        dir_entries(&models),
        vec!["decoder_model_merged.onnx", "encoder_model.onnx", "tokenizer.json"]
    );
    assert_eq!(fs::read_to_string(models.join("encoder_model.onnx")).unwrap(), "int8 encoder v2");
    assert_eq!(fs::read_to_string(models.join("decoder_model_merged.onnx")).unwrap(), "int8 decoder v2");
    assert_eq!(fs::read_to_string(models.join("tokenizer.json")).unwrap(), "{\"v\":2}");
}

#[tokio::test]
async fn test_float_fallback_when_quantized_missing() {
    let dir = tempfile::tempdir().unwrap();
    let hub = FakeHub::new()
        .with_file(Q_ENC, "int8 encoder only")
        .with_file(F_ENC, "float encoder")
        .with_file(F_DEC, "float decoder")
        .with_file("tokenizer.json", "{}");
    let settings = settings_in(dir.path());
    let models = settings.models.directory.clone();
    let fetcher = Fetcher::new(hub, settings);

    let summary = fetcher.run().await.unwrap();

    assert_eq!(summary.selection.variant.name, "float");
    assert!(summary.selection.is_fallback);
    assert_eq!(fs::read_to_string(models.join("encoder_model.onnx")).unwrap(), "float encoder");
    assert_eq!(fs::read_to_string(models.join("decoder_model_merged.onnx")).unwrap(), "float decoder");
}

#[tokio::test]
async fn test_no_variant_fails_before_any_download() {
    let dir = tempfile::tempdir().unwrap();
    let mut hub = FakeHub::new();
    for i in 0..40 {
        hub = hub.with_file(&format!("weights/part_{:02}.bin", i), "x");
    }
    let fetcher = Fetcher::new(hub, settings_in(dir.path()));

    let err = fetcher.run().await.unwrap_err();

    match &err {
        FetchError::NoSuitableModel { preview, total, .. } => {
            assert_eq!(preview.len(), 30);
            assert_eq!(*total, 40);
        }
        other => panic!("expected NoSuitableModel, got {:?}", other),
    }
    assert!(!err.needs_remediation());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Fetcher::new(FakeHub::new().listing_fails(), settings_in(dir.path()));

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::RemoteListing(_)));
    assert!(err.needs_remediation());
}

#[tokio::test]
async fn test_encoder_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let hub = moonshine_hub().failing(Q_ENC);
    let fetcher = Fetcher::new(&hub, settings_in(dir.path()));

    let err = fetcher.run().await.unwrap_err();

    match err {
        FetchError::Download { role, remote, .. } => {
            assert_eq!(role, ArtifactRole::Encoder);
            assert_eq!(remote, Q_ENC);
        }
        other => panic!("expected Download error, got {:?}", other),
    }
    // the decoder is never attempted
    assert_eq!(hub.downloads(), vec![Q_ENC]);
}

#[tokio::test]
async fn test_decoder_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let hub = moonshine_hub().failing(Q_DEC);
    let fetcher = Fetcher::new(hub, settings_in(dir.path()));

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::Download { role: ArtifactRole::Decoder, .. }));
}

#[tokio::test]
async fn test_missing_tokenizer_still_succeeds_with_warning_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let hub = FakeHub::new()
        .with_file(Q_ENC, "int8 encoder")
        .with_file(Q_DEC, "int8 decoder")
        .with_file("onnx/merged/tiny/tokenizer.json", "{}")
        .failing("onnx/merged/tiny/tokenizer.json");
    let settings = settings_in(dir.path());
    let models = settings.models.directory.clone();
    let fetcher = Fetcher::new(hub, settings);

    let summary = fetcher.run().await.unwrap();

    match &summary.tokenizer {
        TokenizerOutcome::Unavailable { attempts } => {
            let tried: Vec<&str> = attempts.iter().map(|a| a.remote.as_str()).collect();
            assert_eq!(
                tried,
                vec!["onnx/merged/tiny/tokenizer.json", "tokenizer.json", "tokenizers/tiny/tokenizer.json"]
            );
            assert!(attempts.iter().all(|a| a.failed()));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    assert_eq!(dir_entries(&models), vec!["decoder_model_merged.onnx", "encoder_model.onnx"]);
}

#[tokio::test]
async fn test_tokenizer_fallback_location() {
    let dir = tempfile::tempdir().unwrap();
    let hub = FakeHub::new()
        .with_file(Q_ENC, "e")
        .with_file(Q_DEC, "d")
        .with_file("tokenizers/base/tokenizer.json", "{}")
        .failing("tokenizers/base/tokenizer.json")
        .with_unlisted("tokenizer.json", "{\"root\":true}");
    let settings = settings_in(dir.path());
    let models = settings.models.directory.clone();
    let fetcher = Fetcher::new(hub, settings);

    let summary = fetcher.run().await.unwrap();

    match &summary.tokenizer {
        TokenizerOutcome::Fetched { remote, attempts, .. } => {
            assert_eq!(remote, "tokenizer.json");
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].failed());
            assert!(matches!(attempts[1].outcome, AttemptOutcome::Downloaded(_)));
        }
        other => panic!("expected Fetched, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(models.join("tokenizer.json")).unwrap(), "{\"root\":true}");
}

#[tokio::test]
async fn test_root_tokenizer_guessed_when_unlisted() {
    let dir = tempfile::tempdir().unwrap();
    let hub = FakeHub::new()
        .with_file(Q_ENC, "e")
        .with_file(Q_DEC, "d")
        .with_unlisted("tokenizer.json", "{}");
    let fetcher = Fetcher::new(hub, settings_in(dir.path()));

    let summary = fetcher.run().await.unwrap();

    assert_eq!(summary.selection.tokenizer, "tokenizer.json");
    assert_eq!(summary.selection.tokenizer_source, TokenizerSource::RootGuess);
    assert!(matches!(
        &summary.tokenizer,
        TokenizerOutcome::Fetched { remote, attempts, .. } if remote == "tokenizer.json" && attempts.len() == 1
    ));
}

#[tokio::test]
async fn test_required_tokenizer_makes_failure_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let hub = FakeHub::new().with_file(Q_ENC, "e").with_file(Q_DEC, "d");
    let mut settings = settings_in(dir.path());
    settings.artifacts.tokenizer.required = true;
    let fetcher = Fetcher::new(hub, settings);

    let err = fetcher.run().await.unwrap_err();

    match err {
        // root guess and the first fallback are the same path, so only two attempts
        FetchError::TokenizerUnavailable(attempts) => assert_eq!(attempts.len(), 2),
        other => panic!("expected TokenizerUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stale_tokenizer_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let models = settings.models.directory.clone();
    fs::create_dir_all(&models).unwrap();
    fs::write(models.join("tokenizer.json"), "stale").unwrap();

    Fetcher::new(moonshine_hub(), settings).run().await.unwrap();

    assert_eq!(fs::read_to_string(models.join("tokenizer.json")).unwrap(), "{\"lang\":\"en\"}");
}

#[tokio::test]
async fn test_downloads_happen_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let hub = moonshine_hub();
    let fetcher = Fetcher::new(&hub, settings_in(dir.path()));

    fetcher.run().await.unwrap();

    assert_eq!(hub.downloads(), vec![Q_ENC, Q_DEC, "tokenizers/tiny/tokenizer.json"]);
}
