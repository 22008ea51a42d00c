use emolens::dispatch::view::Phase;
use emolens::dispatch::{
    DispatchError, Dispatcher, Endpoint, FailureKind, MediaFile, MediaKind, Session,
    ValidationError,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ASCII-only payloads keep multipart bodies matchable as strings.
const GIF_HEADER: &[u8] = b"GIF89a\x01\x00\x01\x00";

fn sample_sentiment() -> serde_json::Value {
    json!({
        "language": "en",
        "translatedText": "hi",
        "sentiment": {"compound": 0.5, "neg": 0, "neu": 0.5, "pos": 0.5}
    })
}

fn gif_file() -> MediaFile {
    MediaFile::from_bytes("face.gif", GIF_HEADER.to_vec(), MediaKind::Image)
        .expect("gif should be accepted")
}

fn mp4_file() -> MediaFile {
    MediaFile::from_bytes("clip.mp4", vec![0, 0, 0, 24, b'f', b't', b'y', b'p'], MediaKind::Video)
        .expect("mp4 should be accepted")
}

#[tokio::test]
async fn text_is_posted_once_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sentiment"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"text": "  hello there "})))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_sentiment()))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(server.uri());
    let analysis = dispatcher
        .submit_text("  hello there ")
        .await
        .expect("sentiment should be returned");

    assert_eq!(analysis.language.as_deref(), Some("en"));
    assert_eq!(analysis.translated_text.as_deref(), Some("hi"));
    assert_eq!(analysis.sentiment.compound, 0.5);
    assert_eq!(analysis.sentiment.neg, 0.0);
    assert_eq!(analysis.sentiment.neu, 0.5);
    assert_eq!(analysis.sentiment.pos, 0.5);
}

#[tokio::test]
async fn blank_text_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_sentiment()))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(server.uri());
    for input in ["", "   ", "\n\t "] {
        let err = dispatcher.submit_text(input).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Validation(ValidationError::EmptyText)
        ));
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.alert(), "Please enter some text for analysis.");
    }

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn response_without_sentiment_is_a_shape_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sentiment"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"language": "en", "translatedText": "hi"})),
        )
        .mount(&server)
        .await;

    let err = Dispatcher::new(server.uri())
        .submit_text("hello")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Shape {
            endpoint: Endpoint::Sentiment,
            field: "sentiment"
        }
    ));
    assert_eq!(err.kind(), FailureKind::Analysis);
}

#[tokio::test]
async fn error_status_is_indistinguishable_from_malformed_body() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sentiment"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "analyzer crashed"})),
        )
        .mount(&failing)
        .await;

    let malformed = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"language": "en"})))
        .mount(&malformed)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&malformed)
        .await;

    let status = Dispatcher::new(failing.uri())
        .submit_text("hello")
        .await
        .unwrap_err();
    let shape = Dispatcher::new(malformed.uri())
        .submit_text("hello")
        .await
        .unwrap_err();

    assert!(matches!(
        status,
        DispatchError::Status { ref detail, .. } if detail.as_deref() == Some("analyzer crashed")
    ));
    assert!(matches!(shape, DispatchError::Shape { .. }));
    assert_eq!(status.kind(), shape.kind());
    assert_eq!(status.alert(), shape.alert());

    let decode = Dispatcher::new(malformed.uri())
        .submit_image(Some(&gif_file()))
        .await
        .unwrap_err();
    assert!(matches!(decode, DispatchError::Decode { .. }));
    assert_eq!(decode.kind(), FailureKind::Analysis);
    assert_eq!(
        decode.alert(),
        "There was an issue analyzing the image. Please try again."
    );
}

#[tokio::test]
async fn image_expression_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .and(body_string_contains("name=\"file\"; filename=\"face.gif\""))
        .and(body_string_contains("image/gif"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expression": "happy",
            "message": "Image analyzed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let expression = Dispatcher::new(server.uri())
        .submit_image(Some(&gif_file()))
        .await
        .expect("expression should be returned");

    assert_eq!(expression, "happy");
}

#[tokio::test]
async fn image_reply_with_only_emotion_field_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"emotion": "sad"})))
        .mount(&server)
        .await;

    let err = Dispatcher::new(server.uri())
        .submit_image(Some(&gif_file()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Shape {
            field: "expression",
            ..
        }
    ));
}

#[tokio::test]
async fn missing_files_are_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(server.uri());

    let image = dispatcher.submit_image(None).await.unwrap_err();
    assert_eq!(image.kind(), FailureKind::Validation);
    assert_eq!(image.alert(), "Please upload an image first.");

    let video = dispatcher.submit_video(None).await.unwrap_err();
    assert_eq!(video.kind(), FailureKind::Validation);
    assert_eq!(video.alert(), "Please upload a video for analysis.");

    // A video handed to the image operation is not sent either.
    let wrong = dispatcher.submit_image(Some(&mp4_file())).await.unwrap_err();
    assert!(matches!(
        wrong,
        DispatchError::Validation(ValidationError::UnsupportedFileType { .. })
    ));
}

#[tokio::test]
async fn video_analysis_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-video"))
        .and(body_string_contains("filename=\"clip.mp4\""))
        .and(body_string_contains("video/mp4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"analysis": "mostly neutral"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let analysis = Dispatcher::new(server.uri())
        .submit_video(Some(&mp4_file()))
        .await
        .expect("analysis should be returned");

    assert_eq!(analysis, "mostly neutral");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    // Nothing listens on the tcpmux port on a test host.
    let err = Dispatcher::new("http://127.0.0.1:1")
        .submit_text("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Transport { .. }));
    assert_eq!(err.kind(), FailureKind::Analysis);
    assert_eq!(
        err.alert(),
        "There was an issue analyzing the text. Please try again."
    );
}

#[tokio::test]
async fn indicator_is_in_flight_during_request_and_idle_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sentiment"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = Session::new(Dispatcher::new(server.uri()));
    let indicator = session.view().indicator(Endpoint::Sentiment);
    let mut phase = indicator.subscribe();

    let observe = async {
        phase.changed().await.expect("indicator should stay alive");
        *phase.borrow_and_update()
    };
    let (result, seen) = tokio::join!(session.analyze_text("hello"), observe);

    assert_eq!(seen, Phase::InFlight);
    assert!(result.is_err());
    assert_eq!(indicator.phase(), Phase::Idle);
}

#[tokio::test]
async fn validation_failure_leaves_indicator_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::new(Dispatcher::new(server.uri()));
    let text = session.view().indicator(Endpoint::Sentiment).subscribe();
    let image = session.view().indicator(Endpoint::AnalyzeImage).subscribe();
    let video = session.view().indicator(Endpoint::AnalyzeVideo).subscribe();

    let blank = session.analyze_text("  ").await.unwrap_err();
    let missing = session.analyze_video(None).await.unwrap_err();
    // A video handed to the image operation is rejected before dispatch.
    let wrong_kind = session.analyze_image(Some(&mp4_file())).await.unwrap_err();

    for err in [&blank, &missing, &wrong_kind] {
        assert_eq!(err.kind(), FailureKind::Validation);
    }
    assert!(matches!(
        wrong_kind,
        DispatchError::Validation(ValidationError::UnsupportedFileType { .. })
    ));
    assert!(!text.has_changed().expect("sender is alive"));
    assert!(!image.has_changed().expect("sender is alive"));
    assert!(!video.has_changed().expect("sender is alive"));
}
