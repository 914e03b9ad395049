mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use church_console_api::ai::{AiError, Part};
use church_console_api::error::QUOTA_EXCEEDED_MESSAGE;
use common::{BACKUP_MODEL, PRIMARY_MODEL};

#[tokio::test]
async fn prayers_are_refined_by_first_model() -> Result<()> {
    let server = common::spawn_server().await?;
    server
        .model
        .answer(PRIMARY_MODEL, Ok("첫째 기도\n---PRAYER---\n둘째 기도\n"));

    let res = server
        .post_json("/functions/refine-prayers", json!({ "prayers": ["기도1", "기도2"] }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "data": ["첫째 기도", "둘째 기도"] }));
    assert_eq!(server.model.called_models(), vec![PRIMARY_MODEL]);
    Ok(())
}

#[tokio::test]
async fn short_model_output_falls_back_to_originals() -> Result<()> {
    let server = common::spawn_server().await?;
    server.model.answer(PRIMARY_MODEL, Ok("다듬은 기도"));

    let body: Value = server
        .post_json("/functions/refine-prayers", json!({ "prayers": ["a", "b"] }))
        .await?
        .json()
        .await?;
    assert_eq!(body, json!({ "data": ["다듬은 기도", "b"] }));
    Ok(())
}

#[tokio::test]
async fn failed_model_falls_through_to_next() -> Result<()> {
    let server = common::spawn_server().await?;
    server.model.answer(
        PRIMARY_MODEL,
        Err(AiError::Upstream { status: 503, message: "overloaded".into() }),
    );
    server.model.answer(BACKUP_MODEL, Ok("정리된 기도"));

    let body: Value = server
        .post_json("/functions/refine-prayers", json!({ "prayers": ["기도"] }))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"], json!(["정리된 기도"]));
    assert_eq!(server.model.called_models(), vec![PRIMARY_MODEL, BACKUP_MODEL]);
    Ok(())
}

#[tokio::test]
async fn quota_exhaustion_is_reported_as_429() -> Result<()> {
    let server = common::spawn_server().await?;
    server
        .model
        .answer(PRIMARY_MODEL, Err(AiError::QuotaExhausted("RESOURCE_EXHAUSTED".into())));
    server.model.answer(
        BACKUP_MODEL,
        Err(AiError::Upstream { status: 500, message: "internal".into() }),
    );

    let res = server
        .post_json("/functions/refine-prayers", json!({ "prayers": ["기도"] }))
        .await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.json::<Value>().await?["error"], QUOTA_EXCEEDED_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn all_models_failing_surfaces_last_error() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .post_json("/functions/refine-prayers", json!({ "prayers": ["기도"] }))
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = res.json::<Value>().await?["error"].as_str().unwrap_or_default().to_string();
    assert!(error.contains(BACKUP_MODEL), "unexpected error: {}", error);
    Ok(())
}

#[tokio::test]
async fn empty_or_invalid_prayer_lists() -> Result<()> {
    let server = common::spawn_server().await?;

    let body: Value = server
        .post_json("/functions/refine-prayers", json!({ "prayers": [] }))
        .await?
        .json()
        .await?;
    assert_eq!(body, json!({ "data": [] }));
    assert!(server.model.called_models().is_empty());

    for bad in [json!({}), json!({ "prayers": "기도" }), json!({ "prayers": [1, 2] })] {
        let res = server.post_json("/functions/refine-prayers", bad).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
    Ok(())
}

#[tokio::test]
async fn members_are_extracted_from_text() -> Result<()> {
    let server = common::spawn_server().await?;
    server.model.answer(
        PRIMARY_MODEL,
        Ok("```json\n\
            [{\"full_name\": \"홍길동\", \"phone\": \"010-1234-5678\"}, \"noise\"]\n```"),
    );

    let res = server
        .post_json("/functions/extract-members", json!({ "text": "홍길동 010-1234-5678" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!([{ "full_name": "홍길동", "phone": "010-1234-5678" }]));

    let request = server.model.last_request().expect("model was called");
    assert!(request.json_output);
    assert!(matches!(
        &request.parts[0],
        Part::Text(prompt) if prompt.contains("홍길동 010-1234-5678")
    ));
    Ok(())
}

#[tokio::test]
async fn image_is_sent_inline() -> Result<()> {
    let server = common::spawn_server().await?;
    server.model.answer(PRIMARY_MODEL, Ok("[]"));

    let body = json!({ "image": "QUJD", "mimeType": "image/png" });
    let res = server.post_json("/functions/extract-members", body).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let request = server.model.last_request().expect("model was called");
    assert_eq!(
        request.parts[1],
        Part::InlineData { mime_type: "image/png".into(), data: "QUJD".into() }
    );
    Ok(())
}

#[tokio::test]
async fn extraction_needs_input_and_parseable_output() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.post_json("/functions/extract-members", json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.model.called_models().is_empty());

    server.model.answer(PRIMARY_MODEL, Ok("죄송합니다, 읽을 수 없습니다."));
    let res = server
        .post_json("/functions/extract-members", json!({ "text": "명단" }))
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
