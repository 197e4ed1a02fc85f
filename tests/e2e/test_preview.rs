use crate::e2e::helpers;

use helpers::{api_client::MultipartForm, fixtures, TestContext};
use hyper::StatusCode;
use std::path::Path;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_extract_text_from_every_page_in_order(ctx: &TestContext) {
    let pdf = fixtures::pdf_with_pages(&["Chapter one begins", "Chapter two continues", "The end"]);
    let form = MultipartForm::new().file("pdf_file", "book.pdf", "application/pdf", &pdf);

    let response = ctx
        .client
        .post_form("/extract_pdf_preview", form)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let preview = response.field("text_preview");
    let first = preview.find("Chapter one begins").unwrap();
    let second = preview.find("Chapter two continues").unwrap();
    let third = preview.find("The end").unwrap();
    assert!(first < second && second < third);

    let text_file = response.field("text_file");
    assert!(Path::new(text_file).starts_with(ctx.book_texts_dir()));
    let stored = std::fs::read_to_string(text_file).unwrap();
    assert!(stored.contains("Chapter two continues"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_truncate_long_previews(ctx: &TestContext) {
    let long_page = "a".repeat(2500);
    let pdf = fixtures::pdf_with_pages(&[&long_page]);
    let form = MultipartForm::new().file("pdf_file", "long.pdf", "application/pdf", &pdf);

    let response = ctx
        .client
        .post_form("/extract_pdf_preview", form)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let preview = response.field("text_preview");
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 2003);

    // The stored text is complete
    let stored = std::fs::read_to_string(response.field("text_file")).unwrap();
    assert!(stored.contains(&long_page));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_short_text_untruncated(ctx: &TestContext) {
    let pdf = fixtures::pdf_with_pages(&["Short story"]);
    let form = MultipartForm::new().file("pdf_file", "short.pdf", "application/pdf", &pdf);

    let response = ctx
        .client
        .post_form("/extract_pdf_preview", form)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let preview = response.field("text_preview");
    assert!(preview.contains("Short story"));
    assert!(!preview.ends_with("..."));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_request_without_a_pdf(ctx: &TestContext) {
    let form = MultipartForm::new().text("something_else", "value");

    let response = ctx
        .client
        .post_form("/extract_pdf_preview", form)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("pdf_file is required");
    assert_eq!(ctx.entries(&ctx.book_texts_dir()), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_on_a_malformed_pdf(ctx: &TestContext) {
    let form = MultipartForm::new().file(
        "pdf_file",
        "broken.pdf",
        "application/pdf",
        b"%PDF-1.4 this is not really a pdf",
    );

    let response = ctx
        .client
        .post_form("/extract_pdf_preview", form)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("PDF extraction failed");
    assert_eq!(ctx.entries(&ctx.book_texts_dir()), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_issue_a_new_handle_per_upload(ctx: &TestContext) {
    let first = ctx.extract(&["Same book"]).await;
    let second = ctx.extract(&["Same book"]).await;

    assert_ne!(first, second);
    assert_eq!(ctx.entries(&ctx.book_texts_dir()), 2);
}
