use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET / - Upload form and audiobook player
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}
