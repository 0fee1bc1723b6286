//! Local web server standing in for a submitted website

use axum::{response::Html, routing::get, Router};
use tokio::net::TcpListener;

/// Serve `html` at `/` on an ephemeral port and return the page URL
pub async fn serve_page(html: &'static str) -> String {
    let router = Router::new().route("/", get(move || async move { Html(html) }));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind fixture server");
    let addr = listener.local_addr().expect("Should have local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Fixture server failed");
    });

    format!("http://{}/", addr)
}
