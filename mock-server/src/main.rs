use mock_server::Fixtures;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("ACCESS_TOKEN").unwrap_or_else(|_| "app-id|app-secret".to_string());
    let malware_count = std::env::var("MALWARE_COUNT")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(266);
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    mock_server::run(listener, Fixtures::generated(&token, malware_count)).await
}
