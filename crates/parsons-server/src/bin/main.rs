use parsons_server::state::LlmConfig;

#[tokio::main]
async fn main() {
    let llm = LlmConfig::from_env();
    let dev_mode = llm.api_key.is_none();
    let (app, _state) = parsons_server::build_app(llm);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    if dev_mode {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║  PARSONS SERVER — DEV MODE                           ║");
        println!("║  No PARSONS_LLM_API_KEY set. Serving sample puzzles  ║");
        println!("║  unless clients supply their own key.                ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("Run the client with:");
        println!(
            "  PARSONS_SERVER_URL=http://localhost:{} cargo run -p parsons-tui",
            port
        );
        println!();
    }

    println!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
