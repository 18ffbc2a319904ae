#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    kiln_server::run_server().await
}
