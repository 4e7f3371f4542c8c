#[tokio::main]
async fn main() -> jaguar_kg::Result<()> {
    jaguar_kg::cli::main().await
}
