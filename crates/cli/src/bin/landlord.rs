use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    landlord_cli::main_entry().await
}
