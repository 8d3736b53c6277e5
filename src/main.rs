#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = fortuna_rust::run().await {
        eprintln!("fortuna-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
