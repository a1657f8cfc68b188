#[tokio::main]
async fn main() {
    if let Err(e) = carelink_lib::run().await {
        eprintln!("carelink: {e}");
        std::process::exit(1);
    }
}
