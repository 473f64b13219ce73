use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = listing_merge_lib::run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
