#[tokio::main]
async fn main() {
    let code = orderstats::app::startup::startup().await;
    std::process::exit(code);
}
