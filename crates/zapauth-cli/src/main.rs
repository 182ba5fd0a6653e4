//! Thin entrypoint delegating to `zapauth_cli::run()`.

#[tokio::main]
async fn main() {
    let exit_code = zapauth_cli::run().await;
    std::process::exit(exit_code);
}
