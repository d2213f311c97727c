//! Kodegen Bundler Installer - builds an installer from versioned artifacts.

use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exit_code = match kodegen_bundler_installer::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            1
        }
    };

    process::exit(exit_code);
}
