//! Read `DISCORD_TOKEN` from the environment and playback status snapshots,
//! one JSON object per line, from stdin. An empty line clears the status.

use deezercord::{store::STATUS_KEY, Config, DeezerCord};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| {
            println!("No DISCORD_TOKEN env var or invalid");
            std::process::exit(1);
        })
        .unwrap();

    let config = match Config::default().with_discovered_gateway().await {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Gateway discovery failed, using default gateway: {}", err);
            Config::default()
        }
    };

    let app = DeezerCord::new(config);
    let handle = app.start();

    app.set_token(Some(token));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        let value = if line.trim().is_empty() {
            serde_json::Value::Null
        } else {
            match serde_json::from_str(&line) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Skip invalid status line: {}", err);
                    continue;
                }
            }
        };

        if let Err(err) = app.apply_change(STATUS_KEY, value) {
            log::warn!("{}", err);
        }
    }

    handle.shutdown().await;
}
