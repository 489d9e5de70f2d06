//! Interactive terminal chat through the session gateway.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use premiumbot::gateway::ERROR_REPLY;

use super::common::{chat_settings, create_gateway, load_config};

pub(crate) async fn cmd_chat(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let gateway = create_gateway(&config)?;
    let settings = chat_settings(&config);

    println!("PremiumBot Interactive Chat");
    println!(
        "Type your message and press Enter. Type {} to stop.",
        settings
            .exit_keywords
            .iter()
            .map(|k| format!("'{}'", k))
            .collect::<Vec<_>>()
            .join(" or ")
    );

    let opened = gateway
        .open_session()
        .await
        .with_context(|| "Failed to start the conversation")?;
    println!();
    println!("{}", opened.greeting);
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                if settings.is_exit_keyword(input) {
                    println!("{}", settings.farewell);
                    break;
                }

                match gateway.advance_with_user_text(&opened.id, input).await {
                    Ok(answer) => {
                        println!();
                        println!("{}", answer);
                        println!();
                    }
                    Err(e) => {
                        warn!(error = %e, "Turn failed");
                        eprintln!("{}", ERROR_REPLY);
                        eprintln!();
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    gateway.close_session(&opened.id).await;
    Ok(())
}
