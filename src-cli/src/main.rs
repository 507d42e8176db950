//! quote-narrator: エントリポイント
//!
//! ```bash
//! quote-narrator --help
//! quote-narrator --mode recommendations
//! RUST_LOG=qn_core=debug quote-narrator
//! ```

mod cli;
mod commands;
mod view;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use qn_core::domain::error::AppError;
use qn_core::infra::config;
use qn_core::infra::quote::HttpQuoteSource;
use qn_core::infra::speech::create_speech_engine;
use qn_core::usecase::controller::ActivationController;

use crate::cli::Args;
use crate::commands::{CommandError, Reply};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    log::info!("Starting quote-narrator");
    log::debug!("CLI args: {:?}", args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {}", e.message);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let settings = args.apply(config::load_settings(args.config.as_deref())?)?;
    settings.validate()?;

    let quotes = Arc::new(HttpQuoteSource::new(
        &settings.quote_endpoint,
        settings.request_timeout(),
    )?);
    let speech = create_speech_engine(&settings);
    let controller = ActivationController::new(settings, quotes, speech)?;

    let result = command_loop(&controller, args.json).await;
    controller.shutdown();
    result
}

fn show(controller: &ActivationController, json: bool) {
    let snapshot = controller.snapshot();
    if json {
        println!("{}", view::render_json(&snapshot));
    } else {
        println!("{}", view::render(&snapshot));
        print!("> ");
    }
    // プロンプトを即時表示する
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

async fn command_loop(controller: &ActivationController, json: bool) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut changes = controller.subscribe();

    if !json {
        println!("{}", commands::HELP);
    }
    changes.borrow_and_update();
    show(controller, json);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| AppError::internal(format!("stdin: {e}")))?;
                let Some(line) = line else {
                    log::info!("stdin closed");
                    return Ok(());
                };

                let reply = commands::parse(&line)
                    .and_then(|cmd| cmd.map(|c| commands::execute(controller, c)).transpose());
                match reply {
                    Ok(Some(Reply::Quit)) => return Ok(()),
                    Ok(Some(Reply::Help)) => println!("{}", commands::HELP),
                    Ok(Some(Reply::Screen { alert })) => {
                        if let Some(alert) = alert {
                            println!("** {alert} **");
                        }
                    }
                    Ok(None) => {}
                    Err(CommandError::App(e)) => {
                        log::warn!("Command failed: {e}");
                        println!("{}", e.message);
                    }
                    Err(e) => println!("{e}"),
                }

                // コマンドによる変更はここで描画済みとする
                changes.borrow_and_update();
                show(controller, json);
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                changes.borrow_and_update();
                println!();
                show(controller, json);
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                return Ok(());
            }
        }
    }
}
