/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::process;
use std::sync::Arc;

use futures_order_bot::cli::{self, CliOptions, Command};
use futures_order_bot::config::Config;
use futures_order_bot::exchange::{BinanceFuturesGateway, DryRunGateway, VenueGateway};
use futures_order_bot::order_core::manager::OrderManager;
use futures_order_bot::utils::logging;
use futures_order_bot::TradingError;

/// 사용법/검증 오류 종료 코드
const USAGE_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // 명령줄 인수 확인
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, cli::USAGE);
            process::exit(USAGE_EXIT_CODE);
        }
    };
    if options.command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    // 설정 로드
    let mut config = Config::load()?;
    if let Some(path) = &options.log_file {
        config.logging.file_path = Some(path.clone());
    }

    // 로깅 초기화
    logging::init(&config.logging)?;
    log::info!("Starting futures-order-bot {} with {:?}", futures_order_bot::VERSION, options.command);

    let gateway = build_gateway(&options, &config).await?;
    let manager = OrderManager::connect(gateway).await;

    match cli::run(&options, &manager).await {
        Ok(code) => process::exit(code),
        Err(TradingError::InvalidArgument(message)) => {
            log::error!("Validation error: {}", message);
            eprintln!("error: {}", message);
            process::exit(USAGE_EXIT_CODE);
        }
        Err(e) => {
            log::error!("Unexpected error: {}", e);
            Err(e.into())
        }
    }
}

/// 거래소 게이트웨이 선택. 자격 증명이 없거나 --dry-run 이면 dry-run 게이트웨이 사용
async fn build_gateway(options: &CliOptions, config: &Config) -> Result<Arc<dyn VenueGateway>, anyhow::Error> {
    if options.dry_run || !config.exchange.has_credentials() {
        if !options.dry_run {
            log::warn!("No Binance credentials configured, running in dry-run mode");
        }
        return Ok(Arc::new(DryRunGateway::new()));
    }

    let gateway = BinanceFuturesGateway::from_config(&config.exchange)?;
    gateway.resync_clock().await;
    Ok(Arc::new(gateway))
}
