//! 명령줄 인터페이스
//!
//! 인수 파싱, 명령 실행, 결과 출력 (요약 또는 JSON)

use serde_json::{json, Map, Value};

use crate::error::TradingError;
use crate::exchange::payload::wire_value;
use crate::models::order::{OrderResult, OrderType};
use crate::models::twap::{TwapRequest, TwapResult};
use crate::order_core::manager::OrderManager;
use crate::order_core::validator;

pub const USAGE: &str = "\
Usage: futures-order-bot [--raw-json] [--dry-run] [--log-file PATH] <command>

Commands:
  market <SYMBOL> <SIDE> <QTY>
  limit  <SYMBOL> <SIDE> <QTY> <PRICE> [--time-in-force GTC|IOC|FOK]
  twap   <SYMBOL> <SIDE> <TOTAL_QTY> <SLICES> [--interval SECS]
         [--order-type MARKET|LIMIT] [--price PRICE] [--time-in-force GTC|IOC|FOK]
  help

Environment:
  BINANCE_API_KEY, BINANCE_API_SECRET   credentials (dry-run when missing)
  BINANCE_TESTNET, BINANCE_BASE_URL     endpoint selection
";

const DEFAULT_TWAP_INTERVAL: &str = "10";

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub raw_json: bool,
    pub dry_run: bool,
    pub log_file: Option<String>,
    pub command: Command,
}

/// 파싱된 명령. 값은 실행 시점에 검증된다.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Market {
        symbol: String,
        side: String,
        quantity: String,
    },
    Limit {
        symbol: String,
        side: String,
        quantity: String,
        price: String,
        time_in_force: String,
    },
    Twap {
        symbol: String,
        side: String,
        total_quantity: String,
        slices: String,
        interval: String,
        order_type: String,
        price: Option<String>,
        time_in_force: String,
    },
    Help,
}

fn usage_error(message: impl Into<String>) -> TradingError {
    TradingError::InvalidArgument(message.into())
}

/// 프로그램 이름을 제외한 인수 목록 파싱
pub fn parse_args(args: &[String]) -> Result<CliOptions, TradingError> {
    let mut raw_json = false;
    let mut dry_run = false;
    let mut log_file = None;
    let mut positionals: Vec<String> = Vec::new();
    let mut flags: Vec<(String, String)> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--raw-json" => raw_json = true,
            "--dry-run" => dry_run = true,
            "-h" | "--help" => positionals.insert(0, "help".to_string()),
            flag if flag.starts_with("--") => {
                let (name, value) = match flag.split_once('=') {
                    Some((name, value)) => (name.to_string(), value.to_string()),
                    None => {
                        let value = iter
                            .next()
                            .ok_or_else(|| usage_error(format!("{} expects a value", flag)))?;
                        (flag.to_string(), value.clone())
                    }
                };
                if name == "--log-file" {
                    log_file = Some(value);
                } else {
                    flags.push((name, value));
                }
            }
            _ => positionals.push(arg.clone()),
        }
    }

    let command = build_command(&positionals, flags)?;
    Ok(CliOptions {
        raw_json,
        dry_run,
        log_file,
        command,
    })
}

fn build_command(positionals: &[String], flags: Vec<(String, String)>) -> Result<Command, TradingError> {
    let (name, rest) = match positionals.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => return Err(usage_error("No command provided")),
    };

    let mut flags = Flags::new(flags);
    let command = match name {
        "help" => Command::Help,
        "market" => {
            let [symbol, side, quantity] = expect_positionals::<3>(name, rest)?;
            Command::Market { symbol, side, quantity }
        }
        "limit" => {
            let [symbol, side, quantity, price] = expect_positionals::<4>(name, rest)?;
            Command::Limit {
                symbol,
                side,
                quantity,
                price,
                time_in_force: flags.take("--time-in-force").unwrap_or_else(|| "GTC".to_string()),
            }
        }
        "twap" => {
            let [symbol, side, total_quantity, slices] = expect_positionals::<4>(name, rest)?;
            Command::Twap {
                symbol,
                side,
                total_quantity,
                slices,
                interval: flags
                    .take("--interval")
                    .unwrap_or_else(|| DEFAULT_TWAP_INTERVAL.to_string()),
                order_type: flags.take("--order-type").unwrap_or_else(|| "MARKET".to_string()),
                price: flags.take("--price"),
                time_in_force: flags.take("--time-in-force").unwrap_or_else(|| "GTC".to_string()),
            }
        }
        other => return Err(usage_error(format!("Unknown command '{}'", other))),
    };

    flags.ensure_consumed(name)?;
    Ok(command)
}

fn expect_positionals<const N: usize>(command: &str, rest: &[String]) -> Result<[String; N], TradingError> {
    <[String; N]>::try_from(rest.to_vec()).map_err(|_| {
        usage_error(format!(
            "'{}' expects {} positional arguments, got {}",
            command,
            N,
            rest.len()
        ))
    })
}

/// 명령별 옵션. 사용하지 않은 옵션이 남으면 오류
struct Flags(Vec<(String, String)>);

impl Flags {
    fn new(flags: Vec<(String, String)>) -> Self {
        Flags(flags)
    }

    fn take(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().rposition(|(flag, _)| flag == name)?;
        let (_, value) = self.0.remove(idx);
        self.0.retain(|(flag, _)| flag != name);
        Some(value)
    }

    fn ensure_consumed(&self, command: &str) -> Result<(), TradingError> {
        match self.0.first() {
            Some((flag, _)) => Err(usage_error(format!("Unknown option '{}' for '{}'", flag, command))),
            None => Ok(()),
        }
    }
}

/// 명령 실행 후 종료 코드 반환 (0: 성공, 1: 주문 실패)
pub async fn run(options: &CliOptions, manager: &OrderManager) -> Result<i32, TradingError> {
    match &options.command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(0)
        }
        Command::Market { symbol, side, quantity } => {
            let quantity = validator::parse_quantity(quantity)?;
            let result = manager.place_market_order(symbol, side, quantity).await?;
            println!("{}", render_order(&result, options.raw_json));
            Ok(exit_code(result.is_success()))
        }
        Command::Limit {
            symbol,
            side,
            quantity,
            price,
            time_in_force,
        } => {
            let quantity = validator::parse_quantity(quantity)?;
            let price = validator::parse_price(price)?;
            let result = manager
                .place_limit_order(symbol, side, quantity, Some(price), time_in_force)
                .await?;
            println!("{}", render_order(&result, options.raw_json));
            Ok(exit_code(result.is_success()))
        }
        Command::Twap { .. } => {
            let request = twap_request(&options.command)?;
            let result = manager.execute_twap(request).await?;
            println!("{}", render_twap(&result, options.raw_json));
            Ok(exit_code(result.is_success()))
        }
    }
}

fn exit_code(success: bool) -> i32 {
    if success {
        0
    } else {
        1
    }
}

/// twap 명령을 검증된 TWAP 요청으로 변환
pub fn twap_request(command: &Command) -> Result<TwapRequest, TradingError> {
    let Command::Twap {
        symbol,
        side,
        total_quantity,
        slices,
        interval,
        order_type,
        price,
        time_in_force,
    } = command
    else {
        return Err(usage_error("Not a twap command"));
    };

    let symbol = validator::normalize_symbol(symbol)?;
    let side = validator::validate_side(side)?;
    let total_quantity = validator::parse_quantity(total_quantity)?;
    let slices = slices
        .trim()
        .parse::<usize>()
        .map_err(|_| usage_error("TWAP slices must be a positive integer."))?;
    let interval = interval
        .trim()
        .parse::<f64>()
        .map_err(|_| usage_error("TWAP interval must be zero or positive seconds."))?;
    let order_type = validator::validate_order_type(order_type)?;
    let time_in_force = validator::validate_time_in_force(time_in_force)?;

    let mut request = TwapRequest::new(symbol, side, total_quantity, slices, interval)
        .with_order_type(order_type)
        .with_time_in_force(time_in_force);
    // 시장가 TWAP 에서는 가격을 무시
    if order_type == OrderType::Limit {
        if let Some(price) = price {
            request = request.with_limit_price(validator::parse_price(price)?);
        }
    }
    Ok(request)
}

fn order_fields(result: &OrderResult) -> Vec<(&'static str, Value)> {
    let request = result.request();
    vec![
        ("symbol", json!(request.symbol)),
        ("side", json!(request.side.as_str())),
        ("quantity", json!(request.quantity)),
        ("price", json!(request.price)),
        ("time_in_force", json!(request.time_in_force.map(|tif| tif.as_str()))),
        ("success", json!(result.is_success())),
        ("error_message", json!(result.error_message())),
        ("response", result.raw_response().clone()),
    ]
}

fn twap_fields(result: &TwapResult) -> Vec<(&'static str, Value)> {
    let request = &result.request;
    let slice_details: Vec<Value> = result
        .slice_results
        .iter()
        .map(|slice| {
            json!({
                "quantity": slice.request().quantity,
                "is_success": slice.is_success(),
                "error_message": slice.error_message(),
                "response": slice.raw_response(),
            })
        })
        .collect();

    vec![
        ("symbol", json!(request.symbol)),
        ("side", json!(request.side.as_str())),
        ("slices", json!(request.slices)),
        ("interval_seconds", json!(request.interval_seconds)),
        ("order_type", json!(request.order_type.as_str())),
        ("executed_quantity", json!(result.executed_quantity())),
        ("success", json!(result.is_success())),
        ("slice_details", Value::Array(slice_details)),
    ]
}

pub fn render_order(result: &OrderResult, raw_json: bool) -> String {
    render(order_fields(result), raw_json)
}

pub fn render_twap(result: &TwapResult, raw_json: bool) -> String {
    render(twap_fields(result), raw_json)
}

fn render(fields: Vec<(&'static str, Value)>, raw_json: bool) -> String {
    if raw_json {
        let object: Map<String, Value> = fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        return serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default();
    }

    let mut lines = vec!["Order Summary:".to_string()];
    for (key, value) in fields {
        lines.push(format!("  - {}: {}", key, wire_value(&value)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VenueError;
    use crate::models::order::{OrderRequest, OrderSide, TimeInForce};
    use rstest::rstest;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_market_with_global_flags() {
        let options = parse_args(&args("--raw-json market btcusdt buy 0.01 --log-file bot.log")).unwrap();

        assert!(options.raw_json);
        assert!(!options.dry_run);
        assert_eq!(options.log_file.as_deref(), Some("bot.log"));
        assert_eq!(
            options.command,
            Command::Market {
                symbol: "btcusdt".to_string(),
                side: "buy".to_string(),
                quantity: "0.01".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_limit_defaults_tif_to_gtc() {
        let options = parse_args(&args("limit ETHUSDT SELL 1 3500")).unwrap();

        match options.command {
            Command::Limit { price, time_in_force, .. } => {
                assert_eq!(price, "3500");
                assert_eq!(time_in_force, "GTC");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_twap_defaults_and_equals_syntax() {
        let options = parse_args(&args("--dry-run twap BTCUSDT BUY 1 4 --order-type=LIMIT --price 60000")).unwrap();

        assert!(options.dry_run);
        match options.command {
            Command::Twap {
                slices,
                interval,
                order_type,
                price,
                time_in_force,
                ..
            } => {
                assert_eq!(slices, "4");
                assert_eq!(interval, "10");
                assert_eq!(order_type, "LIMIT");
                assert_eq!(price.as_deref(), Some("60000"));
                assert_eq!(time_in_force, "GTC");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[rstest]
    #[case("")]
    #[case("market BTCUSDT BUY")]
    #[case("limit BTCUSDT BUY 1")]
    #[case("market BTCUSDT BUY 1 --interval 5")]
    #[case("twap BTCUSDT BUY 1 3 --interval")]
    #[case("cancel BTCUSDT")]
    fn test_parse_usage_errors(#[case] line: &str) {
        assert!(matches!(parse_args(&args(line)), Err(TradingError::InvalidArgument(_))));
    }

    #[test]
    fn test_twap_request_ignores_price_for_market() {
        let options = parse_args(&args("twap btcusdt sell 0.3 3 --interval 0 --price 100")).unwrap();

        let request = twap_request(&options.command).unwrap();

        assert_eq!(request.symbol, "BTCUSDT");
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.limit_price, None);
        assert_eq!(request.interval_seconds, 0.0);
    }

    #[rstest]
    #[case("twap BTCUSDT BUY 1 x")]
    #[case("twap BTCUSDT BUY 1 -2")]
    #[case("twap BTCUSDT BUY 1 3 --interval soon")]
    #[case("twap BTCUSDT BUY 1 3 --order-type STOP")]
    #[case("twap BTCUSDT BUY 1 3 --time-in-force DAY")]
    fn test_twap_request_rejects(#[case] line: &str) {
        let options = parse_args(&args(line)).unwrap();
        assert!(matches!(twap_request(&options.command), Err(TradingError::InvalidArgument(_))));
    }

    #[test]
    fn test_render_order_summary() {
        let request = OrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.5, 60000.0, TimeInForce::Gtc);
        let result = OrderResult::failure(request, &VenueError::with_code(-2019, "Margin is insufficient."));

        let summary = render_order(&result, false);

        assert!(summary.starts_with("Order Summary:\n  - symbol: BTCUSDT\n  - side: BUY"));
        assert!(summary.contains("  - success: false"));
        assert!(summary.contains("  - error_message: APIError(code=-2019): Margin is insufficient."));
    }

    #[test]
    fn test_render_order_raw_json() {
        let request = OrderRequest::market("BTCUSDT", OrderSide::Sell, 1.0);
        let result = OrderResult::success(request, json!({"orderId": 1}));

        let rendered: Value = serde_json::from_str(&render_order(&result, true)).unwrap();

        assert_eq!(rendered["success"], json!(true));
        assert_eq!(rendered["price"], Value::Null);
        assert_eq!(rendered["response"]["orderId"], json!(1));
    }
}
