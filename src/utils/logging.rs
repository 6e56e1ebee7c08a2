//! 로깅 유틸리티
//!
//! 로그 초기화 및 주문 실행 단계별 로그 함수 제공

use std::fs::OpenOptions;
use std::io::{self, Write};

use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::config::LoggingConfig;
use crate::error::{TradingError, VenueError};

/// 로깅 시스템 초기화
pub fn init(config: &LoggingConfig) -> Result<(), TradingError> {
    let mut builder = Builder::from_default_env();

    builder
        .filter_level(parse_level(&config.level))
        .format_timestamp_millis();

    // 파일 경로가 있으면 콘솔과 파일에 함께 기록
    if let Some(path) = &config.file_path {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))));
    }

    builder
        .try_init()
        .map_err(|e| TradingError::ConfigError(format!("Logger already initialised: {}", e)))?;

    log::info!("로깅 시스템 초기화 완료: 레벨 = {}", config.level);

    Ok(())
}

/// 같은 로그 줄을 두 대상에 기록하는 writer
pub struct TeeWriter<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        TeeWriter { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

/// 로그 레벨 파싱. 알 수 없는 값은 info 로 처리
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 주문 제출 로그
pub fn log_order_submitted(kind: &str, payload: &serde_json::Value) {
    log::info!("Submitting {} order: {}", kind, payload);
}

/// 주문 접수 로그
pub fn log_order_accepted(kind: &str, response: &serde_json::Value, after_resync: bool) {
    if after_resync {
        log::info!("{} order accepted after time resync: {}", kind, response);
    } else {
        log::info!("{} order accepted: {}", kind, response);
    }
}

/// 주문 실패 로그
pub fn log_order_failed(kind: &str, error: &VenueError) {
    log::error!("{} order failed: {}", kind, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }

    #[test]
    fn test_tee_writer_copies_to_both_targets() {
        let mut tee = TeeWriter::new(Vec::new(), Vec::new());

        writeln!(tee, "BUY order accepted").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.primary, b"BUY order accepted\n");
        assert_eq!(tee.secondary, tee.primary);
    }
}
