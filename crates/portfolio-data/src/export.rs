//! 분석 결과 내보내기.
//!
//! - 매수 목록 CSV: `ticker,price,units,cost` (매수 금액 내림차순)
//! - 전체 보고서 JSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use portfolio_core::AnalysisReport;

use crate::error::Result;

/// 매수 목록 CSV 헤더
pub const PURCHASE_CSV_HEADER: &str = "ticker,price,units,cost";

/// 매수 목록을 CSV로 기록하고 기록한 행 수를 반환합니다.
pub fn write_purchase_csv_to<W: Write>(writer: &mut W, report: &AnalysisReport) -> Result<usize> {
    writeln!(writer, "{}", PURCHASE_CSV_HEADER)?;

    let lines = report.shopping_list();
    for line in &lines {
        writeln!(
            writer,
            "{},{},{},{}",
            line.ticker, line.price, line.units, line.cost
        )?;
    }
    writer.flush()?;

    Ok(lines.len())
}

/// 매수 목록을 CSV 파일로 저장합니다.
pub fn write_purchase_csv<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let rows = write_purchase_csv_to(&mut writer, report)?;

    info!(path = %path.as_ref().display(), rows, "Purchase list exported");
    Ok(rows)
}

/// 분석 보고서 전체를 JSON 파일로 저장합니다.
pub fn write_report_json<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;

    info!(path = %path.as_ref().display(), "Report exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{analyze, AllocationOptions, Holding, Portfolio, PriceBook, Ticker};
    use rust_decimal_macros::dec;

    fn report() -> AnalysisReport {
        let mut portfolio = Portfolio::new();
        portfolio
            .insert(Ticker::parse("CHEAP3").unwrap(), Holding::new(0, 50))
            .unwrap();
        portfolio
            .insert(Ticker::parse("PRICY3").unwrap(), Holding::new(0, 50))
            .unwrap();
        portfolio
            .insert(Ticker::parse("SKIP3").unwrap(), Holding::new(0, 0))
            .unwrap();

        let prices: PriceBook = vec![
            (Ticker::parse("CHEAP3").unwrap(), dec!(5)),
            (Ticker::parse("PRICY3").unwrap(), dec!(40)),
            (Ticker::parse("SKIP3").unwrap(), dec!(1)),
        ]
        .into_iter()
        .collect();

        analyze(&portfolio, &prices, dec!(100), AllocationOptions::default()).unwrap()
    }

    #[test]
    fn test_csv_sorted_by_cost_without_zero_rows() {
        let report = report();
        let mut buf = Vec::new();
        let rows = write_purchase_csv_to(&mut buf, &report).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], PURCHASE_CSV_HEADER);
        assert_eq!(lines.len(), rows + 1);
        assert!(!text.contains("SKIP3"));

        let costs: Vec<rust_decimal::Decimal> = lines[1..]
            .iter()
            .map(|l| l.rsplit(',').next().unwrap().parse().unwrap())
            .collect();
        assert!(costs.windows(2).all(|w| w[0] >= w[1]));

        let total: rust_decimal::Decimal = costs.iter().sum();
        assert_eq!(total, report.total_spent());
    }

    #[test]
    fn test_report_json_round_trips() {
        let report = report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_report_json(&path, &report).unwrap();
        let loaded: AnalysisReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }
}
