//! 터미널 출력 형식.

use portfolio_core::{
    AnalysisReport, DecimalExt, Portfolio, Valuation, MODEL_PORTFOLIOS,
};

/// 보유 종목 테이블.
pub fn format_holdings(portfolio: &Portfolio) -> String {
    if portfolio.is_empty() {
        return "보유 종목이 없습니다. `portfolio add <TICKER>`로 추가하세요.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:>10} {:>8} {:>14} {:>14}\n",
        "TICKER", "QTY", "TARGET", "AVG_COST", "DISTRIB"
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for (ticker, holding) in portfolio.iter() {
        output.push_str(&format!(
            "{:<10} {:>10} {:>7}% {:>14} {:>14}\n",
            ticker,
            holding.quantity,
            holding.target_pct,
            holding.average_cost.to_money_string(),
            holding.distributions.to_money_string(),
        ));
    }

    let total = portfolio.total_target_pct();
    output.push('\n');
    output.push_str(&format!(
        "Total: {} holdings, target sum {}%",
        portfolio.len(),
        total
    ));
    if total != 100 {
        output.push_str(" (목표 비중 합계가 100%가 아닙니다)");
    }

    output
}

/// 종목별 수익률 테이블 (수익률 내림차순).
pub fn format_valuation(valuation: &Valuation) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:>8} {:>12} {:>14} {:>14} {:>9} {:>12} {:>8}\n",
        "TICKER", "QTY", "PRICE", "VALUE", "PROFIT", "PROFIT%", "DISTRIB", "YOC%"
    ));
    output.push_str(&"-".repeat(94));
    output.push('\n');

    for row in valuation.rows_by_profit_pct() {
        output.push_str(&format!(
            "{:<10} {:>8} {:>12} {:>14} {:>14} {:>9} {:>12} {:>8}\n",
            row.ticker,
            row.quantity,
            row.price.to_money_string(),
            row.market_value.to_money_string(),
            row.profit.to_money_string(),
            row.profit_pct.to_percent_string(),
            row.distributions.to_money_string(),
            row.yield_on_cost_pct.to_percent_string(),
        ));
    }

    output
}

/// 포트폴리오 요약 지표.
pub fn format_summary(report: &AnalysisReport) -> String {
    let summary = &report.valuation.summary;
    let mut output = String::new();

    output.push_str(&format!("평가액:     {}\n", summary.market_value.to_money_string()));
    output.push_str(&format!("투자 원금:  {}\n", summary.invested.to_money_string()));
    output.push_str(&format!(
        "평가 손익:  {} ({})\n",
        summary.profit.to_money_string(),
        summary.profit_pct.to_percent_string()
    ));
    output.push_str(&format!("누적 배당:  {}\n", summary.distributions.to_money_string()));
    output.push_str(&format!("총 수익:    {}\n", summary.total_return.to_money_string()));

    if !report.unavailable.is_empty() {
        let tickers: Vec<&str> = report.unavailable.iter().map(|t| t.as_str()).collect();
        output.push_str(&format!("시세 없음 (제외됨): {}\n", tickers.join(", ")));
    }

    output
}

/// 매수 목록 (매수 금액 내림차순).
pub fn format_shopping_list(report: &AnalysisReport) -> String {
    if report.is_balanced() {
        return format!(
            "이미 균형 상태입니다: 투자금 {}으로 살 종목이 없습니다 ({}).",
            report.cash.to_money_string(),
            report.plan.stop_reason.describe()
        );
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:>12} {:>8} {:>14}\n",
        "TICKER", "PRICE", "UNITS", "COST"
    ));
    output.push_str(&"-".repeat(47));
    output.push('\n');

    for line in report.shopping_list() {
        output.push_str(&format!(
            "{:<10} {:>12} {:>8} {:>14}\n",
            line.ticker,
            line.price.to_money_string(),
            line.units,
            line.cost.to_money_string(),
        ));
    }

    output.push('\n');
    output.push_str(&format!("총 매수 금액: {}\n", report.total_spent().to_money_string()));
    output.push_str(&format!("남은 현금:    {}\n", report.remaining_cash().to_money_string()));
    output.push_str(&format!("종료 사유:    {}", report.plan.stop_reason.describe()));

    output
}

/// 분석 보고서 전체.
pub fn format_report(report: &AnalysisReport) -> String {
    format!(
        "\n{}\n{}\n[매수 목록] 투자금 {}\n{}",
        format_valuation(&report.valuation),
        format_summary(report),
        report.cash.to_money_string(),
        format_shopping_list(report)
    )
}

/// 내장 모델 포트폴리오 목록.
pub fn format_models() -> String {
    let mut output = String::new();
    for model in MODEL_PORTFOLIOS {
        output.push_str(&format!(
            "\n{} - {} (target sum {}%)\n",
            model.name,
            model.description,
            model.total_target_pct()
        ));
        output.push_str(&format!("{:-<50}\n", ""));
        for (ticker, pct) in model.targets {
            output.push_str(&format!("  {:<10} {:>3}%\n", ticker, pct));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{analyze, AllocationOptions, Holding, PriceBook, Ticker};
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_holdings_table_flags_target_sum() {
        let mut portfolio = Portfolio::new();
        portfolio.insert(ticker("ITSA4"), Holding::new(100, 30)).unwrap();

        let table = format_holdings(&portfolio);
        assert!(table.contains("ITSA4"));
        assert!(table.contains("target sum 30%"));
        assert!(table.contains("100%가 아닙니다"));
    }

    #[test]
    fn test_shopping_list_and_balanced_message() {
        let mut portfolio = Portfolio::new();
        portfolio.insert(ticker("BOVA11"), Holding::new(0, 100)).unwrap();
        let prices: PriceBook = vec![(ticker("BOVA11"), dec!(120))].into_iter().collect();

        let report = analyze(&portfolio, &prices, dec!(1000), AllocationOptions::default()).unwrap();
        let list = format_shopping_list(&report);
        assert!(list.contains("BOVA11"));
        assert!(list.contains("960.00"));
        assert!(list.contains("40.00"));

        let report = analyze(&portfolio, &prices, dec!(50), AllocationOptions::default()).unwrap();
        assert!(format_shopping_list(&report).contains("이미 균형 상태"));
    }

    #[test]
    fn test_models_listing() {
        let text = format_models();
        assert!(text.contains("dividends"));
        assert!(text.contains("XPML11"));
    }
}
