//! 추천 모델 포트폴리오.

use serde::Serialize;

/// 이름이 붙은 목표 비중 모음.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelPortfolio {
    /// 조회용 이름
    pub name: &'static str,
    /// 설명
    pub description: &'static str,
    /// (티커, 목표 비중) 목록
    pub targets: &'static [(&'static str, u32)],
}

impl ModelPortfolio {
    /// 목표 비중 합계를 반환합니다.
    pub fn total_target_pct(&self) -> u32 {
        self.targets.iter().map(|(_, pct)| pct).sum()
    }
}

/// 내장 모델 포트폴리오.
pub const MODEL_PORTFOLIOS: &[ModelPortfolio] = &[
    ModelPortfolio {
        name: "dividends",
        description: "Dividend stocks",
        targets: &[
            ("CURY3", 10),
            ("CXSE3", 10),
            ("DIRR3", 10),
            ("ITSA4", 10),
            ("ITUB4", 10),
            ("PETR4", 10),
            ("POMO4", 10),
            ("RECV3", 10),
            ("VALE3", 10),
        ],
    },
    ModelPortfolio {
        name: "reits",
        description: "Real estate funds (monthly income)",
        targets: &[
            ("XPML11", 10),
            ("RBRR11", 10),
            ("RBRX11", 9),
            ("XPCI11", 9),
            ("BTLG11", 6),
            ("LVBI11", 6),
            ("PCIP11", 6),
            ("PVBI11", 6),
            ("KNCR11", 5),
            ("BRCO11", 5),
            ("XPLG11", 4),
            ("KNSC11", 1),
        ],
    },
];

/// 이름으로 모델 포트폴리오를 찾습니다 (대소문자 무시).
pub fn find_model(name: &str) -> Option<&'static ModelPortfolio> {
    let name = name.trim();
    MODEL_PORTFOLIOS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_model_case_insensitive() {
        assert_eq!(find_model("REITS").unwrap().name, "reits");
        assert_eq!(find_model(" dividends ").unwrap().targets.len(), 9);
        assert!(find_model("crypto").is_none());
    }

    #[test]
    fn test_builtin_totals() {
        assert_eq!(find_model("dividends").unwrap().total_target_pct(), 90);
        assert_eq!(find_model("reits").unwrap().total_target_pct(), 77);
    }
}
