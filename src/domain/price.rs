// src/domain/price.rs

use serde::Serialize;

/// Shown instead of a figure when rent is not listed.
pub const NEGOTIABLE: &str = "応談";
/// Square metres per tsubo.
pub const SQM_PER_TSUBO: f64 = 3.3058;

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceFormat {
    pub show_yen: bool,
    pub show_unit: bool,
    /// Map-marker style: whole 万 or 千 only.
    pub compact: bool,
}

impl PriceFormat {
    pub fn standard() -> Self {
        Self {
            show_yen: false,
            show_unit: true,
            compact: false,
        }
    }
}

/// Rent in 万 notation: two decimals under 10万, one under 100万, none above.
pub fn format_price(price: Option<u64>, opts: PriceFormat) -> String {
    let Some(price) = price.filter(|p| *p > 0) else {
        return NEGOTIABLE.to_string();
    };
    let yen = price as f64;

    if opts.compact {
        return if price >= 10_000 {
            format!("{}万", (yen / 10_000.0).round())
        } else {
            format!("{}千", (yen / 1_000.0).round())
        };
    }

    let figure = if price >= 10_000 {
        let man = yen / 10_000.0;
        let rounded = if man >= 100.0 {
            man.round()
        } else if man >= 10.0 {
            (man * 10.0).round() / 10.0
        } else {
            (man * 100.0).round() / 100.0
        };
        format!("{rounded}万")
    } else {
        with_commas(price)
    };

    let mut out = String::new();
    if opts.show_yen {
        out.push('¥');
    }
    out.push_str(&figure);
    if opts.show_unit && price >= 10_000 {
        out.push('円');
    }
    out
}

pub fn format_price_with_commas(price: Option<u64>) -> String {
    match price.filter(|p| *p > 0) {
        Some(p) => format!("¥{}", with_commas(p)),
        None => NEGOTIABLE.to_string(),
    }
}

fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TsuboPrice {
    pub price: u64,
    pub formatted: String,
}

/// Rent per tsubo of floor area.
pub fn tsubo_price(rent: Option<u64>, area: Option<f64>) -> Option<TsuboPrice> {
    let rent = rent.filter(|r| *r > 0)?;
    let area = area.filter(|a| *a > 0.0)?;
    let price = (rent as f64 / (area / SQM_PER_TSUBO)).round() as u64;
    Some(TsuboPrice {
        price,
        formatted: format!("¥{}/坪", with_commas(price)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceCategory {
    Budget,
    Standard,
    Upscale,
    Premium,
    Luxury,
}

impl PriceCategory {
    pub fn for_rent(rent: u64) -> Self {
        match rent {
            0..=99_999 => PriceCategory::Budget,
            100_000..=299_999 => PriceCategory::Standard,
            300_000..=499_999 => PriceCategory::Upscale,
            500_000..=999_999 => PriceCategory::Premium,
            _ => PriceCategory::Luxury,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceCategory::Budget => "格安",
            PriceCategory::Standard => "標準",
            PriceCategory::Upscale => "高級",
            PriceCategory::Premium => "プレミアム",
            PriceCategory::Luxury => "ラグジュアリー",
        }
    }
}
