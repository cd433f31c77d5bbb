// Unit-price cost projection.
//
// Prices are the 2023 unit rates; later years compound the yearly inflation
// rates in order, one rate per year after the base year.
use crate::error::ProjectionError;
use serde::Serialize;

pub const BASE_YEAR: i32 = 2023;

pub const UNIT_PRICES: [(&str, f64); 10] = [
    ("Jalan", 275_654.97),
    ("Saluran", 1_105_457.51),
    ("Speedbump", 3_635_000.00),
    ("Cermin Cembung", 4_500_000.00),
    ("Vertikal Garden", 25_238_000.00),
    ("PJU", 15_216_041.00),
    ("Bollard", 2_791_125.00),
    ("Bangku", 9_900_000.00),
    ("Gapura", 30_489_491.00),
    ("Wayfinding", 16_380_000.00),
];

pub const INFLATION: [f64; 17] = [
    0.0090, 0.0337, 0.0331, 0.0340, 0.0331, 0.0325, 0.0342, 0.0380, 0.0358, 0.0298, 0.0313,
    0.0336, 0.0335, 0.0336, 0.0336, 0.0336, 0.0337,
];

pub const MAX_YEAR: i32 = BASE_YEAR + INFLATION.len() as i32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub item: String,
    pub volume: f64,
    pub year: i32,
    pub unit_label: &'static str,
    pub unit_price: f64,
    pub multiplier: f64,
    pub total: f64,
}

fn lookup(item: &str) -> Option<(&'static str, f64)> {
    UNIT_PRICES
        .iter()
        .copied()
        .find(|(name, _)| name.eq_ignore_ascii_case(item.trim()))
}

pub fn unit_price(item: &str) -> Option<f64> {
    lookup(item).map(|(_, price)| price)
}

/// Compounded price factor from the base year up to `year`.
pub fn inflation_multiplier(year: i32) -> Result<f64, ProjectionError> {
    if !(BASE_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ProjectionError::YearOutOfRange {
            year,
            min: BASE_YEAR,
            max: MAX_YEAR,
        });
    }
    let steps = (year - BASE_YEAR) as usize;
    Ok(INFLATION[..steps].iter().map(|r| 1.0 + r).product())
}

pub fn estimate(item: &str, volume: f64, year: i32) -> Result<Estimate, ProjectionError> {
    let (name, price) =
        lookup(item).ok_or_else(|| ProjectionError::UnknownItem(item.to_string()))?;
    if !volume.is_finite() || volume <= 0.0 {
        return Err(ProjectionError::InvalidVolume(volume));
    }
    let multiplier = inflation_multiplier(year)?;
    let unit_label = match name {
        "Jalan" | "Saluran" => "meter",
        _ => "unit",
    };
    Ok(Estimate {
        item: name.to_string(),
        volume,
        year,
        unit_label,
        unit_price: price,
        multiplier,
        total: price * volume * multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_year_has_no_inflation() {
        let e = estimate("Jalan", 10.0, BASE_YEAR).expect("estimate");
        assert_eq!(e.multiplier, 1.0);
        assert!((e.total - 2_756_549.7).abs() < 1e-6);
        assert_eq!(e.unit_label, "meter");
    }

    #[test]
    fn compounds_one_rate_per_year() {
        let e = estimate("bollard", 2.0, 2025).expect("estimate");
        let expected = 2_791_125.0 * 2.0 * 1.0090 * 1.0337;
        assert!((e.total - expected).abs() < 1e-6);
        assert_eq!(e.item, "Bollard");
        assert_eq!(e.unit_label, "unit");
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            estimate("Kolam", 1.0, 2024),
            Err(ProjectionError::UnknownItem("Kolam".into()))
        );
        assert_eq!(
            estimate("PJU", 0.0, 2024),
            Err(ProjectionError::InvalidVolume(0.0))
        );
        assert!(matches!(
            estimate("PJU", 1.0, 2041),
            Err(ProjectionError::YearOutOfRange { year: 2041, .. })
        ));
        assert!(estimate("PJU", 1.0, MAX_YEAR).is_ok());
    }
}
