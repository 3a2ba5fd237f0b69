//! Description cleanup: strip dates, period years and long bank references.

use anyhow::{Context, Result};
use kontoauszug_core::NormalizeConfig;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct Normalizer {
    year_re: Option<Regex>,
    reference_re: Regex,
    ws_re: Regex,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Result<Self> {
        let year_re = if config.noise_years.is_empty() {
            None
        } else {
            let years: Vec<String> = config.noise_years.iter().map(|y| y.to_string()).collect();
            let pattern = format!(r"\b(?:{})\b", years.join("|"));
            Some(Regex::new(&pattern).context("compiling noise year pattern")?)
        };

        let reference_re = Regex::new(&format!(
            r"{}\d{{{},}}",
            regex::escape(&config.reference_prefix),
            config.reference_min_digits
        ))
        .context("compiling reference number pattern")?;

        Ok(Self {
            year_re,
            reference_re,
            ws_re: Regex::new(r"\s+")?,
        })
    }

    /// Clean description text. Pass empty dates for continuation lines.
    pub fn clean(&self, text: &str, booking_date: &str, value_date: &str) -> String {
        let mut out = text.to_string();

        for date in [booking_date, value_date] {
            if !date.is_empty() {
                out = out.replace(date, "");
            }
        }

        if let Some(year_re) = &self.year_re {
            out = year_re.replace_all(&out, "").into_owned();
        }
        out = self.reference_re.replace_all(&out, "").into_owned();

        self.ws_re.replace_all(&out, " ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&NormalizeConfig::default()).unwrap()
    }

    #[test]
    fn test_strips_dates_year_and_reference() {
        let n = normalizer();
        let cleaned = n.clean(
            "01.03. 01.03. Miete  2025  202012345678901234",
            "01.03.",
            "01.03.",
        );
        assert_eq!(cleaned, "Miete");
    }

    #[test]
    fn test_year_only_removed_as_whole_word() {
        let n = normalizer();
        assert_eq!(n.clean("Rechnung 20251 2025", "", ""), "Rechnung 20251");
        assert_eq!(n.clean("Abo 2025/2026", "", ""), "Abo /2026");
    }

    #[test]
    fn test_short_reference_kept() {
        let n = normalizer();
        // Prefix plus only nine digits is not a reference number.
        assert_eq!(n.clean("Ref 2020123456789", "", ""), "Ref 2020123456789");
        assert_eq!(n.clean("Ref 20201234567890", "", ""), "Ref");
    }

    #[test]
    fn test_continuation_without_dates() {
        let n = normalizer();
        assert_eq!(n.clean("  weitere\tInfo  ", "", ""), "weitere Info");
        assert_eq!(n.clean("Gutschrift 01.03.", "", ""), "Gutschrift 01.03.");
    }

    #[test]
    fn test_configurable_years_and_prefix() {
        let n = Normalizer::new(&NormalizeConfig {
            noise_years: vec![],
            reference_prefix: "99".to_string(),
            reference_min_digits: 4,
        })
        .unwrap();
        assert_eq!(n.clean("Miete 2025 991234 2020123456789012", "", ""), "Miete 2025 2020123456789012");
    }
}
