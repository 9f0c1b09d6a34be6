use api_client::{CatalogEntry, RateTable};
use chrono::{DateTime, Utc};
use core_types::CandidateRecord;
use rand::Rng;

/// Inclusive bounds of the GDP multiplier. For a matched rate `r > 0` and
/// population `p`, the estimate always lands in `[p*1000/r, p*2000/r]`.
pub const MULTIPLIER_MIN: u32 = 1000;
pub const MULTIPLIER_MAX: u32 = 2000;

/// The randomness seam behind the GDP estimate.
///
/// The estimate is a deliberately noisy proxy: a fresh multiplier is drawn
/// per record per pass and never persisted, so the same inputs produce
/// different estimates across passes. Injecting the source lets tests pin
/// the boundary values without changing the production distribution.
pub trait MultiplierSource {
    fn draw(&mut self) -> u32;
}

/// Production source: uniform over `[MULTIPLIER_MIN, MULTIPLIER_MAX]`.
pub struct UniformMultiplier;

impl MultiplierSource for UniformMultiplier {
    fn draw(&mut self) -> u32 {
        rand::thread_rng().gen_range(MULTIPLIER_MIN..=MULTIPLIER_MAX)
    }
}

/// A pinned multiplier, for exercising the estimate's boundary behavior.
pub struct FixedMultiplier(pub u32);

impl MultiplierSource for FixedMultiplier {
    fn draw(&mut self) -> u32 {
        self.0
    }
}

/// Joins the country catalog against the rate table and produces the
/// candidate records of one refresh pass, in catalog order.
///
/// Per entry: the population is normalized to 0 unless it is a finite
/// non-negative number; the currency code is the first listed currency, if
/// any; a matched positive rate yields `estimated_gdp = population *
/// multiplier / rate`, anything else yields a null rate and a zero estimate.
/// Every candidate is stamped with the single shared pass timestamp.
///
/// Skip policy: entries with a missing name, a zero population, or no
/// currency code are excluded entirely; they are not written this pass and
/// any stored record of that name is left untouched. An entry whose code has
/// no matching rate is NOT skipped; it is emitted with a null rate and zero
/// estimate.
pub fn reconcile(
    catalog: &[CatalogEntry],
    rates: &RateTable,
    now: DateTime<Utc>,
    multipliers: &mut dyn MultiplierSource,
) -> Vec<CandidateRecord> {
    let mut candidates = Vec::new();

    for entry in catalog {
        let name = match entry.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let population = entry
            .population
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| p as i64)
            .unwrap_or(0);

        let currency_code = entry
            .currencies
            .first()
            .and_then(|currency| currency.code.clone())
            .filter(|code| !code.is_empty());

        if population == 0 || currency_code.is_none() {
            continue;
        }

        let matched_rate = currency_code
            .as_deref()
            .and_then(|code| rates.rates.get(code))
            .copied();

        let (exchange_rate, estimated_gdp) = match matched_rate {
            Some(rate) if rate > 0.0 => {
                let gdp = population as f64 * f64::from(multipliers.draw()) / rate;
                (Some(rate), gdp)
            }
            Some(rate) => (Some(rate), 0.0),
            None => (None, 0.0),
        };

        candidates.push(CandidateRecord {
            name,
            capital: entry.capital.clone(),
            region: entry.region.clone(),
            population,
            currency_code,
            exchange_rate,
            estimated_gdp,
            flag_url: entry.flag.clone(),
            last_refreshed_at: now,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::CurrencyEntry;
    use std::collections::HashMap;

    fn entry(name: &str, population: f64, code: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            name: Some(name.to_string()),
            population: Some(population),
            currencies: code
                .map(|c| {
                    vec![CurrencyEntry {
                        code: Some(c.to_string()),
                    }]
                })
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn rate_table(pairs: &[(&str, f64)]) -> RateTable {
        RateTable {
            rates: pairs
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    #[test]
    fn skips_entries_without_name_population_or_currency() {
        let catalog = vec![
            CatalogEntry::default(),
            entry("Zeropolis", 0.0, Some("ZPL")),
            entry("Cashless", 1000.0, None),
            entry("Keeper", 1000.0, Some("KPR")),
        ];
        let rates = rate_table(&[("KPR", 2.0)]);

        let candidates = reconcile(&catalog, &rates, Utc::now(), &mut FixedMultiplier(1000));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Keeper");
    }

    #[test]
    fn negative_or_non_finite_population_normalizes_to_zero_and_skips() {
        let mut infinite = entry("Infinitia", 0.0, Some("INF"));
        infinite.population = Some(f64::INFINITY);
        let catalog = vec![entry("Negativia", -5.0, Some("NEG")), infinite];
        let rates = rate_table(&[("NEG", 1.0), ("INF", 1.0)]);

        let candidates = reconcile(&catalog, &rates, Utc::now(), &mut FixedMultiplier(1000));

        assert!(candidates.is_empty());
    }

    #[test]
    fn unmatched_currency_yields_null_rate_and_zero_gdp() {
        let catalog = vec![entry("Obscuria", 500.0, Some("OBS"))];
        let rates = rate_table(&[("USD", 1.0)]);

        let candidates = reconcile(&catalog, &rates, Utc::now(), &mut FixedMultiplier(1000));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].exchange_rate, None);
        assert_eq!(candidates[0].estimated_gdp, 0.0);
    }

    #[test]
    fn zero_rate_yields_zero_gdp_but_keeps_the_rate() {
        let catalog = vec![entry("Freefall", 500.0, Some("FRE"))];
        let rates = rate_table(&[("FRE", 0.0)]);

        let candidates = reconcile(&catalog, &rates, Utc::now(), &mut FixedMultiplier(1000));

        assert_eq!(candidates[0].exchange_rate, Some(0.0));
        assert_eq!(candidates[0].estimated_gdp, 0.0);
    }

    #[test]
    fn pinned_multipliers_hit_the_estimate_bounds() {
        let catalog = vec![entry("Wakanda", 1_000_000.0, Some("WKD"))];
        let rates = rate_table(&[("WKD", 2.0)]);
        let now = Utc::now();

        let low = reconcile(&catalog, &rates, now, &mut FixedMultiplier(MULTIPLIER_MIN));
        let high = reconcile(&catalog, &rates, now, &mut FixedMultiplier(MULTIPLIER_MAX));

        assert_eq!(low[0].estimated_gdp, 500_000_000.0);
        assert_eq!(high[0].estimated_gdp, 1_000_000_000.0);
    }

    #[test]
    fn production_multiplier_stays_within_bounds() {
        let catalog = vec![entry("Wakanda", 1_000_000.0, Some("WKD"))];
        let rates = rate_table(&[("WKD", 2.0)]);

        for _ in 0..32 {
            let candidates = reconcile(&catalog, &rates, Utc::now(), &mut UniformMultiplier);
            let gdp = candidates[0].estimated_gdp;
            assert!((500_000_000.0..=1_000_000_000.0).contains(&gdp));
        }
    }

    #[test]
    fn first_listed_currency_wins_and_timestamp_is_shared() {
        let mut multi = entry("Multi", 100.0, Some("AAA"));
        multi.currencies.push(CurrencyEntry {
            code: Some("BBB".to_string()),
        });
        let catalog = vec![multi, entry("Other", 100.0, Some("BBB"))];
        let rates = RateTable {
            rates: HashMap::from([("AAA".to_string(), 1.0), ("BBB".to_string(), 1.0)]),
        };
        let now = Utc::now();

        let candidates = reconcile(&catalog, &rates, now, &mut FixedMultiplier(1000));

        assert_eq!(candidates[0].currency_code.as_deref(), Some("AAA"));
        assert!(candidates.iter().all(|c| c.last_refreshed_at == now));
    }
}
