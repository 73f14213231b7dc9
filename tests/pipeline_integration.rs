//! End-to-end monitoring scenarios on synthetic sensor data.
//!
//! Builds hourly series with seeded noise and runs them through changepoint detection,
//! the spectral exponent series and rolling PCA with region extraction.

use anofox_monitor::changepoint::{detect_series, BocpdConfig};
use anofox_monitor::config::MonitorConfig;
use anofox_monitor::core::{FeatureFrame, SampleRate, SampleUnit, Series};
use anofox_monitor::pca::{rolling_pca, PcaConfig};
use anofox_monitor::regions::{collect_regions, rates_for_limits, PcaSummary, RegionConfig};
use anofox_monitor::spectral::{alpha_series, fit_spectrum};
use anofox_monitor::MonitorError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn hourly_timestamps(n: usize) -> Vec<DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| base + Duration::hours(i as i64)).collect()
}

/// Daily cycle plus noise.
fn daily_sensor(n: usize, amplitude: f64, noise: f64, rng: &mut StdRng) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * i as f64 / 24.0).sin() + rng.gen_range(-noise..noise))
        .collect()
}

#[test]
fn level_shift_found_in_differenced_series() {
    let mut rng = StdRng::seed_from_u64(11);
    let n = 200;
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let trend = if i < 100 { 0.0 } else { 0.5 * (i - 100) as f64 };
            trend + rng.gen_range(-0.05..0.05)
        })
        .collect();
    let series = Series::with_constant_error(hourly_timestamps(n), values, 0.1).unwrap();

    let config = BocpdConfig::default().hazard(0.01);
    let result = detect_series(&series, &config).unwrap();

    // The slope change becomes a level shift in the differences.
    assert_eq!(result.len(), n - 1);
    let near_shift = result
        .changepoints()
        .into_iter()
        .filter(|&t| (98..=102).contains(&t))
        .count();
    assert!(near_shift >= 1, "changepoints {:?}", result.changepoints());
    assert!(result.max_run_lengths[n - 2] > 50);

    let summary = result.summary(config.tol);
    assert!(summary.zeros >= 1);
    assert!(summary.max > 90);
}

#[test]
fn sample_rate_drives_spectral_units() {
    let mut rng = StdRng::seed_from_u64(5);
    let n = 24 * 7 * 3;
    let values = daily_sensor(n, 3.0, 0.3, &mut rng);
    let series = Series::with_constant_error(hourly_timestamps(n), values, 0.2).unwrap();

    let rate = series.sample_rate().unwrap();
    assert_eq!(rate.unit, SampleUnit::Hours);

    let config = MonitorConfig::default();
    let window = config.window_samples(&rate);
    assert_eq!(window, 168);

    let summary = fit_spectrum(
        series.values(),
        series.errors(),
        rate.samples_per_year(),
        &config.spectral,
    )
    .unwrap();
    // Frequencies are in cycles per year: lowest bin is one cycle per series length.
    let expected_min = 365.0 * 24.0 / n as f64;
    assert!((summary.freq_min - expected_min).abs() < 1e-6);

    let alphas = alpha_series(
        series.values(),
        window,
        series.errors(),
        rate.samples_per_year(),
        &config.spectral,
    )
    .unwrap();
    assert_eq!(alphas.len(), n);
    assert!(alphas.points[..window].iter().all(|p| !p.is_defined()));
    assert!(alphas.points[window..].iter().all(|p| p.is_defined()));
    assert!(alphas.summary().n_fits > 0);
}

#[test]
fn sensor_fault_produces_region_and_rate() {
    let mut rng = StdRng::seed_from_u64(2024);
    let n = 24 * 7 * 3;
    let timestamps = hourly_timestamps(n);

    let driver = daily_sensor(n, 2.0, 0.2, &mut rng);
    let follower: Vec<f64> = driver
        .iter()
        .map(|x| 1.5 * x + rng.gen_range(-0.1..0.1))
        .collect();
    let mut independent = daily_sensor(n, 0.0, 0.5, &mut rng);
    independent.iter_mut().for_each(|x| *x += 10.0);

    // Follower decouples from the driver for twelve hours in week three.
    let mut faulty = follower;
    for (k, i) in (400..412).enumerate() {
        faulty[i] += if k % 2 == 0 { 6.0 } else { -6.0 };
    }

    let series: Vec<Series> = [driver, faulty, independent]
        .into_iter()
        .map(|v| Series::with_constant_error(timestamps.clone(), v, 0.1).unwrap())
        .collect();
    let labels = vec!["driver".to_string(), "follower".to_string(), "ambient".to_string()];
    let frame = FeatureFrame::from_series(labels, &series).unwrap();

    let config = MonitorConfig::default().regions(RegionConfig::default().alpha_limit(1e-3));
    config.validate().unwrap();
    let rate = series[0].sample_rate().unwrap();
    let pca_config = config.pca_for(&rate);
    assert_eq!(pca_config.window, 168);

    let result = rolling_pca(&frame, &pca_config).unwrap();
    assert_eq!(result.len(), n - 1);
    assert_eq!(result.epochs.len(), 3);

    let collected = collect_regions(
        &result.t2,
        &result.q,
        &rate,
        pca_config.n_components,
        Some("follower"),
        &config.regions,
        &config.rate,
    )
    .unwrap();

    // Differenced rows 399..=411 carry the fault.
    let hit = collected
        .regions_all
        .iter()
        .any(|r| r.first <= 411 && r.last >= 399);
    assert!(hit, "regions {:?}", collected.regions_all);
    assert!(collected.rates_all[405] > 0.0);
    assert!(collected.rates_all.iter().all(|&r| (0.0..=24.0).contains(&r)));
    assert_eq!(collected.rates_specific.len(), n - 1);

    let summary = PcaSummary::new(&result, &collected.regions_all);
    assert_eq!(summary.n_regions, collected.regions_all.len());
    assert_eq!(summary.n_components, 1);

    let rates = rates_for_limits(
        &result.t2,
        &result.q,
        &rate,
        &[1e-2, 1e-3],
        pca_config.n_components,
        &config.regions,
        &config.rate,
    )
    .unwrap();
    let loose: f64 = rates[0].iter().sum();
    let strict: f64 = rates[1].iter().sum();
    assert!(loose >= strict);
}

#[test]
fn short_history_degrades_gracefully() {
    let mut rng = StdRng::seed_from_u64(3);
    let n = 100;
    let a = daily_sensor(n, 1.0, 0.1, &mut rng);
    let b = daily_sensor(n, 2.0, 0.1, &mut rng);
    let frame = FeatureFrame::new(vec!["a".into(), "b".into()], vec![a, b]).unwrap();

    let result = rolling_pca(&frame, &PcaConfig::default()).unwrap();
    assert!(result.is_empty());

    let rate = SampleRate::new(1.0, SampleUnit::Hours).unwrap();
    let collected = collect_regions(
        &result.t2,
        &result.q,
        &rate,
        1,
        Some("a"),
        &RegionConfig::default(),
        &Default::default(),
    )
    .unwrap();
    assert!(collected.regions_all.is_empty());
    assert!(collected.rates_all.is_empty());
}

#[test]
fn boundary_rejects_malformed_series() {
    let mut timestamps = hourly_timestamps(5);
    timestamps.swap(1, 2);
    let err = Series::with_constant_error(timestamps, vec![0.0; 5], 0.1).unwrap_err();
    assert!(matches!(err, MonitorError::TimestampError(_)));

    let err = Series::new(hourly_timestamps(3), vec![0.0; 3], vec![0.1; 2]).unwrap_err();
    assert!(matches!(err, MonitorError::DimensionMismatch { .. }));

    // Sensor gaps are rejected before any PCA window sees them.
    let mut gappy = vec![0.5; 60];
    gappy[25] = f64::NAN;
    let err = FeatureFrame::new(vec!["a".into(), "b".into()], vec![vec![1.0; 60], gappy])
        .unwrap_err();
    assert_eq!(err, MonitorError::MissingValues("b".to_string()));
}
