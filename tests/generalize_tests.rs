use generalize::{
    DouglasPeucker, DouglasPeuckerConfig, GeneralizationConfig, Generalizer, GeneralizerEngine,
    GeneralizerError, GeneralizerKind, GeneralizerOptions, LargestTriangleThreeBuckets, LttbConfig,
    Sample, Series, SeriesCollection,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const BASE: i64 = 1_609_459_200_000;

fn series_of(id: &str, values: &[Option<i64>]) -> Series {
    let samples = values
        .iter()
        .zip(0i64..)
        .map(|(value, i)| match value {
            Some(v) => Sample::new(BASE + i * 1000, Decimal::from(*v)),
            None => Sample::no_data(BASE + i * 1000),
        })
        .collect();
    Series::new(id, samples)
}

fn noisy_series(rng: &mut StdRng, id: &str, len: usize, no_data_share: f64) -> Series {
    let samples = (0..len)
        .zip(0i64..)
        .map(|(_, i)| {
            let timestamp = BASE + i * 60_000 + rng.random_range(0..1000);
            if rng.random_bool(no_data_share) {
                Sample::no_data(timestamp)
            } else {
                Sample::new(timestamp, Decimal::new(rng.random_range(-50_000..50_000), 2))
            }
        })
        .collect();
    Series::new(id, samples)
}

fn indices_of(input: &Series, output: &Series) -> Vec<usize> {
    output
        .samples()
        .iter()
        .map(|s| {
            input
                .samples()
                .iter()
                .position(|i| i.timestamp() == s.timestamp())
                .unwrap()
        })
        .collect()
}

#[test]
fn test_douglas_peucker_zigzag_scenario() {
    let input = series_of(
        "zigzag",
        &[
            Some(0),
            Some(1),
            Some(2),
            Some(1),
            Some(0),
            Some(1),
            Some(2),
            Some(1),
            Some(0),
            Some(1),
        ],
    );
    let dp = DouglasPeucker::new(DouglasPeuckerConfig::new(0.05).unwrap());
    let output = dp.reduce(&input).unwrap();

    let kept = indices_of(&input, &output);
    for index in [0, 2, 6, 9] {
        assert!(kept.contains(&index), "index {index} missing from {kept:?}");
    }
    assert!(output.is_strictly_ascending());
}

#[test]
fn test_lttb_thousand_samples_scenario() {
    let mut rng = StdRng::seed_from_u64(1000);
    let input = noisy_series(&mut rng, "pressure", 1000, 0.0);
    let lttb = LargestTriangleThreeBuckets::new(LttbConfig::new(100, 0.2).unwrap());
    let output = lttb.reduce(&input).unwrap();

    assert_eq!(output.len(), 100);
    assert_eq!(output.first(), input.first());
    assert_eq!(output.last(), input.last());
}

#[test]
fn test_lttb_all_no_data_scenario() {
    let mut values = vec![None; 2000];
    values[0] = Some(3);
    values[1999] = Some(4);
    let input = series_of("offline", &values);

    let options = GeneralizerOptions::new().with("threshold", "50");
    let collection: SeriesCollection = [input.clone()].into_iter().collect();
    let reduced = GeneralizerEngine::new()
        .reduce_collection(&collection, "lttb", &options)
        .unwrap();
    let output = reduced.get("offline").unwrap();

    assert_eq!(output.len(), 50);
    assert_eq!(output.first(), input.first());
    assert_eq!(output.last(), input.last());
    assert!(output.samples()[1..49].iter().all(Sample::is_no_data));
    assert!(output.is_strictly_ascending());
}

#[test]
fn test_identity_on_small_input() {
    let tiny = series_of("tiny", &[Some(1), Some(9)]);
    let dp = DouglasPeucker::default();
    assert_eq!(dp.reduce(&tiny).unwrap(), tiny);

    let short = series_of("short", &[Some(1), Some(9), Some(4), Some(7)]);
    let lttb = LargestTriangleThreeBuckets::default();
    assert_eq!(lttb.reduce(&short).unwrap(), short);
}

#[test]
fn test_endpoints_and_ordering_preserved() {
    let mut rng = StdRng::seed_from_u64(77);
    let configs = [
        GeneralizationConfig::from(DouglasPeuckerConfig::new(25.0).unwrap()),
        GeneralizationConfig::from(DouglasPeuckerConfig::new(0.5).unwrap()),
        GeneralizationConfig::from(LttbConfig::new(64, 0.2).unwrap()),
        GeneralizationConfig::from(LttbConfig::new(300, 4.0).unwrap()),
    ];

    for round in 0..10 {
        let input = noisy_series(&mut rng, "noisy", 1500 + round * 37, 0.1);
        for config in &configs {
            let output = config.reduce(&input).unwrap();
            assert!(output.len() <= input.len());
            assert_eq!(output.first(), input.first());
            assert_eq!(output.last(), input.last());
            assert!(output.is_strictly_ascending(), "{config:?} broke ordering");
        }
    }
}

#[test]
fn test_douglas_peucker_tolerance_monotonic() {
    let mut rng = StdRng::seed_from_u64(5);
    let collection: SeriesCollection = (0..4)
        .map(|i| noisy_series(&mut rng, &format!("sensor-{i}"), 800, 0.05))
        .collect();
    let engine = GeneralizerEngine::builder().parallelism(2).build();

    let mut previous = usize::MAX;
    for tolerance in ["0", "0.5", "5", "50", "500", "5000"] {
        let options = GeneralizerOptions::new().with("TOLERANCE_VALUE", tolerance);
        let reduced = engine.reduce_collection(&collection, "dp", &options).unwrap();
        let size = reduced.sample_count();
        assert!(size <= previous, "tolerance {tolerance} grew output to {size}");
        previous = size;
    }
}

#[test]
fn test_engine_all_or_nothing() {
    let collection: SeriesCollection = [
        series_of("small", &[Some(1), Some(2), Some(3), Some(2)]),
        series_of("large", &vec![Some(1); 50]),
    ]
    .into_iter()
    .collect();
    let options = GeneralizerOptions::new().with("maxEntries", "10");

    let result = GeneralizerEngine::new().reduce_collection(&collection, "dp", &options);
    match result {
        Err(err @ GeneralizerError::GeneralizationLimitExceeded { .. }) => {
            assert_eq!(err.to_string(), "maximum number of entries exceeded (50 > 10)");
        }
        other => panic!("Expected GeneralizationLimitExceeded, got {other:?}"),
    }
}

#[test]
fn test_configuration_from_settings_file() {
    let settings = r#"[
        {"algorithm": "dp", "toleranceValue": 2.0, "maxEntries": -1},
        {"algorithm": "lttb", "threshold": 40, "noDataGapThreshold": 0.5},
        {"algorithm": "lttb"}
    ]"#;
    let configs: Vec<GeneralizationConfig> = serde_json::from_str(settings).unwrap();
    assert_eq!(configs[0].kind(), GeneralizerKind::DouglasPeucker);
    assert_eq!(configs[1], GeneralizationConfig::from(LttbConfig::new(40, 0.5).unwrap()));
    assert_eq!(configs[2], GeneralizationConfig::default());

    let mut rng = StdRng::seed_from_u64(9);
    let collection: SeriesCollection = [noisy_series(&mut rng, "humidity", 400, 0.0)]
        .into_iter()
        .collect();
    let engine = GeneralizerEngine::new();
    let reduced = engine.reduce_collection_with(&collection, &configs[1]).unwrap();
    assert_eq!(reduced.get("humidity").unwrap().len(), 40);
}

#[test]
fn test_collection_from_json() {
    let json = r#"{
        "temp": {
            "id": "temp",
            "samples": [
                {"timestamp": 0, "value": "1.5"},
                {"timestamp": 1000, "value": null},
                {"timestamp": 2000, "value": "2.25"}
            ],
            "metadata": {"unit": "°C"}
        }
    }"#;
    let collection: SeriesCollection = serde_json::from_str(json).unwrap();
    let temp = collection.get("temp").unwrap();
    assert_eq!(temp.len(), 3);
    assert_eq!(temp.no_data_count(), 1);
    assert_eq!(temp.samples()[2].value(), Some(Decimal::new(225, 2)));
    assert_eq!(temp.metadata().unit.as_deref(), Some("°C"));
}

#[test]
fn test_float_and_decimal_agree_on_douglas_peucker() {
    let values = [3, 8, 2, 9, 9, 1, 0, 4, 7, 7, 2, 5];
    let decimal: Series = Series::new(
        "d",
        values
            .iter()
            .zip(0i64..)
            .map(|(v, i)| Sample::new(i * 1000, Decimal::from(*v)))
            .collect(),
    );
    let float: Series<f64> = Series::new(
        "f",
        values
            .iter()
            .zip(0i64..)
            .map(|(v, i)| Sample::new(i * 1000, f64::from(*v)))
            .collect(),
    );

    let dp = DouglasPeucker::new(DouglasPeuckerConfig::new(1.5).unwrap());
    let decimal_timestamps: Vec<i64> = dp
        .reduce(&decimal)
        .unwrap()
        .samples()
        .iter()
        .map(Sample::timestamp)
        .collect();
    let float_timestamps: Vec<i64> = dp
        .reduce(&float)
        .unwrap()
        .samples()
        .iter()
        .map(Sample::timestamp)
        .collect();
    assert_eq!(decimal_timestamps, float_timestamps);
}
