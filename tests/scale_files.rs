use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;

use scala::{ScaleFile, TuningError};

mod common;
use common::{data_path, read_fixture};

#[test]
fn test_12tet_file() {
    let scale = ScaleFile::from_file(data_path("12tet.scl")).expect("12tet.scl should parse");

    assert_eq!(scale.get_scale_length(), 13);
    assert_abs_diff_eq!(scale.get_period(), 2.0, epsilon = 1e-6);
    assert_eq!(scale.get_filename(), "12tet.scl");
    assert_eq!(scale.get_declared_count(), Some(12));

    for i in 1..13 {
        let expected = 2.0_f64.powf(i as f64 / 12.0);
        assert_abs_diff_eq!(scale.get_ratio(i).unwrap(), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(
            scale.get_degree(i).unwrap().cents(),
            i as f64 * 100.0,
            epsilon = 1e-6
        );
    }
}

#[test]
fn test_file_and_string_paths_agree() {
    for name in ["12tet.scl", "pythagorean.scl"] {
        let from_file = ScaleFile::from_file(data_path(name)).unwrap();
        let from_text: ScaleFile = read_fixture(name).parse().unwrap();
        assert_eq!(from_file, from_text, "mismatch for {}", name);
    }
}

#[test]
fn test_round_trip_export() {
    for name in ["12tet.scl", "pythagorean.scl"] {
        let text = read_fixture(name);
        let scale = ScaleFile::parse_str(&text).unwrap();

        let original: Vec<&str> = text.lines().collect();
        let exported: Vec<&str> = scale.get_scala_content().lines().collect();
        assert_eq!(original, exported, "round trip failed for {}", name);
    }
}

#[test]
fn test_ratio_degrees_with_labels() {
    let scale = ScaleFile::from_file(data_path("pythagorean.scl")).unwrap();

    let descs: Vec<&str> = scale.get_degrees().iter().map(|d| d.get_desc()).collect();
    assert_eq!(
        descs,
        vec!["1", "9/8", "81/64", "4/3", "3/2", "27/16", "243/128", "2"]
    );
    assert_eq!(scale.get_ratio(4).unwrap(), 1.5);
    assert_eq!(scale.get_period(), 2.0);
    assert!(scale
        .get_description()
        .contains("Pythagorean 7-tone diatonic scale"));
}

#[test]
fn test_out_of_range_for_every_fixture() {
    for name in ["12tet.scl", "pythagorean.scl"] {
        let scale = ScaleFile::from_file(data_path(name)).unwrap();
        let len = scale.get_scale_length();
        assert!(matches!(
            scale.get_degree(len),
            Err(TuningError::IndexOutOfRange { .. })
        ));
    }
}

#[test]
fn test_malformed_file_fails_whole_parse() {
    let result = ScaleFile::from_file(data_path("broken.scl"));
    match result {
        Err(TuningError::MalformedDegree { line, token }) => {
            assert_eq!(line, 7);
            assert_eq!(token, "abc");
        }
        other => panic!("expected a malformed degree error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = ScaleFile::from_file(data_path("does-not-exist.scl"));
    assert!(matches!(result, Err(TuningError::Io(_))));
}

#[test]
fn test_parse_on_separate_threads() {
    let handles: Vec<_> = ["12tet.scl", "pythagorean.scl"]
        .into_iter()
        .map(|name| {
            let text = read_fixture(name);
            std::thread::spawn(move || ScaleFile::parse_str(&text).map(|s| s.get_scale_length()))
        })
        .collect();

    let lengths: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(lengths, vec![13, 8]);
}
