//! Edge case tests for proxima.
//!
//! Tests unusual inputs and boundary conditions that could cause failures.

use proxima::{
    ArrayMatcher, BruteForceMatcher, ConfigError, Error, HnswMatcher, HnswParams, MetricKind,
    Representation, SearchParams,
};

// =============================================================================
// Build rejections
// =============================================================================

#[test]
fn empty_dataset_is_rejected() {
    let mut m = HnswMatcher::<f32>::new();
    assert_eq!(m.build(&[], 128, MetricKind::L2), Err(ConfigError::EmptyDataset));
    assert!(!m.is_ready());
}

#[test]
fn zero_dimension_is_rejected() {
    let mut m = HnswMatcher::<f32>::new();
    let err = m.build(&[1.0, 2.0], 0, MetricKind::L2).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDimension { dimension: 0, .. }));
}

#[test]
fn ragged_dataset_is_rejected() {
    let mut m = HnswMatcher::<u8>::new();
    assert_eq!(
        m.build(&[1, 2, 3, 4, 5], 2, MetricKind::L1),
        Err(ConfigError::DatasetShape { len: 5, stride: 2 })
    );
}

#[test]
fn hamming_over_floats_is_rejected() {
    let mut m = HnswMatcher::<f32>::new();
    assert_eq!(
        m.build(&[0.0; 16], 8, MetricKind::Hamming),
        Err(ConfigError::MetricMismatch {
            metric: MetricKind::Hamming,
            representation: Representation::Float,
        })
    );
}

#[test]
fn hamming_dimension_must_be_whole_bytes() {
    let mut m = HnswMatcher::<u8>::new();
    let err = m.build(&[0u8; 4], 12, MetricKind::Hamming).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDimension { dimension: 12, .. }));
}

#[test]
fn invalid_graph_parameters_are_rejected() {
    let mut m = HnswMatcher::<f32>::with_params(
        HnswParams::default().with_m(1),
        SearchParams::default(),
    );
    assert!(matches!(
        m.build(&[0.0, 1.0], 1, MetricKind::L1),
        Err(ConfigError::InvalidParameter(_))
    ));

    let mut m = HnswMatcher::<f32>::with_params(
        HnswParams::default().with_ef_construction(0),
        SearchParams::default(),
    );
    assert!(m.build(&[0.0, 1.0], 1, MetricKind::L1).is_err());
}

// =============================================================================
// Query rejections
// =============================================================================

#[test]
fn unbuilt_matchers_are_not_ready() {
    let hnsw = HnswMatcher::<f32>::new();
    assert_eq!(hnsw.search_one(&[0.0; 4]), Err(Error::NotReady));
    assert_eq!(hnsw.search(&[0.0; 4], 3), Err(Error::NotReady));

    let exact = BruteForceMatcher::<f32>::new();
    assert_eq!(exact.search_one(&[0.0; 4]), Err(Error::NotReady));
    assert_eq!(exact.search_batch(&[0.0; 4], 1), Err(Error::NotReady));
    assert!(exact.is_empty());
}

#[test]
fn query_of_wrong_length_is_rejected() {
    let mut m = HnswMatcher::<u8>::new();
    m.build(&[0u8; 64], 256, MetricKind::Hamming).unwrap();
    // Stride is 32 bytes for 256 bits.
    assert_eq!(
        m.search(&[0u8; 256], 1),
        Err(Error::QueryShape { len: 256, stride: 32 })
    );
    assert!(m.search_batch(&[0u8; 33], 1).is_err());
}

#[test]
fn empty_batch_returns_nothing() {
    let mut m = HnswMatcher::<f32>::new();
    m.build(&[0.0, 1.0, 2.0], 1, MetricKind::L2).unwrap();
    assert!(m.search_batch(&[], 2).unwrap().is_empty());
    assert!(m.search_matches(&[], 2).unwrap().is_empty());
}

// =============================================================================
// Degenerate inputs
// =============================================================================

#[test]
fn zero_k_returns_empty() {
    let mut m = HnswMatcher::<f32>::new();
    m.build(&[0.0, 1.0, 2.0], 1, MetricKind::L2).unwrap();
    assert!(m.search(&[1.0], 0).unwrap().is_empty());
    assert!(m.search_batch(&[1.0, 2.0], 0).unwrap().iter().all(Vec::is_empty));
}

#[test]
fn single_descriptor() {
    let mut m = HnswMatcher::<f32>::new();
    m.build(&[3.0, 4.0], 2, MetricKind::L2).unwrap();
    let hits = m.search(&[0.0, 0.0], 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 0);
    assert_eq!(hits[0].distance, 25.0);
    assert_eq!(m.stats().unwrap().edges_per_layer[0], 0);
}

#[test]
fn identical_descriptors_rank_by_id() {
    let data: Vec<f32> = std::iter::repeat([1.0f32, 1.0]).take(50).flatten().collect();
    let mut m = HnswMatcher::new();
    m.build(&data, 2, MetricKind::L1).unwrap();

    let hits = m.search(&[1.0, 1.0], 5).unwrap();
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|h| h.distance == 0.0));
    for pair in hits.windows(2) {
        assert!(pair[0].id < pair[1].id);
    }
}

#[test]
fn extreme_float_magnitudes() {
    let data = [1e-30f32, 1e-30, 1e18, 1e18, -1e18, -1e18];
    let mut m = HnswMatcher::new();
    m.build(&data, 2, MetricKind::L1).unwrap();
    assert_eq!(m.search_one(&[0.0, 0.0]).unwrap().id, 0);
    assert_eq!(m.search_one(&[9e17, 9e17]).unwrap().id, 1);
}

// =============================================================================
// Integer and binary descriptors
// =============================================================================

#[test]
fn byte_l1_and_l2_use_integer_distances() {
    let data = [0u8, 0, 255, 255, 10, 20];

    let mut l1 = HnswMatcher::new();
    l1.build(&data, 2, MetricKind::L1).unwrap();
    let best = l1.search_one(&[12, 18]).unwrap();
    assert_eq!((best.id, best.distance), (2, 4u32));

    let mut l2 = HnswMatcher::new();
    l2.build(&data, 2, MetricKind::L2).unwrap();
    assert_eq!(l2.space().unwrap().representation(), Representation::Integer);
    let far = l2.search(&[0, 0], 3).unwrap();
    // 255^2 * 2 does not fit in u16 but fits in u32.
    assert_eq!(far[2].distance, 130_050);
}

#[test]
fn binary_hamming_counts_bits() {
    // Two 16-bit descriptors.
    let data = [0b0000_0000u8, 0b0000_0000, 0b1111_0000, 0b0000_1111];
    let mut m = HnswMatcher::new();
    m.build(&data, 16, MetricKind::Hamming).unwrap();
    assert_eq!(m.space().unwrap().representation(), Representation::Binary);
    assert_eq!(m.space().unwrap().stride(), 2);

    let hits = m.search(&[0b1111_0000, 0b0000_0001], 2).unwrap();
    assert_eq!(hits[0].id, 1);
    assert_eq!(hits[0].distance, 3);
    assert_eq!(hits[1].id, 0);
    assert_eq!(hits[1].distance, 5);
}

#[test]
fn search_params_floor_is_applied() {
    let data: Vec<f32> = (0..200).map(|i| i as f32).collect();
    let mut m = HnswMatcher::with_params(HnswParams::default(), SearchParams { ef_search: 1 });
    m.build(&data, 1, MetricKind::L1).unwrap();
    // k above the floor still yields k results.
    assert_eq!(m.search(&[50.0], 20).unwrap().len(), 20);
    assert_eq!(m.search_with_ef(&[50.0], 3, 200).unwrap()[0].id, 50);
}
