use super::*;

#[test]
fn test_pack_zeroed() {
    let pack: Pack<f32, 8> = Pack::zeroed();
    assert_eq!(pack.lanes(), &[0.0f32; 8]);
}

#[test]
fn test_pack_from_slice() {
    let pack: Pack<u32, 4> = Pack::from_slice(&[1, 2, 3, 4]);
    assert_eq!(pack.lanes(), &[1, 2, 3, 4]);
}

#[test]
fn test_match_mask_inclusive_threshold() {
    let pack: Pack<f32, 4> = Pack::from_slice(&[0.0, 0.5, 0.4, 1.0]);
    // Ties at the threshold are matches.
    assert_eq!(match_mask(&pack, 0.5), [false, true, false, true]);
}

#[test]
fn test_match_mask_nan_never_matches() {
    let pack: Pack<f64, 4> = Pack::from_slice(&[f64::NAN, 1.0, f64::NAN, 0.0]);
    assert_eq!(match_mask(&pack, f64::NEG_INFINITY), [false, true, false, true]);
}

#[test]
fn test_mask_count() {
    assert_eq!(mask_count(&[true, false, true, true]), 3);
    assert_eq!(mask_count(&[false; 8]), 0);
}

#[test]
fn test_flatten_preserves_lane_order() {
    let packs: Vec<Pack<u32, 2>> = vec![Pack([1, 2]), Pack([3, 4])];
    assert_eq!(flatten(&packs), vec![1, 2, 3, 4]);
}

#[test]
fn test_filter_scalar() {
    let input = [14u32, 3, 15, 3, 5, 14, 2, 3];
    let mut output = Vec::new();
    filter_scalar(&input, 5, &mut output);
    assert_eq!(output, vec![14, 15, 5, 14]);
}

#[test]
fn test_filter_scalar_nobranch_matches_branchy() {
    let input: Vec<i64> = vec![9, -3, 0, 7, 7, -100, 42, 3, 3, 8];
    for threshold in [-101i64, -3, 0, 3, 7, 50] {
        let mut branchy = Vec::new();
        let mut nobranch = Vec::new();
        filter_scalar(&input, threshold, &mut branchy);
        filter_scalar_nobranch(&input, threshold, &mut nobranch);
        assert_eq!(branchy, nobranch, "threshold {}", threshold);
    }
}

#[test]
fn test_filter_scalar_empty() {
    let mut output = vec![1.0f32];
    filter_scalar(&[], 0.5, &mut output);
    assert!(output.is_empty());
}
