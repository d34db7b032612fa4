use super::*;
use crate::vector::Pack;

#[test]
fn test_no_commit_until_full() {
    let mut engine: Compactor<f32, 4> = Compactor::new(0.5);
    let packet = engine.absorb(&Pack::from_slice(&[1.0, 0.0, 0.0, 2.0]));
    assert!(!packet.commit);
    assert_eq!(engine.matches(), 2);
}

#[test]
fn test_commit_on_exact_fill() {
    let mut engine: Compactor<f32, 4> = Compactor::new(0.5);
    engine.absorb(&Pack::from_slice(&[1.0, 0.0, 0.0, 2.0]));
    let packet = engine.absorb(&Pack::from_slice(&[0.0, 3.0, 4.0, 0.0]));
    assert!(packet.commit);
    assert_eq!(packet.data.lanes(), &[1.0, 2.0, 3.0, 4.0]);
    // Exactly full: nothing spilled into the rotated pack.
    let (residue, matches) = engine.finish();
    assert!(!residue.commit);
    assert_eq!(matches, 4);
}

#[test]
fn test_overflow_spills_into_next() {
    let mut engine: Compactor<u32, 4> = Compactor::new(1);
    engine.absorb(&Pack::from_slice(&[1, 2, 0, 3]));
    // 3 occupied + 3 fresh matches: current fills, one spills over.
    let packet = engine.absorb(&Pack::from_slice(&[4, 0, 5, 6]));
    assert!(packet.commit);
    assert_eq!(packet.data.lanes(), &[1, 2, 3, 4]);
    let (residue, matches) = engine.finish();
    assert!(residue.commit);
    assert_eq!(residue.data.lanes(), &[5, 6, 0, 0]);
    assert_eq!(matches, 6);
}

#[test]
fn test_all_matching_pack_commits_every_step() {
    let mut engine: Compactor<u32, 4> = Compactor::new(0);
    for base in [0u32, 4, 8] {
        let packet = engine.absorb(&Pack::from_slice(&[base, base + 1, base + 2, base + 3]));
        assert!(packet.commit);
        assert_eq!(packet.data.lanes(), &[base, base + 1, base + 2, base + 3]);
    }
    let (residue, matches) = engine.finish();
    assert!(!residue.commit);
    assert_eq!(matches, 12);
}

#[test]
fn test_all_failing_never_commits() {
    let mut engine: Compactor<f64, 8> = Compactor::new(100.0);
    for _ in 0..16 {
        let packet = engine.absorb(&Pack::from_slice(&[1.0; 8]));
        assert!(!packet.commit);
        assert_eq!(packet.data.lanes(), &[0.0; 8]);
    }
    let (residue, matches) = engine.finish();
    assert!(!residue.commit);
    assert_eq!(matches, 0);
}

#[test]
fn test_flush_commits_partial_residue() {
    let mut engine: Compactor<u32, 4> = Compactor::new(5);
    engine.absorb(&Pack::from_slice(&[9, 1, 7, 2]));
    let (residue, matches) = engine.finish();
    assert!(residue.commit);
    assert_eq!(residue.data.lanes(), &[9, 7, 0, 0]);
    assert_eq!(matches, 2);
}

#[test]
fn test_order_preserved_across_straddling_packs() {
    let mut engine: Compactor<u32, 4> = Compactor::new(1);
    let inputs = [[1u32, 0, 2, 3], [0, 4, 5, 0], [6, 7, 8, 9]];
    let mut committed: Vec<u32> = Vec::new();
    for lanes in &inputs {
        let packet = engine.absorb(&Pack::from_slice(lanes));
        if packet.commit {
            committed.extend_from_slice(packet.data.lanes());
        }
    }
    let (residue, matches) = engine.finish();
    if residue.commit {
        committed.extend_from_slice(residue.data.lanes());
    }
    assert_eq!(matches, 9);
    assert_eq!(&committed[..9], &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    // Zero padding past the match count.
    assert!(committed[9..].iter().all(|&v| v == 0));
}

#[test]
fn test_ties_at_threshold_are_kept() {
    let mut engine: Compactor<f32, 4> = Compactor::new(0.5);
    engine.absorb(&Pack::from_slice(&[0.5, 0.5, 0.49, 0.51]));
    let (residue, matches) = engine.finish();
    assert_eq!(matches, 3);
    assert_eq!(residue.data.lanes(), &[0.5, 0.5, 0.51, 0.0]);
}
