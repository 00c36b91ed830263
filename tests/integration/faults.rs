use std::collections::HashSet;

use crate::*;

use faultline_core::Segment;
use faultline_services::{segment_reader, transmit_file, ChaosFaults, Fault, FaultModel};

/// Replay a chaos schedule offline: which sequence numbers get dropped and
/// which get corrupted for this seed and these segments.
fn replay(segments: &[Segment], loss: f64, corrupt: f64, seed: u64) -> (HashSet<u64>, HashSet<u64>) {
    let mut model = ChaosFaults::new(loss, corrupt, seed);
    let mut shuffled = segments.to_vec();
    model.reorder(&mut shuffled);

    let mut dropped = HashSet::new();
    let mut corrupted = HashSet::new();
    for seg in &shuffled {
        match model.decide(seg) {
            Fault::Drop => {
                dropped.insert(seg.sequence_number);
            }
            Fault::Corrupt => {
                corrupted.insert(seg.sequence_number);
            }
            Fault::Deliver => {}
        }
    }
    (dropped, corrupted)
}

#[tokio::test]
async fn test_chaos_transfer_keeps_only_intact_segments() {
    const LOSS: f64 = 0.3;
    const CORRUPT: f64 = 0.3;
    const SEED: u64 = 11;

    let dir = TestDir::new("chaos");
    let data = frame_safe_bytes(64 * 40 + 10);
    let input = write_input(&dir, "input.bin", &data);
    let output = dir.join("received.bin");

    let segments = segment_reader(&data[..], 64).unwrap();
    let (dropped, corrupted) = replay(&segments, LOSS, CORRUPT, SEED);
    assert!(!dropped.is_empty() && !corrupted.is_empty(), "seed should exercise both faults");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut ChaosFaults::new(LOSS, CORRUPT, SEED))
        .await
        .unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.dropped, dropped.len());
    assert_eq!(report.corrupted, corrupted.len());
    assert_eq!(report.written, segments.len() - dropped.len());
    assert_eq!(outcome.accepted, report.written - report.corrupted);
    assert_eq!(outcome.rejected, report.corrupted);

    // Output holds exactly the intact segments, in file order.
    let expected: Vec<u8> = segments
        .iter()
        .filter(|s| !dropped.contains(&s.sequence_number) && !corrupted.contains(&s.sequence_number))
        .flat_map(|s| s.payload.iter().copied())
        .collect();
    assert_eq!(std::fs::read(&output).unwrap(), expected);

    // Gaps are reported only for dropped segments below the highest arrival.
    let highest_arrived = segments
        .iter()
        .map(|s| s.sequence_number)
        .filter(|seq| !dropped.contains(seq))
        .max()
        .unwrap();
    let mut expected_lost: Vec<u64> = dropped
        .iter()
        .copied()
        .filter(|seq| *seq < highest_arrived)
        .collect();
    expected_lost.sort_unstable();
    assert_eq!(expand(&outcome.lost), expected_lost);
    assert_eq!(outcome.lost_count, expected_lost.len() as u64);
}

#[tokio::test]
async fn test_all_corrupted_yields_empty_output() {
    let dir = TestDir::new("all-corrupt");
    let input = write_input(&dir, "input.bin", &frame_safe_bytes(640));
    let output = dir.join("received.bin");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut ChaosFaults::new(0.0, 1.0, 3))
        .await
        .unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.written, 10);
    assert_eq!(report.corrupted, 10);
    assert_eq!(outcome.accepted, 0);
    assert_eq!(outcome.rejected, 10);
    // Every number arrived, if only as garbage, so nothing counts as lost.
    assert!(outcome.lost.is_empty());
    assert!(std::fs::read(&output).unwrap().is_empty());
}

/// Keeps file order and drops the listed sequence numbers.
struct DropOnly(Vec<u64>);

impl FaultModel for DropOnly {
    fn reorder(&mut self, _segments: &mut [Segment]) {}

    fn decide(&mut self, segment: &Segment) -> Fault {
        if self.0.contains(&segment.sequence_number) {
            Fault::Drop
        } else {
            Fault::Deliver
        }
    }
}

#[tokio::test]
async fn test_trailing_loss_goes_unreported() {
    let dir = TestDir::new("trailing-loss");
    let data = frame_safe_bytes(64 * 5);
    let input = write_input(&dir, "input.bin", &data);
    let output = dir.join("received.bin");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut DropOnly(vec![1, 4]))
        .await
        .unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.written, 3);
    assert_eq!(outcome.accepted, 3);
    // 1 sits inside the observed range; 4 is past the highest arrival (3).
    assert_eq!(outcome.lost, vec![1..=1]);

    let mut expected = data[..64].to_vec();
    expected.extend_from_slice(&data[128..256]);
    assert_eq!(std::fs::read(&output).unwrap(), expected);
}
