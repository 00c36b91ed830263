use crate::*;

use faultline_services::{transmit_file, ChaosFaults, NoFaults};

#[tokio::test]
async fn test_130_byte_file_arrives_intact() {
    let dir = TestDir::new("130-bytes");
    let data = frame_safe_bytes(130);
    let input = write_input(&dir, "input.txt", &data);
    let output = dir.join("received.txt");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut ChaosFaults::lossless(130))
        .await
        .unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.written, 3);
    assert_eq!(outcome.accepted, 3);
    assert_eq!(outcome.rejected, 0);
    assert!(outcome.lost.is_empty());
    assert_eq!(outcome.bytes_written, 130);
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[tokio::test]
async fn test_shuffled_large_file_round_trip() {
    let dir = TestDir::new("large");
    let data = frame_safe_bytes(50_000);
    let input = write_input(&dir, "input.bin", &data);
    let output = dir.join("received.bin");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut ChaosFaults::lossless(42))
        .await
        .unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    let expected_segments = data.len().div_ceil(64);
    assert_eq!(report.written, expected_segments);
    assert_eq!(outcome.accepted, report.written);
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[tokio::test]
async fn test_unshuffled_round_trip_with_odd_segment_size() {
    let dir = TestDir::new("odd-size");
    let data = frame_safe_bytes(1_001);
    let input = write_input(&dir, "input.bin", &data);
    let output = dir.join("received.bin");

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 7, &mut NoFaults).await.unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.written, 143);
    assert_eq!(outcome.accepted, 143);
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[tokio::test]
async fn test_empty_file_produces_empty_output() {
    let dir = TestDir::new("empty");
    let input = write_input(&dir, "input.txt", b"");
    let output = dir.join("received.txt");
    std::fs::write(&output, b"left over from an earlier run").unwrap();

    let (addr, receiver) = spawn_receiver(&output).await.unwrap();
    let report = transmit_file(&input, &addr, 64, &mut NoFaults).await.unwrap();
    let outcome = receiver.await.unwrap().unwrap();

    assert_eq!(report.written, 0);
    assert_eq!(outcome.accepted, 0);
    assert!(std::fs::read(&output).unwrap().is_empty());
}
