mod common;

use std::time::Duration;

use approx::assert_relative_eq;
use camino::Utf8Path;
use common::{two_particle_snapshot, HeaderFields, SnapshotWriter};
use lgadget::{
    lgadget_errors::{Block, MarkerPosition},
    ErrorKind, LGadget, LGadgetError, ReaderEnv, WrapMode,
};

fn reader() -> LGadget {
    LGadget::new(
        ReaderEnv::default()
            .with_task(4)
            .with_open_retries(1)
            .with_retry_delay(Duration::ZERO),
    )
}

#[test]
fn test_read_positions_end_to_end() {
    let (_dir, path) = two_particle_snapshot().write("snap.0");

    let batch = reader().read_particles(&path, false).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.px, vec![90.0, 50.0]);
    assert_eq!(batch.py, vec![5.0, 50.0]);
    assert_eq!(batch.pz, vec![5.0, 50.0]);
    assert!(batch.id.is_none());
}

#[test]
fn test_read_positions_and_ids() {
    let (_dir, path) = two_particle_snapshot().write("snap.0");

    let batch = reader().read_particles(&path, true).unwrap();
    assert_eq!(batch.px, vec![90.0, 50.0]);
    assert_eq!(batch.id, Some(vec![1001, 1002]));
}

#[test]
fn test_no_ids_never_reads_past_positions() {
    let full = two_particle_snapshot();
    let (_full_dir, full_path) = full.write("full.0");

    // keep the header and positions blocks only
    let header_and_positions = 4 + 256 + 4 + 4 + 2 * 12 + 4;
    let (_cut_dir, cut_path) = two_particle_snapshot()
        .truncate(header_and_positions)
        .write("cut.0");

    let reader = reader();
    let with_ids = reader.read_particles(&full_path, true).unwrap();
    let without_ids = reader.read_particles(&cut_path, false).unwrap();

    assert_eq!(with_ids.px, without_ids.px);
    assert_eq!(with_ids.py, without_ids.py);
    assert_eq!(with_ids.pz, without_ids.pz);

    let err = reader.read_particles(&cut_path, true).unwrap_err();
    assert_eq!(err, LGadgetError::TruncatedBlock(Block::Velocities));
}

#[test]
fn test_position_trailing_marker_mismatch() {
    let header = HeaderFields {
        npart: [2, 0, 0, 0, 0, 0],
        ..HeaderFields::default()
    };
    let payload = common::vector_bytes(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .raw_record(24, &payload, 36)
        .write("corrupt.0");

    let err = reader().read_particles(&path, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(
        err,
        LGadgetError::MarkerMismatch {
            block: Block::Positions,
            position: MarkerPosition::Trailing,
            expected: 24,
            found: 36,
        }
    );
}

#[test]
fn test_id_marker_mismatch() {
    let header = HeaderFields {
        npart: [1, 0, 0, 0, 0, 0],
        ..HeaderFields::default()
    };
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[[1.0, 2.0, 3.0]])
        .vectors(&[[0.0, 0.0, 0.0]])
        // 32-bit ids instead of 64-bit ones
        .record(&7u32.to_ne_bytes())
        .write("ids32.0");

    let err = reader().read_particles(&path, true).unwrap_err();
    assert_eq!(
        err,
        LGadgetError::MarkerMismatch {
            block: Block::Ids,
            position: MarkerPosition::Leading,
            expected: 8,
            found: 4,
        }
    );
}

#[test]
fn test_velocity_marker_mismatch() {
    let header = HeaderFields {
        npart: [1, 0, 0, 0, 0, 0],
        ..HeaderFields::default()
    };
    let velocity = common::vector_bytes(&[[0.5, 0.5, 0.5]]);
    let (_dir, leading_path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[[1.0, 2.0, 3.0]])
        .raw_record(24, &velocity, 12)
        .ids(&[9])
        .write("vel_leading.0");
    let (_dir2, trailing_path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[[1.0, 2.0, 3.0]])
        .raw_record(12, &velocity, 20)
        .ids(&[9])
        .write("vel_trailing.0");

    let reader = reader();
    let err = reader.read_particles(&leading_path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(
        err,
        LGadgetError::MarkerMismatch {
            block: Block::Velocities,
            position: MarkerPosition::Leading,
            expected: 12,
            found: 24,
        }
    );

    let err = reader.read_particles(&trailing_path, true).unwrap_err();
    assert_eq!(
        err,
        LGadgetError::MarkerMismatch {
            block: Block::Velocities,
            position: MarkerPosition::Trailing,
            expected: 12,
            found: 20,
        }
    );

    // velocities are not touched without ids
    let batch = reader.read_particles(&trailing_path, false).unwrap();
    assert_eq!(batch.px, vec![1.0]);
}

#[test]
fn test_empty_file_with_zero_box() {
    let header = HeaderFields {
        npart: [0, 0, 0, 0, 0, 0],
        box_size: 0.0,
        ..HeaderFields::default()
    };
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[])
        .vectors(&[])
        .ids(&[])
        .write("empty.0");

    let batch = reader().read_particles(&path, true).unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.id, Some(vec![]));
}

#[test]
fn test_corrupt_particle_count() {
    let header = HeaderFields {
        npart: [u32::MAX; 6],
        ..HeaderFields::default()
    };
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[[1.0, 2.0, 3.0]])
        .write("huge.0");

    let err = reader().read_particles(&path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(
        err,
        LGadgetError::BlockTooLarge {
            block: Block::Positions,
            bytes: 5 * u32::MAX as u64 * 12,
        }
    );
}

#[test]
fn test_particles_of_all_counted_types() {
    let header = HeaderFields {
        npart: [1, 1, 1, 1, 1, 50],
        box_size: 10.0,
        ..HeaderFields::default()
    };
    let positions = [
        [1.0, 2.0, 3.0],
        [11.0, 12.0, 13.0],
        [-1.0, -2.0, -3.0],
        [0.5, 9.5, 10.0],
        [25.0, -15.0, 4.0],
    ];
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&positions)
        .write("types.0");

    let batch = reader().read_particles(&path, false).unwrap();
    assert_eq!(batch.len(), 5);
    for p in batch.positions() {
        assert!(p.iter().all(|c| (0.0..10.0).contains(c)));
    }
    assert_relative_eq!(batch.px[1], 1.0);
    assert_relative_eq!(batch.pz[2], 7.0);
    assert_relative_eq!(batch.pz[3], 0.0);
    assert_relative_eq!(batch.px[4], 5.0);
    assert_relative_eq!(batch.py[4], 5.0);
}

#[test]
fn test_modulo_wrap_mode() {
    let (_dir, path) = two_particle_snapshot().write("snap.0");
    let reader = LGadget::new(ReaderEnv::default().with_wrap_mode(WrapMode::Modulo));

    let batch = reader.read_particles(&path, false).unwrap();
    assert_eq!(batch.px, vec![90.0, 50.0]);
    assert_eq!(batch.pz, vec![5.0, 50.0]);
}

#[test]
fn test_invalid_box_size() {
    let header = HeaderFields {
        npart: [1, 0, 0, 0, 0, 0],
        box_size: -1.0,
        ..HeaderFields::default()
    };
    let (_dir, path) = SnapshotWriter::new()
        .header(&header)
        .vectors(&[[1.0, 2.0, 3.0]])
        .write("nobox.0");

    let err = reader().read_particles(&path, false).unwrap_err();
    assert_eq!(err, LGadgetError::InvalidBoxSize(-1.0));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8Path::from_path(dir.path()).unwrap().join("absent.0");

    let err = reader().read_particles(&path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(
        err,
        LGadgetError::OpenFailed {
            task: 4,
            attempts: 2,
            ..
        }
    ));
}
