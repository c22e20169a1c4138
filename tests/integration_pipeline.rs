//! Integration tests for the duplicate pipeline.
//!
//! These tests verify end-to-end behavior including:
//! - Grouping of byte-different copies with identical fingerprints
//! - Corrupt files being reported without aborting the run
//! - Hidden folders (such as `.delete`) being left out

use image::{Rgb, RgbImage};
use media_tidy::core::comparator::GroupingStrategy;
use media_tidy::core::hasher::HasherConfig;
use media_tidy::core::pipeline::DuplicatePipeline;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Clone, Copy)]
enum Pattern {
    LeftHalf,
    TopHalf,
    RightHalf,
    Checker,
    LeftQuarter,
    TopQuarter,
}

/// Write a two-tone JPEG whose edges fall on hash-grid cell borders
fn write_jpeg(path: &Path, pattern: Pattern, quality_noise: u8) {
    RgbImage::from_fn(64, 64, |x, y| {
        let bright = match pattern {
            Pattern::LeftHalf => x < 32,
            Pattern::TopHalf => y < 32,
            Pattern::RightHalf => x >= 32,
            Pattern::Checker => (x / 16 + y / 16) % 2 == 0,
            Pattern::LeftQuarter => x < 16,
            Pattern::TopQuarter => y < 16,
        };
        if bright {
            Rgb([240 - quality_noise, 240, 240])
        } else {
            Rgb([10 + quality_noise, 10, 10])
        }
    })
    .save(path)
    .unwrap();
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn build_library(dir: &Path) {
    write_jpeg(&dir.join("beach.jpg"), Pattern::LeftHalf, 0);
    write_jpeg(&dir.join("beach_copy.jpg"), Pattern::LeftHalf, 3);
    write_jpeg(&dir.join("beach_edit.JPEG"), Pattern::LeftHalf, 6);
    write_jpeg(&dir.join("dog.jpg"), Pattern::TopHalf, 0);
    write_jpeg(&dir.join("dog_2.jpg"), Pattern::TopHalf, 4);
    write_jpeg(&dir.join("cat.jpg"), Pattern::RightHalf, 0);
    write_jpeg(&dir.join("tiles.jpg"), Pattern::Checker, 0);
    write_jpeg(&dir.join("pole.jpg"), Pattern::LeftQuarter, 0);
    write_jpeg(&dir.join("sky.jpg"), Pattern::TopQuarter, 0);
    fs::write(dir.join("broken.jpg"), b"definitely not a jpeg").unwrap();
}

#[test]
fn corrupt_file_is_isolated_and_duplicates_are_grouped() {
    let temp = TempDir::new().unwrap();
    build_library(temp.path());

    let report = DuplicatePipeline::builder()
        .root(temp.path())
        .chunk_size(3)
        .workers(2)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.total_images, 10);
    assert_eq!(report.hashed, 9);
    assert_eq!(file_names(&report.failed), vec!["broken.jpg"]);
    assert!(!report.errors.is_empty());

    assert_eq!(report.groups.len(), 2);
    let groups: Vec<Vec<String>> = report
        .groups
        .iter()
        .map(|g| g.files.iter().map(|f| f.file_name.clone()).collect())
        .collect();
    assert_eq!(
        groups,
        vec![
            vec!["beach.jpg", "beach_copy.jpg", "beach_edit.JPEG"],
            vec!["dog.jpg", "dog_2.jpg"],
        ]
    );
    assert_eq!(report.groups[0].id, 1);
    assert_eq!(report.groups[1].id, 2);
    assert_eq!(report.duplicate_count(), 3);
}

#[test]
fn both_strategies_agree_end_to_end() {
    let temp = TempDir::new().unwrap();
    build_library(temp.path());

    let run = |strategy| {
        DuplicatePipeline::builder()
            .root(temp.path())
            .strategy(strategy)
            .build()
            .run()
            .unwrap()
            .groups
            .into_iter()
            .map(|g| g.files.into_iter().map(|f| f.full_path).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };

    assert_eq!(
        run(GroupingStrategy::PairwiseScan),
        run(GroupingStrategy::ExactBuckets)
    );
}

#[test]
fn trash_folder_is_not_searched() {
    let temp = TempDir::new().unwrap();
    write_jpeg(&temp.path().join("a.jpg"), Pattern::LeftHalf, 0);
    let trash = temp.path().join(".delete");
    fs::create_dir(&trash).unwrap();
    write_jpeg(&trash.join("a.jpg"), Pattern::LeftHalf, 0);

    let report = DuplicatePipeline::builder().root(temp.path()).build().run().unwrap();

    assert_eq!(report.total_images, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn non_jpeg_files_are_not_hashed() {
    let temp = TempDir::new().unwrap();
    write_jpeg(&temp.path().join("a.jpg"), Pattern::LeftHalf, 0);
    RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]))
        .save(temp.path().join("b.png"))
        .unwrap();
    fs::write(temp.path().join("clip.mp4"), b"not decoded").unwrap();

    let report = DuplicatePipeline::builder().root(temp.path()).build().run().unwrap();

    assert_eq!(report.total_images, 1);
    assert!(report.failed.is_empty());
}

#[test]
fn computer_runs_on_caller_handles() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jpg");
    let b = temp.path().join("b.jpg");
    write_jpeg(&a, Pattern::Checker, 0);
    write_jpeg(&b, Pattern::Checker, 5);
    let paths = vec![a.clone(), b.clone()];
    let handles: HashMap<PathBuf, File> = paths
        .iter()
        .map(|p| (p.clone(), File::open(p).unwrap()))
        .collect();

    let results = HasherConfig::new().workers(2).build().compute(&paths, &handles);

    // Handles are still usable afterwards: the caller owns them
    assert_eq!(handles.len(), 2);
    assert_eq!(results.get(&a).flatten(), results.get(&b).flatten());
    assert!(results.get(&a).flatten().is_some());
}
