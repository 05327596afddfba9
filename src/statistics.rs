use crate::errors::{io_error_with_path, StoreError, FOLDER_MISSING};
use crate::models::DirectoryStatistics;
use crate::tokenizer::WordReader;
use log::{debug, info};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

/// Summarises the words in the immediate files of `dir`.
///
/// Sub-directories are skipped, not descended into. A file's alpha character
/// count is the sum of its word lengths.
pub fn compute_for_directory(dir: &Path) -> Result<DirectoryStatistics, StoreError> {
    let start_time = Instant::now();
    let meta = fs::metadata(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(FOLDER_MISSING),
        _ => io_error_with_path(e, dir),
    })?;
    if !meta.is_dir() {
        return Err(StoreError::NotADirectory);
    }

    let mut stats = DirectoryStatistics::default();
    let mut alpha_chars_per_file = Vec::new();
    let mut word_lengths = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| io_error_with_path(e, dir))? {
        let entry = entry.map_err(|e| io_error_with_path(e, dir))?;
        let path = entry.path();
        let meta = fs::metadata(&path).map_err(|e| io_error_with_path(e, &path))?;
        if !meta.is_file() {
            continue;
        }
        stats.file_count += 1;
        stats.total_bytes += meta.len();

        let file = File::open(&path).map_err(|e| io_error_with_path(e, &path))?;
        let mut alpha_chars = 0.0;
        for word in WordReader::new(file) {
            let len = word.map_err(|e| io_error_with_path(e, &path))?.len() as f64;
            alpha_chars += len;
            word_lengths.push(len);
        }
        debug!("{}: {} alpha chars", path.display(), alpha_chars);
        alpha_chars_per_file.push(alpha_chars);
    }

    stats.avg_alpha_chars_per_file = mean(&alpha_chars_per_file);
    stats.std_alpha_chars_per_file = std_dev(&alpha_chars_per_file);
    stats.avg_word_length = mean(&word_lengths);
    stats.std_word_length = std_dev(&word_lengths);

    info!(
        "Computed statistics for '{}' over {} files in {:.2?}.",
        dir.display(),
        stats.file_count,
        start_time.elapsed()
    );
    Ok(stats)
}

/// Arithmetic mean; 0.0 for no values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for no values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EPSILON: f64 = 1e-8;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_two_files_and_skipped_subdirectories() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::write(temp.path().join("b/inner.txt"), "ignored words here").unwrap();
        fs::write(temp.path().join("a.txt"), "hi hi").unwrap();
        fs::write(temp.path().join("b.txt"), "world").unwrap();

        let stats = compute_for_directory(temp.path()).unwrap();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_bytes, 10);
        // per-file alpha chars [4, 5]
        assert!(close(stats.avg_alpha_chars_per_file, 4.5));
        assert!(close(stats.std_alpha_chars_per_file, 0.5));
        // word lengths [2, 2, 5]
        assert!(close(stats.avg_word_length, 3.0));
        assert!(close(stats.std_word_length, 2.0_f64.sqrt()));
    }

    #[test]
    fn test_empty_directory_yields_zeroes() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("only_dir")).unwrap();
        let stats = compute_for_directory(temp.path()).unwrap();
        assert_eq!(stats, DirectoryStatistics::default());
    }

    #[test]
    fn test_files_without_words_count_but_add_no_lengths() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("digits.txt"), "1234 5678").unwrap();
        fs::write(temp.path().join("word.txt"), "abc").unwrap();
        let stats = compute_for_directory(temp.path()).unwrap();
        assert_eq!(stats.file_count, 2);
        assert!(close(stats.avg_alpha_chars_per_file, 1.5));
        assert!(close(stats.avg_word_length, 3.0));
        assert!(close(stats.std_word_length, 0.0));
    }

    #[test]
    fn test_missing_and_non_directory() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            compute_for_directory(&temp.path().join("nope")),
            Err(StoreError::NotFound(_))
        ));
        let file = temp.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(compute_for_directory(&file), Err(StoreError::NotADirectory)));
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert!(close(mean(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 5.0));
        assert!(close(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0));
    }
}
