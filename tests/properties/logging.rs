//! Property-based tests for log file naming.
//!
//!   Refer to `src/logging/mod.rs` for more details.
use proptest::{prelude::*, test_runner::Config};
use tx_orchestrator::logging::{compute_rolled_file_path, parse_level};

proptest! {
  #![proptest_config(Config {
    cases: 500, ..Config::default()
  })]

  /// A `.log` suffix is replaced, never duplicated.
  #[test]
  fn prop_rolled_path_has_single_log_suffix(
    stem in "[a-z/._-]{0,20}[a-z]",
    date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
    index in 1u32..1000,
  ) {
      prop_assume!(!stem.ends_with(".log"));
      let with_suffix = compute_rolled_file_path(&format!("{}.log", stem), &date, index);
      let without_suffix = compute_rolled_file_path(&stem, &date, index);

      prop_assert_eq!(&with_suffix, &without_suffix);
      prop_assert_eq!(with_suffix, format!("{}-{}.{}.log", stem, date, index));
  }

  /// Unknown level names never disable logging.
  #[test]
  fn prop_unknown_level_defaults_to_info(level in "[a-z]{6,12}") {
      prop_assume!(!["trace", "debug", "warn", "error"].contains(&level.as_str()));
      prop_assert_eq!(parse_level(&level), log::LevelFilter::Info);
  }
}
