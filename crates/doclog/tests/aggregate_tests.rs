// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Aggregation tests
//!
//! These tests drive the aggregator with canned history output over a scratch
//! docs tree, covering filtering, bucketing, de-duplication and failures.


use similar_asserts::assert_eq;

use doclog::aggregate::AggregateError;
use doclog::period::DateFormat;
use doclog::{ChangeAggregator, Digest, run_pipeline};
use doclog_docs::{FrontMatterReader, LinkResolver};
use doclog_git::ChangeCategory;

use fixtures::{
    AUG_31_LATE, DOCS_URL, FakeHistory, LogBuilder, OCT_01, OCT_20, REPO_URL, SEP_15, article,
    docs_options,
};
use test_utils::TempTestDir;

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_new_article_is_listed() {
    let tree = TempTestDir::new("listed");
    tree.create_file(
        "docs/guide/index.md",
        &article("Getting started", "First steps"),
    );
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("1945ab9", OCT_20)
            .change("10", "2", "docs/guide/index.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let bucket = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(bucket.new_entries.len(), 1);
    assert!(bucket.updated_entries.is_empty());

    let entry = &bucket.new_entries[0];
    assert_eq!(entry.title.as_deref(), Some("Getting started"));
    assert_eq!(entry.description.as_deref(), Some("First steps"));
    assert_eq!(entry.lines_added, 10);
    assert_eq!(entry.lines_removed, 2);
    assert_eq!(entry.commit_id, "1945ab9");
    assert_eq!(entry.commit_url, format!("{REPO_URL}/commit/1945ab9"));
    assert_eq!(entry.docs_url, format!("{DOCS_URL}/guide"));
    assert_eq!(entry.absolute_path, tree.absolute("docs/guide/index.md"));
    assert_eq!(entry.published_at.to_rfc3339(), "2026-10-20T08:30:00+00:00");
}

#[tokio::test]
async fn test_pass_statistics() {
    let tree = TempTestDir::new("stats");
    tree.create_file("docs/a.md", &article("A", "a"));
    tree.create_file("docs/includes/snippet.md", "shared\n");
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("aaaaaaa", OCT_20)
            .change("10", "2", "docs/a.md")
            .change("50", "0", "docs/includes/snippet.md")
            .change("50", "0", "docs/gone.md")
            .change("1", "0", "docs/a.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let new_pass = &report.passes[0];
    assert_eq!(new_pass.category, ChangeCategory::New);
    assert_eq!(new_pass.commits, 1);
    assert_eq!(new_pass.records, 4);
    assert_eq!(new_pass.added, 1);
    assert_eq!(new_pass.excluded, 1);
    assert_eq!(new_pass.missing, 1);
    assert_eq!(new_pass.below_threshold, 1);
    assert_eq!(new_pass.skipped(), 3);

    let updated_pass = &report.passes[1];
    assert_eq!(updated_pass.category, ChangeCategory::Updated);
    assert_eq!(updated_pass.commits, 0);
    assert_eq!(updated_pass.records, 0);
}

// ============================================================================
// Threshold
// ============================================================================

async fn listed_with_threshold(added: &str, removed: &str, min_changed_lines: i64) -> usize {
    let tree = TempTestDir::new("threshold");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::Updated,
        LogBuilder::new()
            .commit("bbbbbbb", OCT_20)
            .change(added, removed, "docs/page.md")
            .build(),
    );
    let mut options = docs_options(tree.path());
    options.min_changed_lines = min_changed_lines;

    run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed")
        .digest
        .entry_count()
}

#[tokio::test]
async fn test_threshold_is_exclusive() {
    assert_eq!(listed_with_threshold("10", "2", 5).await, 1);
    assert_eq!(listed_with_threshold("10", "2", 10).await, 0);
    assert_eq!(listed_with_threshold("7", "2", 5).await, 0);
    assert_eq!(listed_with_threshold("8", "2", 5).await, 1);
}

#[tokio::test]
async fn test_net_removal_is_not_listed() {
    assert_eq!(listed_with_threshold("2", "40", 5).await, 0);
}

#[tokio::test]
async fn test_binary_change_is_not_listed() {
    assert_eq!(listed_with_threshold("-", "-", 5).await, 0);
    assert_eq!(listed_with_threshold("-", "-", -100).await, 0);
}

// ============================================================================
// Bucketing
// ============================================================================

#[tokio::test]
async fn test_buckets_follow_commit_month() {
    let tree = TempTestDir::new("months");
    tree.create_file("docs/oct.md", &article("Oct", "o"));
    tree.create_file("docs/sep.md", &article("Sep", "s"));
    tree.create_file("docs/aug.md", &article("Aug", "a"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::Updated,
        LogBuilder::new()
            .commit("ccccccc", OCT_01)
            .change("20", "1", "docs/oct.md")
            .commit("ddddddd", SEP_15)
            .change("20", "1", "docs/sep.md")
            .commit("eeeeeee", AUG_31_LATE)
            .change("20", "1", "docs/aug.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(
        report.digest.keys().collect::<Vec<_>>(),
        vec!["October 2026", "September 2026", "August 2026"]
    );
    let aug = report.digest.bucket("August 2026").expect("bucket exists");
    assert_eq!(aug.updated_entries[0].commit_id, "eeeeeee");
}

#[tokio::test]
async fn test_custom_date_format() {
    let tree = TempTestDir::new("format");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("fffffff", OCT_20)
            .change("30", "0", "docs/page.md")
            .build(),
    );
    let mut options = docs_options(tree.path());
    options.date_format = DateFormat::new("%Y-%m").expect("valid pattern");

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.digest.keys().collect::<Vec<_>>(), vec!["2026-10"]);
}

#[tokio::test]
async fn test_bucket_kept_when_every_change_is_filtered() {
    let tree = TempTestDir::new("empty-bucket");
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("1111111", SEP_15)
            .change("30", "0", "docs/build/output.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.digest.len(), 1);
    let bucket = report.digest.bucket("September 2026").expect("bucket exists");
    assert!(bucket.is_empty());
}

#[tokio::test]
async fn test_bucket_order_is_first_reference_across_passes() {
    let tree = TempTestDir::new("order");
    tree.create_file("docs/a.md", &article("A", "a"));
    tree.create_file("docs/b.md", &article("B", "b"));
    let history = FakeHistory::new()
        .with_output(
            ChangeCategory::New,
            LogBuilder::new()
                .commit("2222222", OCT_20)
                .change("30", "0", "docs/a.md")
                .build(),
        )
        .with_output(
            ChangeCategory::Updated,
            LogBuilder::new()
                .commit("3333333", SEP_15)
                .change("30", "0", "docs/b.md")
                .commit("4444444", OCT_01)
                .change("30", "0", "docs/b.md")
                .build(),
        );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(
        report.digest.keys().collect::<Vec<_>>(),
        vec!["October 2026", "September 2026"]
    );
    let oct = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(oct.new_entries.len(), 1);
    assert_eq!(oct.updated_entries.len(), 1);
    assert_eq!(oct.updated_entries[0].commit_id, "4444444");
}

// ============================================================================
// De-duplication
// ============================================================================

#[tokio::test]
async fn test_newest_update_wins_within_bucket() {
    let tree = TempTestDir::new("dedup");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::Updated,
        LogBuilder::new()
            .commit("newest1", OCT_20)
            .change("30", "0", "docs/page.md")
            .commit("older22", OCT_01)
            .change("40", "0", "docs/page.md")
            .commit("sept333", SEP_15)
            .change("50", "0", "docs/page.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let oct = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(oct.updated_entries.len(), 1);
    assert_eq!(oct.updated_entries[0].commit_id, "newest1");

    // A different bucket lists the file again
    let sep = report.digest.bucket("September 2026").expect("bucket exists");
    assert_eq!(sep.updated_entries.len(), 1);
    assert_eq!(sep.updated_entries[0].commit_id, "sept333");

    assert_eq!(report.passes[1].duplicates, 1);
}

#[tokio::test]
async fn test_new_and_updated_in_same_bucket_are_both_listed() {
    let tree = TempTestDir::new("new-and-updated");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new()
        .with_output(
            ChangeCategory::New,
            LogBuilder::new()
                .commit("5555555", OCT_01)
                .change("80", "0", "docs/page.md")
                .build(),
        )
        .with_output(
            ChangeCategory::Updated,
            LogBuilder::new()
                .commit("6666666", OCT_20)
                .change("12", "3", "docs/page.md")
                .build(),
        );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let oct = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(oct.new_entries.len(), 1);
    assert_eq!(oct.updated_entries.len(), 1);
    assert_eq!(oct.new_entries[0].absolute_path, oct.updated_entries[0].absolute_path);
    assert_eq!(report.passes[1].duplicates, 0);
}

#[tokio::test]
async fn test_repeated_new_entries_are_not_deduplicated() {
    let tree = TempTestDir::new("new-twice");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("7777777", OCT_20)
            .change("30", "0", "docs/page.md")
            .commit("8888888", OCT_01)
            .change("30", "0", "docs/page.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let oct = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(oct.new_entries.len(), 2);
}

// ============================================================================
// Metadata and links
// ============================================================================

#[tokio::test]
async fn test_invalid_front_matter_lists_without_metadata() {
    let tree = TempTestDir::new("bad-yaml");
    tree.create_file("docs/page.md", "---\ntitle: [unclosed\n---\nBody\n");
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("9999999", OCT_20)
            .change("30", "0", "docs/page.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let oct = report.digest.bucket("October 2026").expect("bucket exists");
    assert_eq!(oct.new_entries.len(), 1);
    assert_eq!(oct.new_entries[0].title, None);
    assert_eq!(oct.new_entries[0].description, None);
}

#[tokio::test]
async fn test_unreadable_file_is_skipped() {
    let tree = TempTestDir::new("unreadable");
    // A directory named like an article exists but cannot be read as text
    std::fs::create_dir_all(tree.path().join("docs/folder.md")).expect("create dir");
    tree.create_file("docs/real.md", &article("Real", "r"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("abcdef0", OCT_20)
            .change("30", "0", "docs/folder.md")
            .change("30", "0", "docs/real.md")
            .build(),
    );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.digest.entry_count(), 1);
    assert_eq!(report.passes[0].unreadable, 1);
}

#[tokio::test]
async fn test_unlinkable_file_is_skipped() {
    let tree = TempTestDir::new("unlinkable");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        LogBuilder::new()
            .commit("abcdef1", OCT_20)
            .change("30", "0", "docs/page.md")
            .build(),
    );
    let mut options = docs_options(tree.path());
    options.links = LinkResolver::new("articles-root", DOCS_URL);

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.digest.entry_count(), 0);
    assert_eq!(report.passes[0].unlinkable, 1);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_query_failure_names_category() {
    let tree = TempTestDir::new("query-failure");
    let history = FakeHistory::new()
        .with_output(ChangeCategory::New, "")
        .with_failure(ChangeCategory::Updated, 128, "fatal: bad revision");
    let options = docs_options(tree.path());

    let err = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect_err("pipeline should fail");

    assert_eq!(err.category(), Some(ChangeCategory::Updated));
    let message = err.to_string();
    assert!(message.contains("updated"), "message: {message}");
    assert!(message.contains("fatal: bad revision"), "message: {message}");
}

#[tokio::test]
async fn test_malformed_history_is_parse_error() {
    let tree = TempTestDir::new("malformed");
    let history = FakeHistory::new().with_output(
        ChangeCategory::New,
        "commit|abc1234|Someone|s@example.com|1790856000\nnot a numstat line\n",
    );
    let options = docs_options(tree.path());

    let err = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect_err("pipeline should fail");

    assert!(matches!(
        err,
        AggregateError::Parse {
            category: ChangeCategory::New,
            ..
        }
    ));
}

#[tokio::test]
async fn test_out_of_range_timestamp_leaves_digest_unchanged() {
    let tree = TempTestDir::new("bad-epoch");
    tree.create_file("docs/page.md", &article("Page", "p"));
    let history = FakeHistory::new().with_output(
        ChangeCategory::Updated,
        LogBuilder::new()
            .commit("abcdef2", OCT_20)
            .change("30", "0", "docs/page.md")
            .commit("abcdef3", i64::MAX)
            .change("30", "0", "docs/page.md")
            .build(),
    );
    let options = docs_options(tree.path());
    let aggregator = ChangeAggregator::new(&history, &FrontMatterReader, &options);

    let mut digest = Digest::new();
    let err = aggregator
        .aggregate(&mut digest, ChangeCategory::Updated)
        .await
        .expect_err("pass should fail");

    assert!(matches!(
        err,
        AggregateError::TimestampOutOfRange { ref commit, .. } if commit == "abcdef3"
    ));
    assert_eq!(err.category(), Some(ChangeCategory::Updated));
    assert!(err.to_string().contains("in the updated history"));
    assert!(digest.is_empty());
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_passes_query_new_then_updated() {
    let tree = TempTestDir::new("requests");
    let history = FakeHistory::new();
    let mut options = docs_options(tree.path());
    options.extension = "rst".to_string();

    run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    let requests = history.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].category, ChangeCategory::New);
    assert_eq!(requests[1].category, ChangeCategory::Updated);
    assert!(requests.iter().all(|r| r.since == options.since));
    assert!(requests.iter().all(|r| r.extension == "rst"));
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let tree = TempTestDir::new("deterministic");
    tree.create_file("docs/a.md", &article("A", "a"));
    tree.create_file("docs/b/index.md", &article("B", "b"));
    let log = LogBuilder::new()
        .commit("aaaa111", OCT_20)
        .change("30", "0", "docs/a.md")
        .change("12", "1", "docs/b/index.md")
        .commit("bbbb222", SEP_15)
        .change("30", "0", "docs/a.md")
        .build();
    let history = FakeHistory::new()
        .with_output(ChangeCategory::New, log.clone())
        .with_output(ChangeCategory::Updated, log);
    let options = docs_options(tree.path());

    let first = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");
    let second = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.digest).expect("serialize"),
        serde_json::to_string(&second.digest).expect("serialize")
    );
}

#[tokio::test]
async fn test_feed_items_from_pipeline() {
    let tree = TempTestDir::new("feed");
    tree.create_file("docs/a.md", &article("A", "a"));
    tree.create_file("docs/b.md", &article("B", "b"));
    let history = FakeHistory::new()
        .with_output(
            ChangeCategory::New,
            LogBuilder::new()
                .commit("ccc1111", OCT_20)
                .change("30", "0", "docs/b.md")
                .build(),
        )
        .with_output(
            ChangeCategory::Updated,
            LogBuilder::new()
                .commit("ccc2222", OCT_01)
                .change("30", "0", "docs/a.md")
                .build(),
        );
    let options = docs_options(tree.path());

    let report = run_pipeline(&history, &FrontMatterReader, &options)
        .await
        .expect("pipeline should succeed");
    let items = report.digest.feed_items();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, ChangeCategory::New);
    assert_eq!(items[0].url, format!("{DOCS_URL}/b"));
    assert_eq!(items[1].category, ChangeCategory::Updated);
    assert_eq!(items[1].title.as_deref(), Some("A"));
}
