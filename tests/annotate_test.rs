use ticket::annotate::{Annotator, Format, Outcome};
use ticket::pattern::{Normalization, PatternTable, TicketPattern};
use ticket::Ticket;

fn annotator() -> Annotator {
  Annotator::default()
}

#[test]
fn test_feature_branch_with_dashed_ticket() {
  let annotation = annotator().annotate("feature/ABC-123-add-login", "add login feature");
  assert_eq!(annotation.message, "[ABC-123] add login feature");
  assert!(annotation.applied());
  assert_eq!(annotation.outcome, Outcome::Applied(Ticket::new("ABC-123")));
}

#[test]
fn test_hotfix_branch_with_undashed_ticket() {
  let annotation = annotator().annotate("hotfix/ABC789-critical-fix", "fix it");
  assert_eq!(annotation.message, "[ABC-789] fix it");
  assert!(annotation.applied());
}

#[test]
fn test_branch_without_ticket() {
  let annotation = annotator().annotate("main", "update docs");
  assert_eq!(annotation.message, "update docs");
  assert!(!annotation.applied());
  assert_eq!(annotation.outcome, Outcome::NoMatch);
}

#[test]
fn test_branches_without_letter_digit_runs() {
  for branch in ["", "main", "develop", "feature/login-page", "release/2024-01"] {
    let annotation = annotator().annotate(branch, "msg");
    assert_eq!(annotation.message, "msg", "branch {branch}");
    assert_eq!(annotation.outcome, Outcome::NoMatch, "branch {branch}");
  }
}

#[test]
fn test_merge_message_is_skipped() {
  let annotation = annotator().annotate("feature/ABC-123-x", "Merge pull request #5");
  assert_eq!(annotation.message, "Merge pull request #5");
  assert_eq!(annotation.outcome, Outcome::Skipped("Merge".to_string()));
}

#[test]
fn test_every_default_skip_prefix() {
  for message in ["Merge branch 'x'", "Revert \"add\"", "WIP: draft", "Draft: idea"] {
    let annotation = annotator().annotate("feature/ABC-1", message);
    assert_eq!(annotation.message, message);
    assert!(matches!(annotation.outcome, Outcome::Skipped(_)));
  }
}

#[test]
fn test_skip_prefix_is_case_sensitive_and_anchored() {
  assert!(annotator().annotate("ABC-1", "wip: draft").applied());
  assert!(annotator().annotate("ABC-1", "fix WIP handling").applied());
}

#[test]
fn test_annotation_is_idempotent() {
  let annotator = annotator();
  for branch in ["feature/ABC-123-add-login", "abc123", "main"] {
    let once = annotator.annotate(branch, "add login feature");
    let twice = annotator.annotate(branch, &once.message);
    assert_eq!(twice.message, once.message);
    assert!(!twice.applied());
  }
}

#[test]
fn test_already_annotated_message() {
  let annotation = annotator().annotate("feature/abc-123", "[ABC-123] add login");
  assert_eq!(annotation.message, "[ABC-123] add login");
  assert_eq!(annotation.outcome, Outcome::AlreadyAnnotated(Ticket::new("ABC-123")));
}

#[test]
fn test_different_ticket_is_still_added() {
  let annotation = annotator().annotate("feature/ABC-124", "[ABC-123] follow up");
  assert_eq!(annotation.message, "[ABC-124] [ABC-123] follow up");
}

#[test]
fn test_normalization_is_case_and_dash_invariant() {
  for branch in ["abc-123-x", "ABC123-x", "ABC-123-x", "abc123-x"] {
    let annotation = annotator().annotate(branch, "m");
    assert_eq!(annotation.message, "[ABC-123] m", "branch {branch}");
  }
}

#[test]
fn test_mixed_case_uses_matched_segment_only() {
  let annotation = annotator().annotate("feature/Abc-123", "m");
  assert_eq!(annotation.message, "[BC-123] m");
}

#[test]
fn test_table_order_decides_between_candidates() {
  // Both segments match some pattern; the uppercase undashed pattern ranks above the lowercase dashed one
  let branch = "abc-1/XYZ22";
  assert_eq!(annotator().annotate(branch, "m").message, "[XYZ-22] m");

  let lowercase_first = PatternTable::new(vec![
    TicketPattern::new("[a-z]+-[0-9]+", Normalization::Dashed).unwrap(),
    TicketPattern::new("[A-Z]+[0-9]+", Normalization::Dashed).unwrap()
  ]);
  let annotator = Annotator::new(lowercase_first, vec![], Format::default());
  assert_eq!(annotator.annotate(branch, "m").message, "[ABC-1] m");
}

#[test]
fn test_first_occurrence_wins_within_a_pattern() {
  let annotation = annotator().annotate("ABC-1/DEF-2", "m");
  assert_eq!(annotation.message, "[ABC-1] m");
}

#[test]
fn test_multiline_message_is_prefixed_once() {
  let message = "add login\n\nLonger description\n";
  let annotation = annotator().annotate("feature/ABC-1", message);
  assert_eq!(annotation.message, "[ABC-1] add login\n\nLonger description\n");
}

#[test]
fn test_custom_configuration() {
  let patterns = PatternTable::parse("verbatim:(?:^|/)([0-9]+)-").unwrap();
  let format = Format::parse("{{message}} (#{{ticket}})").unwrap();
  let annotator = Annotator::new(patterns, vec!["fixup!".to_string()], format);

  assert_eq!(annotator.annotate("issue/42-crash", "fix crash").message, "fix crash (#42)");
  assert_eq!(annotator.annotate("issue/42-crash", "fix crash (#42)").outcome, Outcome::AlreadyAnnotated(Ticket::new("42")));
  assert_eq!(annotator.annotate("issue/42-crash", "fixup! fix").message, "fixup! fix");
  assert!(annotator.annotate("issue/42-crash", "WIP: fix").applied());
}
