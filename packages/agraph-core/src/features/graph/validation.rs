//! Non-failing consistency report over a live graph
//!
//! Insertion already rejects structural violations. What remains are soft
//! problems real transcripts carry while they are being aligned or edited.

use super::Graph;
use crate::shared::models::Alignment;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Instant-layer annotation whose boundaries have different offsets
    InstantMismatch,
    /// Aligned-layer annotation with a missing or unset boundary
    UnsetAnchor,
    /// Label outside the layer's `validLabels`
    InvalidLabel,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::InstantMismatch => "instant_mismatch",
            IssueKind::UnsetAnchor => "unset_anchor",
            IssueKind::InvalidLabel => "invalid_label",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub annotation: String,
    pub layer: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on '{}': {}",
            self.kind, self.annotation, self.layer, self.message
        )
    }
}

impl Graph {
    /// Report soft problems, in annotation insertion order
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for annotation in self.annotations() {
            let layer = annotation.layer();
            let mut issue = |kind: IssueKind, message: String| {
                issues.push(ValidationIssue {
                    kind,
                    annotation: annotation.id().to_string(),
                    layer: layer.id().to_string(),
                    message,
                })
            };

            let (start, end) = (annotation.start_offset(), annotation.end_offset());
            match layer.alignment() {
                Alignment::None => {}
                alignment => {
                    if start.is_none() || end.is_none() {
                        issue(
                            IssueKind::UnsetAnchor,
                            format!("{} annotation has an unset boundary", alignment),
                        );
                    }
                }
            }
            if layer.alignment() == Alignment::Instant {
                if let (Some(s), Some(e)) = (start, end) {
                    if s != e {
                        issue(
                            IssueKind::InstantMismatch,
                            format!("instant spans {} to {}", s, e),
                        );
                    }
                }
            }
            if !layer.allows_label(annotation.label()) {
                issue(
                    IssueKind::InvalidLabel,
                    format!("label '{}' is not a valid label", annotation.label()),
                );
            }
        }

        issues
    }
}
