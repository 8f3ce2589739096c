//! Feedback collection
//!
//! Turns a [`FeedbackDraft`] into a [`FeedbackRecord`] bound to the request
//! whose result is currently live. The record is built from the draft and the
//! request id only, so no draft or output text can reach telemetry.

use crate::catalog;
use crate::model::{FeedbackDraft, FeedbackRecord, RequestId};
use crate::store::EphemeralResultStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Default bound on the free-text comment, in characters
pub const DEFAULT_COMMENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("No active result to give feedback on")]
    NoActiveResult,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Unknown feedback tag: {0}")]
    UnknownTag(String),
    #[error("Comment exceeds {max} characters")]
    CommentTooLong { max: usize },
}

impl FeedbackError {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedbackError::NoActiveResult => "no_active_result",
            FeedbackError::InvalidRating => "invalid_rating",
            FeedbackError::UnknownTag(_) => "unknown_tag",
            FeedbackError::CommentTooLong { .. } => "comment_too_long",
        }
    }
}

/// A rating is required and must fall within 1..=5
pub fn check_rating(rating: Option<u8>) -> Result<u8, FeedbackError> {
    match rating {
        Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(r),
        _ => Err(FeedbackError::InvalidRating),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackCollector {
    comment_max_chars: usize,
}

impl Default for FeedbackCollector {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_MAX_CHARS)
    }
}

impl FeedbackCollector {
    pub fn new(comment_max_chars: usize) -> Self {
        Self { comment_max_chars }
    }

    /// Validate `draft` against the live result for `request_id`.
    ///
    /// The rating is checked before anything else, so an unrated draft is
    /// always `InvalidRating` regardless of result state.
    pub fn submit(
        &self,
        results: &EphemeralResultStore,
        request_id: RequestId,
        draft: FeedbackDraft,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord, FeedbackError> {
        let rating = check_rating(draft.rating)?;

        if results.get_for(request_id, now).is_none() {
            return Err(FeedbackError::NoActiveResult);
        }

        let mut tags = BTreeSet::new();
        for tag in draft.tags {
            if !catalog::is_feedback_tag(&tag) {
                return Err(FeedbackError::UnknownTag(tag));
            }
            tags.insert(tag);
        }

        let comment = draft
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(comment) = &comment {
            if comment.chars().count() > self.comment_max_chars {
                return Err(FeedbackError::CommentTooLong {
                    max: self.comment_max_chars,
                });
            }
        }

        Ok(FeedbackRecord {
            request_id,
            rating,
            tags,
            comment,
            submitted_at: now,
        })
    }
}
