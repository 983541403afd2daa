//! Guest product reviews.

use serde::Deserialize;

/// Why a review was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    #[error("please enter your name")]
    MissingName,
    #[error("please write a comment")]
    MissingComment,
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
}

/// Review form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// A review that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub guest_name: String,
    pub rating: i16,
    pub comment: String,
}

impl ReviewForm {
    /// Trim and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] for a blank name or comment or a rating outside
    /// `1..=5`.
    pub fn validate(&self) -> Result<NewReview, ReviewError> {
        let guest_name = self.guest_name.trim();
        if guest_name.is_empty() {
            return Err(ReviewError::MissingName);
        }
        let rating = i16::try_from(self.rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or(ReviewError::RatingOutOfRange)?;
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::MissingComment);
        }
        Ok(NewReview {
            guest_name: guest_name.to_owned(),
            rating,
            comment: comment.to_owned(),
        })
    }
}

/// Mean of `ratings`, or `fallback` when there are none.
#[must_use]
pub fn average_rating(ratings: &[i16], fallback: f64) -> f64 {
    if ratings.is_empty() {
        return fallback;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = ratings.len() as f64;
    sum / count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, rating: i32, comment: &str) -> ReviewForm {
        ReviewForm {
            guest_name: name.into(),
            rating,
            comment: comment.into(),
        }
    }

    #[test]
    fn test_valid_review_is_trimmed() {
        let review = form(" Budi ", 5, " Enak sekali! ").validate();
        assert_eq!(
            review,
            Ok(NewReview {
                guest_name: "Budi".into(),
                rating: 5,
                comment: "Enak sekali!".into(),
            })
        );
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(
            form("Budi", 0, "ok").validate(),
            Err(ReviewError::RatingOutOfRange)
        );
        assert_eq!(
            form("Budi", 6, "ok").validate(),
            Err(ReviewError::RatingOutOfRange)
        );
        assert!(form("Budi", 1, "ok").validate().is_ok());
    }

    #[test]
    fn test_blank_fields_refused() {
        assert_eq!(form("  ", 4, "ok").validate(), Err(ReviewError::MissingName));
        assert_eq!(
            form("Budi", 4, "\n").validate(),
            Err(ReviewError::MissingComment)
        );
    }

    #[test]
    fn test_average_rating() {
        assert!((average_rating(&[5, 4, 3], 0.0) - 4.0).abs() < f64::EPSILON);
        assert!((average_rating(&[], 4.5) - 4.5).abs() < f64::EPSILON);
    }
}
