//! Fragment scoring for the fuzzy stage
//!
//! A token is scored against one field at a time; the engine multiplies the
//! raw score by the field's weight and sums across tokens and fields. Longer
//! fragments are worth more than single characters, and matches anchored at
//! a field edge beat interior substrings.

use synapse_core::SearchTuning;

/// Raw score of one token against one lowercased field
///
/// Whole-field equality scores highest, then a prefix or suffix match, then
/// any interior substring at one point per token character. No match is zero.
pub fn match_score(field: &str, token: &str, tuning: &SearchTuning) -> f32 {
    if field.is_empty() || token.is_empty() {
        return 0.0;
    }
    if field == token {
        return tuning.full_field_score;
    }
    if field.starts_with(token) || field.ends_with(token) {
        return tuning.edge_score;
    }
    if field.contains(token) {
        return token.chars().count().max(1) as f32;
    }
    0.0
}
