//! Deterministic fallback messages for when the upstream model is unavailable.

/// Fixed fallback pool.
pub const FALLBACK_MESSAGES: [&str; 8] = [
    "Keep up the great work! You're doing awesome.",
    "Stay strong and maintain your rhythm.",
    "Focus on your breathing and stay relaxed.",
    "You've got this! Keep pushing forward.",
    "Great pace! Stay consistent.",
    "Listen to your body and keep it up.",
    "One step at a time, you're making progress!",
    "Stay focused and trust your training.",
];

/// Pick a fallback by 100 m segment so repeated failures within a segment
/// give the same text.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fallback_message(distance: f64) -> &'static str {
    let segment = if distance.is_finite() && distance > 0.0 {
        (distance / 100.0).floor() as u64
    } else {
        0
    };
    FALLBACK_MESSAGES[(segment % FALLBACK_MESSAGES.len() as u64) as usize]
}
