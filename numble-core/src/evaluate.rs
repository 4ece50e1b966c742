use numble_types::FeedbackColor;

/// Secrets and guesses are exactly this many decimal digits.
pub const SECRET_LEN: usize = 4;

/// Guesses allowed per player per round.
pub const MAX_GUESSES: usize = 6;

/// Checks that a string is a valid secret (or guess): exactly four ASCII
/// decimal digits with no digit repeated.
pub fn validate_secret(number: &str) -> bool {
    let bytes = number.as_bytes();
    if bytes.len() != SECRET_LEN || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // Digits cannot repeat
    bytes
        .iter()
        .enumerate()
        .all(|(i, b)| !bytes[..i].contains(b))
}

/// Scores a guess against a secret, one color per position.
///
/// Both inputs are constrained to all-distinct digits, so a digit matches
/// at most one secret position and no multiplicity bookkeeping is needed.
pub fn evaluate_guess(guess: &str, secret: &str) -> Vec<FeedbackColor> {
    let guess_bytes = guess.as_bytes();
    let secret_bytes = secret.as_bytes();

    guess_bytes
        .iter()
        .enumerate()
        .map(|(i, digit)| {
            if secret_bytes[i] == *digit {
                FeedbackColor::Green
            } else if secret_bytes.contains(digit) {
                FeedbackColor::Yellow
            } else {
                FeedbackColor::Grey
            }
        })
        .collect()
}
