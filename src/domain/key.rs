// Cache key derivation
//
// Keys look like `{brand}_{model}_{hash}` with brand and model lower-cased and
// the hash computed over the normalized question. The hash is the 32-bit
// `h * 31 + unit` rolling hash over UTF-16 code units, rendered in base 36.
// Any Unicode letter or digit survives normalization; `_` and every other
// symbol become a space.

const KEY_SEPARATOR: char = '_';
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Normalize a question so that punctuation, case and spacing variants collapse
pub fn normalize_question(question: &str) -> String {
    let lowered = question.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            // punctuation and whitespace both become a separator
            pending_space = true;
        }
    }

    out
}

/// Hash a (normalized) question into a short printable identifier
pub fn hash_question(normalized: &str) -> String {
    let mut hash: i32 = 0;
    for unit in normalized.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    to_base36(hash.unsigned_abs())
}

/// Build the cache key for a (brand, model, question) triple
pub fn build_key(brand: &str, model: &str, question: &str) -> String {
    let question_hash = hash_question(&normalize_question(question));
    format!(
        "{}{sep}{}{sep}{}",
        brand.to_lowercase(),
        model.to_lowercase(),
        question_hash,
        sep = KEY_SEPARATOR
    )
}

fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
