// Promotional-mail check used by the inbox scanner.
//
// Marketing mail isn't a threat, but it's worth separating from personal
// mail when listing a scanned inbox.

const PROMOTIONAL_KEYWORDS: &[&str] = &[
    "unsubscribe",
    "opt out",
    "promotional",
    "advertisement",
    "sale",
    "discount",
    "offer",
    "deal",
    "limited time",
    "shop now",
    "buy now",
    "order now",
    "newsletter",
    "subscribe",
    "marketing",
    "promotion",
    "special offer",
    "% off",
    "free shipping",
    "coupon",
    "promo code",
    "exclusive",
];

/// Spam score above this marks an item as spam in batch listings.
pub const SPAM_FLAG_THRESHOLD: f64 = 40.0;

/// True if any promotional keyword appears (case-insensitive substring).
pub fn is_promotional(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROMOTIONAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_marketing_mail() {
        assert!(is_promotional("Weekend SALE: 30% OFF everything"));
        assert!(is_promotional("Use promo code GHOST at checkout"));
    }

    #[test]
    fn personal_mail_is_not_promotional() {
        assert!(!is_promotional("Can you send me the notes from Tuesday?"));
    }
}
