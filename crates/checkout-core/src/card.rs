//! # Card Module
//!
//! Card number and security code checks for the legacy card-entry flow.
//!
//! The modern processor widget collects card data itself, so none of this
//! runs when the modern processor is enabled.

use serde::{Deserialize, Serialize};

/// Fewest digits a card number may have.
pub const MIN_CARD_NUMBER_DIGITS: usize = 12;

/// Most digits a card number may have.
pub const MAX_CARD_NUMBER_DIGITS: usize = 19;

/// Card network, detected from the number's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Jcb,
    DinersClub,
    /// Prefix did not match any known network.
    Unknown,
}

impl CardBrand {
    /// Detects the brand from a digits-only card number.
    ///
    /// ## Prefix Table
    /// ```text
    /// Amex         34, 37
    /// Diners Club  300-305, 36, 38   (14 digits)
    /// Discover     6011, 65, 644-649
    /// JCB          3528-3589
    /// Mastercard   51-55, 2221-2720
    /// Visa         4
    /// ```
    pub fn detect(digits: &str) -> CardBrand {
        let prefix = |len: usize| -> Option<u32> {
            digits.get(..len).and_then(|p| p.parse().ok())
        };

        if digits.starts_with('4') {
            return CardBrand::Visa;
        }
        if matches!(prefix(2), Some(34 | 37)) {
            return CardBrand::Amex;
        }
        if digits.len() == 14
            && (matches!(prefix(3), Some(300..=305)) || matches!(prefix(2), Some(36 | 38)))
        {
            return CardBrand::DinersClub;
        }
        if prefix(4) == Some(6011)
            || prefix(2) == Some(65)
            || matches!(prefix(3), Some(644..=649))
        {
            return CardBrand::Discover;
        }
        if matches!(prefix(4), Some(3528..=3589)) {
            return CardBrand::Jcb;
        }
        if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
            return CardBrand::Mastercard;
        }

        CardBrand::Unknown
    }

    /// Whether the merchant accepts this brand.
    ///
    /// Unknown prefixes are let through; the processor is the final judge.
    pub const fn is_supported(&self) -> bool {
        !matches!(self, CardBrand::DinersClub)
    }

    /// Number of digits in the security code printed on this brand.
    pub const fn security_code_len(&self) -> usize {
        match self {
            CardBrand::Amex => 4,
            _ => 3,
        }
    }
}

/// Why a card number was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardNumberIssue {
    /// Not digits, or a digit count outside the allowed range.
    Malformed,
    /// Valid shape but the brand is not accepted.
    UnsupportedBrand(CardBrand),
}

/// Strips the separators people type between digit groups.
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
}

/// Checks a card number as typed by the user.
///
/// Returns the detected brand on success.
pub fn check_card_number(raw: &str) -> Result<CardBrand, CardNumberIssue> {
    let digits = normalize_card_number(raw);

    if !digits.chars().all(|c| c.is_ascii_digit())
        || !(MIN_CARD_NUMBER_DIGITS..=MAX_CARD_NUMBER_DIGITS).contains(&digits.len())
    {
        return Err(CardNumberIssue::Malformed);
    }

    let brand = CardBrand::detect(&digits);
    if !brand.is_supported() {
        return Err(CardNumberIssue::UnsupportedBrand(brand));
    }

    Ok(brand)
}

/// Checks a security code against the brand's expected length.
pub fn is_valid_security_code(code: &str, brand: CardBrand) -> bool {
    code.len() == brand.security_code_len() && code.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// Unit Tests
// =============================================================================
