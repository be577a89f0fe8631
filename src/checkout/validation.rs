//! Checking the donor's details before an order is placed.
//!
//! The rules run in a fixed order and every failure is collected, so the
//! donor sees all of their mistakes at once. Rules that compare fields run
//! after the rules for single fields.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::basket::Basket;

/// The donor's contact and Gift Aid details from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DonorDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// ISO 3166-1 alpha-2 country code, e.g. "GB".
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    /// Whether the donor is a UK taxpayer claiming Gift Aid.
    #[serde(default)]
    pub gift_aid: bool,
}

fn default_country() -> String {
    "GB".to_owned()
}

impl DonorDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    fn is_uk(&self) -> bool {
        self.country.trim().eq_ignore_ascii_case("GB")
    }
}

/// A problem with one field of the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the form field, or "basket".
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// International dialling codes for the countries donors most often give from.
const DIALLING_CODES: [(&str, &str); 16] = [
    ("GB", "44"),
    ("IE", "353"),
    ("US", "1"),
    ("CA", "1"),
    ("FR", "33"),
    ("DE", "49"),
    ("NL", "31"),
    ("BE", "32"),
    ("PK", "92"),
    ("IN", "91"),
    ("BD", "880"),
    ("AE", "971"),
    ("SA", "966"),
    ("TR", "90"),
    ("MY", "60"),
    ("NG", "234"),
];

fn dialling_code(country: &str) -> Option<&'static str> {
    let country = country.trim().to_ascii_uppercase();

    DIALLING_CODES
        .iter()
        .find(|(code, _)| *code == country)
        .map(|(_, dialling_code)| *dialling_code)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

/// Check `details` and `basket`, returning every failed rule in rule order.
///
/// An empty list means the order can be placed.
pub fn validate_checkout(details: &DonorDetails, basket: &Basket) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if details.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "Enter your first name."));
    }

    if details.last_name.trim().is_empty() {
        errors.push(FieldError::new("last_name", "Enter your last name."));
    }

    let email = details.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Enter your email address."));
    } else if email.parse::<EmailAddress>().is_err() {
        errors.push(FieldError::new("email", "Enter a valid email address."));
    }

    if let Some(phone) = details.phone.as_deref().filter(|phone| !phone.trim().is_empty())
        && let Err(message) = check_phone(phone, &details.country)
    {
        errors.push(FieldError::new("phone", &message));
    }

    if details.gift_aid {
        if is_blank(details.address_line1.as_deref()) {
            errors.push(FieldError::new(
                "address_line1",
                "Enter your address to claim Gift Aid.",
            ));
        }

        if is_blank(details.city.as_deref()) {
            errors.push(FieldError::new("city", "Enter your town or city to claim Gift Aid."));
        }

        if is_blank(details.postcode.as_deref()) {
            errors.push(FieldError::new("postcode", "Enter your postcode to claim Gift Aid."));
        }
    }

    if details.is_uk()
        && let Some(postcode) = details
            .postcode
            .as_deref()
            .filter(|postcode| !postcode.trim().is_empty())
        && !is_valid_uk_postcode(postcode)
    {
        errors.push(FieldError::new("postcode", "Enter a valid UK postcode."));
    }

    if details.gift_aid && !details.is_uk() {
        errors.push(FieldError::new(
            "gift_aid",
            "Gift Aid can only be claimed by UK taxpayers.",
        ));
    }

    if basket.is_empty() {
        errors.push(FieldError::new(
            "basket",
            "Add a donation to your basket before checking out.",
        ));
    }

    errors
}

/// Check that `phone` is an international number for `country`.
///
/// Spaces and dashes are ignored. Countries without a known dialling code
/// only get the format check.
fn check_phone(phone: &str, country: &str) -> Result<(), String> {
    let digits: String = phone
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    let Some(digits) = digits.strip_prefix('+') else {
        return Err("Enter your phone number with the country code, e.g. +44.".to_owned());
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("A phone number can only contain digits, spaces and dashes.".to_owned());
    }

    let national_number = match dialling_code(country) {
        Some(code) => match digits.strip_prefix(code) {
            Some(national_number) => national_number,
            None => return Err(format!("Phone numbers for {country} start with +{code}.")),
        },
        None => digits,
    };

    // A trunk prefix written after the country code, e.g. +44 07..., is not dialled.
    let national_number = national_number.strip_prefix('0').unwrap_or(national_number);

    if !(7..=12).contains(&national_number.len()) {
        return Err("Enter a phone number between 7 and 12 digits long.".to_owned());
    }

    Ok(())
}

/// Whether `postcode` has the shape of a UK postcode, e.g. "SW1A 1AA" or "m11ae".
///
/// This checks structure only, not that the postcode exists.
pub fn is_valid_uk_postcode(postcode: &str) -> bool {
    let postcode: Vec<char> = postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(5..=7).contains(&postcode.len()) {
        return false;
    }

    let (outward, inward) = postcode.split_at(postcode.len() - 3);

    let inward_is_valid = inward[0].is_ascii_digit()
        && inward[1].is_ascii_alphabetic()
        && inward[2].is_ascii_alphabetic();

    inward_is_valid && is_valid_outward_code(outward)
}

fn is_valid_outward_code(outward: &[char]) -> bool {
    let letter = |c: &char| c.is_ascii_alphabetic();
    let digit = |c: &char| c.is_ascii_digit();
    let alphanumeric = |c: &char| c.is_ascii_alphanumeric();

    match outward {
        // A9, A99, A9A
        [a, b] => letter(a) && digit(b),
        [a, b, c] if letter(a) && digit(b) => alphanumeric(c),
        // AA9, AA99, AA9A
        [a, b, c] => letter(a) && letter(b) && digit(c),
        [a, b, c, d] => letter(a) && letter(b) && digit(c) && alphanumeric(d),
        _ => false,
    }
}
